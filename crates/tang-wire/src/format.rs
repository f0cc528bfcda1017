//! Byte encodings of plan records

use crate::codec::{decode_with_limit, encode};
use crate::error::{WireError, WireResult};
use crate::record::{with_nesting_limit, PlanRecord, DEFAULT_MAX_RECORD_DEPTH};
use bincode::Options;
use serde::{Deserialize, Serialize};
use tang_plan::InjectionPlan;
use tang_types::ClassHierarchy;

/// Byte encoding of a record tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Compact `bincode` encoding
    #[default]
    Binary,
    /// Human-readable JSON
    Json,
}

/// Wire layer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Encoding used for files and byte buffers
    pub format: WireFormat,
    /// Deepest record nesting accepted in either direction
    pub max_depth: usize,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            format: WireFormat::default(),
            max_depth: DEFAULT_MAX_RECORD_DEPTH,
        }
    }
}

impl WireConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With encoding
    #[inline]
    #[must_use]
    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    /// With nesting limit
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Serialize a record tree
///
/// # Errors
/// [`WireError::TooDeep`] past `config.max_depth`, or codec failure
pub fn record_to_bytes(record: &PlanRecord, config: &WireConfig) -> WireResult<Vec<u8>> {
    if record.depth() > config.max_depth {
        return Err(WireError::TooDeep {
            max_depth: config.max_depth,
        });
    }
    match config.format {
        WireFormat::Binary => Ok(bincode::serialize(record)?),
        WireFormat::Json => Ok(serde_json::to_vec_pretty(record)?),
    }
}

/// Deserialize a record tree
///
/// # Errors
/// [`WireError::TooDeep`] past `config.max_depth`, or codec failure,
/// including truncated input
pub fn record_from_bytes(bytes: &[u8], config: &WireConfig) -> WireResult<PlanRecord> {
    let (result, exceeded) = with_nesting_limit(config.max_depth, || read_record(bytes, config.format));
    match result {
        Err(_) if exceeded => Err(WireError::TooDeep {
            max_depth: config.max_depth,
        }),
        result => result,
    }
}

// Nesting is bounded by the record guard, not by the codecs; the stacker
// wrapper keeps the bounded recursion off the caller's stack limit.
fn read_record(bytes: &[u8], format: WireFormat) -> WireResult<PlanRecord> {
    match format {
        WireFormat::Binary => {
            let options = bincode::options()
                .with_fixint_encoding()
                .allow_trailing_bytes();
            let mut de = bincode::Deserializer::from_slice(bytes, options);
            Ok(PlanRecord::deserialize(serde_stacker::Deserializer::new(&mut de))?)
        }
        WireFormat::Json => {
            let mut de = serde_json::Deserializer::from_slice(bytes);
            de.disable_recursion_limit();
            let record = PlanRecord::deserialize(serde_stacker::Deserializer::new(&mut de))?;
            de.end()?;
            Ok(record)
        }
    }
}

/// Encode `plan` to bytes
///
/// # Errors
/// [`WireError::TooDeep`] past `config.max_depth`, or codec failure
pub fn to_bytes(plan: &InjectionPlan, config: &WireConfig) -> WireResult<Vec<u8>> {
    record_to_bytes(&encode(plan), config)
}

/// Decode a plan from bytes against `hierarchy`
///
/// # Errors
/// Codec failure, or any structural error of [`decode`](crate::decode)
pub fn from_bytes<H: ClassHierarchy + ?Sized>(
    hierarchy: &H,
    bytes: &[u8],
    config: &WireConfig,
) -> WireResult<InjectionPlan> {
    let record = record_from_bytes(bytes, config)?;
    decode_with_limit(hierarchy, &record, config.max_depth)
}
