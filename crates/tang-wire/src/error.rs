//! Error types for plan encoding, decoding and persistence

use std::path::PathBuf;
use tang_plan::PlanError;
use tang_types::HierarchyError;

/// Errors raised by the wire layer
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Record populates none or several of its cases
    #[error("malformed plan record {name}: {cases} of constructor/subplan/instance populated, expected 1")]
    Malformed {
        /// Full name carried by the record
        name: String,
        /// Number of populated cases
        cases: usize,
    },

    /// Name, constructor signature or value rejected by the class hierarchy
    #[error("cannot resolve plan record {name}: {source}")]
    Unresolved {
        /// Name the hierarchy rejected
        name: String,
        /// Hierarchy failure
        #[source]
        source: HierarchyError,
    },

    /// Stored selection index is negative and not the "none" marker
    #[error("plan record {name} has invalid selected_plan {index}")]
    InvalidIndex {
        /// Full name of the subplan record
        name: String,
        /// Stored index
        index: i64,
    },

    /// Stored selection disagrees with the decoded alternatives
    #[error("invalid subplan selection: {0}")]
    InvalidSelection(#[source] PlanError),

    /// Record tree nests deeper than the configured limit
    #[error("plan records nested deeper than {max_depth}")]
    TooDeep {
        /// Configured limit
        max_depth: usize,
    },

    /// Binary codec failure
    #[error("binary codec: {0}")]
    Binary(#[from] bincode::Error),

    /// JSON codec failure
    #[error("json codec: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem failure
    #[error("io error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },
}

impl WireError {
    /// Create unresolved-name error for record `name`
    pub fn unresolved(name: impl Into<String>, source: HierarchyError) -> Self {
        Self::Unresolved {
            name: name.into(),
            source,
        }
    }

    /// Create IO error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True if the records do not form a valid plan against the supplied
    /// hierarchy, as opposed to a codec or filesystem failure
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Malformed { .. }
                | Self::Unresolved { .. }
                | Self::InvalidIndex { .. }
                | Self::InvalidSelection(_)
                | Self::TooDeep { .. }
        )
    }
}

/// Result type alias for wire operations
pub type WireResult<T> = Result<T, WireError>;
