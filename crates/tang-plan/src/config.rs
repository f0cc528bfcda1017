//! Plan builder configuration

use serde::{Deserialize, Serialize};

/// Default recursion budget for one resolution pass
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Plan builder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Maximum nesting of node and constructor resolutions
    pub max_depth: usize,
}

impl BuilderConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With recursion budget
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
