//! Terminal values held by instance plans

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A resolved terminal value in its string-encoded form
///
/// Values are what the wire format stores; turning one into a live object is
/// left to whoever instantiates the plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceValue(String);

impl InstanceValue {
    /// Wrap a string-encoded value
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// String form, as persisted
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the string form
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for InstanceValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for InstanceValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}
