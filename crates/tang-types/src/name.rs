//! Dotted full names for class-hierarchy nodes
//!
//! Provides [`FullName`], the validated `package.Class$Inner` form every
//! node identity is registered and looked up under.

use crate::error::HierarchyError;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Validated dotted name of a node
///
/// # Examples
/// - `["com", "example", "Foo"]` → `com.example.Foo`
/// - `["com", "example", "Foo$Timeout"]` → `com.example.Foo$Timeout`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FullName(Vec<String>);

impl FullName {
    /// Last segment, the simple name shown in shallow plan strings
    #[inline]
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }
}

fn valid_segment(seg: &str) -> bool {
    seg.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

impl Display for FullName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for FullName {
    type Err = HierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(HierarchyError::invalid_name(s, "name is empty"));
        }

        let segments: Vec<String> = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(HierarchyError::invalid_name(s, "empty segment"))
                } else if !valid_segment(seg) {
                    Err(HierarchyError::invalid_name(
                        s,
                        format!("invalid segment '{seg}'"),
                    ))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}
