//! Error types for class-hierarchy lookups

/// Errors reported by a [`ClassHierarchy`](crate::ClassHierarchy)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// No node registered under the full name
    #[error("name not found: {0}")]
    NameNotFound(String),

    /// Full name failed validation
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// Rejected name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// A node with the same full name already exists
    #[error("duplicate node: {0}")]
    DuplicateNode(String),

    /// Operation needs a class node
    #[error("{0} is not a class")]
    NotAClass(String),

    /// No constructor takes exactly the given parameter identities
    #[error("no constructor of {class} matches arguments ({})", args.join(", "))]
    NoMatchingConstructor {
        /// Class searched
        class: String,
        /// Parameter full names, in order
        args: Vec<String>,
    },

    /// Value could not be parsed for the node
    #[error("cannot parse '{value}' for {name}: {reason}")]
    ParseFailed {
        /// Node the value was meant for
        name: String,
        /// Rejected string form
        value: String,
        /// Parser message
        reason: String,
    },
}

impl HierarchyError {
    /// Create invalid name error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create no-matching-constructor error
    pub fn no_matching_constructor(class: impl Into<String>, args: Vec<String>) -> Self {
        Self::NoMatchingConstructor {
            class: class.into(),
            args,
        }
    }

    /// Create parse failure error
    pub fn parse_failed(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ParseFailed {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// True when a referenced name or signature is unknown to the hierarchy
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            Self::NameNotFound(_) | Self::NoMatchingConstructor { .. }
        )
    }
}
