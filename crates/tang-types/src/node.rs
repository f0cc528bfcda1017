//! Node identities
//!
//! A node names a package, class or named parameter. Plans only ever hold
//! shared, read-only [`NodeRef`] handles; the hierarchy owns the nodes.

use crate::name::FullName;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// Shared handle to a node identity
pub type NodeRef = Arc<dyn Node>;

/// Identity of something a plan can resolve
pub trait Node: Debug + Send + Sync {
    /// Simple (last segment) name
    fn name(&self) -> &str;

    /// Full dotted name, unique within a hierarchy
    fn full_name(&self) -> &str;

    /// What kind of node this is
    fn kind(&self) -> NodeKind;
}

/// Node classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Namespace, never injectable
    Package,

    /// Class or interface
    Class,

    /// Named parameter slot, resolved from a bound or default value
    NamedParameter,
}

/// Two handles name the same node
#[inline]
#[must_use]
pub fn same_node(a: &dyn Node, b: &dyn Node) -> bool {
    a.full_name() == b.full_name()
}

/// Node stored by [`MemoryHierarchy`](crate::MemoryHierarchy)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDef {
    name: FullName,
    full_name: String,
    kind: NodeKind,
}

impl NodeDef {
    /// Create node
    #[must_use]
    pub fn new(name: FullName, kind: NodeKind) -> Self {
        Self {
            full_name: name.to_string(),
            name,
            kind,
        }
    }
}

impl Node for NodeDef {
    fn name(&self) -> &str {
        self.name.simple_name()
    }

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }
}

impl Display for NodeDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name)
    }
}
