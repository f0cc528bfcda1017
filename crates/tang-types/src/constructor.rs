//! Constructor signatures
//!
//! Provides [`ConstructorDef`], the collaborator-owned description of one
//! injectable constructor, and [`ConstructorSignature`], the in-memory form.

use crate::node::{same_node, Node, NodeRef};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// Shared handle to a constructor signature
pub type ConstructorRef = Arc<dyn ConstructorDef>;

/// One formal parameter of a constructor
#[derive(Debug, Clone)]
pub struct ConstructorArg {
    node: NodeRef,
    future: bool,
}

impl ConstructorArg {
    /// Parameter resolved before the enclosing object is built
    #[inline]
    #[must_use]
    pub fn new(node: NodeRef) -> Self {
        Self {
            node,
            future: false,
        }
    }

    /// Parameter supplied after the enclosing object exists
    #[inline]
    #[must_use]
    pub fn future(node: NodeRef) -> Self {
        Self { node, future: true }
    }

    /// Parameter identity
    #[inline]
    #[must_use]
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    /// True for a deferred parameter
    #[inline]
    #[must_use]
    pub fn is_future(&self) -> bool {
        self.future
    }
}

/// Injectable constructor of a class
pub trait ConstructorDef: Debug + Send + Sync {
    /// Full name of the declaring class
    fn class_name(&self) -> &str;

    /// Formal parameters in declaration order
    fn args(&self) -> &[ConstructorArg];

    /// True if the formal parameters are exactly `nodes`, in order
    fn matches(&self, nodes: &[NodeRef]) -> bool {
        let args = self.args();
        args.len() == nodes.len()
            && args
                .iter()
                .zip(nodes)
                .all(|(arg, node)| same_node(arg.node().as_ref(), node.as_ref()))
    }

    /// Full names of the formal parameters
    fn arg_names(&self) -> Vec<String> {
        self.args()
            .iter()
            .map(|arg| arg.node().full_name().to_string())
            .collect()
    }
}

/// Constructor stored by [`MemoryHierarchy`](crate::MemoryHierarchy)
#[derive(Debug, Clone)]
pub struct ConstructorSignature {
    class: String,
    args: Vec<ConstructorArg>,
}

impl ConstructorSignature {
    /// Create signature for `class`
    #[must_use]
    pub fn new(class: &dyn Node, args: Vec<ConstructorArg>) -> Self {
        Self {
            class: class.full_name().to_string(),
            args,
        }
    }
}

impl ConstructorDef for ConstructorSignature {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn args(&self) -> &[ConstructorArg] {
        &self.args
    }
}

impl Display for ConstructorSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.class, self.arg_names().join(", "))
    }
}
