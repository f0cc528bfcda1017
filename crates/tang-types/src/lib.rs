//! Tang Types
//!
//! The class-hierarchy side of injection planning: what a plan refers to.
//!
//! # Overview
//!
//! - [`Node`] / [`NodeRef`]: shared, read-only node identities
//! - [`FullName`]: validated dotted names
//! - [`ConstructorDef`] / [`ConstructorRef`]: injectable constructor signatures
//! - [`InstanceValue`]: string-encoded terminal values
//! - [`ClassHierarchy`]: lookup by full name and by parameter sequence
//! - [`MemoryHierarchy`]: in-memory implementation
//!
//! # Example
//!
//! ```rust
//! use tang_types::{ClassHierarchy, MemoryHierarchy};
//!
//! let mut hierarchy = MemoryHierarchy::new();
//! hierarchy.add_class("app.Bar").unwrap();
//! hierarchy.add_class("app.Foo").unwrap();
//! hierarchy.add_constructor("app.Foo", &["app.Bar"]).unwrap();
//!
//! let foo = hierarchy.node("app.Foo").unwrap();
//! assert_eq!(hierarchy.constructors(foo.as_ref()).len(), 1);
//! ```

#![warn(missing_docs)]

mod constructor;
mod error;
mod hierarchy;
mod name;
mod node;
mod value;

// Re-exports
pub use constructor::{ConstructorArg, ConstructorDef, ConstructorRef, ConstructorSignature};
pub use error::HierarchyError;
pub use hierarchy::{ClassHierarchy, MemoryHierarchy};
pub use name::FullName;
pub use node::{same_node, Node, NodeDef, NodeKind, NodeRef};
pub use value::InstanceValue;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
