//! Class-hierarchy lookup
//!
//! [`ClassHierarchy`] is everything plan building and plan decoding need to
//! know about user types. [`MemoryHierarchy`] is a plain in-memory
//! implementation with insertion-ordered lookups, so constructors and
//! implementations are always enumerated in the order they were registered.

use crate::constructor::{ConstructorArg, ConstructorDef, ConstructorRef, ConstructorSignature};
use crate::error::HierarchyError;
use crate::name::FullName;
use crate::node::{Node, NodeDef, NodeKind, NodeRef};
use crate::value::InstanceValue;
use indexmap::IndexMap;
use std::sync::Arc;

/// Source of node identities and constructor signatures
pub trait ClassHierarchy {
    /// Look up a node by full name
    ///
    /// # Errors
    /// [`HierarchyError::NameNotFound`] if nothing is registered under the name
    fn node(&self, full_name: &str) -> Result<NodeRef, HierarchyError>;

    /// Injectable constructors of a class, in registration order
    fn constructors(&self, class: &dyn Node) -> &[ConstructorRef];

    /// Known implementations of a class or interface, in registration order
    fn implementations(&self, class: &dyn Node) -> &[NodeRef];

    /// Default value declared for a named parameter
    fn default_value(&self, param: &dyn Node) -> Option<&str>;

    /// Constructor of `class` whose formal parameters are exactly `args`
    ///
    /// # Errors
    /// [`HierarchyError::NoMatchingConstructor`] if no signature matches
    fn constructor(
        &self,
        class: &dyn Node,
        args: &[NodeRef],
    ) -> Result<ConstructorRef, HierarchyError> {
        self.constructors(class)
            .iter()
            .find(|c| c.matches(args))
            .cloned()
            .ok_or_else(|| {
                HierarchyError::no_matching_constructor(
                    class.full_name(),
                    args.iter().map(|a| a.full_name().to_string()).collect(),
                )
            })
    }

    /// Turn a configuration string into a value for `node`
    ///
    /// The default is an identity parse: the string is kept as-is.
    ///
    /// # Errors
    /// Implementations that validate values return
    /// [`HierarchyError::ParseFailed`]
    fn parse(&self, node: &dyn Node, value: &str) -> Result<InstanceValue, HierarchyError> {
        let _ = node;
        Ok(InstanceValue::new(value))
    }
}

/// In-memory class hierarchy
#[derive(Debug, Default)]
pub struct MemoryHierarchy {
    nodes: IndexMap<String, NodeRef>,
    constructors: IndexMap<String, Vec<ConstructorRef>>,
    implementations: IndexMap<String, Vec<NodeRef>>,
    defaults: IndexMap<String, String>,
}

impl MemoryHierarchy {
    /// Create empty hierarchy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no node is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Register a package
    ///
    /// # Errors
    /// Invalid or duplicate full name
    pub fn add_package(&mut self, full_name: &str) -> Result<NodeRef, HierarchyError> {
        self.add_node(full_name, NodeKind::Package)
    }

    /// Register a class or interface
    ///
    /// # Errors
    /// Invalid or duplicate full name
    pub fn add_class(&mut self, full_name: &str) -> Result<NodeRef, HierarchyError> {
        self.add_node(full_name, NodeKind::Class)
    }

    /// Register a named parameter with an optional default value
    ///
    /// # Errors
    /// Invalid or duplicate full name
    pub fn add_named_parameter(
        &mut self,
        full_name: &str,
        default: Option<&str>,
    ) -> Result<NodeRef, HierarchyError> {
        let node = self.add_node(full_name, NodeKind::NamedParameter)?;
        if let Some(default) = default {
            self.defaults
                .insert(full_name.to_string(), default.to_string());
        }
        Ok(node)
    }

    /// Register a constructor whose parameters are all resolved eagerly
    ///
    /// # Errors
    /// Unknown class or argument names, or `class` is not a class
    pub fn add_constructor(
        &mut self,
        class: &str,
        args: &[&str],
    ) -> Result<ConstructorRef, HierarchyError> {
        let args = args
            .iter()
            .map(|name| self.node(name).map(ConstructorArg::new))
            .collect::<Result<Vec<_>, _>>()?;
        self.add_constructor_with(class, args)
    }

    /// Register a constructor with explicit argument specs
    ///
    /// Registering the same parameter sequence twice returns the existing
    /// signature.
    ///
    /// # Errors
    /// Unknown class, or `class` is not a class
    pub fn add_constructor_with(
        &mut self,
        class: &str,
        args: Vec<ConstructorArg>,
    ) -> Result<ConstructorRef, HierarchyError> {
        let class_node = self.class_node(class)?;
        let nodes: Vec<NodeRef> = args.iter().map(|a| a.node().clone()).collect();
        if let Ok(existing) = self.constructor(class_node.as_ref(), &nodes) {
            return Ok(existing);
        }

        let signature: ConstructorRef =
            Arc::new(ConstructorSignature::new(class_node.as_ref(), args));
        tracing::trace!(class, args = ?signature.arg_names(), "registered constructor");
        self.constructors
            .entry(class.to_string())
            .or_default()
            .push(signature.clone());
        Ok(signature)
    }

    /// Record `implementation` as a known implementation of `class`
    ///
    /// # Errors
    /// Unknown names, or either node is not a class
    pub fn add_implementation(
        &mut self,
        class: &str,
        implementation: &str,
    ) -> Result<(), HierarchyError> {
        self.class_node(class)?;
        let implementation = self.class_node(implementation)?;
        let known = self.implementations.entry(class.to_string()).or_default();
        if !known
            .iter()
            .any(|n| n.full_name() == implementation.full_name())
        {
            known.push(implementation);
        }
        Ok(())
    }

    fn add_node(&mut self, full_name: &str, kind: NodeKind) -> Result<NodeRef, HierarchyError> {
        let name: FullName = full_name.parse()?;
        if self.nodes.contains_key(full_name) {
            return Err(HierarchyError::DuplicateNode(full_name.to_string()));
        }
        let node: NodeRef = Arc::new(NodeDef::new(name, kind));
        self.nodes.insert(full_name.to_string(), node.clone());
        Ok(node)
    }

    fn class_node(&self, full_name: &str) -> Result<NodeRef, HierarchyError> {
        let node = self.node(full_name)?;
        if node.kind() == NodeKind::Class {
            Ok(node)
        } else {
            Err(HierarchyError::NotAClass(full_name.to_string()))
        }
    }
}

impl ClassHierarchy for MemoryHierarchy {
    fn node(&self, full_name: &str) -> Result<NodeRef, HierarchyError> {
        self.nodes
            .get(full_name)
            .cloned()
            .ok_or_else(|| HierarchyError::NameNotFound(full_name.to_string()))
    }

    fn constructors(&self, class: &dyn Node) -> &[ConstructorRef] {
        self.constructors
            .get(class.full_name())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn implementations(&self, class: &dyn Node) -> &[NodeRef] {
        self.implementations
            .get(class.full_name())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn default_value(&self, param: &dyn Node) -> Option<&str> {
        self.defaults.get(param.full_name()).map(String::as_str)
    }
}
