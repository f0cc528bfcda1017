//! Plan construction from a class hierarchy
//!
//! [`PlanBuilder`] turns a node identity into the full [`InjectionPlan`] of
//! every way it could be built. Node plans and constructor plans are
//! memoized in separate [`PlanCache`]s for the lifetime of the builder, so a
//! shared dependency is planned once and a re-entrant request is reported as
//! a cycle.
//!
//! # Example
//!
//! ```
//! use tang_plan::{Bindings, PlanBuilder};
//! use tang_types::MemoryHierarchy;
//!
//! let mut hierarchy = MemoryHierarchy::new();
//! hierarchy.add_class("app.Clock").unwrap();
//! hierarchy.add_constructor("app.Clock", &[]).unwrap();
//!
//! let bindings = Bindings::new();
//! let mut builder = PlanBuilder::new(&hierarchy, &bindings);
//! let plan = builder.build_by_name("app.Clock").unwrap();
//! assert!(plan.is_injectable());
//! ```

use crate::cache::PlanCache;
use crate::config::BuilderConfig;
use crate::error::{ResolutionError, ResolutionResult};
use crate::key::SetValuedKey;
use crate::plan::InjectionPlan;
use indexmap::IndexMap;
use tang_types::{
    same_node, ClassHierarchy, ConstructorRef, InstanceValue, NodeKind, NodeRef,
};

/// Explicit choices made by the caller, keyed by full name
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    instances: IndexMap<String, InstanceValue>,
    implementations: IndexMap<String, String>,
}

impl Bindings {
    /// Create empty bindings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a ready value to a class or named parameter
    pub fn bind_instance(&mut self, full_name: impl Into<String>, value: impl Into<InstanceValue>) {
        self.instances.insert(full_name.into(), value.into());
    }

    /// Bind a class or interface to one implementation
    pub fn bind_implementation(
        &mut self,
        full_name: impl Into<String>,
        implementation: impl Into<String>,
    ) {
        self.implementations
            .insert(full_name.into(), implementation.into());
    }

    /// With a bound value
    #[must_use]
    pub fn with_instance(
        mut self,
        full_name: impl Into<String>,
        value: impl Into<InstanceValue>,
    ) -> Self {
        self.bind_instance(full_name, value);
        self
    }

    /// With a bound implementation
    #[must_use]
    pub fn with_implementation(
        mut self,
        full_name: impl Into<String>,
        implementation: impl Into<String>,
    ) -> Self {
        self.bind_implementation(full_name, implementation);
        self
    }

    /// Value bound to `full_name`
    #[inline]
    #[must_use]
    pub fn instance(&self, full_name: &str) -> Option<&InstanceValue> {
        self.instances.get(full_name)
    }

    /// Implementation bound to `full_name`
    #[inline]
    #[must_use]
    pub fn implementation(&self, full_name: &str) -> Option<&str> {
        self.implementations.get(full_name).map(String::as_str)
    }

    /// Total number of bindings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len() + self.implementations.len()
    }

    /// True if nothing is bound
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty() && self.implementations.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Node,
    Constructor,
}

/// Builds injection plans for one resolution pass
#[derive(Debug)]
pub struct PlanBuilder<'h, H: ClassHierarchy + ?Sized> {
    hierarchy: &'h H,
    bindings: &'h Bindings,
    config: BuilderConfig,
    nodes: PlanCache,
    constructors: PlanCache,
    depth: usize,
}

impl<'h, H: ClassHierarchy + ?Sized> PlanBuilder<'h, H> {
    /// Create builder with default configuration
    #[must_use]
    pub fn new(hierarchy: &'h H, bindings: &'h Bindings) -> Self {
        Self {
            hierarchy,
            bindings,
            config: BuilderConfig::default(),
            nodes: PlanCache::new(),
            constructors: PlanCache::new(),
            depth: 0,
        }
    }

    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Number of finished node plans
    #[inline]
    #[must_use]
    pub fn cached_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Forget everything planned so far
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.constructors.clear();
        self.depth = 0;
    }

    /// Plan for the node registered under `full_name`
    ///
    /// # Errors
    /// Unknown name, or any error of [`PlanBuilder::build`]
    pub fn build_by_name(&mut self, full_name: &str) -> ResolutionResult<InjectionPlan> {
        let node = self.hierarchy.node(full_name)?;
        self.build(&node)
    }

    /// Plan for `node`
    ///
    /// # Errors
    /// - [`ResolutionError::NotInjectable`] for a package
    /// - [`ResolutionError::CycleDetected`] for a constructor cycle not
    ///   broken by a future parameter
    /// - [`ResolutionError::DepthExceeded`] past the depth budget
    /// - hierarchy lookup and value parse failures
    pub fn build(&mut self, node: &NodeRef) -> ResolutionResult<InjectionPlan> {
        let key = SetValuedKey::for_node(node.as_ref());
        self.memoized(Slot::Node, key, node, |builder| builder.resolve_node(node))
    }

    fn resolve_node(&mut self, node: &NodeRef) -> ResolutionResult<InjectionPlan> {
        let hierarchy = self.hierarchy;
        let bindings = self.bindings;
        let full_name = node.full_name();
        tracing::trace!(node = full_name, depth = self.depth, "resolving");

        match node.kind() {
            NodeKind::Package => Err(ResolutionError::NotInjectable(full_name.to_string())),
            NodeKind::NamedParameter => {
                if let Some(value) = bindings.instance(full_name) {
                    return Ok(InjectionPlan::instance(node.clone(), value.clone()));
                }
                if let Some(default) = hierarchy.default_value(node.as_ref()) {
                    let value = hierarchy.parse(node.as_ref(), default)?;
                    return Ok(InjectionPlan::instance(node.clone(), value));
                }
                tracing::debug!(param = full_name, "named parameter has no value");
                Ok(InjectionPlan::subplan(node.clone(), Vec::new()))
            }
            NodeKind::Class => self.resolve_class(node),
        }
    }

    fn resolve_class(&mut self, node: &NodeRef) -> ResolutionResult<InjectionPlan> {
        let hierarchy = self.hierarchy;
        let bindings = self.bindings;
        let full_name = node.full_name();

        if let Some(value) = bindings.instance(full_name) {
            return Ok(InjectionPlan::instance(node.clone(), value.clone()));
        }
        if let Some(target) = bindings.implementation(full_name) {
            if target != full_name {
                let implementation = hierarchy.node(target)?;
                let plan = self.build(&implementation)?;
                return Ok(InjectionPlan::subplan(node.clone(), vec![plan]));
            }
        }

        let mut alternatives = Vec::new();
        for constructor in hierarchy.constructors(node.as_ref()) {
            alternatives.push(self.build_constructor(node, constructor)?);
        }
        for implementation in hierarchy.implementations(node.as_ref()) {
            if same_node(implementation.as_ref(), node.as_ref()) {
                continue;
            }
            alternatives.push(self.build(implementation)?);
        }

        let plan = InjectionPlan::subplan(node.clone(), alternatives);
        tracing::debug!(
            class = full_name,
            alternatives = plan.num_alternatives(),
            "planned class"
        );
        Ok(plan)
    }

    fn build_constructor(
        &mut self,
        node: &NodeRef,
        constructor: &ConstructorRef,
    ) -> ResolutionResult<InjectionPlan> {
        let key = SetValuedKey::for_constructor(constructor.as_ref());
        self.memoized(Slot::Constructor, key, node, |builder| {
            let mut args = Vec::with_capacity(constructor.args().len());
            for arg in constructor.args() {
                let plan = if arg.is_future() {
                    let target = arg.node();
                    InjectionPlan::instance(target.clone(), InstanceValue::new(target.full_name()))
                        .into_deferred()
                } else {
                    builder.build(arg.node())?
                };
                args.push(plan);
            }
            Ok(InjectionPlan::constructor(
                node.clone(),
                constructor.clone(),
                args,
            ))
        })
    }

    fn memoized<F>(
        &mut self,
        slot: Slot,
        key: SetValuedKey<String>,
        node: &NodeRef,
        resolve: F,
    ) -> ResolutionResult<InjectionPlan>
    where
        F: FnOnce(&mut Self) -> ResolutionResult<InjectionPlan>,
    {
        match self.cache(slot).lookup(&key) {
            Ok(Some(plan)) => return Ok(plan),
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(node = node.full_name(), "cycle detected");
                return Err(err);
            }
        }
        if self.depth >= self.config.max_depth {
            tracing::warn!(
                node = node.full_name(),
                max_depth = self.config.max_depth,
                "depth budget exhausted"
            );
            return Err(ResolutionError::DepthExceeded {
                name: node.full_name().to_string(),
                max_depth: self.config.max_depth,
            });
        }

        self.cache(slot).begin(key.clone(), node.clone())?;
        self.depth += 1;
        let result = resolve(self);
        self.depth -= 1;

        match result {
            Ok(plan) => self.cache(slot).finish(&key, plan),
            Err(err) => {
                self.cache(slot).abandon(&key);
                Err(err)
            }
        }
    }

    fn cache(&mut self, slot: Slot) -> &mut PlanCache {
        match slot {
            Slot::Node => &mut self.nodes,
            Slot::Constructor => &mut self.constructors,
        }
    }
}
