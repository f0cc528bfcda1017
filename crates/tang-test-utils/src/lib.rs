//! Testing utilities for the Tang workspace
//!
//! Shared fixtures: a sample class hierarchy covering every plan shape,
//! shorthand plan constructors, random plan trees backed by a hierarchy, and
//! tracing setup for tests.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use proptest::prelude::*;
use std::ops::Range;
use tang_plan::{Bindings, InjectionPlan, PlanBuilder};
use tang_types::{ClassHierarchy, ConstructorArg, InstanceValue, MemoryHierarchy, NodeRef};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber for test output
///
/// Reads `RUST_LOG` and falls back to `warn`. Safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Hierarchy with one example of every resolution outcome
///
/// | Request          | Outcome                                   |
/// |------------------|-------------------------------------------|
/// | `app.Logger`     | injectable, zero-argument constructor     |
/// | `app.Server`     | injectable, uses the `app.Port` default   |
/// | `app.Client`     | infeasible, `app.Host` has no value       |
/// | `app.Clock`      | ambiguous, two implementations            |
/// | `app.Scheduler`  | ambiguous through its `app.Clock` argument |
/// | `app.Parent`     | feasible, waits on a future `app.Child`   |
/// | `app.Ping`       | constructor cycle with `app.Pong`         |
#[must_use]
pub fn sample_hierarchy() -> MemoryHierarchy {
    let mut h = MemoryHierarchy::new();
    h.add_package("app").unwrap();
    h.add_named_parameter("app.Port", Some("8080")).unwrap();
    h.add_named_parameter("app.Host", None).unwrap();

    for class in [
        "app.Logger",
        "app.Server",
        "app.Client",
        "app.Clock",
        "app.SystemClock",
        "app.FakeClock",
        "app.Scheduler",
        "app.Parent",
        "app.Child",
        "app.Ping",
        "app.Pong",
    ] {
        h.add_class(class).unwrap();
    }

    h.add_constructor("app.Logger", &[]).unwrap();
    h.add_constructor("app.Server", &["app.Logger", "app.Port"])
        .unwrap();
    h.add_constructor("app.Client", &["app.Host"]).unwrap();
    h.add_constructor("app.SystemClock", &[]).unwrap();
    h.add_constructor("app.FakeClock", &[]).unwrap();
    h.add_implementation("app.Clock", "app.SystemClock").unwrap();
    h.add_implementation("app.Clock", "app.FakeClock").unwrap();
    h.add_constructor("app.Scheduler", &["app.Clock"]).unwrap();

    let logger = h.node("app.Logger").unwrap();
    let child = h.node("app.Child").unwrap();
    h.add_constructor_with(
        "app.Parent",
        vec![ConstructorArg::new(logger), ConstructorArg::future(child)],
    )
    .unwrap();
    h.add_constructor("app.Child", &["app.Parent"]).unwrap();

    h.add_constructor("app.Ping", &["app.Pong"]).unwrap();
    h.add_constructor("app.Pong", &["app.Ping"]).unwrap();
    h
}

/// Node registered under `full_name`
#[must_use]
pub fn node(h: &impl ClassHierarchy, full_name: &str) -> NodeRef {
    h.node(full_name).unwrap()
}

/// Instance plan for `full_name`
#[must_use]
pub fn instance(h: &impl ClassHierarchy, full_name: &str, value: &str) -> InjectionPlan {
    InjectionPlan::instance(node(h, full_name), InstanceValue::new(value))
}

/// Constructor plan whose signature is looked up from the argument plans
#[must_use]
pub fn constructor(
    h: &impl ClassHierarchy,
    class: &str,
    args: Vec<InjectionPlan>,
) -> InjectionPlan {
    let class = node(h, class);
    let arg_nodes: Vec<NodeRef> = args.iter().map(|a| a.node().clone()).collect();
    let signature = h.constructor(class.as_ref(), &arg_nodes).unwrap();
    InjectionPlan::constructor(class, signature, args)
}

/// Subplan over `alternatives`
#[must_use]
pub fn subplan(
    h: &impl ClassHierarchy,
    full_name: &str,
    alternatives: Vec<InjectionPlan>,
) -> InjectionPlan {
    InjectionPlan::subplan(node(h, full_name), alternatives)
}

/// Subplan with no alternatives: an infeasible leaf
#[must_use]
pub fn unbound(h: &impl ClassHierarchy, full_name: &str) -> InjectionPlan {
    subplan(h, full_name, Vec::new())
}

/// Build the plan for `full_name` in a fresh pass
#[must_use]
pub fn build(h: &impl ClassHierarchy, bindings: &Bindings, full_name: &str) -> InjectionPlan {
    PlanBuilder::new(h, bindings).build_by_name(full_name).unwrap()
}

/// Plans for every sample request that resolves without error
#[must_use]
pub fn sample_plans(h: &impl ClassHierarchy) -> Vec<InjectionPlan> {
    let bindings = Bindings::new();
    let mut builder = PlanBuilder::new(h, &bindings);
    [
        "app.Logger",
        "app.Server",
        "app.Client",
        "app.Clock",
        "app.Scheduler",
        "app.Parent",
    ]
    .iter()
    .map(|name| builder.build_by_name(name).unwrap())
    .collect()
}

/// Shape of a random plan tree
#[derive(Debug, Clone)]
pub enum Shape {
    Instance,
    Deferred,
    Constructor(Vec<Shape>),
    Subplan(Vec<Shape>),
}

/// Trees up to `depth` levels, at most four children per node
pub fn shape(depth: u32) -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![4 => Just(Shape::Instance), 1 => Just(Shape::Deferred)];
    leaf.prop_recursive(depth, 48, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Shape::Constructor),
            proptest::collection::vec(inner, 0..4).prop_map(Shape::Subplan),
        ]
    })
}

/// Small tree wrapped in a spine of single-child constructors and subplans
pub fn deep_shape(spine: Range<usize>) -> impl Strategy<Value = Shape> {
    (shape(3), proptest::collection::vec(any::<bool>(), spine)).prop_map(|(core, spine)| {
        spine.into_iter().fold(core, |inner, as_constructor| {
            if as_constructor {
                Shape::Constructor(vec![inner])
            } else {
                Shape::Subplan(vec![inner])
            }
        })
    })
}

/// Register every node of `shape` in a fresh hierarchy and build its plan
///
/// Names follow the tree path (`t.N`, `t.N_0`, `t.N_0_1`, ...), so every
/// constructor signature is distinct. Instance values repeat the node name.
#[must_use]
pub fn shape_plan(shape: &Shape) -> (MemoryHierarchy, InjectionPlan) {
    let mut h = MemoryHierarchy::new();
    register_shape(&mut h, shape, "t.N");
    let plan = shape_to_plan(&h, shape, "t.N");
    (h, plan)
}

fn child_name(parent: &str, index: usize) -> String {
    format!("{parent}_{index}")
}

fn register_shape(h: &mut MemoryHierarchy, shape: &Shape, name: &str) {
    h.add_class(name).unwrap();
    match shape {
        Shape::Instance | Shape::Deferred => {}
        Shape::Subplan(children) => {
            for (i, child) in children.iter().enumerate() {
                register_shape(h, child, &child_name(name, i));
            }
        }
        Shape::Constructor(children) => {
            let names: Vec<String> = (0..children.len()).map(|i| child_name(name, i)).collect();
            for (child, arg) in children.iter().zip(&names) {
                register_shape(h, child, arg);
            }
            let args: Vec<&str> = names.iter().map(String::as_str).collect();
            h.add_constructor(name, &args).unwrap();
        }
    }
}

fn shape_to_plan(h: &MemoryHierarchy, shape: &Shape, name: &str) -> InjectionPlan {
    let plans = |children: &[Shape]| -> Vec<InjectionPlan> {
        children
            .iter()
            .enumerate()
            .map(|(i, child)| shape_to_plan(h, child, &child_name(name, i)))
            .collect()
    };
    match shape {
        Shape::Instance => instance(h, name, name),
        Shape::Deferred => instance(h, name, name).into_deferred(),
        Shape::Constructor(args) => constructor(h, name, plans(args)),
        Shape::Subplan(alternatives) if alternatives.is_empty() => unbound(h, name),
        Shape::Subplan(alternatives) => subplan(h, name, plans(alternatives)),
    }
}
