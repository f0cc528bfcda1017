use pretty_assertions::assert_eq;
use tang_plan::{Bindings, BuilderConfig, PlanBuilder, PlanKind, ResolutionError};
use tang_test_utils::{build, init_tracing, sample_hierarchy};
use tang_types::{
    ClassHierarchy, ConstructorRef, HierarchyError, InstanceValue, MemoryHierarchy, Node,
    NodeRef,
};

#[test]
fn zero_argument_constructor_is_injectable() {
    init_tracing();
    let h = sample_hierarchy();
    let plan = build(&h, &Bindings::new(), "app.Logger");

    assert!(plan.is_injectable());
    assert_eq!(plan.num_alternatives(), 1);
    assert_eq!(plan.to_string(), "Logger[Logger()]");
    assert!(matches!(plan.kind(), PlanKind::Subplan { .. }));
}

#[test]
fn named_parameter_uses_default_value() {
    let h = sample_hierarchy();
    let plan = build(&h, &Bindings::new(), "app.Server");

    assert!(plan.is_injectable());
    assert_eq!(plan.to_string(), "Server[Server(Logger[Logger()],Port)]");

    let args = plan.delegated_plan().unwrap().args().unwrap();
    assert_eq!(args[1].value().unwrap().as_str(), "8080");
}

#[test]
fn bound_value_overrides_default() {
    let h = sample_hierarchy();
    let bindings = Bindings::new().with_instance("app.Port", "9090");
    let plan = build(&h, &bindings, "app.Server");

    let args = plan.delegated_plan().unwrap().args().unwrap();
    assert_eq!(args[1].value().unwrap().as_str(), "9090");
}

#[test]
fn pretty_string_of_built_plan() {
    let h = sample_hierarchy();
    let plan = build(&h, &Bindings::new(), "app.Server");

    assert_eq!(
        plan.to_pretty_string(),
        "app.Server:\nServer\n  [ Server\n    ( Logger\n      [ Logger()\n      ]\n    ,Port\n    )\n  ]"
    );
}

#[test]
fn unbound_parameter_makes_class_infeasible() {
    let h = sample_hierarchy();
    let plan = build(&h, &Bindings::new(), "app.Client");

    assert!(!plan.is_feasible());
    assert!(!plan.is_injectable());
    assert_eq!(
        plan.to_cant_inject_string().unwrap(),
        "app.Client missing argument app.Host"
    );

    let bindings = Bindings::new().with_instance("app.Host", "localhost");
    assert!(build(&h, &bindings, "app.Client").is_injectable());
}

#[test]
fn two_implementations_are_ambiguous() {
    let h = sample_hierarchy();
    let plan = build(&h, &Bindings::new(), "app.Clock");

    assert_eq!(plan.num_alternatives(), 2);
    assert!(plan.is_ambiguous());
    assert_eq!(plan.selected_index(), None);
    assert_eq!(
        plan.to_cant_inject_string().unwrap(),
        "Ambiguous subplan app.Clock: 2 alternatives are feasible [\n  SystemClock[SystemClock]\n  FakeClock[FakeClock]\n]"
    );
}

#[test]
fn bound_implementation_resolves_ambiguity() {
    let h = sample_hierarchy();
    let bindings = Bindings::new().with_implementation("app.Clock", "app.FakeClock");
    let plan = build(&h, &bindings, "app.Clock");

    assert!(plan.is_injectable());
    assert_eq!(plan.selected_index(), Some(0));
    assert_eq!(
        plan.delegated_plan().unwrap().node().full_name(),
        "app.FakeClock"
    );
}

#[test]
fn bound_instance_short_circuits_class() {
    let h = sample_hierarchy();
    let bindings = Bindings::new().with_instance("app.Clock", "frozen");
    let plan = build(&h, &bindings, "app.Scheduler");

    assert!(plan.is_injectable());
    assert_eq!(plan.to_string(), "Scheduler[Scheduler(Clock)]");
}

#[test]
fn ambiguity_is_explained_through_arguments() {
    let h = sample_hierarchy();
    let plan = build(&h, &Bindings::new(), "app.Scheduler");

    assert!(plan.is_ambiguous());
    assert_eq!(
        plan.to_cant_inject_string().unwrap(),
        "app.Scheduler has ambiguous arguments: [ Ambiguous subplan app.Clock: 2 alternatives are feasible [\n  SystemClock[SystemClock]\n  FakeClock[FakeClock]\n] ]"
    );
}

#[test]
fn future_parameter_breaks_cycle() {
    let h = sample_hierarchy();
    let plan = build(&h, &Bindings::new(), "app.Parent");

    assert!(plan.is_feasible());
    assert!(!plan.is_ambiguous());
    assert!(plan.has_future_dependency());
    assert!(!plan.is_injectable());

    let args = plan.delegated_plan().unwrap().args().unwrap();
    assert!(args[1].is_deferred());
    assert_eq!(args[1].node().full_name(), "app.Child");
    assert!(plan
        .to_cant_inject_string()
        .unwrap()
        .starts_with("app.Parent depends on a future and can only be wired after construction:\n"));

    let child = build(&h, &Bindings::new(), "app.Child");
    assert!(child.has_future_dependency());
}

#[test]
fn constructor_cycle_is_reported() {
    init_tracing();
    let h = sample_hierarchy();
    let bindings = Bindings::new();
    let mut builder = PlanBuilder::new(&h, &bindings);

    let err = builder.build_by_name("app.Ping").unwrap_err();
    assert!(err.is_cycle());
    assert_eq!(err, ResolutionError::CycleDetected("app.Ping".into()));

    // the pass stays usable after a failed request
    assert!(builder.build_by_name("app.Logger").unwrap().is_injectable());
}

#[test]
fn package_is_not_injectable() {
    let h = sample_hierarchy();
    let bindings = Bindings::new();
    let err = PlanBuilder::new(&h, &bindings)
        .build_by_name("app")
        .unwrap_err();
    assert_eq!(err, ResolutionError::NotInjectable("app".into()));
}

#[test]
fn unknown_name_is_hierarchy_error() {
    let h = sample_hierarchy();
    let bindings = Bindings::new();
    let err = PlanBuilder::new(&h, &bindings)
        .build_by_name("app.Nope")
        .unwrap_err();
    assert_eq!(
        err,
        ResolutionError::Hierarchy(HierarchyError::NameNotFound("app.Nope".into()))
    );
}

#[test]
fn depth_budget_is_enforced() {
    let h = sample_hierarchy();
    let bindings = Bindings::new();
    let mut builder =
        PlanBuilder::new(&h, &bindings).with_config(BuilderConfig::new().with_max_depth(2));

    let err = builder.build_by_name("app.Server").unwrap_err();
    assert_eq!(
        err,
        ResolutionError::DepthExceeded {
            name: "app.Logger".into(),
            max_depth: 2,
        }
    );
    assert_eq!(builder.config().max_depth, 2);
}

#[derive(Debug)]
struct NumericPorts(MemoryHierarchy);

impl ClassHierarchy for NumericPorts {
    fn node(&self, full_name: &str) -> Result<NodeRef, HierarchyError> {
        self.0.node(full_name)
    }

    fn constructors(&self, class: &dyn Node) -> &[ConstructorRef] {
        self.0.constructors(class)
    }

    fn implementations(&self, class: &dyn Node) -> &[NodeRef] {
        self.0.implementations(class)
    }

    fn default_value(&self, param: &dyn Node) -> Option<&str> {
        self.0.default_value(param)
    }

    fn parse(&self, node: &dyn Node, value: &str) -> Result<InstanceValue, HierarchyError> {
        value
            .parse::<u16>()
            .map(|_| InstanceValue::new(value))
            .map_err(|e| HierarchyError::parse_failed(node.full_name(), value, e.to_string()))
    }
}

#[test]
fn default_value_goes_through_hierarchy_parse() {
    let mut inner = MemoryHierarchy::new();
    inner.add_named_parameter("net.Port", Some("eighty")).unwrap();
    inner.add_class("net.Listener").unwrap();
    inner.add_constructor("net.Listener", &["net.Port"]).unwrap();
    let h = NumericPorts(inner);

    let bindings = Bindings::new();
    let err = PlanBuilder::new(&h, &bindings)
        .build_by_name("net.Listener")
        .unwrap_err();
    assert!(matches!(
        err,
        ResolutionError::Hierarchy(HierarchyError::ParseFailed { ref value, .. }) if value == "eighty"
    ));
}
