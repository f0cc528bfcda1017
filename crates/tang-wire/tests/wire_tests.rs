use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tang_plan::{Bindings, InjectionPlan, PlanBuilder, PlanKind};
use tang_test_utils::{
    build, constructor, deep_shape, init_tracing, instance, sample_hierarchy, sample_plans,
    shape, shape_plan, subplan, unbound,
};
use tang_types::{HierarchyError, MemoryHierarchy};
use tang_wire::{
    decode, encode, from_bytes, read_plan, to_bytes, write_plan, PlanRecord, WireConfig,
    WireError, WireFormat,
};

const FORMATS: [WireFormat; 2] = [WireFormat::Binary, WireFormat::Json];

fn config(format: WireFormat) -> WireConfig {
    WireConfig::new().with_format(format)
}

fn round_trip(h: &MemoryHierarchy, plan: &InjectionPlan, format: WireFormat) -> InjectionPlan {
    let bytes = to_bytes(plan, &config(format)).unwrap();
    from_bytes(h, &bytes, &config(format)).unwrap()
}

fn variant(plan: &InjectionPlan) -> &'static str {
    match plan.kind() {
        PlanKind::Instance(_) => "instance",
        PlanKind::Constructor { .. } => "constructor",
        PlanKind::Subplan { .. } => "subplan",
    }
}

// Node for node: identity, variant, selection, value and future flag
fn same_tree(restored: &InjectionPlan, original: &InjectionPlan) -> Result<(), TestCaseError> {
    let mut pending = vec![(restored, original)];
    while let Some((a, b)) = pending.pop() {
        prop_assert_eq!(a.node().full_name(), b.node().full_name());
        prop_assert_eq!(variant(a), variant(b));
        prop_assert_eq!(a.selected_index(), b.selected_index());
        prop_assert_eq!(
            a.value().map(|v| v.as_str()),
            b.value().map(|v| v.as_str())
        );
        prop_assert_eq!(a.is_deferred(), b.is_deferred());
        prop_assert_eq!(a.children().len(), b.children().len());
        pending.extend(a.children().iter().zip(b.children()));
    }
    Ok(())
}

fn assert_same_plan(restored: &InjectionPlan, original: &InjectionPlan) {
    assert_eq!(restored.to_pretty_string(), original.to_pretty_string());
    assert_eq!(restored.num_alternatives(), original.num_alternatives());
    assert_eq!(restored.is_ambiguous(), original.is_ambiguous());
    assert_eq!(
        restored.has_future_dependency(),
        original.has_future_dependency()
    );
    assert_eq!(encode(restored), encode(original));
}

#[test]
fn sample_plans_survive_both_encodings() {
    init_tracing();
    let h = sample_hierarchy();
    for plan in sample_plans(&h) {
        for format in FORMATS {
            assert_same_plan(&round_trip(&h, &plan, format), &plan);
        }
    }
}

fn chain_hierarchy(len: usize) -> MemoryHierarchy {
    let mut h = MemoryHierarchy::new();
    for i in 0..len {
        h.add_class(&format!("app.C{i}")).unwrap();
    }
    for i in 0..len - 1 {
        let next = format!("app.C{}", i + 1);
        h.add_constructor(&format!("app.C{i}"), &[next.as_str()])
            .unwrap();
    }
    h.add_constructor(&format!("app.C{}", len - 1), &[]).unwrap();
    h
}

#[test]
fn longest_default_chain_survives_both_encodings() {
    let h = chain_hierarchy(30);
    let bindings = Bindings::new();
    let plan = PlanBuilder::new(&h, &bindings).build_by_name("app.C0").unwrap();
    assert!(plan.is_injectable());
    assert_eq!(encode(&plan).depth(), 60);

    for format in FORMATS {
        assert_same_plan(&round_trip(&h, &plan, format), &plan);
    }
}

#[test]
fn plan_deeper_than_limit_is_not_written() {
    let h = chain_hierarchy(30);
    let plan = build(&h, &Bindings::new(), "app.C0");
    let narrow = WireConfig::new().with_max_depth(10);

    let err = to_bytes(&plan, &narrow).unwrap_err();
    assert!(matches!(err, WireError::TooDeep { max_depth: 10 }));

    let bytes = to_bytes(&plan, &WireConfig::new()).unwrap();
    let err = from_bytes(&h, &bytes, &narrow).unwrap_err();
    assert!(matches!(err, WireError::TooDeep { max_depth: 10 }));
}

#[test]
fn hand_assembled_plan_survives_both_encodings() {
    let h = sample_hierarchy();
    let logger = constructor(&h, "app.Logger", Vec::new());
    let server = constructor(&h, "app.Server", vec![logger, instance(&h, "app.Port", "9090")]);
    let clock = subplan(
        &h,
        "app.Clock",
        vec![
            unbound(&h, "app.SystemClock"),
            subplan(&h, "app.FakeClock", vec![constructor(&h, "app.FakeClock", Vec::new())]),
        ],
    );
    assert_eq!(clock.selected_index(), Some(1));

    for plan in [server, clock] {
        for format in FORMATS {
            assert_same_plan(&round_trip(&h, &plan, format), &plan);
        }
    }
}

#[test]
fn decoded_plan_explains_itself_the_same_way() {
    let h = sample_hierarchy();
    let plan = build(&h, &Bindings::new(), "app.Client");
    let restored = decode(&h, &encode(&plan)).unwrap();

    assert_eq!(
        restored.to_cant_inject_string().unwrap(),
        plan.to_cant_inject_string().unwrap()
    );
}

fn two_implementations(with_broken: bool) -> MemoryHierarchy {
    let mut h = MemoryHierarchy::new();
    h.add_class("app.Store").unwrap();
    h.add_class("app.MemoryStore").unwrap();
    h.add_constructor("app.MemoryStore", &[]).unwrap();
    if with_broken {
        h.add_named_parameter("app.Url", None).unwrap();
        h.add_class("app.SqlStore").unwrap();
        h.add_constructor("app.SqlStore", &["app.Url"]).unwrap();
        h.add_implementation("app.Store", "app.SqlStore").unwrap();
    }
    h.add_implementation("app.Store", "app.MemoryStore").unwrap();
    h
}

#[test]
fn missing_alternative_identity_fails_decode() {
    let full = two_implementations(true);
    let plan = build(&full, &Bindings::new(), "app.Store");
    assert_eq!(plan.selected_index(), Some(1));

    let record = encode(&plan);
    assert_eq!(record.subplan.as_ref().unwrap().selected_plan, 1);
    assert_eq!(record.subplan.as_ref().unwrap().plans.len(), 2);

    let partial = two_implementations(false);
    let err = decode(&partial, &record).unwrap_err();
    assert!(err.is_structural());
    assert!(matches!(
        err,
        WireError::Unresolved {
            ref name,
            source: HierarchyError::NameNotFound(_),
        } if name == "app.SqlStore"
    ));
}

#[test]
fn malformed_record_fails_decode() {
    let h = sample_hierarchy();
    let mut record = PlanRecord::new_instance("app.Port", "80");
    record.instance = None;

    let err = decode(&h, &record).unwrap_err();
    assert!(matches!(err, WireError::Malformed { cases: 0, .. }));
}

#[test]
fn write_then_read_file() {
    let h = sample_hierarchy();
    let plan = build(&h, &Bindings::new(), "app.Parent");
    let dir = tempfile::tempdir().unwrap();

    for (file, format) in [("plan.bin", WireFormat::Binary), ("plan.json", WireFormat::Json)] {
        let path = dir.path().join("nested").join(file);
        let config = WireConfig::new().with_format(format);

        write_plan(&path, &plan, &config).unwrap();
        let restored = read_plan(&path, &h, &config).unwrap();
        assert_same_plan(&restored, &plan);
    }

    let mut files: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    files.sort();
    assert_eq!(files, ["plan.bin", "plan.json"]);
}

#[test]
fn write_replaces_existing_file() {
    let h = sample_hierarchy();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.bin");
    let config = WireConfig::new();

    write_plan(&path, &build(&h, &Bindings::new(), "app.Logger"), &config).unwrap();
    let server = build(&h, &Bindings::new(), "app.Server");
    write_plan(&path, &server, &config).unwrap();

    let restored = read_plan(&path, &h, &config).unwrap();
    assert_eq!(restored.node().full_name(), "app.Server");
}

#[test]
fn concurrent_writers_leave_one_whole_plan() {
    let h = sample_hierarchy();
    let plans = sample_plans(&h);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.bin");
    let config = WireConfig::new();

    std::thread::scope(|scope| {
        for plan in &plans {
            let path = &path;
            let config = &config;
            scope.spawn(move || write_plan(path, plan, config).unwrap());
        }
    });

    let restored = read_plan(&path, &h, &config).unwrap();
    assert!(plans
        .iter()
        .any(|plan| plan.to_pretty_string() == restored.to_pretty_string()));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn failed_write_leaves_no_file() {
    let h = sample_hierarchy();
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let path = blocker.join("plan.bin");

    let err = write_plan(&path, &build(&h, &Bindings::new(), "app.Logger"), &WireConfig::new())
        .unwrap_err();
    assert!(matches!(err, WireError::Io { .. }));
    assert!(!err.is_structural());
    assert!(!path.exists());
}

#[test]
fn missing_file_is_io_error() {
    let h = sample_hierarchy();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.bin");

    let err = read_plan(&path, &h, &WireConfig::new()).unwrap_err();
    assert!(matches!(err, WireError::Io { .. }));
}

#[test]
fn json_file_is_rejected_by_binary_reader() {
    let h = sample_hierarchy();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.json");
    let plan = build(&h, &Bindings::new(), "app.Server");

    write_plan(&path, &plan, &WireConfig::new().with_format(WireFormat::Json)).unwrap();
    let err = read_plan(&path, &h, &WireConfig::new()).unwrap_err();
    assert!(!matches!(err, WireError::Io { .. }));
}

proptest! {
    #[test]
    fn prop_bound_values_are_preserved(value in "\\PC{0,24}") {
        let h = sample_hierarchy();
        let bindings = Bindings::new().with_instance("app.Port", value.clone());
        let plan = build(&h, &bindings, "app.Server");

        for format in FORMATS {
            let restored = round_trip(&h, &plan, format);
            let args = restored.delegated_plan().unwrap().args().unwrap();
            prop_assert_eq!(args[1].value().unwrap().as_str(), value.as_str());
        }
    }

    #[test]
    fn prop_random_trees_round_trip(shape in shape(5)) {
        let (h, plan) = shape_plan(&shape);
        for format in FORMATS {
            same_tree(&round_trip(&h, &plan, format), &plan)?;
        }
        same_tree(&decode(&h, &encode(&plan)).unwrap(), &plan)?;
    }

    #[test]
    fn prop_deep_trees_round_trip(shape in deep_shape(45..120)) {
        let (h, plan) = shape_plan(&shape);
        prop_assert!(encode(&plan).depth() > 45);
        for format in FORMATS {
            same_tree(&round_trip(&h, &plan, format), &plan)?;
        }
    }
}
