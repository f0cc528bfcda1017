//! Plan tree to record tree and back
//!
//! Encoding is a pre-order walk that cannot fail. Decoding resolves every
//! name against the supplied hierarchy, which may differ from the one the
//! plan was built with; any name, signature or value it rejects fails the
//! whole decode.

use crate::error::{WireError, WireResult};
use crate::record::{PlanRecord, RecordCase, DEFAULT_MAX_RECORD_DEPTH};
use tang_plan::{InjectionPlan, PlanKind};
use tang_types::{ClassHierarchy, NodeRef};

/// Record tree for `plan`
#[must_use]
pub fn encode(plan: &InjectionPlan) -> PlanRecord {
    let name = plan.node().full_name();
    let record = match plan.kind() {
        PlanKind::Instance(value) => PlanRecord::new_instance(name, value.as_str()),
        PlanKind::Constructor { args, .. } => {
            PlanRecord::new_constructor(name, args.iter().map(encode).collect())
        }
        PlanKind::Subplan {
            alternatives,
            selected,
        } => PlanRecord::new_subplan(name, *selected, alternatives.iter().map(encode).collect()),
    };
    record.with_future(plan.is_deferred())
}

/// Plan tree for `record`, resolved against `hierarchy`
///
/// Records nested deeper than [`DEFAULT_MAX_RECORD_DEPTH`] are rejected; see
/// [`decode_with_limit`].
///
/// # Errors
/// - [`WireError::TooDeep`] past the default nesting limit
/// - [`WireError::Malformed`] for a record without exactly one case
/// - [`WireError::Unresolved`] for an unknown name, an argument sequence
///   matching no constructor, or a value the hierarchy cannot parse
/// - [`WireError::InvalidIndex`] / [`WireError::InvalidSelection`] for a
///   stored selection that does not fit the alternatives
pub fn decode<H: ClassHierarchy + ?Sized>(
    hierarchy: &H,
    record: &PlanRecord,
) -> WireResult<InjectionPlan> {
    decode_with_limit(hierarchy, record, DEFAULT_MAX_RECORD_DEPTH)
}

/// [`decode`] with records nested deeper than `max_depth` rejected before
/// they are visited
///
/// # Errors
/// As [`decode`], with [`WireError::TooDeep`] carrying `max_depth`
pub fn decode_with_limit<H: ClassHierarchy + ?Sized>(
    hierarchy: &H,
    record: &PlanRecord,
    max_depth: usize,
) -> WireResult<InjectionPlan> {
    Decoder {
        hierarchy,
        max_depth,
    }
    .decode(record, 1)
}

struct Decoder<'h, H: ?Sized> {
    hierarchy: &'h H,
    max_depth: usize,
}

impl<H: ClassHierarchy + ?Sized> Decoder<'_, H> {
    fn decode(&self, record: &PlanRecord, depth: usize) -> WireResult<InjectionPlan> {
        if depth > self.max_depth {
            return Err(WireError::TooDeep {
                max_depth: self.max_depth,
            });
        }
        let hierarchy = self.hierarchy;
        let case = record.case()?;
        let node = resolve(hierarchy, &record.name)?;

        let plan = match case {
            RecordCase::Constructor(constructor) => {
                let arg_nodes = constructor
                    .args
                    .iter()
                    .map(|arg| resolve(hierarchy, &arg.name))
                    .collect::<WireResult<Vec<_>>>()?;
                let signature = hierarchy
                    .constructor(node.as_ref(), &arg_nodes)
                    .map_err(|e| WireError::unresolved(&record.name, e))?;
                let args = self.decode_all(&constructor.args, depth)?;
                InjectionPlan::constructor(node, signature, args)
            }
            RecordCase::Subplan(subplan) => {
                let selected = subplan.selected(&record.name)?;
                let alternatives = self.decode_all(&subplan.plans, depth)?;
                InjectionPlan::subplan_with_selection(node, selected, alternatives)
                    .map_err(WireError::InvalidSelection)?
            }
            RecordCase::Instance(instance) => {
                let value = hierarchy
                    .parse(node.as_ref(), &instance.value)
                    .map_err(|e| WireError::unresolved(&record.name, e))?;
                InjectionPlan::instance(node, value)
            }
        };

        Ok(if record.future {
            plan.into_deferred()
        } else {
            plan
        })
    }

    fn decode_all(&self, records: &[PlanRecord], depth: usize) -> WireResult<Vec<InjectionPlan>> {
        records.iter().map(|r| self.decode(r, depth + 1)).collect()
    }
}

fn resolve<H: ClassHierarchy + ?Sized>(hierarchy: &H, name: &str) -> WireResult<NodeRef> {
    hierarchy
        .node(name)
        .map_err(|e| WireError::unresolved(name, e))
}
