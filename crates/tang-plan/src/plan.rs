//! Injection plan tree
//!
//! An [`InjectionPlan`] describes every way of building a value for one node
//! identity. The tree is a closed sum over three shapes ([`PlanKind`]):
//!
//! - **Instance**: a terminal value, always exactly one alternative
//! - **Constructor**: one constructor applied to one plan per parameter;
//!   alternatives multiply
//! - **Subplan**: competing alternatives for the same node; alternatives add
//!
//! Plans are immutable once built. Alternative counts are computed at
//! construction and saturate instead of overflowing.

use crate::error::PlanError;
use std::fmt::{self, Display, Formatter};
use tang_types::{ConstructorRef, InstanceValue, NodeRef};

/// A recipe (or set of competing recipes) for one node
#[derive(Debug, Clone)]
pub struct InjectionPlan {
    node: NodeRef,
    kind: PlanKind,
    num_alternatives: usize,
    deferred: bool,
}

/// Shape of a plan node
#[derive(Debug, Clone)]
pub enum PlanKind {
    /// Resolved terminal value
    Instance(InstanceValue),

    /// Constructor call with one child plan per parameter, in declaration order
    Constructor {
        /// Chosen signature
        constructor: ConstructorRef,
        /// Argument plans
        args: Vec<InjectionPlan>,
    },

    /// Alternative plans for the same node
    Subplan {
        /// Candidates, in enumeration order
        alternatives: Vec<InjectionPlan>,
        /// The unique feasible, non-ambiguous alternative, once proven
        selected: Option<usize>,
    },
}

impl InjectionPlan {
    /// Terminal value plan
    #[must_use]
    pub fn instance(node: NodeRef, value: InstanceValue) -> Self {
        Self {
            node,
            kind: PlanKind::Instance(value),
            num_alternatives: 1,
            deferred: false,
        }
    }

    /// Constructor plan; feasible combinations are the product of the
    /// children's counts
    #[must_use]
    pub fn constructor(node: NodeRef, constructor: ConstructorRef, args: Vec<Self>) -> Self {
        let num_alternatives = args
            .iter()
            .fold(1usize, |acc, arg| acc.saturating_mul(arg.num_alternatives));
        Self {
            node,
            kind: PlanKind::Constructor { constructor, args },
            num_alternatives,
            deferred: false,
        }
    }

    /// Subplan over `alternatives`; selects the winner when exactly one
    /// alternative is feasible and it is not ambiguous
    #[must_use]
    pub fn subplan(node: NodeRef, alternatives: Vec<Self>) -> Self {
        let num_alternatives = alternatives
            .iter()
            .fold(0usize, |acc, alt| acc.saturating_add(alt.num_alternatives));
        let selected = unique_selection(&alternatives);
        Self {
            node,
            kind: PlanKind::Subplan {
                alternatives,
                selected,
            },
            num_alternatives,
            deferred: false,
        }
    }

    /// Subplan carrying a previously recorded selection
    ///
    /// # Errors
    /// [`PlanError::InvalidSelection`] if `selected` is not the alternative
    /// [`InjectionPlan::subplan`] would pick for the same alternatives
    pub fn subplan_with_selection(
        node: NodeRef,
        selected: Option<usize>,
        alternatives: Vec<Self>,
    ) -> Result<Self, PlanError> {
        let plan = Self::subplan(node, alternatives);
        let expected = plan.selected_index();
        if selected == expected {
            Ok(plan)
        } else {
            Err(PlanError::InvalidSelection {
                name: plan.node.full_name().to_string(),
                selected,
                expected,
            })
        }
    }

    /// Mark this node as supplied after the enclosing object exists
    #[inline]
    #[must_use]
    pub fn into_deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Node identity this plan resolves
    #[inline]
    #[must_use]
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    /// Plan shape
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &PlanKind {
        &self.kind
    }

    /// Number of complete construction paths; 0 means infeasible
    #[inline]
    #[must_use]
    pub fn num_alternatives(&self) -> usize {
        self.num_alternatives
    }

    /// At least one construction path exists
    #[inline]
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.num_alternatives > 0
    }

    /// More than one construction path exists with no rule to prefer one
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        match &self.kind {
            PlanKind::Instance(_) => false,
            PlanKind::Constructor { args, .. } => {
                self.num_alternatives > 1
                    || (self.num_alternatives == 1 && args.iter().any(Self::is_ambiguous))
            }
            PlanKind::Subplan { alternatives, .. } => {
                self.num_alternatives > 1
                    || (self.num_alternatives == 1
                        && alternatives
                            .iter()
                            .any(|alt| alt.is_feasible() && alt.is_ambiguous()))
            }
        }
    }

    /// Feasible, unambiguous and free of future dependencies
    #[inline]
    #[must_use]
    pub fn is_injectable(&self) -> bool {
        self.is_feasible() && !self.is_ambiguous() && !self.has_future_dependency()
    }

    /// This node was marked deferred
    #[inline]
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// This node or any descendant is deferred
    #[must_use]
    pub fn has_future_dependency(&self) -> bool {
        self.deferred || self.children().iter().any(Self::has_future_dependency)
    }

    /// This node is itself the reason its subtree is infeasible
    ///
    /// Only a subplan with no candidates at all qualifies: nothing is bound
    /// to the node and nothing implements it.
    #[must_use]
    pub fn is_infeasible_leaf(&self) -> bool {
        match &self.kind {
            PlanKind::Subplan { alternatives, .. } => alternatives.is_empty(),
            PlanKind::Instance(_) | PlanKind::Constructor { .. } => false,
        }
    }

    /// Direct children in order (empty for an instance)
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            PlanKind::Instance(_) => &[],
            PlanKind::Constructor { args, .. } => args,
            PlanKind::Subplan { alternatives, .. } => alternatives,
        }
    }

    /// Terminal value of an instance plan
    #[must_use]
    pub fn value(&self) -> Option<&InstanceValue> {
        match &self.kind {
            PlanKind::Instance(value) => Some(value),
            _ => None,
        }
    }

    /// Signature of a constructor plan
    #[must_use]
    pub fn constructor_def(&self) -> Option<&ConstructorRef> {
        match &self.kind {
            PlanKind::Constructor { constructor, .. } => Some(constructor),
            _ => None,
        }
    }

    /// Argument plans of a constructor plan
    #[must_use]
    pub fn args(&self) -> Option<&[Self]> {
        match &self.kind {
            PlanKind::Constructor { args, .. } => Some(args.as_slice()),
            _ => None,
        }
    }

    /// Candidate plans of a subplan
    #[must_use]
    pub fn alternatives(&self) -> Option<&[Self]> {
        match &self.kind {
            PlanKind::Subplan { alternatives, .. } => Some(alternatives.as_slice()),
            _ => None,
        }
    }

    /// Selected alternative index of a subplan
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        match &self.kind {
            PlanKind::Subplan { selected, .. } => *selected,
            _ => None,
        }
    }

    /// The selected alternative of a subplan
    #[must_use]
    pub fn delegated_plan(&self) -> Option<&Self> {
        match &self.kind {
            PlanKind::Subplan {
                alternatives,
                selected: Some(index),
            } => alternatives.get(*index),
            _ => None,
        }
    }

    /// One-line form of just this node
    ///
    /// `Foo` for an instance, `Foo(Bar,Baz)` for a constructor (argument
    /// names), `Foo[A|B]` for a subplan (alternative names).
    #[must_use]
    pub fn to_shallow_string(&self) -> String {
        let name = self.node.name();
        match &self.kind {
            PlanKind::Instance(_) => name.to_string(),
            PlanKind::Constructor { args, .. } => format!("{name}({})", child_names(args, ",")),
            PlanKind::Subplan { alternatives, .. } => {
                format!("{name}[{}]", child_names(alternatives, "|"))
            }
        }
    }

    /// Why this plan cannot be injected
    ///
    /// # Errors
    /// [`PlanError::CalledOnInjectable`] if the plan is injectable
    pub fn to_cant_inject_string(&self) -> Result<String, PlanError> {
        if !self.is_feasible() {
            self.to_infeasible_inject_string()
        } else if self.is_ambiguous() {
            self.to_ambiguous_inject_string()
        } else if self.has_future_dependency() {
            Ok(format!(
                "{} depends on a future and can only be wired after construction:\n{}",
                self.node.full_name(),
                self.to_pretty_string()
            ))
        } else {
            Err(PlanError::CalledOnInjectable {
                name: self.node.full_name().to_string(),
                plan: self.to_pretty_string(),
            })
        }
    }

    /// Which choices make this plan ambiguous
    ///
    /// # Errors
    /// [`PlanError::NotAmbiguous`] if the plan is not ambiguous
    pub fn to_ambiguous_inject_string(&self) -> Result<String, PlanError> {
        let full_name = self.node.full_name();
        if !self.is_ambiguous() {
            return Err(PlanError::NotAmbiguous(full_name.to_string()));
        }
        match &self.kind {
            PlanKind::Instance(_) => Err(PlanError::NotAmbiguous(full_name.to_string())),
            PlanKind::Constructor { args, .. } => {
                let reasons = args
                    .iter()
                    .filter(|arg| arg.is_ambiguous())
                    .map(Self::to_ambiguous_inject_string)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!(
                    "{full_name} has ambiguous arguments: [ {} ]",
                    reasons.join(" ")
                ))
            }
            PlanKind::Subplan { alternatives, .. } => {
                let feasible: Vec<&Self> =
                    alternatives.iter().filter(|alt| alt.is_feasible()).collect();
                if let [only] = feasible.as_slice() {
                    return only.to_ambiguous_inject_string();
                }
                let mut out = format!(
                    "Ambiguous subplan {full_name}: {} alternatives are feasible [",
                    feasible.len()
                );
                for alt in feasible {
                    out.push_str("\n  ");
                    out.push_str(&alt.to_shallow_string());
                    if alt.is_ambiguous() {
                        out.push_str(" (ambiguous)");
                    }
                }
                out.push_str("\n]");
                Ok(out)
            }
        }
    }

    /// Which missing pieces make this plan infeasible
    ///
    /// Descends to the first infeasible argument that is not itself a leaf,
    /// so the message names the root cause rather than the whole subtree.
    ///
    /// # Errors
    /// [`PlanError::NotInfeasible`] if the plan is feasible
    pub fn to_infeasible_inject_string(&self) -> Result<String, PlanError> {
        let full_name = self.node.full_name();
        if self.is_feasible() {
            return Err(PlanError::NotInfeasible(full_name.to_string()));
        }
        match &self.kind {
            PlanKind::Instance(_) => Err(PlanError::NotInfeasible(full_name.to_string())),
            PlanKind::Constructor { args, .. } => {
                let mut leaves = Vec::new();
                for arg in args.iter().filter(|arg| !arg.is_feasible()) {
                    if arg.is_infeasible_leaf() {
                        leaves.push(arg.node.full_name());
                    } else {
                        return arg.to_infeasible_inject_string();
                    }
                }
                match leaves.as_slice() {
                    [] => Err(PlanError::NotInfeasible(full_name.to_string())),
                    [leaf] => Ok(format!("{full_name} missing argument {leaf}")),
                    many => Ok(format!(
                        "{full_name} missing arguments: [ {} ]",
                        many.join(" ")
                    )),
                }
            }
            PlanKind::Subplan { alternatives, .. } => match alternatives.as_slice() {
                [] => Ok(format!(
                    "No known implementations / injectable constructors for {full_name}"
                )),
                [only] => only.to_infeasible_inject_string(),
                _ => Ok(format!(
                    "No alternative of {full_name} has all its arguments feasible:\n{}",
                    self.to_pretty_string()
                )),
            },
        }
    }

    fn write_deep(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.node.name())?;
        match &self.kind {
            PlanKind::Instance(_) => Ok(()),
            PlanKind::Constructor { args, .. } => write_children(f, args, '(', ',', ')'),
            PlanKind::Subplan { alternatives, .. } => {
                write_children(f, alternatives, '[', '|', ']')
            }
        }
    }
}

/// Deep form: every descendant's shallow form with the same punctuation
impl Display for InjectionPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_deep(f)
    }
}

fn unique_selection(alternatives: &[InjectionPlan]) -> Option<usize> {
    let mut feasible = alternatives
        .iter()
        .enumerate()
        .filter(|(_, alt)| alt.is_feasible());
    match (feasible.next(), feasible.next()) {
        (Some((index, alt)), None) if !alt.is_ambiguous() => Some(index),
        _ => None,
    }
}

fn child_names(children: &[InjectionPlan], separator: &str) -> String {
    children
        .iter()
        .map(|child| child.node.name())
        .collect::<Vec<_>>()
        .join(separator)
}

fn write_children(
    f: &mut Formatter<'_>,
    children: &[InjectionPlan],
    open: char,
    separator: char,
    close: char,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{separator}")?;
        }
        child.write_deep(f)?;
    }
    write!(f, "{close}")
}
