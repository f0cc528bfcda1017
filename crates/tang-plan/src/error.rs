//! Error types for plan queries and plan resolution
//!
//! Infeasible and ambiguous plans are not errors; they are queryable states
//! of a valid plan. The errors here are protocol violations by the caller
//! and failures of the resolution pass itself.

use tang_types::HierarchyError;

/// Errors raised by plan queries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Asked why an injectable plan cannot be injected
    #[error("to_cant_inject_string() called on injectable plan {name}:\n{plan}")]
    CalledOnInjectable {
        /// Full name of the plan's node
        name: String,
        /// Pretty form of the plan
        plan: String,
    },

    /// Asked for an ambiguity explanation of a plan that is not ambiguous
    #[error("{0} is not ambiguous")]
    NotAmbiguous(String),

    /// Asked for an infeasibility explanation of a plan that is feasible
    #[error("{0} is not infeasible")]
    NotInfeasible(String),

    /// Queried a cache slot whose plan is still being built
    #[error("plan for {0} used before its resolution finished")]
    UsedBeforeReady(String),

    /// Subplan selection disagrees with its alternatives
    #[error("subplan {name} cannot select {selected:?}; its alternatives select {expected:?}")]
    InvalidSelection {
        /// Full name of the subplan's node
        name: String,
        /// Selection that was asked for
        selected: Option<usize>,
        /// Selection the alternatives imply
        expected: Option<usize>,
    },
}

impl PlanError {
    /// True if the caller broke the query protocol
    ///
    /// Contract violations are programming errors and must be surfaced,
    /// never retried or ignored.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::InvalidSelection { .. })
    }
}

/// Errors raised while building plans
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Re-entrant request for a node whose plan is being built
    #[error("cycle detected while resolving {0}")]
    CycleDetected(String),

    /// A finished slot was reopened in the same pass
    #[error("{0} is already resolved in this pass")]
    AlreadyResolved(String),

    /// Finish was called on a slot that was never begun
    #[error("{0} is not being resolved")]
    NotInProgress(String),

    /// Recursion went past the configured depth budget
    #[error("resolution of {name} exceeded depth budget {max_depth}")]
    DepthExceeded {
        /// Node whose resolution hit the budget
        name: String,
        /// Configured budget
        max_depth: usize,
    },

    /// Packages have no plan
    #[error("{0} is a package and cannot be injected")]
    NotInjectable(String),

    /// Class hierarchy lookup failed
    #[error("class hierarchy: {0}")]
    Hierarchy(#[from] HierarchyError),
}

impl ResolutionError {
    /// True for a constructor cycle not broken by a future dependency
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CycleDetected(_))
    }
}

/// Result type alias for plan resolution
pub type ResolutionResult<T> = Result<T, ResolutionError>;
