//! Tang Plan
//!
//! Injection plans: trees describing every way a requested type could be
//! constructed, with the queries needed to decide whether exactly one way
//! exists and to explain why not.
//!
//! # Overview
//!
//! - [`InjectionPlan`] / [`PlanKind`]: the plan tree (instance, constructor,
//!   subplan)
//! - [`PlanBuilder`] / [`Bindings`]: build plans from a
//!   [`ClassHierarchy`](tang_types::ClassHierarchy)
//! - [`PlanCache`] / [`CacheEntry`]: tri-state memoization for one pass
//! - [`SetValuedKey`]: composite cache keys
//! - [`prettify`]: indented rendering of flat plan strings
//!
//! # Example
//!
//! ```rust
//! use tang_plan::{Bindings, PlanBuilder};
//! use tang_types::MemoryHierarchy;
//!
//! let mut hierarchy = MemoryHierarchy::new();
//! hierarchy.add_class("app.Clock").unwrap();
//! hierarchy.add_class("app.SystemClock").unwrap();
//! hierarchy.add_class("app.FakeClock").unwrap();
//! hierarchy.add_constructor("app.SystemClock", &[]).unwrap();
//! hierarchy.add_constructor("app.FakeClock", &[]).unwrap();
//! hierarchy.add_implementation("app.Clock", "app.SystemClock").unwrap();
//! hierarchy.add_implementation("app.Clock", "app.FakeClock").unwrap();
//!
//! let bindings = Bindings::new();
//! let plan = PlanBuilder::new(&hierarchy, &bindings)
//!     .build_by_name("app.Clock")
//!     .unwrap();
//!
//! assert!(plan.is_ambiguous());
//! assert!(plan
//!     .to_cant_inject_string()
//!     .unwrap()
//!     .starts_with("Ambiguous subplan app.Clock: 2 alternatives"));
//! ```

#![warn(missing_docs)]

mod builder;
mod cache;
mod config;
mod error;
mod key;
mod plan;
mod pretty;

// Re-exports
pub use builder::{Bindings, PlanBuilder};
pub use cache::{CacheEntry, PlanCache};
pub use config::{BuilderConfig, DEFAULT_MAX_DEPTH};
pub use error::{PlanError, ResolutionError, ResolutionResult};
pub use key::SetValuedKey;
pub use plan::{InjectionPlan, PlanKind};
pub use pretty::prettify;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
