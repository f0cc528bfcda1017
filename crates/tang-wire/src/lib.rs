//! Tang Wire
//!
//! Persistence of injection plans: a tagged record per plan node, two byte
//! encodings, and whole-file reads and writes.
//!
//! # Overview
//!
//! - [`PlanRecord`]: `name` plus exactly one of `constructor`, `subplan`,
//!   `instance`
//! - [`encode`] / [`decode`]: plan tree to record tree and back, resolving
//!   names through a [`ClassHierarchy`](tang_types::ClassHierarchy)
//! - [`WireFormat`]: `bincode` or JSON
//! - [`WireConfig`]: encoding plus the nesting limit enforced on every read
//!   and write
//! - [`write_plan`] / [`read_plan`]: atomic file persistence
//!
//! # Example
//!
//! ```rust
//! use tang_plan::{Bindings, PlanBuilder};
//! use tang_types::MemoryHierarchy;
//! use tang_wire::{from_bytes, to_bytes, WireConfig};
//!
//! let mut hierarchy = MemoryHierarchy::new();
//! hierarchy.add_class("app.Clock").unwrap();
//! hierarchy.add_constructor("app.Clock", &[]).unwrap();
//!
//! let bindings = Bindings::new();
//! let plan = PlanBuilder::new(&hierarchy, &bindings)
//!     .build_by_name("app.Clock")
//!     .unwrap();
//!
//! let config = WireConfig::new();
//! let bytes = to_bytes(&plan, &config).unwrap();
//! let restored = from_bytes(&hierarchy, &bytes, &config).unwrap();
//! assert_eq!(restored.to_string(), plan.to_string());
//! ```

#![warn(missing_docs)]

mod codec;
mod error;
mod file;
mod format;
mod record;

// Re-exports
pub use codec::{decode, decode_with_limit, encode};
pub use error::{WireError, WireResult};
pub use file::{read_plan, write_plan};
pub use format::{from_bytes, record_from_bytes, record_to_bytes, to_bytes, WireConfig, WireFormat};
pub use record::{
    ConstructorRecord, InstanceRecord, PlanRecord, RecordCase, SubplanRecord,
    DEFAULT_MAX_RECORD_DEPTH, NO_SELECTION,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
