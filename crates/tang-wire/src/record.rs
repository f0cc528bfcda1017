//! Persisted plan records
//!
//! One [`PlanRecord`] per plan node: the node's full name and exactly one
//! populated case. The record layout is flat and self-similar so both the
//! binary and the JSON encodings can carry it unchanged.
//!
//! Reading a record tree counts nesting as it goes and stops at a per-thread
//! limit, so hostile input fails with an error instead of exhausting the
//! stack.

use crate::error::{WireError, WireResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::cell::Cell;

/// Selection marker for a subplan with no selected alternative
pub const NO_SELECTION: i64 = -1;

/// Deepest record nesting read or written unless configured otherwise
pub const DEFAULT_MAX_RECORD_DEPTH: usize = 512;

/// One node of a persisted plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRecord {
    /// Full dotted name of the node
    pub name: String,
    /// Node is supplied after the enclosing object exists; absent means false
    pub future: bool,
    /// Constructor case
    pub constructor: Option<ConstructorRecord>,
    /// Subplan case
    pub subplan: Option<SubplanRecord>,
    /// Instance case
    pub instance: Option<InstanceRecord>,
}

// Field layout of `PlanRecord`, read behind the nesting guard
#[derive(Deserialize)]
#[serde(rename = "PlanRecord")]
struct RecordFields {
    name: String,
    #[serde(default)]
    future: bool,
    constructor: Option<ConstructorRecord>,
    subplan: Option<SubplanRecord>,
    instance: Option<InstanceRecord>,
}

/// Constructor case: argument records in parameter order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorRecord {
    /// Argument records
    pub args: Vec<PlanRecord>,
}

/// Subplan case: selected index and alternative records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubplanRecord {
    /// Index into `plans`, or [`NO_SELECTION`]
    pub selected_plan: i64,
    /// Alternative records
    pub plans: Vec<PlanRecord>,
}

/// Instance case: the value's string form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// String-encoded value
    pub value: String,
}

/// Borrowed view of the populated case of a record
#[derive(Debug, Clone, Copy)]
pub enum RecordCase<'a> {
    /// Constructor case
    Constructor(&'a ConstructorRecord),
    /// Subplan case
    Subplan(&'a SubplanRecord),
    /// Instance case
    Instance(&'a InstanceRecord),
}

impl PlanRecord {
    fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            future: false,
            constructor: None,
            subplan: None,
            instance: None,
        }
    }

    /// Constructor record
    #[must_use]
    pub fn new_constructor(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self {
            constructor: Some(ConstructorRecord { args }),
            ..Self::empty(name)
        }
    }

    /// Subplan record; `selected` of `None` is stored as [`NO_SELECTION`]
    #[must_use]
    pub fn new_subplan(name: impl Into<String>, selected: Option<usize>, plans: Vec<Self>) -> Self {
        let selected_plan = selected
            .and_then(|index| i64::try_from(index).ok())
            .unwrap_or(NO_SELECTION);
        Self {
            subplan: Some(SubplanRecord {
                selected_plan,
                plans,
            }),
            ..Self::empty(name)
        }
    }

    /// Instance record
    #[must_use]
    pub fn new_instance(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            instance: Some(InstanceRecord {
                value: value.into(),
            }),
            ..Self::empty(name)
        }
    }

    /// With the future flag set
    #[inline]
    #[must_use]
    pub fn with_future(mut self, future: bool) -> Self {
        self.future = future;
        self
    }

    /// The single populated case
    ///
    /// # Errors
    /// [`WireError::Malformed`] if none or several cases are populated
    pub fn case(&self) -> WireResult<RecordCase<'_>> {
        match (&self.constructor, &self.subplan, &self.instance) {
            (Some(c), None, None) => Ok(RecordCase::Constructor(c)),
            (None, Some(s), None) => Ok(RecordCase::Subplan(s)),
            (None, None, Some(i)) => Ok(RecordCase::Instance(i)),
            (c, s, i) => Err(WireError::Malformed {
                name: self.name.clone(),
                cases: usize::from(c.is_some()) + usize::from(s.is_some()) + usize::from(i.is_some()),
            }),
        }
    }

    /// Nesting depth of this subtree; a record without children is 1
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1usize)];
        while let Some((record, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(record.children().iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    fn children(&self) -> &[Self] {
        if let Some(c) = &self.constructor {
            c.args.as_slice()
        } else if let Some(s) = &self.subplan {
            s.plans.as_slice()
        } else {
            &[]
        }
    }
}

impl<'de> Deserialize<'de> for PlanRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let _level = Level::enter().map_err(|limit| {
            D::Error::custom(format_args!("plan records nested deeper than {limit}"))
        })?;
        let fields = RecordFields::deserialize(deserializer)?;
        Ok(Self {
            name: fields.name,
            future: fields.future,
            constructor: fields.constructor,
            subplan: fields.subplan,
            instance: fields.instance,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Nesting {
    depth: usize,
    limit: usize,
    exceeded: bool,
}

impl Nesting {
    const fn fresh(limit: usize) -> Self {
        Self {
            depth: 0,
            limit,
            exceeded: false,
        }
    }
}

thread_local! {
    static NESTING: Cell<Nesting> = const { Cell::new(Nesting::fresh(DEFAULT_MAX_RECORD_DEPTH)) };
}

/// Run `read` with record nesting capped at `limit`
///
/// Also reports whether any record was rejected for exceeding the cap.
pub(crate) fn with_nesting_limit<T>(limit: usize, read: impl FnOnce() -> T) -> (T, bool) {
    let outer = NESTING.with(|n| n.replace(Nesting::fresh(limit)));
    let _restore = Restore(outer);
    let value = read();
    let exceeded = NESTING.with(|n| n.get().exceeded);
    (value, exceeded)
}

struct Restore(Nesting);

impl Drop for Restore {
    fn drop(&mut self) {
        NESTING.with(|n| n.set(self.0));
    }
}

// One open record on the current thread
struct Level;

impl Level {
    fn enter() -> Result<Self, usize> {
        NESTING.with(|n| {
            let mut state = n.get();
            if state.depth >= state.limit {
                state.exceeded = true;
                n.set(state);
                return Err(state.limit);
            }
            state.depth += 1;
            n.set(state);
            Ok(Self)
        })
    }
}

impl Drop for Level {
    fn drop(&mut self) {
        NESTING.with(|n| {
            let mut state = n.get();
            state.depth = state.depth.saturating_sub(1);
            n.set(state);
        });
    }
}

impl SubplanRecord {
    /// Selected index, if any
    ///
    /// # Errors
    /// [`WireError::InvalidIndex`] for negative values other than
    /// [`NO_SELECTION`]
    pub fn selected(&self, name: &str) -> WireResult<Option<usize>> {
        if self.selected_plan == NO_SELECTION {
            return Ok(None);
        }
        usize::try_from(self.selected_plan)
            .map(Some)
            .map_err(|_| WireError::InvalidIndex {
                name: name.to_string(),
                index: self.selected_plan,
            })
    }
}
