//! Per-pass resolution cache
//!
//! Each slot is either in progress or ready; a missing slot is absent. A slot
//! is opened with [`PlanCache::begin`] before its plan is computed, so a
//! re-entrant request for the same key finds it in progress and is reported
//! as a cycle instead of recursing forever.
//!
//! The cache belongs to one resolution pass and is not shared between
//! threads.

use crate::error::{PlanError, ResolutionError};
use crate::key::SetValuedKey;
use crate::plan::InjectionPlan;
use std::collections::HashMap;
use std::hash::Hash;
use tang_types::NodeRef;

/// State of one cache slot
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// Plan for the node is still being built
    InProgress(NodeRef),

    /// Finished plan
    Ready(InjectionPlan),
}

impl CacheEntry {
    /// Node the slot belongs to
    #[must_use]
    pub fn node(&self) -> &NodeRef {
        match self {
            Self::InProgress(node) => node,
            Self::Ready(plan) => plan.node(),
        }
    }

    /// True once the plan is finished
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The finished plan
    ///
    /// # Errors
    /// [`PlanError::UsedBeforeReady`] while the slot is in progress
    pub fn plan(&self) -> Result<&InjectionPlan, PlanError> {
        match self {
            Self::Ready(plan) => Ok(plan),
            Self::InProgress(node) => Err(PlanError::UsedBeforeReady(node.full_name().to_string())),
        }
    }

    /// See [`InjectionPlan::num_alternatives`]
    ///
    /// # Errors
    /// [`PlanError::UsedBeforeReady`] while the slot is in progress
    pub fn num_alternatives(&self) -> Result<usize, PlanError> {
        self.plan().map(InjectionPlan::num_alternatives)
    }

    /// See [`InjectionPlan::is_ambiguous`]
    ///
    /// # Errors
    /// [`PlanError::UsedBeforeReady`] while the slot is in progress
    pub fn is_ambiguous(&self) -> Result<bool, PlanError> {
        self.plan().map(InjectionPlan::is_ambiguous)
    }

    /// See [`InjectionPlan::is_injectable`]
    ///
    /// # Errors
    /// [`PlanError::UsedBeforeReady`] while the slot is in progress
    pub fn is_injectable(&self) -> Result<bool, PlanError> {
        self.plan().map(InjectionPlan::is_injectable)
    }

    /// See [`InjectionPlan::has_future_dependency`]
    ///
    /// # Errors
    /// [`PlanError::UsedBeforeReady`] while the slot is in progress
    pub fn has_future_dependency(&self) -> Result<bool, PlanError> {
        self.plan().map(InjectionPlan::has_future_dependency)
    }

    /// See [`InjectionPlan::is_infeasible_leaf`]
    ///
    /// # Errors
    /// [`PlanError::UsedBeforeReady`] while the slot is in progress
    pub fn is_infeasible_leaf(&self) -> Result<bool, PlanError> {
        self.plan().map(InjectionPlan::is_infeasible_leaf)
    }

    /// See [`InjectionPlan::to_shallow_string`]
    ///
    /// # Errors
    /// [`PlanError::UsedBeforeReady`] while the slot is in progress
    pub fn to_shallow_string(&self) -> Result<String, PlanError> {
        self.plan().map(InjectionPlan::to_shallow_string)
    }

    /// See [`InjectionPlan::to_cant_inject_string`]
    ///
    /// # Errors
    /// [`PlanError::UsedBeforeReady`] while the slot is in progress, or the
    /// plan's own contract violation
    pub fn to_cant_inject_string(&self) -> Result<String, PlanError> {
        self.plan()?.to_cant_inject_string()
    }

    /// Children of a finished plan; an in-progress slot has none to descend
    /// into
    #[must_use]
    pub fn children(&self) -> &[InjectionPlan] {
        match self {
            Self::Ready(plan) => plan.children(),
            Self::InProgress(_) => &[],
        }
    }
}

/// Tri-state plan cache for one resolution pass
#[derive(Debug)]
pub struct PlanCache<K = SetValuedKey<String>> {
    entries: HashMap<K, CacheEntry>,
}

impl<K> Default for PlanCache<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq> PlanCache<K> {
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots, in progress or ready
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no slot exists
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of slots still in progress
    #[must_use]
    pub fn in_progress(&self) -> usize {
        self.entries.values().filter(|e| !e.is_ready()).count()
    }

    /// Slot for `key`, if any
    #[inline]
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Finished plan for `key`, or `None` if the slot is absent
    ///
    /// # Errors
    /// [`ResolutionError::CycleDetected`] if the slot is in progress
    pub fn lookup(&self, key: &K) -> Result<Option<InjectionPlan>, ResolutionError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(CacheEntry::Ready(plan)) => Ok(Some(plan.clone())),
            Some(CacheEntry::InProgress(node)) => {
                Err(ResolutionError::CycleDetected(node.full_name().to_string()))
            }
        }
    }

    /// Open the slot for `key`
    ///
    /// # Errors
    /// - [`ResolutionError::CycleDetected`] if the slot is already in progress
    /// - [`ResolutionError::AlreadyResolved`] if the slot is ready
    pub fn begin(&mut self, key: K, node: NodeRef) -> Result<(), ResolutionError> {
        match self.entries.get(&key) {
            Some(CacheEntry::InProgress(_)) => Err(ResolutionError::CycleDetected(
                node.full_name().to_string(),
            )),
            Some(CacheEntry::Ready(_)) => Err(ResolutionError::AlreadyResolved(
                node.full_name().to_string(),
            )),
            None => {
                self.entries.insert(key, CacheEntry::InProgress(node));
                Ok(())
            }
        }
    }

    /// Replace the in-progress slot for `key` with its finished plan
    ///
    /// # Errors
    /// [`ResolutionError::NotInProgress`] if the slot was not opened
    pub fn finish(&mut self, key: &K, plan: InjectionPlan) -> Result<InjectionPlan, ResolutionError> {
        match self.entries.get_mut(key) {
            Some(entry @ CacheEntry::InProgress(_)) => {
                *entry = CacheEntry::Ready(plan.clone());
                Ok(plan)
            }
            _ => Err(ResolutionError::NotInProgress(
                plan.node().full_name().to_string(),
            )),
        }
    }

    /// Drop an in-progress slot after its resolution failed
    ///
    /// Returns false if there was no in-progress slot for `key`.
    pub fn abandon(&mut self, key: &K) -> bool {
        if matches!(self.entries.get(key), Some(CacheEntry::InProgress(_))) {
            self.entries.remove(key);
            true
        } else {
            false
        }
    }

    /// Forget every slot
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tang_types::{InstanceValue, MemoryHierarchy};

    fn foo() -> NodeRef {
        let mut h = MemoryHierarchy::new();
        h.add_class("app.Foo").unwrap()
    }

    fn plan(node: &NodeRef) -> InjectionPlan {
        InjectionPlan::instance(node.clone(), InstanceValue::new("foo"))
    }

    #[test]
    fn begin_then_finish() {
        let node = foo();
        let key = SetValuedKey::for_node(node.as_ref());
        let mut cache = PlanCache::new();

        assert!(cache.lookup(&key).unwrap().is_none());
        cache.begin(key.clone(), node.clone()).unwrap();
        assert_eq!(cache.in_progress(), 1);

        let finished = cache.finish(&key, plan(&node)).unwrap();
        assert_eq!(finished.node().full_name(), "app.Foo");
        assert_eq!(cache.in_progress(), 0);
        assert!(cache.lookup(&key).unwrap().is_some());
    }

    #[test]
    fn reentrant_request_is_cycle() {
        let node = foo();
        let key = SetValuedKey::for_node(node.as_ref());
        let mut cache = PlanCache::new();
        cache.begin(key.clone(), node.clone()).unwrap();

        let err = cache.lookup(&key).unwrap_err();
        assert_eq!(err, ResolutionError::CycleDetected("app.Foo".into()));

        let err = cache.begin(key, node).unwrap_err();
        assert!(err.is_cycle());
    }

    #[test]
    fn in_progress_entry_rejects_every_query() {
        let entry = CacheEntry::InProgress(foo());
        let expected = PlanError::UsedBeforeReady("app.Foo".into());

        assert_eq!(entry.plan().unwrap_err(), expected);
        assert_eq!(entry.num_alternatives().unwrap_err(), expected);
        assert_eq!(entry.is_ambiguous().unwrap_err(), expected);
        assert_eq!(entry.is_injectable().unwrap_err(), expected);
        assert_eq!(entry.has_future_dependency().unwrap_err(), expected);
        assert_eq!(entry.is_infeasible_leaf().unwrap_err(), expected);
        assert_eq!(entry.to_shallow_string().unwrap_err(), expected);
        assert_eq!(entry.to_cant_inject_string().unwrap_err(), expected);
        assert!(entry.children().is_empty());
        assert!(expected.is_contract_violation());
    }

    #[test]
    fn ready_entry_delegates() {
        let node = foo();
        let entry = CacheEntry::Ready(plan(&node));
        assert_eq!(entry.num_alternatives().unwrap(), 1);
        assert!(entry.is_injectable().unwrap());
        assert_eq!(entry.to_shallow_string().unwrap(), "Foo");
    }

    #[test]
    fn finish_without_begin_fails() {
        let node = foo();
        let key = SetValuedKey::for_node(node.as_ref());
        let mut cache = PlanCache::new();

        let err = cache.finish(&key, plan(&node)).unwrap_err();
        assert_eq!(err, ResolutionError::NotInProgress("app.Foo".into()));
    }

    #[test]
    fn ready_slot_cannot_be_reopened() {
        let node = foo();
        let key = SetValuedKey::for_node(node.as_ref());
        let mut cache = PlanCache::new();
        cache.begin(key.clone(), node.clone()).unwrap();
        cache.finish(&key, plan(&node)).unwrap();

        let err = cache.begin(key, node).unwrap_err();
        assert!(matches!(err, ResolutionError::AlreadyResolved(_)));
    }

    #[test]
    fn abandon_only_drops_in_progress() {
        let node = foo();
        let key = SetValuedKey::for_node(node.as_ref());
        let mut cache = PlanCache::new();
        cache.begin(key.clone(), node.clone()).unwrap();

        assert!(cache.abandon(&key));
        assert!(cache.is_empty());
        assert!(!cache.abandon(&key));

        cache.begin(key.clone(), node.clone()).unwrap();
        cache.finish(&key, plan(&node)).unwrap();
        assert!(!cache.abandon(&key));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
