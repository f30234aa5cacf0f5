//! Change-set computation between desired and persisted priorities

use crate::core::types::{CategoryKey, Priority, WorkerId};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Priorities keyed by (worker, category); absent pairs read as disabled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityMap {
    entries: BTreeMap<(WorkerId, CategoryKey), Priority>,
}

impl PriorityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, worker: &WorkerId, category: &CategoryKey) -> Priority {
        // BTreeMap lookup needs an owned tuple key
        self.entries
            .get(&(worker.clone(), category.clone()))
            .copied()
            .unwrap_or(Priority::Disabled)
    }

    pub fn set(&mut self, worker: WorkerId, category: CategoryKey, priority: Priority) {
        self.entries.insert((worker, category), priority);
    }

    /// Apply a submitted batch, in order
    pub fn apply(&mut self, changes: &[Change]) {
        for change in changes {
            self.set(change.worker_id.clone(), change.category.clone(), change.priority);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WorkerId, &CategoryKey, Priority)> {
        self.entries.iter().map(|((w, c), p)| (w, c, *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(WorkerId, CategoryKey, Priority)> for PriorityMap {
    fn from_iter<I: IntoIterator<Item = (WorkerId, CategoryKey, Priority)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (worker, category, priority) in iter {
            map.set(worker, category, priority);
        }
        map
    }
}

/// One desired (worker, category) priority, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEntry {
    pub worker_id: WorkerId,
    pub category: CategoryKey,
    /// Name the backing system knows this category by
    pub work_type: String,
    pub priority: Priority,
}

/// A single priority update for submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub worker_id: WorkerId,
    pub category: CategoryKey,
    pub work_type: String,
    pub priority: Priority,
}

/// Minimal ordered change-set moving `current` to `desired`
///
/// Desired entries are deduplicated by (worker, category), last write wins,
/// keeping the position of the first occurrence. Transitions to
/// `Priority::Disabled` are emitted like any other change.
pub fn diff(desired: &[DesiredEntry], current: &PriorityMap) -> Vec<Change> {
    let mut order: Vec<&DesiredEntry> = Vec::with_capacity(desired.len());
    let mut slots: AHashMap<(&WorkerId, &CategoryKey), usize> = AHashMap::new();

    for entry in desired {
        match slots.get(&(&entry.worker_id, &entry.category)) {
            Some(&slot) => order[slot] = entry,
            None => {
                slots.insert((&entry.worker_id, &entry.category), order.len());
                order.push(entry);
            }
        }
    }

    order
        .into_iter()
        .filter(|entry| current.get(&entry.worker_id, &entry.category) != entry.priority)
        .map(|entry| Change {
            worker_id: entry.worker_id.clone(),
            category: entry.category.clone(),
            work_type: entry.work_type.clone(),
            priority: entry.priority,
        })
        .collect()
}
