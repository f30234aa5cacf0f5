//! Capacity ledger - per-worker reservation counters for one optimizer run
//!
//! The ledger is shared by every category processed in a run, in order.
//! A worker used up by an earlier category has less (or no) capacity left
//! for later ones, so the category order the caller supplies matters.

use crate::core::config::OptimizerConfig;
use crate::core::types::{Priority, WorkerId};
use ahash::AHashMap;

/// Reservation counts for one worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerLoad {
    /// Priority-1 reservations (skilled categories)
    pub primary: u32,
    /// Priority-2/3 reservations (skilled categories)
    pub secondary: u32,
    /// Every active reservation, basic included
    pub total: u32,
    /// Active reservations in skilled categories
    pub non_basic: u32,
}

/// Caps copied out of [`OptimizerConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityLimits {
    pub max_primary: u32,
    pub max_secondary: u32,
    pub max_total: u32,
}

impl From<&OptimizerConfig> for CapacityLimits {
    fn from(config: &OptimizerConfig) -> Self {
        Self {
            max_primary: config.max_primary,
            max_secondary: config.max_secondary,
            max_total: config.max_total,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapacityLedger {
    limits: CapacityLimits,
    loads: AHashMap<WorkerId, WorkerLoad>,
}

impl CapacityLedger {
    pub fn new(limits: CapacityLimits) -> Self {
        Self {
            limits,
            loads: AHashMap::new(),
        }
    }

    pub fn load(&self, worker: &WorkerId) -> WorkerLoad {
        self.loads.get(worker).copied().unwrap_or_default()
    }

    /// Whether the worker can take any further assignment
    pub fn has_capacity(&self, worker: &WorkerId) -> bool {
        self.load(worker).total < self.limits.max_total
    }

    /// Skilled load relative to the total cap, clamped to 0..=1
    pub fn busyness(&self, worker: &WorkerId) -> f64 {
        if self.limits.max_total == 0 {
            return 1.0;
        }
        (self.load(worker).non_basic as f64 / self.limits.max_total as f64).min(1.0)
    }

    /// Atomically check every cap that applies and, if all pass, count the reservation.
    ///
    /// Returns false (and changes nothing) when a cap would be exceeded.
    /// Basic categories skip the primary/secondary caps and cannot be reserved
    /// at priority 1. `Priority::Disabled` is never reserved.
    pub fn try_reserve(&mut self, worker: &WorkerId, priority: Priority, basic: bool) -> bool {
        let limits = self.limits;
        let load = self.load(worker);

        if load.total >= limits.max_total {
            return false;
        }

        let mut next = load;
        match priority {
            Priority::Disabled => return false,
            Priority::Primary => {
                if basic || load.primary >= limits.max_primary {
                    return false;
                }
                next.primary += 1;
            }
            Priority::Secondary | Priority::Tertiary => {
                if !basic {
                    if load.secondary >= limits.max_secondary {
                        return false;
                    }
                    next.secondary += 1;
                }
            }
            Priority::Fallback => {}
        }

        next.total += 1;
        if !basic {
            next.non_basic += 1;
        }
        self.loads.insert(worker.clone(), next);
        true
    }
}
