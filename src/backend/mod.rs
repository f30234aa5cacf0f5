//! Backing colony collaborators
//!
//! The optimizer only needs four operations from the outside world: read
//! the roster, read the canonical category names, read persisted priorities,
//! and submit one batch of changes. Everything behind them is the backend's
//! concern, including retries and partial failure.

pub mod http;
pub mod memory;
pub mod snapshot;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;
pub use snapshot::{ColonySnapshot, SnapshotBackend};

use crate::core::error::Result;
use crate::core::types::{CategoryKey, Priority, WorkerId};
use crate::entity::Worker;
use crate::optimizer::diff::{Change, PriorityMap};
use serde::{Deserialize, Serialize};

pub trait ColonyBackend {
    fn worker_roster(&self) -> Result<Vec<Worker>>;

    /// Category names the backend recognizes, in its own spelling
    fn canonical_work_categories(&self) -> Result<Vec<String>>;

    fn current_assignments(&self) -> Result<PriorityMap>;

    /// Submit one batch. Errors are returned to the caller unchanged.
    fn submit_priority_changes(&mut self, changes: &[Change]) -> Result<()>;
}

/// Wire form of one persisted priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRecord {
    pub worker_id: WorkerId,
    pub work_type: String,
    pub priority: Priority,
}

impl From<&Change> for PriorityRecord {
    fn from(change: &Change) -> Self {
        Self {
            worker_id: change.worker_id.clone(),
            work_type: change.work_type.clone(),
            priority: change.priority,
        }
    }
}

/// Fold wire records into a [`PriorityMap`]; later records win
pub fn records_to_map(records: &[PriorityRecord]) -> PriorityMap {
    records
        .iter()
        .map(|r| (r.worker_id.clone(), CategoryKey::new(&r.work_type), r.priority))
        .collect()
}
