//! File-backed colony snapshot
//!
//! ```json
//! {
//!   "workers": [{"id": "c1", "name": "Hana", "skills": [...]}],
//!   "work_categories": ["Doctor", "Cooking", "Hauling"],
//!   "priorities": [{"worker_id": "c1", "work_type": "Doctor", "priority": 1}]
//! }
//! ```

use crate::backend::{records_to_map, ColonyBackend, PriorityRecord};
use crate::core::error::Result;
use crate::core::types::CategoryKey;
use crate::entity::Worker;
use crate::optimizer::diff::{Change, PriorityMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColonySnapshot {
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub work_categories: Vec<String>,
    #[serde(default)]
    pub priorities: Vec<PriorityRecord>,
}

impl ColonySnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }

    /// Merge a batch into the priority records, keeping existing spellings
    ///
    /// Every record whose spelling folds to the change's category is updated,
    /// so duplicate spellings cannot shadow the new value on the next read.
    pub fn apply(&mut self, changes: &[Change]) {
        for change in changes {
            let mut matched = false;
            for record in self.priorities.iter_mut().filter(|record| {
                record.worker_id == change.worker_id
                    && CategoryKey::new(&record.work_type) == change.category
            }) {
                record.priority = change.priority;
                matched = true;
            }
            if !matched {
                self.priorities.push(PriorityRecord::from(change));
            }
        }
    }
}

/// Backend reading a snapshot file and writing the updated snapshot on submit
#[derive(Debug, Clone)]
pub struct SnapshotBackend {
    snapshot: ColonySnapshot,
    output: PathBuf,
}

impl SnapshotBackend {
    /// Load `path`; submissions write back to the same file
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_output(path, path)
    }

    pub fn open_with_output(path: &Path, output: &Path) -> Result<Self> {
        let snapshot = ColonySnapshot::load(path)?;
        tracing::info!(
            "Loaded snapshot {}: {} workers, {} categories, {} priorities",
            path.display(),
            snapshot.workers.len(),
            snapshot.work_categories.len(),
            snapshot.priorities.len()
        );
        Ok(Self {
            snapshot,
            output: output.to_path_buf(),
        })
    }

    pub fn snapshot(&self) -> &ColonySnapshot {
        &self.snapshot
    }
}

impl ColonyBackend for SnapshotBackend {
    fn worker_roster(&self) -> Result<Vec<Worker>> {
        Ok(self.snapshot.workers.clone())
    }

    fn canonical_work_categories(&self) -> Result<Vec<String>> {
        Ok(self.snapshot.work_categories.clone())
    }

    fn current_assignments(&self) -> Result<PriorityMap> {
        Ok(records_to_map(&self.snapshot.priorities))
    }

    fn submit_priority_changes(&mut self, changes: &[Change]) -> Result<()> {
        let mut updated = self.snapshot.clone();
        updated.apply(changes);
        updated.save(&self.output)?;
        self.snapshot = updated;
        tracing::info!("Wrote {} changes to {}", changes.len(), self.output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Priority, WorkerId};

    #[test]
    fn test_apply_updates_existing_spelling() {
        let mut snapshot = ColonySnapshot {
            priorities: vec![PriorityRecord {
                worker_id: WorkerId::from("a"),
                work_type: "PlantCutting".into(),
                priority: Priority::Tertiary,
            }],
            ..ColonySnapshot::default()
        };

        snapshot.apply(&[
            Change {
                worker_id: WorkerId::from("a"),
                category: CategoryKey::new("plant cutting"),
                work_type: "plant cutting".into(),
                priority: Priority::Disabled,
            },
            Change {
                worker_id: WorkerId::from("a"),
                category: CategoryKey::new("Mining"),
                work_type: "Mining".into(),
                priority: Priority::Fallback,
            },
        ]);

        assert_eq!(snapshot.priorities.len(), 2);
        assert_eq!(snapshot.priorities[0].work_type, "PlantCutting");
        assert_eq!(snapshot.priorities[0].priority, Priority::Disabled);
        assert_eq!(snapshot.priorities[1].work_type, "Mining");
    }

    #[test]
    fn test_current_assignments_canonicalize_work_types() {
        let json = r#"{
            "workers": [],
            "work_categories": ["Doctor"],
            "priorities": [{"worker_id": "a", "work_type": "Plant_Cutting", "priority": 2}]
        }"#;
        let snapshot: ColonySnapshot = serde_json::from_str(json).unwrap();
        let map = records_to_map(&snapshot.priorities);
        assert_eq!(
            map.get(&WorkerId::from("a"), &CategoryKey::new("PlantCutting")),
            Priority::Secondary
        );
    }

    #[test]
    fn test_apply_updates_every_duplicate_spelling() {
        let record = |work_type: &str, priority| PriorityRecord {
            worker_id: WorkerId::from("a"),
            work_type: work_type.into(),
            priority,
        };
        let mut snapshot = ColonySnapshot {
            priorities: vec![
                record("PlantCutting", Priority::Secondary),
                record("plant cutting", Priority::Tertiary),
            ],
            ..ColonySnapshot::default()
        };

        snapshot.apply(&[Change {
            worker_id: WorkerId::from("a"),
            category: CategoryKey::new("PlantCutting"),
            work_type: "PlantCutting".into(),
            priority: Priority::Primary,
        }]);

        assert_eq!(snapshot.priorities.len(), 2);
        assert!(snapshot.priorities.iter().all(|r| r.priority == Priority::Primary));
        assert_eq!(
            records_to_map(&snapshot.priorities).get(&WorkerId::from("a"), &CategoryKey::new("PlantCutting")),
            Priority::Primary
        );
    }

    #[test]
    fn test_failed_save_leaves_state_untouched() {
        let output = std::env::temp_dir()
            .join(format!("colony_labor_no_such_dir_{}", std::process::id()))
            .join("out.json");
        let mut backend = SnapshotBackend {
            snapshot: ColonySnapshot::default(),
            output,
        };

        let change = Change {
            worker_id: WorkerId::from("a"),
            category: CategoryKey::new("Mining"),
            work_type: "Mining".into(),
            priority: Priority::Fallback,
        };
        assert!(backend.submit_priority_changes(&[change]).is_err());
        assert!(backend.snapshot().priorities.is_empty());
    }
}
