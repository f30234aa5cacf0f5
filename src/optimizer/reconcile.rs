//! Reconciliation sweep over the backend's canonical category list
//!
//! Categories the caller did not enumerate still get baseline coverage:
//! every eligible worker with capacity left is reserved at priority 4.

use crate::core::config::OptimizerConfig;
use crate::core::types::{CategoryKey, Priority, WorkerId};
use crate::entity::Worker;
use crate::optimizer::ledger::CapacityLedger;
use crate::optimizer::scoring::{evaluate_fit, is_eligible};
use crate::skills::{SkillMap, WorkCategory};
use ahash::AHashSet;
use std::collections::BTreeMap;

/// Priorities produced for one canonical category
#[derive(Debug, Clone)]
pub struct ReconciledCategory {
    pub category: WorkCategory,
    pub priorities: BTreeMap<WorkerId, Priority>,
}

pub struct ReconciliationPass<'a> {
    config: &'a OptimizerConfig,
    skill_map: &'a SkillMap,
}

impl<'a> ReconciliationPass<'a> {
    pub fn new(config: &'a OptimizerConfig, skill_map: &'a SkillMap) -> Self {
        Self { config, skill_map }
    }

    /// Sweep canonical categories not in `processed`, in backend order
    ///
    /// Workers are visited by ascending id. Canonical names that collapse to
    /// the same key are swept once.
    pub fn run(
        &self,
        canonical: &[String],
        processed: &AHashSet<CategoryKey>,
        workers: &[Worker],
        ledger: &mut CapacityLedger,
    ) -> Vec<ReconciledCategory> {
        let mut by_id: Vec<&Worker> = workers.iter().collect();
        by_id.sort_by(|a, b| a.id.cmp(&b.id));

        let mut seen: AHashSet<CategoryKey> = AHashSet::new();
        let mut swept = Vec::new();

        for name in canonical {
            let category = self.skill_map.category(name);
            if processed.contains(&category.key) || !seen.insert(category.key.clone()) {
                continue;
            }

            let basic = category.is_basic();
            let mut covered = 0usize;
            let priorities: BTreeMap<WorkerId, Priority> = by_id
                .iter()
                .map(|worker| {
                    let reserved = ledger.has_capacity(&worker.id)
                        && is_eligible(&evaluate_fit(worker, &category), &category, self.config)
                        && ledger.try_reserve(&worker.id, Priority::Fallback, basic);
                    if reserved {
                        covered += 1;
                        (worker.id.clone(), Priority::Fallback)
                    } else {
                        (worker.id.clone(), Priority::Disabled)
                    }
                })
                .collect();

            tracing::debug!("Reconciled {}: {} workers at fallback", category.label, covered);
            swept.push(ReconciledCategory { category, priorities });
        }

        swept
    }
}
