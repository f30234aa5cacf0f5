//! Work priority optimizer
//!
//! One run, in order:
//! 1. Score every worker for each caller-supplied category
//! 2. Allocate tiers against a capacity ledger shared by the whole run
//! 3. Sweep canonical categories the caller did not list (fallback coverage)
//! 4. Diff the desired state against persisted priorities
//!
//! Steps 1-4 are pure ([`Optimizer::plan`]). [`Optimizer::run`] wraps them
//! with the backend reads and the single batch submission.

pub mod allocator;
pub mod diff;
pub mod ledger;
pub mod reconcile;
pub mod scoring;

pub use allocator::{allocate, rank_candidates, TierTargets};
pub use diff::{diff, Change, DesiredEntry, PriorityMap};
pub use ledger::{CapacityLedger, CapacityLimits, WorkerLoad};
pub use reconcile::{ReconciledCategory, ReconciliationPass};
pub use scoring::{evaluate_fit, is_eligible, CandidateScore, CandidateScorer, SkillFit};

use crate::backend::ColonyBackend;
use crate::core::config::{LaborConfig, OptimizerConfig};
use crate::core::error::Result;
use crate::core::types::{CategoryKey, Priority, WorkerId};
use crate::entity::Worker;
use crate::skills::{SkillMap, WorkCategory};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// One computed (worker, category, priority) triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub category: CategoryKey,
    pub work_type: String,
    pub priority: Priority,
}

/// Result of one optimizer pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimizeOutcome {
    /// Every evaluated pair, grouped by category, workers by ascending id
    pub assignments: BTreeMap<CategoryKey, Vec<Assignment>>,
    /// Deduplicated change-set, in evaluation order
    pub changes: Vec<Change>,
}

impl OptimizeOutcome {
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    /// Number of active (priority > 0) assignments
    pub fn active_count(&self) -> usize {
        self.iter().filter(|a| a.priority.is_active()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values().flatten()
    }

    pub fn priority(&self, worker: &str, category: &str) -> Priority {
        self.assignments
            .get(&CategoryKey::new(category))
            .and_then(|list| list.iter().find(|a| a.worker_id.as_str() == worker))
            .map(|a| a.priority)
            .unwrap_or(Priority::Disabled)
    }
}

#[derive(Debug, Clone)]
pub struct Optimizer {
    config: OptimizerConfig,
    skill_map: SkillMap,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self {
            config: OptimizerConfig::default(),
            skill_map: SkillMap::with_defaults(),
        }
    }
}

impl Optimizer {
    pub fn new(config: OptimizerConfig, skill_map: SkillMap) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, skill_map })
    }

    /// Built-in skill map with the file's overrides applied
    pub fn from_config(file: &LaborConfig) -> Result<Self> {
        let mut skill_map = SkillMap::with_defaults();
        skill_map.apply_overrides(&file.skill_map);
        Self::new(file.optimizer.clone(), skill_map)
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn skill_map(&self) -> &SkillMap {
        &self.skill_map
    }

    /// Resolve category names against the skill map, preserving order
    ///
    /// Names the skill map does not know resolve to basic categories.
    pub fn categories<S: AsRef<str>>(&self, names: &[S]) -> Vec<WorkCategory> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                if !self.skill_map.contains(name) {
                    tracing::warn!("Unknown work category {}, treating it as basic work", name);
                }
                self.skill_map.category(name)
            })
            .collect()
    }

    /// Compute the optimum and the change-set; no I/O
    pub fn plan(
        &self,
        categories: &[WorkCategory],
        workers: &[Worker],
        canonical: &[String],
        current: &PriorityMap,
    ) -> OptimizeOutcome {
        let mut ledger = CapacityLedger::new(CapacityLimits::from(&self.config));
        let targets = TierTargets::for_colony(workers.len(), &self.config);
        let scorer = CandidateScorer::new(&self.config);

        let mut canonical_names: AHashMap<CategoryKey, &str> = AHashMap::new();
        for name in canonical {
            canonical_names.entry(CategoryKey::new(name)).or_insert(name.as_str());
        }
        let worker_names: AHashMap<&WorkerId, &str> =
            workers.iter().map(|w| (&w.id, w.name.as_str())).collect();

        let mut recorder = Recorder {
            canonical_names: &canonical_names,
            worker_names: &worker_names,
            desired: Vec::new(),
            outcome: OptimizeOutcome::default(),
        };
        let mut processed: AHashSet<CategoryKey> = AHashSet::new();

        // Order is load-bearing: each category sees the ledger left by the previous ones
        for category in categories {
            let scores = scorer.score(category, workers, &ledger);
            let priorities = allocate(category, &scores, current, targets, &mut ledger);
            processed.insert(category.key.clone());
            recorder.record(category, priorities);
        }

        let reconciled = ReconciliationPass::new(&self.config, &self.skill_map).run(
            canonical,
            &processed,
            workers,
            &mut ledger,
        );
        for swept in reconciled {
            recorder.record(&swept.category, swept.priorities);
        }

        let Recorder { desired, mut outcome, .. } = recorder;
        outcome.changes = diff(&desired, current);
        outcome
    }

    /// Read colony state, plan, and submit the change-set once
    ///
    /// A submission error is returned as the backend produced it.
    pub fn run<B: ColonyBackend>(
        &self,
        backend: &mut B,
        categories: &[WorkCategory],
    ) -> Result<OptimizeOutcome> {
        let outcome = self.preview(backend, categories)?;
        backend.submit_priority_changes(&outcome.changes)?;
        tracing::info!("Submitted {} priority changes", outcome.change_count());
        Ok(outcome)
    }

    /// Like [`Optimizer::run`] without the submission
    pub fn preview<B: ColonyBackend>(
        &self,
        backend: &B,
        categories: &[WorkCategory],
    ) -> Result<OptimizeOutcome> {
        let workers = backend.worker_roster()?;
        let canonical = backend.canonical_work_categories()?;
        let current = backend.current_assignments()?;

        tracing::info!(
            "Optimizing {} categories ({} canonical) for {} workers",
            categories.len(),
            canonical.len(),
            workers.len()
        );

        let outcome = self.plan(categories, &workers, &canonical, &current);
        tracing::info!(
            "Planned {} active assignments, {} changes",
            outcome.active_count(),
            outcome.change_count()
        );
        Ok(outcome)
    }
}

/// Collects desired entries and assignments as categories complete
struct Recorder<'a> {
    canonical_names: &'a AHashMap<CategoryKey, &'a str>,
    worker_names: &'a AHashMap<&'a WorkerId, &'a str>,
    desired: Vec<DesiredEntry>,
    outcome: OptimizeOutcome,
}

impl Recorder<'_> {
    fn record(&mut self, category: &WorkCategory, priorities: BTreeMap<WorkerId, Priority>) {
        let work_type = self
            .canonical_names
            .get(&category.key)
            .map(|name| name.to_string())
            .unwrap_or_else(|| category.label.clone());

        let mut assignments = Vec::with_capacity(priorities.len());
        for (worker_id, priority) in priorities {
            self.desired.push(DesiredEntry {
                worker_id: worker_id.clone(),
                category: category.key.clone(),
                work_type: work_type.clone(),
                priority,
            });
            assignments.push(Assignment {
                worker_name: self.worker_names.get(&worker_id).copied().unwrap_or_default().to_string(),
                worker_id,
                category: category.key.clone(),
                work_type: work_type.clone(),
                priority,
            });
        }
        // A repeated category replaces its earlier result
        self.outcome.assignments.insert(category.key.clone(), assignments);
    }
}
