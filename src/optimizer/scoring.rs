//! Candidate scoring - rank workers for one work category
//!
//! score = z(level within the eligible pool) - penalty * busyness
//!         + bonus (skilled category and passionate worker)
//!
//! Scoring only reads the capacity ledger, so fit evaluation for a large
//! roster can run in parallel without affecting allocation order.

use crate::core::config::OptimizerConfig;
use crate::core::types::{canonicalize, WorkerId};
use crate::entity::Worker;
use crate::optimizer::ledger::CapacityLedger;
use crate::skills::WorkCategory;
use rayon::prelude::*;
use serde::Serialize;

/// How well one worker's skills cover one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkillFit {
    /// Highest level among relevant skills, 0 if none are known
    pub best_level: u8,
    /// Passion of the skill that supplied `best_level`
    pub passion: u8,
    /// Any relevant skill is flagged disabled, or the category itself is
    pub disabled: bool,
}

/// Evaluate a worker's relevant skills for a category
pub fn evaluate_fit(worker: &Worker, category: &WorkCategory) -> SkillFit {
    let mut fit = SkillFit {
        disabled: worker.is_incapable_of(&category.key),
        ..SkillFit::default()
    };

    let relevant: Vec<String> = category.relevant_skills.iter().map(|s| canonicalize(s)).collect();

    for skill in worker
        .skills
        .iter()
        .filter(|skill| relevant.contains(&canonicalize(&skill.name)))
    {
        if skill.disabled {
            fit.disabled = true;
        }
        let better = skill.level > fit.best_level
            || (skill.level == fit.best_level && skill.passion > fit.passion);
        if better {
            fit.best_level = skill.level;
            fit.passion = skill.passion;
        }
    }

    fit
}

/// Eligibility rule shared by scoring and reconciliation
pub fn is_eligible(fit: &SkillFit, category: &WorkCategory, config: &OptimizerConfig) -> bool {
    if fit.disabled {
        return false;
    }
    category.is_basic() || fit.best_level >= config.min_level
}

/// Score for one (worker, category) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub worker_id: WorkerId,
    pub best_level: u8,
    pub passion: u8,
    pub eligible: bool,
    /// Skilled load before this category, 0..=1
    pub busyness: f64,
    pub z_score: f64,
    /// Negative infinity for ineligible workers
    pub score: f64,
}

pub struct CandidateScorer<'a> {
    config: &'a OptimizerConfig,
}

impl<'a> CandidateScorer<'a> {
    pub fn new(config: &'a OptimizerConfig) -> Self {
        Self { config }
    }

    /// Score every worker for `category`, ineligible workers included
    ///
    /// Output order matches `workers`.
    pub fn score(
        &self,
        category: &WorkCategory,
        workers: &[Worker],
        ledger: &CapacityLedger,
    ) -> Vec<CandidateScore> {
        let fits: Vec<SkillFit> = if workers.len() >= self.config.parallel_threshold {
            workers
                .par_iter()
                .map(|worker| evaluate_fit(worker, category))
                .collect()
        } else {
            workers
                .iter()
                .map(|worker| evaluate_fit(worker, category))
                .collect()
        };

        let eligible: Vec<bool> = fits
            .iter()
            .map(|fit| is_eligible(fit, category, self.config))
            .collect();

        let (mean, stdev) = pool_stats(
            fits.iter()
                .zip(&eligible)
                .filter(|(_, &ok)| ok)
                .map(|(fit, _)| fit.best_level as f64),
        );

        let skilled = !category.is_basic();

        workers
            .iter()
            .zip(fits)
            .zip(eligible)
            .map(|((worker, fit), eligible)| {
                let busyness = ledger.busyness(&worker.id);
                if !eligible {
                    return CandidateScore {
                        worker_id: worker.id.clone(),
                        best_level: fit.best_level,
                        passion: fit.passion,
                        eligible: false,
                        busyness,
                        z_score: 0.0,
                        score: f64::NEG_INFINITY,
                    };
                }

                let z_score = if stdev > f64::EPSILON {
                    (fit.best_level as f64 - mean) / stdev
                } else {
                    0.0 // Flat pool
                };

                let mut score = z_score - self.config.busyness_penalty * busyness;
                if skilled && fit.passion > 0 {
                    score += self.config.passion_bonus;
                }

                CandidateScore {
                    worker_id: worker.id.clone(),
                    best_level: fit.best_level,
                    passion: fit.passion,
                    eligible: true,
                    busyness,
                    z_score,
                    score,
                }
            })
            .collect()
    }
}

/// Mean and population standard deviation; (0, 0) for an empty pool
fn pool_stats(levels: impl Iterator<Item = f64>) -> (f64, f64) {
    let levels: Vec<f64> = levels.collect();
    if levels.is_empty() {
        return (0.0, 0.0);
    }
    let n = levels.len() as f64;
    let mean = levels.iter().sum::<f64>() / n;
    let variance = levels.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Priority;
    use crate::optimizer::ledger::CapacityLimits;
    use crate::skills::SkillMap;

    fn doctors() -> Vec<Worker> {
        vec![
            Worker::new("a", "A").with_skill("Medicine", 18, 2),
            Worker::new("b", "B").with_skill("Medicine", 15, 0),
            Worker::new("c", "C").with_skill("Medicine", 12, 1),
            Worker::new("d", "D").with_skill("Medicine", 5, 0),
            Worker::new("e", "E").with_disabled_skill("Medicine", 20),
            Worker::new("f", "F"),
        ]
    }

    #[test]
    fn test_eligibility_filter() {
        let config = OptimizerConfig::default();
        let ledger = CapacityLedger::new(CapacityLimits::from(&config));
        let doctor = SkillMap::with_defaults().category("Doctor");

        let scores = CandidateScorer::new(&config).score(&doctor, &doctors(), &ledger);

        let eligible: Vec<&str> = scores
            .iter()
            .filter(|s| s.eligible)
            .map(|s| s.worker_id.as_str())
            .collect();
        assert_eq!(eligible, vec!["a", "b", "c"]);
        assert_eq!(scores.len(), 6, "ineligible workers are still scored");
        assert!(scores[3].score.is_infinite() && scores[3].score < 0.0);
        assert_eq!(scores[5].best_level, 0);
    }

    #[test]
    fn test_z_scores_over_eligible_pool_only() {
        let config = OptimizerConfig::default();
        let ledger = CapacityLedger::new(CapacityLimits::from(&config));
        let doctor = SkillMap::with_defaults().category("Doctor");

        let scores = CandidateScorer::new(&config).score(&doctor, &doctors(), &ledger);

        // Pool {18, 15, 12}: mean 15, population stdev sqrt(6)
        let sd = 6f64.sqrt();
        assert!((scores[0].z_score - 3.0 / sd).abs() < 1e-9);
        assert!(scores[1].z_score.abs() < 1e-9);
        assert!((scores[2].z_score + 3.0 / sd).abs() < 1e-9);

        // Passion bonus for a and c
        assert!((scores[0].score - (3.0 / sd + 0.6)).abs() < 1e-9);
        assert!((scores[2].score - (-3.0 / sd + 0.6)).abs() < 1e-9);
    }

    #[test]
    fn test_flat_pool_has_zero_z() {
        let config = OptimizerConfig::default();
        let ledger = CapacityLedger::new(CapacityLimits::from(&config));
        let cooking = SkillMap::with_defaults().category("Cooking");
        let workers = vec![
            Worker::new("a", "A").with_skill("Cooking", 9, 0),
            Worker::new("b", "B").with_skill("Cooking", 9, 0),
        ];

        let scores = CandidateScorer::new(&config).score(&cooking, &workers, &ledger);
        assert!(scores.iter().all(|s| s.z_score == 0.0 && s.score == 0.0));
    }

    #[test]
    fn test_busyness_penalty_reads_ledger() {
        let config = OptimizerConfig::default();
        let mut ledger = CapacityLedger::new(CapacityLimits::from(&config));
        let busy = WorkerId::from("a");
        for _ in 0..3 {
            ledger.try_reserve(&busy, Priority::Fallback, false);
        }
        let cooking = SkillMap::with_defaults().category("Cooking");
        let workers = vec![
            Worker::new("a", "A").with_skill("Cooking", 9, 0),
            Worker::new("b", "B").with_skill("Cooking", 9, 0),
        ];

        let scores = CandidateScorer::new(&config).score(&cooking, &workers, &ledger);
        assert!((scores[0].busyness - 0.5).abs() < 1e-12);
        assert!((scores[0].score + 0.25).abs() < 1e-12);
        assert!(scores[0].score < scores[1].score);
    }

    #[test]
    fn test_basic_category_ignores_level_and_passion() {
        let config = OptimizerConfig::default();
        let ledger = CapacityLedger::new(CapacityLimits::from(&config));
        let hauling = SkillMap::with_defaults().category("Hauling");
        let workers = vec![
            Worker::new("a", "A").with_skill("Medicine", 3, 2),
            Worker::new("b", "B").incapable_of("Hauling"),
        ];

        let scores = CandidateScorer::new(&config).score(&hauling, &workers, &ledger);
        assert!(scores[0].eligible);
        assert_eq!(scores[0].score, 0.0);
        assert!(!scores[1].eligible, "incapable workers are never eligible");
    }

    #[test]
    fn test_multi_skill_category_uses_best_skill() {
        let category = WorkCategory::new("Hunting", vec!["Shooting".into(), "Animals".into()]);
        let worker = Worker::new("a", "A")
            .with_skill("Shooting", 7, 0)
            .with_skill("Animals", 11, 1);

        let fit = evaluate_fit(&worker, &category);
        assert_eq!(fit.best_level, 11);
        assert_eq!(fit.passion, 1);
        assert!(!fit.disabled);

        let worker = worker.with_disabled_skill("Shooting", 0);
        assert!(evaluate_fit(&worker, &category).disabled);
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let doctor = SkillMap::with_defaults().category("Doctor");
        let workers: Vec<Worker> = (0..40)
            .map(|i| Worker::new(format!("w{:02}", i), "x").with_skill("Medicine", (i % 21) as u8, (i % 3) as u8))
            .collect();

        let sequential = OptimizerConfig::default();
        let parallel = OptimizerConfig {
            parallel_threshold: 1,
            ..OptimizerConfig::default()
        };
        let ledger = CapacityLedger::new(CapacityLimits::from(&sequential));

        let a = CandidateScorer::new(&sequential).score(&doctor, &workers, &ledger);
        let b = CandidateScorer::new(&parallel).score(&doctor, &workers, &ledger);
        assert_eq!(a, b);
    }
}
