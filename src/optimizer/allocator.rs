//! Tiered allocation - turn ranked candidates into priorities
//!
//! Tiers fill in order 1 -> 2 -> 3 -> 4. Tiers 1-3 have target sizes that
//! scale with colony size; tier 4 absorbs every remaining eligible worker
//! that still has capacity. Each pick is a ledger reservation, so caps hold
//! across all categories of the run.

use crate::core::config::OptimizerConfig;
use crate::core::types::{Priority, WorkerId};
use crate::optimizer::diff::PriorityMap;
use crate::optimizer::ledger::CapacityLedger;
use crate::optimizer::scoring::CandidateScore;
use crate::skills::WorkCategory;
use std::collections::BTreeMap;

/// Desired sizes of tiers 1-3 for one colony
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierTargets {
    pub primary: usize,
    pub secondary: usize,
    pub tertiary: usize,
}

impl TierTargets {
    /// round(n / divisor) clamped to 1..=ceiling, per tier
    pub fn for_colony(colony_size: usize, config: &OptimizerConfig) -> Self {
        let target = |tier: usize| {
            let raw = (colony_size as f64 / config.tier_divisors[tier] as f64).round() as usize;
            raw.clamp(1, config.tier_ceilings[tier].max(1))
        };
        Self {
            primary: target(0),
            secondary: target(1),
            tertiary: target(2),
        }
    }

    fn target(&self, tier: Priority) -> Option<usize> {
        match tier {
            Priority::Primary => Some(self.primary),
            Priority::Secondary => Some(self.secondary),
            Priority::Tertiary => Some(self.tertiary),
            Priority::Fallback | Priority::Disabled => None,
        }
    }
}

/// Eligible candidates, best first
///
/// Ties fall back to the worker's persisted priority for this category
/// (already-serving workers first), then to worker id.
pub fn rank_candidates<'s>(
    category: &WorkCategory,
    scores: &'s [CandidateScore],
    current: &PriorityMap,
) -> Vec<&'s CandidateScore> {
    let mut ranked: Vec<&CandidateScore> = scores.iter().filter(|s| s.eligible).collect();

    ranked.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| {
                let l = current.get(&left.worker_id, &category.key).stability_rank();
                let r = current.get(&right.worker_id, &category.key).stability_rank();
                l.cmp(&r)
            })
            .then_with(|| left.worker_id.cmp(&right.worker_id))
    });

    ranked
}

/// Assign a priority to every scored worker for `category`
///
/// Workers never reserved in any tier come back as `Priority::Disabled`.
pub fn allocate(
    category: &WorkCategory,
    scores: &[CandidateScore],
    current: &PriorityMap,
    targets: TierTargets,
    ledger: &mut CapacityLedger,
) -> BTreeMap<WorkerId, Priority> {
    let ranked = rank_candidates(category, scores, current);
    let basic = category.is_basic();
    let mut picked: BTreeMap<WorkerId, Priority> = BTreeMap::new();
    let mut filled = [0usize; 4];

    for (slot, tier) in Priority::ACTIVE.into_iter().enumerate() {
        // Priority 1 is reserved for skilled work
        if basic && tier == Priority::Primary {
            continue;
        }
        let mut need = targets.target(tier).unwrap_or(usize::MAX);

        for candidate in &ranked {
            if need == 0 {
                break;
            }
            if picked.contains_key(&candidate.worker_id) {
                continue;
            }
            if tier == Priority::Primary && candidate.passion == 0 {
                continue;
            }
            if ledger.try_reserve(&candidate.worker_id, tier, basic) {
                picked.insert(candidate.worker_id.clone(), tier);
                need -= 1;
                filled[slot] += 1;
            }
        }
    }

    tracing::debug!(
        "{}: {} eligible of {}, filled p1={}/{} p2={}/{} p3={}/{} p4={}",
        category.label,
        ranked.len(),
        scores.len(),
        filled[0],
        if basic { 0 } else { targets.primary },
        filled[1],
        targets.secondary,
        filled[2],
        targets.tertiary,
        filled[3]
    );

    scores
        .iter()
        .map(|score| {
            let priority = picked
                .get(&score.worker_id)
                .copied()
                .unwrap_or(Priority::Disabled);
            (score.worker_id.clone(), priority)
        })
        .collect()
}
