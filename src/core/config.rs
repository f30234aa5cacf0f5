//! Optimizer configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use crate::core::error::{LaborError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Minimum relevant skill level for any assignment to a skilled category
pub const MIN_LEVEL: u8 = 6;
/// Priority-1 slots per worker across skilled categories
pub const MAX_PRIMARY: u32 = 1;
/// Priority-2/3 slots per worker across skilled categories
pub const MAX_SECONDARY: u32 = 3;
/// Active assignments per worker across all categories
pub const MAX_TOTAL: u32 = 6;
/// Score subtracted per unit of busyness
pub const BUSYNESS_PENALTY: f64 = 0.5;
/// Score added for passion in a skilled category
pub const PASSION_BONUS: f64 = 0.6;

/// Highest level a skill can reach
pub const MAX_SKILL_LEVEL: u8 = 20;

/// Configuration for one optimizer instance
///
/// Defaults are the tuned constants above. Any field may be overridden from
/// the `[optimizer]` table of a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    // === ELIGIBILITY ===
    /// Workers whose best relevant level is below this never get skilled work
    pub min_level: u8,

    // === CAPACITY ===
    /// Priority-1 reservations per worker (skilled categories only)
    pub max_primary: u32,

    /// Priority-2 and priority-3 reservations per worker (skilled categories only)
    ///
    /// Tiers 2 and 3 draw on the same counter, so a worker holding three
    /// tier-2 slots has no tier-3 capacity left.
    pub max_secondary: u32,

    /// Active reservations per worker across every category, basic included
    ///
    /// Also the denominator of busyness: a worker with `max_total` skilled
    /// reservations is fully busy.
    pub max_total: u32,

    // === SCORING ===
    /// Weight of busyness (0..1) subtracted from the z-score
    pub busyness_penalty: f64,

    /// Flat bonus for a passionate worker in a skilled category
    ///
    /// At 0.6 a passionate worker outranks a dispassionate one whose level
    /// sits a little over half a standard deviation higher.
    pub passion_bonus: f64,

    // === TIER TARGETS ===
    /// Colony size divisors for tiers 1, 2, 3: target = round(n / divisor)
    pub tier_divisors: [u32; 3],

    /// Upper clamp for each tier target (the lower clamp is always 1)
    pub tier_ceilings: [usize; 3],

    // === PARALLELIZATION ===
    /// Minimum roster size before skill evaluation runs on rayon
    pub parallel_threshold: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_level: MIN_LEVEL,

            max_primary: MAX_PRIMARY,
            max_secondary: MAX_SECONDARY,
            max_total: MAX_TOTAL,

            busyness_penalty: BUSYNESS_PENALTY,
            passion_bonus: PASSION_BONUS,

            // p1 = n/8 capped at 3, p2 = n/6 capped at 4, p3 = n/5 capped at 5
            tier_divisors: [8, 6, 5],
            tier_ceilings: [3, 4, 5],

            parallel_threshold: 256,
        }
    }
}

impl OptimizerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_total == 0 {
            return Err(LaborError::InvalidConfig("max_total must be at least 1".into()));
        }

        if self.max_primary > self.max_total || self.max_secondary > self.max_total {
            return Err(LaborError::InvalidConfig(format!(
                "max_primary ({}) and max_secondary ({}) must not exceed max_total ({})",
                self.max_primary, self.max_secondary, self.max_total
            )));
        }

        if self.min_level > MAX_SKILL_LEVEL {
            return Err(LaborError::InvalidConfig(format!(
                "min_level ({}) exceeds the maximum skill level {}",
                self.min_level, MAX_SKILL_LEVEL
            )));
        }

        for (name, weight) in [
            ("busyness_penalty", self.busyness_penalty),
            ("passion_bonus", self.passion_bonus),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(LaborError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, weight
                )));
            }
        }

        if self.tier_divisors.contains(&0) {
            return Err(LaborError::InvalidConfig("tier_divisors must be non-zero".into()));
        }

        if self.tier_ceilings.contains(&0) {
            return Err(LaborError::InvalidConfig("tier_ceilings must be at least 1".into()));
        }

        Ok(())
    }
}

/// Contents of a config file
///
/// ```toml
/// [optimizer]
/// max_total = 5
///
/// [skill_map]
/// Hunting = ["Shooting", "Animals"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LaborConfig {
    pub optimizer: OptimizerConfig,
    /// Category name -> relevant skills; replaces the built-in entry
    pub skill_map: BTreeMap<String, Vec<String>>,
}

impl LaborConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LaborConfig = toml::from_str(content)?;
        config.optimizer.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            "Loaded config from {} ({} skill map overrides)",
            path.display(),
            config.skill_map.len()
        );
        Ok(config)
    }
}
