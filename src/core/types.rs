//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a worker, as issued by the backing colony
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Fold a name to its lookup form: lowercase, alphanumerics only.
///
/// "PlantCutting", "plant_cutting" and "Plant cutting" all fold to "plantcutting".
pub fn canonicalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized work category key
///
/// Construction always canonicalizes, so two keys compare equal exactly when
/// their source names differ only in case or punctuation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CategoryKey(String);

impl CategoryKey {
    pub fn new(raw: &str) -> Self {
        Self(canonicalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CategoryKey {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for CategoryKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<CategoryKey> for String {
    fn from(key: CategoryKey) -> Self {
        key.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Work priority tiers with explicit wire values
///
/// Lower non-zero value = scarcer, higher-precedence tier.
/// `Disabled` (0) means the worker does not do this work at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Priority {
    #[default]
    Disabled = 0,
    Primary = 1,
    Secondary = 2,
    Tertiary = 3,
    Fallback = 4,
}

impl Priority {
    /// Tiers in the order the allocator fills them
    pub const ACTIVE: [Priority; 4] = [
        Priority::Primary,
        Priority::Secondary,
        Priority::Tertiary,
        Priority::Fallback,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn is_active(self) -> bool {
        self != Priority::Disabled
    }

    /// Sort rank used for tie-breaking: active tiers ascending, disabled last.
    pub fn stability_rank(self) -> u8 {
        match self {
            Priority::Disabled => 5,
            other => other.value(),
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Priority::Disabled),
            1 => Ok(Priority::Primary),
            2 => Ok(Priority::Secondary),
            3 => Ok(Priority::Tertiary),
            4 => Ok(Priority::Fallback),
            other => Err(format!("priority must be 0-4, got {}", other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.value()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
