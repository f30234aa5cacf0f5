//! Workers and their skill records
//!
//! Roster data arrives from an external colony and is frequently incomplete.
//! Deserialization never fails on a bad skill: malformed levels read as 0,
//! unknown passion spellings read as no passion, and skill records that are
//! not objects at all are dropped. A `skills` or `disabled_work` field that
//! is not a list reads as empty, and a non-string name reads as "".

use crate::core::config::MAX_SKILL_LEVEL;
use crate::core::types::{canonicalize, CategoryKey, WorkerId};
use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};

/// A worker ("colonist") available for labor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_skills")]
    pub skills: Vec<Skill>,
    /// Categories this worker is wholly incapable of
    #[serde(default, deserialize_with = "lenient_disabled_work")]
    pub disabled_work: Vec<CategoryKey>,
}

/// One skill record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub name: String,
    /// 0..=20
    #[serde(default, deserialize_with = "lenient_level")]
    pub level: u8,
    /// Affinity for the skill, independent of level. 0 = none.
    #[serde(default, deserialize_with = "lenient_passion")]
    pub passion: u8,
    #[serde(default)]
    pub disabled: bool,
}

impl Skill {
    pub fn new(name: impl Into<String>, level: u8, passion: u8) -> Self {
        Self {
            name: name.into(),
            level: level.min(MAX_SKILL_LEVEL),
            passion,
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

impl Worker {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: WorkerId::new(id),
            name: name.into(),
            skills: Vec::new(),
            disabled_work: Vec::new(),
        }
    }

    pub fn with_skill(mut self, name: &str, level: u8, passion: u8) -> Self {
        self.skills.push(Skill::new(name, level, passion));
        self
    }

    pub fn with_disabled_skill(mut self, name: &str, level: u8) -> Self {
        self.skills.push(Skill::new(name, level, 0).disabled());
        self
    }

    pub fn incapable_of(mut self, category: &str) -> Self {
        self.disabled_work.push(CategoryKey::new(category));
        self
    }

    /// Look up a skill by name, ignoring case and punctuation
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        let wanted = canonicalize(name);
        self.skills.iter().find(|s| canonicalize(&s.name) == wanted)
    }

    pub fn is_incapable_of(&self, category: &CategoryKey) -> bool {
        self.disabled_work.contains(category)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawNumber {
    fn as_i64(&self) -> Option<i64> {
        match self {
            RawNumber::Int(v) => Some(*v),
            RawNumber::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            RawNumber::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn lenient_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawNumber::deserialize(deserializer)?;
    Ok(match raw.as_i64() {
        Some(level) => level.clamp(0, MAX_SKILL_LEVEL as i64) as u8,
        None => {
            tracing::warn!("Malformed skill level, treating as 0");
            0
        }
    })
}

fn lenient_passion<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawNumber::deserialize(deserializer)?;
    if let RawNumber::Text(text) = &raw {
        match canonicalize(text).as_str() {
            "none" | "" => return Ok(0),
            "minor" => return Ok(1),
            "major" => return Ok(2),
            _ => {}
        }
    }
    Ok(raw
        .as_i64()
        .map(|p| p.clamp(0, u8::MAX as i64) as u8)
        .unwrap_or(0))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeItem<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

/// A list field that may arrive as anything at all
#[derive(Deserialize)]
#[serde(untagged)]
enum RawList<T> {
    Seq(Vec<MaybeItem<T>>),
    Null(()),
    Other(IgnoredAny),
}

impl<T> RawList<T> {
    /// Keep well-formed items; returns (kept, dropped)
    fn into_valid(self, field: &str) -> (Vec<T>, usize) {
        match self {
            RawList::Seq(items) => {
                let total = items.len();
                let kept: Vec<T> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        MaybeItem::Valid(value) => Some(value),
                        MaybeItem::Invalid(_) => None,
                    })
                    .collect();
                let dropped = total - kept.len();
                (kept, dropped)
            }
            RawList::Null(()) => (Vec::new(), 0),
            RawList::Other(_) => {
                tracing::warn!("Worker {} is not a list, treating as empty", field);
                (Vec::new(), 0)
            }
        }
    }
}

fn lenient_skills<'de, D>(deserializer: D) -> Result<Vec<Skill>, D::Error>
where
    D: Deserializer<'de>,
{
    let (skills, dropped) = RawList::<Skill>::deserialize(deserializer)?.into_valid("skills");
    if dropped > 0 {
        tracing::warn!("Dropped {} malformed skill records", dropped);
    }
    Ok(skills)
}

fn lenient_disabled_work<'de, D>(deserializer: D) -> Result<Vec<CategoryKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let (keys, dropped) = RawList::<CategoryKey>::deserialize(deserializer)?.into_valid("disabled_work");
    if dropped > 0 {
        tracing::warn!("Dropped {} malformed disabled_work entries", dropped);
    }
    Ok(keys)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Other(IgnoredAny),
}

/// Names are display-only; anything but a string reads as empty
fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawText::deserialize(deserializer)? {
        RawText::Text(name) => name,
        RawText::Other(_) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_lookup_ignores_case() {
        let worker = Worker::new("w1", "Engie").with_skill("Medicine", 12, 1);
        assert_eq!(worker.skill("medicine").map(|s| s.level), Some(12));
        assert!(worker.skill("Shooting").is_none());
    }

    #[test]
    fn test_deserialize_well_formed_worker() {
        let json = r#"{
            "id": "colonist_7",
            "name": "Hana",
            "skills": [
                {"name": "Medicine", "level": 14, "passion": 2},
                {"name": "Shooting", "level": 3, "passion": 0, "disabled": true}
            ],
            "disabled_work": ["Fire fighting"]
        }"#;
        let worker: Worker = serde_json::from_str(json).unwrap();

        assert_eq!(worker.id.as_str(), "colonist_7");
        assert_eq!(worker.skills.len(), 2);
        assert!(worker.skill("Shooting").unwrap().disabled);
        assert!(worker.is_incapable_of(&CategoryKey::new("Firefighting")));
    }

    #[test]
    fn test_malformed_levels_default_to_zero() {
        let json = r#"{
            "id": "w",
            "skills": [
                {"name": "Cooking", "level": "nine"},
                {"name": "Mining", "level": null},
                {"name": "Crafting"},
                {"name": "Plants", "level": "11"},
                {"name": "Social", "level": 45},
                {"name": "Animals", "level": -3}
            ]
        }"#;
        let worker: Worker = serde_json::from_str(json).unwrap();

        assert_eq!(worker.skill("Cooking").unwrap().level, 0);
        assert_eq!(worker.skill("Mining").unwrap().level, 0);
        assert_eq!(worker.skill("Crafting").unwrap().level, 0);
        assert_eq!(worker.skill("Plants").unwrap().level, 11);
        assert_eq!(worker.skill("Social").unwrap().level, 20);
        assert_eq!(worker.skill("Animals").unwrap().level, 0);
    }

    #[test]
    fn test_passion_accepts_names_and_numbers() {
        let json = r#"{
            "id": "w",
            "skills": [
                {"name": "Cooking", "level": 8, "passion": "Major"},
                {"name": "Mining", "level": 8, "passion": "minor"},
                {"name": "Plants", "level": 8, "passion": "None"},
                {"name": "Crafting", "level": 8, "passion": -1},
                {"name": "Artistic", "level": 8, "passion": 1}
            ]
        }"#;
        let worker: Worker = serde_json::from_str(json).unwrap();

        assert_eq!(worker.skill("Cooking").unwrap().passion, 2);
        assert_eq!(worker.skill("Mining").unwrap().passion, 1);
        assert_eq!(worker.skill("Plants").unwrap().passion, 0);
        assert_eq!(worker.skill("Crafting").unwrap().passion, 0);
        assert_eq!(worker.skill("Artistic").unwrap().passion, 1);
    }

    #[test]
    fn test_non_object_skills_are_dropped() {
        let json = r#"{"id": "w", "skills": [42, "Medicine", {"name": "Medicine", "level": 9}]}"#;
        let worker: Worker = serde_json::from_str(json).unwrap();
        assert_eq!(worker.skills.len(), 1);

        let json = r#"{"id": "w", "skills": null}"#;
        let worker: Worker = serde_json::from_str(json).unwrap();
        assert!(worker.skills.is_empty());
    }

    #[test]
    fn test_skills_that_are_not_a_list_read_as_empty() {
        for skills in [r#"{"Medicine": 10}"#, r#""none""#, "7", "true"] {
            let json = format!(r#"{{"id": "w", "name": "Hana", "skills": {}}}"#, skills);
            let worker: Worker = serde_json::from_str(&json).unwrap();
            assert!(worker.skills.is_empty(), "skills = {}", skills);
            assert_eq!(worker.name, "Hana");
        }
    }

    #[test]
    fn test_malformed_name_and_disabled_work_do_not_fail_the_worker() {
        let json = r#"{"id": "w", "name": null, "skills": [{"name": "Medicine", "level": 9}], "disabled_work": "all"}"#;
        let worker: Worker = serde_json::from_str(json).unwrap();
        assert_eq!(worker.name, "");
        assert!(worker.disabled_work.is_empty());
        assert_eq!(worker.skill("Medicine").unwrap().level, 9);

        let json = r#"{"id": "w", "name": 12, "disabled_work": ["Firefighter", 3]}"#;
        let worker: Worker = serde_json::from_str(json).unwrap();
        assert_eq!(worker.name, "");
        assert_eq!(worker.disabled_work, vec![CategoryKey::new("Firefighter")]);
    }
}
