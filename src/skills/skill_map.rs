//! Work category catalogue - which skills matter for which work
//!
//! The map is static configuration. Lookups canonicalize the category name
//! first, so id-style ("PlantCutting") and label-style ("plant cutting")
//! names resolve to the same entry. Unknown categories have no relevant
//! skills and are therefore basic.

use crate::core::types::{canonicalize, CategoryKey};
use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Skill names the built-in catalogue refers to
pub const KNOWN_SKILLS: [&str; 12] = [
    "Shooting",
    "Melee",
    "Construction",
    "Mining",
    "Cooking",
    "Plants",
    "Animals",
    "Crafting",
    "Artistic",
    "Medicine",
    "Social",
    "Intellectual",
];

/// A work category with its relevant skills resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkCategory {
    pub key: CategoryKey,
    /// Name as supplied by the caller or catalogue
    pub label: String,
    /// Ordered; empty for basic work
    pub relevant_skills: Vec<String>,
}

impl WorkCategory {
    pub fn new(label: &str, relevant_skills: Vec<String>) -> Self {
        Self {
            key: CategoryKey::new(label),
            label: label.to_string(),
            relevant_skills,
        }
    }

    /// Basic work has no proficiency requirement
    pub fn is_basic(&self) -> bool {
        self.relevant_skills.is_empty()
    }
}

#[derive(Debug, Clone)]
struct SkillMapEntry {
    label: String,
    skills: Vec<String>,
}

/// Catalogue of work categories in display order
#[derive(Debug, Clone, Default)]
pub struct SkillMap {
    entries: Vec<(CategoryKey, SkillMapEntry)>,
    index: AHashMap<CategoryKey, usize>,
}

impl SkillMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in catalogue of colony work types
    pub fn with_defaults() -> Self {
        let mut map = Self::new();

        // Skilled work precedes basic work in the default processing order
        map.insert("Doctor", &["Medicine"]);
        map.insert("Warden", &["Social"]);
        map.insert("Childcare", &["Social"]);
        map.insert("Handling", &["Animals"]);

        // Production
        map.insert("Cooking", &["Cooking"]);
        map.insert("Hunting", &["Shooting"]);
        map.insert("Construction", &["Construction"]);
        map.insert("Growing", &["Plants"]);
        map.insert("Mining", &["Mining"]);
        map.insert("PlantCutting", &["Plants"]);
        map.insert("Smithing", &["Crafting"]);
        map.insert("Tailoring", &["Crafting"]);
        map.insert("Art", &["Artistic"]);
        map.insert("Crafting", &["Crafting"]);
        map.insert("Research", &["Intellectual"]);

        // Basic work
        map.insert("Firefighter", &[]);
        map.insert("BasicWorker", &[]);
        map.insert("Hauling", &[]);
        map.insert("Cleaning", &[]);

        map
    }

    /// Insert or replace a category entry
    pub fn insert(&mut self, label: &str, skills: &[&str]) {
        self.set(label, skills.iter().map(|s| s.to_string()).collect());
    }

    fn set(&mut self, label: &str, skills: Vec<String>) {
        let key = CategoryKey::new(label);
        let entry = SkillMapEntry {
            label: label.to_string(),
            skills,
        };
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1.skills = entry.skills,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, entry));
            }
        }
    }

    /// Apply `[skill_map]` overrides from a config file
    ///
    /// Each override replaces the named category's skill list outright.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, Vec<String>>) {
        let known: Vec<String> = KNOWN_SKILLS.iter().map(|s| canonicalize(s)).collect();
        for (label, skills) in overrides {
            for skill in skills {
                if !known.contains(&canonicalize(skill)) {
                    tracing::warn!("Skill map override for {} names unknown skill {}", label, skill);
                }
            }
            self.set(label, skills.clone());
        }
    }

    /// Skills relevant to a category; empty when the category is basic or unknown
    pub fn relevant_skills(&self, category: &str) -> &[String] {
        self.relevant_skills_for(&CategoryKey::new(category))
    }

    pub fn relevant_skills_for(&self, key: &CategoryKey) -> &[String] {
        self.index
            .get(key)
            .map(|&i| self.entries[i].1.skills.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, category: &str) -> bool {
        self.index.contains_key(&CategoryKey::new(category))
    }

    /// Resolve a category name into a [`WorkCategory`]
    pub fn category(&self, name: &str) -> WorkCategory {
        WorkCategory::new(name, self.relevant_skills(name).to_vec())
    }

    /// Every catalogued category, in catalogue order
    pub fn categories(&self) -> Vec<WorkCategory> {
        self.entries
            .iter()
            .map(|(key, entry)| WorkCategory {
                key: key.clone(),
                label: entry.label.clone(),
                relevant_skills: entry.skills.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_and_id_styles_resolve_identically() {
        let map = SkillMap::with_defaults();
        assert_eq!(map.relevant_skills("PlantCutting"), &["Plants".to_string()]);
        assert_eq!(map.relevant_skills("plant cutting"), &["Plants".to_string()]);
        assert_eq!(map.relevant_skills("Plant_Cutting"), &["Plants".to_string()]);
    }

    #[test]
    fn test_unknown_category_is_basic() {
        let map = SkillMap::with_defaults();
        assert!(map.relevant_skills("Underwater Basket Weaving").is_empty());
        assert!(map.category("Underwater Basket Weaving").is_basic());
        assert!(map.category("Hauling").is_basic());
        assert!(!map.category("Doctor").is_basic());
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let mut map = SkillMap::with_defaults();
        let before = map.len();

        let mut overrides = BTreeMap::new();
        overrides.insert("hunting".to_string(), vec!["Shooting".into(), "Animals".into()]);
        overrides.insert("Brewing".to_string(), vec!["Cooking".into()]);
        map.apply_overrides(&overrides);

        assert_eq!(map.relevant_skills("Hunting").len(), 2);
        assert_eq!(map.relevant_skills("Brewing"), &["Cooking".to_string()]);
        assert_eq!(map.len(), before + 1);
    }

    #[test]
    fn test_categories_keep_catalogue_order() {
        let map = SkillMap::with_defaults();
        let categories = map.categories();
        assert_eq!(categories.first().map(|c| c.label.as_str()), Some("Doctor"));
        assert_eq!(categories.last().map(|c| c.label.as_str()), Some("Cleaning"));
        assert_eq!(categories.len(), map.len());
    }

    #[test]
    fn test_basic_work_follows_skilled_work() {
        let categories = SkillMap::with_defaults().categories();
        let first_basic = categories.iter().position(|c| c.is_basic()).unwrap();
        assert!(
            categories[first_basic..].iter().all(|c| c.is_basic()),
            "skilled category listed after basic work"
        );
        assert!(!SkillMap::with_defaults().contains("PatientBedRest"));
    }
}
