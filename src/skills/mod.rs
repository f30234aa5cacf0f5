//! Skill relevance for work categories
//!
//! Every category resolves to an ordered list of skills. Categories with no
//! skills are "basic" and carry no proficiency requirement.

pub mod skill_map;

pub use skill_map::{SkillMap, WorkCategory, KNOWN_SKILLS};
