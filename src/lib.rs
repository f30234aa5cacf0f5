//! Colony Labor - skill-ranked work priority optimizer

pub mod backend;
pub mod core;
pub mod entity;
pub mod optimizer;
pub mod skills;
