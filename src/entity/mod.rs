pub mod worker;

pub use worker::{Skill, Worker};
