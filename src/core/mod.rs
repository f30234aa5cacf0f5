pub mod config;
pub mod error;
pub mod types;

pub use config::{LaborConfig, OptimizerConfig};
pub use error::{LaborError, Result};
pub use types::{canonicalize, CategoryKey, Priority, WorkerId};
