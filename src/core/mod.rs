pub mod config;
pub mod error;
pub mod types;

pub use config::{ArenaConfig, LlmConfig};
pub use error::{ArenaError, Result};
pub use types::{CombatantId, Round};
