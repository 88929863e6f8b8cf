pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AriseError, ChatError, ConfigError, Result, ValidationError};
pub use types::{QuestId, Rank, StatType, Xp};
