//! Quest completion, stat XP, level and rank

pub mod engine;
pub mod level;
pub mod profile;
pub mod stats;

pub use engine::{Completion, ProgressionEngine};
pub use level::{level_and_rank, level_for, XP_PER_LEVEL};
pub use profile::{ProfileUpdate, UserProfile};
pub use stats::StatBlock;
