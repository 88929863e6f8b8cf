//! Arise - personal quest tracker
//!
//! Quests pay XP into five life stats. Level follows the weakest stat,
//! rank follows total XP, and the whole state persists as one snapshot.

pub mod core;
pub mod llm;
pub mod persistence;
pub mod progression;
pub mod quest;
pub mod views;
