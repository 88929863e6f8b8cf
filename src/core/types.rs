//! Core type definitions used throughout the codebase

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::ValidationError;

/// Experience points, per stat and in total
pub type Xp = u64;

/// Unique identifier for quests
///
/// Opaque string token. Newly created quests get a UUID v4; ids read back
/// from older snapshots are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(String);

impl QuestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for QuestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The five life-stat dimensions a quest can train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatType {
    Academics,
    Intelligence,
    Strength,
    Endurance,
    Discipline,
}

impl StatType {
    pub const ALL: [StatType; 5] = [
        StatType::Academics,
        StatType::Intelligence,
        StatType::Strength,
        StatType::Endurance,
        StatType::Discipline,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StatType::Academics => "Academics",
            StatType::Intelligence => "Intelligence",
            StatType::Strength => "Strength",
            StatType::Endurance => "Endurance",
            StatType::Discipline => "Discipline",
        }
    }

    /// Single-letter label used on the stat chart
    pub fn initial(&self) -> char {
        match self {
            StatType::Academics => 'A',
            StatType::Intelligence => 'I',
            StatType::Strength => 'S',
            StatType::Endurance => 'E',
            StatType::Discipline => 'D',
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatType::ALL
            .into_iter()
            .find(|stat| stat.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownStat(s.to_string()))
    }
}

/// Ordinal tier derived from total XP, lowest first
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Rank {
    #[default]
    E,
    D,
    C,
    B,
    A,
    S,
    SS,
    SSS,
}

impl Rank {
    /// Lower XP bound of each rank, highest rank first
    pub const THRESHOLDS: [(Xp, Rank); 8] = [
        (50_000, Rank::SSS),
        (20_000, Rank::SS),
        (10_000, Rank::S),
        (5_000, Rank::A),
        (2_000, Rank::B),
        (1_000, Rank::C),
        (500, Rank::D),
        (0, Rank::E),
    ];

    /// Rank earned by a total XP value. Bounds are inclusive.
    pub fn for_total_xp(total_xp: Xp) -> Rank {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| total_xp >= *min)
            .map(|(_, rank)| *rank)
            .unwrap_or(Rank::E)
    }

    /// Total XP needed to hold this rank
    pub fn min_xp(&self) -> Xp {
        Self::THRESHOLDS
            .iter()
            .find(|(_, rank)| rank == self)
            .map(|(min, _)| *min)
            .unwrap_or(0)
    }

    pub fn next(&self) -> Option<Rank> {
        match self {
            Rank::E => Some(Rank::D),
            Rank::D => Some(Rank::C),
            Rank::C => Some(Rank::B),
            Rank::B => Some(Rank::A),
            Rank::A => Some(Rank::S),
            Rank::S => Some(Rank::SS),
            Rank::SS => Some(Rank::SSS),
            Rank::SSS => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rank::E => "E",
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
            Rank::SS => "SS",
            Rank::SSS => "SSS",
        };
        f.write_str(label)
    }
}
