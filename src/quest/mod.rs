//! Quests - user-defined tasks that pay out stat XP when completed

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::error::ValidationError;
use crate::core::types::{QuestId, StatType, Xp};

/// Quest difficulty, 1 through 10. Doubles as the XP reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::DifficultyOutOfRange(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn xp_reward(&self) -> Xp {
        Xp::from(self.0)
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

/// An active quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub name: String,
    pub stat: StatType,
    pub difficulty: Difficulty,
    /// Target day, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Completion removes the quest, so this is false for every active quest
    pub completed: bool,
}

impl Quest {
    pub fn xp_reward(&self) -> Xp {
        self.difficulty.xp_reward()
    }
}

/// Unvalidated quest input as it arrives from a form or the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestDraft {
    /// Caller-chosen id. A UUID is generated when absent.
    pub id: Option<QuestId>,
    pub name: String,
    pub stat: StatType,
    pub difficulty: i64,
    pub date: String,
}

impl QuestDraft {
    pub fn new(
        name: impl Into<String>,
        stat: StatType,
        difficulty: i64,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            stat,
            difficulty,
            date: date.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<QuestId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Check every field and build the quest.
    ///
    /// Id uniqueness depends on the active collection and is checked by the
    /// engine, not here.
    pub fn validate(self) -> Result<Quest, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankQuestName);
        }
        let difficulty = Difficulty::new(self.difficulty)?;
        let date = parse_date(&self.date)?;

        Ok(Quest {
            id: self.id.unwrap_or_else(QuestId::generate),
            name: name.to_string(),
            stat: self.stat,
            difficulty,
            date,
            completed: false,
        })
    }
}

/// Parse a strict ISO 8601 calendar date (`YYYY-MM-DD`)
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}
