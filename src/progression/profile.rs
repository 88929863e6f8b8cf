//! The player profile

use serde::{Deserialize, Serialize};

use crate::core::config::ProfileConfig;
use crate::core::error::ValidationError;
use crate::core::types::{Rank, Xp};
use crate::progression::level::level_and_rank;
use crate::progression::stats::StatBlock;

/// Player profile.
///
/// `level` and `rank` are a cache of [`level_and_rank`] over the stats and
/// `total_xp`; only the engine writes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub level: u32,
    pub rank: Rank,
    pub total_xp: Xp,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
            level: 1,
            rank: Rank::E,
            total_xp: 0,
        }
    }

    /// Recompute level and rank. Returns true if the cached pair was stale.
    pub(crate) fn refresh(&mut self, stats: &StatBlock) -> bool {
        let (level, rank) = level_and_rank(stats, self.total_xp);
        let stale = level != self.level || rank != self.rank;
        self.level = level;
        self.rank = rank;
        stale
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::from(&ProfileConfig::default())
    }
}

impl From<&ProfileConfig> for UserProfile {
    fn from(config: &ProfileConfig) -> Self {
        Self::new(config.default_name.clone(), config.default_age)
    }
}

/// Partial profile edit. Only name and age are user-editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none()
    }

    /// Apply to `profile`, all or nothing
    pub(crate) fn apply(self, profile: &mut UserProfile) -> Result<(), ValidationError> {
        let name = match self.name {
            Some(name) if name.trim().is_empty() => {
                return Err(ValidationError::BlankProfileName)
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };
        if self.age == Some(0) {
            return Err(ValidationError::NonPositiveAge);
        }

        if let Some(name) = name {
            profile.name = name;
        }
        if let Some(age) = self.age {
            profile.age = age;
        }
        Ok(())
    }
}
