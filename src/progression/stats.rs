//! Per-stat XP totals

use serde::{Deserialize, Serialize};

use crate::core::types::{StatType, Xp};

/// XP for each of the five stats. Every stat is always present.
///
/// Deserialization fails if any stat key is missing; nothing is zero-filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatBlock {
    pub academics: Xp,
    pub intelligence: Xp,
    pub strength: Xp,
    pub endurance: Xp,
    pub discipline: Xp,
}

impl StatBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: StatType) -> Xp {
        match stat {
            StatType::Academics => self.academics,
            StatType::Intelligence => self.intelligence,
            StatType::Strength => self.strength,
            StatType::Endurance => self.endurance,
            StatType::Discipline => self.discipline,
        }
    }

    fn get_mut(&mut self, stat: StatType) -> &mut Xp {
        match stat {
            StatType::Academics => &mut self.academics,
            StatType::Intelligence => &mut self.intelligence,
            StatType::Strength => &mut self.strength,
            StatType::Endurance => &mut self.endurance,
            StatType::Discipline => &mut self.discipline,
        }
    }

    /// Copy of this block with `xp` added to one stat
    pub fn with_gain(mut self, stat: StatType, xp: Xp) -> Self {
        let slot = self.get_mut(stat);
        *slot = slot.saturating_add(xp);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatType, Xp)> + '_ {
        StatType::ALL.into_iter().map(move |stat| (stat, self.get(stat)))
    }

    /// Lowest stat value; drives the level
    pub fn min(&self) -> Xp {
        self.iter().map(|(_, xp)| xp).min().unwrap_or(0)
    }

    pub fn max(&self) -> Xp {
        self.iter().map(|(_, xp)| xp).max().unwrap_or(0)
    }

    pub fn sum(&self) -> Xp {
        self.iter().fold(0, |acc, (_, xp)| acc.saturating_add(xp))
    }
}
