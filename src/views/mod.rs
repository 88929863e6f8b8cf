//! Read-only views derived from engine state for a front-end to render

pub mod calendar;

pub use calendar::{daily_goal, quests_on, CalendarCell, CalendarMonth, DAILY_GOALS};

use serde::Serialize;

use crate::core::types::{StatType, Xp};
use crate::progression::stats::StatBlock;
use crate::quest::Quest;

/// Total XP between milestones
pub const MILESTONE_XP: Xp = 1_000;

/// Floor of the stat chart's radial axis
pub const CHART_MIN_SCALE: Xp = 100;

/// Active quests, hardest first. Ties keep insertion order.
pub fn quest_log(quests: &[Quest]) -> Vec<&Quest> {
    let mut sorted: Vec<&Quest> = quests.iter().collect();
    sorted.sort_by(|a, b| b.difficulty.cmp(&a.difficulty));
    sorted
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub stat: StatType,
    pub label: char,
    pub value: Xp,
}

/// Radar chart data: one point per stat plus the shared axis maximum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatChart {
    pub points: Vec<ChartPoint>,
    pub scale: Xp,
}

impl StatChart {
    pub fn from_stats(stats: &StatBlock) -> Self {
        let points = stats
            .iter()
            .map(|(stat, value)| ChartPoint {
                stat,
                label: stat.initial(),
                value,
            })
            .collect();
        Self {
            points,
            scale: stats.max().max(CHART_MIN_SCALE),
        }
    }
}

/// Progress toward the next multiple of [`MILESTONE_XP`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub progress: Xp,
    pub remaining: Xp,
    pub percent: u8,
}

impl Milestone {
    pub fn for_total_xp(total_xp: Xp) -> Self {
        let progress = total_xp % MILESTONE_XP;
        Self {
            progress,
            remaining: MILESTONE_XP - progress,
            percent: (progress / 10).min(100) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::QuestDraft;

    #[test]
    fn test_quest_log_sorts_by_difficulty_stably() {
        let quests: Vec<Quest> = [("a", 3), ("b", 8), ("c", 3), ("d", 10)]
            .into_iter()
            .map(|(id, difficulty)| {
                QuestDraft::new(id, StatType::Strength, difficulty, "2025-01-01")
                    .with_id(id)
                    .validate()
                    .unwrap()
            })
            .collect();
        let order: Vec<&str> = quest_log(&quests).iter().map(|q| q.id.as_str()).collect();
        assert_eq!(order, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_chart_scale_floor() {
        let chart = StatChart::from_stats(&StatBlock::new().with_gain(StatType::Academics, 40));
        assert_eq!(chart.scale, 100);
        assert_eq!(chart.points.len(), 5);
        assert_eq!(chart.points[0].label, 'A');
        assert_eq!(chart.points[0].value, 40);

        let chart = StatChart::from_stats(&StatBlock::new().with_gain(StatType::Strength, 340));
        assert_eq!(chart.scale, 340);
    }

    #[test]
    fn test_milestone() {
        assert_eq!(
            Milestone::for_total_xp(0),
            Milestone { progress: 0, remaining: 1_000, percent: 0 }
        );
        assert_eq!(
            Milestone::for_total_xp(2_345),
            Milestone { progress: 345, remaining: 655, percent: 34 }
        );
        assert_eq!(Milestone::for_total_xp(1_999).percent, 99);
    }
}
