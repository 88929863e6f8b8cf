//! Month grid of quests by target date

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::quest::Quest;

/// Rotating goal of the day, indexed by day of month
pub const DAILY_GOALS: [&str; 5] = [
    "Complete 1 'Strength' Quest",
    "Study for 1 hour (Academics)",
    "Meditate (Discipline)",
    "Review your progress",
    "Rest and recover",
];

pub fn daily_goal(date: NaiveDate) -> &'static str {
    DAILY_GOALS[date.day() as usize % DAILY_GOALS.len()]
}

/// Active quests targeting `date`
pub fn quests_on(quests: &[Quest], date: NaiveDate) -> Vec<&Quest> {
    quests
        .iter()
        .filter(|q| q.date == date && !q.completed)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarCell<'a> {
    pub date: NaiveDate,
    pub is_today: bool,
    pub quests: Vec<&'a Quest>,
}

/// One month laid out on a Sunday-first grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth<'a> {
    pub year: i32,
    pub month: u32,
    /// Blank cells before the 1st (Sunday = 0)
    pub leading_blanks: u32,
    pub days: Vec<CalendarCell<'a>>,
}

impl<'a> CalendarMonth<'a> {
    /// `None` if `month` is not 1-12 or the year is out of range
    pub fn build(year: i32, month: u32, today: NaiveDate, quests: &'a [Quest]) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };

        let days = first
            .iter_days()
            .take_while(|day| *day < next_first)
            .map(|date| CalendarCell {
                date,
                is_today: date == today,
                quests: quests_on(quests, date),
            })
            .collect();

        Some(Self {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }

    pub fn days_with_quests(&self) -> impl Iterator<Item = &CalendarCell<'a>> {
        self.days.iter().filter(|cell| !cell.quests.is_empty())
    }
}
