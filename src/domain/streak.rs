/// Streak calculation over calendar days
///
/// This module defines the `StreakSummary` struct and the calculation used by
/// habits (completed entries) and workouts (every workout day counts).

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{HabitEntry, Workout};

/// Calculated streak information for a series of completion days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakSummary {
    /// Consecutive days ending today or yesterday
    pub current: u32,
    /// Longest run of consecutive days anywhere in history
    pub longest: u32,
    /// Most recent completion day (None if never completed)
    pub last_completed: Option<NaiveDate>,
}

impl StreakSummary {
    /// Calculate streaks from completion days
    ///
    /// Duplicate days are collapsed first. The current streak only counts if
    /// the most recent completion (on or before `today`) is today or yesterday.
    pub fn from_dates<I>(dates: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let days: BTreeSet<NaiveDate> = dates.into_iter().collect();

        let last_completed = days.iter().next_back().copied();
        let current = Self::current_run(&days, today);
        let longest = Self::longest_run(&days);

        Self {
            current,
            longest: longest.max(current),
            last_completed,
        }
    }

    /// Streak of days with at least one completed habit entry
    pub fn from_habit_entries(entries: &[HabitEntry], today: NaiveDate) -> Self {
        Self::from_dates(
            entries.iter().filter(|e| e.completed).map(|e| e.date),
            today,
        )
    }

    /// Streak of days with at least one workout
    pub fn from_workouts(workouts: &[Workout], today: NaiveDate) -> Self {
        Self::from_dates(workouts.iter().map(|w| w.date), today)
    }

    /// Get a motivational message based on current streak status
    pub fn motivational_message(&self) -> String {
        match self.current {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} days in a row.", self.current),
            7..=29 => format!("Excellent! {} days strong. You're in the groove now!", self.current),
            _ => format!("Incredible! {} days of consistency.", self.current),
        }
    }

    /// Walk backwards from today (or yesterday) counting consecutive days
    fn current_run(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
        let mut recent = days.range(..=today).rev();

        let Some(&first) = recent.next() else {
            return 0;
        };
        if (today - first).num_days() > 1 {
            return 0;
        }

        let mut current = 1;
        let mut previous = first;
        for &date in recent {
            if previous - date == Duration::days(1) {
                current += 1;
                previous = date;
            } else {
                break;
            }
        }
        current
    }

    /// Longest run of consecutive days in ascending order
    fn longest_run(days: &BTreeSet<NaiveDate>) -> u32 {
        let mut longest = 0;
        let mut run = 0;
        let mut last: Option<NaiveDate> = None;

        for &date in days {
            run = match last {
                Some(prev) if date - prev == Duration::days(1) => run + 1,
                _ => 1,
            };
            longest = longest.max(run);
            last = Some(date);
        }

        longest
    }
}
