/// Goal progress
///
/// A goal's current value is measured over its period ending today. Weight
/// goals measure how much of the distance from the first weigh-in of the
/// period to the target has been closed.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    CalorieEntry, DateWindow, Goal, GoalPeriod, GoalType, HabitEntry, UserId, WaterEntry,
    WeightEntry, Workout,
};
use crate::storage::{RecordStore, StorageError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal_id: String,
    pub title: String,
    pub goal_type: GoalType,
    pub period: GoalPeriod,
    pub window: DateWindow,
    pub target: f64,
    pub current: f64,
    /// Weight at the start of the window (weight goals only)
    pub baseline: Option<f64>,
    /// 0 to 100
    pub percent: f64,
    pub achieved: bool,
}

impl GoalProgress {
    /// Build progress from an already measured value
    pub fn from_values(
        goal: &Goal,
        window: DateWindow,
        current: f64,
        baseline: Option<f64>,
    ) -> Self {
        let percent = match (goal.goal_type, baseline) {
            (GoalType::Weight, Some(start)) => weight_percent(start, current, goal.target),
            (GoalType::Weight, None) => 0.0,
            _ => (current / goal.target * 100.0).clamp(0.0, 100.0),
        };

        Self {
            goal_id: goal.id.to_string(),
            title: goal.display_title(),
            goal_type: goal.goal_type,
            period: goal.period,
            window,
            target: goal.target,
            current,
            baseline,
            percent,
            achieved: percent >= 100.0,
        }
    }

    /// Read the records the goal depends on and measure it
    pub fn measure<S: RecordStore + ?Sized>(
        storage: &S,
        user: &UserId,
        goal: &Goal,
        today: NaiveDate,
    ) -> Result<Self, StorageError> {
        let window = goal.period.window(today);

        let (current, baseline) = match goal.goal_type {
            GoalType::Calories => {
                let entries: Vec<CalorieEntry> = storage.list_in_window(user, window)?;
                (entries.iter().map(|e| e.calories).sum(), None)
            }
            GoalType::Workouts => {
                let workouts: Vec<Workout> = storage.list_in_window(user, window)?;
                (workouts.len() as f64, None)
            }
            GoalType::Water => {
                let entries: Vec<WaterEntry> = storage.list_in_window(user, window)?;
                (entries.iter().map(|e| e.amount_ml).sum(), None)
            }
            GoalType::HabitCompletions => {
                let entries: Vec<HabitEntry> = storage.list_in_window(user, window)?;
                (entries.iter().filter(|e| e.completed).count() as f64, None)
            }
            GoalType::Weight => {
                let mut entries: Vec<WeightEntry> = storage.list_in_window(user, window)?;
                entries.sort_by_key(|e| (e.date, e.created_at));
                match (entries.first(), entries.last()) {
                    (Some(first), Some(last)) => (last.weight_kg, Some(first.weight_kg)),
                    _ => (0.0, None),
                }
            }
        };

        Ok(Self::from_values(goal, window, current, baseline))
    }
}

/// Share of the distance from `start` to `target` already covered
fn weight_percent(start: f64, current: f64, target: f64) -> f64 {
    let total = target - start;
    if total.abs() < f64::EPSILON {
        return if (current - target).abs() < f64::EPSILON { 100.0 } else { 0.0 };
    }
    ((current - start) / total * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    fn user() -> UserId {
        UserId::new("goalie").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    #[test]
    fn test_weight_percent_both_directions() {
        assert_eq!(weight_percent(90.0, 85.0, 80.0), 50.0);
        assert_eq!(weight_percent(60.0, 63.0, 66.0), 50.0);
        assert_eq!(weight_percent(90.0, 92.0, 80.0), 0.0);
        assert_eq!(weight_percent(80.0, 80.0, 80.0), 100.0);
    }

    #[test]
    fn test_sum_goal_is_capped() {
        let goal = Goal::new(user(), GoalType::Water, 2000.0, GoalPeriod::Daily, None, None).unwrap();
        let window = GoalPeriod::Daily.window(day(1));
        let progress = GoalProgress::from_values(&goal, window, 2500.0, None);
        assert_eq!(progress.percent, 100.0);
        assert!(progress.achieved);
    }

    #[test]
    fn test_measure_weekly_workouts() {
        let storage = SqliteStorage::in_memory().unwrap();
        for d in [1, 5, 7, 8] {
            let workout = Workout::new(
                user(),
                day(d),
                "Lift".to_string(),
                Default::default(),
                Default::default(),
                None,
            )
            .unwrap();
            storage.insert_record(&workout).unwrap();
        }
        let goal = Goal::new(user(), GoalType::Workouts, 4.0, GoalPeriod::Weekly, None, None).unwrap();

        // Window is Sep 2..=8
        let progress = GoalProgress::measure(&storage, &user(), &goal, day(8)).unwrap();
        assert_eq!(progress.current, 3.0);
        assert_eq!(progress.percent, 75.0);
        assert!(!progress.achieved);
    }

    #[test]
    fn test_measure_weight_goal() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.insert_record(&WeightEntry::new(user(), day(2), 84.0, None).unwrap()).unwrap();
        storage.insert_record(&WeightEntry::new(user(), day(20), 81.0, None).unwrap()).unwrap();
        let goal = Goal::new(user(), GoalType::Weight, 78.0, GoalPeriod::Monthly, None, None).unwrap();

        let progress = GoalProgress::measure(&storage, &user(), &goal, day(25)).unwrap();
        assert_eq!(progress.baseline, Some(84.0));
        assert_eq!(progress.current, 81.0);
        assert_eq!(progress.percent, 50.0);
    }
}
