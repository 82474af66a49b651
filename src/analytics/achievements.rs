/// Achievement checking and progress
///
/// Metrics are derived from scratch on every call: all workouts, calorie
/// entries, habits and habit entries are re-read and streaks recomputed.
/// Nothing is cached between calls.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{
    AchievementDefinition, AchievementMetric, AchievementUnlock, CalorieEntry, Habit, HabitEntry,
    StreakSummary, UserId, Workout, ACHIEVEMENTS,
};
use crate::storage::{DateFilter, RecordStore, StorageError};

/// Everything the catalog is measured against
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AchievementMetrics {
    pub workout_streak: u32,
    pub total_workouts: usize,
    pub calories_burned: f64,
    /// Days with food logged among the last 7 (today included)
    pub logged_days_week: u32,
    /// Days with food logged among the last 30 (today included)
    pub logged_days_month: u32,
    /// Best current streak across all habits
    pub habit_streak: u32,
}

impl AchievementMetrics {
    pub fn from_records(
        workouts: &[Workout],
        calories: &[CalorieEntry],
        habits: &[Habit],
        habit_entries: &[HabitEntry],
        today: NaiveDate,
    ) -> Self {
        let logged_days: BTreeSet<NaiveDate> = calories.iter().map(|c| c.date).collect();
        let logged_within = |days: i64| {
            let start = today - Duration::days(days - 1);
            logged_days.range(start..=today).count() as u32
        };

        let habit_streak = habits
            .iter()
            .map(|habit| {
                let own: Vec<HabitEntry> = habit_entries
                    .iter()
                    .filter(|e| e.habit_id == habit.id)
                    .cloned()
                    .collect();
                StreakSummary::from_habit_entries(&own, today).current
            })
            .max()
            .unwrap_or(0);

        Self {
            workout_streak: StreakSummary::from_workouts(workouts, today).current,
            total_workouts: workouts.len(),
            calories_burned: workouts.iter().map(|w| w.calories_burned()).sum(),
            logged_days_week: logged_within(7),
            logged_days_month: logged_within(30),
            habit_streak,
        }
    }

    /// Fetch every record the metrics depend on and derive them
    pub fn derive<S: RecordStore + ?Sized>(
        storage: &S,
        user: &UserId,
        today: NaiveDate,
    ) -> Result<Self, StorageError> {
        let workouts: Vec<Workout> = storage.list_records(user, DateFilter::Any)?;
        let calories: Vec<CalorieEntry> = storage.list_records(user, DateFilter::Any)?;
        let habits: Vec<Habit> = storage.list_records(user, DateFilter::Any)?;
        let entries: Vec<HabitEntry> = storage.list_records(user, DateFilter::Any)?;

        Ok(Self::from_records(&workouts, &calories, &habits, &entries, today))
    }

    pub fn value(&self, metric: AchievementMetric) -> f64 {
        match metric {
            AchievementMetric::WorkoutStreak => self.workout_streak as f64,
            AchievementMetric::TotalWorkouts => self.total_workouts as f64,
            AchievementMetric::CaloriesBurned => self.calories_burned,
            AchievementMetric::PerfectWeek => self.logged_days_week as f64,
            AchievementMetric::PerfectMonth => self.logged_days_month as f64,
            AchievementMetric::HabitStreak => self.habit_streak as f64,
        }
    }
}

/// Progress toward one catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementProgress {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub current: f64,
    pub threshold: f64,
    /// 0 to 100; always 100 once unlocked
    pub percent: u8,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

fn percent_of(current: f64, threshold: f64) -> u8 {
    if threshold <= 0.0 {
        return 100;
    }
    ((current / threshold) * 100.0).clamp(0.0, 100.0).floor() as u8
}

/// Unlock every achievement whose threshold is now met
///
/// Returns the newly unlocked definitions; ones already unlocked are skipped.
pub fn check_achievements<S: RecordStore + ?Sized>(
    storage: &S,
    user: &UserId,
    today: NaiveDate,
) -> Result<Vec<&'static AchievementDefinition>, StorageError> {
    let metrics = AchievementMetrics::derive(storage, user, today)?;
    let unlocked: Vec<AchievementUnlock> = storage.list_records(user, DateFilter::Any)?;

    let mut newly_unlocked = Vec::new();
    for definition in ACHIEVEMENTS {
        if unlocked.iter().any(|u| u.achievement_id == definition.id) {
            continue;
        }
        if metrics.value(definition.metric) >= definition.threshold {
            storage.insert_record(&AchievementUnlock::new(user.clone(), definition.id))?;
            tracing::info!("Achievement unlocked for {}: {}", user, definition.id);
            newly_unlocked.push(definition);
        }
    }

    Ok(newly_unlocked)
}

/// Progress for every achievement in catalog order
pub fn achievement_progress<S: RecordStore + ?Sized>(
    storage: &S,
    user: &UserId,
    today: NaiveDate,
) -> Result<Vec<AchievementProgress>, StorageError> {
    let metrics = AchievementMetrics::derive(storage, user, today)?;
    let unlocked: Vec<AchievementUnlock> = storage.list_records(user, DateFilter::Any)?;

    Ok(ACHIEVEMENTS
        .iter()
        .map(|definition| {
            let unlock = unlocked.iter().find(|u| u.achievement_id == definition.id);
            let current = metrics.value(definition.metric);
            AchievementProgress {
                id: definition.id,
                name: definition.name,
                description: definition.description,
                icon: definition.icon,
                current,
                threshold: definition.threshold,
                percent: if unlock.is_some() {
                    100
                } else {
                    percent_of(current, definition.threshold)
                },
                unlocked: unlock.is_some(),
                unlocked_at: unlock.map(|u| u.unlocked_at),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExerciseDetails, WorkoutCategory};
    use crate::storage::SqliteStorage;

    fn user() -> UserId {
        UserId::new("athlete").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn log_workout(storage: &SqliteStorage, date: NaiveDate, burned: f64) {
        let details = ExerciseDetails { calories_burned: Some(burned), ..Default::default() };
        let workout = Workout::new(
            user(),
            date,
            "Row".to_string(),
            WorkoutCategory::Cardio,
            details,
            None,
        )
        .unwrap();
        storage.insert_record(&workout).unwrap();
    }

    #[test]
    fn test_percent_is_clamped() {
        assert_eq!(percent_of(5.0, 10.0), 50);
        assert_eq!(percent_of(25.0, 10.0), 100);
        assert_eq!(percent_of(0.0, 7.0), 0);
    }

    #[test]
    fn test_metrics_from_records() {
        let workouts: Vec<Workout> = (8..=10)
            .map(|d| {
                let details = ExerciseDetails { calories_burned: Some(400.0), ..Default::default() };
                Workout::new(user(), day(d), "Bike".to_string(), WorkoutCategory::Cardio, details, None)
                    .unwrap()
            })
            .collect();

        let metrics = AchievementMetrics::from_records(&workouts, &[], &[], &[], day(10));
        assert_eq!(metrics.total_workouts, 3);
        assert_eq!(metrics.workout_streak, 3);
        assert_eq!(metrics.calories_burned, 1200.0);
        assert_eq!(metrics.habit_streak, 0);
    }

    #[test]
    fn test_check_unlocks_once() {
        let storage = SqliteStorage::in_memory().unwrap();
        for d in 1..=3 {
            log_workout(&storage, day(d), 400.0);
        }

        let first: Vec<&str> = check_achievements(&storage, &user(), day(3))
            .unwrap()
            .iter()
            .map(|a| a.id)
            .collect();
        assert!(first.contains(&"first_workout"));
        assert!(first.contains(&"streak_3"));
        assert!(first.contains(&"burn_1000"));
        assert!(!first.contains(&"workouts_10"));

        // Nothing new the second time around
        assert!(check_achievements(&storage, &user(), day(3)).unwrap().is_empty());
    }

    #[test]
    fn test_progress_reports_unlocked_as_full() {
        let storage = SqliteStorage::in_memory().unwrap();
        log_workout(&storage, day(1), 100.0);
        check_achievements(&storage, &user(), day(1)).unwrap();

        let progress = achievement_progress(&storage, &user(), day(1)).unwrap();
        assert_eq!(progress.len(), ACHIEVEMENTS.len());

        let first = progress.iter().find(|p| p.id == "first_workout").unwrap();
        assert!(first.unlocked);
        assert_eq!(first.percent, 100);

        let ten = progress.iter().find(|p| p.id == "workouts_10").unwrap();
        assert!(!ten.unlocked);
        assert_eq!(ten.percent, 10);
    }
}
