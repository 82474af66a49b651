/// Analytics engine for stats, goals, achievements and the dashboard
///
/// The engine reads what it needs through `RecordStore` and hands the records
/// to the pure calculators in the submodules. It holds no state besides the
/// day it treats as "today".

pub mod stats;
pub mod goals;
pub mod achievements;
pub mod dashboard;

pub use stats::*;
pub use goals::*;
pub use achievements::*;
pub use dashboard::*;

use chrono::NaiveDate;

use crate::domain::{
    self, AchievementDefinition, CalorieEntry, DateRange, Habit, HabitEntry, UserId,
    WaterEntry, WeightEntry, Workout,
};
use crate::storage::{DateFilter, RecordStore, StorageError};

/// Analytics engine for processing user records
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticsEngine {
    /// Fixed "today"; the local date is used when unset
    today: Option<NaiveDate>,
}

impl AnalyticsEngine {
    /// Create an engine that follows the local calendar
    pub fn new() -> Self {
        Self { today: None }
    }

    /// Create an engine pinned to a given day
    pub fn at(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(domain::today)
    }

    pub fn calorie_stats<S: RecordStore + ?Sized>(
        &self,
        storage: &S,
        user: &UserId,
        range: DateRange,
    ) -> Result<CalorieStats, StorageError> {
        let window = range.resolve(self.today());
        let entries: Vec<CalorieEntry> = storage.list_in_window(user, window)?;
        Ok(CalorieStats::compute(&entries, window))
    }

    pub fn workout_stats<S: RecordStore + ?Sized>(
        &self,
        storage: &S,
        user: &UserId,
        range: DateRange,
    ) -> Result<WorkoutStats, StorageError> {
        let window = range.resolve(self.today());
        // Streaks look beyond the window, so read everything
        let workouts: Vec<Workout> = storage.list_records(user, DateFilter::Any)?;
        Ok(WorkoutStats::compute(&workouts, window, self.today()))
    }

    pub fn habit_stats<S: RecordStore + ?Sized>(
        &self,
        storage: &S,
        user: &UserId,
        range: DateRange,
    ) -> Result<HabitStats, StorageError> {
        let window = range.resolve(self.today());
        let habits: Vec<Habit> = storage.list_records(user, DateFilter::Any)?;
        let entries: Vec<HabitEntry> = storage.list_records(user, DateFilter::Any)?;
        Ok(HabitStats::compute(&habits, &entries, window, self.today()))
    }

    pub fn weight_stats<S: RecordStore + ?Sized>(
        &self,
        storage: &S,
        user: &UserId,
        range: DateRange,
    ) -> Result<WeightStats, StorageError> {
        let window = range.resolve(self.today());
        let entries: Vec<WeightEntry> = storage.list_in_window(user, window)?;
        Ok(WeightStats::compute(&entries, window))
    }

    pub fn dashboard<S: RecordStore + ?Sized>(
        &self,
        storage: &S,
        user: &UserId,
    ) -> Result<Dashboard, StorageError> {
        let today = self.today();
        let settings = storage.load_settings(user)?;
        let calories: Vec<CalorieEntry> = storage.list_records(user, DateFilter::On(today))?;
        let water: Vec<WaterEntry> = storage.list_records(user, DateFilter::On(today))?;
        let workouts: Vec<Workout> = storage.list_records(user, DateFilter::Any)?;
        let habits: Vec<Habit> = storage.list_records(user, DateFilter::Any)?;
        let entries: Vec<HabitEntry> = storage.list_records(user, DateFilter::On(today))?;
        let weights: Vec<WeightEntry> = storage.list_records(user, DateFilter::Any)?;

        Ok(Dashboard::build(
            DashboardInputs {
                settings: &settings,
                calories_today: &calories,
                water_today: &water,
                all_workouts: &workouts,
                habits: &habits,
                habit_entries: &entries,
                weights: &weights,
            },
            today,
        ))
    }

    pub fn check_achievements<S: RecordStore + ?Sized>(
        &self,
        storage: &S,
        user: &UserId,
    ) -> Result<Vec<&'static AchievementDefinition>, StorageError> {
        check_achievements(storage, user, self.today())
    }

    pub fn achievement_progress<S: RecordStore + ?Sized>(
        &self,
        storage: &S,
        user: &UserId,
    ) -> Result<Vec<AchievementProgress>, StorageError> {
        achievement_progress(storage, user, self.today())
    }
}
