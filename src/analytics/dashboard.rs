/// Today-at-a-glance summary

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    CalorieEntry, Habit, HabitEntry, StreakSummary, UserSettings, WaterEntry, WeightEntry, Workout,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub calories_consumed: f64,
    pub calorie_target: Option<u32>,
    /// Negative once the target is exceeded
    pub calories_remaining: Option<f64>,
    pub calories_burned: f64,
    pub water_ml: f64,
    pub water_target_ml: f64,
    pub workouts_today: usize,
    pub workout_minutes_today: f64,
    pub workout_streak: StreakSummary,
    pub habits_completed: usize,
    pub habits_total: usize,
    pub latest_weight_kg: Option<f64>,
}

/// Records a dashboard is built from
///
/// `*_today` slices hold only today's records; `all_workouts`, `habit_entries`
/// and `weights` may span any range.
pub struct DashboardInputs<'a> {
    pub settings: &'a UserSettings,
    pub calories_today: &'a [CalorieEntry],
    pub water_today: &'a [WaterEntry],
    pub all_workouts: &'a [Workout],
    pub habits: &'a [Habit],
    pub habit_entries: &'a [HabitEntry],
    pub weights: &'a [WeightEntry],
}

impl Dashboard {
    pub fn build(inputs: DashboardInputs<'_>, today: NaiveDate) -> Self {
        let calories_consumed: f64 = inputs
            .calories_today
            .iter()
            .filter(|e| e.date == today)
            .map(|e| e.calories)
            .sum();
        let water_ml: f64 = inputs
            .water_today
            .iter()
            .filter(|e| e.date == today)
            .map(|e| e.amount_ml)
            .sum();

        let todays_workouts: Vec<&Workout> =
            inputs.all_workouts.iter().filter(|w| w.date == today).collect();

        let habits_completed = inputs
            .habits
            .iter()
            .filter(|h| {
                inputs
                    .habit_entries
                    .iter()
                    .any(|e| e.habit_id == h.id && e.date == today && e.completed)
            })
            .count();

        let latest_weight_kg = inputs
            .weights
            .iter()
            .filter(|e| e.date <= today)
            .max_by_key(|e| (e.date, e.created_at))
            .map(|e| e.weight_kg);

        let calorie_target = inputs.settings.daily_calorie_target;

        Self {
            date: today,
            calories_consumed,
            calorie_target,
            calories_remaining: calorie_target.map(|t| t as f64 - calories_consumed),
            calories_burned: todays_workouts.iter().map(|w| w.calories_burned()).sum(),
            water_ml,
            water_target_ml: inputs.settings.daily_water_target_ml,
            workouts_today: todays_workouts.len(),
            workout_minutes_today: todays_workouts.iter().map(|w| w.duration_minutes()).sum(),
            workout_streak: StreakSummary::from_workouts(inputs.all_workouts, today),
            habits_completed,
            habits_total: inputs.habits.len(),
            latest_weight_kg,
        }
    }
}
