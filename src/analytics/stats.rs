/// Stat rollups for the progress views
///
/// Each `*Stats::compute` takes the records already fetched for a window and
/// reduces them. Records outside the window are ignored, so callers may pass
/// a superset.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    CalorieEntry, DateWindow, Habit, HabitEntry, MealType, StreakSummary, Trend, WeightEntry,
    Workout, WorkoutCategory,
};

/// Second-half mean above this multiple of the first-half mean reads as "up"
const TREND_UP: f64 = 1.1;
/// Second-half mean below this multiple of the first-half mean reads as "down"
const TREND_DOWN: f64 = 0.9;

/// Direction of a per-day series
///
/// The sorted days are split in half (the shorter half first) and the means
/// of the two halves compared.
pub fn trend(daily: &BTreeMap<NaiveDate, f64>) -> Trend {
    let values: Vec<f64> = daily.values().copied().collect();
    if values.len() < 2 {
        return Trend::Stable;
    }

    let (first, second) = values.split_at(values.len() / 2);
    let first_mean = mean(first);
    let second_mean = mean(second);

    if first_mean == 0.0 {
        return Trend::Stable;
    }
    if second_mean > first_mean * TREND_UP {
        Trend::Up
    } else if second_mean < first_mean * TREND_DOWN {
        Trend::Down
    } else {
        Trend::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// One point of a per-day series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub value: f64,
}

fn to_series(daily: &BTreeMap<NaiveDate, f64>) -> Vec<DailyTotal> {
    daily
        .iter()
        .map(|(&date, &value)| DailyTotal { date, value })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalorieStats {
    pub window: DateWindow,
    pub total_calories: f64,
    pub entries: usize,
    pub days_logged: usize,
    /// Average over days that have at least one entry
    pub average_per_day: f64,
    pub daily_totals: Vec<DailyTotal>,
    pub highest_day: Option<DailyTotal>,
    pub lowest_day: Option<DailyTotal>,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub entries_by_meal: BTreeMap<MealType, usize>,
    pub trend: Trend,
}

impl CalorieStats {
    pub fn compute(entries: &[CalorieEntry], window: DateWindow) -> Self {
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut entries_by_meal = BTreeMap::new();
        let (mut protein_g, mut carbs_g, mut fat_g) = (0.0, 0.0, 0.0);
        let mut count = 0;

        for entry in entries.iter().filter(|e| window.contains(e.date)) {
            count += 1;
            *daily.entry(entry.date).or_insert(0.0) += entry.calories;
            *entries_by_meal.entry(entry.meal_type).or_insert(0) += 1;
            protein_g += entry.macros.protein_g.unwrap_or(0.0);
            carbs_g += entry.macros.carbs_g.unwrap_or(0.0);
            fat_g += entry.macros.fat_g.unwrap_or(0.0);
        }

        let series = to_series(&daily);
        let total_calories: f64 = daily.values().sum();
        let days_logged = daily.len();

        Self {
            window,
            total_calories,
            entries: count,
            days_logged,
            average_per_day: if days_logged == 0 {
                0.0
            } else {
                total_calories / days_logged as f64
            },
            highest_day: series.iter().copied().max_by(|a, b| a.value.total_cmp(&b.value)),
            lowest_day: series.iter().copied().min_by(|a, b| a.value.total_cmp(&b.value)),
            daily_totals: series,
            protein_g,
            carbs_g,
            fat_g,
            entries_by_meal,
            trend: trend(&daily),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutStats {
    pub window: DateWindow,
    pub total_workouts: usize,
    pub total_duration_minutes: f64,
    pub total_calories_burned: f64,
    pub average_duration_minutes: f64,
    pub workouts_per_day: Vec<DailyTotal>,
    pub most_frequent_exercise: Option<String>,
    pub categories: BTreeMap<WorkoutCategory, usize>,
    /// Streak over every workout passed in, not just the window
    pub streak: StreakSummary,
    pub trend: Trend,
}

impl WorkoutStats {
    pub fn compute(workouts: &[Workout], window: DateWindow, today: NaiveDate) -> Self {
        let in_window: Vec<&Workout> = workouts.iter().filter(|w| window.contains(w.date)).collect();

        let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut duration_per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut exercises: BTreeMap<String, usize> = BTreeMap::new();
        let mut categories = BTreeMap::new();
        let mut any_duration = false;

        for workout in &in_window {
            *per_day.entry(workout.date).or_insert(0.0) += 1.0;
            *duration_per_day.entry(workout.date).or_insert(0.0) += workout.duration_minutes();
            any_duration |= workout.details.duration_minutes.is_some();
            *exercises.entry(workout.exercise.to_lowercase()).or_insert(0) += 1;
            *categories.entry(workout.category).or_insert(0) += 1;
        }

        let total_workouts = in_window.len();
        let total_duration_minutes: f64 = in_window.iter().map(|w| w.duration_minutes()).sum();
        let total_calories_burned: f64 = in_window.iter().map(|w| w.calories_burned()).sum();

        // Ties go to the alphabetically first exercise
        let most_frequent_exercise = exercises
            .iter()
            .max_by_key(|(name, count)| (**count, Reverse(name.as_str())))
            .map(|(name, _)| name.clone());

        let trend = if any_duration {
            trend(&duration_per_day)
        } else {
            trend(&per_day)
        };

        Self {
            window,
            total_workouts,
            total_duration_minutes,
            total_calories_burned,
            average_duration_minutes: if total_workouts == 0 {
                0.0
            } else {
                total_duration_minutes / total_workouts as f64
            },
            workouts_per_day: to_series(&per_day),
            most_frequent_exercise,
            categories,
            streak: StreakSummary::from_workouts(workouts, today),
            trend,
        }
    }
}

/// Per-habit figures for a window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitSummary {
    pub habit_id: String,
    pub name: String,
    pub icon: Option<String>,
    pub completions: usize,
    /// Days in the window since the habit was created
    pub possible_days: i64,
    /// 0.0 to 1.0
    pub completion_rate: f64,
    pub completed_today: bool,
    pub streak: StreakSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStats {
    pub window: DateWindow,
    pub habits: Vec<HabitSummary>,
    pub total_completions: usize,
    /// 0.0 to 1.0 across every habit
    pub overall_rate: f64,
}

impl HabitStats {
    /// `entries` should hold every entry of the user; streaks look past the window
    pub fn compute(
        habits: &[Habit],
        entries: &[HabitEntry],
        window: DateWindow,
        today: NaiveDate,
    ) -> Self {
        let mut summaries = Vec::with_capacity(habits.len());
        let mut total_completions = 0;
        let mut total_possible = 0;

        for habit in habits {
            let own: Vec<HabitEntry> = entries
                .iter()
                .filter(|e| e.habit_id == habit.id)
                .cloned()
                .collect();

            let completed_days: BTreeSet<NaiveDate> = own
                .iter()
                .filter(|e| e.completed && window.contains(e.date))
                .map(|e| e.date)
                .collect();

            let start = window.start.max(habit.created_on());
            let possible_days = if start > window.end {
                0
            } else {
                (window.end - start).num_days() + 1
            };

            let completions = completed_days.len();
            total_completions += completions;
            total_possible += possible_days;

            summaries.push(HabitSummary {
                habit_id: habit.id.to_string(),
                name: habit.name.clone(),
                icon: habit.icon.clone(),
                completions,
                possible_days,
                completion_rate: rate(completions, possible_days),
                completed_today: own.iter().any(|e| e.completed && e.date == today),
                streak: StreakSummary::from_habit_entries(&own, today),
            });
        }

        Self {
            window,
            habits: summaries,
            total_completions,
            overall_rate: rate(total_completions, total_possible),
        }
    }
}

fn rate(done: usize, possible: i64) -> f64 {
    if possible <= 0 {
        0.0
    } else {
        (done as f64 / possible as f64).min(1.0)
    }
}

/// Weight figures for a window; all values in kilograms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightStats {
    pub window: DateWindow,
    pub entries: usize,
    pub start_kg: Option<f64>,
    pub current_kg: Option<f64>,
    pub change_kg: Option<f64>,
    pub min_kg: Option<f64>,
    pub max_kg: Option<f64>,
    pub average_kg: Option<f64>,
    pub series: Vec<DailyTotal>,
    pub trend: Trend,
}

impl WeightStats {
    pub fn compute(entries: &[WeightEntry], window: DateWindow) -> Self {
        let mut in_window: Vec<&WeightEntry> =
            entries.iter().filter(|e| window.contains(e.date)).collect();
        in_window.sort_by_key(|e| (e.date, e.created_at));

        // Several weigh-ins on one day collapse to the latest
        let daily: BTreeMap<NaiveDate, f64> =
            in_window.iter().map(|e| (e.date, e.weight_kg)).collect();

        let start_kg = in_window.first().map(|e| e.weight_kg);
        let current_kg = in_window.last().map(|e| e.weight_kg);
        let weights: Vec<f64> = in_window.iter().map(|e| e.weight_kg).collect();

        Self {
            window,
            entries: in_window.len(),
            start_kg,
            current_kg,
            change_kg: start_kg.zip(current_kg).map(|(s, c)| c - s),
            min_kg: weights.iter().copied().min_by(f64::total_cmp),
            max_kg: weights.iter().copied().max_by(f64::total_cmp),
            average_kg: if weights.is_empty() { None } else { Some(mean(&weights)) },
            series: to_series(&daily),
            trend: trend(&daily),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExerciseDetails, Macros, UserId};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn user() -> UserId {
        UserId::new("tester").unwrap()
    }

    fn series(values: &[f64]) -> BTreeMap<NaiveDate, f64> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (day(i as u32 + 1), *v))
            .collect()
    }

    fn meal(date: NaiveDate, calories: f64, meal_type: MealType) -> CalorieEntry {
        let macros = Macros { protein_g: Some(10.0), carbs_g: None, fat_g: Some(2.0) };
        CalorieEntry::new(user(), date, "Food".to_string(), calories, macros, meal_type, None).unwrap()
    }

    fn workout(date: NaiveDate, exercise: &str, minutes: Option<f64>) -> Workout {
        let details = ExerciseDetails { duration_minutes: minutes, ..Default::default() };
        Workout::new(user(), date, exercise.to_string(), WorkoutCategory::Cardio, details, None).unwrap()
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(trend(&series(&[100.0, 100.0, 120.0, 120.0])), Trend::Up);
        assert_eq!(trend(&series(&[100.0, 100.0, 80.0, 80.0])), Trend::Down);
        assert_eq!(trend(&series(&[100.0, 100.0, 105.0, 105.0])), Trend::Stable);
        // Exactly 1.1x is not above the threshold
        assert_eq!(trend(&series(&[100.0, 110.0])), Trend::Stable);
    }

    #[test]
    fn test_trend_degenerate_inputs() {
        assert_eq!(trend(&BTreeMap::new()), Trend::Stable);
        assert_eq!(trend(&series(&[500.0])), Trend::Stable);
        assert_eq!(trend(&series(&[0.0, 300.0])), Trend::Stable);
    }

    #[test]
    fn test_trend_odd_length_puts_extra_in_second_half() {
        // first = [100], second = [100, 130] -> mean 115 > 110
        assert_eq!(trend(&series(&[100.0, 100.0, 130.0])), Trend::Up);
    }

    #[test]
    fn test_calorie_stats() {
        let window = DateWindow::new(day(1), day(7)).unwrap();
        let entries = vec![
            meal(day(1), 500.0, MealType::Breakfast),
            meal(day(1), 700.0, MealType::Dinner),
            meal(day(3), 900.0, MealType::Lunch),
            meal(day(20), 5000.0, MealType::Snack),
        ];
        let stats = CalorieStats::compute(&entries, window);

        assert_eq!(stats.entries, 3);
        assert_eq!(stats.days_logged, 2);
        assert_eq!(stats.total_calories, 2100.0);
        assert_eq!(stats.average_per_day, 1050.0);
        assert_eq!(stats.highest_day.unwrap().date, day(1));
        assert_eq!(stats.lowest_day.unwrap().value, 900.0);
        assert_eq!(stats.protein_g, 30.0);
        assert_eq!(stats.carbs_g, 0.0);
        assert_eq!(stats.entries_by_meal.get(&MealType::Snack), None);
        assert_eq!(stats.daily_totals.len(), 2);
    }

    #[test]
    fn test_workout_stats() {
        let window = DateWindow::new(day(1), day(10)).unwrap();
        let workouts = vec![
            workout(day(8), "Run", Some(30.0)),
            workout(day(9), "Swim", Some(45.0)),
            workout(day(10), "Run", Some(15.0)),
        ];
        let stats = WorkoutStats::compute(&workouts, window, day(10));

        assert_eq!(stats.total_workouts, 3);
        assert_eq!(stats.total_duration_minutes, 90.0);
        assert_eq!(stats.average_duration_minutes, 30.0);
        assert_eq!(stats.most_frequent_exercise.as_deref(), Some("run"));
        assert_eq!(stats.categories.get(&WorkoutCategory::Cardio), Some(&3));
        assert_eq!(stats.streak.current, 3);
    }

    #[test]
    fn test_workout_trend_falls_back_to_counts() {
        let window = DateWindow::new(day(1), day(10)).unwrap();
        let workouts = vec![
            workout(day(1), "Yoga", None),
            workout(day(2), "Yoga", None),
            workout(day(2), "Yoga", None),
        ];
        let stats = WorkoutStats::compute(&workouts, window, day(10));
        assert_eq!(stats.trend, Trend::Up);
    }

    #[test]
    fn test_habit_completion_rate_counts_from_creation() {
        let habit = Habit::new(user(), "Meditate".to_string(), None, None).unwrap();
        let created = habit.created_on();
        let window = DateWindow::new(created - chrono::Duration::days(9), created).unwrap();
        let entries = vec![HabitEntry::new(user(), habit.id.clone(), created, true)];

        let stats = HabitStats::compute(&[habit], &entries, window, created);
        let summary = &stats.habits[0];
        assert_eq!(summary.possible_days, 1);
        assert_eq!(summary.completions, 1);
        assert_eq!(summary.completion_rate, 1.0);
        assert!(summary.completed_today);
        assert_eq!(summary.streak.current, 1);
    }

    #[test]
    fn test_weight_stats() {
        let window = DateWindow::new(day(1), day(30)).unwrap();
        let entries = vec![
            WeightEntry::new(user(), day(10), 80.0, None).unwrap(),
            WeightEntry::new(user(), day(1), 82.0, None).unwrap(),
            WeightEntry::new(user(), day(20), 79.0, None).unwrap(),
        ];
        let stats = WeightStats::compute(&entries, window);

        assert_eq!(stats.start_kg, Some(82.0));
        assert_eq!(stats.current_kg, Some(79.0));
        assert_eq!(stats.change_kg, Some(-3.0));
        assert_eq!(stats.min_kg, Some(79.0));
        assert_eq!(stats.max_kg, Some(82.0));
        assert!((stats.average_kg.unwrap() - 80.333).abs() < 0.001);
        assert_eq!(stats.trend, Trend::Stable);
    }
}
