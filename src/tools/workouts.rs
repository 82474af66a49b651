/// Tools for logging and reviewing workouts
///
/// This module implements workout_log, workout_list and workout_stats.
/// Lifted weights are entered in the user's preferred units and stored in kg.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::WorkoutStats;
use crate::domain::{DateWindow, ExerciseDetails, StreakSummary, Units, Workout, WorkoutCategory};
use crate::export::format_number;
use crate::session::Session;
use crate::storage::{DateFilter, RecordStore};
use crate::tools::body::show_weight;
use crate::tools::{parse_or, parse_range, resolve_date, ToolError};

/// Parameters for logging a workout
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogWorkoutParams {
    /// Exercise name (e.g., "Running", "Bench press")
    pub exercise: String,
    /// strength, cardio, flexibility, sports or other (default other)
    pub category: Option<String>,
    pub duration_minutes: Option<f64>,
    pub calories_burned: Option<f64>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    /// Weight lifted, in kg or lb per your units setting
    pub weight: Option<f64>,
    pub notes: Option<String>,
    /// Day in YYYY-MM-DD format (default today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogWorkoutResponse {
    pub message: String,
    pub workout: Workout,
    pub streak: StreakSummary,
}

pub fn log_workout<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: LogWorkoutParams,
) -> Result<LogWorkoutResponse, ToolError> {
    let date = resolve_date(session, params.date.as_deref())?;
    let category = parse_or(params.category.as_deref(), WorkoutCategory::Other)?;
    let units = storage.load_settings(session.user())?.units;

    let workout = Workout::new(
        session.user().clone(),
        date,
        params.exercise,
        category,
        ExerciseDetails {
            duration_minutes: params.duration_minutes,
            calories_burned: params.calories_burned,
            sets: params.sets,
            reps: params.reps,
            weight_kg: params.weight.map(|w| units.weight_to_kg(w)),
        },
        params.notes,
    )?;
    storage.insert_record(&workout)?;
    tracing::debug!("Logged workout {} for {} on {}", workout.exercise, session.user(), date);

    let all: Vec<Workout> = storage.list_records(session.user(), DateFilter::Any)?;
    let streak = StreakSummary::from_workouts(&all, session.today());

    Ok(LogWorkoutResponse {
        message: format!(
            "💪 Logged {} on {}{}. {}",
            workout.exercise,
            date,
            describe_details(&workout.details, units),
            streak.motivational_message()
        ),
        workout,
        streak,
    })
}

/// " (30 min, 300 kcal, 3x10 @ 60 kg)" or an empty string
fn describe_details(details: &ExerciseDetails, units: Units) -> String {
    let mut parts = Vec::new();
    if let Some(minutes) = details.duration_minutes {
        parts.push(format!("{} min", format_number(minutes)));
    }
    if let Some(kcal) = details.calories_burned {
        parts.push(format!("{} kcal", format_number(kcal)));
    }
    match (details.sets, details.reps) {
        (Some(sets), Some(reps)) => parts.push(format!("{}x{}", sets, reps)),
        (Some(sets), None) => parts.push(format!("{} sets", sets)),
        (None, Some(reps)) => parts.push(format!("{} reps", reps)),
        (None, None) => {}
    }
    if let Some(kg) = details.weight_kg {
        parts.push(format!("@ {}", show_weight(kg, units)));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

/// Parameters for listing workouts
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListWorkoutsParams {
    /// Day in YYYY-MM-DD format (default today); ignored when a range is given
    pub date: Option<String>,
    /// week, month, 3months, year or all
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListWorkoutsResponse {
    pub message: String,
    pub window: DateWindow,
    pub workouts: Vec<Workout>,
}

pub fn list_workouts<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: ListWorkoutsParams,
) -> Result<ListWorkoutsResponse, ToolError> {
    let window = match params.range.as_deref() {
        Some(range) if !range.trim().is_empty() => parse_range(Some(range))?.resolve(session.today()),
        _ => {
            let day: NaiveDate = resolve_date(session, params.date.as_deref())?;
            DateWindow { start: day, end: day }
        }
    };

    let workouts: Vec<Workout> = storage.list_in_window(session.user(), window)?;
    let units = storage.load_settings(session.user())?.units;

    let message = if workouts.is_empty() {
        if window.start == window.end {
            format!("No workouts logged on {}.", window.start)
        } else {
            format!("No workouts logged from {} to {}.", window.start, window.end)
        }
    } else {
        let mut lines = vec![format!("💪 {} workout(s):", workouts.len())];
        for workout in &workouts {
            lines.push(format!(
                "  • {} {} [{}]{} [{}]",
                workout.date,
                workout.exercise,
                workout.category,
                describe_details(&workout.details, units),
                workout.id
            ));
        }
        lines.join("\n")
    };

    Ok(ListWorkoutsResponse {
        message,
        window,
        workouts,
    })
}

/// Parameters for workout statistics
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WorkoutStatsParams {
    /// week, month, 3months, year or all (default month)
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutStatsResponse {
    pub message: String,
    pub stats: WorkoutStats,
}

pub fn workout_stats<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: WorkoutStatsParams,
) -> Result<WorkoutStatsResponse, ToolError> {
    let range = parse_range(params.range.as_deref())?;
    let stats = session.analytics().workout_stats(storage, session.user(), range)?;

    let mut lines = vec![format!(
        "📊 Workouts from {} to {}:",
        stats.window.start, stats.window.end
    )];
    if stats.total_workouts == 0 {
        lines.push("No workouts in this range.".to_string());
    } else {
        lines.push(format!(
            "Total: {} workouts, {} min, {} kcal burned",
            stats.total_workouts,
            format_number(stats.total_duration_minutes),
            format_number(stats.total_calories_burned)
        ));
        lines.push(format!(
            "Average duration: {} min",
            format_number(stats.average_duration_minutes.round())
        ));
        if let Some(exercise) = &stats.most_frequent_exercise {
            lines.push(format!("Most frequent: {}", exercise));
        }
        lines.push(format!("Trend: {}", stats.trend));
    }
    lines.push(format!(
        "🔥 Streak: {} day(s), longest {}",
        stats.streak.current, stats.streak.longest
    ));

    Ok(WorkoutStatsResponse {
        message: lines.join("\n"),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::storage::SqliteStorage;

    fn setup() -> (SqliteStorage, Session) {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        (
            SqliteStorage::in_memory().unwrap(),
            Session::pinned(UserId::new("tester").unwrap(), today),
        )
    }

    fn run(exercise: &str, date: &str) -> LogWorkoutParams {
        LogWorkoutParams {
            exercise: exercise.to_string(),
            category: Some("cardio".to_string()),
            duration_minutes: Some(30.0),
            calories_burned: Some(300.0),
            sets: None,
            reps: None,
            weight: None,
            notes: None,
            date: Some(date.to_string()),
        }
    }

    #[test]
    fn test_log_builds_streak() {
        let (storage, session) = setup();
        log_workout(&storage, &session, run("Running", "2024-06-09")).unwrap();
        let response = log_workout(&storage, &session, run("Running", "2024-06-10")).unwrap();
        assert_eq!(response.streak.current, 2);
        assert!(response.message.contains("30 min"));
    }

    #[test]
    fn test_imperial_weight_stored_in_kg() {
        let (storage, session) = setup();
        let mut settings = storage.load_settings(session.user()).unwrap();
        settings.units = Units::Imperial;
        storage.save_settings(&mut settings).unwrap();

        let response = log_workout(
            &storage,
            &session,
            LogWorkoutParams {
                exercise: "Deadlift".to_string(),
                category: Some("strength".to_string()),
                duration_minutes: None,
                calories_burned: None,
                sets: Some(3),
                reps: Some(5),
                weight: Some(225.0),
                notes: None,
                date: None,
            },
        )
        .unwrap();

        let kg = response.workout.details.weight_kg.unwrap();
        assert!((kg - 102.058).abs() < 0.01);
        assert!(response.message.contains("3x5 @ 225 lb"));
        assert!(!response.message.contains("225.0"));
    }

    #[test]
    fn test_list_by_day_and_range() {
        let (storage, session) = setup();
        log_workout(&storage, &session, run("Rowing", "2024-06-01")).unwrap();
        log_workout(&storage, &session, run("Cycling", "2024-06-10")).unwrap();

        let today = list_workouts(&storage, &session, ListWorkoutsParams { date: None, range: None }).unwrap();
        assert_eq!(today.workouts.len(), 1);
        assert_eq!(today.workouts[0].exercise, "Cycling");

        let month = list_workouts(
            &storage,
            &session,
            ListWorkoutsParams { date: None, range: Some("month".to_string()) },
        )
        .unwrap();
        assert_eq!(month.workouts.len(), 2);
    }

    #[test]
    fn test_stats_message() {
        let (storage, session) = setup();
        log_workout(&storage, &session, run("Running", "2024-06-10")).unwrap();
        let response = workout_stats(&storage, &session, WorkoutStatsParams { range: None }).unwrap();
        assert_eq!(response.stats.total_workouts, 1);
        assert!(response.message.contains("Most frequent: running"));
    }
}
