/// MCP tools for fitness tracking
///
/// This module contains all the MCP tools that external clients can call.
/// Each tool fetches the session user's records through the storage layer,
/// optionally runs a calculator, and returns a text message plus structured
/// data. Tool input schemas are generated from the parameter types.

pub mod calories;
pub mod workouts;
pub mod routines;
pub mod habits;
pub mod body;
pub mod goals;
pub mod achievements;
pub mod meal_plans;
pub mod settings;
pub mod reminders;
pub mod export;
pub mod lookup;
pub mod dashboard;
pub mod entries;

use std::str::FromStr;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::{parse_date_or, DateRange, DomainError, RecordId};
use crate::export::ExportError;
use crate::mcp::protocol::ToolDefinition;
use crate::session::Session;
use crate::storage::StorageError;
use crate::FitnessTrackerServer;

/// Errors a tool call can end with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Application error codes carried in failed tool results
pub const NOT_FOUND: i64 = -32001;
pub const VALIDATION_FAILED: i64 = -32003;
pub const STORAGE_FAILED: i64 = -32004;

impl ToolError {
    pub fn code(&self) -> i64 {
        match self {
            ToolError::UnknownTool(_) => jsonrpc_core::ErrorCode::MethodNotFound.code(),
            ToolError::InvalidParams(_) => jsonrpc_core::ErrorCode::InvalidParams.code(),
            ToolError::NotFound(_) | ToolError::Storage(StorageError::NotFound { .. }) => NOT_FOUND,
            ToolError::Domain(_) => VALIDATION_FAILED,
            ToolError::Export(ExportError::MissingTimestamp | ExportError::InvalidBackup(_)) => {
                VALIDATION_FAILED
            }
            ToolError::Export(ExportError::Storage(StorageError::NotFound { .. })) => NOT_FOUND,
            ToolError::Storage(_) | ToolError::Export(_) => STORAGE_FAILED,
        }
    }
}

/// What a tool hands back: text for the reader plus the full response
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub data: Value,
}

impl ToolOutput {
    /// Split a response into its `message` and the structured remainder
    pub fn from_response<R: Serialize>(response: &R) -> Result<Self, ToolError> {
        let mut data = serde_json::to_value(response)
            .map_err(|e| ToolError::InvalidParams(format!("Failed to encode response: {}", e)))?;

        let text = match data.as_object_mut().and_then(|o| o.remove("message")) {
            Some(Value::String(message)) => message,
            _ => String::new(),
        };

        Ok(Self { text, data })
    }
}

/// Parameters for tools that take none
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Deserialize tool arguments; a missing argument object counts as empty
pub(crate) fn parse_params<P: DeserializeOwned>(arguments: Value) -> Result<P, ToolError> {
    let arguments = match arguments {
        Value::Null => json!({}),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

/// Parse an optional label, falling back to `default`
pub(crate) fn parse_or<T>(value: Option<&str>, default: T) -> Result<T, ToolError>
where
    T: FromStr<Err = DomainError>,
{
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s.parse()?),
        _ => Ok(default),
    }
}

/// Parse a required label
pub(crate) fn parse_label<T>(value: &str) -> Result<T, ToolError>
where
    T: FromStr<Err = DomainError>,
{
    Ok(value.parse()?)
}

pub(crate) fn parse_range(value: Option<&str>) -> Result<DateRange, ToolError> {
    parse_or(value, DateRange::default())
}

/// The given `yyyy-MM-dd` day, or the session's today
pub(crate) fn resolve_date(session: &Session, value: Option<&str>) -> Result<NaiveDate, ToolError> {
    Ok(parse_date_or(value, session.today())?)
}

pub(crate) fn record_id(value: &str, what: &str) -> Result<RecordId, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidParams(format!("{} cannot be empty", what)));
    }
    Ok(RecordId::from(trimmed))
}

/// Shorten a UUID for display
pub(crate) fn short_id(id: &RecordId) -> &str {
    let s = id.as_str();
    s.get(..8).unwrap_or(s)
}

fn tool<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schemars::schema_for!(P);
    let input_schema = serde_json::to_value(&schema).unwrap_or_else(|_| json!({"type": "object"}));
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Every tool this server offers
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        tool::<NoParams>(
            "dashboard",
            "Today at a glance: calories vs target, water, workouts, streak and habits",
        ),
        tool::<calories::LogCaloriesParams>("calories_log", "Log a food with calories and optional macros"),
        tool::<calories::ListCaloriesParams>(
            "calories_list",
            "List logged foods for a day (default today) with daily totals",
        ),
        tool::<calories::CalorieStatsParams>(
            "calories_stats",
            "Calorie statistics for a range: week, month, 3months, year or all",
        ),
        tool::<workouts::LogWorkoutParams>("workout_log", "Log a workout or exercise"),
        tool::<workouts::ListWorkoutsParams>("workout_list", "List workouts for a day or a range"),
        tool::<workouts::WorkoutStatsParams>(
            "workout_stats",
            "Workout statistics and streak for a range",
        ),
        tool::<routines::CreateRoutineParams>(
            "routine_create",
            "Create a reusable workout routine with preferred weekdays",
        ),
        tool::<NoParams>("routine_list", "List workout routines"),
        tool::<routines::ApplyRoutineParams>(
            "routine_apply",
            "Log every exercise of a routine as workouts on one or more days",
        ),
        tool::<habits::CreateHabitParams>("habit_create", "Create a new habit to track"),
        tool::<habits::ListHabitsParams>(
            "habit_list",
            "List habits with completion state for a day and current streaks",
        ),
        tool::<habits::ToggleHabitParams>(
            "habit_toggle",
            "Toggle a habit's completion for a day (default today)",
        ),
        tool::<habits::DeleteHabitParams>("habit_delete", "Delete a habit and all of its entries"),
        tool::<habits::HabitStatsParams>("habit_stats", "Habit completion rates and streaks for a range"),
        tool::<body::LogWeightParams>("weight_log", "Log body weight in your preferred units"),
        tool::<body::WeightStatsParams>("weight_stats", "Weight history and trend for a range"),
        tool::<body::LogWaterParams>("water_log", "Log water intake in millilitres"),
        tool::<body::WaterDayParams>("water_today", "Water intake for a day against your target"),
        tool::<body::LogMeasurementsParams>(
            "measurements_log",
            "Log body measurements (cm or inches per your units) and body fat",
        ),
        tool::<body::ListMeasurementsParams>("measurements_list", "List body measurement history"),
        tool::<goals::CreateGoalParams>("goal_create", "Create a daily, weekly or monthly goal"),
        tool::<goals::ListGoalsParams>("goal_list", "List goals with current progress"),
        tool::<goals::UpdateGoalParams>("goal_update", "Change a goal's target, period, title or status"),
        tool::<NoParams>(
            "achievements_check",
            "Check for and unlock any newly earned achievements",
        ),
        tool::<NoParams>("achievements_list", "Show every achievement with progress"),
        tool::<meal_plans::AddMealPlanParams>("meal_plan_add", "Plan a meal for a day"),
        tool::<meal_plans::ListMealPlansParams>("meal_plan_list", "List planned meals for a day"),
        tool::<meal_plans::LogMealPlanParams>(
            "meal_plan_log",
            "Copy a planned meal into the calorie log",
        ),
        tool::<NoParams>("settings_get", "Show your settings and calculated targets"),
        tool::<settings::UpdateSettingsParams>(
            "settings_update",
            "Update units, goals, activity level, profile or daily targets",
        ),
        tool::<settings::OnboardingParams>(
            "onboarding_complete",
            "Set up your profile and get BMR, TDEE and a daily calorie target",
        ),
        tool::<settings::CalculateTargetsParams>(
            "targets_calculate",
            "Calculate BMR, TDEE and calorie target without saving anything",
        ),
        tool::<reminders::AddReminderParams>("reminder_add", "Schedule a daily reminder"),
        tool::<NoParams>("reminder_list", "List reminders and whether they are scheduled"),
        tool::<reminders::ReminderIdParams>("reminder_remove", "Remove a reminder"),
        tool::<reminders::ReminderIdParams>("reminder_test", "Send a reminder notification right now"),
        tool::<export::ExportParams>(
            "data_export",
            "Export data as CSV, a text report, or a full JSON backup",
        ),
        tool::<export::RestoreParams>("data_restore", "Restore records from a JSON backup"),
        tool::<lookup::FoodSearchParams>("food_search", "Search nutrition data for a food"),
        tool::<lookup::ExerciseSearchParams>(
            "exercise_search",
            "Estimate calories burned for an activity",
        ),
        tool::<entries::DeleteEntryParams>(
            "entry_delete",
            "Delete a calorie entry, workout, routine, weight, water, measurement, goal or meal plan",
        ),
    ]
}

/// Run one tool against the server's storage and session
pub async fn dispatch(
    server: &mut FitnessTrackerServer,
    name: &str,
    arguments: Value,
) -> Result<ToolOutput, ToolError> {
    tracing::debug!("Calling tool {}", name);

    // Tools that need more than storage and session
    match name {
        "reminder_add" | "reminder_remove" | "reminder_test" | "reminder_list" => {
            let (storage, session, scheduler) = server.reminder_parts();
            return match name {
                "reminder_add" => ToolOutput::from_response(&reminders::add_reminder(
                    storage,
                    session,
                    scheduler,
                    parse_params(arguments)?,
                )?),
                "reminder_remove" => ToolOutput::from_response(&reminders::remove_reminder(
                    storage,
                    session,
                    scheduler,
                    parse_params(arguments)?,
                )?),
                "reminder_test" => ToolOutput::from_response(&reminders::test_reminder(
                    storage,
                    session,
                    scheduler,
                    parse_params(arguments)?,
                )?),
                _ => ToolOutput::from_response(&reminders::list_reminders(storage, session, scheduler)?),
            };
        }
        "food_search" => {
            let response = lookup::search_food(server.lookup(), parse_params(arguments)?).await?;
            return ToolOutput::from_response(&response);
        }
        "exercise_search" => {
            let params = parse_params(arguments)?;
            let weight = lookup::body_weight(server.storage(), server.session())?;
            let response = lookup::search_exercise(server.lookup(), params, weight).await?;
            return ToolOutput::from_response(&response);
        }
        _ => {}
    }

    let storage = server.storage();
    let session = server.session();
    let config = server.config();

    match name {
        "dashboard" => ToolOutput::from_response(&dashboard::dashboard(storage, session)?),
        "calories_log" => ToolOutput::from_response(&calories::log_calories(storage, session, parse_params(arguments)?)?),
        "calories_list" => ToolOutput::from_response(&calories::list_calories(storage, session, parse_params(arguments)?)?),
        "calories_stats" => ToolOutput::from_response(&calories::calorie_stats(storage, session, parse_params(arguments)?)?),
        "workout_log" => ToolOutput::from_response(&workouts::log_workout(storage, session, parse_params(arguments)?)?),
        "workout_list" => ToolOutput::from_response(&workouts::list_workouts(storage, session, parse_params(arguments)?)?),
        "workout_stats" => ToolOutput::from_response(&workouts::workout_stats(storage, session, parse_params(arguments)?)?),
        "routine_create" => ToolOutput::from_response(&routines::create_routine(storage, session, parse_params(arguments)?)?),
        "routine_list" => ToolOutput::from_response(&routines::list_routines(storage, session)?),
        "routine_apply" => ToolOutput::from_response(&routines::apply_routine(storage, session, parse_params(arguments)?)?),
        "habit_create" => ToolOutput::from_response(&habits::create_habit(storage, session, parse_params(arguments)?)?),
        "habit_list" => ToolOutput::from_response(&habits::list_habits(storage, session, parse_params(arguments)?)?),
        "habit_toggle" => ToolOutput::from_response(&habits::toggle_habit(storage, session, parse_params(arguments)?)?),
        "habit_delete" => ToolOutput::from_response(&habits::delete_habit(storage, session, parse_params(arguments)?)?),
        "habit_stats" => ToolOutput::from_response(&habits::habit_stats(storage, session, parse_params(arguments)?)?),
        "weight_log" => ToolOutput::from_response(&body::log_weight(storage, session, parse_params(arguments)?)?),
        "weight_stats" => ToolOutput::from_response(&body::weight_stats(storage, session, parse_params(arguments)?)?),
        "water_log" => ToolOutput::from_response(&body::log_water(storage, session, parse_params(arguments)?)?),
        "water_today" => ToolOutput::from_response(&body::water_for_day(storage, session, parse_params(arguments)?)?),
        "measurements_log" => ToolOutput::from_response(&body::log_measurements(storage, session, parse_params(arguments)?)?),
        "measurements_list" => ToolOutput::from_response(&body::list_measurements(storage, session, parse_params(arguments)?)?),
        "goal_create" => ToolOutput::from_response(&goals::create_goal(storage, session, parse_params(arguments)?)?),
        "goal_list" => ToolOutput::from_response(&goals::list_goals(storage, session, parse_params(arguments)?)?),
        "goal_update" => ToolOutput::from_response(&goals::update_goal(storage, session, parse_params(arguments)?)?),
        "achievements_check" => ToolOutput::from_response(&achievements::check(storage, session)?),
        "achievements_list" => ToolOutput::from_response(&achievements::list(storage, session)?),
        "meal_plan_add" => ToolOutput::from_response(&meal_plans::add_meal_plan(storage, session, parse_params(arguments)?)?),
        "meal_plan_list" => ToolOutput::from_response(&meal_plans::list_meal_plans(storage, session, parse_params(arguments)?)?),
        "meal_plan_log" => ToolOutput::from_response(&meal_plans::log_meal_plan(storage, session, parse_params(arguments)?)?),
        "settings_get" => ToolOutput::from_response(&settings::get_settings(storage, session)?),
        "settings_update" => ToolOutput::from_response(&settings::update_settings(storage, session, parse_params(arguments)?)?),
        "onboarding_complete" => ToolOutput::from_response(&settings::complete_onboarding(storage, session, parse_params(arguments)?)?),
        "targets_calculate" => ToolOutput::from_response(&settings::calculate_targets(storage, session, parse_params(arguments)?)?),
        "data_export" => ToolOutput::from_response(&export::export_data(storage, session, &config.export, parse_params(arguments)?)?),
        "data_restore" => ToolOutput::from_response(&export::restore_data(storage, session, parse_params(arguments)?)?),
        "entry_delete" => ToolOutput::from_response(&entries::delete_entry(storage, session, parse_params(arguments)?)?),
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}
