/// Tools for reusable workout routines
///
/// This module implements routine_create, routine_list and routine_apply.

use chrono::{NaiveDate, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{
    DomainError, ExerciseDetails, RoutineExercise, Workout, WorkoutCategory, WorkoutRoutine,
};
use crate::session::Session;
use crate::storage::{DateFilter, RecordStore};
use crate::tools::{parse_or, record_id, resolve_date, short_id, ToolError};

/// One exercise of a routine
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RoutineExerciseParams {
    pub exercise: String,
    /// strength, cardio, flexibility, sports or other (default other)
    pub category: Option<String>,
    pub duration_minutes: Option<f64>,
    pub calories_burned: Option<f64>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    /// Weight, in kg or lb per your units setting
    pub weight: Option<f64>,
}

/// Parameters for creating a routine
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateRoutineParams {
    /// Routine name (e.g., "Push day")
    pub name: String,
    pub description: Option<String>,
    pub exercises: Vec<RoutineExerciseParams>,
    /// Preferred weekdays ("mon", "Tuesday", ...)
    pub days: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct CreateRoutineResponse {
    pub message: String,
    pub routine: WorkoutRoutine,
}

fn parse_weekday(value: &str) -> Result<Weekday, DomainError> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| DomainError::UnknownVariant {
            kind: "weekday",
            value: value.to_string(),
        })
}

pub fn create_routine<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: CreateRoutineParams,
) -> Result<CreateRoutineResponse, ToolError> {
    let units = storage.load_settings(session.user())?.units;

    let exercises = params
        .exercises
        .into_iter()
        .map(|step| {
            Ok(RoutineExercise {
                exercise: step.exercise,
                category: parse_or(step.category.as_deref(), WorkoutCategory::Other)?,
                details: ExerciseDetails {
                    duration_minutes: step.duration_minutes,
                    calories_burned: step.calories_burned,
                    sets: step.sets,
                    reps: step.reps,
                    weight_kg: step.weight.map(|w| units.weight_to_kg(w)),
                },
            })
        })
        .collect::<Result<Vec<_>, ToolError>>()?;

    let days = params
        .days
        .unwrap_or_default()
        .iter()
        .map(|d| parse_weekday(d))
        .collect::<Result<Vec<_>, _>>()?;

    let routine = WorkoutRoutine::new(
        session.user().clone(),
        params.name,
        params.description,
        exercises,
        days,
    )?;
    storage.insert_record(&routine)?;
    tracing::debug!("Created routine {} for {}", routine.id, session.user());

    Ok(CreateRoutineResponse {
        message: format!(
            "📋 Created routine '{}' with {} exercise(s) (ID: {})",
            routine.name,
            routine.exercises.len(),
            short_id(&routine.id)
        ),
        routine,
    })
}

#[derive(Debug, Serialize)]
pub struct ListRoutinesResponse {
    pub message: String,
    pub routines: Vec<WorkoutRoutine>,
}

pub fn list_routines<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
) -> Result<ListRoutinesResponse, ToolError> {
    let mut routines: Vec<WorkoutRoutine> = storage.list_records(session.user(), DateFilter::Any)?;
    routines.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let message = if routines.is_empty() {
        "No routines yet. Create one with routine_create.".to_string()
    } else {
        let mut lines = vec![format!("📋 {} routine(s):", routines.len())];
        for routine in &routines {
            let days = if routine.days.is_empty() {
                "any day".to_string()
            } else {
                routine.days.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
            };
            let exercises: Vec<&str> = routine.exercises.iter().map(|e| e.exercise.as_str()).collect();
            lines.push(format!(
                "  • {} ({}): {} [{}]",
                routine.name,
                days,
                exercises.join(", "),
                routine.id
            ));
        }
        lines.join("\n")
    };

    Ok(ListRoutinesResponse { message, routines })
}

/// Parameters for applying a routine
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ApplyRoutineParams {
    pub routine_id: String,
    /// Days in YYYY-MM-DD format (default today)
    pub dates: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ApplyRoutineResponse {
    pub message: String,
    pub workouts: Vec<Workout>,
}

/// Log every exercise of a routine on each date
///
/// Validation happens up front; the writes are independent, so a failure
/// part way leaves the workouts already written in place.
pub fn apply_routine<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: ApplyRoutineParams,
) -> Result<ApplyRoutineResponse, ToolError> {
    let routine_id = record_id(&params.routine_id, "Routine ID")?;
    let routine: WorkoutRoutine = storage.require_record(session.user(), &routine_id)?;

    let dates: Vec<NaiveDate> = match params.dates {
        Some(dates) if !dates.is_empty() => dates
            .iter()
            .map(|d| resolve_date(session, Some(d)))
            .collect::<Result<_, _>>()?,
        _ => vec![session.today()],
    };

    let mut planned = Vec::new();
    for date in &dates {
        planned.extend(routine.workouts_for(*date)?);
    }

    for workout in &planned {
        storage.insert_record(workout)?;
    }
    tracing::debug!(
        "Applied routine {} on {} day(s), {} workouts",
        routine.id,
        dates.len(),
        planned.len()
    );

    Ok(ApplyRoutineResponse {
        message: format!(
            "✅ Logged {} workout(s) from '{}' on {} day(s)",
            planned.len(),
            routine.name,
            dates.len()
        ),
        workouts: planned,
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

    fn step(name: &str) -> RoutineExerciseParams {
        RoutineExerciseParams {
            exercise: name.to_string(),
            category: Some("strength".to_string()),
            duration_minutes: None,
            calories_burned: None,
            sets: Some(3),
            reps: Some(10),
            weight: Some(40.0),
        }
    }

    fn push_day(storage: &SqliteStorage, session: &Session) -> WorkoutRoutine {
        create_routine(
            storage,
            session,
            CreateRoutineParams {
                name: "Push day".to_string(),
                description: None,
                exercises: vec![step("Bench press"), step("Overhead press")],
                days: Some(vec!["mon".to_string(), "Thursday".to_string()]),
            },
        )
        .unwrap()
        .routine
    }

    #[test]
    fn test_create_and_list() {
        let (storage, session) = setup();
        let routine = push_day(&storage, &session);
        assert_eq!(routine.days, vec![Weekday::Mon, Weekday::Thu]);

        let listed = list_routines(&storage, &session).unwrap();
        assert_eq!(listed.routines.len(), 1);
        assert!(listed.message.contains("Bench press, Overhead press"));
    }

    #[test]
    fn test_bad_weekday_rejected() {
        let (storage, session) = setup();
        let result = create_routine(
            &storage,
            &session,
            CreateRoutineParams {
                name: "Legs".to_string(),
                description: None,
                exercises: vec![step("Squat")],
                days: Some(vec!["someday".to_string()]),
            },
        );
        assert!(matches!(result, Err(ToolError::Domain(_))));
    }

    #[test]
    fn test_apply_on_several_days() {
        let (storage, session) = setup();
        let routine = push_day(&storage, &session);

        let response = apply_routine(
            &storage,
            &session,
            ApplyRoutineParams {
                routine_id: routine.id.to_string(),
                dates: Some(vec!["2024-06-03".to_string(), "2024-06-06".to_string()]),
            },
        )
        .unwrap();
        assert_eq!(response.workouts.len(), 4);
        assert!(response.workouts.iter().all(|w| w.routine_id.as_ref() == Some(&routine.id)));

        let stored: Vec<Workout> = storage.list_records(session.user(), DateFilter::Any).unwrap();
        assert_eq!(stored.len(), 4);
    }

    #[test]
    fn test_apply_with_bad_date_writes_nothing() {
        let (storage, session) = setup();
        let routine = push_day(&storage, &session);

        let result = apply_routine(
            &storage,
            &session,
            ApplyRoutineParams {
                routine_id: routine.id.to_string(),
                dates: Some(vec!["2024-06-03".to_string(), "June 6".to_string()]),
            },
        );
        assert!(result.is_err());
        let stored: Vec<Workout> = storage.list_records(session.user(), DateFilter::Any).unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn test_apply_unknown_routine() {
        let (storage, session) = setup();
        let result = apply_routine(
            &storage,
            &session,
            ApplyRoutineParams { routine_id: "missing".to_string(), dates: None },
        );
        assert_eq!(result.unwrap_err().code(), crate::tools::NOT_FOUND);
    }
}
