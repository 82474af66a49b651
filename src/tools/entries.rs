/// Tool for deleting a single logged record by id

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{
    CalorieEntry, Goal, MealPlan, MeasurementEntry, WaterEntry, WeightEntry, Workout,
    WorkoutRoutine,
};
use crate::session::Session;
use crate::storage::{Document, RecordStore};
use crate::tools::{record_id, ToolError};

const KINDS: &str = "calorie, workout, routine, weight, water, measurement, goal, meal_plan";

/// Parameters for deleting a record
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteEntryParams {
    /// calorie, workout, routine, weight, water, measurement, goal or meal_plan
    pub kind: String,
    /// Id of the record to delete
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub message: String,
    pub kind: String,
    pub id: String,
}

fn delete<D: Document, S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    id: &str,
) -> Result<(), ToolError> {
    let id = record_id(id, "Id")?;
    storage.delete_record::<D>(session.user(), &id)?;
    tracing::debug!("Deleted {} {} for {}", D::COLLECTION.as_str(), id, session.user());
    Ok(())
}

pub fn delete_entry<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: DeleteEntryParams,
) -> Result<DeleteEntryResponse, ToolError> {
    let kind = params.kind.trim().to_lowercase().replace(['-', ' '], "_");
    match kind.as_str() {
        "calorie" | "calories" | "food" => delete::<CalorieEntry, _>(storage, session, &params.id)?,
        "workout" | "workouts" => delete::<Workout, _>(storage, session, &params.id)?,
        "routine" | "routines" => delete::<WorkoutRoutine, _>(storage, session, &params.id)?,
        "weight" | "weights" => delete::<WeightEntry, _>(storage, session, &params.id)?,
        "water" => delete::<WaterEntry, _>(storage, session, &params.id)?,
        "measurement" | "measurements" => {
            delete::<MeasurementEntry, _>(storage, session, &params.id)?
        }
        "goal" | "goals" => delete::<Goal, _>(storage, session, &params.id)?,
        "meal_plan" | "meal_plans" => delete::<MealPlan, _>(storage, session, &params.id)?,
        _ => {
            return Err(ToolError::InvalidParams(format!(
                "Unknown kind '{}'; expected one of {}",
                params.kind, KINDS
            )))
        }
    }

    Ok(DeleteEntryResponse {
        message: format!("🗑️ Deleted {} {}", kind, params.id.trim()),
        kind,
        id: params.id.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::storage::{DateFilter, SqliteStorage};
    use chrono::NaiveDate;

    fn setup() -> (SqliteStorage, Session) {
        (
            SqliteStorage::in_memory().unwrap(),
            Session::pinned(
                UserId::new("tester").unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            ),
        )
    }

    #[test]
    fn test_delete_water_entry() {
        let (storage, session) = setup();
        let entry = WaterEntry::new(session.user().clone(), session.today(), 250.0).unwrap();
        storage.insert_record(&entry).unwrap();

        let response = delete_entry(
            &storage,
            &session,
            DeleteEntryParams { kind: "Water".to_string(), id: entry.id.to_string() },
        )
        .unwrap();
        assert_eq!(response.kind, "water");
        let left: Vec<WaterEntry> = storage.list_records(session.user(), DateFilter::Any).unwrap();
        assert!(left.is_empty());
    }

    #[test]
    fn test_delete_missing_and_unknown_kind() {
        let (storage, session) = setup();
        let missing = delete_entry(
            &storage,
            &session,
            DeleteEntryParams { kind: "workout".to_string(), id: "nope".to_string() },
        );
        assert_eq!(missing.unwrap_err().code(), crate::tools::NOT_FOUND);

        let unknown = delete_entry(
            &storage,
            &session,
            DeleteEntryParams { kind: "sleep".to_string(), id: "x".to_string() },
        );
        assert!(matches!(unknown, Err(ToolError::InvalidParams(_))));
    }

    #[test]
    fn test_other_users_record_is_not_found() {
        let (storage, session) = setup();
        let entry = WaterEntry::new(UserId::new("someone").unwrap(), session.today(), 250.0).unwrap();
        storage.insert_record(&entry).unwrap();

        let result = delete_entry(
            &storage,
            &session,
            DeleteEntryParams { kind: "water".to_string(), id: entry.id.to_string() },
        );
        assert!(result.is_err());
    }
}
