/// Workouts and reusable workout routines
///
/// A workout is a free-form exercise log line for one day. A routine is a
/// named list of exercises that can be stamped onto one or more days.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::{
    validate_name, validate_notes, validate_optional_amount, DomainError, RecordId, UserId,
    WorkoutCategory,
};

/// Exercise details shared by logged workouts and routine steps
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExerciseDetails {
    pub duration_minutes: Option<f64>,
    pub calories_burned: Option<f64>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub weight_kg: Option<f64>,
}

impl ExerciseDetails {
    fn validate(&self) -> Result<(), DomainError> {
        validate_optional_amount(self.duration_minutes, "Duration", 24.0 * 60.0)?;
        validate_optional_amount(self.calories_burned, "Calories burned", 20_000.0)?;
        validate_optional_amount(self.weight_kg, "Weight", 1_000.0)?;

        if matches!(self.sets, Some(s) if s > 100) {
            return Err(DomainError::InvalidValue {
                message: "Sets cannot exceed 100".to_string(),
            });
        }
        if matches!(self.reps, Some(r) if r > 10_000) {
            return Err(DomainError::InvalidValue {
                message: "Reps cannot exceed 10000".to_string(),
            });
        }
        Ok(())
    }
}

/// One exercise performed on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: RecordId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub exercise: String,
    pub category: WorkoutCategory,
    #[serde(flatten)]
    pub details: ExerciseDetails,
    pub notes: Option<String>,
    /// Routine this workout was created from, if any
    pub routine_id: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

impl Workout {
    pub fn new(
        user_id: UserId,
        date: NaiveDate,
        exercise: String,
        category: WorkoutCategory,
        details: ExerciseDetails,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        let workout = Self {
            id: RecordId::generate(),
            user_id,
            date,
            exercise: exercise.trim().to_string(),
            category,
            details,
            notes,
            routine_id: None,
            created_at: Utc::now(),
        };
        workout.validate()?;
        Ok(workout)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.exercise, "Exercise name", 100)?;
        self.details.validate()?;
        validate_notes(&self.notes, "Notes")
    }

    pub fn duration_minutes(&self) -> f64 {
        self.details.duration_minutes.unwrap_or(0.0)
    }

    pub fn calories_burned(&self) -> f64 {
        self.details.calories_burned.unwrap_or(0.0)
    }
}

/// One step of a routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineExercise {
    pub exercise: String,
    #[serde(default)]
    pub category: WorkoutCategory,
    #[serde(flatten)]
    pub details: ExerciseDetails,
}

/// A named, reusable list of exercises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRoutine {
    pub id: RecordId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub exercises: Vec<RoutineExercise>,
    /// Weekdays the routine is usually done on
    pub days: Vec<Weekday>,
    pub created_at: DateTime<Utc>,
}

impl WorkoutRoutine {
    pub fn new(
        user_id: UserId,
        name: String,
        description: Option<String>,
        exercises: Vec<RoutineExercise>,
        days: Vec<Weekday>,
    ) -> Result<Self, DomainError> {
        let mut days = days;
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();

        let routine = Self {
            id: RecordId::generate(),
            user_id,
            name: name.trim().to_string(),
            description,
            exercises,
            days,
            created_at: Utc::now(),
        };
        routine.validate()?;
        Ok(routine)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.name, "Routine name", 100)?;
        validate_notes(&self.description, "Description")?;

        if self.exercises.is_empty() {
            return Err(DomainError::Validation {
                message: "A routine needs at least one exercise".to_string(),
            });
        }
        if self.exercises.len() > 50 {
            return Err(DomainError::Validation {
                message: "A routine cannot have more than 50 exercises".to_string(),
            });
        }
        for step in &self.exercises {
            validate_name(&step.exercise, "Exercise name", 100)?;
            step.details.validate()?;
        }
        Ok(())
    }

    /// Build the workouts this routine produces for one day
    pub fn workouts_for(&self, date: NaiveDate) -> Result<Vec<Workout>, DomainError> {
        self.exercises
            .iter()
            .map(|step| {
                let mut workout = Workout::new(
                    self.user_id.clone(),
                    date,
                    step.exercise.clone(),
                    step.category,
                    step.details.clone(),
                    None,
                )?;
                workout.routine_id = Some(self.id.clone());
                Ok(workout)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("tester").unwrap()
    }

    fn squat() -> RoutineExercise {
        RoutineExercise {
            exercise: "Squat".to_string(),
            category: WorkoutCategory::Strength,
            details: ExerciseDetails {
                sets: Some(5),
                reps: Some(5),
                weight_kg: Some(100.0),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_create_valid_workout() {
        let workout = Workout::new(
            user(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            "Running".to_string(),
            WorkoutCategory::Cardio,
            ExerciseDetails {
                duration_minutes: Some(30.0),
                calories_burned: Some(300.0),
                ..Default::default()
            },
            None,
        )
        .unwrap();

        assert_eq!(workout.duration_minutes(), 30.0);
        assert_eq!(workout.calories_burned(), 300.0);
        assert!(workout.routine_id.is_none());
    }

    #[test]
    fn test_too_many_sets_invalid() {
        let result = Workout::new(
            user(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            "Push-ups".to_string(),
            WorkoutCategory::Strength,
            ExerciseDetails { sets: Some(500), ..Default::default() },
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_routine_invalid() {
        let result = WorkoutRoutine::new(user(), "Leg day".to_string(), None, vec![], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_routine_workouts_reference_routine() {
        let routine = WorkoutRoutine::new(
            user(),
            "Leg day".to_string(),
            None,
            vec![squat(), squat()],
            vec![Weekday::Fri, Weekday::Mon, Weekday::Fri],
        )
        .unwrap();
        assert_eq!(routine.days, vec![Weekday::Mon, Weekday::Fri]);

        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let workouts = routine.workouts_for(date).unwrap();
        assert_eq!(workouts.len(), 2);
        assert!(workouts.iter().all(|w| w.routine_id.as_ref() == Some(&routine.id)));
        assert_ne!(workouts[0].id, workouts[1].id);
    }
}
