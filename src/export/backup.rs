/// Full JSON backup of one user's records, and restore from it
///
/// A backup carries a top-level `timestamp`; restore refuses documents
/// without one. Restore re-owns every record to the restoring user and
/// checks it the way the record's constructor would before anything is
/// written, then replaces by id one write at a time. Habit entry ids are
/// rebuilt from habit and day so a backup cannot create a second entry for
/// the same day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    find_achievement, AchievementUnlock, CalorieEntry, DomainError, Goal, Habit, HabitEntry,
    MealPlan, MeasurementEntry, RecordId, UserId, UserSettings, WaterEntry, WeightEntry, Workout,
    WorkoutRoutine,
};
use crate::export::ExportError;
use crate::storage::{DateFilter, Document, RecordStore};

/// Backup layout version written by this build
pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: u32,
    pub user_id: String,
    #[serde(default)]
    pub settings: Option<UserSettings>,
    #[serde(default)]
    pub calories: Vec<CalorieEntry>,
    #[serde(default)]
    pub workouts: Vec<Workout>,
    #[serde(default)]
    pub routines: Vec<WorkoutRoutine>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub habit_entries: Vec<HabitEntry>,
    #[serde(default)]
    pub weights: Vec<WeightEntry>,
    #[serde(default)]
    pub water: Vec<WaterEntry>,
    #[serde(default)]
    pub measurements: Vec<MeasurementEntry>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub achievements: Vec<AchievementUnlock>,
    #[serde(default)]
    pub meal_plans: Vec<MealPlan>,
}

fn default_version() -> u32 {
    BACKUP_VERSION
}

/// Records written by a restore, per collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub settings: bool,
    pub calories: usize,
    pub workouts: usize,
    pub routines: usize,
    pub habits: usize,
    pub habit_entries: usize,
    pub weights: usize,
    pub water: usize,
    pub measurements: usize,
    pub goals: usize,
    pub achievements: usize,
    pub meal_plans: usize,
}

impl RestoreSummary {
    pub fn total(&self) -> usize {
        usize::from(self.settings)
            + self.calories
            + self.workouts
            + self.routines
            + self.habits
            + self.habit_entries
            + self.weights
            + self.water
            + self.measurements
            + self.goals
            + self.achievements
            + self.meal_plans
    }
}

impl Backup {
    /// Dump every record `user` owns
    pub fn collect<S: RecordStore + ?Sized>(storage: &S, user: &UserId) -> Result<Self, ExportError> {
        let settings_id = RecordId::from(user.as_str());
        let backup = Self {
            timestamp: Utc::now(),
            version: BACKUP_VERSION,
            user_id: user.to_string(),
            settings: storage.get_record(user, &settings_id)?,
            calories: storage.list_records(user, DateFilter::Any)?,
            workouts: storage.list_records(user, DateFilter::Any)?,
            routines: storage.list_records(user, DateFilter::Any)?,
            habits: storage.list_records(user, DateFilter::Any)?,
            habit_entries: storage.list_records(user, DateFilter::Any)?,
            weights: storage.list_records(user, DateFilter::Any)?,
            water: storage.list_records(user, DateFilter::Any)?,
            measurements: storage.list_records(user, DateFilter::Any)?,
            goals: storage.list_records(user, DateFilter::Any)?,
            achievements: storage.list_records(user, DateFilter::Any)?,
            meal_plans: storage.list_records(user, DateFilter::Any)?,
        };
        Ok(backup)
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a backup document, rejecting ones without a `timestamp`
    pub fn from_json(text: &str) -> Result<Self, ExportError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ExportError::InvalidBackup(format!("not valid JSON: {}", e)))?;

        match value.get("timestamp") {
            Some(ts) if !ts.is_null() => {}
            _ => return Err(ExportError::MissingTimestamp),
        }

        let backup: Backup = serde_json::from_value(value)
            .map_err(|e| ExportError::InvalidBackup(e.to_string()))?;

        if backup.version > BACKUP_VERSION {
            return Err(ExportError::InvalidBackup(format!(
                "backup version {} is newer than supported version {}",
                backup.version, BACKUP_VERSION
            )));
        }
        Ok(backup)
    }

    /// Write every record under `user`, replacing records with the same id
    ///
    /// Nothing is written unless every record in the backup is valid.
    pub fn restore<S: RecordStore + ?Sized>(
        mut self,
        storage: &S,
        user: &UserId,
    ) -> Result<RestoreSummary, ExportError> {
        tracing::info!(
            "Restoring backup from {} (originally {}) into {}",
            self.timestamp,
            self.user_id,
            user
        );

        self.prepare(user)?;

        let mut summary = RestoreSummary::default();

        if let Some(mut settings) = self.settings {
            storage.save_settings(&mut settings)?;
            summary.settings = true;
        }

        summary.calories = write_all(storage, &self.calories)?;
        summary.workouts = write_all(storage, &self.workouts)?;
        summary.routines = write_all(storage, &self.routines)?;
        summary.habits = write_all(storage, &self.habits)?;
        summary.habit_entries = write_all(storage, &self.habit_entries)?;
        summary.weights = write_all(storage, &self.weights)?;
        summary.water = write_all(storage, &self.water)?;
        summary.measurements = write_all(storage, &self.measurements)?;
        summary.goals = write_all(storage, &self.goals)?;
        summary.achievements = write_all(storage, &self.achievements)?;
        summary.meal_plans = write_all(storage, &self.meal_plans)?;

        tracing::info!("Restored {} records", summary.total());
        Ok(summary)
    }

    /// Re-own and check every record in place
    fn prepare(&mut self, user: &UserId) -> Result<(), ExportError> {
        if let Some(settings) = &mut self.settings {
            settings.id = RecordId::from(user.as_str());
            settings.user_id = user.clone();
            settings
                .validate()
                .map_err(|e| ExportError::InvalidBackup(format!("settings: {}", e)))?;
        }

        prepare_all(&mut self.calories, user)?;
        prepare_all(&mut self.workouts, user)?;
        prepare_all(&mut self.routines, user)?;
        prepare_all(&mut self.habits, user)?;
        prepare_all(&mut self.habit_entries, user)?;
        prepare_all(&mut self.weights, user)?;
        prepare_all(&mut self.water, user)?;
        prepare_all(&mut self.measurements, user)?;
        prepare_all(&mut self.goals, user)?;
        prepare_all(&mut self.achievements, user)?;
        prepare_all(&mut self.meal_plans, user)?;
        Ok(())
    }
}

/// A backed-up record that can be moved to another user and re-checked
trait Restorable: Document {
    fn reown(&mut self, user: &UserId);

    fn check(&mut self) -> Result<(), DomainError>;
}

macro_rules! restorable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Restorable for $ty {
                fn reown(&mut self, user: &UserId) {
                    self.user_id = user.clone();
                }

                fn check(&mut self) -> Result<(), DomainError> {
                    self.validate()
                }
            }
        )*
    };
}

restorable!(
    CalorieEntry,
    Workout,
    WorkoutRoutine,
    Habit,
    WeightEntry,
    WaterEntry,
    MeasurementEntry,
    Goal,
    MealPlan,
);

impl Restorable for HabitEntry {
    fn reown(&mut self, user: &UserId) {
        self.user_id = user.clone();
    }

    fn check(&mut self) -> Result<(), DomainError> {
        self.normalize_id();
        Ok(())
    }
}

impl Restorable for AchievementUnlock {
    fn reown(&mut self, user: &UserId) {
        self.user_id = user.clone();
    }

    fn check(&mut self) -> Result<(), DomainError> {
        match find_achievement(&self.achievement_id) {
            Some(_) => Ok(()),
            None => Err(DomainError::UnknownVariant {
                kind: "achievement",
                value: self.achievement_id.clone(),
            }),
        }
    }
}

fn prepare_all<D: Restorable>(records: &mut [D], user: &UserId) -> Result<(), ExportError> {
    for record in records.iter_mut() {
        record.reown(user);
        record.check().map_err(|e| {
            ExportError::InvalidBackup(format!(
                "{} {}: {}",
                D::COLLECTION.as_str(),
                record.id(),
                e
            ))
        })?;
    }
    Ok(())
}

fn write_all<S, D>(storage: &S, records: &[D]) -> Result<usize, ExportError>
where
    S: RecordStore + ?Sized,
    D: Document,
{
    for record in records {
        storage.replace_record(record)?;
    }
    Ok(records.len())
}
