/// Mapping between domain records and stored documents
///
/// Every persisted record type implements `Document`, which names its
/// collection and exposes the id, owner and (optional) calendar day that the
/// store indexes on. The record itself is stored as its JSON body.

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{
    AchievementUnlock, CalorieEntry, Goal, Habit, HabitEntry, MealPlan, MeasurementEntry,
    RecordId, UserId, UserSettings, WaterEntry, WeightEntry, Workout, WorkoutRoutine,
};
use crate::storage::{Collection, StorageError, StoredDocument};

pub trait Document: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn id(&self) -> &RecordId;

    fn user_id(&self) -> &UserId;

    /// Calendar day used for date queries, if the record has one
    fn date(&self) -> Option<NaiveDate> {
        None
    }

    /// Serialize into a stored document stamped with the current time
    fn to_stored(&self) -> Result<StoredDocument, StorageError> {
        let now = Utc::now();
        Ok(StoredDocument {
            collection: Self::COLLECTION,
            id: self.id().to_string(),
            user_id: self.user_id().to_string(),
            date: self.date(),
            created_at: now,
            updated_at: now,
            body: serde_json::to_value(self)?,
        })
    }

    /// Deserialize a stored document back into the record
    fn from_stored(doc: &StoredDocument) -> Result<Self, StorageError> {
        serde_json::from_value(doc.body.clone()).map_err(|e| StorageError::Corrupt {
            collection: Self::COLLECTION.as_str(),
            id: doc.id.clone(),
            reason: e.to_string(),
        })
    }
}

macro_rules! dated_document {
    ($($ty:ty => $collection:expr),* $(,)?) => {
        $(
            impl Document for $ty {
                const COLLECTION: Collection = $collection;

                fn id(&self) -> &RecordId {
                    &self.id
                }

                fn user_id(&self) -> &UserId {
                    &self.user_id
                }

                fn date(&self) -> Option<NaiveDate> {
                    Some(self.date)
                }
            }
        )*
    };
}

macro_rules! undated_document {
    ($($ty:ty => $collection:expr),* $(,)?) => {
        $(
            impl Document for $ty {
                const COLLECTION: Collection = $collection;

                fn id(&self) -> &RecordId {
                    &self.id
                }

                fn user_id(&self) -> &UserId {
                    &self.user_id
                }
            }
        )*
    };
}

dated_document! {
    CalorieEntry => Collection::Calories,
    Workout => Collection::Workouts,
    HabitEntry => Collection::HabitEntries,
    WeightEntry => Collection::Weights,
    WaterEntry => Collection::Water,
    MeasurementEntry => Collection::Measurements,
    MealPlan => Collection::MealPlans,
}

undated_document! {
    WorkoutRoutine => Collection::Routines,
    Habit => Collection::Habits,
    Goal => Collection::Goals,
    AchievementUnlock => Collection::Achievements,
    UserSettings => Collection::Settings,
}
