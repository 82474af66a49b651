/// Storage layer for persisting user records
///
/// Records are stored as JSON documents in named collections, scoped by user
/// and optionally by calendar day. `DocumentStore` is the raw interface the
/// SQLite backend implements; `RecordStore` layers typed, per-entity helpers
/// on top of it for every `Document` type.

pub mod sqlite;
pub mod migrations;
pub mod documents;
pub mod records;

// Re-export the main storage types
pub use sqlite::*;
pub use documents::*;
pub use records::*;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("Duplicate record: {collection} {id} already exists")]
    Duplicate { collection: &'static str, id: String },

    #[error("Corrupt record {id} in {collection}: {reason}")]
    Corrupt {
        collection: &'static str,
        id: String,
        reason: String,
    },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Named collections, one per record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Calories,
    Workouts,
    Routines,
    Habits,
    HabitEntries,
    Weights,
    Water,
    Measurements,
    Goals,
    Achievements,
    MealPlans,
    Settings,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Calories => "calories",
            Collection::Workouts => "workouts",
            Collection::Routines => "routines",
            Collection::Habits => "habits",
            Collection::HabitEntries => "habit_entries",
            Collection::Weights => "weights",
            Collection::Water => "water",
            Collection::Measurements => "measurements",
            Collection::Goals => "goals",
            Collection::Achievements => "achievements",
            Collection::MealPlans => "meal_plans",
            Collection::Settings => "settings",
        }
    }
}

/// Date predicate for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Any,
    On(NaiveDate),
    Between(NaiveDate, NaiveDate),
}

/// A document as it sits in the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub collection: Collection,
    pub id: String,
    pub user_id: String,
    pub date: Option<NaiveDate>,
    /// Server timestamp of the first write
    pub created_at: DateTime<Utc>,
    /// Server timestamp of the latest write
    pub updated_at: DateTime<Utc>,
    pub body: serde_json::Value,
}

/// Trait defining the raw document storage interface
///
/// This trait allows us to swap SQLite for another backend while keeping the
/// same interface. Lists are sorted newest-first (date, then creation time).
pub trait DocumentStore {
    /// Insert a new document; fails with `Duplicate` if the id is taken
    fn insert(&self, doc: &StoredDocument) -> Result<(), StorageError>;

    /// Insert or fully replace a document with the same id
    fn replace(&self, doc: &StoredDocument) -> Result<(), StorageError>;

    /// Fetch one document owned by `user_id`
    fn get(
        &self,
        collection: Collection,
        user_id: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StorageError>;

    /// Delete one document owned by `user_id`; returns whether it existed
    fn delete(&self, collection: Collection, user_id: &str, id: &str) -> Result<bool, StorageError>;

    /// List every document of a user in a collection matching the date filter
    fn list(
        &self,
        collection: Collection,
        user_id: &str,
        filter: DateFilter,
    ) -> Result<Vec<StoredDocument>, StorageError>;
}
