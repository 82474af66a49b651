/// Typed per-entity operations on top of a `DocumentStore`
///
/// Every `Document` type gets insert / get / list / delete for free. The few
/// entity-specific operations live here too: habit-entry upsert and toggle,
/// habit deletion, and settings load/save.

use chrono::NaiveDate;

use crate::domain::{DateWindow, Habit, HabitEntry, RecordId, UserId, UserSettings};
use crate::storage::{DateFilter, Document, DocumentStore, StorageError};

pub trait RecordStore: DocumentStore {
    /// Insert a new record (generated id, server timestamp)
    fn insert_record<D: Document>(&self, record: &D) -> Result<(), StorageError> {
        self.insert(&record.to_stored()?)
    }

    /// Replace a record in place (settings, goals, habit entries)
    fn replace_record<D: Document>(&self, record: &D) -> Result<(), StorageError> {
        self.replace(&record.to_stored()?)
    }

    fn get_record<D: Document>(&self, user: &UserId, id: &RecordId) -> Result<Option<D>, StorageError> {
        match self.get(D::COLLECTION, user.as_str(), id.as_str())? {
            Some(doc) => Ok(Some(D::from_stored(&doc)?)),
            None => Ok(None),
        }
    }

    /// Like `get_record`, but a missing record is an error
    fn require_record<D: Document>(&self, user: &UserId, id: &RecordId) -> Result<D, StorageError> {
        self.get_record(user, id)?.ok_or_else(|| StorageError::NotFound {
            collection: D::COLLECTION.as_str(),
            id: id.to_string(),
        })
    }

    fn delete_record<D: Document>(&self, user: &UserId, id: &RecordId) -> Result<(), StorageError> {
        if self.delete(D::COLLECTION, user.as_str(), id.as_str())? {
            Ok(())
        } else {
            Err(StorageError::NotFound {
                collection: D::COLLECTION.as_str(),
                id: id.to_string(),
            })
        }
    }

    /// Every record of this type owned by `user`, newest first
    fn list_records<D: Document>(&self, user: &UserId, filter: DateFilter) -> Result<Vec<D>, StorageError> {
        self.list(D::COLLECTION, user.as_str(), filter)?
            .iter()
            .map(D::from_stored)
            .collect()
    }

    /// Records dated inside `window`, read with a single range query
    fn list_in_window<D: Document>(&self, user: &UserId, window: DateWindow) -> Result<Vec<D>, StorageError> {
        self.list_records(user, DateFilter::Between(window.start, window.end))
    }

    /// Whether `habit_id` is marked completed on `date`
    fn habit_completed(&self, user: &UserId, habit_id: &RecordId, date: NaiveDate) -> Result<bool, StorageError> {
        let id = RecordId::composite(habit_id, date);
        Ok(self
            .get_record::<HabitEntry>(user, &id)?
            .map(|e| e.completed)
            .unwrap_or(false))
    }

    /// Idempotent upsert of a habit's completion on a day
    fn set_habit_completion(
        &self,
        user: &UserId,
        habit_id: &RecordId,
        date: NaiveDate,
        completed: bool,
    ) -> Result<HabitEntry, StorageError> {
        let id = RecordId::composite(habit_id, date);
        let entry = match self.get_record::<HabitEntry>(user, &id)? {
            Some(mut existing) => {
                if existing.completed != completed {
                    existing.toggle();
                }
                existing
            }
            None => HabitEntry::new(user.clone(), habit_id.clone(), date, completed),
        };
        self.replace_record(&entry)?;
        Ok(entry)
    }

    /// Flip a habit's completion on a day and return the new entry
    fn toggle_habit_entry(
        &self,
        user: &UserId,
        habit_id: &RecordId,
        date: NaiveDate,
    ) -> Result<HabitEntry, StorageError> {
        self.require_record::<Habit>(user, habit_id)?;
        let completed = self.habit_completed(user, habit_id, date)?;
        let entry = self.set_habit_completion(user, habit_id, date, !completed)?;
        tracing::debug!(
            "Toggled habit {} on {}: {} -> {}",
            habit_id,
            date,
            completed,
            entry.completed
        );
        Ok(entry)
    }

    /// Delete a habit and its entries; returns the number of entries removed
    ///
    /// Entries are deleted one by one before the habit itself.
    fn delete_habit(&self, user: &UserId, habit_id: &RecordId) -> Result<usize, StorageError> {
        self.require_record::<Habit>(user, habit_id)?;

        let entries: Vec<HabitEntry> = self.list_records(user, DateFilter::Any)?;
        let mut removed = 0;
        for entry in entries.iter().filter(|e| &e.habit_id == habit_id) {
            self.delete_record::<HabitEntry>(user, &entry.id)?;
            removed += 1;
        }

        self.delete_record::<Habit>(user, habit_id)?;
        Ok(removed)
    }

    /// Settings for `user`, or defaults if none were ever saved
    fn load_settings(&self, user: &UserId) -> Result<UserSettings, StorageError> {
        let id = RecordId::from(user.as_str());
        Ok(self
            .get_record::<UserSettings>(user, &id)?
            .unwrap_or_else(|| UserSettings::defaults_for(user.clone())))
    }

    fn save_settings(&self, settings: &mut UserSettings) -> Result<(), StorageError> {
        settings.touch();
        self.replace_record(settings)
    }
}

impl<T: DocumentStore + ?Sized> RecordStore for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Units, WaterEntry};
    use crate::storage::SqliteStorage;

    fn user() -> UserId {
        UserId::new("alice").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    #[test]
    fn test_typed_roundtrip() {
        let storage = SqliteStorage::in_memory().unwrap();
        let entry = WaterEntry::new(user(), day(1), 500.0).unwrap();
        storage.insert_record(&entry).unwrap();

        let loaded: WaterEntry = storage.require_record(&user(), &entry.id).unwrap();
        assert_eq!(loaded, entry);

        storage.delete_record::<WaterEntry>(&user(), &entry.id).unwrap();
        assert!(storage.delete_record::<WaterEntry>(&user(), &entry.id).is_err());
    }

    #[test]
    fn test_window_query_does_not_duplicate() {
        let storage = SqliteStorage::in_memory().unwrap();
        for d in 1..=10 {
            storage.insert_record(&WaterEntry::new(user(), day(d), 250.0).unwrap()).unwrap();
        }
        let window = DateWindow::new(day(3), day(7)).unwrap();
        let entries: Vec<WaterEntry> = storage.list_in_window(&user(), window).unwrap();
        assert_eq!(entries.len(), 5);
    }

    #[test]
    fn test_toggle_is_involution() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = Habit::new(user(), "Stretch".to_string(), None, None).unwrap();
        storage.insert_record(&habit).unwrap();

        assert!(!storage.habit_completed(&user(), &habit.id, day(2)).unwrap());
        assert!(storage.toggle_habit_entry(&user(), &habit.id, day(2)).unwrap().completed);
        assert!(storage.habit_completed(&user(), &habit.id, day(2)).unwrap());
        assert!(!storage.toggle_habit_entry(&user(), &habit.id, day(2)).unwrap().completed);
        assert!(!storage.habit_completed(&user(), &habit.id, day(2)).unwrap());

        // One document per habit per day, however often it is toggled
        let entries: Vec<HabitEntry> = storage.list_records(&user(), DateFilter::Any).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_set_completion_is_idempotent() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit_id = RecordId::from("h1");
        storage.set_habit_completion(&user(), &habit_id, day(4), true).unwrap();
        storage.set_habit_completion(&user(), &habit_id, day(4), true).unwrap();
        assert!(storage.habit_completed(&user(), &habit_id, day(4)).unwrap());
    }

    #[test]
    fn test_toggle_unknown_habit_fails() {
        let storage = SqliteStorage::in_memory().unwrap();
        let result = storage.toggle_habit_entry(&user(), &RecordId::from("missing"), day(1));
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_delete_habit_removes_entries() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = Habit::new(user(), "Read".to_string(), None, None).unwrap();
        let other = Habit::new(user(), "Walk".to_string(), None, None).unwrap();
        storage.insert_record(&habit).unwrap();
        storage.insert_record(&other).unwrap();
        storage.set_habit_completion(&user(), &habit.id, day(1), true).unwrap();
        storage.set_habit_completion(&user(), &habit.id, day(2), true).unwrap();
        storage.set_habit_completion(&user(), &other.id, day(1), true).unwrap();

        assert_eq!(storage.delete_habit(&user(), &habit.id).unwrap(), 2);
        let remaining: Vec<HabitEntry> = storage.list_records(&user(), DateFilter::Any).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].habit_id, other.id);
    }

    #[test]
    fn test_settings_default_then_replace() {
        let storage = SqliteStorage::in_memory().unwrap();
        let mut settings = storage.load_settings(&user()).unwrap();
        assert_eq!(settings.units, Units::Metric);

        settings.units = Units::Imperial;
        storage.save_settings(&mut settings).unwrap();
        storage.save_settings(&mut settings).unwrap();

        assert_eq!(storage.load_settings(&user()).unwrap().units, Units::Imperial);
    }
}
