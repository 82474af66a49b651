/// Habit entity and daily habit entries
///
/// A habit is something the user wants to do every day. Completion is
/// recorded as at most one `HabitEntry` per habit per day, identified by the
/// composite id `habitId_date`, with an explicit `completed` flag.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{validate_name, validate_notes, DomainError, RecordId, UserId};

/// A daily habit the user tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: RecordId,
    pub user_id: UserId,
    /// Display name (e.g., "Stretch", "No sugar")
    pub name: String,
    pub description: Option<String>,
    /// Optional emoji or short icon label shown next to the name
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit with validation
    pub fn new(
        user_id: UserId,
        name: String,
        description: Option<String>,
        icon: Option<String>,
    ) -> Result<Self, DomainError> {
        let habit = Self {
            id: RecordId::generate(),
            user_id,
            name: name.trim().to_string(),
            description,
            icon,
            created_at: Utc::now(),
        };
        habit.validate()?;
        Ok(habit)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.name, "Habit name", 100)?;
        validate_notes(&self.description, "Description")?;

        if let Some(icon) = &self.icon {
            if icon.chars().count() > 16 {
                return Err(DomainError::InvalidValue {
                    message: "Icon cannot be longer than 16 characters".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Day the habit started being tracked, in local time like "today"
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.with_timezone(&Local).date_naive()
    }
}

/// Completion state of one habit on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    /// Always `habitId_date`
    pub id: RecordId,
    pub user_id: UserId,
    pub habit_id: RecordId,
    pub date: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HabitEntry {
    /// Create an entry for `habit_id` on `date`
    pub fn new(user_id: UserId, habit_id: RecordId, date: NaiveDate, completed: bool) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::composite(&habit_id, date),
            user_id,
            habit_id,
            date,
            completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Make `id` the composite of `habit_id` and `date` again
    pub fn normalize_id(&mut self) {
        self.id = RecordId::composite(&self.habit_id, self.date);
    }

    /// Flip the completion flag in place
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("tester").unwrap()
    }

    #[test]
    fn test_create_valid_habit() {
        let habit = Habit::new(user(), "Stretch".to_string(), None, Some("🧘".to_string()));
        assert!(habit.is_ok());
        assert_eq!(habit.unwrap().name, "Stretch");
    }

    #[test]
    fn test_invalid_habit_name() {
        assert!(Habit::new(user(), "".to_string(), None, None).is_err());
        assert!(Habit::new(user(), "x".repeat(101), None, None).is_err());
    }

    #[test]
    fn test_entry_id_is_deterministic() {
        let habit_id = RecordId::from("h1");
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let a = HabitEntry::new(user(), habit_id.clone(), date, true);
        let b = HabitEntry::new(user(), habit_id, date, false);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.as_str(), "h1_2024-02-29");
    }

    #[test]
    fn test_created_on_matches_local_today() {
        let habit = Habit::new(user(), "Stretch".to_string(), None, None).unwrap();
        assert_eq!(habit.created_on(), crate::domain::today());

        let mut late = habit.clone();
        late.created_at = DateTime::parse_from_rfc3339("2024-03-09T23:30:00-05:00")
            .unwrap()
            .with_timezone(&Utc);
        let local_day = late.created_at.with_timezone(&Local).date_naive();
        assert_eq!(late.created_on(), local_day);
    }

    #[test]
    fn test_normalize_id_rebuilds_composite() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut entry = HabitEntry::new(user(), RecordId::from("h1"), date, true);
        entry.id = RecordId::from("stray");
        entry.normalize_id();
        assert_eq!(entry.id.as_str(), "h1_2024-02-29");
    }

    #[test]
    fn test_toggle_flips_completion() {
        let mut entry = HabitEntry::new(
            user(),
            RecordId::from("h1"),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            true,
        );
        entry.toggle();
        assert!(!entry.completed);
        entry.toggle();
        assert!(entry.completed);
    }
}
