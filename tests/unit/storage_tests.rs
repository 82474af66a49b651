use chrono::NaiveDate;
use tempfile::NamedTempFile;

use fitness_tracker_mcp::domain::{Habit, UserId, WaterEntry};
use fitness_tracker_mcp::storage::DateFilter;
use fitness_tracker_mcp::{RecordStore, SqliteStorage};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
}

#[test]
fn test_range_query_is_inclusive() {
    let storage = SqliteStorage::in_memory().unwrap();
    let user = UserId::new("range").unwrap();
    for d in 1..=10 {
        storage
            .insert_record(&WaterEntry::new(user.clone(), day(d), 100.0).unwrap())
            .unwrap();
    }

    let window: Vec<WaterEntry> = storage
        .list_records(&user, DateFilter::Between(day(3), day(6)))
        .unwrap();
    assert_eq!(window.len(), 4);
    assert!(window.iter().all(|e| e.date >= day(3) && e.date <= day(6)));
}

#[test]
fn test_toggle_is_an_involution() {
    let storage = SqliteStorage::in_memory().unwrap();
    let user = UserId::new("toggle").unwrap();
    let habit = Habit::new(user.clone(), "Meditate".to_string(), None, None).unwrap();
    storage.insert_record(&habit).unwrap();

    let first = storage.toggle_habit_entry(&user, &habit.id, day(5)).unwrap();
    let second = storage.toggle_habit_entry(&user, &habit.id, day(5)).unwrap();
    assert!(first.completed);
    assert!(!second.completed);
    assert_eq!(first.id, second.id);
}

#[test]
fn test_records_survive_reopen() {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let user = UserId::new("persist").unwrap();
    {
        let storage = SqliteStorage::new(file.path()).expect("Failed to create storage");
        storage
            .insert_record(&WaterEntry::new(user.clone(), day(1), 330.0).unwrap())
            .unwrap();
    }

    let reopened = SqliteStorage::new(file.path()).expect("Failed to reopen storage");
    let entries: Vec<WaterEntry> = reopened.list_records(&user, DateFilter::Any).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount_ml, 330.0);
}

#[test]
fn test_users_are_isolated() {
    let storage = SqliteStorage::in_memory().unwrap();
    let alice = UserId::new("alice").unwrap();
    let bob = UserId::new("bob").unwrap();
    storage
        .insert_record(&WaterEntry::new(alice.clone(), day(1), 250.0).unwrap())
        .unwrap();

    let bobs: Vec<WaterEntry> = storage.list_records(&bob, DateFilter::Any).unwrap();
    assert!(bobs.is_empty());
}
