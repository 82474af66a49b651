/// Tools for daily reminders
///
/// Reminders are saved in the user's settings and scheduled in memory. A
/// fired reminder reaches the client as a log notification.

use chrono::NaiveTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ReminderKind, ReminderSetting};
use crate::reminders::ReminderScheduler;
use crate::session::Session;
use crate::storage::RecordStore;
use crate::tools::{parse_label, ToolError};

fn parse_time(value: &str) -> Result<NaiveTime, DomainError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| DomainError::InvalidValue {
            message: format!("'{}' is not a valid HH:MM time", value),
        })
}

/// Parameters for adding a reminder
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddReminderParams {
    /// water, workout, meal, weigh_in or habit
    pub kind: String,
    /// Time of day in 24-hour HH:MM format
    pub time: String,
    /// Custom text; a default for the kind is used otherwise
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub message: String,
    pub reminder: ReminderSetting,
    pub scheduled: bool,
}

pub fn add_reminder<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    scheduler: &mut ReminderScheduler,
    params: AddReminderParams,
) -> Result<ReminderResponse, ToolError> {
    let kind: ReminderKind = parse_label(&params.kind)?;
    let time = parse_time(&params.time)?;
    let reminder = ReminderSetting::new(kind, time, params.message)?;

    let mut settings = storage.load_settings(session.user())?;
    settings.reminders.push(reminder.clone());
    storage.save_settings(&mut settings)?;

    scheduler.schedule(&reminder);
    let scheduled = scheduler.is_scheduled(reminder.id.as_str());

    Ok(ReminderResponse {
        message: format!(
            "⏰ {} reminder set for {} every day: \"{}\"",
            kind,
            time.format("%H:%M"),
            reminder.text()
        ),
        reminder,
        scheduled,
    })
}

/// A saved reminder and whether its timer is running
#[derive(Debug, Serialize)]
pub struct ReminderStatus {
    #[serde(flatten)]
    pub reminder: ReminderSetting,
    pub scheduled: bool,
}

#[derive(Debug, Serialize)]
pub struct ListRemindersResponse {
    pub message: String,
    pub reminders: Vec<ReminderStatus>,
}

pub fn list_reminders<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    scheduler: &mut ReminderScheduler,
) -> Result<ListRemindersResponse, ToolError> {
    let mut reminders = storage.load_settings(session.user())?.reminders;
    reminders.sort_by_key(|r| r.time);

    let statuses: Vec<ReminderStatus> = reminders
        .into_iter()
        .map(|reminder| {
            let scheduled = scheduler.is_scheduled(reminder.id.as_str());
            ReminderStatus { reminder, scheduled }
        })
        .collect();

    let message = if statuses.is_empty() {
        "No reminders set.".to_string()
    } else {
        let mut lines = vec![format!("⏰ {} reminder(s):", statuses.len())];
        for status in &statuses {
            let state = match (status.reminder.enabled, status.scheduled) {
                (false, _) => " (disabled)",
                (true, false) => " (not scheduled)",
                (true, true) => "",
            };
            lines.push(format!(
                "  • {} {}: {}{} [{}]",
                status.reminder.time.format("%H:%M"),
                status.reminder.kind,
                status.reminder.text(),
                state,
                status.reminder.id
            ));
        }
        lines.join("\n")
    };

    Ok(ListRemindersResponse {
        message,
        reminders: statuses,
    })
}

/// Parameters naming one reminder
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReminderIdParams {
    pub reminder_id: String,
}

fn find_reminder(reminders: &[ReminderSetting], id: &str) -> Result<usize, ToolError> {
    reminders
        .iter()
        .position(|r| r.id.as_str() == id.trim())
        .ok_or_else(|| ToolError::NotFound(format!("reminder {}", id)))
}

pub fn remove_reminder<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    scheduler: &mut ReminderScheduler,
    params: ReminderIdParams,
) -> Result<ReminderResponse, ToolError> {
    let mut settings = storage.load_settings(session.user())?;
    let index = find_reminder(&settings.reminders, &params.reminder_id)?;
    let reminder = settings.reminders.remove(index);
    storage.save_settings(&mut settings)?;
    scheduler.cancel(reminder.id.as_str());

    Ok(ReminderResponse {
        message: format!(
            "🗑️ Removed {} reminder at {}",
            reminder.kind,
            reminder.time.format("%H:%M")
        ),
        reminder,
        scheduled: false,
    })
}

pub fn test_reminder<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    scheduler: &mut ReminderScheduler,
    params: ReminderIdParams,
) -> Result<ReminderResponse, ToolError> {
    let settings = storage.load_settings(session.user())?;
    let index = find_reminder(&settings.reminders, &params.reminder_id)?;
    let reminder = settings.reminders[index].clone();
    let sent = scheduler.fire_now(&reminder);
    let scheduled = scheduler.is_scheduled(reminder.id.as_str());

    let message = if sent {
        format!("🔔 Sent test reminder: \"{}\"", reminder.text())
    } else {
        "Could not deliver the test reminder; notifications are not running.".to_string()
    };

    Ok(ReminderResponse {
        message,
        reminder,
        scheduled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::storage::SqliteStorage;

    fn setup() -> (SqliteStorage, Session) {
        (
            SqliteStorage::in_memory().unwrap(),
            Session::new(UserId::new("tester").unwrap()),
        )
    }

    fn water_at(time: &str) -> AddReminderParams {
        AddReminderParams {
            kind: "water".to_string(),
            time: time.to_string(),
            message: None,
        }
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("07:30").unwrap(), NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(parse_time("21:05:10").unwrap(), NaiveTime::from_hms_opt(21, 5, 10).unwrap());
        assert!(parse_time("7pm").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let (storage, session) = setup();
        let (mut scheduler, _rx) = ReminderScheduler::new();

        let added = add_reminder(&storage, &session, &mut scheduler, water_at("10:00")).unwrap();
        assert!(added.scheduled);
        add_reminder(&storage, &session, &mut scheduler, water_at("08:00")).unwrap();

        let listed = list_reminders(&storage, &session, &mut scheduler).unwrap();
        assert_eq!(listed.reminders.len(), 2);
        assert_eq!(listed.reminders[0].reminder.time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());

        remove_reminder(
            &storage,
            &session,
            &mut scheduler,
            ReminderIdParams { reminder_id: added.reminder.id.to_string() },
        )
        .unwrap();
        assert!(!scheduler.is_scheduled(added.reminder.id.as_str()));
        assert_eq!(storage.load_settings(session.user()).unwrap().reminders.len(), 1);
    }

    #[tokio::test]
    async fn test_fire_reaches_channel() {
        let (storage, session) = setup();
        let (mut scheduler, mut rx) = ReminderScheduler::new();
        let added = add_reminder(&storage, &session, &mut scheduler, water_at("10:00")).unwrap();

        let response = test_reminder(
            &storage,
            &session,
            &mut scheduler,
            ReminderIdParams { reminder_id: added.reminder.id.to_string() },
        )
        .unwrap();
        assert!(response.message.starts_with("🔔"));
        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.kind, ReminderKind::Water);
    }

    #[tokio::test]
    async fn test_unknown_reminder() {
        let (storage, session) = setup();
        let (mut scheduler, _rx) = ReminderScheduler::new();
        let result = remove_reminder(
            &storage,
            &session,
            &mut scheduler,
            ReminderIdParams { reminder_id: "nope".to_string() },
        );
        assert_eq!(result.unwrap_err().code(), crate::tools::NOT_FOUND);
    }
}
