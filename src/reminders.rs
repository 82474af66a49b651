/// In-memory reminder scheduling
///
/// Each enabled reminder gets a tokio task that sleeps until its next time
/// of day, sends a `FiredReminder` down the channel and goes back to sleep.
/// The server turns fired reminders into notifications. Schedules live only
/// as long as the process.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::{ReminderKind, ReminderSetting};

/// A reminder that came due
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredReminder {
    pub reminder_id: String,
    pub kind: ReminderKind,
    pub message: String,
    pub fired_at: DateTime<Utc>,
}

impl FiredReminder {
    fn from_setting(reminder: &ReminderSetting) -> Self {
        Self {
            reminder_id: reminder.id.to_string(),
            kind: reminder.kind,
            message: reminder.text(),
            fired_at: Utc::now(),
        }
    }
}

/// Time until the next `time` of day strictly after `now`
pub fn delay_until(time: NaiveTime, now: NaiveDateTime) -> Duration {
    let today = now.date().and_time(time);
    let next = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

pub struct ReminderScheduler {
    tasks: HashMap<String, JoinHandle<()>>,
    sender: mpsc::UnboundedSender<FiredReminder>,
}

impl ReminderScheduler {
    /// Create a scheduler and the receiving end of its notifications
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FiredReminder>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                tasks: HashMap::new(),
                sender,
            },
            receiver,
        )
    }

    /// Start (or restart) the daily timer for one reminder
    ///
    /// Must be called from within a tokio runtime. Disabled reminders are
    /// cancelled instead.
    pub fn schedule(&mut self, reminder: &ReminderSetting) {
        let id = reminder.id.to_string();
        self.cancel(&id);
        if !reminder.enabled {
            return;
        }

        let sender = self.sender.clone();
        let setting = reminder.clone();
        let handle = tokio::spawn(async move {
            loop {
                let wait = delay_until(setting.time, Local::now().naive_local());
                tokio::time::sleep(wait).await;

                if sender.send(FiredReminder::from_setting(&setting)).is_err() {
                    break;
                }
                tracing::debug!("Reminder {} fired", setting.id);

                // Step past the scheduled second before computing the next delay
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        });

        tracing::debug!("Scheduled {} reminder {} at {}", reminder.kind, id, reminder.time);
        self.tasks.insert(id, handle);
    }

    /// Stop a reminder's timer; returns whether one was running
    pub fn cancel(&mut self, reminder_id: &str) -> bool {
        match self.tasks.remove(reminder_id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Replace every timer with the given reminders
    pub fn sync(&mut self, reminders: &[ReminderSetting]) {
        self.cancel_all();
        for reminder in reminders {
            self.schedule(reminder);
        }
        tracing::info!("{} reminders scheduled", self.tasks.len());
    }

    /// Send a reminder right away without touching its schedule
    pub fn fire_now(&self, reminder: &ReminderSetting) -> bool {
        self.sender.send(FiredReminder::from_setting(reminder)).is_ok()
    }

    pub fn is_scheduled(&self, reminder_id: &str) -> bool {
        self.tasks.contains_key(reminder_id)
    }

    pub fn scheduled_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
