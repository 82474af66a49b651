/// The signed-in user for the lifetime of the server process
///
/// Every tool receives the session explicitly. It names the user whose
/// records are read and written, and the day that counts as "today".

use chrono::NaiveDate;

use crate::analytics::AnalyticsEngine;
use crate::domain::UserId;

#[derive(Debug, Clone)]
pub struct Session {
    user: UserId,
    analytics: AnalyticsEngine,
}

impl Session {
    /// Session that follows the local calendar
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            analytics: AnalyticsEngine::new(),
        }
    }

    /// Session whose "today" is fixed
    pub fn pinned(user: UserId, today: NaiveDate) -> Self {
        Self {
            user,
            analytics: AnalyticsEngine::at(today),
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn today(&self) -> NaiveDate {
        self.analytics.today()
    }

    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }
}
