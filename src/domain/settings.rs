/// Per-user settings and body profile
///
/// There is one settings document per user, keyed by the user id. It is
/// replaced wholesale on every save.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    validate_notes, ActivityLevel, BodyGoal, DomainError, Gender, ReminderKind, RecordId, UserId,
    Units,
};

pub const DEFAULT_WATER_TARGET_ML: f64 = 2_000.0;

/// Body profile used by the calorie-target formulas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub gender: Gender,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl Profile {
    pub fn new(gender: Gender, age: u32, height_cm: f64, weight_kg: f64) -> Result<Self, DomainError> {
        if !(13..=120).contains(&age) {
            return Err(DomainError::InvalidValue {
                message: "Age must be between 13 and 120".to_string(),
            });
        }
        if !height_cm.is_finite() || !(50.0..=272.0).contains(&height_cm) {
            return Err(DomainError::InvalidValue {
                message: "Height must be between 50 and 272 cm".to_string(),
            });
        }
        if !weight_kg.is_finite() || !(20.0..=700.0).contains(&weight_kg) {
            return Err(DomainError::InvalidValue {
                message: "Weight must be between 20 and 700 kg".to_string(),
            });
        }
        Ok(Self { gender, age, height_cm, weight_kg })
    }
}

/// A reminder the user wants to receive at a time of day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderSetting {
    pub id: RecordId,
    pub kind: ReminderKind,
    pub time: NaiveTime,
    pub message: Option<String>,
    pub enabled: bool,
}

impl ReminderSetting {
    pub fn new(kind: ReminderKind, time: NaiveTime, message: Option<String>) -> Result<Self, DomainError> {
        validate_notes(&message, "Reminder message")?;
        Ok(Self {
            id: RecordId::generate(),
            kind,
            time,
            message,
            enabled: true,
        })
    }

    /// Text shown when the reminder fires
    pub fn text(&self) -> String {
        match &self.message {
            Some(m) if !m.trim().is_empty() => m.clone(),
            _ => match self.kind {
                ReminderKind::Water => "Time to drink some water 💧".to_string(),
                ReminderKind::Workout => "Time for your workout 💪".to_string(),
                ReminderKind::Meal => "Don't forget to log your meal 🍽️".to_string(),
                ReminderKind::WeighIn => "Time for your weigh-in ⚖️".to_string(),
                ReminderKind::Habit => "Check off today's habits ✅".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Same value as `user_id`; one settings document per user
    pub id: RecordId,
    pub user_id: UserId,
    #[serde(default)]
    pub units: Units,
    pub body_goal: Option<BodyGoal>,
    pub activity_level: Option<ActivityLevel>,
    pub profile: Option<Profile>,
    pub daily_calorie_target: Option<u32>,
    #[serde(default = "default_water_target")]
    pub daily_water_target_ml: f64,
    #[serde(default)]
    pub reminders: Vec<ReminderSetting>,
    #[serde(default)]
    pub onboarding_complete: bool,
    pub updated_at: DateTime<Utc>,
}

fn default_water_target() -> f64 {
    DEFAULT_WATER_TARGET_ML
}

impl UserSettings {
    /// Settings for a user who has never saved any
    pub fn defaults_for(user_id: UserId) -> Self {
        Self {
            id: RecordId::from(user_id.as_str()),
            user_id,
            units: Units::Metric,
            body_goal: None,
            activity_level: None,
            profile: None,
            daily_calorie_target: None,
            daily_water_target_ml: DEFAULT_WATER_TARGET_ML,
            reminders: Vec::new(),
            onboarding_complete: false,
            updated_at: Utc::now(),
        }
    }

    pub fn set_water_target(&mut self, ml: f64) -> Result<(), DomainError> {
        check_water_target(ml)?;
        self.daily_water_target_ml = ml;
        Ok(())
    }

    pub fn set_calorie_target(&mut self, kcal: u32) -> Result<(), DomainError> {
        check_calorie_target(kcal)?;
        self.daily_calorie_target = Some(kcal);
        Ok(())
    }

    /// Check a settings document that did not come through the setters
    pub fn validate(&self) -> Result<(), DomainError> {
        check_water_target(self.daily_water_target_ml)?;
        if let Some(kcal) = self.daily_calorie_target {
            check_calorie_target(kcal)?;
        }
        if let Some(p) = self.profile {
            Profile::new(p.gender, p.age, p.height_cm, p.weight_kg)?;
        }
        for reminder in &self.reminders {
            validate_notes(&reminder.message, "Reminder message")?;
        }
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn check_water_target(ml: f64) -> Result<(), DomainError> {
    if !ml.is_finite() || ml <= 0.0 || ml > 10_000.0 {
        return Err(DomainError::InvalidValue {
            message: "Daily water target must be between 0 and 10000 ml".to_string(),
        });
    }
    Ok(())
}

fn check_calorie_target(kcal: u32) -> Result<(), DomainError> {
    if !(800..=10_000).contains(&kcal) {
        return Err(DomainError::InvalidValue {
            message: "Daily calorie target must be between 800 and 10000".to_string(),
        });
    }
    Ok(())
}
