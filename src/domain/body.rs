/// Body metrics: weight, water intake and body measurements

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    validate_amount, validate_notes, validate_optional_amount, DomainError, RecordId, UserId,
};

/// A weigh-in, always stored in kilograms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: RecordId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WeightEntry {
    pub fn new(
        user_id: UserId,
        date: NaiveDate,
        weight_kg: f64,
        note: Option<String>,
    ) -> Result<Self, DomainError> {
        let entry = Self {
            id: RecordId::generate(),
            user_id,
            date,
            weight_kg,
            note,
            created_at: Utc::now(),
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_amount(self.weight_kg, "Weight", 700.0)?;
        if self.weight_kg == 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Weight must be greater than 0".to_string(),
            });
        }
        validate_notes(&self.note, "Note")
    }
}

/// Water drunk in one sitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterEntry {
    pub id: RecordId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub amount_ml: f64,
    pub created_at: DateTime<Utc>,
}

impl WaterEntry {
    pub fn new(user_id: UserId, date: NaiveDate, amount_ml: f64) -> Result<Self, DomainError> {
        let entry = Self {
            id: RecordId::generate(),
            user_id,
            date,
            amount_ml,
            created_at: Utc::now(),
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_amount(self.amount_ml, "Water amount", 10_000.0)?;
        if self.amount_ml == 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Water amount must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Circumference measurements in centimetres plus body fat percentage
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurements {
    pub chest_cm: Option<f64>,
    pub waist_cm: Option<f64>,
    pub hips_cm: Option<f64>,
    pub arms_cm: Option<f64>,
    pub thighs_cm: Option<f64>,
    pub neck_cm: Option<f64>,
    pub body_fat_pct: Option<f64>,
}

impl Measurements {
    fn lengths(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("Chest", self.chest_cm),
            ("Waist", self.waist_cm),
            ("Hips", self.hips_cm),
            ("Arms", self.arms_cm),
            ("Thighs", self.thighs_cm),
            ("Neck", self.neck_cm),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.lengths().iter().all(|(_, v)| v.is_none()) && self.body_fat_pct.is_none()
    }
}

/// A set of body measurements taken on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementEntry {
    pub id: RecordId,
    pub user_id: UserId,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub measurements: Measurements,
    pub created_at: DateTime<Utc>,
}

impl MeasurementEntry {
    /// At least one measurement field must be present
    pub fn new(
        user_id: UserId,
        date: NaiveDate,
        measurements: Measurements,
    ) -> Result<Self, DomainError> {
        let entry = Self {
            id: RecordId::generate(),
            user_id,
            date,
            measurements,
            created_at: Utc::now(),
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.measurements.is_empty() {
            return Err(DomainError::Validation {
                message: "Please enter at least one measurement".to_string(),
            });
        }
        for (name, value) in self.measurements.lengths() {
            validate_optional_amount(value, name, 300.0)?;
        }
        validate_optional_amount(self.measurements.body_fat_pct, "Body fat", 100.0)
    }
}
