/// Core types and enums used throughout the domain layer
///
/// This module defines identifiers, the small enums that records carry
/// (meal type, units, activity level, ...) and the date-range helpers that
/// the statistics code resolves against "today".

use std::fmt;
use std::str::FromStr;

use chrono::{Local, Months, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a stored record
///
/// Most records get a random UUID when they are created. Habit entries use a
/// deterministic composite id (`habitId_date`) so that one habit has at most
/// one entry per day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new random record ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Build the composite id used for habit entries
    pub fn composite(habit_id: &RecordId, date: NaiveDate) -> Self {
        Self(format!("{}_{}", habit_id.0, date.format("%Y-%m-%d")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the user that owns a record
///
/// Every collection is scoped by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID, rejecting blank values
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation {
                message: "User ID cannot be empty".to_string(),
            });
        }
        if trimmed.len() > 128 {
            return Err(DomainError::Validation {
                message: "User ID cannot be longer than 128 characters".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a snake_case label into one of the serde-backed enums below
fn parse_label<T: DeserializeOwned>(value: &str, kind: &'static str) -> Result<T, DomainError> {
    let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
    serde_json::from_value(serde_json::Value::String(normalized)).map_err(|_| {
        DomainError::UnknownVariant {
            kind,
            value: value.to_string(),
        }
    })
}

/// Render one of the serde-backed enums as its snake_case label
fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

/// Which meal a calorie entry or planned meal belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// Measurement system preferred by a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

const KG_PER_LB: f64 = 0.453_592_37;
const CM_PER_INCH: f64 = 2.54;

impl Units {
    /// Convert a weight entered in this unit system to kilograms
    pub fn weight_to_kg(self, value: f64) -> f64 {
        match self {
            Units::Metric => value,
            Units::Imperial => value * KG_PER_LB,
        }
    }

    /// Convert a stored kilogram value to this unit system
    pub fn weight_from_kg(self, kg: f64) -> f64 {
        match self {
            Units::Metric => kg,
            Units::Imperial => kg / KG_PER_LB,
        }
    }

    /// Convert a length entered in this unit system to centimetres
    pub fn length_to_cm(self, value: f64) -> f64 {
        match self {
            Units::Metric => value,
            Units::Imperial => value * CM_PER_INCH,
        }
    }

    pub fn weight_label(self) -> &'static str {
        match self {
            Units::Metric => "kg",
            Units::Imperial => "lb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Activity level used to scale BMR into TDEE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

/// What the user is trying to do with their body weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyGoal {
    FatLoss,
    WeightLoss,
    MuscleGain,
    BodyRecomposition,
    Maintain,
}

/// Broad grouping for workouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutCategory {
    Strength,
    Cardio,
    Flexibility,
    Sports,
    #[default]
    Other,
}

/// What a goal measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Calories,
    Workouts,
    Water,
    Weight,
    HabitCompletions,
}

/// Period over which a goal is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl GoalPeriod {
    /// The window for this period that ends on `today`
    pub fn window(self, today: NaiveDate) -> DateWindow {
        let start = match self {
            GoalPeriod::Daily => today,
            GoalPeriod::Weekly => today - chrono::Duration::days(6),
            GoalPeriod::Monthly => today.checked_sub_months(Months::new(1)).unwrap_or(today),
        };
        DateWindow { start, end: today }
    }
}

/// Kind of reminder a user can schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Water,
    Workout,
    Meal,
    WeighIn,
    Habit,
}

/// Coarse direction of a series of daily values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Named date range used by the statistics views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "week")]
    Week,
    #[default]
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "all")]
    All,
}

impl DateRange {
    /// Resolve the named range into a concrete inclusive window ending today
    pub fn resolve(self, today: NaiveDate) -> DateWindow {
        let start = match self {
            DateRange::Week => Some(today - chrono::Duration::days(6)),
            DateRange::Month => today.checked_sub_months(Months::new(1)),
            DateRange::ThreeMonths => today.checked_sub_months(Months::new(3)),
            DateRange::Year => today.checked_sub_months(Months::new(12)),
            DateRange::All => NaiveDate::from_ymd_opt(1970, 1, 1),
        };
        DateWindow {
            start: start.unwrap_or(today),
            end: today,
        }
    }
}

/// Inclusive calendar-day window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidDate(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days in the window, both ends included
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

macro_rules! labeled_enum {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = DomainError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    parse_label(s, $kind)
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&label(self))
                }
            }
        )*
    };
}

labeled_enum! {
    MealType => "meal type",
    Units => "units",
    Gender => "gender",
    ActivityLevel => "activity level",
    BodyGoal => "body goal",
    WorkoutCategory => "workout category",
    GoalType => "goal type",
    GoalPeriod => "goal period",
    ReminderKind => "reminder kind",
    Trend => "trend",
    DateRange => "date range",
}

/// Today's calendar day in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `yyyy-MM-dd` calendar day
pub fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(format!("'{}' is not a valid YYYY-MM-DD date", s)))
}

/// Parse an optional date, defaulting to `today`
pub fn parse_date_or(s: Option<&str>, today: NaiveDate) -> Result<NaiveDate, DomainError> {
    match s {
        Some(value) if !value.trim().is_empty() => parse_date(value),
        _ => Ok(today),
    }
}
