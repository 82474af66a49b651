/// Domain module containing core business logic and data types
///
/// This module defines the records a user logs (calories, workouts, habits,
/// body metrics, goals, meal plans, settings), their validation rules, and
/// the pure calculators that do not need storage: streaks and calorie targets.

pub mod types;
pub mod nutrition;
pub mod workout;
pub mod habit;
pub mod body;
pub mod goal;
pub mod achievement;
pub mod settings;
pub mod streak;
pub mod targets;

// Re-export public types for easy access
pub use types::*;
pub use nutrition::*;
pub use workout::*;
pub use habit::*;
pub use body::*;
pub use goal::*;
pub use achievement::*;
pub use settings::*;
pub use streak::*;
pub use targets::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Missing profile field: {0}")]
    MissingProfileField(&'static str),
}

/// Shared name check used by every record that carries a display name
pub(crate) fn validate_name(name: &str, what: &str, max_len: usize) -> Result<(), DomainError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(DomainError::InvalidName(format!("{} cannot be empty", what)));
    }

    if trimmed.chars().count() > max_len {
        return Err(DomainError::InvalidName(format!(
            "{} cannot be longer than {} characters",
            what, max_len
        )));
    }

    Ok(())
}

/// Shared check for optional free-text fields (notes, descriptions)
pub(crate) fn validate_notes(notes: &Option<String>, what: &str) -> Result<(), DomainError> {
    if let Some(text) = notes {
        if text.chars().count() > 500 {
            return Err(DomainError::Validation {
                message: format!("{} cannot be longer than 500 characters", what),
            });
        }
    }
    Ok(())
}

/// Shared check for non-negative, finite quantities
pub(crate) fn validate_amount(value: f64, what: &str, max: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::InvalidValue {
            message: format!("{} must be a non-negative number", what),
        });
    }
    if value > max {
        return Err(DomainError::InvalidValue {
            message: format!("{} cannot exceed {}", what, max),
        });
    }
    Ok(())
}

pub(crate) fn validate_optional_amount(
    value: Option<f64>,
    what: &str,
    max: f64,
) -> Result<(), DomainError> {
    match value {
        Some(v) => validate_amount(v, what, max),
        None => Ok(()),
    }
}
