/// Export, backup and restore
///
/// Three output shapes share one loaded data set:
/// - `csv_export`: sectioned CSV (calories, workouts, weight, water)
/// - `report`: plain-text tables for reading in a terminal or chat
/// - `backup`: full JSON dump of a user's records, and restore from it

pub mod csv_export;
pub mod backup;
pub mod report;

pub use csv_export::*;
pub use backup::*;
pub use report::*;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{CalorieEntry, DateWindow, DomainError, UserId, WaterEntry, WeightEntry, Workout};
use crate::storage::{RecordStore, StorageError};

/// Errors that can occur while exporting or restoring
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid backup file: missing timestamp")]
    MissingTimestamp,

    #[error("Invalid backup file: {0}")]
    InvalidBackup(String),
}

/// Output format accepted by the export tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Report,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Report => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" | "backup" => Ok(ExportFormat::Json),
            "report" | "text" | "txt" | "pdf" => Ok(ExportFormat::Report),
            _ => Err(DomainError::UnknownVariant {
                kind: "export format",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Report => "report",
        })
    }
}

/// Records in a window, oldest first, as the CSV and report sections use them
#[derive(Debug, Clone, Default)]
pub struct ExportData {
    pub calories: Vec<CalorieEntry>,
    pub workouts: Vec<Workout>,
    pub weights: Vec<WeightEntry>,
    pub water: Vec<WaterEntry>,
}

impl ExportData {
    /// One range query per collection
    pub fn load<S: RecordStore + ?Sized>(
        storage: &S,
        user: &UserId,
        window: DateWindow,
    ) -> Result<Self, StorageError> {
        let mut data = Self {
            calories: storage.list_in_window(user, window)?,
            workouts: storage.list_in_window(user, window)?,
            weights: storage.list_in_window(user, window)?,
            water: storage.list_in_window(user, window)?,
        };

        data.calories.sort_by_key(|e| (e.date, e.created_at));
        data.workouts.sort_by_key(|e| (e.date, e.created_at));
        data.weights.sort_by_key(|e| (e.date, e.created_at));
        data.water.sort_by_key(|e| (e.date, e.created_at));

        tracing::debug!(
            "Loaded export data for {}: {} calories, {} workouts, {} weights, {} water",
            user,
            data.calories.len(),
            data.workouts.len(),
            data.weights.len(),
            data.water.len()
        );
        Ok(data)
    }

    pub fn is_empty(&self) -> bool {
        self.calories.is_empty()
            && self.workouts.is_empty()
            && self.weights.is_empty()
            && self.water.is_empty()
    }
}

/// Format an optional number for tabular output
pub(crate) fn optional_number(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

/// Whole numbers without a decimal point, everything else to one place
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("backup".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Report);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(250.0), "250");
        assert_eq!(format_number(72.46), "72.5");
        assert_eq!(optional_number(None), "");
    }
}
