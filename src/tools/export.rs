/// Tools for export, backup and restore
///
/// data_export renders CSV, a text report or a full JSON backup, and can
/// save it into the configured export directory. data_restore reads a
/// backup back in under the session user.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;
use crate::domain::{DateRange, DateWindow};
use crate::export::{render_report, to_csv, Backup, ExportData, ExportError, ExportFormat, RestoreSummary};
use crate::session::Session;
use crate::storage::RecordStore;
use crate::tools::{parse_or, ToolError};

/// Parameters for exporting data
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExportParams {
    /// csv, report or json (full backup); default csv
    pub format: Option<String>,
    /// week, month, 3months, year or all (default all); ignored for json
    pub range: Option<String>,
    /// Also write the export to a file in the configured export directory
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub message: String,
    pub format: ExportFormat,
    /// Absent for full backups
    pub window: Option<DateWindow>,
    pub content: String,
    pub saved_to: Option<PathBuf>,
}

fn save_export(
    config: &ExportConfig,
    session: &Session,
    format: ExportFormat,
    content: &str,
) -> Result<PathBuf, ToolError> {
    let directory = config.directory.as_deref().ok_or_else(|| {
        ToolError::InvalidParams("export.directory is not set in the config file".to_string())
    })?;
    std::fs::create_dir_all(directory).map_err(ExportError::from)?;

    let path = directory.join(export_file_name(session, format));
    std::fs::write(&path, content).map_err(ExportError::from)?;
    tracing::info!("Saved {} export to {:?}", format, path);
    Ok(path)
}

fn export_file_name(session: &Session, format: ExportFormat) -> String {
    let stem = match format {
        ExportFormat::Json => "fitness-backup",
        ExportFormat::Csv => "fitness-export",
        ExportFormat::Report => "fitness-report",
    };
    format!("{}-{}.{}", stem, session.today(), format.extension())
}

pub fn export_data<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    config: &ExportConfig,
    params: ExportParams,
) -> Result<ExportResponse, ToolError> {
    let format = parse_or(params.format.as_deref(), ExportFormat::Csv)?;

    let (content, window, summary) = match format {
        ExportFormat::Json => {
            let backup = Backup::collect(storage, session.user())?;
            let content = backup.to_json()?;
            (content, None, format!("Backup created at {}", backup.timestamp.to_rfc3339()))
        }
        ExportFormat::Csv | ExportFormat::Report => {
            let range = parse_or(params.range.as_deref(), DateRange::All)?;
            let window = range.resolve(session.today());
            let data = ExportData::load(storage, session.user(), window)?;
            let content = if format == ExportFormat::Csv {
                to_csv(&data)?
            } else {
                let units = storage.load_settings(session.user())?.units;
                render_report(&data, window, units, config.report_row_limit)
            };
            let summary = format!(
                "{} calorie entries, {} workouts, {} weigh-ins, {} water entries from {} to {}",
                data.calories.len(),
                data.workouts.len(),
                data.weights.len(),
                data.water.len(),
                window.start,
                window.end
            );
            (content, Some(window), summary)
        }
    };

    let saved_to = if params.save {
        Some(save_export(config, session, format, &content)?)
    } else {
        None
    };

    let mut message = format!("📤 Exported {}: {}", format, summary);
    if let Some(path) = &saved_to {
        message.push_str(&format!("\nSaved to {}", path.display()));
    }

    Ok(ExportResponse {
        message,
        format,
        window,
        content,
        saved_to,
    })
}

/// Parameters for restoring a backup; give the JSON text or a file path
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RestoreParams {
    /// Backup JSON as produced by data_export with format json
    pub backup: Option<String>,
    /// Path to a backup file
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub message: String,
    pub restored: RestoreSummary,
}

fn read_backup(path: &Path) -> Result<String, ToolError> {
    Ok(std::fs::read_to_string(path).map_err(ExportError::from)?)
}

pub fn restore_data<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: RestoreParams,
) -> Result<RestoreResponse, ToolError> {
    let text = match (params.backup, params.path) {
        (Some(text), _) if !text.trim().is_empty() => text,
        (_, Some(path)) if !path.trim().is_empty() => read_backup(Path::new(path.trim()))?,
        _ => {
            return Err(ToolError::InvalidParams(
                "Provide either backup (JSON text) or path".to_string(),
            ))
        }
    };

    let backup = Backup::from_json(&text)?;
    let restored = backup.restore(storage, session.user())?;

    Ok(RestoreResponse {
        message: format!("📥 Restored {} records", restored.total()),
        restored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserId, WaterEntry};
    use crate::storage::SqliteStorage;
    use chrono::NaiveDate;

    fn setup() -> (SqliteStorage, Session) {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        (
            SqliteStorage::in_memory().unwrap(),
            Session::pinned(UserId::new("tester").unwrap(), today),
        )
    }

    fn export(format: &str, save: bool) -> ExportParams {
        ExportParams {
            format: Some(format.to_string()),
            range: None,
            save,
        }
    }

    #[test]
    fn test_csv_export_content() {
        let (storage, session) = setup();
        storage
            .insert_record(&WaterEntry::new(session.user().clone(), session.today(), 250.0).unwrap())
            .unwrap();

        let response = export_data(&storage, &session, &ExportConfig::default(), export("csv", false)).unwrap();
        assert!(response.content.contains("2024-06-10,250"));
        assert!(response.saved_to.is_none());
        assert!(response.message.contains("1 water entries"));
    }

    #[test]
    fn test_save_needs_directory() {
        let (storage, session) = setup();
        let result = export_data(&storage, &session, &ExportConfig::default(), export("report", true));
        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }

    #[test]
    fn test_save_writes_file() {
        let (storage, session) = setup();
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            directory: Some(dir.path().join("exports")),
            ..Default::default()
        };

        let response = export_data(&storage, &session, &config, export("json", true)).unwrap();
        let path = response.saved_to.unwrap();
        assert!(path.ends_with("fitness-backup-2024-06-10.json"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), response.content);
    }

    #[test]
    fn test_restore_requires_input_and_timestamp() {
        let (storage, session) = setup();
        let none = restore_data(&storage, &session, RestoreParams { backup: None, path: None });
        assert!(matches!(none, Err(ToolError::InvalidParams(_))));

        let no_timestamp = restore_data(
            &storage,
            &session,
            RestoreParams { backup: Some("{\"calories\": []}".to_string()), path: None },
        );
        assert!(matches!(
            no_timestamp,
            Err(ToolError::Export(ExportError::MissingTimestamp))
        ));
    }

    #[test]
    fn test_backup_restores_into_other_user() {
        let (storage, session) = setup();
        storage
            .insert_record(&WaterEntry::new(session.user().clone(), session.today(), 300.0).unwrap())
            .unwrap();
        let backup = export_data(&storage, &session, &ExportConfig::default(), export("json", false)).unwrap();

        let other = Session::pinned(UserId::new("other").unwrap(), session.today());
        let restored = restore_data(
            &storage,
            &other,
            RestoreParams { backup: Some(backup.content), path: None },
        )
        .unwrap();
        assert_eq!(restored.restored.water, 1);
    }
}
