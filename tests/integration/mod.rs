/// End-to-end tests through the tool dispatcher

mod server_workflow;
mod export_restore;

use chrono::NaiveDate;
use serde_json::Value;
use tempfile::TempDir;

use fitness_tracker_mcp::{Config, FitnessTrackerServer, Session, SqliteStorage, ToolOutput, UserId};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
}

/// A server on a fresh database file, pinned to `today()`
pub fn server_in(dir: &TempDir, user: &str) -> FitnessTrackerServer {
    let storage = SqliteStorage::new(dir.path().join("fitness.db")).expect("Failed to open database");
    FitnessTrackerServer::with_storage(
        storage,
        Config::default(),
        Session::pinned(UserId::new(user).unwrap(), today()),
    )
}

pub async fn call(server: &mut FitnessTrackerServer, name: &str, args: Value) -> ToolOutput {
    server
        .call_tool(name, args)
        .await
        .unwrap_or_else(|e| panic!("{} failed: {}", name, e))
}
