/// Public library interface for the Fitness Tracker MCP server
///
/// This module exports the main server implementation and the public types
/// used by the binary and by tests.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

pub mod domain;
pub mod storage;
pub mod analytics;
pub mod export;
pub mod config;
pub mod lookup;
pub mod reminders;
pub mod session;
pub mod tools;
pub mod mcp;

pub use config::{Config, ConfigError};
pub use domain::{DomainError, UserId};
pub use lookup::{HttpLookup, NutritionLookup};
pub use session::Session;
pub use storage::{DocumentStore, RecordStore, SqliteStorage, StorageError};
pub use tools::{ToolError, ToolOutput};

use reminders::{FiredReminder, ReminderScheduler};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main fitness tracker server
///
/// Owns the database, the signed-in session, the lookup client and the
/// reminder timers. One instance serves one MCP client for the life of the
/// process.
pub struct FitnessTrackerServer {
    storage: SqliteStorage,
    session: Session,
    config: Config,
    lookup: Arc<dyn NutritionLookup>,
    reminders: ReminderScheduler,
    reminder_rx: Option<UnboundedReceiver<FiredReminder>>,
}

impl FitnessTrackerServer {
    /// Create a server with the database at `db_path`, acting as `user`
    ///
    /// This will initialize the SQLite schema if it doesn't already exist.
    pub async fn new(db_path: PathBuf, config: Config, user: UserId) -> Result<Self, ServerError> {
        tracing::info!("Initializing Fitness Tracker server with database: {:?}", db_path);

        let storage = SqliteStorage::new(&db_path)?;
        let lookup: Arc<dyn NutritionLookup> = Arc::new(HttpLookup::from_config(&config.lookup));
        let server = Self::with_storage(storage, config, Session::new(user));

        Ok(server.with_lookup(lookup))
    }

    /// Build around an already opened store; lookup starts disabled
    pub fn with_storage(storage: SqliteStorage, config: Config, session: Session) -> Self {
        let (reminders, reminder_rx) = ReminderScheduler::new();
        Self {
            storage,
            session,
            config,
            lookup: Arc::new(HttpLookup::disabled()),
            reminders,
            reminder_rx: Some(reminder_rx),
        }
    }

    /// Replace the food and exercise lookup
    pub fn with_lookup(mut self, lookup: Arc<dyn NutritionLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lookup(&self) -> &dyn NutritionLookup {
        self.lookup.as_ref()
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    /// Split borrows for the reminder tools
    pub(crate) fn reminder_parts(&mut self) -> (&SqliteStorage, &Session, &mut ReminderScheduler) {
        (&self.storage, &self.session, &mut self.reminders)
    }

    /// Run one tool by name
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        tools::dispatch(self, name, arguments).await
    }

    /// Schedule the saved reminders and hand out the fired-reminder channel
    ///
    /// Must be called from within the tokio runtime. The channel is handed
    /// out once; later calls only reschedule.
    pub fn start_reminders(&mut self) -> Result<Option<UnboundedReceiver<FiredReminder>>, ServerError> {
        let settings = self.storage.load_settings(self.session.user())?;
        self.reminders.sync(&settings.reminders);
        Ok(self.reminder_rx.take())
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin closes or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server for user {}", self.session.user());

        let settings = self.storage.load_settings(self.session.user())?;
        tracing::info!(
            "Server started, onboarding complete: {}, {} reminders saved",
            settings.onboarding_complete,
            settings.reminders.len()
        );

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }
}
