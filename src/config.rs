/// Configuration file support
///
/// Configuration is loaded from `$XDG_CONFIG_HOME/fitness-tracker/config.toml`
/// unless another path is given. Every section and field has a default, so a
/// missing file or a partial one is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::REPORT_ROW_LIMIT;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct DataConfig {
    /// Database file; a per-user default location is used when unset
    #[serde(default)]
    pub database: Option<PathBuf>,
}

/// Which user the server acts as
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_user")]
    pub user: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { user: default_user() }
    }
}

/// Food and exercise lookup service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LookupConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Export defaults
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Directory exports are saved into when saving is requested
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Rows per section in text reports
    #[serde(default = "default_row_limit")]
    pub report_row_limit: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            report_row_limit: default_row_limit(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct LoggingConfig {
    /// Filter level (`error`, `warn`, `info`, `debug`, `trace`)
    #[serde(default)]
    pub level: Option<String>,
}

// Default value functions
fn default_user() -> String {
    "local".to_string()
}

fn default_true() -> bool {
    true
}

fn default_api_key_env() -> String {
    "FITNESS_LOOKUP_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://api.api-ninjas.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_row_limit() -> usize {
    REPORT_ROW_LIMIT
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("fitness-tracker").join("config.toml")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.session.user.trim().is_empty() {
            return Err(ConfigError::Invalid("session.user cannot be empty".to_string()));
        }
        if self.export.report_row_limit == 0 {
            return Err(ConfigError::Invalid(
                "export.report_row_limit must be at least 1".to_string(),
            ));
        }
        if self.lookup.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "lookup.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
