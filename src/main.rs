/// Main entry point for the Fitness Tracker MCP server
///
/// This file loads the config, sets up logging, parses command line arguments
/// and starts the MCP server. The server listens for JSON-RPC requests over
/// stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fitness_tracker_mcp::{Config, FitnessTrackerServer, UserId};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let potential_paths = [
        // 1. User's home directory (preferred)
        dirs::home_dir().map(|p| p.join(".fitness_tracker")),
        // 2. User's data directory (platform-specific)
        dirs::data_dir().map(|p| p.join("fitness_tracker")),
        // 3. Current working directory (last resort)
        std::env::current_dir().ok().map(|p| p.join(".fitness_tracker")),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("fitness.db"));
            }
        }
    }

    let temp_path = std::env::temp_dir().join("fitness_tracker");
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path.join("fitness.db"))
}

/// Command line arguments for the Fitness Tracker MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses the config file or a default in the home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// User whose records this server reads and writes
    #[arg(long)]
    user: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

fn log_filter(args: &Args, config: &Config) -> EnvFilter {
    let level = if args.verbose {
        Some("debug")
    } else if args.debug {
        Some("info")
    } else {
        None
    };

    if let Some(level) = level {
        return EnvFilter::new(format!("fitness_tracker_mcp={}", level));
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = config.logging.level.as_deref().unwrap_or("warn");
    EnvFilter::new(format!("fitness_tracker_mcp={}", level))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&args, &config))
        .with_writer(std::io::stderr) // stdout carries JSON-RPC only
        .init();

    info!("Starting Fitness Tracker MCP server");

    let db_path = match args.database.clone().or_else(|| config.data.database.clone()) {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let user = UserId::new(args.user.clone().unwrap_or_else(|| config.session.user.clone()))?;

    let server = FitnessTrackerServer::new(db_path, config, user).await?;
    server.run().await?;

    info!("Fitness Tracker MCP server shutdown complete");
    Ok(())
}
