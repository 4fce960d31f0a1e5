//! # ttt-server - Tic-Tac-Toe Room Server
//!
//! Application shell around [`ttt_server::GameServer`]: command-line parsing,
//! configuration loading, logging setup and lifecycle management.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration
//! ttt-server
//!
//! # Specify custom configuration
//! ttt-server --config production.toml
//!
//! # Override specific settings
//! ttt-server --bind 0.0.0.0:8869 --log-level debug --json-logs
//! ```
//!
//! ## Configuration
//!
//! The server loads configuration from a TOML file (default: `config.toml`).
//! If the file doesn't exist, a default configuration will be created.
//!
//! ## Signal Handling
//!
//! The server shuts down on SIGINT (Ctrl+C) and SIGTERM (Unix systems). A
//! second signal exits immediately.

use tracing::error;

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod signals;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

pub use config::{BoardSettings, LoggingSettings, ServerSettings};

/// Entry point for the `ttt-server` binary.
///
/// Parses the command line, sets up logging from the configuration file,
/// then builds and runs the [`Application`].
///
/// # Exit Codes
///
/// * **0**: Successful execution and shutdown
/// * **1**: Error during startup, configuration, or runtime
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let mut logging = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default()
        .logging;
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
