//! Logging system setup and configuration.
//!
//! This module handles the initialization of the tracing-based logging system
//! with support for both human-readable and JSON output formats.

use crate::config::LoggingSettings;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system with the specified configuration.
///
/// # Arguments
///
/// * `config` - Logging configuration from the config file
/// * `json_format` - Whether to force JSON output format (CLI override)
///
/// # Returns
///
/// `Ok(())` if logging was set up successfully, or an error if a global
/// subscriber was already installed.
///
/// `RUST_LOG` takes precedence over the configured level when it is set.
pub fn setup_logging(
    config: &LoggingSettings,
    json_format: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = config.level.as_str();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if json_format || config.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(true),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(true),
            )
            .try_init()?;
    }

    info!("🔧 Logging initialized with level: {}", log_level);
    Ok(())
}

/// Displays the startup banner.
pub fn display_banner() {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║        ❌⭕ TIC-TAC-TOE SERVER ⭕❌        ║");
    info!("║                 v{:<8}                ║", version);
    info!("║                                          ║");
    info!("║  🎲 2D, 3D and 4D boards                 ║");
    info!("║  🏠 Rooms by URL path                    ║");
    info!("║  🌐 WebSocket sync                       ║");
    info!("╚══════════════════════════════════════════╝");
}
