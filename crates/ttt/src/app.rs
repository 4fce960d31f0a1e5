//! Main application logic and lifecycle management.
//!
//! This module contains the `Application` struct that orchestrates server
//! startup and shutdown.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{wait_for_shutdown_signal, wait_for_shutdown_signal_silent},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use ttt_server::GameServer;

/// How long the accept loop gets to wind down after shutdown is requested.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(8);

/// Main application struct.
///
/// Owns the merged configuration and the game server built from it.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Game server instance
    server: Arc<GameServer>,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// # Arguments
    ///
    /// * `args` - Parsed command-line arguments
    ///
    /// # Returns
    ///
    /// A configured `Application` instance ready to run, or an error if the
    /// configuration could not be loaded or failed validation.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Initialize game server with configuration
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        // Apply CLI overrides
        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        let server_config = config.to_server_config()?;
        let server = Arc::new(GameServer::new(server_config));

        Ok(Self { config, server })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs the server until a termination signal arrives.
    ///
    /// A second signal during shutdown exits the process immediately.
    ///
    /// # Returns
    ///
    /// `Ok(())` after a clean shutdown, or the server's error if it could
    /// not bind or stopped accepting on its own.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        display_banner();
        self.log_configuration_summary();

        let mut server_handle = {
            let server = self.server.clone();
            tokio::spawn(async move { server.start().await })
        };

        info!("🛑 Press Ctrl+C to gracefully shutdown");

        tokio::select! {
            result = &mut server_handle => {
                return match result {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => {
                        error!("❌ Server error: {}", e);
                        Err(e.into())
                    }
                    Err(e) => Err(format!("Server task failed: {e}").into()),
                };
            }
            signal = wait_for_shutdown_signal() => signal?,
        }

        // merciless shutdown
        tokio::spawn(async move {
            if let Err(e) = wait_for_shutdown_signal_silent().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }

            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        self.server.shutdown().await?;
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, server_handle).await {
            Ok(_) => info!("✅ Server task completed gracefully"),
            Err(_) => warn!("⏰ Server task did not stop within {:?}", SHUTDOWN_TIMEOUT),
        }

        self.log_final_statistics().await;
        info!("✅ Tic-tac-toe server shutdown complete");
        Ok(())
    }

    /// Logs the configuration summary at startup.
    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!(
            "  🎲 New rooms: rank {}, side length {}",
            self.config.game.rank, self.config.game.side_length
        );
        info!("  👥 Max connections: {}", self.config.server.max_connections);
        info!(
            "  📦 Max message size: {} bytes",
            self.config.server.max_message_size
        );
        if self.config.server.broadcast_rejected_intents {
            info!("  🔁 Rebroadcasting the board after rejected intents");
        }
    }

    async fn log_final_statistics(&self) {
        info!("📊 Final Statistics:");
        info!("  - Open rooms: {}", self.server.registry().room_count().await);
        info!(
            "  - Open connections: {}",
            self.server.connection_manager().connection_count().await
        );
    }
}
