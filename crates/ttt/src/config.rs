//! Configuration management for the tic-tac-toe server.
//!
//! This module handles loading, validation, and conversion of server
//! configuration from TOML files and command-line arguments.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use ttt_core::{Rank, DEFAULT_SIDE_LENGTH, MAX_SIDE_LENGTH};
use ttt_server::{config::DEFAULT_PORT, GameSettings, ServerConfig};

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration settings
    pub server: ServerSettings,
    /// Board shape for new rooms
    #[serde(default)]
    pub game: BoardSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// Server-specific configuration settings.
///
/// Controls network binding, connection limits and intent handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Network address to bind the server to (e.g., "127.0.0.1:8869")
    pub bind_address: String,
    /// Maximum number of concurrent client connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Longest accepted text frame, in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Re-send the board after rejected intents
    #[serde(default)]
    pub broadcast_rejected_intents: bool,
}

/// Default for max_connections
fn default_max_connections() -> usize {
    1000
}

/// Default for max_message_size
fn default_max_message_size() -> usize {
    64 * 1024
}

/// Shape of the board a room starts with.
///
/// The rank is kept as a plain integer here so that a bad value is reported
/// by [`AppConfig::validate`] rather than as a TOML parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSettings {
    /// Number of active axes (2, 3 or 4)
    pub rank: i64,
    /// Cells per axis
    pub side_length: usize,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            rank: Rank::FOUR.get() as i64,
            side_length: DEFAULT_SIDE_LENGTH,
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                bind_address: format!("127.0.0.1:{DEFAULT_PORT}"),
                max_connections: default_max_connections(),
                max_message_size: default_max_message_size(),
                broadcast_rejected_intents: false,
            },
            game: BoardSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Reads the configuration at `path`, writing out the defaults first if
    /// the file does not exist.
    pub async fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config file
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    pub fn to_server_config(&self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        Ok(ServerConfig {
            bind_address: self.server.bind_address.parse()?,
            max_connections: self.server.max_connections,
            max_message_size: self.server.max_message_size,
            broadcast_rejected_intents: self.server.broadcast_rejected_intents,
            game: GameSettings {
                rank: Rank::new(self.game.rank)?,
                side_length: self.game.side_length,
            },
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "Invalid bind address: {}",
                &self.server.bind_address
            ));
        }

        if self.server.max_connections == 0 {
            return Err("server.max_connections must be greater than 0".to_string());
        }
        if self.server.max_message_size == 0 {
            return Err("server.max_message_size must be greater than 0".to_string());
        }

        if let Err(e) = Rank::new(self.game.rank) {
            return Err(format!("Invalid game.rank: {e}"));
        }
        if !(2..=MAX_SIDE_LENGTH).contains(&self.game.side_length) {
            return Err(format!(
                "Invalid game.side_length: {}. Must be between 2 and {MAX_SIDE_LENGTH}",
                self.game.side_length
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};
    use tokio::fs;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.server.bind_address, "127.0.0.1:8869");
        assert_eq!(config.server.max_connections, 1000);
        assert_eq!(config.server.max_message_size, 65536);
        assert!(!config.server.broadcast_rejected_intents);

        assert_eq!(config.game.rank, 4);
        assert_eq!(config.game.side_length, 3);

        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config, AppConfig::default());

        // The defaults were written out and read back unchanged
        assert!(path.exists());
        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded, config);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[server]
bind_address = "0.0.0.0:3000"
max_connections = 20
broadcast_rejected_intents = true

[game]
rank = 2
side_length = 4

[logging]
level = "debug"
json_format = true
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:3000");
        assert_eq!(config.server.max_connections, 20);
        assert_eq!(config.server.max_message_size, 65536);
        assert!(config.server.broadcast_rejected_intents);
        assert_eq!(config.game.rank, 2);
        assert_eq!(config.game.side_length, 4);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[server\nbind_address = 3").await.unwrap();
        assert!(AppConfig::load_from_file(temp_file.path()).await.is_err());
    }

    #[test]
    fn test_to_server_config_conversion() {
        let mut app_config = AppConfig::default();
        app_config.server.bind_address = "192.168.1.100:8080".to_string();
        app_config.server.max_connections = 3000;
        app_config.server.broadcast_rejected_intents = true;
        app_config.game.rank = 3;

        let server_config = app_config.to_server_config().unwrap();

        assert_eq!(server_config.bind_address.to_string(), "192.168.1.100:8080");
        assert_eq!(server_config.max_connections, 3000);
        assert_eq!(server_config.max_message_size, 65536);
        assert!(server_config.broadcast_rejected_intents);
        assert_eq!(server_config.game.rank, Rank::THREE);
        assert_eq!(server_config.game.side_length, 3);
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_bind_address() {
        let mut config = AppConfig::default();
        config.server.bind_address = "invalid_address".to_string();

        let result = config.validate();
        assert!(result.unwrap_err().contains("Invalid bind address"));
    }

    #[test]
    fn test_validation_invalid_board() {
        let mut config = AppConfig::default();
        config.game.rank = 5;
        assert!(config.validate().unwrap_err().contains("game.rank"));
        assert!(config.to_server_config().is_err());

        config.game.rank = 2;
        config.game.side_length = 1;
        assert!(config.validate().unwrap_err().contains("game.side_length"));

        config.game.side_length = MAX_SIDE_LENGTH + 1;
        assert!(config.validate().unwrap_err().contains("game.side_length"));
    }

    #[test]
    fn test_validation_limits() {
        let mut config = AppConfig::default();
        config.server.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.server.max_message_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "invalid_level".to_string();

        let result = config.validate();
        assert!(result.unwrap_err().contains("Invalid log level"));
    }
}
