//! Utility functions and helper methods for the game server.
//!
//! This module provides convenient factory functions for creating server
//! instances with different configurations.

use crate::{config::ServerConfig, server::GameServer};

/// Creates a new game server with default configuration.
///
/// # Returns
///
/// A new `GameServer` instance listening on `127.0.0.1:8869` once started,
/// hosting 4D boards with side length 3.
///
/// # Example
///
/// ```rust
/// # #[tokio::main]
/// # async fn main() {
/// use ttt_server::create_server;
///
/// let server = create_server();
/// assert_eq!(server.config().max_connections, 1000);
/// # }
/// ```
pub fn create_server() -> GameServer {
    GameServer::new(ServerConfig::default())
}

/// Creates a new game server with custom configuration.
///
/// # Arguments
///
/// * `config` - A `ServerConfig` instance with desired settings
///
/// # Example
///
/// ```rust
/// # #[tokio::main]
/// # async fn main() {
/// use ttt_server::{create_server_with_config, GameSettings, ServerConfig};
/// use ttt_core::Rank;
///
/// let config = ServerConfig {
///     bind_address: "0.0.0.0:9000".parse().unwrap(),
///     game: GameSettings { rank: Rank::TWO, side_length: 3 },
///     ..Default::default()
/// };
///
/// let server = create_server_with_config(config);
/// # }
/// ```
pub fn create_server_with_config(config: ServerConfig) -> GameServer {
    GameServer::new(config)
}
