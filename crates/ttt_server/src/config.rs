//! Server configuration types and defaults.
//!
//! This module contains the server configuration structure and default values
//! used to initialize and customize the game server behavior.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use ttt_core::{Board, BoardError, Rank, DEFAULT_SIDE_LENGTH};

/// Default port the server listens on.
pub const DEFAULT_PORT: u16 = 8869;

/// Configuration structure for the game server.
///
/// Contains all necessary parameters to configure server behavior including
/// network settings, connection limits and the shape of newly created boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections allowed
    pub max_connections: usize,

    /// Text frames longer than this many bytes are dropped unread
    pub max_message_size: usize,

    /// Re-send the room's board after intents that were rejected
    pub broadcast_rejected_intents: bool,

    /// Shape of boards in newly created rooms
    pub game: GameSettings,
}

/// Rank and side length given to a room's board when the room is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub rank: Rank,
    pub side_length: usize,
}

impl GameSettings {
    /// Builds an empty board with these settings.
    pub fn new_board(&self) -> Result<Board, BoardError> {
        Board::new(self.rank, self.side_length)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            max_connections: 1000,
            max_message_size: 64 * 1024, // 64KB
            broadcast_rejected_intents: false,
            game: GameSettings::default(),
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            rank: Rank::FOUR,
            side_length: DEFAULT_SIDE_LENGTH,
        }
    }
}
