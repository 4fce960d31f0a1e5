//! Client configuration.

use std::time::Duration;
use ttt_core::{Rank, DEFAULT_SIDE_LENGTH};

/// Default delay between a lost connection and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Settings for a [`ClientBoard`](crate::ClientBoard).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Rank of the local board, and of the room when this client joins first
    pub rank: Rank,

    /// Side length of the local board
    pub side_length: usize,

    /// Fixed wait before every reconnect attempt
    pub reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rank: Rank::FOUR,
            side_length: DEFAULT_SIDE_LENGTH,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}
