//! Error types for the client board.

use ttt_core::BoardError;

/// Errors returned by [`ClientBoard`](crate::ClientBoard) operations.
///
/// Transport failures are never reported through here; the driver logs them
/// and reconnects.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server URL is not a `ws://` or `wss://` URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// A driver task is already running for this board
    #[error("Already connected to {0}")]
    AlreadyConnected(String),

    /// The connection went away while an intent was being queued
    #[error("Send failed: {0}")]
    Send(String),

    /// The connection driver could not be started
    #[error("Connection error: {0}")]
    Connection(String),

    /// A local board operation was invalid
    #[error(transparent)]
    Board(#[from] BoardError),
}
