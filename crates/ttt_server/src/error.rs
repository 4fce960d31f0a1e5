//! Error types and handling for the game server.
//!
//! None of these are ever sent to a client. Connection handlers log them and
//! close the connection; the accept loop logs them and keeps going.

use ttt_core::ProtocolError;

/// Enumeration of possible server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding, handshake and socket failures
    #[error("Network error: {0}")]
    Network(String),

    /// Broken invariants inside the server, such as a room that cannot be built
    #[error("Internal error: {0}")]
    Internal(String),

    /// Server configuration that cannot produce a board
    #[error("Configuration error: {0}")]
    Config(String),

    /// A client frame that does not decode into an intent
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
