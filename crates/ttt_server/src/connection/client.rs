//! Client connection representation.

use crate::rooms::RoomCode;
use std::net::SocketAddr;
use std::time::SystemTime;
use ttt_core::Piece;

/// Represents an individual client connection to the server.
///
/// A connection is registered once its handshake succeeds and gets its room
/// and seat as soon as it has joined.
#[derive(Debug, Clone)]
pub struct ClientConnection {
    /// The remote network address of the client
    pub remote_addr: SocketAddr,

    /// When this connection was established
    pub connected_at: SystemTime,

    /// Room this connection belongs to (None until joined)
    pub room: Option<RoomCode>,

    /// Seat held in that room; `None` for spectators
    pub side: Option<Piece>,
}

impl ClientConnection {
    /// Creates a new, not yet joined, connection record.
    ///
    /// # Arguments
    ///
    /// * `remote_addr` - The network address of the connecting client
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            remote_addr,
            connected_at: SystemTime::now(),
            room: None,
            side: None,
        }
    }
}
