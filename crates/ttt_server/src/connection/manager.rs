//! Connection manager for tracking client connections.
//!
//! This module provides the central registry of open connections. Rooms
//! deliver messages through each connection's own outbox, so the manager only
//! hands out IDs and keeps per-connection metadata.

use super::{client::ClientConnection, ConnectionId};
use crate::rooms::RoomCode;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use ttt_core::Piece;

/// Central manager for all client connections.
///
/// # Architecture
///
/// * Uses `RwLock<HashMap>` for thread-safe connection storage
/// * Implements atomic connection ID generation
#[derive(Debug)]
pub struct ConnectionManager {
    /// Map of connection ID to client connection information
    connections: Arc<RwLock<HashMap<ConnectionId, ClientConnection>>>,

    /// Atomic counter for generating unique connection IDs
    next_id: Arc<AtomicUsize>,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }

    /// Adds a new connection and returns its unique ID.
    ///
    /// # Arguments
    ///
    /// * `remote_addr` - The network address of the connecting client
    ///
    /// # Returns
    ///
    /// A unique `ConnectionId` assigned to this connection.
    pub async fn add_connection(&self, remote_addr: SocketAddr) -> ConnectionId {
        let connection_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let connection = ClientConnection::new(remote_addr);
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, connection);
        info!("🔗 Connection {} from {}", connection_id, remote_addr);
        connection_id
    }

    /// Removes a connection from the manager and logs where it was seated.
    ///
    /// This should be called once the connection has left its room.
    ///
    /// # Arguments
    ///
    /// * `connection_id` - The ID of the connection to remove
    ///
    /// # Returns
    ///
    /// The removed connection's metadata, or `None` if it was not registered.
    pub async fn remove_connection(&self, connection_id: ConnectionId) -> Option<ClientConnection> {
        let connection = self.connections.write().await.remove(&connection_id)?;
        let seat = connection
            .side
            .map_or("spectator".to_string(), |piece| piece.to_string());
        info!(
            "❌ Connection {} from {} left room '{}' ({}) after {:?}",
            connection_id,
            connection.remote_addr,
            connection.room.as_deref().unwrap_or("-"),
            seat,
            connection.connected_at.elapsed().unwrap_or_default()
        );
        Some(connection)
    }

    /// Records the room and seat a connection was given on joining.
    ///
    /// # Arguments
    ///
    /// * `connection_id` - The connection to update
    /// * `room` - Code of the joined room
    /// * `side` - Assigned seat, `None` for spectators
    pub async fn set_membership(&self, connection_id: ConnectionId, room: RoomCode, side: Option<Piece>) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&connection_id) {
            connection.room = Some(room);
            connection.side = side;
        }
    }

    /// Number of open connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
