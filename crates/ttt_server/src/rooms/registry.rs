//! Registry mapping room codes to live rooms.
//!
//! Rooms are created on first join and removed as soon as their last
//! connection leaves; there is no idle eviction. Joining and removal both
//! hold the registry's write lock while they touch the room, so a room can
//! never disappear between being found and having the joiner seated.

use super::room::{Outbox, Room, RoomCode};
use crate::config::GameSettings;
use crate::connection::ConnectionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use ttt_core::{BoardError, Piece};

/// Outcome of [`RoomRegistry::join`].
pub struct Joined {
    /// Handle used by the connection for all further intents.
    pub room: Arc<Mutex<Room>>,
    /// Assigned seat, `None` for a spectator.
    pub side: Option<Piece>,
    /// Whether this join created the room.
    pub created: bool,
}

/// All rooms currently alive on this server.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomCode, Arc<Mutex<Room>>>>,
    settings: GameSettings,
}

impl RoomRegistry {
    /// Creates an empty registry whose new rooms use `settings`.
    pub fn new(settings: GameSettings) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            settings,
        }
    }

    /// Returns the room for `code`, creating it with a fresh board if needed.
    ///
    /// # Errors
    ///
    /// Fails only if the configured game settings cannot produce a board.
    pub async fn get_or_create(&self, code: &str) -> Result<Arc<Mutex<Room>>, BoardError> {
        let mut rooms = self.rooms.write().await;
        Ok(self.get_or_create_locked(&mut rooms, code)?.0)
    }

    fn get_or_create_locked(
        &self,
        rooms: &mut HashMap<RoomCode, Arc<Mutex<Room>>>,
        code: &str,
    ) -> Result<(Arc<Mutex<Room>>, bool), BoardError> {
        if let Some(room) = rooms.get(code) {
            return Ok((room.clone(), false));
        }
        let board = self.settings.new_board()?;
        let room = Arc::new(Mutex::new(Room::new(code.to_string(), board)));
        rooms.insert(code.to_string(), room.clone());
        info!(
            "🏠 Room '{}' created ({} board, side {})",
            code, self.settings.rank, self.settings.side_length
        );
        Ok((room, true))
    }

    /// Puts a connection into the room for `code`, creating the room if it
    /// does not exist, and queues its greeting on `outbox`.
    pub async fn join(
        &self,
        code: &str,
        connection_id: ConnectionId,
        outbox: Outbox,
    ) -> Result<Joined, BoardError> {
        let mut rooms = self.rooms.write().await;
        let (room, created) = self.get_or_create_locked(&mut rooms, code)?;
        let side = room.lock().await.join(connection_id, outbox);
        Ok(Joined {
            room,
            side,
            created,
        })
    }

    /// Removes a connection from its room and drops the room if that left it
    /// empty.
    ///
    /// # Returns
    ///
    /// `true` if the room was removed.
    pub async fn leave(&self, code: &str, connection_id: ConnectionId) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get(code).cloned() else {
            return false;
        };
        let mut room = room.lock().await;
        room.leave(connection_id);
        if room.is_empty() {
            rooms.remove(code);
            info!("🧹 Room '{}' removed", code);
            true
        } else {
            false
        }
    }

    /// Deletes the room for `code` if it has no connections left.
    ///
    /// # Returns
    ///
    /// `true` if a room was removed.
    pub async fn remove_if_empty(&self, code: &str) -> bool {
        let mut rooms = self.rooms.write().await;
        let empty = match rooms.get(code) {
            Some(room) => room.lock().await.is_empty(),
            None => return false,
        };
        if empty {
            rooms.remove(code);
            info!("🧹 Room '{}' removed", code);
        }
        empty
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn contains(&self, code: &str) -> bool {
        self.rooms.read().await.contains_key(code)
    }

    /// Number of connections in the room for `code`, if it exists.
    pub async fn connection_count(&self, code: &str) -> Option<usize> {
        let room = self.rooms.read().await.get(code).cloned()?;
        let count = room.lock().await.connection_count();
        Some(count)
    }
}
