//! Rooms and the registry that owns them.
//!
//! A room is addressed by the path of the WebSocket request
//! (`ws://host/<code>`). Every connection to the same code shares one
//! authoritative board.

pub mod registry;
pub mod room;

pub use registry::{Joined, RoomRegistry};
pub use room::{IntentOutcome, Outbox, Rejection, Room, RoomCode};
