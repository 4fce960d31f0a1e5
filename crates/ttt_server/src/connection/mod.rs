//! Connection management for client connections.
//!
//! This module tracks every open WebSocket connection, which room it joined
//! and which seat it holds.

pub mod client;
pub mod manager;

pub use client::ClientConnection;
pub use manager::ConnectionManager;

/// Type alias for connection identifiers.
///
/// Connection IDs are used to uniquely identify client connections
/// throughout their lifecycle on the server. They are never reused.
pub type ConnectionId = usize;
