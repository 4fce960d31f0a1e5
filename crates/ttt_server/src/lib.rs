//! # ttt_server - Authoritative Room Server
//!
//! A WebSocket server hosting any number of N-dimensional tic-tac-toe rooms.
//! Every room keeps the one authoritative board; clients send intents and
//! receive full board snapshots back.
//!
//! ## Message Flow
//!
//! 1. A client connects to `ws://<bind>/<room-code>`; an empty code is
//!    refused during the handshake with `404 Not Found`
//! 2. The room is created on first join with the configured rank and side length
//! 3. The joiner takes the first free seat (`0`, then `1`) or spectates, and
//!    receives `["first"]` or the current `["board", state]`, then `["side", seat]`
//! 4. `["put_piece", index]` from the seat whose turn it is, and
//!    `["reset", dimension]` from anyone, change the board
//! 5. Every change is broadcast as `["board", state]` to all room members
//! 6. When the last connection leaves, the room is removed
//!
//! ## Concurrency
//!
//! * The registry is an `RwLock<HashMap>`; join and removal take the write lock
//! * Each room sits behind its own `tokio::sync::Mutex`, so intents for one
//!   room apply strictly one at a time while rooms progress independently
//! * Each connection drains an unbounded outbox, so broadcasting never waits
//!   on a slow socket while the room is locked

pub use config::{GameSettings, ServerConfig};
pub use error::ServerError;
pub use rooms::{RoomCode, RoomRegistry};
pub use server::GameServer;
pub use utils::{create_server, create_server_with_config};

pub mod config;
pub mod error;
pub mod rooms;
pub mod server;
pub mod utils;

pub mod connection;
mod messaging;
mod tests;
