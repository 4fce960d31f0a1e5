//! # ttt_client - Reconnecting Client Board
//!
//! Keeps a local copy of a room's board in sync with a `ttt_server`
//! instance and falls back to local play while offline.
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), ttt_client::ClientError> {
//! use ttt_client::{ClientBoard, ClientConfig};
//! use ttt_core::Rank;
//!
//! let mut board = ClientBoard::new(ClientConfig { rank: Rank::TWO, ..Default::default() })?;
//! board.connect("ws://127.0.0.1:8869", "lobby")?;
//!
//! let mut updates = board.subscribe();
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow().clone();
//!     if snapshot.connected && snapshot.is_my_turn() {
//!         board.put_piece().await?;
//!         break;
//!     }
//! }
//! board.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub use client::{ClientBoard, ClientSnapshot};
pub use config::{ClientConfig, DEFAULT_RECONNECT_DELAY};
pub use error::ClientError;

pub mod client;
pub mod config;
pub mod error;
