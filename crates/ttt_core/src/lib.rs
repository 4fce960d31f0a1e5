//! # ttt_core - Board Rules and Wire Protocol
//!
//! The pure, synchronous half of N-dimensional tic-tac-toe. Nothing in this
//! crate performs I/O; the server and the client both depend on it so that
//! they agree on rules and on the shape of every frame.
//!
//! ## Contents
//!
//! * [`geometry`] - flat index ⇄ 4-component coordinate addressing
//! * [`board`] - pieces, ranks, the [`Board`] itself and its cursor
//! * [`win`] - detection of completed lines along any diagonal
//! * [`snapshot`] - [`BoardState`], the board's wire form
//! * [`protocol`] - [`ClientMessage`] / [`ServerMessage`] text frames
//!
//! ## Example
//!
//! ```rust
//! use ttt_core::{Board, Piece, Rank};
//!
//! let mut board = Board::new(Rank::TWO, 3).unwrap();
//! for index in [0, 3, 1, 4, 2] {
//!     board.select(index).unwrap();
//!     board.place_piece();
//! }
//! assert_eq!(board.check_winners().len(), 1);
//! assert_eq!(board.winner(), Some(Piece::First));
//! ```

pub use board::{Board, GameStatus, Piece, Rank, DEFAULT_SIDE_LENGTH, MAX_SIDE_LENGTH};
pub use error::{BoardError, ProtocolError};
pub use geometry::{Coord, Geometry, AXES};
pub use protocol::{ClientMessage, ServerMessage};
pub use snapshot::BoardState;
pub use win::{find_winning_lines, WinningLine};

pub mod board;
pub mod error;
pub mod geometry;
pub mod protocol;
pub mod snapshot;
pub mod win;
