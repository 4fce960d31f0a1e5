//! A single room: one authoritative board, two seats and every connection
//! watching it.
//!
//! A `Room` is always accessed through its `tokio::sync::Mutex`, so intents
//! for the same room apply one at a time in the order they acquired the
//! lock. Nothing in here awaits; outbound frames are pushed onto each
//! member's unbounded outbox and written to the socket by that connection's
//! own task.

use crate::connection::ConnectionId;
use std::fmt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tracing::{debug, error};
use ttt_core::{Board, ClientMessage, Piece, ServerMessage};

/// Room identifier taken from the request path.
pub type RoomCode = String;

/// Per-connection queue of frames waiting to be written to the socket.
pub type Outbox = mpsc::UnboundedSender<Message>;

struct Member {
    connection_id: ConnectionId,
    outbox: Outbox,
}

/// Result of applying a client intent to the room's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    /// The board changed and should be broadcast.
    Applied,
    /// The intent was dropped without touching the board.
    Rejected(Rejection),
}

impl IntentOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, IntentOutcome::Applied)
    }
}

/// Why an intent was dropped. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Spectator,
    NotYourTurn,
    OutOfRange,
    Occupied,
    NotAMember,
    InvalidShape,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::Spectator => "spectators cannot place pieces",
            Rejection::NotYourTurn => "not the sender's turn",
            Rejection::OutOfRange => "cell index out of range",
            Rejection::Occupied => "cell already occupied",
            Rejection::NotAMember => "sender is not in this room",
            Rejection::InvalidShape => "board shape rejected",
        };
        f.write_str(reason)
    }
}

/// One game room.
pub struct Room {
    code: RoomCode,
    board: Board,
    /// Connection holding each seat, indexed by piece value.
    seats: [Option<ConnectionId>; 2],
    /// All connections in join order.
    members: Vec<Member>,
}

impl Room {
    /// Creates an empty room around a fresh board.
    pub fn new(code: RoomCode, board: Board) -> Self {
        Self {
            code,
            board,
            seats: [None, None],
            members: Vec::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// The authoritative board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn connection_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Seat held by a connection; `None` for spectators and strangers.
    pub fn side_of(&self, connection_id: ConnectionId) -> Option<Piece> {
        [Piece::First, Piece::Second]
            .into_iter()
            .find(|&piece| self.seats[seat_index(piece)] == Some(connection_id))
    }

    /// Adds a connection to the room and sends its greeting.
    ///
    /// The connection takes the first free seat (`First`, then `Second`) or
    /// becomes a spectator. It is sent `["first"]` if the room was empty,
    /// otherwise the current board, followed by `["side", seat]`.
    ///
    /// # Returns
    ///
    /// The assigned seat, `None` for a spectator.
    pub fn join(&mut self, connection_id: ConnectionId, outbox: Outbox) -> Option<Piece> {
        let greeting = if self.members.is_empty() {
            ServerMessage::First
        } else {
            ServerMessage::Board(self.board.serialize())
        };

        let side = [Piece::First, Piece::Second]
            .into_iter()
            .find(|&piece| self.seats[seat_index(piece)].is_none());
        if let Some(piece) = side {
            self.seats[seat_index(piece)] = Some(connection_id);
        }

        send(&outbox, &greeting);
        send(&outbox, &ServerMessage::Side(side));
        self.members.push(Member {
            connection_id,
            outbox,
        });

        debug!(
            "🪑 Connection {} joined room '{}' as {}",
            connection_id,
            self.code,
            side.map_or("spectator".to_string(), |piece| piece.to_string())
        );
        side
    }

    /// Removes a connection and frees its seat.
    ///
    /// # Returns
    ///
    /// `true` if the connection was a member.
    pub fn leave(&mut self, connection_id: ConnectionId) -> bool {
        for seat in self.seats.iter_mut() {
            if *seat == Some(connection_id) {
                *seat = None;
            }
        }
        let before = self.members.len();
        self.members.retain(|member| member.connection_id != connection_id);
        before != self.members.len()
    }

    /// Applies a client intent to the board.
    ///
    /// `put_piece` is honoured only from the seat whose turn it is and only
    /// on an empty, in-range cell. `reset` is honoured from any member,
    /// spectators included. Win detection runs after every applied intent.
    pub fn apply_intent(&mut self, connection_id: ConnectionId, intent: ClientMessage) -> IntentOutcome {
        if !self.members.iter().any(|m| m.connection_id == connection_id) {
            return IntentOutcome::Rejected(Rejection::NotAMember);
        }

        match intent {
            ClientMessage::PutPiece(index) => {
                let Some(side) = self.side_of(connection_id) else {
                    return IntentOutcome::Rejected(Rejection::Spectator);
                };
                if side != self.board.current_piece() {
                    return IntentOutcome::Rejected(Rejection::NotYourTurn);
                }
                if self.board.select(index).is_err() {
                    return IntentOutcome::Rejected(Rejection::OutOfRange);
                }
                if !self.board.place_piece() {
                    return IntentOutcome::Rejected(Rejection::Occupied);
                }
            }
            ClientMessage::Reset(rank) => {
                if let Err(e) = self.board.reset(Some(rank), None) {
                    error!("Room '{}' could not reset its board: {}", self.code, e);
                    return IntentOutcome::Rejected(Rejection::InvalidShape);
                }
            }
        }

        let lines = self.board.check_winners().len();
        if lines > 0 {
            debug!("🏆 Room '{}' has {} winning line(s)", self.code, lines);
        }
        IntentOutcome::Applied
    }

    /// Sends the current board to every member.
    ///
    /// # Returns
    ///
    /// The number of members whose outbox accepted the frame.
    pub fn broadcast_board(&self) -> usize {
        let frame = match ServerMessage::Board(self.board.serialize()).to_frame() {
            Ok(frame) => Utf8Bytes::from(frame),
            Err(e) => {
                error!("Failed to encode board for room '{}': {}", self.code, e);
                return 0;
            }
        };

        let delivered = self
            .members
            .iter()
            .filter(|member| member.outbox.send(Message::Text(frame.clone())).is_ok())
            .count();
        debug!("📡 Broadcast board to {} connection(s) in room '{}'", delivered, self.code);
        delivered
    }
}

fn seat_index(piece: Piece) -> usize {
    u8::from(piece) as usize
}

fn send(outbox: &Outbox, message: &ServerMessage) {
    match message.to_frame() {
        Ok(frame) => {
            // A closed outbox means the connection is already shutting down
            let _ = outbox.send(Message::Text(frame.into()));
        }
        Err(e) => error!("Failed to encode '{}' message: {}", message.name(), e),
    }
}
