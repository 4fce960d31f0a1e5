//! Wire protocol shared by the server and the client.
//!
//! Every frame is a UTF-8 text frame holding a JSON array whose first element
//! names the message and whose remaining elements are its arguments:
//!
//! | direction       | frame                      |
//! |-----------------|----------------------------|
//! | client → server | `["reset", dimension]`     |
//! | client → server | `["put_piece", index]`     |
//! | server → client | `["first"]`                |
//! | server → client | `["side", 0 \| 1 \| null]` |
//! | server → client | `["board", state]`         |
//!
//! Unknown names, wrong arity and wrong argument types are decode errors.

use crate::board::{Piece, Rank};
use crate::error::ProtocolError;
use crate::snapshot::BoardState;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::Value;

/// Intents sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// Clear the room's board, switching to the given rank.
    Reset(Rank),
    /// Place the current piece on the given cell.
    PutPiece(usize),
}

/// Messages pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// The receiver is the first connection in a fresh room.
    First,
    /// The receiver's seat; `None` means spectator.
    Side(Option<Piece>),
    /// Authoritative board snapshot.
    Board(BoardState),
}

impl ClientMessage {
    pub fn name(&self) -> &'static str {
        match self {
            ClientMessage::Reset(_) => "reset",
            ClientMessage::PutPiece(_) => "put_piece",
        }
    }

    /// Encodes the message as a text frame.
    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a text frame received from a client.
    pub fn from_frame(text: &str) -> Result<Self, ProtocolError> {
        let (name, args) = split_frame(text)?;
        match name.as_str() {
            "reset" => {
                let value = single_argument("reset", args)?;
                let dimension = value.as_i64().ok_or_else(|| ProtocolError::BadArguments {
                    message: "reset",
                    reason: format!("dimension must be an integer, got {value}"),
                })?;
                let rank = Rank::new(dimension).map_err(|e| ProtocolError::BadArguments {
                    message: "reset",
                    reason: e.to_string(),
                })?;
                Ok(ClientMessage::Reset(rank))
            }
            "put_piece" => {
                let value = single_argument("put_piece", args)?;
                let index = value.as_u64().ok_or_else(|| ProtocolError::BadArguments {
                    message: "put_piece",
                    reason: format!("index must be a non-negative integer, got {value}"),
                })?;
                Ok(ClientMessage::PutPiece(index as usize))
            }
            _ => Err(ProtocolError::UnknownMessage(name)),
        }
    }
}

impl ServerMessage {
    pub fn name(&self) -> &'static str {
        match self {
            ServerMessage::First => "first",
            ServerMessage::Side(_) => "side",
            ServerMessage::Board(_) => "board",
        }
    }

    /// Encodes the message as a text frame.
    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a text frame received from the server.
    pub fn from_frame(text: &str) -> Result<Self, ProtocolError> {
        let (name, args) = split_frame(text)?;
        match name.as_str() {
            "first" => {
                if !args.is_empty() {
                    return Err(ProtocolError::BadArguments {
                        message: "first",
                        reason: format!("expected no arguments, got {}", args.len()),
                    });
                }
                Ok(ServerMessage::First)
            }
            "side" => {
                let value = single_argument("side", args)?;
                let side = serde_json::from_value(value).map_err(|e| ProtocolError::BadArguments {
                    message: "side",
                    reason: e.to_string(),
                })?;
                Ok(ServerMessage::Side(side))
            }
            "board" => {
                let value = single_argument("board", args)?;
                let state = serde_json::from_value(value).map_err(|e| ProtocolError::BadArguments {
                    message: "board",
                    reason: e.to_string(),
                })?;
                Ok(ServerMessage::Board(state))
            }
            _ => Err(ProtocolError::UnknownMessage(name)),
        }
    }
}

impl Serialize for ClientMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(self.name())?;
        match self {
            ClientMessage::Reset(rank) => seq.serialize_element(&rank.get())?,
            ClientMessage::PutPiece(index) => seq.serialize_element(index)?,
        }
        seq.end()
    }
}

impl Serialize for ServerMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ServerMessage::First => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(self.name())?;
                seq.end()
            }
            ServerMessage::Side(side) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(self.name())?;
                seq.serialize_element(side)?;
                seq.end()
            }
            ServerMessage::Board(state) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(self.name())?;
                seq.serialize_element(state)?;
                seq.end()
            }
        }
    }
}

/// Splits a frame into its message name and argument list.
fn split_frame(text: &str) -> Result<(String, Vec<Value>), ProtocolError> {
    let Value::Array(mut items) = serde_json::from_str::<Value>(text)? else {
        return Err(ProtocolError::NotAnArray);
    };
    if items.is_empty() {
        return Err(ProtocolError::Empty);
    }
    match items.remove(0) {
        Value::String(name) => Ok((name, items)),
        other => Err(ProtocolError::UnknownMessage(other.to_string())),
    }
}

fn single_argument(message: &'static str, mut args: Vec<Value>) -> Result<Value, ProtocolError> {
    if args.len() != 1 {
        return Err(ProtocolError::BadArguments {
            message,
            reason: format!("expected 1 argument, got {}", args.len()),
        });
    }
    Ok(args.remove(0))
}
