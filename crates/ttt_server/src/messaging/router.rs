//! Message routing logic for applying client frames to a room.

use crate::{
    config::ServerConfig,
    connection::ConnectionId,
    error::ServerError,
    rooms::{IntentOutcome, Room},
};
use tokio::sync::Mutex;
use tracing::{debug, trace};
use ttt_core::ClientMessage;

/// Routes a raw client frame to the connection's room.
///
/// The frame is decoded into an intent and applied under the room lock. If
/// the intent changed the board, the new board is broadcast to every member
/// of the room, sender included. Rejected intents change nothing and are
/// answered with nothing unless `broadcast_rejected_intents` is set.
///
/// # Arguments
///
/// * `text` - The raw frame text from the client (expected to be a JSON array)
/// * `connection_id` - The connection that sent the frame
/// * `room` - The room the connection joined
/// * `config` - Server configuration (size limit and rebroadcast flag)
///
/// # Returns
///
/// `Ok(())` if the frame was a well-formed intent, whether or not it was
/// applied, or a `ServerError` if it was oversized or failed to decode.
///
/// # Example Frames
///
/// ```json
/// ["put_piece", 40]
/// ["reset", 3]
/// ```
pub async fn route_client_message(
    text: &str,
    connection_id: ConnectionId,
    room: &Mutex<Room>,
    config: &ServerConfig,
) -> Result<(), ServerError> {
    if text.len() > config.max_message_size {
        return Err(ServerError::Network(format!(
            "Frame of {} bytes exceeds limit of {}",
            text.len(),
            config.max_message_size
        )));
    }

    let intent = ClientMessage::from_frame(text)?;
    let mut room = room.lock().await;
    debug!("📨 Connection {} in room '{}' sent {:?}", connection_id, room.code(), intent);

    match room.apply_intent(connection_id, intent) {
        IntentOutcome::Applied => {
            room.broadcast_board();
        }
        IntentOutcome::Rejected(reason) => {
            trace!("🚫 Dropped {} from connection {}: {}", intent.name(), connection_id, reason);
            if config.broadcast_rejected_intents {
                room.broadcast_board();
            }
        }
    }
    Ok(())
}
