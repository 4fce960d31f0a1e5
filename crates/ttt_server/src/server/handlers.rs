//! Connection handling logic for WebSocket clients.
//!
//! This module contains the connection handling logic that manages the
//! lifecycle of individual client connections: handshake and room lookup,
//! seat assignment, frame processing and cleanup.

use crate::{
    config::ServerConfig,
    connection::ConnectionManager,
    error::ServerError,
    messaging::route_client_message,
    rooms::{RoomCode, RoomRegistry},
};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    accept_hdr_async,
    tungstenite::{
        handshake::server::{ErrorResponse, Request, Response},
        http::StatusCode,
        Message,
    },
};
use tracing::{debug, error, trace};

/// Extracts the room code from a request path: everything after the leading
/// slashes.
pub fn room_code_from_path(path: &str) -> RoomCode {
    path.trim_start_matches('/').to_string()
}

/// Handles a single client connection from establishment to cleanup.
///
/// # Connection Flow
///
/// 1. Perform the WebSocket handshake, reading the room code from the path
///    (an empty code fails the handshake with `404 Not Found`)
/// 2. Register the connection with the connection manager
/// 3. Join the room, which queues `first`/`board` and `side` on the outbox
/// 4. Start message handling tasks (incoming and outgoing)
/// 5. Leave the room (removing it if empty) and unregister the connection
///
/// # Arguments
///
/// * `stream` - The TCP stream for the client connection
/// * `addr` - The remote address of the client
/// * `connection_manager` - Manager for tracking connections
/// * `registry` - Registry of live rooms
/// * `config` - Server configuration
///
/// # Returns
///
/// `Ok(())` if the connection was handled successfully, or a `ServerError`
/// if the handshake or the join failed.
///
/// # Message Handling
///
/// * **Incoming Task**: Receives frames from the client and applies them to the room
/// * **Outgoing Task**: Drains the connection's outbox into the socket
///
/// These tasks run until the connection is closed or an error occurs.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    connection_manager: Arc<ConnectionManager>,
    registry: Arc<RoomRegistry>,
    config: Arc<ServerConfig>,
) -> Result<(), ServerError> {
    // Perform WebSocket handshake, capturing the room code on the way
    let mut room_code = RoomCode::new();
    let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        let code = room_code_from_path(request.uri().path());
        if code.is_empty() {
            let mut rejection = ErrorResponse::new(Some("Room code required".to_string()));
            *rejection.status_mut() = StatusCode::NOT_FOUND;
            return Err(rejection);
        }
        room_code = code;
        Ok(response)
    };
    let ws_stream = accept_hdr_async(stream, callback)
        .await
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed: {e}")))?;

    let connection_id = connection_manager.add_connection(addr).await;
    let (outbox, mut inbox) = mpsc::unbounded_channel::<Message>();

    let joined = match registry.join(&room_code, connection_id, outbox).await {
        Ok(joined) => joined,
        Err(e) => {
            connection_manager.remove_connection(connection_id).await;
            return Err(ServerError::Internal(format!("Failed to join room '{room_code}': {e}")));
        }
    };
    connection_manager
        .set_membership(connection_id, room_code.clone(), joined.side)
        .await;

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Incoming message task - applies intents to the room
    let incoming_task = {
        let room = joined.room.clone();
        let config = config.clone();

        async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if let Err(e) =
                            route_client_message(text.as_str(), connection_id, &room, &config).await
                        {
                            trace!("❌ Message routing error: {}", e);
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("🔌 Client {} requested close", connection_id);
                        break;
                    }
                    Err(e) => {
                        debug!("WebSocket error for connection {}: {}", connection_id, e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    };

    // Outgoing message task
    let outgoing_task = async move {
        while let Some(message) = inbox.recv().await {
            if let Err(e) = ws_sender.send(message).await {
                error!("Failed to send message to connection {}: {}", connection_id, e);
                break;
            }
        }
    };

    // Run both tasks concurrently until one completes
    tokio::select! {
        _ = incoming_task => {},
        _ = outgoing_task => {},
    }

    registry.leave(&room_code, connection_id).await;
    connection_manager.remove_connection(connection_id).await;
    Ok(())
}
