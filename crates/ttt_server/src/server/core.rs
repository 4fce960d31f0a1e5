//! Core game server implementation.
//!
//! This module contains the main `GameServer` struct: it owns the room
//! registry and the connection manager, runs the accept loop and spawns one
//! handler task per connection.

use crate::{
    config::ServerConfig,
    connection::ConnectionManager,
    error::ServerError,
    rooms::RoomRegistry,
    server::handlers::handle_connection,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Semaphore};
use tracing::{debug, error, info, warn};

/// The core game server structure.
///
/// `GameServer` is the single authority for every room it hosts. Clients
/// only send intents; all board mutation happens here, one intent at a time
/// per room.
///
/// # Architecture
///
/// * **Room Registry**: room code → room with its board, seats and members
/// * **Connection Management**: IDs and metadata for every open connection
/// * **Accept Loop**: one task per connection, stopped through the shutdown channel
pub struct GameServer {
    /// Server configuration settings
    config: Arc<ServerConfig>,

    /// Manager for client connections
    connection_manager: Arc<ConnectionManager>,

    /// Live rooms
    registry: Arc<RoomRegistry>,

    /// One permit per allowed connection, held from accept until the
    /// handler returns
    connection_slots: Arc<Semaphore>,

    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,
}

impl GameServer {
    /// Creates a new game server with the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration parameters for server behavior
    ///
    /// # Returns
    ///
    /// A new `GameServer` instance ready to be started.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_sender, _) = broadcast::channel(1);
        let registry = Arc::new(RoomRegistry::new(config.game));
        let connection_slots = Arc::new(Semaphore::new(config.max_connections.min(Semaphore::MAX_PERMITS)));
        Self {
            config: Arc::new(config),
            connection_manager: Arc::new(ConnectionManager::new()),
            registry,
            connection_slots,
            shutdown_sender,
        }
    }

    /// Binds the configured address and serves until shutdown.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the server started and stopped cleanly, or a `ServerError`
    /// if the address could not be bound or accepting failed.
    pub async fn start(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| ServerError::Network(format!("Failed to bind {}: {e}", self.config.bind_address)))?;
        self.serve(listener).await
    }

    /// Runs the accept loop on an already bound listener until
    /// [`shutdown`](Self::shutdown) is called.
    ///
    /// Connections beyond `max_connections` are dropped before the WebSocket
    /// handshake. Fails with [`ServerError::Config`] before accepting
    /// anything if the configured game settings cannot build a board.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        self.config
            .game
            .new_board()
            .map_err(|e| ServerError::Config(format!("Invalid game settings: {e}")))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Network(format!("Failed to read local address: {e}")))?;
        info!("🚀 Game server listening on ws://{}/<room-code>", local_addr);
        info!(
            "🎲 New rooms use {} boards with side length {}",
            self.config.game.rank, self.config.game.side_length
        );

        let mut shutdown_receiver = self.shutdown_sender.subscribe();

        let accept_loop = async {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => self.dispatch(stream, addr),
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        break Err::<(), _>(ServerError::Network(format!("Accept failed: {e}")));
                    }
                }
            }
        };

        // Run until the accept loop fails or shutdown is requested
        let result = tokio::select! {
            result = accept_loop => result,
            _ = shutdown_receiver.recv() => {
                info!("Internal shutdown signal received");
                Ok(())
            }
        };

        info!("Server stopped");
        result
    }

    fn dispatch(&self, stream: tokio::net::TcpStream, addr: SocketAddr) {
        let Ok(slot) = self.connection_slots.clone().try_acquire_owned() else {
            warn!(
                "⛔ Connection limit {} reached, dropping connection from {}",
                self.config.max_connections, addr
            );
            return;
        };

        let connection_manager = self.connection_manager.clone();
        let registry = self.registry.clone();
        let config = self.config.clone();

        // Spawn individual connection handler
        tokio::spawn(async move {
            let _slot = slot;
            if let Err(e) = handle_connection(stream, addr, connection_manager, registry, config).await {
                debug!("Connection from {} ended with error: {}", addr, e);
            }
        });
    }

    /// Initiates server shutdown.
    ///
    /// Stops the accept loop. Open connections keep running until their
    /// clients close them.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the shutdown signal was sent successfully.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down server...");
        let _ = self.shutdown_sender.send(());
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Gets a reference to the room registry.
    pub fn registry(&self) -> Arc<RoomRegistry> {
        self.registry.clone()
    }

    /// Gets a reference to the connection manager.
    pub fn connection_manager(&self) -> Arc<ConnectionManager> {
        self.connection_manager.clone()
    }
}
