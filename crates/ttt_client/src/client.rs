//! The client-side board and its connection driver.
//!
//! A [`ClientBoard`] keeps a local [`Board`] that is either an optimistic
//! copy of a room's authoritative board (while connected) or a standalone
//! offline game. While connected, mutating calls are turned into intents and
//! the local board only changes when the server's snapshot arrives.
//!
//! A background driver task owns the socket. Whenever the transport closes it
//! waits a fixed delay and connects again, until [`ClientBoard::disconnect`]
//! is called or the board is dropped.

use crate::config::ClientConfig;
use crate::error::ClientError;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};
use ttt_core::{
    Board, BoardError, BoardState, ClientMessage, Coord, Piece, Rank, ServerMessage, WinningLine,
};

/// What a renderer needs to draw the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    /// Shared board state
    pub state: BoardState,
    /// Locally selected cell
    pub cursor: usize,
    /// Lines found by the last detection pass
    pub winning_lines: Vec<WinningLine>,
    /// Seat assigned by the server; `None` offline or as a spectator
    pub side: Option<Piece>,
    /// Whether a server connection is currently open
    pub connected: bool,
}

impl ClientSnapshot {
    /// Rebuilds a full [`Board`] from the snapshot, cursor and winning lines
    /// included.
    pub fn to_board(&self) -> Result<Board, BoardError> {
        let mut board = Board::default();
        board.deserialize(&self.state)?;
        board.select(self.cursor)?;
        board.check_winners();
        Ok(board)
    }

    /// Whether this client may place a piece right now.
    pub fn is_my_turn(&self) -> bool {
        !self.connected || self.side == Some(self.state.cur_piece)
    }
}

struct Shared {
    board: Board,
    side: Option<Piece>,
    connected: bool,
    outgoing: Option<mpsc::UnboundedSender<Message>>,
}

impl Shared {
    fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            state: self.board.serialize(),
            cursor: self.board.cursor(),
            winning_lines: self.board.winning_lines().to_vec(),
            side: self.side,
            connected: self.connected,
        }
    }

    /// Queues an intent on the open connection.
    fn send(&self, intent: ClientMessage) -> Result<(), ClientError> {
        let outgoing = self
            .outgoing
            .as_ref()
            .ok_or_else(|| ClientError::Send("not connected".to_string()))?;
        let frame = intent
            .to_frame()
            .map_err(|e| ClientError::Send(e.to_string()))?;
        outgoing
            .send(Message::Text(frame.into()))
            .map_err(|_| ClientError::Send("connection closed".to_string()))?;
        debug!("📤 Sent {:?}", intent);
        Ok(())
    }
}

struct Inner {
    shared: Mutex<Shared>,
    snapshots: watch::Sender<ClientSnapshot>,
}

impl Inner {
    fn publish(&self, shared: &Shared) {
        self.snapshots.send_replace(shared.snapshot());
    }
}

struct Driver {
    url: String,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// A board that mirrors a server room, or plays locally when offline.
pub struct ClientBoard {
    inner: Arc<Inner>,
    config: ClientConfig,
    driver: Option<Driver>,
}

impl ClientBoard {
    /// Creates an offline board.
    ///
    /// # Errors
    ///
    /// Fails if `config` describes an impossible board.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let board = Board::new(config.rank, config.side_length)?;
        let shared = Shared {
            board,
            side: None,
            connected: false,
            outgoing: None,
        };
        let (snapshots, _) = watch::channel(shared.snapshot());
        Ok(Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(shared),
                snapshots,
            }),
            config,
            driver: None,
        })
    }

    /// Starts the driver task for `<url>/<room>`.
    ///
    /// Returns immediately; the connection is made in the background and
    /// retried every `reconnect_delay` until [`disconnect`](Self::disconnect).
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidUrl`] for a non-WebSocket URL,
    /// [`ClientError::AlreadyConnected`] if a driver is running, and
    /// [`ClientError::Connection`] when called outside a Tokio runtime.
    pub fn connect(&mut self, url: &str, room: &str) -> Result<(), ClientError> {
        if let Some(driver) = &self.driver {
            return Err(ClientError::AlreadyConnected(driver.url.clone()));
        }
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ClientError::InvalidUrl(url.to_string()));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ClientError::Connection(format!("no async runtime to drive the connection: {e}")))?;

        let full_url = format!("{}/{}", url.trim_end_matches('/'), room);
        let (stop, stop_receiver) = oneshot::channel();
        let handle = runtime.spawn(drive(
            full_url.clone(),
            self.inner.clone(),
            self.config.reconnect_delay,
            stop_receiver,
        ));
        info!("🔌 Connecting to {}", full_url);
        self.driver = Some(Driver {
            url: full_url,
            stop,
            handle,
        });
        Ok(())
    }

    /// Stops the driver and closes the connection. Further calls do nothing.
    ///
    /// Once this returns no reconnect attempt will be made and the board is
    /// offline.
    pub async fn disconnect(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };
        let _ = driver.stop.send(());
        if let Err(e) = driver.handle.await {
            warn!("Client driver ended abnormally: {}", e);
        }
        let mut shared = self.inner.shared.lock().await;
        shared.connected = false;
        shared.outgoing = None;
        shared.side = None;
        self.inner.publish(&shared);
        info!("👋 Disconnected from {}", driver.url);
    }

    /// Places a piece under the cursor.
    ///
    /// Connected: sends `["put_piece", cursor]` and waits for the server's
    /// snapshot. Offline: places locally and runs win detection.
    pub async fn put_piece(&self) -> Result<(), ClientError> {
        let mut shared = self.inner.shared.lock().await;
        if shared.connected {
            let cursor = shared.board.cursor();
            return shared.send(ClientMessage::PutPiece(cursor));
        }
        if shared.board.place_piece() {
            shared.board.check_winners();
            self.inner.publish(&shared);
        }
        Ok(())
    }

    /// Clears the board, switching to `rank` if given.
    ///
    /// Connected: sends `["reset", rank]`, defaulting to the current rank.
    /// Offline: resets locally.
    pub async fn reset(&self, rank: Option<Rank>) -> Result<(), ClientError> {
        let mut shared = self.inner.shared.lock().await;
        if shared.connected {
            let rank = rank.unwrap_or(shared.board.rank());
            return shared.send(ClientMessage::Reset(rank));
        }
        shared.board.reset(rank, None)?;
        self.inner.publish(&shared);
        Ok(())
    }

    /// Moves the cursor. Always local.
    pub async fn move_cursor(&self, direction: Coord) {
        let mut shared = self.inner.shared.lock().await;
        shared.board.move_cursor(direction);
        self.inner.publish(&shared);
    }

    /// Puts the cursor on `index`. Always local.
    pub async fn select(&self, index: usize) -> Result<(), ClientError> {
        let mut shared = self.inner.shared.lock().await;
        shared.board.select(index)?;
        self.inner.publish(&shared);
        Ok(())
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> ClientSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Receiver that sees a new snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<ClientSnapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.snapshots.borrow().connected
    }
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum SessionEnd {
    Closed,
    Stopped,
}

/// Connection loop: connect, run a session, wait, repeat.
async fn drive(
    url: String,
    inner: Arc<Inner>,
    reconnect_delay: Duration,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        let attempt = tokio::select! {
            attempt = connect_async(url.as_str()) => attempt,
            _ = &mut stop => return,
        };

        match attempt {
            Ok((socket, _)) => {
                info!("✅ Connected to {}", url);
                if let SessionEnd::Stopped = run_session(socket, &inner, &mut stop).await {
                    return;
                }
                info!("🔌 Connection to {} closed", url);
            }
            Err(e) => warn!("Failed to connect to {}: {}", url, e),
        }

        debug!("⏳ Reconnecting in {:?}", reconnect_delay);
        tokio::select! {
            _ = sleep(reconnect_delay) => {}
            _ = &mut stop => return,
        }
    }
}

async fn run_session(socket: Socket, inner: &Inner, stop: &mut oneshot::Receiver<()>) -> SessionEnd {
    let (mut sink, mut stream) = socket.split();
    let (outgoing, mut queued) = mpsc::unbounded_channel();
    {
        let mut shared = inner.shared.lock().await;
        shared.connected = true;
        shared.outgoing = Some(outgoing);
        inner.publish(&shared);
    }

    let end = loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => apply_server_frame(inner, text.as_str()).await,
                Some(Ok(Message::Close(_))) | None => break SessionEnd::Closed,
                Some(Err(e)) => {
                    debug!("WebSocket error: {}", e);
                    break SessionEnd::Closed;
                }
                Some(Ok(_)) => {}
            },
            Some(message) = queued.recv() => {
                if let Err(e) = sink.send(message).await {
                    debug!("Failed to send frame: {}", e);
                    break SessionEnd::Closed;
                }
            }
            _ = &mut *stop => {
                let _ = sink.send(Message::Close(None)).await;
                break SessionEnd::Stopped;
            }
        }
    };

    let mut shared = inner.shared.lock().await;
    shared.connected = false;
    shared.outgoing = None;
    inner.publish(&shared);
    end
}

/// Applies one server frame to the local board.
///
/// A frame that does not decode, or a snapshot that does not validate, is
/// discarded and the local board is left as it was.
async fn apply_server_frame(inner: &Inner, text: &str) {
    let message = match ServerMessage::from_frame(text) {
        Ok(message) => message,
        Err(e) => {
            warn!("Discarding server frame: {}", e);
            return;
        }
    };
    trace!("📥 Received '{}'", message.name());

    let mut shared = inner.shared.lock().await;
    match message {
        ServerMessage::First => {
            // First in the room: start fresh and impose our rank on it
            if let Err(e) = shared.board.reset(None, None) {
                warn!("Could not clear local board: {}", e);
                return;
            }
            let rank = shared.board.rank();
            if let Err(e) = shared.send(ClientMessage::Reset(rank)) {
                debug!("Could not claim room rank: {}", e);
            }
        }
        ServerMessage::Side(side) => {
            shared.side = side;
            info!(
                "🪑 Seated as {}",
                side.map_or("spectator".to_string(), |piece| piece.to_string())
            );
        }
        ServerMessage::Board(state) => {
            if let Err(e) = shared.board.deserialize(&state) {
                warn!("Discarding invalid board snapshot: {}", e);
                return;
            }
        }
    }
    shared.board.check_winners();
    inner.publish(&shared);
}
