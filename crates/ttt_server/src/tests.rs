
// Include tests
#[cfg(test)]
mod tests {
    use crate::*;
    use futures::{SinkExt, StreamExt};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::{sleep, timeout};
    use tokio_tungstenite::tungstenite::{self, http::StatusCode, Message};
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
    use tracing::debug;
    use ttt_core::{Board, ClientMessage, Piece, Rank, ServerMessage};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    const WAIT: Duration = Duration::from_secs(5);
    const QUIET: Duration = Duration::from_millis(250);

    fn two_d() -> ServerConfig {
        ServerConfig {
            game: GameSettings {
                rank: Rank::TWO,
                side_length: 3,
            },
            ..Default::default()
        }
    }

    async fn spawn_server(config: ServerConfig) -> (Arc<GameServer>, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(create_server_with_config(config));
        let serving = server.clone();
        tokio::spawn(async move {
            if let Err(e) = serving.serve(listener).await {
                debug!("test server stopped: {}", e);
            }
        });
        (server, addr)
    }

    async fn connect(addr: SocketAddr, room: &str) -> Client {
        let (ws, _) = connect_async(format!("ws://{addr}/{room}"))
            .await
            .expect("Failed to connect");
        ws
    }

    async fn recv(client: &mut Client) -> ServerMessage {
        loop {
            let frame = timeout(WAIT, client.next())
                .await
                .expect("Timed out waiting for a frame")
                .expect("Connection closed")
                .expect("WebSocket error");
            if let Message::Text(text) = frame {
                return ServerMessage::from_frame(text.as_str()).expect("Bad server frame");
            }
        }
    }

    async fn recv_board(client: &mut Client) -> Board {
        match recv(client).await {
            ServerMessage::Board(state) => {
                let mut board = Board::default();
                board.deserialize(&state).expect("Invalid snapshot");
                board
            }
            other => panic!("Expected a board, got {other:?}"),
        }
    }

    async fn send(client: &mut Client, message: ClientMessage) {
        client
            .send(Message::Text(message.to_frame().unwrap().into()))
            .await
            .expect("Failed to send");
    }

    async fn send_raw(client: &mut Client, text: &str) {
        client
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("Failed to send");
    }

    async fn assert_quiet(client: &mut Client) {
        assert!(
            timeout(QUIET, client.next()).await.is_err(),
            "Expected no frame"
        );
    }

    /// Joins a room and consumes the greeting, returning the assigned seat.
    async fn join(addr: SocketAddr, room: &str) -> (Client, Option<Piece>) {
        let mut client = connect(addr, room).await;
        let _greeting = recv(&mut client).await;
        match recv(&mut client).await {
            ServerMessage::Side(side) => (client, side),
            other => panic!("Expected a side, got {other:?}"),
        }
    }

    async fn wait_for_connections(server: &GameServer, room: &str, expected: Option<usize>) {
        let registry = server.registry();
        timeout(WAIT, async {
            while registry.connection_count(room).await != expected {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Room never reached the expected size");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_join_greetings_and_seats() {
        let (server, addr) = spawn_server(two_d()).await;

        let mut first = connect(addr, "lobby").await;
        assert_eq!(recv(&mut first).await, ServerMessage::First);
        assert_eq!(recv(&mut first).await, ServerMessage::Side(Some(Piece::First)));

        let mut second = connect(addr, "lobby").await;
        let board = recv_board(&mut second).await;
        assert_eq!(board.rank(), Rank::TWO);
        assert!(board.cells().iter().all(Option::is_none));
        assert_eq!(recv(&mut second).await, ServerMessage::Side(Some(Piece::Second)));

        let mut third = connect(addr, "lobby").await;
        recv_board(&mut third).await;
        assert_eq!(recv(&mut third).await, ServerMessage::Side(None));

        assert_eq!(server.registry().connection_count("lobby").await, Some(3));
        server.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_placement_broadcast_to_players_and_spectators() {
        let (_server, addr) = spawn_server(two_d()).await;
        let (mut x, _) = join(addr, "game").await;
        let (mut o, _) = join(addr, "game").await;
        let (mut watcher, side) = join(addr, "game").await;
        assert_eq!(side, None);

        send(&mut x, ClientMessage::PutPiece(4)).await;
        for client in [&mut x, &mut o, &mut watcher] {
            let board = recv_board(client).await;
            assert_eq!(board.cell(4), Some(Piece::First));
            assert_eq!(board.current_piece(), Piece::Second);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rejected_intents_are_silent() {
        let (server, addr) = spawn_server(two_d()).await;
        let (mut x, _) = join(addr, "quiet").await;
        let (mut o, _) = join(addr, "quiet").await;
        let (mut watcher, _) = join(addr, "quiet").await;

        // Out of turn, spectator placement, out of range, garbage
        send(&mut o, ClientMessage::PutPiece(0)).await;
        send(&mut watcher, ClientMessage::PutPiece(0)).await;
        send(&mut x, ClientMessage::PutPiece(81)).await;
        send_raw(&mut x, "not json").await;
        send_raw(&mut x, r#"["reset", 9]"#).await;
        send_raw(&mut x, r#"["teleport", 1]"#).await;

        for client in [&mut x, &mut o, &mut watcher] {
            assert_quiet(client).await;
        }

        let room = server.registry().get_or_create("quiet").await.unwrap();
        assert!(room.lock().await.board().cells().iter().all(Option::is_none));

        // The connection survives malformed frames
        send(&mut x, ClientMessage::PutPiece(0)).await;
        assert_eq!(recv_board(&mut o).await.cell(0), Some(Piece::First));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_occupied_cell_rejected() {
        let (_server, addr) = spawn_server(two_d()).await;
        let (mut x, _) = join(addr, "taken").await;
        let (mut o, _) = join(addr, "taken").await;

        send(&mut x, ClientMessage::PutPiece(4)).await;
        recv_board(&mut x).await;
        recv_board(&mut o).await;

        send(&mut o, ClientMessage::PutPiece(4)).await;
        assert_quiet(&mut o).await;
        assert_quiet(&mut x).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rejected_intents_rebroadcast_when_configured() {
        let config = ServerConfig {
            broadcast_rejected_intents: true,
            ..two_d()
        };
        let (_server, addr) = spawn_server(config).await;
        let (mut x, _) = join(addr, "loud").await;
        let (mut o, _) = join(addr, "loud").await;

        send(&mut o, ClientMessage::PutPiece(0)).await;
        for client in [&mut x, &mut o] {
            let board = recv_board(client).await;
            assert_eq!(board.cell(0), None);
            assert_eq!(board.current_piece(), Piece::First);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reset_from_spectator_changes_rank() {
        let (_server, addr) = spawn_server(two_d()).await;
        let (mut x, _) = join(addr, "reset").await;
        let (mut o, _) = join(addr, "reset").await;
        let (mut spectator, _) = join(addr, "reset").await;

        send(&mut x, ClientMessage::PutPiece(0)).await;
        recv_board(&mut x).await;
        recv_board(&mut o).await;
        recv_board(&mut spectator).await;

        send(&mut spectator, ClientMessage::Reset(Rank::FOUR)).await;
        let board = recv_board(&mut x).await;
        assert_eq!(board.rank(), Rank::FOUR);
        assert_eq!(board.cell_count(), 81);
        assert!(board.cells().iter().all(Option::is_none));
        assert_eq!(board.current_piece(), Piece::First);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_win_is_visible_in_snapshot() {
        let (_server, addr) = spawn_server(two_d()).await;
        let (mut x, _) = join(addr, "win").await;
        let (mut o, _) = join(addr, "win").await;

        let moves = [(0, true), (3, false), (1, true), (4, false), (2, true)];
        let mut last = Board::default();
        for (index, by_x) in moves {
            let mover = if by_x { &mut x } else { &mut o };
            send(mover, ClientMessage::PutPiece(index)).await;
            recv_board(&mut x).await;
            last = recv_board(&mut o).await;
        }

        let lines = last.check_winners();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].cells, vec![0, 1, 2]);
        assert_eq!(last.winner(), Some(Piece::First));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_room_code_rejected() {
        let (server, addr) = spawn_server(two_d()).await;

        match connect_async(format!("ws://{addr}/")).await {
            Err(tungstenite::Error::Http(response)) => {
                assert_eq!(response.status(), StatusCode::NOT_FOUND);
            }
            Err(e) => panic!("Unexpected error: {e}"),
            Ok(_) => panic!("Handshake should have been rejected"),
        }
        assert_eq!(server.registry().room_count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_room_removed_when_empty() {
        let (server, addr) = spawn_server(two_d()).await;
        let (mut a, _) = join(addr, "temp").await;
        let (mut b, _) = join(addr, "temp").await;
        assert!(server.registry().contains("temp").await);

        a.close(None).await.unwrap();
        wait_for_connections(&server, "temp", Some(1)).await;
        b.close(None).await.unwrap();
        wait_for_connections(&server, "temp", None).await;
        assert_eq!(server.registry().room_count().await, 0);

        // Rejoining starts over with a fresh room
        let mut again = connect(addr, "temp").await;
        assert_eq!(recv(&mut again).await, ServerMessage::First);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_vacated_seat_given_to_next_joiner() {
        let (server, addr) = spawn_server(two_d()).await;
        let (mut x, side) = join(addr, "seats").await;
        assert_eq!(side, Some(Piece::First));
        let (_o, _) = join(addr, "seats").await;
        let (_watcher, side) = join(addr, "seats").await;
        assert_eq!(side, None);

        x.close(None).await.unwrap();
        wait_for_connections(&server, "seats", Some(2)).await;

        let (_replacement, side) = join(addr, "seats").await;
        assert_eq!(side, Some(Piece::First));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rooms_are_isolated() {
        let (_server, addr) = spawn_server(two_d()).await;
        let (mut red, _) = join(addr, "red").await;
        let (mut blue, side) = join(addr, "blue").await;
        assert_eq!(side, Some(Piece::First));

        send(&mut red, ClientMessage::PutPiece(0)).await;
        assert_eq!(recv_board(&mut red).await.cell(0), Some(Piece::First));
        assert_quiet(&mut blue).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_connection_limit() {
        let config = ServerConfig {
            max_connections: 1,
            ..two_d()
        };
        let (_server, addr) = spawn_server(config).await;
        let (_only, _) = join(addr, "full").await;

        let refused = timeout(WAIT, connect_async(format!("ws://{addr}/full")))
            .await
            .expect("Connection attempt hung");
        assert!(refused.is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_connection_limit_counts_pending_handshakes() {
        let config = ServerConfig {
            max_connections: 2,
            ..two_d()
        };
        let (_server, addr) = spawn_server(config).await;

        // Plain TCP connections that never send a handshake still hold a slot
        let idle_a = TcpStream::connect(addr).await.unwrap();
        let idle_b = TcpStream::connect(addr).await.unwrap();
        sleep(QUIET).await;

        let refused = timeout(WAIT, connect_async(format!("ws://{addr}/busy")))
            .await
            .expect("Connection attempt hung");
        assert!(refused.is_err());

        // Closing them frees the slots again
        drop(idle_a);
        drop(idle_b);
        let admitted = timeout(WAIT, async {
            loop {
                if let Ok((ws, _)) = connect_async(format!("ws://{addr}/busy")).await {
                    break ws;
                }
                sleep(Duration::from_millis(20)).await;
            }
        })
        .await;
        assert!(admitted.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_invalid_game_settings_refuse_to_serve() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = create_server_with_config(ServerConfig {
            game: GameSettings {
                rank: Rank::TWO,
                side_length: 1,
            },
            ..Default::default()
        });
        let result = timeout(WAIT, server.serve(listener)).await.expect("serve hung");
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ping_answered_once() {
        let (_server, addr) = spawn_server(two_d()).await;
        let (mut client, _) = join(addr, "ping").await;

        client.send(Message::Ping("hi".into())).await.unwrap();
        let reply = timeout(WAIT, client.next())
            .await
            .expect("No reply to ping")
            .expect("Connection closed")
            .expect("WebSocket error");
        match reply {
            Message::Pong(data) => assert_eq!(data.as_ref(), b"hi"),
            other => panic!("Expected a pong, got {other:?}"),
        }
        assert_quiet(&mut client).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_extra_leading_slashes_are_ignored() {
        let (server, addr) = spawn_server(two_d()).await;
        let (_a, side_a) = join(addr, "abc").await;
        let (_b, side_b) = join(addr, "/abc").await;
        assert_eq!(side_a, Some(Piece::First));
        assert_eq!(side_b, Some(Piece::Second));
        assert_eq!(server.registry().connection_count("abc").await, Some(2));
        assert!(!server.registry().contains("/abc").await);

        let refused = timeout(WAIT, connect_async(format!("ws://{addr}//")))
            .await
            .expect("Connection attempt hung");
        assert!(refused.is_err());
        assert!(!server.registry().contains("/").await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_shutdown_stops_accepting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(create_server_with_config(two_d()));
        let serving = server.clone();
        let handle = tokio::spawn(async move { serving.serve(listener).await });

        let (_client, _) = join(addr, "bye").await;
        server.shutdown().await.unwrap();
        let result = timeout(WAIT, handle).await.expect("Server did not stop");
        assert!(result.unwrap().is_ok());
    }
}
