//! # ttt-client - Terminal Client
//!
//! Joins a room and plays from standard input. The board is redrawn as text
//! whenever a new snapshot arrives.
//!
//! Commands: `left`/`right`, `down`/`up`, `out`/`in`, `kata`/`ana` move the
//! cursor along x, y, z, w; `move x y z w` moves by an arbitrary vector;
//! `select i` jumps to a cell; `put` places a piece; `reset [rank]` clears
//! the board; `show` redraws; `quit` exits.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use ttt_client::{ClientBoard, ClientConfig, ClientSnapshot};
use ttt_core::{board::unit_step, Coord, GameStatus, Rank, DEFAULT_SIDE_LENGTH};

#[derive(Parser, Debug)]
#[command(name = "ttt-client")]
#[command(about = "N-dimensional tic-tac-toe terminal client")]
struct Args {
    /// Server WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:8869")]
    url: String,

    /// Room code to join
    #[arg(short = 'r', long, default_value = "lobby")]
    room: String,

    /// Board rank (2, 3 or 4); imposed on the room when joining first
    #[arg(short = 'd', long, default_value = "2", value_parser = parse_rank)]
    rank: Rank,

    /// Delay before reconnecting after a lost connection, in milliseconds
    #[arg(long, default_value_t = 1000)]
    reconnect_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Play locally without connecting
    #[arg(long)]
    offline: bool,
}

fn parse_rank(value: &str) -> Result<Rank, String> {
    let value: i64 = value.parse().map_err(|e| format!("{e}"))?;
    Rank::new(value).map_err(|e| e.to_string())
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Move(Coord),
    Select(usize),
    Put,
    Reset(Option<Rank>),
    Show,
    Quit,
}

fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(Command::Show);
    };
    let step = |axis: usize, forward: bool| -> Result<Command> { Ok(Command::Move(unit_step(axis, forward))) };
    match word {
        "left" => step(0, false),
        "right" => step(0, true),
        "down" => step(1, false),
        "up" => step(1, true),
        "out" => step(2, false),
        "in" => step(2, true),
        "kata" => step(3, false),
        "ana" => step(3, true),
        "move" => {
            let mut direction = [0; 4];
            for component in direction.iter_mut() {
                let value = words.next().ok_or_else(|| anyhow!("usage: move x y z w"))?;
                *component = value.parse().with_context(|| format!("bad component '{value}'"))?;
            }
            Ok(Command::Move(direction))
        }
        "select" => {
            let value = words.next().ok_or_else(|| anyhow!("usage: select <index>"))?;
            Ok(Command::Select(value.parse().with_context(|| format!("bad index '{value}'"))?))
        }
        "put" => Ok(Command::Put),
        "reset" => match words.next() {
            Some(value) => {
                let rank = parse_rank(value).map_err(|e| anyhow!(e))?;
                Ok(Command::Reset(Some(rank)))
            }
            None => Ok(Command::Reset(None)),
        },
        "show" => Ok(Command::Show),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(anyhow!("unknown command '{other}'")),
    }
}

fn draw(snapshot: &ClientSnapshot) {
    let board = match snapshot.to_board() {
        Ok(board) => board,
        Err(e) => {
            error!("Cannot draw snapshot: {}", e);
            return;
        }
    };

    let seat = match (snapshot.connected, snapshot.side) {
        (false, _) => "offline".to_string(),
        (true, Some(piece)) => format!("playing {piece}"),
        (true, None) => "spectating".to_string(),
    };
    let status = match board.status() {
        GameStatus::InProgress => format!("{} to move", board.current_piece()),
        GameStatus::Won(piece) => format!("{piece} wins"),
        GameStatus::Draw => "draw".to_string(),
    };
    println!("\n{} board, {}, {}", board.rank(), seat, status);
    print!("{}", board.render_text());
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = ClientConfig {
        rank: args.rank,
        side_length: DEFAULT_SIDE_LENGTH,
        reconnect_delay: Duration::from_millis(args.reconnect_ms),
    };
    let mut board = ClientBoard::new(config)?;
    if args.offline {
        info!("🎮 Playing offline");
    } else {
        board.connect(&args.url, &args.room)?;
    }

    // Redraw on every published snapshot
    let mut updates = board.subscribe();
    let renderer = tokio::spawn(async move {
        draw(&updates.borrow_and_update().clone());
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            draw(&snapshot);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };
        let result = match command {
            Command::Move(direction) => {
                board.move_cursor(direction).await;
                Ok(())
            }
            Command::Select(index) => board.select(index).await,
            Command::Put => board.put_piece().await,
            Command::Reset(rank) => board.reset(rank).await,
            Command::Show => {
                draw(&board.snapshot());
                Ok(())
            }
            Command::Quit => break,
        };
        if let Err(e) = result {
            warn!("{e}");
        }
    }

    board.disconnect().await;
    renderer.abort();
    Ok(())
}
