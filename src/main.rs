use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::Context;
use chessmate::chess_board::fen::INITIAL_POSITION;
use chessmate::chess_board::perft::perft_divide;
use chessmate::chess_board::{ChessBoard, ChessField, Color, MoveRequest};
use chessmate::engines::{AlphaBetaEngine, ChessEngine, MinMaxEngine};
use chessmate::error::GameError;
use chessmate::session::{GameSession, SessionConfig};

use clap::arg;
use clap::command;
use clap::ArgMatches;
use clap::Command;
use log::{error, info};

use tabled::settings::Style;
use tabled::Table;
use tabled::Tabled;

fn play_command() -> Command {
    Command::new("play")
        .about("Play a game on the console: enter moves like e2e4, or e2? to list targets")
        .arg(
            arg!(
            -d --depth <n> "Search depth of the bot"
                    )
            .default_value("2")
            .value_parser(clap::value_parser!(i32).range(1..)),
        )
        .arg(
            arg!(
            -b --bot <side> "Side played by the bot"
                    )
            .default_value("black")
            .value_parser(["white", "black", "none"]),
        )
        .arg(
            arg!(
            -m --minutes <m> "Game length per side in minutes"
                    )
            .value_parser(clap::value_parser!(u64)),
        )
        .arg(arg!(
        -f --fen <FEN> "Starting position"
                ))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = command!()
        .propagate_version(true)
        .subcommand(play_command())
        .subcommand(
            Command::new("benchmark")
                .about("Compares minimax and alpha-beta per depth")
                .arg(
                    arg!(
                    -f --fen <FEN> "Board position"
                            )
                    .default_value("1rb2rk1/p4ppp/1p1qp1n1/3n2N1/2pP4/2P3P1/PPQ2PBP/R1B1R1K1 w - - 4 17"),
                )
                .arg(
                    arg!(
                    -x --depth <d> "Maximum depth"
                            )
                    .default_value("3")
                    .value_parser(clap::value_parser!(i32).range(1..)),
                ),
        )
        .subcommand(
            Command::new("perft")
                .about("Run Perft test")
                .arg(
                    arg!(
                    -f --fen <FEN> "Board position"
                            )
                    .default_value(INITIAL_POSITION),
                )
                .arg(
                    arg!(
                    -x --depth <d> "depth"
                            )
                    .default_value("3")
                    .value_parser(clap::value_parser!(u8)),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("benchmark", arg_matches)) => {
            let fen = arg_matches.get_one::<String>("fen").context("missing --fen")?;
            let depth = *arg_matches.get_one::<i32>("depth").context("missing --depth")?;
            benchmark(fen, depth)
        }
        Some(("perft", arg_matches)) => {
            let fen = arg_matches.get_one::<String>("fen").context("missing --fen")?;
            let depth = *arg_matches.get_one::<u8>("depth").context("missing --depth")?;
            perft(fen, depth)
        }
        Some(("play", arg_matches)) => play(arg_matches),
        None => play(&play_command().get_matches_from(["play"])),
        _ => unreachable!("Exhausted list of subcommands"),
    }
}

fn play(arg_matches: &ArgMatches) -> anyhow::Result<()> {
    let search_depth = *arg_matches.get_one::<i32>("depth").context("missing --depth")?;
    let bot = match arg_matches.get_one::<String>("bot").map(String::as_str) {
        Some("white") => Some(Color::White),
        Some("black") => Some(Color::Black),
        _ => None,
    };
    let game_length = arg_matches
        .get_one::<u64>("minutes")
        .map(|minutes| Duration::from_secs(minutes * 60));
    let config = SessionConfig {
        search_depth,
        bot,
        game_length,
    };

    let (board, side_to_move) = match arg_matches.get_one::<String>("fen") {
        Some(fen) => ChessBoard::from_fen(fen)?,
        None => (ChessBoard::standard(), Color::White),
    };
    let mut session = GameSession::from_position(board, side_to_move, config)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("{}", session.board().render_to_string());

        let turn = if session.is_bot_turn() {
            session.play_bot()
        } else {
            print!("{} to move: ", session.side_to_move());
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line?;
            let text = line.trim();
            if text == "quit" {
                return Ok(());
            }
            // "e2?" lists where the piece on e2 may go
            if let Some(square) = text.strip_suffix('?') {
                match ChessField::from_algebraic(square) {
                    Ok(field) => {
                        let targets: Vec<String> =
                            session.legal_destinations(field).iter().map(|f| f.as_algebraic()).collect();
                        println!("{}: {}", field, targets.join(" "));
                    }
                    Err(e) => error!("{}", e),
                }
                continue;
            }
            match MoveRequest::from_algebraic(text) {
                Ok(request) => session.play(request),
                Err(e) => {
                    error!("{}", e);
                    continue;
                }
            }
        };

        match turn {
            Ok(report) => println!("{} played {}", report.side, report.mv.as_algebraic()),
            Err(GameError::InvalidMove(e)) => println!("{}", e),
            Err(end) if end.is_game_end() => {
                println!("{}", session.board().render_to_string());
                println!("{}", end);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[derive(Tabled)]
struct BenchmarkRow {
    engine: String,
    ply: i32,
    score: i32,
    node_count: u64,
    elapsed_time: f32,
    nodes_per_sec: f32,
    best_move: String,
}

fn benchmark(fen: &str, max_depth: i32) -> anyhow::Result<()> {
    let (mut chess_board, side_to_move) = ChessBoard::from_fen(fen)?;
    let mut engines: [Box<dyn ChessEngine>; 2] = [Box::new(MinMaxEngine::new()), Box::new(AlphaBetaEngine::new())];
    let mut table_rows = Vec::new();
    for d in 1..=max_depth {
        for engine in engines.iter_mut() {
            let start_time = Instant::now();
            let (m, score, node_count) = engine.find_best_move(&mut chess_board, side_to_move, d)?;
            let elapsed = start_time.elapsed();
            table_rows.push(BenchmarkRow {
                engine: engine.name().to_string(),
                ply: d,
                score,
                node_count,
                elapsed_time: elapsed.as_secs_f32(),
                nodes_per_sec: node_count as f32 / elapsed.as_secs_f32().max(f32::EPSILON),
                best_move: m.as_algebraic(),
            });
        }
    }
    println!("{}", Table::new(table_rows).with(Style::modern()));
    Ok(())
}

fn perft(fen: &str, depth: u8) -> anyhow::Result<()> {
    info!("Perft test for {} with depth {}", fen, depth);
    let (mut chess_board, side_to_move) = ChessBoard::from_fen(fen)?;

    let mut num_nodes = 0;
    for (m, c) in perft_divide(&mut chess_board, side_to_move, depth) {
        println!("{}: {}", m, c);
        num_nodes += c;
    }
    println!("\nNodes searched: {}", num_nodes);
    Ok(())
}
