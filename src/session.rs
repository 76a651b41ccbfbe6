//! Turn bookkeeping around the rules engine: validates and applies moves, hands the turn over,
//! detects the end of the game and keeps the scores current.

use crate::chess_board::{ChessBoard, ChessField, Color, Move, MoveRequest, PieceType};
use crate::engines::{AlphaBetaEngine, ChessEngine};
use crate::error::{GameError, GameResult, MoveError, SearchError};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Read once when the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub search_depth: i32,
    /// The side played by the engine, if any.
    pub bot: Option<Color>,
    pub game_length: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            search_depth: 2,
            bot: Some(Color::Black),
            game_length: None,
        }
    }
}

/// Per-side timer collaborator.
pub trait TurnClock {
    /// Pauses the running side and starts the clock of `side`.
    fn switch_to(&mut self, side: Color);
    /// The side whose time is used up, if any.
    fn out_of_time(&self) -> Option<Color>;
}

/// Per-side countdown measured with the wall clock.
pub struct WallClock {
    remaining: [Duration; 2],
    running: Option<(Color, Instant)>,
}

impl WallClock {
    pub fn new(game_length: Duration) -> Self {
        WallClock {
            remaining: [game_length; 2],
            running: None,
        }
    }
}

impl TurnClock for WallClock {
    fn switch_to(&mut self, side: Color) {
        if let Some((previous, started)) = self.running.take() {
            let left = &mut self.remaining[previous.index()];
            *left = left.saturating_sub(started.elapsed());
        }
        self.running = Some((side, Instant::now()));
    }

    fn out_of_time(&self) -> Option<Color> {
        let (side, started) = self.running?;
        if started.elapsed() >= self.remaining[side.index()] {
            Some(side)
        } else {
            None
        }
    }
}

/// Summary of a completed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    pub mv: Move,
    pub side: Color,
    pub turn_number: u32,
    /// White minus Black after the move.
    pub score_difference: i32,
}

pub struct GameSession {
    board: ChessBoard,
    side_to_move: Color,
    turn_number: u32,
    config: SessionConfig,
    engine: Box<dyn ChessEngine>,
    clock: Option<Box<dyn TurnClock>>,
    finished: bool,
}

impl GameSession {
    /// Standard layout, White to move. A `game_length` in the config starts a `WallClock`.
    pub fn new(config: SessionConfig) -> GameResult<Self> {
        Self::from_position(ChessBoard::standard(), Color::White, config)
    }

    pub fn from_position(board: ChessBoard, side_to_move: Color, config: SessionConfig) -> GameResult<Self> {
        if config.search_depth <= 0 {
            return Err(SearchError::InvalidDepth(config.search_depth).into());
        }
        let mut board = board;
        board.update_scores();
        let game_length = config.game_length;
        let session = GameSession {
            board,
            side_to_move,
            turn_number: 0,
            config,
            engine: Box::new(AlphaBetaEngine::new()),
            clock: None,
            finished: false,
        };
        Ok(match game_length {
            Some(length) => session.with_clock(Box::new(WallClock::new(length))),
            None => session,
        })
    }

    pub fn with_engine(mut self, engine: Box<dyn ChessEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_clock(mut self, mut clock: Box<dyn TurnClock>) -> Self {
        clock.switch_to(self.side_to_move);
        self.clock = Some(clock);
        self
    }

    pub fn board(&self) -> &ChessBoard {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_bot_turn(&self) -> bool {
        self.config.bot == Some(self.side_to_move)
    }

    /// Legal destinations of the piece on `field` for the side to move, for highlighting.
    /// Promotions show up once.
    pub fn legal_destinations(&mut self, field: ChessField) -> Vec<ChessField> {
        let mut destinations = Vec::new();
        for mv in self.board.legal_moves(self.side_to_move) {
            if mv.from == field && !destinations.contains(&mv.to) {
                destinations.push(mv.to);
            }
        }
        destinations
    }

    /// Plays a move typed by the player whose turn it is.
    pub fn play(&mut self, request: MoveRequest) -> GameResult<TurnReport> {
        self.ensure_running()?;
        self.poll_clock()?;

        let id = self
            .board
            .piece_at(request.from)
            .map(|p| p.id)
            .ok_or(MoveError::NoPiece(request.from))?;
        let promotion = request.promotion.unwrap_or(PieceType::Queen);
        let mv = self
            .board
            .try_to_move_promoting(id, request.to, self.side_to_move, promotion)
            .inspect_err(|e| warn!("Rejected move: {}", e))?;
        self.finish_turn(mv)
    }

    /// Lets the engine pick and play the move for the side to move.
    pub fn play_bot(&mut self) -> GameResult<TurnReport> {
        self.ensure_running()?;
        self.poll_clock()?;

        let (mv, score, node_count) =
            self.engine
                .find_best_move(&mut self.board, self.side_to_move, self.config.search_depth)?;
        debug!(
            "{} plays {} (score {}, {} nodes)",
            self.engine.name(),
            mv.as_algebraic(),
            score,
            node_count
        );
        self.finish_turn(mv)
    }

    /// Ends the game because `side` ran out of time. The opponent wins.
    pub fn expire(&mut self, side: Color) -> GameError {
        self.finished = true;
        GameError::RunOutOfTime { winner: side.opposite() }
    }

    /// Checks the clock, if one is attached.
    pub fn poll_clock(&mut self) -> GameResult<()> {
        let expired = self.clock.as_ref().and_then(|clock| clock.out_of_time());
        match expired {
            Some(side) => Err(self.expire(side)),
            None => Ok(()),
        }
    }

    fn ensure_running(&self) -> GameResult<()> {
        if self.finished {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }

    fn finish_turn(&mut self, mv: Move) -> GameResult<TurnReport> {
        self.board.apply(mv);
        let mover = self.side_to_move;
        self.side_to_move = mover.opposite();
        if let Some(clock) = self.clock.as_mut() {
            clock.switch_to(self.side_to_move);
        }
        self.turn_number += 1;
        self.board.update_scores();

        if self.board.is_checkmated(self.side_to_move) {
            self.finished = true;
            return Err(GameError::Checkmated { winner: mover });
        }
        if self.board.is_tie(self.side_to_move) {
            self.finished = true;
            return Err(GameError::Tie);
        }

        let score_difference = self.board.score_difference();
        match score_difference {
            0 => info!("turn {}: {} played {}, scores are level", self.turn_number, mover, mv.as_algebraic()),
            d if d > 0 => info!("turn {}: {} played {}, white leads by {}", self.turn_number, mover, mv.as_algebraic(), d),
            d => info!("turn {}: {} played {}, black leads by {}", self.turn_number, mover, mv.as_algebraic(), -d),
        }

        Ok(TurnReport {
            mv,
            side: mover,
            turn_number: self.turn_number,
            score_difference,
        })
    }
}
