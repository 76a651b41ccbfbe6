//! Error types for the rules engine, the search bots and the game session.

use thiserror::Error;

use crate::chess_board::{ChessField, Color, PieceId, PieceType};

/// A proposed move broke one of the legality rules. The board is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("No piece on {0}")]
    NoPiece(ChessField),

    #[error("Piece {0:?} is not on the board")]
    UnknownPiece(PieceId),

    #[error("Piece on {field} does not belong to {side}")]
    NotOwnPiece { field: ChessField, side: Color },

    #[error("Piece on {from} cannot reach {to}")]
    Unreachable { from: ChessField, to: ChessField },

    #[error("Square {to} is occupied by another {side} piece")]
    OccupiedByOwnPiece { to: ChessField, side: Color },

    #[error("Moving {from} to {to} would leave the {side} king in check")]
    LeavesKingInCheck {
        from: ChessField,
        to: ChessField,
        side: Color,
    },

    #[error("A pawn cannot promote to {0:?}")]
    InvalidPromotion(PieceType),
}

/// Invalid position setup or unparsable input text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Invalid FEN string: {0}")]
    InvalidFen(String),

    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    #[error("Invalid move text: {0}")]
    InvalidMoveText(String),

    #[error("Square {0} is already occupied")]
    SquareOccupied(ChessField),

    #[error("Expected exactly one {color} king, found {count}")]
    KingCount { color: Color, count: usize },
}

/// Contract violations of the search bots. These are programming errors on the caller side.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search depth must be positive, got {0}")]
    InvalidDepth(i32),

    #[error("{0} has no legal moves, the game is already over")]
    NoLegalMoves(Color),
}

/// Everything a turn of the game session can end with besides a normal move.
///
/// `Checkmated`, `Tie` and `RunOutOfTime` are terminal signals rather than failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    InvalidMove(#[from] MoveError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Checkmate, {winner} wins")]
    Checkmated { winner: Color },

    #[error("Stalemate, the game is a tie")]
    Tie,

    #[error("Time is up, {winner} wins")]
    RunOutOfTime { winner: Color },

    #[error("The game is already over")]
    GameOver,
}

impl GameError {
    /// True for the signals that end the game.
    pub fn is_game_end(&self) -> bool {
        matches!(
            self,
            GameError::Checkmated { .. } | GameError::Tie | GameError::RunOutOfTime { .. } | GameError::GameOver
        )
    }
}

pub type GameResult<T> = Result<T, GameError>;
