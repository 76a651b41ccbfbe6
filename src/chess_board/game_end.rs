use super::{ChessBoard, Color};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
}

impl ChessBoard {
    /// `side_to_move` is in check and has no legal move.
    ///
    /// Legal moves are probed with apply/undo pairs; the board is unchanged afterwards.
    pub fn is_checkmated(&mut self, side_to_move: Color) -> bool {
        if !self.is_in_check(side_to_move) {
            return false;
        }
        !self.has_legal_move(side_to_move)
    }

    /// `side_to_move` is not in check and has no legal move (stalemate).
    pub fn is_tie(&mut self, side_to_move: Color) -> bool {
        if self.is_in_check(side_to_move) {
            return false;
        }
        !self.has_legal_move(side_to_move)
    }

    pub fn game_status(&mut self, side_to_move: Color) -> GameStatus {
        if self.has_legal_move(side_to_move) {
            GameStatus::Ongoing
        } else if self.is_in_check(side_to_move) {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        }
    }
}
