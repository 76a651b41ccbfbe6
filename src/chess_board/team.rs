use super::{ChessBoard, Color, PieceId, PieceType};

/// One side of the game: its color, the handles of its pieces still on the board, in setup
/// order, and its last computed material score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub color: Color,
    pub pieces: Vec<PieceId>,
    pub score: i32,
}

impl Team {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            pieces: Vec::with_capacity(16),
            score: 0,
        }
    }
}

pub fn get_piece_value(piece: &PieceType) -> i32 {
    match piece {
        PieceType::Pawn => 1,
        PieceType::Knight => 3,
        PieceType::Bishop => 3,
        PieceType::Rook => 5,
        PieceType::Queen => 9,
        PieceType::King => 0,
    }
}

/// Positive values favour White.
pub fn score_difference(white: &Team, black: &Team) -> i32 {
    white.score - black.score
}

impl ChessBoard {
    /// Material on the board for `color`, computed from the active pieces.
    pub fn material(&self, color: Color) -> i32 {
        self.active_pieces(color).map(|p| get_piece_value(&p.kind)).sum()
    }

    /// Recomputes and stores the material score of `color`.
    pub fn update_score(&mut self, color: Color) -> i32 {
        let score = self.material(color);
        self.teams[color.index()].score = score;
        score
    }

    pub fn update_scores(&mut self) {
        self.update_score(Color::White);
        self.update_score(Color::Black);
    }

    /// Difference of the stored scores, White minus Black.
    pub fn score_difference(&self) -> i32 {
        score_difference(self.team(Color::White), self.team(Color::Black))
    }
}
