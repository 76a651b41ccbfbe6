use super::zobrist_hash::ZOBRIST;
use super::{fen, ChessField, Color, Move, MoveKind, Piece, PieceId, PieceType, Team};
use crate::error::BoardError;

/// Occupancy of the 8x8 grid plus the arena of every piece that took part in the game.
///
/// The grid is the source of truth for who stands where; the two teams hold the handles of
/// their active pieces and are kept in sync by `apply` and `undo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChessBoard {
    squares: [[Option<PieceId>; 8]; 8],
    pieces: Vec<Piece>,
    pub(super) teams: [Team; 2],
    pub en_passant: Option<ChessField>,
    /// Zobrist hash of the placement and en passant square, used to check that apply/undo pairs
    /// restore the board. The side to move is not included, so it is no transposition key.
    pub hash: u64,
}

/// Undo information for one applied move. Must be handed back to `undo` in reverse order
/// of application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    captured_slot: Option<usize>,
    previous_en_passant: Option<ChessField>,
    previous_hash: u64,
}

impl ChessBoard {
    /// Creates an empty chess board
    pub fn new() -> Self {
        Self {
            squares: [[None; 8]; 8],
            pieces: Vec::with_capacity(32),
            teams: [Team::new(Color::White), Team::new(Color::Black)],
            en_passant: None,
            hash: 0,
        }
    }

    /// Standard starting layout, White to move.
    pub fn standard() -> Self {
        let mut board = Self::new();
        for color in [Color::White, Color::Black] {
            let home = color.home_row();
            let pawn_row = (home as i8 + color.pawn_direction()) as u8;
            let back_rank = [
                PieceType::Rook,
                PieceType::Knight,
                PieceType::Bishop,
                PieceType::Queen,
                PieceType::King,
                PieceType::Bishop,
                PieceType::Knight,
                PieceType::Rook,
            ];
            for (col, kind) in back_rank.into_iter().enumerate() {
                board.squares[home as usize][col] = Some(board.push_piece(color, kind, ChessField::new(home, col as u8)));
            }
            for col in 0..8 {
                board.squares[pawn_row as usize][col] =
                    Some(board.push_piece(color, PieceType::Pawn, ChessField::new(pawn_row, col as u8)));
            }
        }
        board.hash = ZOBRIST.calculate_hash(&board);
        board.update_scores();
        board
    }

    /// Delegates FEN parsing to the `fen` module. Returns the board and the side to move.
    pub fn from_fen(fen: &str) -> Result<(Self, Color), BoardError> {
        fen::from_fen(fen)
    }

    pub fn to_fen(&self, side_to_move: Color) -> String {
        fen::to_fen(self, side_to_move)
    }

    /// Puts a new piece on an empty square. Only used while setting up a position.
    pub(super) fn place(&mut self, color: Color, kind: PieceType, field: ChessField) -> Result<PieceId, BoardError> {
        if self.squares[field.row as usize][field.col as usize].is_some() {
            return Err(BoardError::SquareOccupied(field));
        }
        let id = self.push_piece(color, kind, field);
        self.squares[field.row as usize][field.col as usize] = Some(id);
        Ok(id)
    }

    fn push_piece(&mut self, color: Color, kind: PieceType, field: ChessField) -> PieceId {
        let id = PieceId(self.pieces.len() as u8);
        self.pieces.push(Piece {
            id,
            color,
            kind,
            field,
            captured: false,
            move_counter: 0,
        });
        self.teams[color.index()].pieces.push(id);
        id
    }

    pub(super) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.index()]
    }

    /// Checks the one-king-per-side invariant and seeds hash and scores.
    pub(super) fn finish_setup(&mut self) -> Result<(), BoardError> {
        for color in [Color::White, Color::Black] {
            let count = self.active_pieces(color).filter(|p| p.kind == PieceType::King).count();
            if count != 1 {
                return Err(BoardError::KingCount { color, count });
            }
        }
        self.hash = ZOBRIST.calculate_hash(self);
        self.update_scores();
        Ok(())
    }
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::standard()
    }
}

impl ChessBoard {
    pub fn piece_at(&self, field: ChessField) -> Option<&Piece> {
        self.squares[field.row as usize][field.col as usize].map(|id| &self.pieces[id.index()])
    }

    /// Any piece of the game, captured ones included.
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index())
    }

    pub fn team(&self, color: Color) -> &Team {
        &self.teams[color.index()]
    }

    /// The pieces of `color` still on the board, in setup order.
    pub fn active_pieces<'a>(&'a self, color: Color) -> impl Iterator<Item = &'a Piece> {
        self.teams[color.index()].pieces.iter().map(move |id| &self.pieces[id.index()])
    }

    /// Returns an iterator over all pieces on the chessboard along with their coordinates.
    pub fn all_pieces_with_coordinates<'a>(&'a self) -> impl Iterator<Item = (ChessField, &'a Piece)> {
        self.active_pieces(Color::White)
            .chain(self.active_pieces(Color::Black))
            .map(|p| (p.field, p))
    }

    pub fn find_king(&self, color: Color) -> Option<&Piece> {
        self.active_pieces(color).find(|p| p.kind == PieceType::King)
    }

    /// Executes a move without any legality check.
    ///
    /// The occupant of the destination (or the pawn taken en passant) is marked captured and
    /// leaves its team; the moving piece's counter is incremented.
    pub fn apply(&mut self, mv: Move) -> MoveRecord {
        let zobrist = &*ZOBRIST;
        let previous_hash = self.hash;
        let previous_en_passant = self.en_passant;
        let mut hash = zobrist.update_en_passant(self.hash, self.en_passant);

        let captured_slot = match mv.captured {
            Some(captured) => {
                let victim = self.pieces[captured.index()];
                hash = zobrist.update_piece(hash, &victim, victim.field);
                self.squares[victim.field.row as usize][victim.field.col as usize] = None;
                self.pieces[captured.index()].captured = true;
                let team = &mut self.teams[victim.color.index()].pieces;
                let slot = team.iter().position(|&id| id == captured);
                if let Some(slot) = slot {
                    team.remove(slot);
                }
                slot
            }
            None => None,
        };

        hash = self.relocate(mv.piece, mv.from, mv.to, hash);
        self.pieces[mv.piece.index()].move_counter += 1;

        match mv.kind {
            MoveKind::Castling { rook, rook_from, rook_to } => {
                hash = self.relocate(rook, rook_from, rook_to, hash);
                self.pieces[rook.index()].move_counter += 1;
            }
            MoveKind::Promotion(kind) => {
                hash = zobrist.update_piece(hash, &self.pieces[mv.piece.index()], mv.to);
                self.pieces[mv.piece.index()].kind = kind;
                hash = zobrist.update_piece(hash, &self.pieces[mv.piece.index()], mv.to);
            }
            _ => {}
        }

        self.en_passant = match mv.kind {
            MoveKind::DoublePawnPush => Some(ChessField::new((mv.from.row + mv.to.row) / 2, mv.from.col)),
            _ => None,
        };
        self.hash = zobrist.update_en_passant(hash, self.en_passant);

        MoveRecord {
            mv,
            captured_slot,
            previous_en_passant,
            previous_hash,
        }
    }

    /// Exact inverse of `apply`, including the captured piece's slot in its team.
    pub fn undo(&mut self, record: MoveRecord) {
        let mv = record.mv;
        match mv.kind {
            MoveKind::Castling { rook, rook_from, rook_to } => {
                self.squares[rook_to.row as usize][rook_to.col as usize] = None;
                self.squares[rook_from.row as usize][rook_from.col as usize] = Some(rook);
                let rook = &mut self.pieces[rook.index()];
                rook.field = rook_from;
                rook.move_counter -= 1;
            }
            MoveKind::Promotion(_) => {
                self.pieces[mv.piece.index()].kind = PieceType::Pawn;
            }
            _ => {}
        }

        self.squares[mv.to.row as usize][mv.to.col as usize] = None;
        self.squares[mv.from.row as usize][mv.from.col as usize] = Some(mv.piece);
        let piece = &mut self.pieces[mv.piece.index()];
        piece.field = mv.from;
        piece.move_counter -= 1;

        if let Some(captured) = mv.captured {
            let victim = &mut self.pieces[captured.index()];
            victim.captured = false;
            let (field, color) = (victim.field, victim.color);
            self.squares[field.row as usize][field.col as usize] = Some(captured);
            if let Some(slot) = record.captured_slot {
                self.teams[color.index()].pieces.insert(slot, captured);
            }
        }

        self.en_passant = record.previous_en_passant;
        self.hash = record.previous_hash;
    }

    fn relocate(&mut self, id: PieceId, from: ChessField, to: ChessField, hash: u64) -> u64 {
        let zobrist = &*ZOBRIST;
        let mut hash = zobrist.update_piece(hash, &self.pieces[id.index()], from);
        self.squares[from.row as usize][from.col as usize] = None;
        self.squares[to.row as usize][to.col as usize] = Some(id);
        self.pieces[id.index()].field = to;
        hash = zobrist.update_piece(hash, &self.pieces[id.index()], to);
        hash
    }

    pub fn render_to_string(&self) -> String {
        let mut board_representation = String::new();
        board_representation.push_str("    a   b   c   d   e   f   g   h  \n");
        board_representation.push_str("  ┌───┬───┬───┬───┬───┬───┬───┬───┐\n");

        for row in (0..8).rev() {
            // Render rows from top (8) to bottom (1)
            board_representation.push_str(&format!("{} │", row + 1));
            for col in 0..8 {
                let square = match self.piece_at(ChessField::new(row, col)) {
                    None => ' ',
                    Some(piece) => piece.to_char(),
                };
                board_representation.push_str(&format!(" {} │", square));
            }
            board_representation.push_str(&format!(" {}\n", row + 1));

            if row > 0 {
                board_representation.push_str("  ├───┼───┼───┼───┼───┼───┼───┼───┤\n");
            }
        }

        board_representation.push_str("  └───┴───┴───┴───┴───┴───┴───┴───┘\n");
        board_representation.push_str("    a   b   c   d   e   f   g   h  \n");

        board_representation
    }
}
