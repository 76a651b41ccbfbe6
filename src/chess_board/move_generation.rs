use super::{ChessBoard, ChessField, Color, Move, MoveKind, Piece, PieceId, PieceType};
use crate::error::MoveError;
use log::trace;

const KNIGHT_MOVES: [(i8, i8); 8] = [(-2, -1), (-1, -2), (1, -2), (2, -1), (2, 1), (1, 2), (-1, 2), (-2, 1)];
const KING_MOVES: [(i8, i8); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
const QUEEN_DIRECTIONS: [(i8, i8); 8] = [(-1, -1), (-1, 1), (1, -1), (1, 1), (0, -1), (0, 1), (-1, 0), (1, 0)];

/// What a destination set is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    /// Squares the piece may move to, ignoring own-side occupancy of the destination and
    /// self-check.
    Moves,
    /// Squares the piece threatens. No pawn pushes, no castling.
    Attacks,
}

impl ChessBoard {
    /// Geometrically reachable squares of a piece: movement pattern, path blocking, pawn
    /// capture rules, en passant and castling.
    ///
    /// Squares held by the piece's own side are included when the pattern reaches them;
    /// rejecting those is a separate rule.
    pub fn reachable_squares(&self, id: PieceId) -> Vec<ChessField> {
        match self.piece(id) {
            Some(piece) if !piece.captured => self.destinations(piece, Reach::Moves),
            _ => Vec::new(),
        }
    }

    fn destinations(&self, piece: &Piece, reach: Reach) -> Vec<ChessField> {
        match piece.kind {
            PieceType::Pawn => self.pawn_destinations(piece, reach),
            PieceType::Knight => self.step_destinations(piece.field, &KNIGHT_MOVES),
            PieceType::Bishop => self.sliding_destinations(piece.field, &BISHOP_DIRECTIONS),
            PieceType::Rook => self.sliding_destinations(piece.field, &ROOK_DIRECTIONS),
            PieceType::Queen => self.sliding_destinations(piece.field, &QUEEN_DIRECTIONS),
            PieceType::King => {
                let mut fields = self.step_destinations(piece.field, &KING_MOVES);
                if reach == Reach::Moves {
                    fields.extend(self.castling_destinations(piece));
                }
                fields
            }
        }
    }

    fn pawn_destinations(&self, pawn: &Piece, reach: Reach) -> Vec<ChessField> {
        let mut fields = Vec::new();
        let forward = pawn.color.pawn_direction();

        for d_col in [-1, 1] {
            if let Some(target) = pawn.field.offset(forward, d_col) {
                let capturable = self.piece_at(target).is_some() || self.en_passant_victim(pawn, target).is_some();
                if reach == Reach::Attacks || capturable {
                    fields.push(target);
                }
            }
        }
        if reach == Reach::Attacks {
            return fields;
        }

        // Forward moves never capture; the double step only from the start rank over an empty square.
        let enemy_on = |field: ChessField| self.piece_at(field).is_some_and(|p| p.color != pawn.color);
        if let Some(one_step) = pawn.field.offset(forward, 0) {
            if !enemy_on(one_step) {
                fields.push(one_step);
            }
            let start_row = (pawn.color.home_row() as i8 + forward) as u8;
            if pawn.field.row == start_row && self.piece_at(one_step).is_none() {
                if let Some(two_steps) = pawn.field.offset(2 * forward, 0) {
                    if !enemy_on(two_steps) {
                        fields.push(two_steps);
                    }
                }
            }
        }
        fields
    }

    /// The enemy pawn `pawn` would take by moving diagonally onto the empty en passant square.
    fn en_passant_victim(&self, pawn: &Piece, target: ChessField) -> Option<PieceId> {
        if self.en_passant != Some(target) || self.piece_at(target).is_some() {
            return None;
        }
        self.piece_at(ChessField::new(pawn.field.row, target.col))
            .filter(|p| p.color != pawn.color && p.kind == PieceType::Pawn)
            .map(|p| p.id)
    }

    fn step_destinations(&self, from: ChessField, steps: &[(i8, i8)]) -> Vec<ChessField> {
        steps.iter().filter_map(|&(dr, dc)| from.offset(dr, dc)).collect()
    }

    /// Generate sliding piece moves (bishop, rook, queen).
    fn sliding_destinations(&self, from: ChessField, directions: &[(i8, i8)]) -> Vec<ChessField> {
        let mut fields = Vec::new();
        for &(dr, dc) in directions {
            let mut current = from;
            while let Some(next) = current.offset(dr, dc) {
                fields.push(next);
                if self.piece_at(next).is_some() {
                    break; // Block sliding
                }
                current = next;
            }
        }
        fields
    }

    /// King moves two squares toward an unmoved rook. The path must be empty and the king may
    /// not castle out of or through check.
    fn castling_destinations(&self, king: &Piece) -> Vec<ChessField> {
        let mut fields = Vec::new();
        let row = king.color.home_row();
        if king.move_counter != 0 || king.field != ChessField::new(row, 4) {
            return fields;
        }
        let opponent = king.color.opposite();

        for (rook_col, empty, safe) in [(7u8, &[5u8, 6][..], &[4u8, 5, 6][..]), (0u8, &[1u8, 2, 3][..], &[4u8, 3, 2][..])] {
            if !self.castling_available(king.color, rook_col) {
                continue;
            }
            if empty.iter().any(|&col| self.piece_at(ChessField::new(row, col)).is_some()) {
                continue;
            }
            if safe.iter().any(|&col| self.is_square_attacked(ChessField::new(row, col), opponent)) {
                continue;
            }
            fields.push(ChessField::new(row, if rook_col == 7 { 6 } else { 2 }));
        }
        fields
    }

    /// True while the king and the rook on `rook_col` of `color`'s home rank have not moved.
    pub fn castling_available(&self, color: Color, rook_col: u8) -> bool {
        let home = color.home_row();
        let unmoved = |col: u8, kind: PieceType| {
            self.piece_at(ChessField::new(home, col))
                .is_some_and(|p| p.color == color && p.kind == kind && p.move_counter == 0)
        };
        unmoved(4, PieceType::King) && unmoved(rook_col, PieceType::Rook)
    }

    /// True if any active piece of `by` threatens `field`.
    pub fn is_square_attacked(&self, field: ChessField, by: Color) -> bool {
        self.active_pieces(by).any(|p| self.destinations(p, Reach::Attacks).contains(&field))
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(king) => self.is_square_attacked(king.field, color.opposite()),
            None => false,
        }
    }

    /// Resolves a (piece, destination) pair into a full move: captured piece, castling rook,
    /// en passant victim, double step or promotion.
    fn build_move(&self, piece: &Piece, to: ChessField, promotion: PieceType) -> Move {
        let from = piece.field;
        let mut captured = self.piece_at(to).map(|p| p.id);
        let kind = match piece.kind {
            PieceType::King if (to.col as i8 - from.col as i8).abs() == 2 => {
                let (rook_col, rook_to_col) = if to.col > from.col { (7, 5) } else { (0, 3) };
                let rook_from = ChessField::new(from.row, rook_col);
                match self.piece_at(rook_from) {
                    Some(rook) => MoveKind::Castling {
                        rook: rook.id,
                        rook_from,
                        rook_to: ChessField::new(from.row, rook_to_col),
                    },
                    None => MoveKind::Normal,
                }
            }
            PieceType::Pawn if to.col != from.col && self.en_passant_victim(piece, to).is_some() => {
                captured = self.en_passant_victim(piece, to);
                MoveKind::EnPassant
            }
            PieceType::Pawn if (to.row as i8 - from.row as i8).abs() == 2 => MoveKind::DoublePawnPush,
            PieceType::Pawn if to.row == piece.color.opposite().home_row() => MoveKind::Promotion(promotion),
            _ => MoveKind::Normal,
        };
        Move {
            piece: piece.id,
            from,
            to,
            captured,
            kind,
        }
    }

    /// Validates moving `id` to `to` for `side_to_move`. Promotions default to a queen.
    ///
    /// The rules are checked in order and the first failure is reported: ownership,
    /// reachability, own-side occupancy of the destination, self-check. The board is left
    /// exactly as it was; on success the returned move may be handed to `apply`.
    pub fn try_to_move(&mut self, id: PieceId, to: ChessField, side_to_move: Color) -> Result<Move, MoveError> {
        self.try_to_move_promoting(id, to, side_to_move, PieceType::Queen)
    }

    pub fn try_to_move_promoting(
        &mut self,
        id: PieceId,
        to: ChessField,
        side_to_move: Color,
        promotion: PieceType,
    ) -> Result<Move, MoveError> {
        let piece = match self.piece(id) {
            Some(piece) if !piece.captured => *piece,
            _ => return Err(MoveError::UnknownPiece(id)),
        };
        if piece.color != side_to_move {
            return Err(MoveError::NotOwnPiece {
                field: piece.field,
                side: side_to_move,
            });
        }
        if !self.destinations(&piece, Reach::Moves).contains(&to) {
            return Err(MoveError::Unreachable { from: piece.field, to });
        }
        if self.piece_at(to).is_some_and(|p| p.color == side_to_move) {
            return Err(MoveError::OccupiedByOwnPiece { to, side: side_to_move });
        }

        let mv = self.build_move(&piece, to, promotion);
        if let Some(kind @ (PieceType::Pawn | PieceType::King)) = mv.promotion() {
            return Err(MoveError::InvalidPromotion(kind));
        }
        if self.leaves_king_in_check(mv, side_to_move) {
            trace!("{} rejected, {} king would be in check", mv.as_algebraic(), side_to_move);
            return Err(MoveError::LeavesKingInCheck {
                from: piece.field,
                to,
                side: side_to_move,
            });
        }
        Ok(mv)
    }

    fn leaves_king_in_check(&mut self, mv: Move, side: Color) -> bool {
        let record = self.apply(mv);
        let in_check = self.is_in_check(side);
        self.undo(record);
        in_check
    }

    /// All legal moves of `side`, pieces in team order and destinations in generation order.
    /// Promotions are listed once per promotion piece, queen first.
    pub fn legal_moves(&mut self, side: Color) -> Vec<Move> {
        let mut legal_moves = Vec::new();
        let ids = self.team(side).pieces.clone();
        for id in ids {
            for to in self.reachable_squares(id) {
                if let Ok(mv) = self.try_to_move(id, to, side) {
                    if let MoveKind::Promotion(_) = mv.kind {
                        legal_moves.extend(PieceType::PROMOTIONS.iter().map(|&kind| Move {
                            kind: MoveKind::Promotion(kind),
                            ..mv
                        }));
                    } else {
                        legal_moves.push(mv);
                    }
                }
            }
        }
        legal_moves
    }

    /// Stops at the first legal move found.
    pub fn has_legal_move(&mut self, side: Color) -> bool {
        let ids = self.team(side).pieces.clone();
        for id in ids {
            for to in self.reachable_squares(id) {
                if self.try_to_move(id, to, side).is_ok() {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;
    use super::*;
    use assert_matches::assert_matches;

    fn field(square: &str) -> ChessField {
        ChessField::from_algebraic(square).unwrap()
    }

    fn id_at(board: &ChessBoard, square: &str) -> PieceId {
        board.piece_at(field(square)).unwrap().id
    }

    #[test]
    fn test_generate_pawn_moves() {
        // Pawn at e4 can move forward to e5
        let (mut board, side) = board_from_fen("k7/8/8/8/4P3/8/8/K7 w - - 0 1");
        assert_moves(legal_moves_from(&mut board, side, "e4").into_iter(), vec!["e4e5"]);

        // Test blocked pawn a3 by a4
        let (mut board, side) = board_from_fen("k7/8/8/8/P7/P7/8/7K w - - 0 1");
        assert_moves(legal_moves_from(&mut board, side, "a3").into_iter(), vec![]);

        // White pawn at e5 can capture en passant at f6 and capture at d6 and move to e6
        let (mut board, side) = board_from_fen("k7/8/3p4/4Pp2/8/8/8/K7 w - f6 0 1");
        assert_moves(legal_moves_from(&mut board, side, "e5").into_iter(), vec!["e5d6", "e5e6", "e5f6"]);

        // Move pawn on b2 and black a3 and c3
        let (mut board, side) = board_from_fen("k7/8/8/8/8/p1p5/1P6/7K w - - 0 1");
        assert_moves(legal_moves_from(&mut board, side, "b2").into_iter(), vec!["b2b3", "b2b4", "b2a3", "b2c3"]);

        // Move black pawn on a6 to a5
        let (mut board, side) = board_from_fen("7k/8/p7/8/8/8/8/K7 b - - 0 1");
        assert_moves(legal_moves_from(&mut board, side, "a6").into_iter(), vec!["a6a5"]);

        // Double step blocked on the second square only
        let (mut board, side) = board_from_fen("k7/8/8/8/4p3/8/4P3/K7 w - - 0 1");
        assert_moves(legal_moves_from(&mut board, side, "e2").into_iter(), vec!["e2e3"]);
    }

    #[test]
    fn test_generate_promotion_moves() {
        let (mut board, side) = board_from_fen("1n5k/P7/8/8/8/8/8/K7 w - - 0 1");
        let expected = vec!["a7a8q", "a7a8r", "a7a8b", "a7a8n", "a7b8q", "a7b8r", "a7b8b", "a7b8n"];
        assert_moves(legal_moves_from(&mut board, side, "a7").into_iter(), expected);
    }

    #[test]
    fn test_generate_knight_moves() {
        let (mut board, side) = board_from_fen("k7/8/8/8/3N4/8/2P5/K7 w - - 0 1");
        let expected = vec!["d4b3", "d4b5", "d4c6", "d4e6", "d4f5", "d4f3", "d4e2"];
        assert_moves(legal_moves_from(&mut board, side, "d4").into_iter(), expected);
    }

    #[test]
    fn test_generate_sliding_moves() {
        let (mut board, side) = board_from_fen("k7/8/8/1p6/8/3B4/8/K3R3 w - - 0 1");
        let expected = vec!["d3c4", "d3b5", "d3e4", "d3f5", "d3g6", "d3h7", "d3c2", "d3b1", "d3e2", "d3f1"];
        assert_moves(legal_moves_from(&mut board, side, "d3").into_iter(), expected);

        let expected = vec![
            "e1b1", "e1c1", "e1d1", "e1f1", "e1g1", "e1h1", "e1e2", "e1e3", "e1e4", "e1e5", "e1e6", "e1e7", "e1e8",
        ];
        assert_moves(legal_moves_from(&mut board, side, "e1").into_iter(), expected);
    }

    #[test]
    fn test_generate_castling_moves() {
        let (mut board, side) = board_from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_moves(legal_moves_from(&mut board, side, "e1").into_iter(), vec!["e1d1", "e1f1", "e1c1", "e1g1"]);

        // f1 is attacked by the bishop on c4, no kingside castling
        let (mut board, side) = board_from_fen("r3k2r/8/8/8/2b5/8/8/R3K2R w KQkq - 0 1");
        let moves = legal_moves_from(&mut board, side, "e1");
        assert!(!moves.iter().any(|m| m.as_algebraic() == "e1g1"));
        assert!(moves.iter().any(|m| m.as_algebraic() == "e1c1"));

        // no castling out of check
        let (mut board, side) = board_from_fen("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1");
        let moves = legal_moves_from(&mut board, side, "e1");
        assert!(!moves.iter().any(|m| m.as_algebraic() == "e1g1" || m.as_algebraic() == "e1c1"));

        // no rights
        let (mut board, side) = board_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert_moves(legal_moves_from(&mut board, side, "e1").into_iter(), vec!["e1d1", "e1d2", "e1e2", "e1f2", "e1f1"]);
    }

    #[test]
    fn test_if_field_is_attacked() {
        let (board, _) = board_from_fen("k7/2P5/8/8/8/8/3p4/7K w - - 0 1");
        // black pawn on d2 attacks c1 and e1
        assert!(board.is_square_attacked(field("c1"), Color::Black));
        assert!(!board.is_square_attacked(field("d1"), Color::Black));
        assert!(board.is_square_attacked(field("e1"), Color::Black));

        // white pawn on c7 attacks b8 and d8, but not c8
        assert!(board.is_square_attacked(field("b8"), Color::White));
        assert!(!board.is_square_attacked(field("c8"), Color::White));
        assert!(board.is_square_attacked(field("d8"), Color::White));
    }

    #[test]
    fn test_try_to_move_accepts_legal_move() {
        let mut board = ChessBoard::standard();
        let before = board.clone();
        let mv = board.try_to_move(id_at(&board, "e2"), field("e4"), Color::White).unwrap();
        assert_eq!(mv.kind, MoveKind::DoublePawnPush);
        assert_eq!(board, before);
    }

    #[test]
    fn test_try_to_move_rejects_opponent_piece() {
        let mut board = ChessBoard::standard();
        let pawn = id_at(&board, "e7");
        assert_matches!(
            board.try_to_move(pawn, field("e5"), Color::White),
            Err(MoveError::NotOwnPiece { side: Color::White, .. })
        );
    }

    #[test]
    fn test_try_to_move_rejects_blocked_path() {
        // the rook on a1 is blocked by its own pawn on a2
        let mut board = ChessBoard::standard();
        let rook = id_at(&board, "a1");
        assert_matches!(
            board.try_to_move(rook, field("a4"), Color::White),
            Err(MoveError::Unreachable { .. })
        );
    }

    #[test]
    fn test_try_to_move_rejects_unreachable_square() {
        let mut board = ChessBoard::standard();
        let knight = id_at(&board, "g1");
        assert_matches!(
            board.try_to_move(knight, field("g3"), Color::White),
            Err(MoveError::Unreachable { .. })
        );
        let pawn = id_at(&board, "d2");
        assert_matches!(
            board.try_to_move(pawn, field("d5"), Color::White),
            Err(MoveError::Unreachable { .. })
        );
    }

    #[test]
    fn test_try_to_move_rejects_own_occupied_destination() {
        let mut board = ChessBoard::standard();
        let knight = id_at(&board, "g1");
        assert_matches!(
            board.try_to_move(knight, field("e2"), Color::White),
            Err(MoveError::OccupiedByOwnPiece { side: Color::White, .. })
        );
    }

    #[test]
    fn test_try_to_move_rejects_self_check() {
        // the bishop on e2 is pinned by the rook on e8
        let (mut board, side) = board_from_fen("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1");
        let before = board.clone();
        let bishop = id_at(&board, "e2");
        assert_matches!(
            board.try_to_move(bishop, field("d3"), side),
            Err(MoveError::LeavesKingInCheck { side: Color::White, .. })
        );
        assert_eq!(board, before);

        // the king may not step onto an attacked square
        let king = id_at(&board, "e1");
        assert_eq!(board.try_to_move(king, field("f1"), side).unwrap().as_algebraic(), "e1f1");
        let (mut board, side) = board_from_fen("5rk1/8/8/8/8/8/8/4K3 w - - 0 1");
        let king = id_at(&board, "e1");
        assert_matches!(
            board.try_to_move(king, field("f2"), side),
            Err(MoveError::LeavesKingInCheck { .. })
        );
    }

    #[test]
    fn test_try_to_move_rejects_captured_piece() {
        let (mut board, side) = board_from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1");
        let queen = id_at(&board, "d5");
        let rook = id_at(&board, "d1");
        let mv = board.try_to_move(rook, field("d5"), side).unwrap();
        board.apply(mv);
        assert_matches!(
            board.try_to_move(queen, field("d1"), Color::Black),
            Err(MoveError::UnknownPiece(_))
        );
    }

    #[test]
    fn test_try_to_move_rejects_king_promotion() {
        let (mut board, side) = board_from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1");
        let pawn = id_at(&board, "a7");
        assert_matches!(
            board.try_to_move_promoting(pawn, field("a8"), side, PieceType::King),
            Err(MoveError::InvalidPromotion(PieceType::King))
        );
        let mv = board.try_to_move_promoting(pawn, field("a8"), side, PieceType::Knight).unwrap();
        assert_eq!(mv.kind, MoveKind::Promotion(PieceType::Knight));
    }

    #[test]
    fn test_en_passant_only_right_after_double_step() {
        let (mut board, _) = board_from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1");
        let mv = find_move(&mut board, Color::Black, "d7d5");
        board.apply(mv);
        assert!(legal_moves_from(&mut board, Color::White, "e5").iter().any(|m| m.kind == MoveKind::EnPassant));

        let mv = find_move(&mut board, Color::White, "e1e2");
        board.apply(mv);
        let mv = find_move(&mut board, Color::Black, "e8e7");
        board.apply(mv);
        assert!(!legal_moves_from(&mut board, Color::White, "e5").iter().any(|m| m.kind == MoveKind::EnPassant));
    }

    #[test]
    fn test_en_passant_never_takes_own_pawn() {
        let (mut board, side) = board_from_fen("4k3/8/8/8/3PP3/8/8/4K3 w - - 0 1");
        board.en_passant = Some(field("e5"));
        assert_moves(legal_moves_from(&mut board, side, "d4").into_iter(), vec!["d4d5"]);
        assert_matches!(
            board.try_to_move(id_at(&board, "d4"), field("e5"), side),
            Err(MoveError::Unreachable { .. })
        );
        assert_eq!(board.team(Color::White).pieces.len(), 3);
    }

    #[test]
    fn test_legal_moves_leave_board_unchanged() {
        let (mut board, side) = board_from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let before = board.clone();
        assert_eq!(board.legal_moves(side).len(), 48);
        assert_eq!(board, before);
    }
}
