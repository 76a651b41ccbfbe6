use crate::chess_board::{ChessBoard, Color, Move};
use crate::engines::{evaluate_board, root_moves, ChessEngine};
use crate::error::SearchError;
use log::debug;

/// Plain negamax over the full legal move tree.
#[derive(Debug, Default)]
pub struct MinMaxEngine;

impl MinMaxEngine {
    pub fn new() -> Self {
        MinMaxEngine
    }
}

impl ChessEngine for MinMaxEngine {
    fn name(&self) -> &str {
        "minimax"
    }

    fn find_best_move(
        &mut self,
        board: &mut ChessBoard,
        side_to_move: Color,
        depth: i32,
    ) -> Result<(Move, i32, u64), SearchError> {
        let moves = root_moves(board, side_to_move, depth)?;
        let hash_before = board.hash;

        let mut best: Option<(Move, i32)> = None;
        let mut node_count = 0;

        for mv in moves {
            let record = board.apply(mv);
            // Negamax for the opponent's position (invert the returned evaluation)
            let score = -negamax(board, side_to_move.opposite(), depth - 1, &mut node_count);
            board.undo(record);

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }
        debug_assert_eq!(board.hash, hash_before);

        let (mv, score) = best.ok_or(SearchError::NoLegalMoves(side_to_move))?;
        debug!(
            "{} picked {} for {} at depth {}: score {} after {} nodes",
            self.name(),
            mv.as_algebraic(),
            side_to_move,
            depth,
            score,
            node_count
        );
        Ok((mv, score, node_count))
    }
}

fn negamax(board: &mut ChessBoard, side_to_move: Color, depth: i32, node_count: &mut u64) -> i32 {
    *node_count += 1;
    if depth <= 0 {
        return evaluate_board(board, side_to_move);
    }

    let moves = board.legal_moves(side_to_move);
    if moves.is_empty() {
        // no mate score, a terminal position is scored by material like any leaf
        return evaluate_board(board, side_to_move);
    }

    let mut max_score = i32::MIN;
    for mv in moves {
        let record = board.apply(mv);
        let score = -negamax(board, side_to_move.opposite(), depth - 1, node_count);
        board.undo(record);
        max_score = max_score.max(score);
    }
    max_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_board::test_utils::board_from_fen;

    #[test]
    fn test_some_positions() {
        // both pawn pushes lose the pawn to d5, the king moves keep the balance
        let (mut board, side) = board_from_fen("4k3/4p3/8/3P4/8/8/8/4K3 b - - 0 1");
        let (_, score, nodes) = MinMaxEngine::new().find_best_move(&mut board, side, 2).unwrap();
        assert_eq!(score, 0);
        assert!(nodes > 0);

        // the knight on c5 is hanging to the bishop
        let (mut board, side) = board_from_fen("4k3/8/8/2n5/8/4B3/8/4K3 w - - 0 1");
        let (best_move, score, _) = MinMaxEngine::new().find_best_move(&mut board, side, 1).unwrap();
        assert_eq!(best_move.as_algebraic(), "e3c5");
        assert_eq!(score, 3);
    }

    #[test]
    fn test_sees_recapture_at_depth_two() {
        // the pawn on c7 guards d6, so Qxd6 only looks good at depth one
        let (mut board, side) = board_from_fen("4k3/2p5/3p4/8/8/8/8/3QK3 w - - 0 1");
        let (depth_one, score_one, _) = MinMaxEngine::new().find_best_move(&mut board, side, 1).unwrap();
        assert_eq!(depth_one.as_algebraic(), "d1d6");
        assert_eq!(score_one, 8);

        let (depth_two, score_two, _) = MinMaxEngine::new().find_best_move(&mut board, side, 2).unwrap();
        assert_ne!(depth_two.as_algebraic(), "d1d6");
        assert_eq!(score_two, 7);
    }

    #[test]
    fn test_first_of_equal_moves_wins() {
        let mut board = ChessBoard::standard();
        let first_legal = board.legal_moves(Color::White)[0];
        let (mv, score, nodes) = MinMaxEngine::new().find_best_move(&mut board, Color::White, 1).unwrap();
        assert_eq!(mv, first_legal);
        assert_eq!(score, 0);
        assert_eq!(nodes, 20);
    }
}
