use crate::chess_board::{ChessBoard, Color, Move};
use crate::error::SearchError;

pub mod engine_alpha_beta;
pub mod engine_minmax;

pub use engine_alpha_beta::AlphaBetaEngine;
pub use engine_minmax::MinMaxEngine;

/// A fixed-depth search bot.
///
/// `find_best_move` explores the legal move tree of `side_to_move` through apply/undo pairs and
/// returns the chosen move, its score from the mover's perspective and the number of visited
/// nodes. The board is identical before and after the call.
pub trait ChessEngine {
    fn name(&self) -> &str;
    fn find_best_move(
        &mut self,
        board: &mut ChessBoard,
        side_to_move: Color,
        depth: i32,
    ) -> Result<(Move, i32, u64), SearchError>;
}

/// Leaf evaluation: material of `side` minus material of its opponent.
pub fn evaluate_board(board: &ChessBoard, side: Color) -> i32 {
    board.material(side) - board.material(side.opposite())
}

/// Best move for `side_to_move` at a fixed depth, using alpha-beta pruning.
pub fn best_move(board: &mut ChessBoard, side_to_move: Color, depth: i32) -> Result<Move, SearchError> {
    AlphaBetaEngine::new()
        .find_best_move(board, side_to_move, depth)
        .map(|(mv, _, _)| mv)
}

/// Root preconditions shared by the engines: positive depth and at least one legal move.
fn root_moves(board: &mut ChessBoard, side_to_move: Color, depth: i32) -> Result<Vec<Move>, SearchError> {
    if depth <= 0 {
        return Err(SearchError::InvalidDepth(depth));
    }
    let moves = board.legal_moves(side_to_move);
    if moves.is_empty() {
        return Err(SearchError::NoLegalMoves(side_to_move));
    }
    Ok(moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_board::fen::INITIAL_POSITION;
    use crate::chess_board::test_utils::board_from_fen;
    use assert_matches::assert_matches;

    const POSITIONS: [&str; 6] = [
        INITIAL_POSITION,
        "4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "4k1nr/2p3p1/b2pPp1p/8/1nN1P1P1/p1R2N2/PR3P2/5K2 b k - 1 26",
        "1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1",
    ];

    #[test]
    fn test_evaluate_board() {
        let (board, _) = board_from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1");
        assert_eq!(evaluate_board(&board, Color::White), -4);
        assert_eq!(evaluate_board(&board, Color::Black), 4);
        assert_eq!(evaluate_board(&ChessBoard::standard(), Color::White), 0);
    }

    #[test]
    fn test_depth_one_takes_undefended_queen() {
        let (mut board, side) = board_from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1");
        let mv = best_move(&mut board, side, 1).unwrap();
        assert_eq!(mv.as_algebraic(), "d1d5");
    }

    #[test]
    fn test_engines_agree() {
        for fen in POSITIONS {
            for depth in 1..=3 {
                let (mut board, side) = board_from_fen(fen);
                let before = board.clone();
                let (mm_move, mm_score, mm_nodes) = MinMaxEngine::new().find_best_move(&mut board, side, depth).unwrap();
                assert_eq!(board, before);
                let (ab_move, ab_score, ab_nodes) =
                    AlphaBetaEngine::new().find_best_move(&mut board, side, depth).unwrap();
                assert_eq!(board, before);

                assert_eq!(mm_move, ab_move, "{} depth {}", fen, depth);
                assert_eq!(mm_score, ab_score, "{} depth {}", fen, depth);
                assert!(ab_nodes <= mm_nodes, "{} depth {}", fen, depth);
            }
        }
    }

    #[test]
    fn test_precondition_violations() {
        let mut board = ChessBoard::standard();
        assert_matches!(best_move(&mut board, Color::White, 0), Err(SearchError::InvalidDepth(0)));
        assert_matches!(
            MinMaxEngine::new().find_best_move(&mut board, Color::White, -2),
            Err(SearchError::InvalidDepth(-2))
        );

        let (mut board, side) = board_from_fen("k6q/8/8/8/8/8/6P1/6RK w - - 0 1");
        assert_matches!(best_move(&mut board, side, 2), Err(SearchError::NoLegalMoves(Color::White)));
        let (mut board, side) = board_from_fen("1k6/8/8/8/8/1r6/7r/K7 w - - 0 1");
        assert_matches!(
            MinMaxEngine::new().find_best_move(&mut board, side, 1),
            Err(SearchError::NoLegalMoves(Color::White))
        );
    }
}
