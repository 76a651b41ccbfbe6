use crate::chess_board::{ChessBoard, Color, Move};
use crate::engines::{evaluate_board, root_moves, ChessEngine};
use crate::error::SearchError;
use log::debug;

const MIN_EVALUATION: i32 = i32::MIN + 1; // +1 is important because -MIN is not a i32 number

/// Negamax with fail-soft alpha-beta pruning.
///
/// Moves are searched in the same order as `MinMaxEngine` and the root only accepts strictly
/// better scores, so both engines return the same move and score for the same depth.
#[derive(Debug, Default)]
pub struct AlphaBetaEngine;

impl AlphaBetaEngine {
    pub fn new() -> Self {
        AlphaBetaEngine
    }
}

impl ChessEngine for AlphaBetaEngine {
    fn name(&self) -> &str {
        "alpha-beta"
    }

    fn find_best_move(
        &mut self,
        board: &mut ChessBoard,
        side_to_move: Color,
        depth: i32,
    ) -> Result<(Move, i32, u64), SearchError> {
        let moves = root_moves(board, side_to_move, depth)?;
        let hash_before = board.hash;

        let mut best_move = None;
        let mut best_score = i32::MIN;
        let mut node_count = 0;

        let mut alpha = MIN_EVALUATION;
        for mv in moves {
            let record = board.apply(mv);
            let score = -negamax(board, side_to_move.opposite(), depth - 1, MIN_EVALUATION, -alpha, &mut node_count);
            board.undo(record);

            if score > best_score {
                alpha = score;
                best_score = score;
                best_move = Some(mv);
            }
        }
        debug_assert_eq!(board.hash, hash_before);

        let mv = best_move.ok_or(SearchError::NoLegalMoves(side_to_move))?;
        debug!(
            "{} picked {} for {} at depth {}: score {} after {} nodes",
            self.name(),
            mv.as_algebraic(),
            side_to_move,
            depth,
            best_score,
            node_count
        );
        Ok((mv, best_score, node_count))
    }
}

fn negamax(board: &mut ChessBoard, side_to_move: Color, depth: i32, alpha: i32, beta: i32, node_count: &mut u64) -> i32 {
    *node_count += 1;
    if depth <= 0 {
        return evaluate_board(board, side_to_move);
    }

    let moves = board.legal_moves(side_to_move);
    if moves.is_empty() {
        return evaluate_board(board, side_to_move);
    }

    let mut alpha = alpha;
    let mut max_score = MIN_EVALUATION;
    for mv in moves {
        let record = board.apply(mv);
        let score = -negamax(board, side_to_move.opposite(), depth - 1, -beta, -alpha, node_count);
        board.undo(record);

        max_score = max_score.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            // Beta cutoff fail soft
            break;
        }
    }

    max_score
}
