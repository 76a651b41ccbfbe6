use super::{ChessBoard, Color};

/// Counts the leaf nodes of the legal move tree to `depth` plies.
pub fn perft(board: &mut ChessBoard, side_to_move: Color, depth: u8) -> u64 {
    if depth == 0 {
        return 1u64;
    }

    let mut node_count = 0u64;
    for mv in board.legal_moves(side_to_move) {
        let record = board.apply(mv);
        node_count += perft(board, side_to_move.opposite(), depth - 1);
        board.undo(record);
    }
    node_count
}

/// Leaf counts per root move, sorted by move text.
pub fn perft_divide(board: &mut ChessBoard, side_to_move: Color, depth: u8) -> Vec<(String, u64)> {
    let mut result_moves = Vec::new();
    for mv in board.legal_moves(side_to_move) {
        let record = board.apply(mv);
        let count = perft(board, side_to_move.opposite(), depth.saturating_sub(1));
        board.undo(record);
        result_moves.push((mv.as_algebraic(), count));
    }
    result_moves.sort();
    result_moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_board::fen::INITIAL_POSITION;
    use crate::chess_board::test_utils::board_from_fen;

    #[test]
    fn test_perft() {
        let (mut board, side) = board_from_fen(INITIAL_POSITION);
        let before = board.clone();
        assert_eq!(perft(&mut board, side, 1), 20u64);
        assert_eq!(perft(&mut board, side, 2), 400u64);
        assert_eq!(perft(&mut board, side, 3), 8902u64);
        assert_eq!(board, before);
    }

    #[test]
    fn test_perft2() {
        let (mut board, side) =
            board_from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        assert_eq!(perft(&mut board, side, 1), 48);
        assert_eq!(perft(&mut board, side, 2), 2039);
    }

    #[test]
    fn test_perft3() {
        let (mut board, side) = board_from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        assert_eq!(perft(&mut board, side, 1), 14);
        assert_eq!(perft(&mut board, side, 2), 191);
        assert_eq!(perft(&mut board, side, 3), 2812);
    }

    #[test]
    fn test_perft_divide_sums_to_perft() {
        let (mut board, side) = board_from_fen(INITIAL_POSITION);
        let divided = perft_divide(&mut board, side, 2);
        assert_eq!(divided.len(), 20);
        assert!(divided.iter().all(|(_, count)| *count == 20));
        assert_eq!(divided.iter().map(|(_, c)| c).sum::<u64>(), perft(&mut board, side, 2));
    }
}
