use super::{ChessBoard, ChessField, Color, Move};

pub fn assert_moves<I: Iterator<Item = Move>>(generated: I, mut expected: Vec<&str>) {
    let mut generated_converted: Vec<_> = generated.map(|m| m.as_algebraic()).collect();
    generated_converted.sort();
    expected.sort();

    assert_eq!(generated_converted, expected);
}

pub fn board_from_fen(fen: &str) -> (ChessBoard, Color) {
    ChessBoard::from_fen(fen).unwrap_or_else(|e| panic!("invalid test position {}: {}", fen, e))
}

/// Legal moves of the piece standing on `square`.
pub fn legal_moves_from(board: &mut ChessBoard, side: Color, square: &str) -> Vec<Move> {
    let from = ChessField::from_algebraic(square).unwrap();
    board.legal_moves(side).into_iter().filter(|m| m.from == from).collect()
}

/// Looks up a legal move by its algebraic text, panicking when it is not legal.
pub fn find_move(board: &mut ChessBoard, side: Color, algebraic: &str) -> Move {
    board
        .legal_moves(side)
        .into_iter()
        .find(|m| m.as_algebraic() == algebraic)
        .unwrap_or_else(|| panic!("{} is not legal for {} in {}", algebraic, side, board.to_fen(side)))
}
