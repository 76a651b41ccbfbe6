use super::{ChessBoard, ChessField, Color, PieceType};
use crate::error::BoardError;

pub const INITIAL_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn invalid(message: impl Into<String>) -> BoardError {
    BoardError::InvalidFen(message.into())
}

/// Parses a FEN string and sets up a ChessBoard.
///
/// Castling rights are expressed through move counters: a king or corner rook whose right is
/// missing gets a counter of 1. Halfmove clock and fullmove number are accepted but not kept.
pub fn from_fen(fen: &str) -> Result<(ChessBoard, Color), BoardError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if !(4..=6).contains(&parts.len()) {
        return Err(invalid("must have 4 to 6 parts"));
    }

    let rows: Vec<&str> = parts[0].split('/').collect();
    if rows.len() != 8 {
        return Err(invalid("expected 8 rows"));
    }

    let mut placements = Vec::with_capacity(32);
    for (row_index, row) in rows.iter().enumerate() {
        let mut col_index = 0;

        for c in row.chars() {
            if col_index > 7 {
                return Err(invalid(format!("too many squares in row {}", row_index)));
            }
            if let Some(skip) = c.to_digit(10) {
                col_index += skip as usize;
            } else {
                let kind = PieceType::from_char(c).ok_or_else(|| invalid(format!("invalid piece character {}", c)))?;
                let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
                placements.push((color, kind, ChessField::new(7 - row_index as u8, col_index as u8)));
                col_index += 1;
            }
        }
        if col_index != 8 {
            return Err(invalid(format!("row {} does not cover 8 squares", row_index)));
        }
    }

    // Setup order: each side from its home rank outwards, White first.
    placements.sort_by_key(|(color, _, field)| {
        (color.index(), (field.row as i8 - color.home_row() as i8).abs(), field.col)
    });
    let mut board = ChessBoard::new();
    for (color, kind, field) in placements {
        board.place(color, kind, field)?;
    }

    let side_to_move = match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        _ => return Err(invalid("invalid active color")),
    };

    let castling = parts[2];
    if castling != "-" && !castling.chars().all(|c| "KQkq".contains(c)) {
        return Err(invalid(format!("invalid castling rights {}", castling)));
    }
    apply_castling_rights(&mut board, castling);

    board.en_passant = match parts[3] {
        "-" => None,
        square => Some(validate_en_passant(&board, ChessField::from_algebraic(square)?, side_to_move)?),
    };

    for (index, name) in [(4, "halfmove clock"), (5, "fullmove number")] {
        if let Some(value) = parts.get(index) {
            value
                .parse::<u32>()
                .map_err(|_| invalid(format!("{} is not a valid number: {}", name, value)))?;
        }
    }

    board.finish_setup()?;
    Ok((board, side_to_move))
}

/// The square must be empty, on the third rank seen from the side that just moved, with that
/// side's pawn right behind it.
fn validate_en_passant(board: &ChessBoard, field: ChessField, side_to_move: Color) -> Result<ChessField, BoardError> {
    let expected_row = match side_to_move {
        Color::White => 5,
        Color::Black => 2,
    };
    if field.row != expected_row || board.piece_at(field).is_some() {
        return Err(invalid(format!("en passant square {} is not valid for {} to move", field, side_to_move)));
    }
    let pushed_pawn = field
        .offset(-side_to_move.pawn_direction(), 0)
        .and_then(|behind| board.piece_at(behind))
        .is_some_and(|p| p.color != side_to_move && p.kind == PieceType::Pawn);
    if !pushed_pawn {
        return Err(invalid(format!("no {} pawn next to en passant square {}", side_to_move.opposite(), field)));
    }
    Ok(field)
}

fn apply_castling_rights(board: &mut ChessBoard, castling: &str) {
    for color in [Color::White, Color::Black] {
        let (king_side, queen_side) = match color {
            Color::White => ('K', 'Q'),
            Color::Black => ('k', 'q'),
        };
        let home = color.home_row();
        let rights = [(7u8, castling.contains(king_side)), (0u8, castling.contains(queen_side))];

        for (col, allowed) in rights {
            if allowed {
                continue;
            }
            if let Some(rook) = board.piece_at(ChessField::new(home, col)).map(|p| (p.id, p.color, p.kind)) {
                if rook.1 == color && rook.2 == PieceType::Rook {
                    board.piece_mut(rook.0).move_counter = 1;
                }
            }
        }

        if !rights.iter().any(|(_, allowed)| *allowed) {
            if let Some(king) = board.piece_at(ChessField::new(home, 4)).map(|p| (p.id, p.color, p.kind)) {
                if king.1 == color && king.2 == PieceType::King {
                    board.piece_mut(king.0).move_counter = 1;
                }
            }
        }
    }
}

pub fn to_fen(board: &ChessBoard, side_to_move: Color) -> String {
    let mut board_representation = String::new();

    for rank in (0..8).rev() {
        let mut empty_count = 0;

        for file in 0..8 {
            match board.piece_at(ChessField::new(rank, file)) {
                Some(piece) => {
                    if empty_count > 0 {
                        board_representation.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    board_representation.push(piece.to_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            board_representation.push_str(&empty_count.to_string());
        }
        if rank > 0 {
            board_representation.push('/');
        }
    }

    let active_color = match side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };

    let mut castling = String::new();
    for (color, letters) in [(Color::White, ['K', 'Q']), (Color::Black, ['k', 'q'])] {
        for (col, letter) in [(7u8, letters[0]), (0u8, letters[1])] {
            if board.castling_available(color, col) {
                castling.push(letter);
            }
        }
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let en_passant = board.en_passant.map(|f| f.as_algebraic()).unwrap_or_else(|| "-".to_string());

    format!("{} {} {} {} 0 1", board_representation, active_color, castling, en_passant)
}
