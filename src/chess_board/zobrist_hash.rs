use super::{ChessBoard, ChessField, Color, Piece};
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::sync::Arc;

const BOARD_SIZE: usize = 8;

/// Zobrist keys for piece placement and the en passant file.
///
/// The side to move is not part of the board, so it is not hashed.
pub struct ZobristHash {
    piece_keys: [[[u64; BOARD_SIZE * BOARD_SIZE]; 6]; 2],
    en_passant_keys: [u64; BOARD_SIZE],
}

impl ZobristHash {
    fn new(seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);

        let mut piece_keys = [[[0; BOARD_SIZE * BOARD_SIZE]; 6]; 2];
        for color_keys in &mut piece_keys {
            for piece_type_keys in color_keys {
                for square_key in piece_type_keys {
                    *square_key = rng.gen();
                }
            }
        }

        let mut en_passant_keys = [0; BOARD_SIZE];
        for file in &mut en_passant_keys {
            *file = rng.gen();
        }

        ZobristHash {
            piece_keys,
            en_passant_keys,
        }
    }

    pub fn calculate_hash(&self, board: &ChessBoard) -> u64 {
        let mut hash = 0;

        for color in [Color::White, Color::Black] {
            for piece in board.active_pieces(color) {
                hash = self.update_piece(hash, piece, piece.field);
            }
        }

        self.update_en_passant(hash, board.en_passant)
    }

    /// Toggles `piece` (its color and current kind) on `field`.
    pub fn update_piece(&self, hash: u64, piece: &Piece, field: ChessField) -> u64 {
        hash ^ self.piece_keys[piece.color.index()][piece.kind.index()][field.index()]
    }

    pub fn update_en_passant(&self, hash: u64, en_passant: Option<ChessField>) -> u64 {
        match en_passant {
            Some(field) => hash ^ self.en_passant_keys[field.col as usize],
            None => hash,
        }
    }
}

lazy_static! {
    pub static ref ZOBRIST: Arc<ZobristHash> = Arc::new(ZobristHash::new(42));
}
