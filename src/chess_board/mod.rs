pub mod fen;
pub mod zobrist_hash;
pub use zobrist_hash::ZobristHash;
pub use zobrist_hash::ZOBRIST;
pub mod model;
pub use model::{ChessField, Color, Move, MoveKind, MoveRequest, Piece, PieceId, PieceType};
pub mod team;
pub use team::{get_piece_value, score_difference, Team};

mod chess_board;
mod game_end;
mod move_generation;
pub mod perft;
#[cfg(test)]
pub mod test_utils;
pub use chess_board::{ChessBoard, MoveRecord};
pub use game_end::GameStatus;
pub use perft::perft;
