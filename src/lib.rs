pub mod chess_board;
pub mod engines;
pub mod error;
pub mod session;
