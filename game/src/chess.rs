pub mod bitboard;
pub mod board;
pub mod input;
pub mod policy;
pub mod square;

use thiserror::Error;

pub const BOARD_SIZE: usize = 8;
pub const SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
pub const ACTION_SIZE: usize = SQUARES * SQUARES;

// per square: 15 header bits, then HISTORY_FRAMES frames of FRAME_BITS
pub const HEADER_BITS: usize = 15;
pub const MOVE_NUMBER_BITS: usize = 9;
pub const HALFMOVE_BITS: usize = 6;
pub const FRAME_BITS: usize = 14;
pub const HISTORY_FRAMES: usize = 5;
pub const SQUARE_BITS: usize = HEADER_BITS + FRAME_BITS * HISTORY_FRAMES;
pub const FRAME_SIZE: usize = SQUARES * SQUARE_BITS;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Color {
  White = 0,
  Black = 1
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum PieceType {
  Pawn = 0,
  Bishop = 1,
  Knight = 2,
  Rook = 3,
  Queen = 4,
  King = 5,
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct Piece {
  pub color: Color,
  pub kind: PieceType,
}

/// Square index `rank * 8 + file`, a1 is 0 and h8 is 63.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Square(u8);

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct Move {
  pub src: Square,
  pub dst: Square,
}

#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct Bitboard(pub u64);

/// Piece placement, one bitboard per (color, piece type).
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct Board {
  pieces: [Bitboard; 12],
}

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Position {
  pub board: Board,
  pub color_to_move: Color,
  pub halfmove_clock: u32,
  pub move_number: u32,
}

/// Batched network input: the board planes and the legal move mask for up to
/// `max_batches` positions, laid out as one contiguous block each.
pub struct Input {
  max_batches: usize,
  input_board: Vec<f32>,
  input_lmm: Vec<f32>,
  // [batch][ply] -> oldest frame bits pushed out of the window, per square
  hist_frames: Vec<Vec<Vec<[f32; FRAME_BITS]>>>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SquareError {
  #[error("invalid square `{0}`")]
  Invalid(String),
  #[error("square index {0} out of range")]
  OutOfRange(usize),
}

#[derive(Debug, Error, PartialEq)]
pub enum MoveError {
  #[error("invalid move `{0}`")]
  Invalid(String),
  #[error("action index {0} out of range")]
  OutOfRange(usize),
  #[error(transparent)]
  Square(#[from] SquareError),
}

#[derive(Debug, Error, PartialEq)]
pub enum FenError {
  #[error("expected at least 2 fields, got {0}")]
  FieldCount(usize),
  #[error("expected 8 ranks, got {0}")]
  RankCount(usize),
  #[error("rank {rank} describes {files} files")]
  RankLength { rank: usize, files: usize },
  #[error("invalid piece `{0}`")]
  Piece(char),
  #[error("invalid side to move `{0}`")]
  Color(String),
  #[error("invalid counter `{0}`")]
  Counter(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
  #[error("batch {batch} out of range (max {max})")]
  BatchOutOfRange { batch: usize, max: usize },
  #[error("no pushed frame to pop for batch {0}")]
  EmptyHistory(usize),
}
