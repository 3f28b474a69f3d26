use super::*;
use std::convert::TryFrom;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

impl Color {
  pub fn rev(&self) -> Color {
    match self {
      Color::White => Color::Black,
      Color::Black => Color::White
    }
  }
  pub fn from_char(c: char) -> Option<Color> {
    match c {
      'w' => Some(Color::White),
      'b' => Some(Color::Black),
      _ => None,
    }
  }
  pub fn to_char(&self) -> char {
    match self {
      Color::White => 'w',
      Color::Black => 'b',
    }
  }
}

impl PieceType {
  pub const ALL: [PieceType; 6] = [
    PieceType::Pawn,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
    PieceType::Queen,
    PieceType::King,
  ];
  pub fn from_char(c: char) -> Option<PieceType> {
    match c.to_ascii_lowercase() {
      'p' => Some(PieceType::Pawn),
      'b' => Some(PieceType::Bishop),
      'n' => Some(PieceType::Knight),
      'r' => Some(PieceType::Rook),
      'q' => Some(PieceType::Queen),
      'k' => Some(PieceType::King),
      _ => None,
    }
  }
  pub fn to_char(&self) -> char {
    "pbnrqk".as_bytes()[*self as usize] as char
  }
}

impl Piece {
  pub fn new(color: Color, kind: PieceType) -> Piece {
    Piece { color, kind }
  }
  /// FEN letter: uppercase is white, lowercase is black.
  pub fn from_char(c: char) -> Option<Piece> {
    let kind = PieceType::from_char(c)?;
    let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
    Some(Piece::new(color, kind))
  }
  pub fn to_char(&self) -> char {
    let c = self.kind.to_char();
    match self.color {
      Color::White => c.to_ascii_uppercase(),
      Color::Black => c,
    }
  }
  // bitboard slot inside Board
  pub(crate) fn index(&self) -> usize {
    self.kind as usize * 2 + self.color as usize
  }
  pub(crate) fn from_index(index: usize) -> Piece {
    let color = if index & 1 == 0 { Color::White } else { Color::Black };
    Piece::new(color, PieceType::ALL[index >> 1])
  }
}

impl Square {
  pub fn new(index: usize) -> Result<Square, SquareError> {
    if index >= SQUARES {
      return Err(SquareError::OutOfRange(index));
    }
    Ok(Square(index as u8))
  }
  pub fn at(rank: usize, file: usize) -> Result<Square, SquareError> {
    if rank >= BOARD_SIZE || file >= BOARD_SIZE {
      return Err(SquareError::Invalid(format!("rank {} file {}", rank, file)));
    }
    Ok(Square((rank * BOARD_SIZE + file) as u8))
  }
  pub fn index(&self) -> usize {
    self.0 as usize
  }
  pub fn rank(&self) -> usize {
    self.index() / BOARD_SIZE
  }
  pub fn file(&self) -> usize {
    self.index() % BOARD_SIZE
  }
  /// Same square seen from the other side of the board.
  pub fn rotate(&self) -> Square {
    Square((SQUARES - 1) as u8 - self.0)
  }
  pub fn all() -> impl Iterator<Item = Square> {
    (0..SQUARES as u8).map(Square)
  }
}

impl FromStr for Square {
  type Err = SquareError;
  fn from_str(s: &str) -> Result<Square, SquareError> {
    let b = s.as_bytes();
    if b.len() != 2 || !(b'a'..=b'h').contains(&b[0]) || !(b'1'..=b'8').contains(&b[1]) {
      return Err(SquareError::Invalid(s.to_string()));
    }
    Square::at((b[1] - b'1') as usize, (b[0] - b'a') as usize)
  }
}

impl Display for Square {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}{}", (b'a' + self.file() as u8) as char, self.rank() + 1)
  }
}

impl Move {
  pub fn new(src: Square, dst: Square) -> Move {
    Move { src, dst }
  }
  /// Position of the move in the policy output and legal move mask.
  pub fn index(&self) -> usize {
    self.src.index() * SQUARES + self.dst.index()
  }
  pub fn from_index(index: usize) -> Result<Move, MoveError> {
    if index >= ACTION_SIZE {
      return Err(MoveError::OutOfRange(index));
    }
    Ok(Move::new(Square::new(index / SQUARES)?, Square::new(index % SQUARES)?))
  }
}

impl TryFrom<usize> for Move {
  type Error = MoveError;
  fn try_from(index: usize) -> Result<Move, MoveError> {
    Move::from_index(index)
  }
}

impl FromStr for Move {
  type Err = MoveError;
  // promotion suffix is accepted but the action space has no room for it
  fn from_str(s: &str) -> Result<Move, MoveError> {
    if !s.is_ascii() || (s.len() != 4 && s.len() != 5) {
      return Err(MoveError::Invalid(s.to_string()));
    }
    if s.len() == 5 && PieceType::from_char(s.as_bytes()[4] as char).is_none() {
      return Err(MoveError::Invalid(s.to_string()));
    }
    Ok(Move::new(s[0..2].parse()?, s[2..4].parse()?))
  }
}

impl Display for Move {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}{}", self.src, self.dst)
  }
}
