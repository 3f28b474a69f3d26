use super::*;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

impl Board {
  pub fn new() -> Board {
    Board::default()
  }
  pub fn pieces(&self, piece: Piece) -> Bitboard {
    self.pieces[piece.index()]
  }
  pub fn occupancy(&self) -> Bitboard {
    self.pieces.iter().fold(Bitboard::EMPTY, |acc, &bb| acc | bb)
  }
  pub fn get_piece(&self, sq: Square) -> Option<Piece> {
    self.pieces
      .iter()
      .position(|bb| bb.contains(sq))
      .map(Piece::from_index)
  }
  pub fn set_piece(&mut self, sq: Square, piece: Piece) {
    self.clear(sq);
    let idx = piece.index();
    self.pieces[idx] = self.pieces[idx] | Bitboard::from_square(sq);
  }
  pub fn clear(&mut self, sq: Square) {
    let mask = !Bitboard::from_square(sq);
    for bb in self.pieces.iter_mut() {
      *bb = *bb & mask;
    }
  }
  /// Parses the piece placement field of a FEN string.
  pub fn from_placement(placement: &str) -> Result<Board, FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != BOARD_SIZE {
      return Err(FenError::RankCount(ranks.len()));
    }
    let mut board = Board::new();
    // FEN lists rank 8 first
    for (i, row) in ranks.iter().enumerate() {
      let rank = BOARD_SIZE - 1 - i;
      let mut file = 0;
      for c in row.chars() {
        if let Some(skip) = c.to_digit(10) {
          file += skip as usize;
          continue;
        }
        let piece = Piece::from_char(c).ok_or(FenError::Piece(c))?;
        if file >= BOARD_SIZE {
          return Err(FenError::RankLength { rank: rank + 1, files: file + 1 });
        }
        board.set_piece(Square((rank * BOARD_SIZE + file) as u8), piece);
        file += 1;
      }
      if file != BOARD_SIZE {
        return Err(FenError::RankLength { rank: rank + 1, files: file });
      }
    }
    Ok(board)
  }
  pub fn placement(&self) -> String {
    let mut out = String::new();
    for rank in (0..BOARD_SIZE).rev() {
      let mut empty = 0;
      for file in 0..BOARD_SIZE {
        match self.get_piece(Square((rank * BOARD_SIZE + file) as u8)) {
          Some(p) => {
            if empty > 0 {
              out.push_str(&empty.to_string());
              empty = 0;
            }
            out.push(p.to_char());
          },
          None => empty += 1,
        }
      }
      if empty > 0 {
        out.push_str(&empty.to_string());
      }
      if rank > 0 {
        out.push('/');
      }
    }
    out
  }
}

impl Position {
  pub fn startpos() -> Position {
    START_FEN.parse().expect("start position is valid FEN")
  }
  pub fn from_fen(fen: &str) -> Result<Position, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 2 {
      return Err(FenError::FieldCount(fields.len()));
    }
    let board = Board::from_placement(fields[0])?;
    let mut side = fields[1].chars();
    let color_to_move = match (side.next().and_then(Color::from_char), side.next()) {
      (Some(color), None) => color,
      _ => return Err(FenError::Color(fields[1].to_string())),
    };
    // castling and en passant (fields 2, 3) are not part of the encoding
    let counter = |idx: usize, default: u32| -> Result<u32, FenError> {
      match fields.get(idx) {
        Some(s) => s.parse().map_err(|_| FenError::Counter(s.to_string())),
        None => Ok(default),
      }
    };
    Ok(Position {
      board,
      color_to_move,
      halfmove_clock: counter(4, 0)?,
      move_number: counter(5, 1)?,
    })
  }
}

impl FromStr for Position {
  type Err = FenError;
  fn from_str(s: &str) -> Result<Position, FenError> {
    Position::from_fen(s)
  }
}

impl Display for Board {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let mut bstr = "".to_string();
    for rank in (0..BOARD_SIZE).rev() {
      bstr.push_str(&(rank + 1).to_string());
      for file in 0..BOARD_SIZE {
        match self.get_piece(Square((rank * BOARD_SIZE + file) as u8)) {
          Some(p) => bstr.push(p.to_char()),
          None => bstr.push('-'),
        }
      }
      bstr.push('\n');
    }
    bstr.push_str(" abcdefgh\n");
    write!(f, "{}", bstr)
  }
}
