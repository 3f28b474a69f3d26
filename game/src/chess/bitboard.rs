use super::*;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::{Not};
use auto_ops::impl_op;

impl Bitboard {
  pub const EMPTY: Bitboard = Bitboard(0);

  pub fn from_square(sq: Square) -> Bitboard {
    Bitboard(1 << sq.index())
  }
  pub fn contains(&self, sq: Square) -> bool {
    self.0 >> sq.index() & 1 == 1
  }
  pub fn count_ones(&self) -> u32 {
    self.0.count_ones()
  }
  pub fn is_empty(&self) -> bool {
    self.0 == 0
  }
  // rank 1 <-> rank 8
  pub fn flip_vert(&self) -> Bitboard {
    Bitboard(self.0.swap_bytes())
  }
  // a1 <-> h8
  pub fn rotate(&self) -> Bitboard {
    Bitboard(self.0.reverse_bits())
  }
  pub fn squares(&self) -> impl Iterator<Item = Square> {
    let mut x = self.0;
    std::iter::from_fn(move || {
      if x == 0 {
        return None;
      }
      let sq = Square(x.trailing_zeros() as u8);
      x &= x - 1; // remove lowest bit
      Some(sq)
    })
  }
}

macro_rules! add_op {
  ($opr:tt) => {
    impl_op!($opr |a: Bitboard, b: usize| -> Bitboard { Bitboard(a.0 $opr b) });
  };
}
macro_rules! add_op_board {
  ($opr:tt) => {
    impl_op!($opr |a: Bitboard, b: Bitboard| -> Bitboard { Bitboard(a.0 $opr b.0) });
  };
}

add_op!(>>);
add_op!(<<);
add_op_board!(&);
add_op_board!(|);
add_op_board!(^);

impl Not for Bitboard {
  type Output = Bitboard;
  fn not(self) -> Bitboard {
    Bitboard(!self.0)
  }
}

impl Display for Bitboard {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let mut bstr = "".to_string();
    for rank in (0..BOARD_SIZE).rev() {
      for file in 0..BOARD_SIZE {
        if self.0 >> (rank * BOARD_SIZE + file) & 1 == 1 {
          bstr.push('o');
        } else {
          bstr.push('-');
        }
      }
      bstr.push('\n');
    }
    write!(f, "{}", bstr)
  }
}
