use nc0_game::*;

fn sq(s: &str) -> Square {
  s.parse().unwrap()
}

fn bit(input: &Input, batch: usize, cell: &str, idx: usize) -> f32 {
  input.batch_board(batch).unwrap()[sq(cell).index() * SQUARE_BITS + idx]
}

#[cfg(test)]
mod input {
  use super::*;

  #[test]
  fn layout_sizes() {
    assert_eq!(SQUARE_BITS, 85);
    assert_eq!(FRAME_SIZE, 8 * 8 * 85);
    assert_eq!(ACTION_SIZE, 4096);
    let input = Input::new(3);
    assert_eq!(input.board_input().len(), 3 * 5440);
    assert_eq!(input.lmm_input().len(), 3 * 4096);
  }
  #[test]
  fn white_pov_pieces() {
    let pos = Position::startpos();
    let mut input = Input::new(1);
    input.write_frame(0, &pos.board, Color::White, 0, 1, 0).unwrap();
    // own king, own rook
    assert_eq!(bit(&input, 0, "e1", HEADER_BITS + PieceType::King as usize), 1.0);
    assert_eq!(bit(&input, 0, "a1", HEADER_BITS + PieceType::Rook as usize), 1.0);
    // opponent pieces live 6 bits further
    assert_eq!(bit(&input, 0, "e8", HEADER_BITS + 6 + PieceType::King as usize), 1.0);
    assert_eq!(bit(&input, 0, "e8", HEADER_BITS + PieceType::King as usize), 0.0);
    let ones: f32 = input.board_input()
      .chunks(SQUARE_BITS)
      .map(|s| s[HEADER_BITS..HEADER_BITS + 12].iter().sum::<f32>())
      .sum();
    assert_eq!(ones, 32.0);
  }
  #[test]
  fn black_pov_is_rotated() {
    let pos = Position::startpos();
    let mut input = Input::new(1);
    input.write_frame(0, &pos.board, Color::Black, 0, 1, 0).unwrap();
    // black king on e8 shows up on d1 as an own piece
    assert_eq!(bit(&input, 0, "d1", HEADER_BITS + PieceType::King as usize), 1.0);
    // white king on e1 shows up on d8 as an opponent piece
    assert_eq!(bit(&input, 0, "d8", HEADER_BITS + 6 + PieceType::King as usize), 1.0);
  }
  #[test]
  fn header_bits() {
    let board = Board::new();
    let mut input = Input::new(1);
    input.write_frame(0, &board, Color::White, 2, 0b101, 0b11).unwrap();
    for cell in &["a1", "h8", "d5"] {
      let expect = [1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0];
      for (i, e) in expect.iter().enumerate() {
        assert_eq!(bit(&input, 0, cell, i), *e, "{} header bit {}", cell, i);
      }
      // reps = 2
      assert_eq!(bit(&input, 0, cell, HEADER_BITS + 12), 0.0);
      assert_eq!(bit(&input, 0, cell, HEADER_BITS + 13), 1.0);
    }
  }
  #[test]
  fn push_pop_roundtrip() {
    let start = Position::startpos();
    let next: Position = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1".parse().unwrap();
    let mut input = Input::new(2);
    input.write_frame(1, &start.board, Color::White, 0, 1, 0).unwrap();
    let snapshot = input.board_input().to_vec();

    input.push_frame(1).unwrap();
    // previous position moved one frame back, current slot is empty
    assert_eq!(bit(&input, 1, "e2", HEADER_BITS + FRAME_BITS), 1.0);
    assert_eq!(bit(&input, 1, "e2", HEADER_BITS), 0.0);
    input.write_frame(1, &next.board, Color::White, 0, 1, 0).unwrap();
    assert_eq!(bit(&input, 1, "e4", HEADER_BITS), 1.0);
    assert_eq!(input.history_len(1).unwrap(), 1);

    input.pop_frame(1).unwrap();
    assert_eq!(input.board_input(), &snapshot[..]);
    assert_eq!(input.pop_frame(1), Err(InputError::EmptyHistory(1)));
  }
  #[test]
  fn oldest_frame_restored() {
    let pos = Position::startpos();
    let mut input = Input::new(1);
    input.write_frame(0, &pos.board, Color::White, 0, 1, 0).unwrap();
    for _ in 0..HISTORY_FRAMES - 1 {
      input.push_frame(0).unwrap();
    }
    let rook = HEADER_BITS + FRAME_BITS * (HISTORY_FRAMES - 1) + PieceType::Rook as usize;
    assert_eq!(bit(&input, 0, "a1", rook), 1.0);
    input.push_frame(0).unwrap();
    assert_eq!(bit(&input, 0, "a1", rook), 0.0);
    input.pop_frame(0).unwrap();
    assert_eq!(bit(&input, 0, "a1", rook), 1.0);
  }
  #[test]
  fn legal_move_mask() {
    let mut input = Input::new(2);
    let moves: Vec<Move> = vec!["e2e4".parse().unwrap(), "g1f3".parse().unwrap()];
    input.write_legal_moves(1, &moves).unwrap();
    let lmm = input.batch_lmm(1).unwrap();
    assert_eq!(lmm[12 * 64 + 28], 1.0);
    assert_eq!(lmm.iter().sum::<f32>(), 2.0);
    assert_eq!(input.batch_lmm(0).unwrap().iter().sum::<f32>(), 0.0);
    input.clear_lmm(1).unwrap();
    assert_eq!(input.lmm_input().iter().sum::<f32>(), 0.0);
  }
  #[test]
  fn batch_out_of_range() {
    let mut input = Input::new(1);
    let board = Board::new();
    assert_eq!(
      input.write_frame(1, &board, Color::White, 0, 1, 0),
      Err(InputError::BatchOutOfRange { batch: 1, max: 1 })
    );
    assert!(input.push_frame(4).is_err());
    assert!(input.write_lmm(2, "e2e4".parse().unwrap()).is_err());
  }
}
