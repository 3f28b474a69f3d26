use super::*;

const LAST_FRAME: usize = HEADER_BITS + FRAME_BITS * (HISTORY_FRAMES - 1);

fn cell_offset(batch: usize, cell: Square) -> usize {
  batch * FRAME_SIZE + cell.index() * SQUARE_BITS
}

impl Input {
  pub fn new(max_batches: usize) -> Input {
    Input {
      max_batches,
      input_board: vec![0.0; max_batches * FRAME_SIZE],
      input_lmm: vec![0.0; max_batches * ACTION_SIZE],
      hist_frames: vec![Vec::new(); max_batches],
    }
  }
  pub fn max_batches(&self) -> usize {
    self.max_batches
  }
  fn check(&self, batch: usize) -> Result<(), InputError> {
    if batch >= self.max_batches {
      return Err(InputError::BatchOutOfRange { batch, max: self.max_batches });
    }
    Ok(())
  }
  /// Writes the header and the most recent frame of every square.
  /// Older frames are left alone, call `push_frame` first to keep them.
  pub fn write_frame(&mut self, batch: usize, board: &Board, pov: Color, reps: u32, move_number: u32, halfmove_clock: u32) -> Result<(), InputError> {
    self.check(batch)?;
    let reps = reps.min(3);
    let rb1 = (reps & 1) as f32;
    let rb2 = (reps >> 1) as f32;

    let mut header = [0.0f32; HEADER_BITS];
    for i in 0..MOVE_NUMBER_BITS {
      header[i] = ((move_number >> i) & 1) as f32;
    }
    for i in 0..HALFMOVE_BITS {
      header[MOVE_NUMBER_BITS + i] = ((halfmove_clock >> i) & 1) as f32;
    }

    for sq in Square::all() {
      // black sees the board rotated
      let cell = match pov {
        Color::White => sq,
        Color::Black => sq.rotate(),
      };
      let offset = cell_offset(batch, cell);
      let square = &mut self.input_board[offset..offset + SQUARE_BITS];
      square[..HEADER_BITS].copy_from_slice(&header);
      let frame = &mut square[HEADER_BITS..HEADER_BITS + FRAME_BITS];
      for bit in frame.iter_mut() {
        *bit = 0.0;
      }
      if let Some(p) = board.get_piece(sq) {
        frame[6 * (p.color as usize ^ pov as usize) + p.kind as usize] = 1.0;
      }
      frame[12] = rb1;
      frame[13] = rb2;
    }
    Ok(())
  }
  /// Ages the history window by one ply and zeroes the most recent frame.
  pub fn push_frame(&mut self, batch: usize) -> Result<(), InputError> {
    self.check(batch)?;
    let mut dropped = Vec::with_capacity(SQUARES);
    for cell in Square::all() {
      let offset = cell_offset(batch, cell);
      let square = &mut self.input_board[offset..offset + SQUARE_BITS];
      let mut bits = [0.0f32; FRAME_BITS];
      bits.copy_from_slice(&square[LAST_FRAME..]);
      dropped.push(bits);
      square.copy_within(HEADER_BITS..LAST_FRAME, HEADER_BITS + FRAME_BITS);
      for bit in square[HEADER_BITS..HEADER_BITS + FRAME_BITS].iter_mut() {
        *bit = 0.0;
      }
    }
    self.hist_frames[batch].push(dropped);
    Ok(())
  }
  /// Reverts the last `push_frame`, restoring the frame it pushed out.
  pub fn pop_frame(&mut self, batch: usize) -> Result<(), InputError> {
    self.check(batch)?;
    let dropped = self.hist_frames[batch].pop().ok_or(InputError::EmptyHistory(batch))?;
    for (cell, bits) in Square::all().zip(dropped.iter()) {
      let offset = cell_offset(batch, cell);
      let square = &mut self.input_board[offset..offset + SQUARE_BITS];
      square.copy_within(HEADER_BITS + FRAME_BITS.., HEADER_BITS);
      square[LAST_FRAME..].copy_from_slice(bits);
    }
    Ok(())
  }
  pub fn history_len(&self, batch: usize) -> Result<usize, InputError> {
    self.check(batch)?;
    Ok(self.hist_frames[batch].len())
  }
  pub fn clear_lmm(&mut self, batch: usize) -> Result<(), InputError> {
    self.check(batch)?;
    for v in self.input_lmm[batch * ACTION_SIZE..(batch + 1) * ACTION_SIZE].iter_mut() {
      *v = 0.0;
    }
    Ok(())
  }
  pub fn write_lmm(&mut self, batch: usize, mv: Move) -> Result<(), InputError> {
    self.check(batch)?;
    self.input_lmm[batch * ACTION_SIZE + mv.index()] = 1.0;
    Ok(())
  }
  /// Replaces the mask of `batch` with exactly `moves`.
  pub fn write_legal_moves<'a, I>(&mut self, batch: usize, moves: I) -> Result<(), InputError>
    where I: IntoIterator<Item = &'a Move>
  {
    self.clear_lmm(batch)?;
    for mv in moves {
      self.write_lmm(batch, *mv)?;
    }
    Ok(())
  }
  pub fn board_input(&self) -> &[f32] {
    &self.input_board
  }
  pub fn lmm_input(&self) -> &[f32] {
    &self.input_lmm
  }
  pub fn batch_board(&self, batch: usize) -> Result<&[f32], InputError> {
    self.check(batch)?;
    Ok(&self.input_board[batch * FRAME_SIZE..(batch + 1) * FRAME_SIZE])
  }
  pub fn batch_lmm(&self, batch: usize) -> Result<&[f32], InputError> {
    self.check(batch)?;
    Ok(&self.input_lmm[batch * ACTION_SIZE..(batch + 1) * ACTION_SIZE])
  }
}
