use super::*;
use std::cmp::Ordering;

pub fn max_idx(vals: &[f32]) -> usize {
  vals
    .iter()
    .enumerate()
    .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    .map(|(index, _)| index)
    .unwrap_or(0)
}

/// Restricts a policy output to the legal moves and renormalizes it.
/// When the network puts no mass on any legal move the result is uniform.
pub fn masked_policy(policy: &[f32], legal: &[Move]) -> Vec<(Move, f32)> {
  let mut masked: Vec<(Move, f32)> = legal
    .iter()
    .map(|&mv| (mv, policy.get(mv.index()).copied().unwrap_or(0.0).max(0.0)))
    .collect();
  let sum: f32 = masked.iter().map(|(_, p)| p).sum();
  if sum > 0.0 {
    for (_, p) in masked.iter_mut() {
      *p /= sum;
    }
  } else if !masked.is_empty() {
    let uniform = 1.0 / masked.len() as f32;
    for (_, p) in masked.iter_mut() {
      *p = uniform;
    }
  }
  masked
}

/// Legal move with the highest probability.
pub fn best_move(policy: &[f32], legal: &[Move]) -> Option<Move> {
  let masked = masked_policy(policy, legal);
  let probs: Vec<f32> = masked.iter().map(|(_, p)| *p).collect();
  masked.get(max_idx(&probs)).map(|(mv, _)| *mv)
}
