use criterion::{criterion_group, criterion_main, Criterion};
use nc0_game::*;
use nc0_train::*;
use tch::Device;

fn encoded(batches: usize) -> Input {
  let pos = Position::startpos();
  let moves: Vec<Move> = ["e2e4", "d2d4", "g1f3", "b1c3"].iter().map(|m| m.parse().unwrap()).collect();
  let mut input = Input::new(batches);
  for b in 0..batches {
    input.write_frame(b, &pos.board, Color::White, 0, pos.move_number, pos.halfmove_clock).unwrap();
    input.write_legal_moves(b, &moves).unwrap();
  }
  input
}

fn bench_predict(c: &mut Criterion) {
  let config = NetConfig {
    residual_layers: 2,
    residual_convs: 2,
    ..Default::default()
  };
  let net = NNet::new(config, Device::cuda_if_available()).unwrap();
  for &batches in &[1usize, 16] {
    let input = encoded(batches);
    c.bench_function(&format!("predict batch {}", batches), |b| {
      b.iter(|| net.predict_input(&input, batches).unwrap())
    });
  }
}

criterion_group!(benches, bench_predict);
criterion_main!(benches);
