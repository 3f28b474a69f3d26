use nc0_game::*;
use nc0_train::nnet::model_name;
use nc0_train::*;
use tch::{Device, Kind, Tensor};

fn tiny() -> NetConfig {
  NetConfig {
    filters: 8,
    residual_layers: 2,
    residual_convs: 2,
    value_hidden: 8,
    ..Default::default()
  }
}

fn encoded() -> Input {
  let pos = Position::startpos();
  let mut input = Input::new(2);
  input.write_frame(0, &pos.board, Color::White, 0, pos.move_number, pos.halfmove_clock).unwrap();
  input.write_frame(1, &pos.board, Color::Black, 0, pos.move_number, pos.halfmove_clock).unwrap();
  let moves: Vec<Move> = ["e2e4", "d2d4", "g1f3"].iter().map(|m| m.parse().unwrap()).collect();
  input.write_legal_moves(0, &moves).unwrap();
  input
}

#[cfg(test)]
mod nnet {
  use super::*;

  #[test]
  fn output_shapes() {
    let net = NNet::new(tiny(), Device::Cpu).unwrap();
    let board = Tensor::zeros(&[3, 8, 8, 85], (Kind::Float, Device::Cpu));
    let mask = Tensor::ones(&[3, 4096], (Kind::Float, Device::Cpu));
    let (pi, v) = tch::no_grad(|| net.forward_t(&board, &mask, false));
    assert_eq!(pi.size(), vec![3, 4096]);
    assert_eq!(v.size(), vec![3, 1]);
  }
  #[test]
  fn policy_is_distribution_and_value_bounded() {
    let net = NNet::new(tiny(), Device::Cpu).unwrap();
    let evals = net.predict_input(&encoded(), 2).unwrap();
    assert_eq!(evals.len(), 2);
    for e in &evals {
      assert_eq!(e.policy.len(), ACTION_SIZE);
      let sum: f32 = e.policy.iter().sum();
      assert!((sum - 1.0).abs() < 1e-4, "policy sums to {}", sum);
      assert!(e.policy.iter().all(|p| *p >= 0.0));
      assert!(e.value >= -1.0 && e.value <= 1.0, "value {}", e.value);
    }
  }
  #[test]
  fn empty_mask_gives_uniform_policy() {
    let net = NNet::new(tiny(), Device::Cpu).unwrap();
    // batch 1 has no legal moves written
    let evals = net.predict_input(&encoded(), 2).unwrap();
    let uniform = 1.0 / ACTION_SIZE as f32;
    assert!(evals[1].policy.iter().all(|p| (p - uniform).abs() < 1e-7));
  }
  #[test]
  fn rejects_bad_shapes() {
    let net = NNet::new(tiny(), Device::Cpu).unwrap();
    assert!(net.predict(&[0.0; 10], &[0.0; ACTION_SIZE], 1).is_err());
    assert!(net.predict(&[0.0; FRAME_SIZE], &[0.0; 10], 1).is_err());
    assert!(net.predict_input(&encoded(), 3).is_err());
    assert!(net.predict(&[], &[], 0).unwrap().is_empty());
  }
  #[test]
  fn rejects_bad_config() {
    let config = NetConfig { value_hidden: 0, ..tiny() };
    assert!(NNet::new(config, Device::Cpu).is_err());
  }
  #[test]
  fn save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gen3");
    let mut net = NNet::new(tiny(), Device::Cpu).unwrap();
    let compile = CompileConfig {
      optimizer: Optimizer::Adagrad { learning_rate: 0.01, initial_accumulator: 0.1, epsilon: 1e-7 },
      loss: Loss::Mse,
    };
    net.compile(compile);
    net.save(&path).unwrap();
    assert!(path.join(MODEL_FILE).is_file());
    assert!(path.join(WEIGHTS_FILE).is_file());

    let loaded = NNet::load(&path, Device::Cpu).unwrap();
    assert_eq!(loaded.config(), &tiny());
    assert_eq!(loaded.compile_config(), &compile);
    assert_eq!(model_name(&path), "Nc0 generation 3");

    let input = encoded();
    let a = net.predict_input(&input, 2).unwrap();
    let b = loaded.predict_input(&input, 2).unwrap();
    for (x, y) in a.iter().zip(b.iter()) {
      assert!((x.value - y.value).abs() < 1e-6);
      assert!(x.policy.iter().zip(y.policy.iter()).all(|(p, q)| (p - q).abs() < 1e-6));
    }
  }
  #[test]
  fn load_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    assert!(NNet::load(dir.path().join("nothing"), Device::Cpu).is_err());
  }
  #[test]
  fn summary_lists_parameters() {
    let net = NNet::new(tiny(), Device::Cpu).unwrap();
    let summary = net.summary();
    assert!(summary.contains(&format!("Total params: {}", net.parameter_count())));
    assert!(summary.contains("stem.conv.weight"));
    assert!(summary.contains("Input  legal_mask"));
    assert!(summary.contains("Output value"));
    // stem conv: 85 -> 8 channels, 3x3, with bias
    assert!(net.parameter_count() > 85 * 8 * 9 + 8);
  }
  #[test]
  fn layer_shapes() {
    let config = NetConfig { residual_layers: 2, residual_convs: 2, ..Default::default() };
    let net = NNet::new(config, Device::Cpu).unwrap();
    let vars = net.var_store().variables();
    let shape = |name: &str| vars.get(name).map(|t| t.size());

    // stem 6, per block 4 * convs + 8, value head 12, policy head 10
    assert_eq!(vars.len(), 6 + 2 * (4 * 2 + 8) + 12 + 10);
    assert_eq!(shape("stem.conv.weight"), Some(vec![85, 85, 3, 3]));
    assert_eq!(shape("stem.bn.running_var"), Some(vec![85]));
    for i in 0..2 {
      for stack in ["convs1", "convs2"].iter() {
        for j in 0..2 {
          let conv = format!("residual.{}.{}.{}", i, stack, j);
          assert_eq!(shape(&format!("{}.weight", conv)), Some(vec![85, 85, 3, 3]), "{}", conv);
          assert_eq!(shape(&format!("{}.bias", conv)), Some(vec![85]), "{}", conv);
        }
      }
      assert_eq!(shape(&format!("residual.{}.bn1.weight", i)), Some(vec![85]));
      assert_eq!(shape(&format!("residual.{}.bn2.weight", i)), Some(vec![85]));
    }
    assert_eq!(shape("residual.2.convs1.0.weight"), None);
    assert_eq!(shape("residual.0.convs1.2.weight"), None);

    assert_eq!(shape("value.conv.weight"), Some(vec![85, 85, 1, 1]));
    assert_eq!(shape("value.fc1.weight"), Some(vec![256, 85]));
    assert_eq!(shape("value.fc2.weight"), Some(vec![256, 256]));
    assert_eq!(shape("value.out.weight"), Some(vec![1, 256 * 64]));
    assert_eq!(shape("policy.conv1.weight"), Some(vec![85, 85, 1, 1]));
    assert_eq!(shape("policy.conv2.weight"), Some(vec![85, 85, 1, 1]));
    assert_eq!(shape("policy.bn.weight"), Some(vec![85]));
    assert_eq!(shape("policy.fc.weight"), Some(vec![4096, 85 * 64]));
  }
  #[test]
  fn plain_model_name() {
    assert_eq!(model_name("/tmp/models/latest"), "latest");
  }
}
