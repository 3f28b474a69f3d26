use super::*;
use tch::Tensor;

/// Adagrad over the trainable variables of a `VarStore`.
pub struct Adagrad {
  vars: Vec<Tensor>,
  accumulators: Vec<Tensor>,
  learning_rate: f64,
  epsilon: f64,
}

impl Adagrad {
  pub fn new(vs: &nn::VarStore, learning_rate: f64, initial_accumulator: f64, epsilon: f64) -> Adagrad {
    let vars = vs.trainable_variables();
    let accumulators = vars
      .iter()
      .map(|v| v.zeros_like() + initial_accumulator)
      .collect();
    Adagrad {
      vars,
      accumulators,
      learning_rate,
      epsilon,
    }
  }
  pub fn from_config(vs: &nn::VarStore, optimizer: &Optimizer) -> Adagrad {
    match *optimizer {
      Optimizer::Adagrad { learning_rate, initial_accumulator, epsilon } => {
        Adagrad::new(vs, learning_rate, initial_accumulator, epsilon)
      }
    }
  }
  pub fn learning_rate(&self) -> f64 {
    self.learning_rate
  }
  pub fn zero_grad(&mut self) {
    for var in self.vars.iter_mut() {
      var.zero_grad();
    }
  }
  pub fn step(&mut self) {
    let lr = self.learning_rate;
    let eps = self.epsilon;
    let vars = &mut self.vars;
    let accumulators = &mut self.accumulators;
    tch::no_grad(|| {
      for (var, acc) in vars.iter_mut().zip(accumulators.iter_mut()) {
        let grad = var.grad();
        if !grad.defined() {
          continue;
        }
        *acc += &grad * &grad;
        *var -= &grad / (acc.sqrt() + eps) * lr;
      }
    });
  }
  pub fn backward_step(&mut self, loss: &Tensor) {
    self.zero_grad();
    loss.backward();
    self.step();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tch::{Device, Kind};

  fn assert_close(w: &Tensor, expected: [f64; 2]) {
    for (i, e) in expected.iter().enumerate() {
      let got = w.double_value(&[i as i64]);
      assert!((got - e).abs() < 1e-5, "w[{}] = {}, expected {}", i, got, e);
    }
  }

  #[test]
  fn accumulates_squared_gradients() {
    let vs = nn::VarStore::new(Device::Cpu);
    let w = vs.root().var("w", &[2], nn::Init::Const(1.0));
    let coeffs = Tensor::of_slice(&[2.0f32, -3.0]);
    let mut optimizer = Adagrad::new(&vs, 0.5, 0.1, 1e-7);
    assert_eq!(optimizer.learning_rate(), 0.5);

    // d/dw sum(w * c) = c on every step
    optimizer.backward_step(&(&w * &coeffs).sum(Kind::Float));
    assert_close(&w, [0.506135, 1.497245]);
    optimizer.backward_step(&(&w * &coeffs).sum(Kind::Float));
    assert_close(&w, [0.154771, 1.849821]);
  }

  #[test]
  fn from_config_uses_compile_defaults() {
    let vs = nn::VarStore::new(Device::Cpu);
    let _w = vs.root().var("w", &[1], nn::Init::Const(0.0));
    let optimizer = Adagrad::from_config(&vs, &CompileConfig::default().optimizer);
    assert_eq!(optimizer.learning_rate(), 0.001);
    assert_eq!(optimizer.accumulators[0].double_value(&[0]), 0.1f32 as f64);
  }
}
