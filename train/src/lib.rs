#[macro_use]
extern crate savefile_derive;
extern crate savefile;

use tch::nn;

pub mod adagrad;
pub mod coach;
pub mod config;
pub mod generate;
pub mod logging;
pub mod nnet;

pub use adagrad::Adagrad;
pub use coach::{Coach, Example, Examples};
pub use config::*;
pub use generate::{generate, Outcome};

/// Dual-head policy/value network over 8x8 boards.
pub struct NNet {
  config: NetConfig,
  compile: CompileConfig,
  vs: nn::VarStore,
  stem: nn::SequentialT,
  tower: nn::SequentialT,
  value_head: nn::SequentialT,
  policy_head: nn::SequentialT,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
  pub policy: Vec<f32>,
  pub value: f32,
}
