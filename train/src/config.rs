use anyhow::{bail, Context, Result};
use nc0_game::{ACTION_SIZE, BOARD_SIZE, SQUARE_BITS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const MODEL_FILE: &str = "model.json";
pub const WEIGHTS_FILE: &str = "weights.ot";
pub const FORMAT_VERSION: u32 = 1;

/// Topology of the policy/value network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetConfig {
  pub input_channels: i64,
  pub filters: i64,
  pub residual_layers: i64,
  /// convolutions on each side of a residual block's inner activation
  pub residual_convs: i64,
  pub value_hidden: i64,
  pub board_size: i64,
  pub action_size: i64,
}

impl Default for NetConfig {
  fn default() -> NetConfig {
    NetConfig {
      input_channels: SQUARE_BITS as i64,
      filters: SQUARE_BITS as i64,
      residual_layers: 16,
      residual_convs: 16,
      value_hidden: 256,
      board_size: BOARD_SIZE as i64,
      action_size: ACTION_SIZE as i64,
    }
  }
}

impl NetConfig {
  pub fn validate(&self) -> Result<()> {
    let sizes = [
      ("input_channels", self.input_channels),
      ("filters", self.filters),
      ("residual_convs", self.residual_convs),
      ("value_hidden", self.value_hidden),
      ("board_size", self.board_size),
      ("action_size", self.action_size),
    ];
    for (name, size) in sizes.iter() {
      if *size <= 0 {
        bail!("{} must be positive, got {}", name, size);
      }
    }
    if self.residual_layers < 0 {
      bail!("residual_layers must not be negative, got {}", self.residual_layers);
    }
    Ok(())
  }
  /// Floats per position in the board input.
  pub fn input_len(&self) -> usize {
    (self.board_size * self.board_size * self.input_channels) as usize
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Optimizer {
  Adagrad {
    learning_rate: f64,
    initial_accumulator: f64,
    epsilon: f64,
  },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
  Mse,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompileConfig {
  pub optimizer: Optimizer,
  pub loss: Loss,
}

impl Default for CompileConfig {
  fn default() -> CompileConfig {
    CompileConfig {
      optimizer: Optimizer::Adagrad {
        learning_rate: 0.001,
        initial_accumulator: 0.1,
        epsilon: 1e-7,
      },
      loss: Loss::Mse,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TensorSpec {
  pub name: String,
  pub shape: Vec<i64>,
}

impl TensorSpec {
  fn new(name: &str, shape: &[i64]) -> TensorSpec {
    TensorSpec { name: name.to_string(), shape: shape.to_vec() }
  }
}

/// Contents of `model.json`, written next to the weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
  pub format: u32,
  pub config: NetConfig,
  pub compile: CompileConfig,
  pub inputs: Vec<TensorSpec>,
  pub outputs: Vec<TensorSpec>,
}

impl ModelDescriptor {
  pub fn new(config: &NetConfig, compile: &CompileConfig) -> ModelDescriptor {
    let s = config.board_size;
    ModelDescriptor {
      format: FORMAT_VERSION,
      config: config.clone(),
      compile: *compile,
      inputs: vec![
        TensorSpec::new("input", &[s, s, config.input_channels]),
        TensorSpec::new("legal_mask", &[config.action_size]),
      ],
      outputs: vec![
        TensorSpec::new("policy", &[config.action_size]),
        TensorSpec::new("value", &[1]),
      ],
    }
  }
  pub fn read<T: AsRef<Path>>(path: T) -> Result<ModelDescriptor> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    let descriptor: ModelDescriptor = serde_json::from_str(&text)
      .with_context(|| format!("invalid model descriptor {}", path.display()))?;
    if descriptor.format != FORMAT_VERSION {
      bail!("{}: unsupported format {}, expected {}", path.display(), descriptor.format, FORMAT_VERSION);
    }
    descriptor.config.validate()?;
    Ok(descriptor)
  }
  pub fn write<T: AsRef<Path>>(&self, path: T) -> Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(self)?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
  }
}
