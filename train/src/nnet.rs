use super::*;
use anyhow::{bail, Context, Result};
use nc0_game::{Input, FRAME_SIZE, ACTION_SIZE};
use std::fs;
use std::path::Path;
use tch::{nn::ModuleT, Device, Kind, Tensor};
use tracing::{debug, info};

// "same" padding for odd kernels
fn conv2d(p: &nn::Path, c_in: i64, c_out: i64, ksize: i64) -> nn::Conv2D {
  let conv2d_cfg = nn::ConvConfig {
    padding: ksize / 2,
    ..Default::default()
  };
  nn::conv2d(p, c_in, c_out, ksize, conv2d_cfg)
}

fn batch_norm(p: &nn::Path, c: i64) -> nn::BatchNorm {
  let bn_cfg = nn::BatchNormConfig {
    eps: 1e-3,
    momentum: 0.01,
    ..Default::default()
  };
  nn::batch_norm2d(p, c, bn_cfg)
}

fn conv_stack(p: &nn::Path, c: i64, cnt: i64) -> nn::SequentialT {
  let mut stack = nn::seq_t();
  for i in 0..cnt {
    stack = stack.add(conv2d(&(p / i), c, c, 3));
  }
  stack
}

fn residual_block(p: &nn::Path, c: i64, convs: i64) -> impl ModuleT {
  let convs1 = conv_stack(&(p / "convs1"), c, convs);
  let bn1 = batch_norm(&(p / "bn1"), c);
  let convs2 = conv_stack(&(p / "convs2"), c, convs);
  let bn2 = batch_norm(&(p / "bn2"), c);
  nn::func_t(move |xs, train| {
    let ys = xs
      .apply_t(&convs1, train)
      .apply_t(&bn1, train)
      .relu()
      .apply_t(&convs2, train)
      .apply_t(&bn2, train);
    (ys + xs).relu()
  })
}

fn stem(p: &nn::Path, config: &NetConfig) -> nn::SequentialT {
  nn::seq_t()
    .add(conv2d(&(p / "conv"), config.input_channels, config.filters, 3))
    .add(batch_norm(&(p / "bn"), config.filters))
    .add_fn(|xs| xs.relu())
}

fn tower(p: &nn::Path, config: &NetConfig) -> nn::SequentialT {
  let mut layer = nn::seq_t();
  for i in 0..config.residual_layers {
    layer = layer.add(residual_block(&(p / i), config.filters, config.residual_convs));
  }
  layer
}

// dense layers act on the channels of each square, so the head runs NHWC
fn value_head(p: &nn::Path, config: &NetConfig) -> nn::SequentialT {
  let f = config.filters;
  let hidden = config.value_hidden;
  let squares = config.board_size * config.board_size;
  nn::seq_t()
    .add(conv2d(&(p / "conv"), f, f, 1))
    .add(batch_norm(&(p / "bn"), f))
    .add_fn(|xs| xs.relu().permute(&[0, 2, 3, 1]))
    .add(nn::linear(&(p / "fc1"), f, hidden, Default::default()))
    .add_fn(|xs| xs.relu())
    .add(nn::linear(&(p / "fc2"), hidden, hidden, Default::default()))
    .add_fn(|xs| xs.flatten(1, -1))
    .add(nn::linear(&(p / "out"), hidden * squares, 1, Default::default()))
    .add_fn(|xs| xs.tanh())
}

// logits only, the legal mask and softmax are applied in forward_t
fn policy_head(p: &nn::Path, config: &NetConfig) -> nn::SequentialT {
  let f = config.filters;
  let squares = config.board_size * config.board_size;
  nn::seq_t()
    .add(conv2d(&(p / "conv1"), f, f, 1))
    .add(conv2d(&(p / "conv2"), f, f, 1))
    .add(batch_norm(&(p / "bn"), f))
    .add_fn(|xs| xs.relu().permute(&[0, 2, 3, 1]).flatten(1, -1))
    .add(nn::linear(&(p / "fc"), f * squares, config.action_size, Default::default()))
}

/// Display name of a model directory, `genN` directories are generations.
pub fn model_name<T: AsRef<Path>>(path: T) -> String {
  let name = path
    .as_ref()
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  match name.strip_prefix("gen") {
    Some(gen) => format!("Nc0 generation {}", gen),
    None => name,
  }
}

impl NNet {
  pub fn new(config: NetConfig, device: Device) -> Result<NNet> {
    config.validate()?;
    let vs = nn::VarStore::new(device);
    let (stem, tower, value_head, policy_head) = {
      let root = vs.root();
      (
        stem(&(&root / "stem"), &config),
        tower(&(&root / "residual"), &config),
        value_head(&(&root / "value"), &config),
        policy_head(&(&root / "policy"), &config),
      )
    };
    let net = NNet {
      config,
      compile: CompileConfig::default(),
      vs,
      stem,
      tower,
      value_head,
      policy_head,
    };
    debug!(params = net.parameter_count(), device = ?device, "built network");
    Ok(net)
  }
  /// Attaches the optimizer and loss used when the model is trained.
  pub fn compile(&mut self, compile: CompileConfig) {
    self.compile = compile;
  }
  pub fn config(&self) -> &NetConfig {
    &self.config
  }
  pub fn compile_config(&self) -> &CompileConfig {
    &self.compile
  }
  pub fn var_store(&self) -> &nn::VarStore {
    &self.vs
  }
  pub fn device(&self) -> Device {
    self.vs.device()
  }
  pub fn descriptor(&self) -> ModelDescriptor {
    ModelDescriptor::new(&self.config, &self.compile)
  }
  /// `board` is NHWC `[N, 8, 8, C]`, `legal_mask` is `[N, action_size]`.
  /// Returns `(policy [N, action_size], value [N, 1])`.
  pub fn forward_t(&self, board: &Tensor, legal_mask: &Tensor, train: bool) -> (Tensor, Tensor) {
    let xs = board
      .permute(&[0, 3, 1, 2])
      .apply_t(&self.stem, train)
      .apply_t(&self.tower, train);
    let value = xs.apply_t(&self.value_head, train);
    let policy = (xs.apply_t(&self.policy_head, train) * legal_mask).softmax(-1, Kind::Float);
    (policy, value)
  }
  pub fn predict(&self, boards: &[f32], masks: &[f32], batches: usize) -> Result<Vec<Evaluation>> {
    let c = &self.config;
    if boards.len() != batches * c.input_len() {
      bail!("board input has {} floats, expected {} for {} batches", boards.len(), batches * c.input_len(), batches);
    }
    if masks.len() != batches * c.action_size as usize {
      bail!("legal mask has {} floats, expected {} for {} batches", masks.len(), batches * c.action_size as usize, batches);
    }
    if batches == 0 {
      return Ok(Vec::new());
    }
    let n = batches as i64;
    let b = Tensor::of_slice(boards)
      .view([n, c.board_size, c.board_size, c.input_channels])
      .to_device(self.device());
    let m = Tensor::of_slice(masks).view([n, c.action_size]).to_device(self.device());
    let (pi, v) = tch::no_grad(|| self.forward_t(&b, &m, false));
    let pis = Vec::<f32>::from(&pi.to_device(Device::Cpu).contiguous().view([-1]));
    let values = Vec::<f32>::from(&v.to_device(Device::Cpu).contiguous().view([-1]));
    let res = pis
      .chunks(c.action_size as usize)
      .zip(values)
      .map(|(policy, value)| Evaluation { policy: policy.to_vec(), value })
      .collect();
    Ok(res)
  }
  /// Runs the first `batches` slots of an encoded input block.
  pub fn predict_input(&self, input: &Input, batches: usize) -> Result<Vec<Evaluation>> {
    if batches > input.max_batches() {
      bail!("{} batches requested, input holds {}", batches, input.max_batches());
    }
    if self.config.input_len() != FRAME_SIZE || self.config.action_size as usize != ACTION_SIZE {
      bail!("network input does not match the board encoding");
    }
    self.predict(
      &input.board_input()[..batches * FRAME_SIZE],
      &input.lmm_input()[..batches * ACTION_SIZE],
      batches,
    )
  }
  pub fn parameter_count(&self) -> i64 {
    self.vs
      .variables()
      .values()
      .map(|t| t.size().iter().product::<i64>())
      .sum()
  }
  pub fn summary(&self) -> String {
    let mut vars: Vec<(String, Vec<i64>)> = self.vs
      .variables()
      .into_iter()
      .map(|(name, t)| (name, t.size()))
      .collect();
    vars.sort();
    let trainable: i64 = self.vs
      .trainable_variables()
      .iter()
      .map(|t| t.size().iter().product::<i64>())
      .sum();
    let total = self.parameter_count();

    let rule = "-".repeat(86);
    let mut out = String::new();
    out.push_str(&format!("{:<50} {:<22} {:>12}\n", "Variable", "Shape", "Param #"));
    out.push_str(&rule);
    out.push('\n');
    for (name, shape) in &vars {
      let count: i64 = shape.iter().product();
      out.push_str(&format!("{:<50} {:<22} {:>12}\n", name, format!("{:?}", shape), count));
    }
    out.push_str(&rule);
    out.push('\n');
    let descriptor = self.descriptor();
    for spec in descriptor.inputs.iter() {
      out.push_str(&format!("Input  {:<12} {:?}\n", spec.name, spec.shape));
    }
    for spec in descriptor.outputs.iter() {
      out.push_str(&format!("Output {:<12} {:?}\n", spec.name, spec.shape));
    }
    out.push_str(&format!("Total params: {}\n", total));
    out.push_str(&format!("Trainable params: {}\n", trainable));
    out.push_str(&format!("Non-trainable params: {}\n", total - trainable));
    out
  }
  /// Writes `model.json` and `weights.ot` into the directory `path`.
  pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    self.descriptor().write(dir.join(MODEL_FILE))?;
    let weights = dir.join(WEIGHTS_FILE);
    self.vs
      .save(&weights)
      .with_context(|| format!("failed to save weights to {}", weights.display()))?;
    info!(path = %dir.display(), "saved model");
    Ok(())
  }
  pub fn load<T: AsRef<Path>>(path: T, device: Device) -> Result<NNet> {
    let dir = path.as_ref();
    let descriptor = ModelDescriptor::read(dir.join(MODEL_FILE))?;
    let mut net = NNet::new(descriptor.config, device)?;
    net.compile(descriptor.compile);
    let weights = dir.join(WEIGHTS_FILE);
    net.vs
      .load(&weights)
      .with_context(|| format!("failed loading weights from {}", weights.display()))?;
    info!(path = %dir.display(), name = %model_name(dir), "loaded model");
    Ok(net)
  }
}
