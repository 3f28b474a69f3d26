use super::*;

use anyhow::{anyhow, bail, Context, Result};
use indicatif::ProgressIterator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use savefile::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tch::{Reduction, Tensor};
use tracing::info;

const EXAMPLES_VERSION: u32 = 0;

/// One training target: encoded board and mask, search policy `pi` and game result `v`.
#[derive(Savefile, Clone, Debug, PartialEq)]
pub struct Example {
  pub board: Vec<f32>,
  pub lmm: Vec<f32>,
  pub pi: Vec<f32>,
  pub v: f32,
}

#[derive(Savefile, Clone, Debug, Default, PartialEq)]
pub struct Examples {
  pub values: Vec<Example>,
}

impl Examples {
  pub fn new() -> Examples {
    Examples::default()
  }
  pub fn push(&mut self, example: Example) {
    self.values.push(example);
  }
  pub fn len(&self) -> usize {
    self.values.len()
  }
  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
  pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
    let path = path.as_ref();
    let mut file = BufWriter::new(
      File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    savefile::save(&mut file, EXAMPLES_VERSION, self)
      .map_err(|e| anyhow!("failed to save examples to {}: {:?}", path.display(), e))?;
    file.flush().with_context(|| format!("failed to write {}", path.display()))
  }
  pub fn load<T: AsRef<Path>>(path: T) -> Result<Examples> {
    let path = path.as_ref();
    let mut file = BufReader::new(
      File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
    );
    savefile::load(&mut file, EXAMPLES_VERSION)
      .map_err(|e| anyhow!("failed to load examples from {}: {:?}", path.display(), e))
  }
}

pub struct Coach {
  rng: StdRng,
  pub epochs: usize,
  pub batches_per_epoch: usize,
  pub batch_size: usize,
}

impl Default for Coach {
  fn default() -> Coach {
    Coach::new(10, 10, 128)
  }
}

impl Coach {
  pub fn new(epochs: usize, batches_per_epoch: usize, batch_size: usize) -> Coach {
    Coach {
      rng: SeedableRng::from_seed([42; 32]),
      epochs,
      batches_per_epoch,
      batch_size,
    }
  }
  fn check(net: &NNet, ex: &Example) -> Result<()> {
    let c = net.config();
    let actions = c.action_size as usize;
    if ex.board.len() != c.input_len() || ex.lmm.len() != actions || ex.pi.len() != actions {
      bail!(
        "example sizes board {} / lmm {} / pi {} do not match network ({} / {})",
        ex.board.len(), ex.lmm.len(), ex.pi.len(), c.input_len(), actions
      );
    }
    Ok(())
  }
  /// Loss of the compiled objective on `batch`: mse(policy) + mse(value).
  pub fn loss(net: &NNet, batch: &[&Example], train: bool) -> Result<Tensor> {
    if batch.is_empty() {
      bail!("empty batch");
    }
    for ex in batch {
      Coach::check(net, ex)?;
    }
    let c = net.config();
    let n = batch.len() as i64;
    let device = net.device();
    let mut boards: Vec<f32> = Vec::with_capacity(batch.len() * c.input_len());
    let mut masks: Vec<f32> = Vec::with_capacity(batch.len() * c.action_size as usize);
    let mut pis: Vec<f32> = Vec::with_capacity(batch.len() * c.action_size as usize);
    let mut vs: Vec<f32> = Vec::with_capacity(batch.len());
    for ex in batch {
      boards.extend_from_slice(&ex.board);
      masks.extend_from_slice(&ex.lmm);
      pis.extend_from_slice(&ex.pi);
      vs.push(ex.v);
    }
    let boards = Tensor::of_slice(&boards)
      .view([n, c.board_size, c.board_size, c.input_channels])
      .to_device(device);
    let masks = Tensor::of_slice(&masks).view([n, c.action_size]).to_device(device);
    let target_pis = Tensor::of_slice(&pis).view([n, c.action_size]).to_device(device);
    let target_vs = Tensor::of_slice(&vs).to_device(device);

    let (out_pi, out_v) = net.forward_t(&boards, &masks, train);
    let l_pi = out_pi.mse_loss(&target_pis, Reduction::Mean);
    let l_v = out_v.view([-1]).mse_loss(&target_vs, Reduction::Mean);
    Ok(l_pi + l_v)
  }
  /// One optimizer update on `batch`, returns the loss before the update.
  pub fn step(net: &NNet, optimizer: &mut Adagrad, batch: &[&Example]) -> Result<f64> {
    let loss = Coach::loss(net, batch, true)?;
    optimizer.backward_step(&loss);
    Ok(loss.double_value(&[]))
  }
  /// Trains on randomly sampled mini-batches, returns the mean loss of the last epoch.
  pub fn train(&mut self, net: &NNet, examples: &Examples) -> Result<f64> {
    if examples.is_empty() {
      bail!("no training examples");
    }
    if self.epochs == 0 || self.batches_per_epoch == 0 || self.batch_size == 0 {
      bail!("epochs, batches per epoch and batch size must be positive");
    }
    tch::manual_seed(42);
    let mut optimizer = Adagrad::from_config(net.var_store(), &net.compile_config().optimizer);
    info!(examples = examples.len(), epochs = self.epochs, "start train");
    let mut mean_loss = 0.0;
    for epoch in (0..self.epochs).progress() {
      let mut total = 0.0;
      for _ in 0..self.batches_per_epoch {
        let batch: Vec<&Example> = (0..self.batch_size)
          .map(|_| &examples.values[self.rng.gen_range(0, examples.len())])
          .collect();
        total += Coach::step(net, &mut optimizer, &batch)?;
      }
      mean_loss = total / self.batches_per_epoch as f64;
      info!(epoch, loss = mean_loss, "epoch done");
    }
    Ok(mean_loss)
  }
}
