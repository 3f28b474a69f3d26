use super::*;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tch::Device;
use tracing::info;

pub const DEFAULT_MODEL_DIR: &str = "model";

#[derive(Debug)]
pub enum Outcome {
  /// Destination was already present and has not been touched.
  AlreadyExists,
  Written { summary: String },
}

/// `model` next to the running executable.
pub fn default_model_path() -> Result<PathBuf> {
  let exe = env::current_exe().context("failed to locate the running executable")?;
  let dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
  Ok(dir.join(DEFAULT_MODEL_DIR))
}

/// Builds an untrained network, compiles it and writes it to `path`.
/// `path` is created before the network is built and is never reused.
pub fn generate<T: AsRef<Path>>(path: T, config: NetConfig, device: Device) -> Result<Outcome> {
  let path = path.as_ref();
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
  }
  match fs::create_dir(path) {
    Ok(()) => {}
    Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(Outcome::AlreadyExists),
    Err(e) => return Err(e).with_context(|| format!("failed to create {}", path.display())),
  }
  info!(path = %path.display(), "generating model");
  let written = build_and_save(path, config, device);
  if written.is_err() {
    let _ = fs::remove_dir_all(path);
  }
  written
}

fn build_and_save(path: &Path, config: NetConfig, device: Device) -> Result<Outcome> {
  let mut net = NNet::new(config, device)?;
  net.compile(CompileConfig::default());
  net.save(path)?;
  Ok(Outcome::Written { summary: net.summary() })
}
