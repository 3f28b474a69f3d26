use anyhow::Result;
use clap::Parser;
use nc0_train::generate::{default_model_path, generate, Outcome};
use nc0_train::{logging, NetConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tch::Device;

/// Generate an untrained nc0 policy/value network
#[derive(Parser)]
#[command(name = "nc0-generate")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Output model directory [default: `model` next to the executable]
  path: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
  logging::init_logging("info");
  let cli = Cli::parse();
  let path = match cli.path {
    Some(path) => path,
    None => default_model_path()?,
  };

  match generate(&path, NetConfig::default(), Device::cuda_if_available())? {
    Outcome::AlreadyExists => {
      println!("Path {} already exists, terminating", path.display());
      Ok(ExitCode::from(1))
    }
    Outcome::Written { summary } => {
      println!("Wrote new model to {}", path.display());
      println!("{}", summary);
      Ok(ExitCode::SUCCESS)
    }
  }
}
