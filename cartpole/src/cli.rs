use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use lazy_static::lazy_static;

use ql::discretizer::{BinConfig, Discretizer};
use ql::learn::tabular_q_learner::{Parameter, TabularQLearner};
use ql::play::{PlayOptions, QTablePlayer};
use ql::prelude::{Environment, QlError};
use ql::q_table::QTable;

use crate::cart_pole_environment::CartPoleEnvironment;

lazy_static! {
    pub static ref DEFAULT_MODEL_PATH: PathBuf = PathBuf::from("cartpole.npy");
}

#[derive(Parser, Debug, Clone)]
#[command(name = "cartpole-ql", version, about = "Tabular Q-learning agent for the cart-pole balancing task")]
pub struct Args {
    /// Select the environment to run
    #[arg(long = "env-id", alias = "env_id", default_value = "CartPole-v0")]
    pub env_id: String,

    /// Start training; the learned table is written to --model (default: cartpole.npy)
    #[arg(long)]
    pub train: bool,

    /// Play one episode with a learned table (requires --model)
    #[arg(long)]
    pub test: bool,

    /// Path to the learned model (q-table in .npy format)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long)]
    pub episodes: Option<usize>,

    /// Seed for the environment and the exploration
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Initial learning rate
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount rate
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Do not render while testing
    #[arg(long)]
    pub no_render: bool,
}

impl Args {
    /// The model to test with; it must exist unless this run trains it first
    fn test_model_path(&self) -> Result<&Path> {
        let path = self
            .model
            .as_deref()
            .ok_or_else(|| QlError::config("path to learned model is not provided (use --model)"))?;
        if !self.train && !path.exists() {
            return Err(QlError::Config(format!("invalid model path, no such file as '{}' found", path.display())).into());
        }
        Ok(path)
    }

    fn train_model_path(&self) -> &Path {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL_PATH.as_path())
    }

    fn parameter(&self) -> Parameter {
        let default = Parameter::default();
        Parameter {
            episodes: self.episodes.unwrap_or(default.episodes),
            alpha: self.alpha.unwrap_or(default.alpha),
            gamma: self.gamma.unwrap_or(default.gamma),
            seed: self.seed,
            ..default
        }
    }
}

pub fn run(args: &Args) -> Result<()> {
    if !args.train && !args.test {
        log::warn!("Specify train or test flag");
        log::warn!("for eg: cartpole-ql --train");
        log::warn!("or cartpole-ql --test --model cartpole.npy");
        return Ok(());
    }

    // reject an unusable test setup before spending time on training
    let test_model = match args.test {
        true => Some(args.test_model_path()?),
        false => None,
    };
    let discretizer = Discretizer::new(&BinConfig::cartpole())?;

    if args.train {
        train(args, discretizer.clone())?;
    }
    if let Some(path) = test_model {
        test(args, discretizer, path)?;
    }
    Ok(())
}

fn train(args: &Args, discretizer: Discretizer) -> Result<()> {
    let environment = CartPoleEnvironment::from_env_id(&args.env_id)?;
    log::info!("training on {}", environment.env_id());
    let mut learner = TabularQLearner::new(environment, discretizer, args.parameter())?;
    let summary = learner.learn_and_save(args.train_model_path())?;
    log::info!(
        "training finished: {} episodes, {} steps, {} successes, 𝛼={:.4}, 𝜀={:.3}",
        summary.episodes,
        summary.steps,
        summary.successes,
        summary.alpha,
        summary.epsilon
    );
    Ok(())
}

fn test(args: &Args, discretizer: Discretizer, model: &Path) -> Result<()> {
    let table = QTable::load(model).with_context(|| format!("loading model {}", model.display()))?;
    let mut environment = CartPoleEnvironment::from_env_id(&args.env_id)?;
    environment.seed(args.seed);

    let player = QTablePlayer::new(discretizer, table);
    let options = PlayOptions {
        render: !args.no_render,
        ..PlayOptions::default()
    };
    let outcome = player.play_episode(&mut environment, &options)?;
    log::info!("{}: {} (steps: {}, reward: {:.1})", environment.env_id(), outcome, outcome.steps, outcome.reward);
    Ok(())
}
