//! Full-length training run; takes minutes, so it is only started explicitly:
//! `cargo test -p cartpole --test learn_cartpole -- --nocapture`

use std::time::Duration;

use anyhow::Result;

use cartpole::cart_pole_environment::CartPoleEnvironment;
use ql::discretizer::{BinConfig, Discretizer};
use ql::learn::tabular_q_learner::{Parameter, TabularQLearner};
use ql::play::{PlayOptions, QTablePlayer};
use ql::prelude::Environment;

mod common;

#[test]
fn test_learn_cartpole_until_it_balances() -> Result<()> {
    let discretizer = Discretizer::new(&BinConfig::cartpole())?;
    let mut learner = TabularQLearner::new(
        CartPoleEnvironment::from_env_id("CartPole-v0")?,
        discretizer.clone(),
        Parameter::default(),
    )?;
    let summary = learner.learn()?;
    assert!(summary.successes > 0);

    let player = QTablePlayer::new(discretizer, learner.into_table());
    let options = PlayOptions {
        render: false,
        step_delay: Duration::ZERO,
    };
    let mut environment = CartPoleEnvironment::from_env_id("CartPole-v0")?;
    let mut total_steps = 0;
    for seed in 0..10 {
        environment.seed(seed);
        total_steps += player.play_episode(&mut environment, &options)?.steps;
    }
    // a random policy keeps the pole up for about 22 steps
    assert!(total_steps / 10 > 100, "mean steps: {}", total_steps / 10);
    Ok(())
}
