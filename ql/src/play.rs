use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::discretizer::Discretizer;
use crate::learn::EpisodeOutcome;
use crate::prelude::Environment;
use crate::q_table::QTable;

pub struct PlayOptions {
    pub render: bool,
    /// pause after each rendered step, so a human can follow
    pub step_delay: Duration,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            render: true,
            step_delay: Duration::from_millis(50),
        }
    }
}

/// Plays with a frozen table, always taking the best known action (𝜀 = 0, no learning)
pub struct QTablePlayer {
    discretizer: Discretizer,
    table: QTable,
}

impl QTablePlayer {
    pub fn new(discretizer: Discretizer, table: QTable) -> Self {
        Self { discretizer, table }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn play_episode<E: Environment>(
        &self,
        environment: &mut E,
        options: &PlayOptions,
    ) -> Result<EpisodeOutcome> {
        self.table.check_fits(self.discretizer.state_count(), environment.action_space())?;

        let observation = environment.reset()?;
        let mut state = self.discretizer.discretize(&observation)?;
        let mut steps: usize = 0;
        let mut episode_reward: f64 = 0.0;

        loop {
            let action = self.table.greedy_action(state)?;
            let step = environment.step(action)?;
            state = self.discretizer.discretize(&step.observation)?;
            steps += 1;
            episode_reward += step.reward;
            log::trace!("step {}: action {} -> state {}, reward: {:.2}", steps, action, state, step.reward);

            if options.render {
                environment.render()?;
                thread::sleep(options.step_delay);
            }
            if step.done {
                break;
            }
        }

        Ok(EpisodeOutcome {
            steps,
            reward: episode_reward,
            success: steps >= environment.max_episode_steps().saturating_sub(1),
        })
    }
}
