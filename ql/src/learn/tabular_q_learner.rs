use std::path::Path;

use anyhow::Result;
use num_format::ToFormattedString;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::discretizer::Discretizer;
use crate::learn::history::LearningHistory;
use crate::learn::{EpisodeOutcome, TrainingSummary};
use crate::policy::EpsilonGreedy;
use crate::prelude::{Environment, QlError};
use crate::q_table::QTable;
use crate::util::format;
use crate::util::immutable::Immutable;

pub struct Parameter {
    /// Learning rate 𝛼 at the start of training
    pub alpha: f64,
    /// Factor applied to 𝛼 every `alpha_decay_interval` episodes
    pub alpha_decay: f64,
    pub alpha_decay_interval: usize,
    /// Discount rate; (0 <= 𝛾 <= 1) represents the value of future rewards. The bigger, the more farsighted the agent becomes
    pub gamma: f64,
    /// Exploration rate at global step 0
    pub epsilon_start: f64,
    /// Exploration rate approached after many steps
    pub epsilon_end: f64,
    /// Number of steps over which the distance between 𝜀 and `epsilon_end` shrinks by the factor e
    pub epsilon_decay: f64,
    pub episodes: usize,
    /// Episode length counting as success. Defaults to the environment's episode limit minus one
    pub success_steps: Option<usize>,
    pub seed: u64,
    // number of recent episodes the progress report is based on
    pub episode_history_len: usize,
    pub action_history_len: usize,
    pub stats_after_episodes: usize,
}

impl Parameter {
    pub fn validate(&self) -> Result<()> {
        let check = |valid: bool, msg: String| -> Result<()> {
            match valid {
                true => Ok(()),
                false => Err(QlError::Config(msg).into()),
            }
        };
        check(self.alpha > 0.0 && self.alpha <= 1.0, format!("alpha must be in (0, 1], got {}", self.alpha))?;
        check(
            self.alpha_decay > 0.0 && self.alpha_decay <= 1.0,
            format!("alpha_decay must be in (0, 1], got {}", self.alpha_decay),
        )?;
        check(self.alpha_decay_interval > 0, "alpha_decay_interval must be positive".to_string())?;
        check((0.0..=1.0).contains(&self.gamma), format!("gamma must be in [0, 1], got {}", self.gamma))?;
        check(self.episode_history_len > 0, "episode_history_len must be positive".to_string())?;
        check(self.action_history_len > 0, "action_history_len must be positive".to_string())?;
        check(self.stats_after_episodes > 0, "stats_after_episodes must be positive".to_string())?;
        Ok(())
    }
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            alpha_decay: 0.996,
            alpha_decay_interval: 1000,
            gamma: 0.8,
            epsilon_start: 0.9,
            epsilon_end: 0.05,
            epsilon_decay: 100_000.0,
            episodes: 50_001,
            success_steps: None,
            seed: 0,
            episode_history_len: 100,
            action_history_len: 100_000,
            stats_after_episodes: 1000,
        }
    }
}

/// Tabular Q-learning over a discretized observation space.
///
/// Owns the environment and the table for the whole run. Each episode:
/// reset → discretize → (select action → step → discretize → update)* until done.
pub struct TabularQLearner<E: Environment> {
    environment: E,
    discretizer: Discretizer,
    param: Immutable<Parameter>,
    policy: EpsilonGreedy,
    table: QTable,
    rng: StdRng,
    history: LearningHistory,
    success_steps: usize,
    /// drives 𝜀; counts every environment step of the run
    step_count: usize,
    episode_count: usize,
    success_count: usize,
    alpha: f64,
}

impl<E: Environment> TabularQLearner<E> {
    /// Starts with a zero table covering every state the discretizer can produce
    pub fn new(
        environment: E,
        discretizer: Discretizer,
        param: Parameter,
    ) -> Result<Self> {
        let table = QTable::new(discretizer.state_count(), environment.action_space())?;
        Self::with_table(environment, discretizer, param, table)
    }

    /// Continues learning on an existing table
    pub fn with_table(
        mut environment: E,
        discretizer: Discretizer,
        param: Parameter,
        table: QTable,
    ) -> Result<Self> {
        param.validate()?;
        let policy = EpsilonGreedy::new(param.epsilon_start, param.epsilon_end, param.epsilon_decay)?;
        table.check_fits(discretizer.state_count(), environment.action_space())?;

        let success_steps = param
            .success_steps
            .unwrap_or_else(|| environment.max_episode_steps().saturating_sub(1));
        environment.seed(param.seed);

        Ok(Self {
            rng: StdRng::seed_from_u64(param.seed),
            history: LearningHistory::new(param.episode_history_len, param.action_history_len),
            alpha: param.alpha,
            environment,
            discretizer,
            param: Immutable::new(param),
            policy,
            table,
            success_steps,
            step_count: 1,
            episode_count: 0,
            success_count: 0,
        })
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn epsilon(&self) -> f64 {
        self.policy.epsilon(self.step_count)
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Runs the configured number of episodes
    pub fn learn(&mut self) -> Result<TrainingSummary> {
        log::info!(
            "learning {} episodes: 𝛼={}, 𝛾={}, 𝜀={}..{} (decay {}), {} states x {} actions",
            self.param.episodes.to_formatted_string(&format::number_format()),
            self.param.alpha,
            self.param.gamma,
            self.param.epsilon_start,
            self.param.epsilon_end,
            self.param.epsilon_decay,
            self.table.rows(),
            self.table.actions()
        );
        for _ in 0..self.param.episodes {
            self.learn_episode()?;
        }
        Ok(self.summary())
    }

    /// [Self::learn] and persist the resulting table to `path`
    pub fn learn_and_save(&mut self, path: &Path) -> Result<TrainingSummary> {
        let summary = self.learn()?;
        self.table.save(path)?;
        log::info!(
            "saved q-table ({} x {}) to {} after {} successful episodes out of {}",
            self.table.rows(),
            self.table.actions(),
            path.display(),
            summary.successes,
            summary.episodes
        );
        Ok(summary)
    }

    pub fn learn_episode(&mut self) -> Result<EpisodeOutcome> {
        let observation = self.environment.reset()?;
        let mut state = self.discretizer.discretize(&observation)?;
        log::trace!("started learning episode {}", self.episode_count);

        let mut steps: usize = 0;
        let mut episode_reward: f64 = 0.0;

        loop {
            self.step_count += 1;

            let action = self.policy.select_action(&mut self.rng, self.table.row(state)?, self.step_count);

            let step = self.environment.step(action)?;
            let next_state = self.discretizer.discretize(&step.observation)?;
            log::trace!(
                "state {} action {} -> state {}, reward: {:.2}, done: {}",
                state,
                action,
                next_state,
                step.reward,
                step.done
            );

            self.table.update(state, action, step.reward, next_state, self.alpha, self.param.gamma)?;
            self.history.add_action(action);

            steps += 1;
            episode_reward += step.reward;
            state = next_state;

            if step.done {
                break;
            }
        }

        if self.episode_count % self.param.alpha_decay_interval == 0 {
            self.alpha *= self.param.alpha_decay;
        }

        let outcome = EpisodeOutcome {
            steps,
            reward: episode_reward,
            success: steps >= self.success_steps,
        };
        log::debug!("episode {}: {}", self.episode_count, outcome);
        if outcome.success {
            self.success_count += 1;
        }
        self.history.add_outcome(outcome.clone());
        self.episode_count += 1;

        if self.episode_count % self.param.stats_after_episodes == 0 {
            self.learning_update_log();
        }

        Ok(outcome)
    }

    pub fn summary(&self) -> TrainingSummary {
        TrainingSummary {
            episodes: self.episode_count,
            steps: self.step_count,
            successes: self.success_count,
            alpha: self.alpha,
            epsilon: self.epsilon(),
        }
    }

    fn learning_update_log(&self) {
        let number_format = format::number_format();

        log::info!(
            "\n\
    episode: {}, steps: {}, 𝛼={:.4}, 𝛾={:.2}, 𝜀={:.3}\n\
    last {} episodes: success rate: {:.1}%, mean steps: {:.1}, max steps: {}\n\
    action_distribution (of last {}): {}",
            self.episode_count.to_formatted_string(&number_format),
            self.step_count.to_formatted_string(&number_format),
            self.alpha,
            self.param.gamma,
            self.epsilon(),
            self.history.episodes(),
            100.0 * self.history.success_rate(),
            self.history.mean_steps(),
            self.history.max_steps(),
            self.history.actions().to_formatted_string(&number_format),
            self.history.action_distribution()
        );
    }
}
