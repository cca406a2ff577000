use anyhow::Result;
use thiserror::Error;

/// Continuous observation as delivered by an environment (one value per dimension)
pub type Observation = Vec<f64>;

/// Index into the discrete action set (0..action_space)
pub type ActionIndex = usize;

/// Outcome of a single environment step
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub observation: Observation,
    /// immediate reward earned during performing that step
    pub reward: f64,
    /// e.g. pole fell or time limit reached
    pub done: bool,
}

/// Learning environment, modeling the world of a learning agent.
///
/// The agent only talks to the world through this trait, so any simulation backend implementing it is
/// interchangeable.
pub trait Environment {
    /// Number of possible discrete actions
    fn action_space(&self) -> usize;

    /// Maximum number of steps before the environment ends an episode on its own
    fn max_episode_steps(&self) -> usize;

    /// Re-seeds the internal random source of the environment
    fn seed(&mut self, seed: u64);

    /// Resets the environment to a defined starting point and returns the initial observation
    fn reset(&mut self) -> Result<Observation>;

    /// Performs one time/action-step.
    ///
    /// Applies the given `action` to the environment and returns:
    ///   - next observation
    ///   - immediate reward earned during performing that step
    ///   - done flag (e.g. game ended)
    ///
    fn step(&mut self, action: ActionIndex) -> Result<Step>;

    /// Shows the current state to a human observer
    fn render(&mut self) -> Result<()>;
}


#[derive(Error, Debug, Clone, PartialEq)]
pub enum QlError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("q-table index ({state}, {action}) out of bounds for table of shape ({rows}, {actions})")]
    IndexOutOfBounds {
        state: usize,
        action: usize,
        rows: usize,
        actions: usize,
    },

    #[error("q-table shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("observation has {actual} dimensions, discretizer is configured for {expected}")]
    ObservationArity { expected: usize, actual: usize },

    #[error("q-table persistence error: {0}")]
    Persistence(String),

    #[error("environment error: {0}")]
    Environment(String),
}

impl QlError {
    pub fn config(msg: &str) -> Self { QlError::Config(msg.to_string()) }
}
