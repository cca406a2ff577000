use std::fmt::{Display, Formatter};

pub mod history;
pub mod tabular_q_learner;

/// Diagnostic result of one episode; not part of the learning signal
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeOutcome {
    pub steps: usize,
    pub reward: f64,
    /// the episode lasted at least the success threshold number of steps
    pub success: bool,
}

impl Display for EpisodeOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.success {
            true => write!(f, "success"),
            false => write!(f, "fail {}", self.steps),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub steps: usize,
    pub successes: usize,
    pub alpha: f64,
    pub epsilon: f64,
}
