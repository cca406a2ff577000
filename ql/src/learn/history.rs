use std::collections::VecDeque;

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::learn::EpisodeOutcome;
use crate::prelude::ActionIndex;

/// FIFO buffer keeping the most recent `max_len` elements
pub struct History<T> {
    max_len: usize,
    buffer: VecDeque<T>,
}

impl<T> History<T> {
    pub fn new(max_len: usize) -> Self {
        assert!(max_len > 0);
        Self {
            max_len,
            buffer: VecDeque::with_capacity(max_len),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn add(&mut self, element: T) {
        if self.buffer.len() == self.max_len {
            self.buffer.pop_front();
        }
        self.buffer.push_back(element);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }
}

/// Recent episode outcomes and actions, used for the periodic learning report
pub struct LearningHistory {
    outcomes: History<EpisodeOutcome>,
    actions: History<ActionIndex>,
}

impl LearningHistory {
    pub fn new(episode_history_len: usize, action_history_len: usize) -> Self {
        Self {
            outcomes: History::new(episode_history_len),
            actions: History::new(action_history_len),
        }
    }

    pub fn add_action(&mut self, action: ActionIndex) {
        self.actions.add(action)
    }

    pub fn add_outcome(&mut self, outcome: EpisodeOutcome) {
        self.outcomes.add(outcome)
    }

    pub fn episodes(&self) -> usize {
        self.outcomes.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.outcomes.iter().filter(|o| o.success).count() as f64 / self.outcomes.len() as f64
    }

    pub fn mean_steps(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.outcomes.iter().map(|o| o.steps).sum::<usize>() as f64 / self.outcomes.len() as f64
    }

    pub fn max_steps(&self) -> usize {
        self.outcomes.iter().map(|o| o.steps).max().unwrap_or(0)
    }

    pub fn actions(&self) -> usize {
        self.actions.len()
    }

    /// e.g. `0: 48.2%, 1: 51.8%`
    pub fn action_distribution(&self) -> String {
        let mut action_counts = FxHashMap::<ActionIndex, usize>::default();
        for &a in self.actions.iter() {
            action_counts.entry(a).and_modify(|e| *e += 1).or_insert(1);
        }
        let total_actions = self.actions.len();
        action_counts
            .iter()
            .sorted()
            .map(|(&action, &count)| {
                let ratio = 100.0 * count as f64 / total_actions as f64;
                format!("{}: {:.1}%", action, ratio)
            })
            .join(", ")
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(steps: usize, success: bool) -> EpisodeOutcome {
        EpisodeOutcome {
            steps,
            reward: steps as f64,
            success,
        }
    }

    #[test]
    fn test_history_drops_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.add(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_learning_history_stats() {
        let mut history = LearningHistory::new(4, 10);
        assert_eq!(history.success_rate(), 0.0);
        assert_eq!(history.mean_steps(), 0.0);

        for o in [outcome(10, false), outcome(199, true), outcome(200, true), outcome(15, false), outcome(1, false)] {
            history.add_outcome(o);
        }
        // first outcome dropped
        assert_eq!(history.episodes(), 4);
        assert!((history.success_rate() - 0.5).abs() < 1e-12);
        assert!((history.mean_steps() - 103.75).abs() < 1e-12);
        assert_eq!(history.max_steps(), 200);
    }

    #[test]
    fn test_action_distribution() {
        let mut history = LearningHistory::new(1, 4);
        for a in [1, 0, 1, 1, 1] {
            history.add_action(a);
        }
        assert_eq!(history.actions(), 4);
        assert_eq!(history.action_distribution(), "0: 25.0%, 1: 75.0%");
    }
}
