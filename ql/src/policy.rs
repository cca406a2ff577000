use anyhow::Result;
use rand::Rng;

use crate::prelude::{ActionIndex, QlError};

/// Epsilon-greedy action selection with an exponentially decaying exploration rate.
///
/// 𝜀 starts near `epsilon_start` and approaches `epsilon_end` as the global step counter grows:
/// `𝜀(t) = 𝜀_end + (𝜀_start - 𝜀_end) * e^(-t / decay)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpsilonGreedy {
    epsilon_start: f64,
    epsilon_end: f64,
    epsilon_decay: f64,
}

impl EpsilonGreedy {
    pub fn new(
        epsilon_start: f64,
        epsilon_end: f64,
        epsilon_decay: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon_start) || !(0.0..=1.0).contains(&epsilon_end) || epsilon_end >= epsilon_start {
            return Err(QlError::Config(format!(
                "epsilon bounds must satisfy 0 <= end < start <= 1, got start={}, end={}",
                epsilon_start, epsilon_end
            ))
            .into());
        }
        if !(epsilon_decay > 0.0) || !epsilon_decay.is_finite() {
            return Err(QlError::Config(format!("epsilon decay must be a positive number, got {}", epsilon_decay)).into());
        }
        Ok(Self {
            epsilon_start,
            epsilon_end,
            epsilon_decay,
        })
    }

    pub fn epsilon(&self, global_step: usize) -> f64 {
        self.epsilon_end + (self.epsilon_start - self.epsilon_end) * (-(global_step as f64) / self.epsilon_decay).exp()
    }

    /// Picks a random action with probability 𝜀(`global_step`), otherwise the best known one for `q_values`
    pub fn select_action<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        q_values: &[f64],
        global_step: usize,
    ) -> ActionIndex {
        let epsilon = self.epsilon(global_step);
        if rng.gen::<f64>() < epsilon {
            let action = rng.gen_range(0..q_values.len());
            log::trace!("exploring action {} (q={:.4}, 𝜀={:.3})", action, q_values[action], epsilon);
            action
        } else {
            greedy_action(q_values)
        }
    }
}

/// Action with the highest value. On ties the lowest action index wins.
pub fn greedy_action(q_values: &[f64]) -> ActionIndex {
    debug_assert!(!q_values.is_empty());
    let mut action = 0;
    let mut best = f64::NEG_INFINITY;
    for (a, &q) in q_values.iter().enumerate() {
        if q > best {
            action = a;
            best = q;
        }
    }
    action
}


#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&[0.0, 0.0], 0)]
    #[case(&[1.0, 3.0, 3.0, 2.0], 1)]
    #[case(&[-5.0, -1.0, -1.0], 1)]
    #[case(&[-2000.0, -3000.0], 0)]
    #[case(&[0.5], 0)]
    #[case(&[0.1, 0.2, 0.7, 0.7, 0.7], 2)]
    fn test_greedy_action_lowest_index_wins_ties(#[case] q_values: &[f64], #[case] expected: ActionIndex) {
        assert_eq!(greedy_action(q_values), expected);
    }

    #[test]
    fn test_epsilon_decay_bounds() -> Result<()> {
        let policy = EpsilonGreedy::new(0.9, 0.05, 100_000.0)?;
        assert!((policy.epsilon(0) - 0.9).abs() < 1e-12);

        let mut last = policy.epsilon(0);
        for step in (1..2_000_000).step_by(997) {
            let epsilon = policy.epsilon(step);
            assert!(epsilon >= 0.05 && epsilon <= 0.9);
            assert!(epsilon < last, "epsilon not decreasing at step {}", step);
            last = epsilon;
        }
        assert!(policy.epsilon(usize::MAX) >= 0.05);
        Ok(())
    }

    #[rstest]
    #[case(0.05, 0.9, 100.0)]
    #[case(0.5, 0.5, 100.0)]
    #[case(1.5, 0.1, 100.0)]
    #[case(0.9, -0.1, 100.0)]
    #[case(0.9, 0.05, 0.0)]
    #[case(0.9, 0.05, f64::NAN)]
    fn test_invalid_parameters(#[case] start: f64, #[case] end: f64, #[case] decay: f64) {
        assert!(EpsilonGreedy::new(start, end, decay).is_err());
    }

    #[test]
    fn test_pure_exploitation() -> Result<()> {
        let policy = EpsilonGreedy::new(0.5, 0.0, 1.0)?;
        let mut rng = StdRng::seed_from_u64(7);
        // exp(-1000) is zero, so 𝜀 = 0 and every draw exploits
        for _ in 0..1000 {
            assert_eq!(policy.select_action(&mut rng, &[0.3, 0.9, 0.9], 1000), 1);
        }
        Ok(())
    }

    #[test]
    fn test_exploration_covers_all_actions() -> Result<()> {
        let policy = EpsilonGreedy::new(1.0, 0.0, 1e12)?;
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0_usize; 3];
        for _ in 0..3000 {
            counts[policy.select_action(&mut rng, &[0.0, 10.0, 0.0], 0)] += 1;
        }
        assert!(counts.iter().all(|&c| c > 800), "{:?}", counts);
        Ok(())
    }

    #[test]
    fn test_seeded_selection_is_reproducible() -> Result<()> {
        let policy = EpsilonGreedy::new(0.9, 0.05, 10.0)?;
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..50).map(|t| policy.select_action(&mut rng, &[0.1, 0.2, 0.0, 0.05], t)).collect::<Vec<_>>()
        };
        assert_eq!(run(3), run(3));
        Ok(())
    }
}
