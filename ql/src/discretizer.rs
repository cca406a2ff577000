use anyhow::Result;

use crate::prelude::QlError;

/// Bounds and bin count per observation dimension.
///
/// For each dimension `d`, `bins[d]` equally spaced edges are laid over `[min[d], max[d]]` (both ends included).
/// `n` edges split the real line into `n + 1` buckets.
#[derive(Clone, Debug, PartialEq)]
pub struct BinConfig {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub bins: Vec<usize>,
}

impl BinConfig {
    /// cart position, cart velocity, pole angle, pole angular velocity
    pub fn cartpole() -> Self {
        Self {
            min: vec![-2.5, -0.5, (-12.0_f64).to_radians(), (-50.0_f64).to_radians()],
            max: vec![2.5, 0.5, 12.0_f64.to_radians(), 50.0_f64.to_radians()],
            bins: vec![9, 9, 9, 9],
        }
    }

    pub fn uniform(min: f64, max: f64, bins: usize, dims: usize) -> Self {
        Self {
            min: vec![min; dims],
            max: vec![max; dims],
            bins: vec![bins; dims],
        }
    }

    pub fn dims(&self) -> usize {
        self.bins.len()
    }

    fn validate(&self) -> Result<()> {
        if self.bins.is_empty() {
            return Err(QlError::config("bin configuration needs at least one dimension").into());
        }
        if self.min.len() != self.bins.len() || self.max.len() != self.bins.len() {
            return Err(QlError::Config(format!(
                "bin configuration dimensions differ: min={}, max={}, bins={}",
                self.min.len(),
                self.max.len(),
                self.bins.len()
            ))
            .into());
        }
        for d in 0..self.dims() {
            let (min, max, bins) = (self.min[d], self.max[d], self.bins[d]);
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(QlError::Config(format!("dimension {}: invalid range [{}, {}]", d, min, max)).into());
            }
            if bins == 0 {
                return Err(QlError::Config(format!("dimension {}: at least one bin edge required", d)).into());
            }
        }
        Ok(())
    }
}

/// Maps a continuous observation to a single state index
#[derive(Clone, Debug)]
pub struct Discretizer {
    edges: Vec<Vec<f64>>,
    weights: Vec<usize>,
    state_count: usize,
}

impl Discretizer {
    /// Dimension `d` is weighted by the number of buckets of all lower dimensions, giving a dense index space
    pub fn new(config: &BinConfig) -> Result<Self> {
        config.validate()?;

        let edges: Vec<Vec<f64>> = (0..config.dims())
            .map(|d| linspace(config.min[d], config.max[d], config.bins[d]))
            .collect();

        let mut weights = Vec::with_capacity(edges.len());
        let mut radix = 1_usize;
        for e in &edges {
            weights.push(radix);
            // n edges yield bucket numbers 0..=n
            radix = radix
                .checked_mul(e.len() + 1)
                .ok_or_else(|| QlError::config("discretized state space too large"))?;
        }

        Ok(Self {
            edges,
            weights,
            state_count: radix,
        })
    }

    /// Number of distinct state indices; every index returned by [Self::discretize] is below that value
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn dims(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self, dim: usize) -> &[f64] {
        &self.edges[dim]
    }

    /// Values outside the configured range are not rejected, they land in the outermost buckets.
    pub fn discretize(&self, observation: &[f64]) -> Result<usize> {
        if observation.len() != self.dims() {
            return Err(QlError::ObservationArity {
                expected: self.dims(),
                actual: observation.len(),
            }
            .into());
        }
        Ok(observation
            .iter()
            .zip(self.edges.iter())
            .zip(self.weights.iter())
            .map(|((&value, edges), &weight)| digitize(value, edges) * weight)
            .sum())
    }
}

/// Number of edges `<= value`
pub fn digitize(value: f64, edges: &[f64]) -> usize {
    edges.partition_point(|&e| e <= value)
}

/// `n` evenly spaced values over `[start, stop]`; the last one is exactly `stop`
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}
