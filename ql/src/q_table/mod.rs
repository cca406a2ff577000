use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::ArrayView2;
use ndarray_npy::{write_npy, ViewNpyExt};

use crate::policy;
use crate::prelude::{ActionIndex, QlError};

/// `f64` views need the data section aligned to 8 bytes
const NPY_DATA_ALIGN: usize = std::mem::align_of::<f64>();

/// Dense table of action values: one row per discretized state, one column per action.
///
/// Entries only change through [QTable::update].
#[derive(Clone, Debug, PartialEq)]
pub struct QTable {
    rows: usize,
    actions: usize,
    /// row-major
    values: Vec<f64>,
}

impl QTable {
    /// All-zero table
    pub fn new(rows: usize, actions: usize) -> Result<Self> {
        let len = Self::checked_len(rows, actions)?;
        Ok(Self {
            rows,
            actions,
            values: vec![0.0; len],
        })
    }

    pub fn from_values(rows: usize, actions: usize, values: Vec<f64>) -> Result<Self> {
        let len = Self::checked_len(rows, actions)?;
        if values.len() != len {
            return Err(QlError::ShapeMismatch(format!(
                "{} values do not fill a table of shape ({}, {})",
                values.len(),
                rows,
                actions
            ))
            .into());
        }
        Ok(Self { rows, actions, values })
    }

    fn checked_len(rows: usize, actions: usize) -> Result<usize> {
        if rows == 0 || actions == 0 {
            return Err(QlError::ShapeMismatch(format!("empty table shape ({}, {})", rows, actions)).into());
        }
        rows.checked_mul(actions)
            .ok_or_else(|| QlError::ShapeMismatch(format!("table shape ({}, {}) too large", rows, actions)).into())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn actions(&self) -> usize {
        self.actions
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Fails unless every state index below `state_count` has a row and the columns match `action_space`
    pub fn check_fits(&self, state_count: usize, action_space: usize) -> Result<()> {
        if self.actions != action_space {
            return Err(QlError::ShapeMismatch(format!(
                "table has {} actions, environment has {}",
                self.actions, action_space
            ))
            .into());
        }
        if self.rows < state_count {
            return Err(QlError::ShapeMismatch(format!(
                "table has {} rows, discretizer produces up to {} states",
                self.rows, state_count
            ))
            .into());
        }
        Ok(())
    }

    fn index(&self, state: usize, action: ActionIndex) -> Result<usize> {
        if state >= self.rows || action >= self.actions {
            return Err(QlError::IndexOutOfBounds {
                state,
                action,
                rows: self.rows,
                actions: self.actions,
            }
            .into());
        }
        Ok(state * self.actions + action)
    }

    /// Action values of one state
    pub fn row(&self, state: usize) -> Result<&[f64]> {
        let start = self.index(state, 0)?;
        Ok(&self.values[start..start + self.actions])
    }

    pub fn get(&self, state: usize, action: ActionIndex) -> Result<f64> {
        Ok(self.values[self.index(state, action)?])
    }

    pub fn max_value(&self, state: usize) -> Result<f64> {
        Ok(self.row(state)?.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    pub fn greedy_action(&self, state: usize) -> Result<ActionIndex> {
        Ok(policy::greedy_action(self.row(state)?))
    }

    /// Q-learning (off-policy TD) update of a single entry:
    ///
    /// `Q(s,a) ← Q(s,a) + α[r + 𝛾 max_a' Q(s',a') - Q(s,a)]`
    ///
    /// The bootstrap always uses the best next-state value, whatever action is taken next.
    /// Returns the new value of `Q(s,a)`.
    pub fn update(
        &mut self,
        state: usize,
        action: ActionIndex,
        reward: f64,
        next_state: usize,
        alpha: f64,
        gamma: f64,
    ) -> Result<f64> {
        let i = self.index(state, action)?;
        let target = reward + gamma * self.max_value(next_state)?;
        let q = &mut self.values[i];
        *q += alpha * (target - *q);
        Ok(*q)
    }

    /// Writes the table as a 2-D `float64` array in NumPy `.npy` format
    pub fn save(&self, path: &Path) -> Result<()> {
        let array = ArrayView2::from_shape((self.rows, self.actions), &self.values)?;
        write_npy(path, &array).with_context(|| format!("writing q-table to {}", path.display()))?;
        Ok(())
    }

    /// Reads a 2-D `float64` `.npy` array. The declared shape is checked against the file length before the values
    /// are taken over, so a malformed header is rejected instead of allocating its claimed size.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading q-table from {}", path.display()))?;

        let mut buffer = vec![0_u8; bytes.len() + NPY_DATA_ALIGN];
        let offset = buffer.as_ptr().align_offset(NPY_DATA_ALIGN);
        if offset >= NPY_DATA_ALIGN {
            return Err(QlError::Persistence("unable to align read buffer".to_string()).into());
        }
        buffer[offset..offset + bytes.len()].copy_from_slice(&bytes);

        let view = ArrayView2::<f64>::view_npy(&buffer[offset..offset + bytes.len()])
            .map_err(|e| QlError::Persistence(format!("{}: {}", path.display(), e)))?;
        let (rows, actions) = view.dim();
        Self::from_values(rows, actions, view.iter().copied().collect())
    }
}
