//! Simulation errors.

use thiserror::Error;

/// Errors raised before a simulation runs.
///
/// # Examples
/// ```
/// use fxvol_models::simulation::SimulationError;
///
/// let err = SimulationError::InvalidPathCount(0);
/// assert!(err.to_string().contains("Invalid path count 0"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Simulation count outside [1, 10_000_000].
    #[error("Invalid path count {0}: must be in range [1, 10_000_000]")]
    InvalidPathCount(usize),

    /// Step count outside [1, 100_000].
    #[error("Invalid step count {0}: must be in range [1, 100_000]")]
    InvalidStepCount(usize),

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },

    /// A shock matrix has the wrong dimensions.
    #[error("Shock matrix is {got_rows}x{got_cols}, expected {rows}x{cols}")]
    ShapeMismatch {
        /// Expected rows
        rows: usize,
        /// Expected columns
        cols: usize,
        /// Actual rows
        got_rows: usize,
        /// Actual columns
        got_cols: usize,
    },
}

/// Largest simulation count accepted.
pub const MAX_PATHS: usize = 10_000_000;

/// Largest step count accepted.
pub const MAX_STEPS: usize = 100_000;

pub(crate) fn check_dimensions(n_steps: usize, n_sims: usize) -> Result<(), SimulationError> {
    if !(1..=MAX_STEPS).contains(&n_steps) {
        return Err(SimulationError::InvalidStepCount(n_steps));
    }
    if !(1..=MAX_PATHS).contains(&n_sims) {
        return Err(SimulationError::InvalidPathCount(n_sims));
    }
    Ok(())
}
