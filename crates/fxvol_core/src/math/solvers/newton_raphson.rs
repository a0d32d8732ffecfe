//! Newton-Raphson root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;

/// Smallest derivative magnitude accepted before giving up.
const MIN_DERIVATIVE: f64 = 1e-30;

/// Newton-Raphson root finder.
///
/// Iterates `x_{n+1} = x_n - f(x_n) / f'(x_n)`. Converges quadratically
/// near a simple root but may fail when the derivative vanishes or the
/// starting point is far away, so callers usually keep a bracketing
/// fallback at hand.
///
/// # Example
///
/// ```
/// use fxvol_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
///
/// let solver = NewtonRaphsonSolver::new(SolverConfig::default());
/// let root = solver.find_root(|x| x * x - 2.0, |x| 2.0 * x, 1.0).unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct NewtonRaphsonSolver {
    config: SolverConfig,
}

impl NewtonRaphsonSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Creates a solver with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Finds a root of `f` from `x0` using the explicit derivative `f_prime`.
    ///
    /// # Errors
    ///
    /// * `SolverError::DerivativeNearZero` - `|f'(x)|` fell below 1e-30
    /// * `SolverError::NumericalInstability` - an iterate became non-finite
    /// * `SolverError::MaxIterationsExceeded` - no convergence
    pub fn find_root<F, G>(&self, f: F, f_prime: G, x0: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
        G: Fn(f64) -> f64,
    {
        self.find_root_within(f, f_prime, x0, f64::NEG_INFINITY, f64::INFINITY)
    }

    /// As [`find_root`](Self::find_root), but fails as soon as an iterate
    /// leaves `[lower, upper]`.
    ///
    /// Useful when `f` is undefined outside a range, such as a price as a
    /// function of a strictly positive volatility.
    pub fn find_root_within<F, G>(
        &self,
        f: F,
        f_prime: G,
        x0: f64,
        lower: f64,
        upper: f64,
    ) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
        G: Fn(f64) -> f64,
    {
        let mut x = x0;

        for _ in 0..self.config.max_iterations {
            let f_val = f(x);
            if f_val.abs() < self.config.tolerance {
                return Ok(x);
            }

            let f_prime_val = f_prime(x);
            if !(f_prime_val.abs() >= MIN_DERIVATIVE) {
                return Err(SolverError::DerivativeNearZero { x });
            }

            x -= f_val / f_prime_val;

            if !x.is_finite() {
                return Err(SolverError::NumericalInstability(
                    "Newton iteration produced non-finite value".to_string(),
                ));
            }
            if x < lower || x > upper {
                return Err(SolverError::NumericalInstability(format!(
                    "Newton iterate {} left [{}, {}]",
                    x, lower, upper
                )));
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Returns the solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_find_cubic_root() {
        let solver = NewtonRaphsonSolver::with_defaults();
        let f = |x: f64| x * x * x - x - 2.0;
        let root = solver.find_root(f, |x| 3.0 * x * x - 1.0, 1.5).unwrap();
        assert!(f(root).abs() < 1e-10);
    }

    #[test]
    fn test_find_exp_root() {
        let solver = NewtonRaphsonSolver::with_defaults();
        let root = solver.find_root(|x| x.exp() - 2.0, f64::exp, 0.0).unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.ln(), epsilon = 1e-10);
    }

    #[test]
    fn test_zero_derivative() {
        let solver = NewtonRaphsonSolver::with_defaults();
        let result = solver.find_root(|x| x * x + 1.0, |x| 2.0 * x, 0.0);
        assert!(matches!(result, Err(SolverError::DerivativeNearZero { .. })));
    }

    #[test]
    fn test_leaving_range_fails() {
        let solver = NewtonRaphsonSolver::with_defaults();
        // The first step from 3 overshoots below zero.
        let result = solver.find_root_within(|x| x.ln(), |x| 1.0 / x, 3.0, 1e-8, 10.0);
        assert!(matches!(result, Err(SolverError::NumericalInstability(_))));
    }

    #[test]
    fn test_max_iterations() {
        let solver = NewtonRaphsonSolver::new(SolverConfig {
            tolerance: 1e-10,
            max_iterations: 3,
        });
        // Oscillates between 0 and 1 forever.
        let result = solver.find_root(|x| x * x * x - 2.0 * x + 2.0, |x| 3.0 * x * x - 2.0, 0.0);
        assert!(matches!(
            result,
            Err(SolverError::MaxIterationsExceeded { iterations: 3 })
        ));
    }
}
