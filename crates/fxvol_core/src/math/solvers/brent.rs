//! Brent's method root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;

/// Brent's method root finder.
///
/// Combines bisection, secant steps and inverse quadratic interpolation. It
/// needs no derivative and always converges on a continuous function with a
/// sign change across the bracket.
///
/// # Example
///
/// ```
/// use fxvol_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
/// let f = |x: f64| x * x * x - x - 2.0;
/// let root = solver.find_root(f, 1.0, 2.0).unwrap();
/// assert!(f(root).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver {
    config: SolverConfig,
}

impl BrentSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Creates a solver with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Finds a root of `f` in `[a, b]`.
    ///
    /// # Errors
    ///
    /// * `SolverError::NoBracket` - `f(a)` and `f(b)` have the same sign
    /// * `SolverError::NumericalInstability` - `f` is not finite at an endpoint
    /// * `SolverError::MaxIterationsExceeded` - no convergence
    pub fn find_root<F>(&self, f: F, a: f64, b: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        let (mut a, mut b) = (a, b);
        let mut fa = f(a);
        let mut fb = f(b);

        if !fa.is_finite() || !fb.is_finite() {
            return Err(SolverError::NumericalInstability(format!(
                "non-finite function value at bracket [{}, {}]",
                a, b
            )));
        }
        if fa == 0.0 {
            return Ok(a);
        }
        if fb == 0.0 {
            return Ok(b);
        }
        if fa.signum() == fb.signum() {
            return Err(SolverError::NoBracket { a, b });
        }

        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        for _ in 0..self.config.max_iterations {
            // Keep the root between b and c.
            if fb.signum() == fc.signum() {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            // b is the best estimate so far.
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * self.config.tolerance;
            let m = 0.5 * (c - b);
            if m.abs() <= tol || fb == 0.0 {
                return Ok(b);
            }

            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    // Secant
                    (2.0 * m * s, 1.0 - s)
                } else {
                    // Inverse quadratic
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * m * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();

                let interp_limit = 3.0 * m * q - (tol * q).abs();
                let step_limit = (e * q).abs();
                if 2.0 * p < interp_limit.min(step_limit) {
                    e = d;
                    d = p / q;
                } else {
                    d = m;
                    e = m;
                }
            } else {
                d = m;
                e = m;
            }

            a = b;
            fa = fb;
            b += if d.abs() > tol { d } else { tol.copysign(m) };
            fb = f(b);
            if !fb.is_finite() {
                return Err(SolverError::NumericalInstability(format!(
                    "non-finite function value at x = {}",
                    b
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

    // ==========================================================
    // Basic roots
    // ==========================================================

    #[test]
    fn test_find_sqrt_2() {
        let solver = BrentSolver::with_defaults();
        let root = solver.find_root(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert_abs_diff_eq!(root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_find_sin_root() {
        let solver = BrentSolver::with_defaults();
        let root = solver.find_root(f64::sin, 3.0, 4.0).unwrap();
        assert_abs_diff_eq!(root, std::f64::consts::PI, epsilon = 1e-10);
    }

    #[test]
    fn test_reversed_bracket() {
        let solver = BrentSolver::with_defaults();
        let root = solver.find_root(|x| x.exp() - 2.0, 1.0, 0.0).unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.ln(), epsilon = 1e-10);
    }

    #[test]
    fn test_root_at_endpoint() {
        let solver = BrentSolver::with_defaults();
        assert_eq!(solver.find_root(|x| x - 1.0, 1.0, 3.0).unwrap(), 1.0);
    }

    #[test]
    fn test_steep_function() {
        // Normal-cdf-like shape typical of delta equations.
        let solver = BrentSolver::with_defaults();
        let root = solver
            .find_root(|x: f64| (20.0 * (x - 0.3)).tanh() - 0.5, -10.0, 10.0)
            .unwrap();
        assert_abs_diff_eq!(root, 0.3 + 0.5_f64.atanh() / 20.0, epsilon = 1e-10);
    }

    // ==========================================================
    // Errors
    // ==========================================================

    #[test]
    fn test_no_bracket() {
        let solver = BrentSolver::with_defaults();
        match solver.find_root(|x| x * x + 1.0, -1.0, 1.0) {
            Err(SolverError::NoBracket { a, b }) => {
                assert_eq!(a, -1.0);
                assert_eq!(b, 1.0);
            }
            other => panic!("Expected NoBracket, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_endpoint() {
        let solver = BrentSolver::with_defaults();
        let result = solver.find_root(|x: f64| x.ln(), -1.0, 2.0);
        assert!(matches!(result, Err(SolverError::NumericalInstability(_))));
    }

    #[test]
    fn test_max_iterations() {
        let solver = BrentSolver::new(SolverConfig {
            tolerance: 1e-300,
            max_iterations: 2,
        });
        let result = solver.find_root(|x| x * x * x - 0.3, 0.0, 1.0);
        assert!(matches!(
            result,
            Err(SolverError::MaxIterationsExceeded { iterations: 2 })
        ));
    }
}
