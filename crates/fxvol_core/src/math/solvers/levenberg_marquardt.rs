//! Levenberg-Marquardt nonlinear least-squares solver with box constraints.
//!
//! Each iteration solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λ·diag(1 + JᵀJ)) δ = −Jᵀr
//! ```
//!
//! and accepts the trial point `p + δ` if it lowers the residual sum of
//! squares. With [`ParameterBounds`] every trial point is projected back
//! into the box before it is evaluated, so the residual function is never
//! called outside the bounds.
//!
//! # Example
//!
//! ```
//! use fxvol_core::math::solvers::{LevenbergMarquardtSolver, ParameterBounds};
//!
//! // Fit y = a·exp(−b·x) with b restricted to [0, 0.5].
//! let xs = [0.0, 1.0, 2.0, 3.0];
//! let ys = [2.0, 1.2, 0.75, 0.45];
//! let residuals = |p: &[f64]| -> Vec<f64> {
//!     xs.iter().zip(&ys).map(|(x, y)| p[0] * (-p[1] * x).exp() - y).collect()
//! };
//!
//! let bounds = ParameterBounds::new(vec![0.0, 0.0], vec![10.0, 0.5]).unwrap();
//! let solver = LevenbergMarquardtSolver::with_defaults();
//! let result = solver.solve_bounded(residuals, vec![1.0, 0.1], &bounds).unwrap();
//! assert!(result.params[1] <= 0.5);
//! ```

use crate::types::SolverError;

/// Configuration for the Levenberg-Marquardt solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LMConfig {
    /// Convergence tolerance on the residual norm and on the relative
    /// improvement of the sum of squares.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Factor to increase lambda on rejected step.
    pub lambda_up: f64,
    /// Factor to decrease lambda on accepted step.
    pub lambda_down: f64,
    /// Minimum damping factor.
    pub min_lambda: f64,
    /// Maximum damping factor.
    pub max_lambda: f64,
    /// Tolerance for parameter change convergence.
    pub param_tolerance: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-10,
            max_lambda: 1e10,
            param_tolerance: 1e-10,
        }
    }
}

impl LMConfig {
    /// Creates a configuration with the given tolerance and iteration cap.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Default::default()
        }
    }
}

/// Inclusive lower and upper bounds per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl ParameterBounds {
    /// Creates bounds from matching lower and upper vectors.
    ///
    /// # Errors
    ///
    /// `SolverError::NumericalInstability` when the lengths differ or a lower
    /// bound exceeds its upper bound.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, SolverError> {
        if lower.len() != upper.len() {
            return Err(SolverError::NumericalInstability(format!(
                "bounds length mismatch: {} lower vs {} upper",
                lower.len(),
                upper.len()
            )));
        }
        if let Some(i) = lower.iter().zip(&upper).position(|(lo, hi)| !(lo <= hi)) {
            return Err(SolverError::NumericalInstability(format!(
                "invalid bound for parameter {}: [{}, {}]",
                i, lower[i], upper[i]
            )));
        }
        Ok(Self { lower, upper })
    }

    /// Number of bounded parameters.
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    /// True when there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Clamps each parameter into its interval.
    pub fn project(&self, params: &mut [f64]) {
        for ((p, lo), hi) in params.iter_mut().zip(&self.lower).zip(&self.upper) {
            *p = p.max(*lo).min(*hi);
        }
    }

    fn upper(&self, i: usize) -> f64 {
        self.upper[i]
    }
}

/// Result of a Levenberg-Marquardt run.
#[derive(Debug, Clone, PartialEq)]
pub struct LMResult {
    /// Final parameters.
    pub params: Vec<f64>,
    /// Final residual sum of squares.
    pub residual_ss: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether a convergence criterion was met.
    pub converged: bool,
    /// Final lambda value.
    pub final_lambda: f64,
}

/// Levenberg-Marquardt nonlinear least-squares solver.
///
/// Minimises `‖r(p)‖²` for a residual function `r`. The Jacobian is taken
/// by forward differences. A run that hits the iteration cap still returns
/// `Ok` with `converged = false`; callers judge the fit by `residual_ss`.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardtSolver {
    config: LMConfig,
}

impl LevenbergMarquardtSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self { config }
    }

    /// Creates a solver with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LMConfig::default())
    }

    /// Returns the solver configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Solves the problem inside `bounds`. The starting point is projected
    /// into the box first.
    ///
    /// # Errors
    ///
    /// `SolverError::NumericalInstability` for an empty parameter or residual
    /// vector, non-finite residuals at the starting point, or a length
    /// mismatch between the parameters and the bounds.
    pub fn solve_bounded<F>(
        &self,
        residuals: F,
        initial_params: Vec<f64>,
        bounds: &ParameterBounds,
    ) -> Result<LMResult, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        if bounds.len() != initial_params.len() {
            return Err(SolverError::NumericalInstability(format!(
                "{} parameters but {} bounds",
                initial_params.len(),
                bounds.len()
            )));
        }
        self.run(residuals, initial_params, bounds)
    }

    fn run<F>(
        &self,
        residuals: F,
        initial_params: Vec<f64>,
        bounds: &ParameterBounds,
    ) -> Result<LMResult, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let n_params = initial_params.len();
        if n_params == 0 {
            return Err(SolverError::NumericalInstability(
                "Empty parameter vector".to_string(),
            ));
        }

        let mut params = initial_params;
        bounds.project(&mut params);
        let mut lambda = self.config.initial_lambda;

        let mut r = residuals(&params);
        if r.is_empty() {
            return Err(SolverError::NumericalInstability(
                "Empty residual vector".to_string(),
            ));
        }
        let mut ss = sum_of_squares(&r);
        if !ss.is_finite() {
            return Err(SolverError::NumericalInstability(
                "non-finite residuals at the starting point".to_string(),
            ));
        }

        let finish = |params, ss, iterations, converged, lambda| LMResult {
            params,
            residual_ss: ss,
            iterations,
            converged,
            final_lambda: lambda,
        };

        for iteration in 0..self.config.max_iterations {
            if ss.sqrt() < self.config.tolerance {
                return Ok(finish(params, ss, iteration, true, lambda));
            }

            let jacobian = compute_jacobian(&residuals, &params, &r, bounds);
            let delta = match solve_normal_equations(&jacobian, &r, lambda, n_params) {
                Some(d) => d,
                None => {
                    lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                    continue;
                }
            };

            let mut trial: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
            bounds.project(&mut trial);

            let step = trial
                .iter()
                .zip(&params)
                .map(|(t, p)| (t - p) * (t - p))
                .sum::<f64>()
                .sqrt();
            let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt().max(1.0);
            if step / param_norm < self.config.param_tolerance {
                return Ok(finish(params, ss, iteration, true, lambda));
            }

            let trial_r = residuals(&trial);
            let trial_ss = sum_of_squares(&trial_r);

            if trial_ss.is_finite() && trial_ss < ss {
                let improvement = (ss - trial_ss) / ss.max(f64::MIN_POSITIVE);
                params = trial;
                r = trial_r;
                ss = trial_ss;
                lambda = (lambda * self.config.lambda_down).max(self.config.min_lambda);
                if improvement < self.config.tolerance {
                    return Ok(finish(params, ss, iteration + 1, true, lambda));
                }
            } else {
                if lambda >= self.config.max_lambda {
                    return Ok(finish(params, ss, iteration + 1, false, lambda));
                }
                lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
            }
        }

        tracing::debug!(
            iterations = self.config.max_iterations,
            residual_ss = ss,
            "Levenberg-Marquardt hit the iteration cap"
        );
        Ok(finish(
            params,
            ss,
            self.config.max_iterations,
            false,
            lambda,
        ))
    }
}

/// Solves `(JᵀJ + λ·diag(1 + JᵀJ)) δ = −Jᵀr` by Cholesky.
fn solve_normal_equations(
    jacobian: &[Vec<f64>],
    residuals: &[f64],
    lambda: f64,
    n_params: usize,
) -> Option<Vec<f64>> {
    let mut jtj = vec![vec![0.0; n_params]; n_params];
    for (i, row) in jtj.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = jacobian.iter().map(|jr| jr[i] * jr[j]).sum();
        }
    }
    for (i, row) in jtj.iter_mut().enumerate() {
        row[i] += lambda * (1.0 + row[i]);
    }

    let jtr: Vec<f64> = (0..n_params)
        .map(|i| {
            -jacobian
                .iter()
                .zip(residuals)
                .map(|(jr, r)| jr[i] * r)
                .sum::<f64>()
        })
        .collect();

    solve_cholesky(&jtj, &jtr)
}

/// Forward-difference Jacobian. Steps backwards at an upper bound so the
/// residual function is only evaluated inside the box.
fn compute_jacobian<F>(
    residuals: &F,
    params: &[f64],
    r0: &[f64],
    bounds: &ParameterBounds,
) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n_params = params.len();
    let mut jacobian = vec![vec![0.0; n_params]; r0.len()];

    for j in 0..n_params {
        let mut h = 1e-7 * params[j].abs().max(1e-3);
        if params[j] + h > bounds.upper(j) {
            h = -h;
        }

        let mut bumped = params.to_vec();
        bumped[j] += h;
        let r_bumped = residuals(&bumped);

        for (row, (rb, r)) in jacobian.iter_mut().zip(r_bumped.iter().zip(r0)) {
            row[j] = (rb - r) / h;
        }
    }

    jacobian
}

#[inline]
fn sum_of_squares(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

/// Solves `A x = b` for symmetric positive definite `A`.
fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum = a[i][j] - (0..j).map(|k| l[i][k] * l[j][k]).sum::<f64>();
            if i == j {
                if !(sum > 0.0) {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum = b[i] - (0..i).map(|j| l[i][j] * y[j]).sum::<f64>();
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum = y[i] - ((i + 1)..n).map(|j| l[j][i] * x[j]).sum::<f64>();
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn wide(n: usize) -> ParameterBounds {
        ParameterBounds::new(vec![-1e6; n], vec![1e6; n]).unwrap()
    }

    // ==========================================================
    // Configuration and bounds
    // ==========================================================

    #[test]
    fn test_config_new_keeps_damping_defaults() {
        let config = LMConfig::new(1e-8, 50);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.tolerance, 1e-8);
        assert_eq!(config.initial_lambda, LMConfig::default().initial_lambda);
    }

    #[test]
    fn test_bounds_validation() {
        assert!(ParameterBounds::new(vec![0.0], vec![1.0, 2.0]).is_err());
        assert!(ParameterBounds::new(vec![2.0], vec![1.0]).is_err());
        let bounds = ParameterBounds::new(vec![0.0, -1.0], vec![1.0, 1.0]).unwrap();
        let mut p = [5.0, -3.0];
        bounds.project(&mut p);
        assert_eq!(p, [1.0, -1.0]);
    }

    // ==========================================================
    // Solving
    // ==========================================================

    #[test]
    fn test_solve_linear_residuals() {
        let solver = LevenbergMarquardtSolver::with_defaults();
        let result = solver
            .solve_bounded(|p: &[f64]| vec![p[0] - 2.0, p[1] - 3.0], vec![0.0, 0.0], &wide(2))
            .unwrap();
        assert!(result.converged);
        assert_abs_diff_eq!(result.params[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.params[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_solve_rosenbrock() {
        let solver = LevenbergMarquardtSolver::new(LMConfig::new(1e-12, 500));
        let result = solver
            .solve_bounded(
                |p: &[f64]| vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]],
                vec![-1.2, 1.0],
                &wide(2),
            )
            .unwrap();
        assert_abs_diff_eq!(result.params[0], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(result.params[1], 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_bounded_solution_sits_on_bound() {
        // Unconstrained optimum at 2; the box stops it at 1.5.
        let bounds = ParameterBounds::new(vec![0.0], vec![1.5]).unwrap();
        let solver = LevenbergMarquardtSolver::with_defaults();
        let result = solver
            .solve_bounded(|p: &[f64]| vec![p[0] - 2.0], vec![0.5], &bounds)
            .unwrap();
        assert_abs_diff_eq!(result.params[0], 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_bounded_never_evaluates_outside() {
        let bounds = ParameterBounds::new(vec![0.01], vec![1.0]).unwrap();
        let solver = LevenbergMarquardtSolver::with_defaults();
        let result = solver
            .solve_bounded(
                |p: &[f64]| {
                    assert!(p[0] >= 0.01 && p[0] <= 1.0, "evaluated at {}", p[0]);
                    vec![p[0].ln() + 10.0]
                },
                vec![0.5],
                &bounds,
            )
            .unwrap();
        assert_abs_diff_eq!(result.params[0], 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_params_is_error() {
        let solver = LevenbergMarquardtSolver::with_defaults();
        assert!(solver.solve_bounded(|_: &[f64]| vec![1.0], vec![], &wide(0)).is_err());
    }

    #[test]
    fn test_bounds_length_mismatch_is_error() {
        let bounds = ParameterBounds::new(vec![0.0], vec![1.0]).unwrap();
        let solver = LevenbergMarquardtSolver::with_defaults();
        assert!(solver
            .solve_bounded(|p: &[f64]| p.to_vec(), vec![0.5, 0.5], &bounds)
            .is_err());
    }
}
