//! Root-finding and least-squares solvers.
//!
//! ## Root finding
//!
//! - [`NewtonRaphsonSolver`]: quadratic convergence from a good start, needs `f'`
//! - [`BrentSolver`]: bracketing, derivative free, always converges on a sign change
//!
//! Both take a [`SolverConfig`].
//!
//! ## Least squares
//!
//! - [`LevenbergMarquardtSolver`]: damped Gauss-Newton inside
//!   [`ParameterBounds`], configured by [`LMConfig`]
//!
//! ```
//! use fxvol_core::math::solvers::{BrentSolver, NewtonRaphsonSolver, SolverConfig};
//!
//! let f = |x: f64| x * x - 2.0;
//! let newton = NewtonRaphsonSolver::new(SolverConfig::default());
//! let brent = BrentSolver::new(SolverConfig::default());
//!
//! let a = newton.find_root(f, |x| 2.0 * x, 1.0).unwrap();
//! let b = brent.find_root(f, 0.0, 2.0).unwrap();
//! assert!((a - b).abs() < 1e-9);
//! ```

mod brent;
mod config;
mod levenberg_marquardt;
mod newton_raphson;

pub use brent::BrentSolver;
pub use config::SolverConfig;
pub use levenberg_marquardt::{LMConfig, LMResult, LevenbergMarquardtSolver, ParameterBounds};
pub use newton_raphson::NewtonRaphsonSolver;
