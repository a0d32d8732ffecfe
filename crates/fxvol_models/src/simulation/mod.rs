//! Monte-Carlo path simulation.
//!
//! - [`SimulationRng`]: seeded normals with optional antithetic mirroring
//! - [`simulate_gbm`]: log-exact GBM with per-step drift and volatility
//! - [`simulate_heston_qe`]: Heston spot and variance by Andersen's QE scheme
//!
//! Paths are [`PathMatrix`] values with one row per time point (row 0 is
//! the start) and one column per simulation.

mod error;
mod gbm;
mod heston_qe;
mod paths;
mod rng;

pub use error::{SimulationError, MAX_PATHS, MAX_STEPS};
pub use gbm::{simulate_gbm, simulate_gbm_paths, GbmStep};
pub use heston_qe::{simulate_heston_paths, simulate_heston_qe, HestonPaths};
pub use paths::PathMatrix;
pub use rng::SimulationRng;
