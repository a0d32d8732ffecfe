//! Seeded random numbers for path simulation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

use super::error::SimulationError;
use super::paths::PathMatrix;

/// Seeded, reproducible generator for simulation shocks.
///
/// # Examples
///
/// ```
/// use fxvol_models::simulation::SimulationRng;
///
/// let mut a = SimulationRng::from_seed(7);
/// let mut b = SimulationRng::from_seed(7);
/// assert_eq!(a.gen_normal(), b.gen_normal());
///
/// let shocks = a.normal_matrix(4, 6, true).unwrap();
/// assert_eq!(shocks.get(2, 0), -shocks.get(2, 3));
/// ```
#[derive(Debug, Clone)]
pub struct SimulationRng {
    inner: StdRng,
    seed: u64,
}

impl SimulationRng {
    /// Creates a generator from `seed`. Equal seeds give equal sequences.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed used at construction.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform in [0, 1).
    #[inline]
    pub fn gen_uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Standard normal (Ziggurat via `rand_distr`).
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fills `buffer` with standard normals.
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }

    /// `rows × cols` standard normals.
    ///
    /// With `antithetic`, only the first `cols / 2` columns are drawn and
    /// column `j + cols/2` is the negation of column `j`, so `cols` must be
    /// even.
    pub fn normal_matrix(
        &mut self,
        rows: usize,
        cols: usize,
        antithetic: bool,
    ) -> Result<PathMatrix, SimulationError> {
        if antithetic && cols % 2 != 0 {
            return Err(SimulationError::InvalidParameter {
                name: "n_sims",
                value: format!("antithetic variates need an even count, got {}", cols),
            });
        }
        let mut shocks = PathMatrix::filled(rows, cols, 0.0);
        for r in 0..rows {
            let row = shocks.row_mut(r);
            if antithetic {
                let (base, mirror) = row.split_at_mut(cols / 2);
                self.fill_normal(base);
                for (m, b) in mirror.iter_mut().zip(base.iter()) {
                    *m = -*b;
                }
            } else {
                self.fill_normal(row);
            }
        }
        Ok(shocks)
    }
}
