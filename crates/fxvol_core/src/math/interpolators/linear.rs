//! Piecewise linear interpolation.

use super::traits::{find_segment, out_of_bounds, sorted_knots};
use super::Interpolator;
use crate::types::InterpolationError;
use num_traits::Float;

/// Piecewise linear interpolator.
///
/// Knots are sorted on construction and at least two are required.
///
/// # Example
///
/// ```
/// use fxvol_core::math::interpolators::{Interpolator, LinearInterpolator};
///
/// let interp = LinearInterpolator::<f64>::new(&[0.0, 1.0, 2.0], &[0.0, 2.0, 3.0]).unwrap();
/// assert_eq!(interp.domain(), (0.0, 2.0));
/// assert!((interp.interpolate(1.5).unwrap() - 2.5).abs() < 1e-12);
/// assert_eq!(interp.interpolate_flat(5.0).unwrap(), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
}

impl<T: Float> LinearInterpolator<T> {
    /// Builds the interpolator from unsorted knots.
    ///
    /// # Errors
    ///
    /// * `InterpolationError::InvalidInput` - mismatched lengths or non-finite knots
    /// * `InterpolationError::InsufficientData` - fewer than two knots
    /// * `InterpolationError::NonMonotonicData` - duplicate abscissae
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        let (xs, ys) = sorted_knots(xs, ys, 2)?;
        Ok(Self { xs, ys })
    }

    /// The sorted abscissae.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// The ordinates, in abscissa order.
    #[inline]
    pub fn ys(&self) -> &[T] {
        &self.ys
    }
}

impl<T: Float> Interpolator<T> for LinearInterpolator<T> {
    fn interpolate(&self, x: T) -> Result<T, InterpolationError> {
        let (lo, hi) = self.domain();
        if !(x >= lo && x <= hi) {
            return Err(out_of_bounds(x, lo, hi));
        }

        let i = find_segment(&self.xs, x);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let w = (x - x0) / (x1 - x0);
        Ok(y0 + w * (y1 - y0))
    }

    #[inline]
    fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}
