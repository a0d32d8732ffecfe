//! Fritsch-Carlson monotone cubic interpolation.
//!
//! A piecewise cubic Hermite interpolant whose node derivatives are limited
//! so that the curve never overshoots between knots. On monotone data the
//! result is monotone; in general every segment stays within the range of
//! its two end values.

use super::traits::{find_segment, out_of_bounds, sorted_knots};
use super::Interpolator;
use crate::types::InterpolationError;
use num_traits::Float;

/// Monotonicity-preserving cubic Hermite interpolator.
///
/// # Example
///
/// ```
/// use fxvol_core::math::interpolators::{Interpolator, MonotonicInterpolator};
///
/// let interp = MonotonicInterpolator::<f64>::new(&[0.0, 1.0, 2.0, 3.0], &[0.0, 0.0, 1.0, 1.0]).unwrap();
/// let y = interp.interpolate(0.5).unwrap();
/// assert!(y.abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct MonotonicInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
    slopes: Vec<T>,
}

impl<T: Float> MonotonicInterpolator<T> {
    /// Builds the interpolator from unsorted knots. Two knots are enough;
    /// the result is then linear.
    ///
    /// # Errors
    ///
    /// * `InterpolationError::InvalidInput` - mismatched lengths or non-finite knots
    /// * `InterpolationError::InsufficientData` - fewer than two knots
    /// * `InterpolationError::NonMonotonicData` - duplicate abscissae
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        let (xs, ys) = sorted_knots(xs, ys, 2)?;
        let slopes = Self::limited_slopes(&xs, &ys);
        Ok(Self { xs, ys, slopes })
    }

    fn limited_slopes(xs: &[T], ys: &[T]) -> Vec<T> {
        let n = xs.len();
        let two = T::one() + T::one();
        let three = two + T::one();
        let secants: Vec<T> = (0..n - 1)
            .map(|i| (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]))
            .collect();

        let mut m = vec![T::zero(); n];
        m[0] = secants[0];
        m[n - 1] = secants[n - 2];
        for i in 1..n - 1 {
            m[i] = if secants[i - 1] * secants[i] <= T::zero() {
                T::zero()
            } else {
                (secants[i - 1] + secants[i]) / two
            };
        }

        for (i, &delta) in secants.iter().enumerate() {
            if delta == T::zero() {
                m[i] = T::zero();
                m[i + 1] = T::zero();
                continue;
            }
            let alpha = m[i] / delta;
            let beta = m[i + 1] / delta;
            // Keep (alpha, beta) inside the circle of radius 3.
            let radius = alpha * alpha + beta * beta;
            if radius > three * three {
                let tau = three / radius.sqrt();
                m[i] = tau * alpha * delta;
                m[i + 1] = tau * beta * delta;
            }
        }
        m
    }

    /// The sorted abscissae.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }
}

impl<T: Float> Interpolator<T> for MonotonicInterpolator<T> {
    fn interpolate(&self, x: T) -> Result<T, InterpolationError> {
        let (lo, hi) = self.domain();
        if !(x >= lo && x <= hi) {
            return Err(out_of_bounds(x, lo, hi));
        }

        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let t = (x - self.xs[i]) / h;
        let t2 = t * t;
        let t3 = t2 * t;
        let two = T::one() + T::one();
        let three = two + T::one();

        let h00 = two * t3 - three * t2 + T::one();
        let h10 = t3 - two * t2 + t;
        let h01 = three * t2 - two * t3;
        let h11 = t3 - t2;

        Ok(h00 * self.ys[i]
            + h10 * h * self.slopes[i]
            + h01 * self.ys[i + 1]
            + h11 * h * self.slopes[i + 1])
    }

    #[inline]
    fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}
