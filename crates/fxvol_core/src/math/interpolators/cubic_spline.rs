//! Natural cubic spline interpolation.

use super::traits::{find_segment, out_of_bounds, sorted_knots};
use super::Interpolator;
use crate::types::InterpolationError;
use num_traits::Float;

/// Coefficients of one spline segment: `a + b·dx + c·dx² + d·dx³`.
#[derive(Debug, Clone, Copy)]
struct SplineCoeffs<T: Float> {
    a: T,
    b: T,
    c: T,
    d: T,
}

/// Natural cubic spline interpolator.
///
/// C² continuous with zero second derivative at both ends. At least three
/// knots are required.
///
/// # Example
///
/// ```
/// use fxvol_core::math::interpolators::{CubicSplineInterpolator, Interpolator};
///
/// let spline = CubicSplineInterpolator::<f64>::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap();
/// assert!((spline.interpolate(1.0).unwrap() - 1.0).abs() < 1e-12);
/// assert!(spline.interpolate(0.5).unwrap() > 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct CubicSplineInterpolator<T: Float> {
    xs: Vec<T>,
    coeffs: Vec<SplineCoeffs<T>>,
}

impl<T: Float> CubicSplineInterpolator<T> {
    /// Builds the spline from unsorted knots.
    ///
    /// # Errors
    ///
    /// * `InterpolationError::InvalidInput` - mismatched lengths or non-finite knots
    /// * `InterpolationError::InsufficientData` - fewer than three knots
    /// * `InterpolationError::NonMonotonicData` - duplicate abscissae
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        let (xs, ys) = sorted_knots(xs, ys, 3)?;
        let coeffs = Self::compute_coefficients(&xs, &ys);
        Ok(Self { xs, coeffs })
    }

    /// Solves the tridiagonal system for the interior second derivatives
    /// with the Thomas algorithm, then converts them to per-segment
    /// polynomial coefficients.
    fn compute_coefficients(xs: &[T], ys: &[T]) -> Vec<SplineCoeffs<T>> {
        let n = xs.len();
        let two = T::one() + T::one();
        let six = two + two + two;

        let h: Vec<T> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let slope: Vec<T> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

        // Row j is the equation at knot j + 1:
        // h[j]·M[j] + 2(h[j] + h[j+1])·M[j+1] + h[j+1]·M[j+2] = 6(slope[j+1] − slope[j])
        let interior = n - 2;
        let mut c_prime = vec![T::zero(); interior];
        let mut d_prime = vec![T::zero(); interior];
        for j in 0..interior {
            let sub = h[j];
            let diag = two * (h[j] + h[j + 1]);
            let sup = h[j + 1];
            let rhs = six * (slope[j + 1] - slope[j]);
            if j == 0 {
                c_prime[0] = sup / diag;
                d_prime[0] = rhs / diag;
            } else {
                let denom = diag - sub * c_prime[j - 1];
                c_prime[j] = sup / denom;
                d_prime[j] = (rhs - sub * d_prime[j - 1]) / denom;
            }
        }

        // Natural boundary: M[0] = M[n-1] = 0.
        let mut m = vec![T::zero(); n];
        for j in (0..interior).rev() {
            m[j + 1] = d_prime[j] - c_prime[j] * m[j + 2];
        }

        (0..n - 1)
            .map(|i| SplineCoeffs {
                a: ys[i],
                b: slope[i] - h[i] * (two * m[i] + m[i + 1]) / six,
                c: m[i] / two,
                d: (m[i + 1] - m[i]) / (six * h[i]),
            })
            .collect()
    }

    /// The sorted abscissae.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Number of knots.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always false: construction requires three knots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

impl<T: Float> Interpolator<T> for CubicSplineInterpolator<T> {
    fn interpolate(&self, x: T) -> Result<T, InterpolationError> {
        let (lo, hi) = self.domain();
        if !(x >= lo && x <= hi) {
            return Err(out_of_bounds(x, lo, hi));
        }

        let i = find_segment(&self.xs, x);
        let k = &self.coeffs[i];
        let dx = x - self.xs[i];
        Ok(k.a + dx * (k.b + dx * (k.c + dx * k.d)))
    }

    #[inline]
    fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}
