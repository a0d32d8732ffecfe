//! The one-dimensional interpolator trait.

use crate::types::InterpolationError;
use num_traits::Float;

/// A one-dimensional interpolator over a closed domain.
///
/// `interpolate` is strict and rejects points outside `domain()`.
/// `interpolate_flat` clamps the query into the domain first, which makes
/// the boundary values hold beyond either end.
pub trait Interpolator<T: Float> {
    /// Interpolates at `x`.
    ///
    /// # Errors
    ///
    /// `InterpolationError::OutOfBounds` when `x` lies outside `domain()`.
    fn interpolate(&self, x: T) -> Result<T, InterpolationError>;

    /// The closed interval `[x_min, x_max]` covered by the data.
    fn domain(&self) -> (T, T);

    /// Interpolates at `x`, holding the boundary value outside the domain.
    fn interpolate_flat(&self, x: T) -> Result<T, InterpolationError> {
        let (lo, hi) = self.domain();
        self.interpolate(x.max(lo).min(hi))
    }
}

/// Validates and sorts knot data shared by all interpolators.
///
/// Returns the knots sorted by abscissa. Duplicate abscissae are rejected.
pub(crate) fn sorted_knots<T: Float>(
    xs: &[T],
    ys: &[T],
    need: usize,
) -> Result<(Vec<T>, Vec<T>), InterpolationError> {
    if xs.len() != ys.len() {
        return Err(InterpolationError::InvalidInput(format!(
            "xs and ys must have same length: got {} and {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < need {
        return Err(InterpolationError::InsufficientData {
            got: xs.len(),
            need,
        });
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return Err(InterpolationError::InvalidInput(
            "knots must be finite".to_string(),
        ));
    }

    let mut pairs: Vec<(T, T)> = xs.iter().copied().zip(ys.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    if let Some(index) = pairs.windows(2).position(|w| w[1].0 <= w[0].0) {
        return Err(InterpolationError::NonMonotonicData { index: index + 1 });
    }

    Ok(pairs.into_iter().unzip())
}

/// Index `i` such that `xs[i] <= x < xs[i + 1]`, clamped to `[0, n - 2]`.
#[inline]
pub(crate) fn find_segment<T: Float>(xs: &[T], x: T) -> usize {
    let pos = xs.partition_point(|&xi| xi <= x);
    pos.saturating_sub(1).min(xs.len().saturating_sub(2))
}

/// Builds the `OutOfBounds` error for `x` against `[lo, hi]`.
pub(crate) fn out_of_bounds<T: Float>(x: T, lo: T, hi: T) -> InterpolationError {
    InterpolationError::OutOfBounds {
        x: x.to_f64().unwrap_or(f64::NAN),
        min: lo.to_f64().unwrap_or(f64::NAN),
        max: hi.to_f64().unwrap_or(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_knots_sorts_pairs() {
        let (xs, ys) = sorted_knots(&[2.0, 0.0, 1.0], &[4.0, 0.0, 1.0], 2).unwrap();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        assert_eq!(ys, vec![0.0, 1.0, 4.0]);
    }

    #[test]
    fn test_sorted_knots_rejects_duplicates() {
        let result = sorted_knots(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0], 2);
        assert!(matches!(
            result,
            Err(InterpolationError::NonMonotonicData { index: 2 })
        ));
    }

    #[test]
    fn test_sorted_knots_rejects_nan() {
        let result = sorted_knots(&[0.0, f64::NAN], &[0.0, 1.0], 2);
        assert!(matches!(result, Err(InterpolationError::InvalidInput(_))));
    }

    #[test]
    fn test_find_segment_clamps() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(find_segment(&xs, -1.0), 0);
        assert_eq!(find_segment(&xs, 0.0), 0);
        assert_eq!(find_segment(&xs, 1.5), 1);
        assert_eq!(find_segment(&xs, 3.0), 2);
        assert_eq!(find_segment(&xs, 9.0), 2);
    }
}
