//! Standard normal distribution functions.
//!
//! This module provides:
//! - `norm_cdf`: Cumulative distribution function (CDF)
//! - `norm_pdf`: Probability density function (PDF)
//!
//! The CDF follows Hart (1968) as presented by West (2005), "Better
//! approximations to cumulative normal functions", which is accurate to
//! double precision across the real line. Strike solving in the far wings
//! needs that accuracy; a 1e-7 approximation shifts 5-delta strikes.

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// sqrt(2 * pi)
const SQRT_2PI: f64 = 2.506_628_274_631;

/// Beyond this |x| the tail underflows in double precision.
const TAIL_CUTOFF: f64 = 37.0;

/// Switch point between the rational and continued-fraction branches.
const RATIONAL_LIMIT: f64 = 7.071_067_811_865_47;

const NUM: [f64; 7] = [
    3.526_249_659_989_11e-2,
    0.700_383_064_443_688,
    6.373_962_203_531_65,
    33.912_866_078_383,
    112.079_291_497_871,
    221.213_596_169_931,
    220.206_867_912_376,
];

const DEN: [f64; 8] = [
    8.838_834_764_831_84e-2,
    1.755_667_163_182_64,
    16.064_177_579_207,
    86.780_732_202_946_1,
    296.564_248_779_674,
    637.333_633_378_831,
    793.826_512_519_948,
    440.413_735_824_752,
];

/// Standard normal cumulative distribution function.
///
/// # Mathematical Definition
/// Φ(x) = P(X <= x) for X ~ N(0, 1)
///
/// # Accuracy
/// Absolute error below 1e-14 for all finite x.
///
/// # Examples
/// ```
/// use fxvol_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!((norm_cdf(1.96) - 0.975_002_104_851_780).abs() < 1e-14);
/// assert_eq!(norm_cdf(-40.0), 0.0);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    let z = x.abs();
    let tail = if z > TAIL_CUTOFF {
        0.0
    } else {
        let e = (-z * z / 2.0).exp();
        if z < RATIONAL_LIMIT {
            let num = NUM.iter().fold(0.0, |acc, &c| acc * z + c);
            let den = DEN.iter().fold(0.0, |acc, &c| acc * z + c);
            e * num / den
        } else {
            let cf = z + 1.0 / (z + 2.0 / (z + 3.0 / (z + 4.0 / (z + 0.65))));
            e / cf / SQRT_2PI
        }
    };

    if x > 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

/// Standard normal probability density function.
///
/// # Mathematical Definition
/// φ(x) = (1 / sqrt(2π)) * exp(-x² / 2)
///
/// # Examples
/// ```
/// use fxvol_models::analytical::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0) - 0.398_942_280_401_432_7).abs() < 1e-15);
/// ```
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-x * x / 2.0).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    // ==========================================================
    // norm_cdf
    // ==========================================================

    #[test]
    fn test_norm_cdf_known_values() {
        assert_abs_diff_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(norm_cdf(1.0), 0.841_344_746_068_542_9, epsilon = 1e-14);
        assert_abs_diff_eq!(norm_cdf(-1.0), 0.158_655_253_931_457_05, epsilon = 1e-14);
        assert_abs_diff_eq!(norm_cdf(-2.326_347_874_040_841), 0.01, epsilon = 1e-14);
        assert_abs_diff_eq!(norm_cdf(3.0), 0.998_650_101_968_369_9, epsilon = 1e-14);
    }

    #[test]
    fn test_norm_cdf_far_tail_branch() {
        // Continued-fraction branch; Φ(-8) = 6.22096057427178e-16
        assert_relative_eq!(norm_cdf(-8.0), 6.220_960_574_271_78e-16, max_relative = 1e-9);
        assert_eq!(norm_cdf(-38.0), 0.0);
        assert_eq!(norm_cdf(38.0), 1.0);
    }

    #[test]
    fn test_norm_cdf_branch_continuity() {
        let below = norm_cdf(-(RATIONAL_LIMIT - 1e-9));
        let above = norm_cdf(-(RATIONAL_LIMIT + 1e-9));
        assert_relative_eq!(below, above, max_relative = 1e-6);
    }

    // ==========================================================
    // norm_pdf
    // ==========================================================

    #[test]
    fn test_norm_pdf_symmetric_peak() {
        assert_relative_eq!(norm_pdf(0.0), FRAC_1_SQRT_2PI, epsilon = 1e-15);
        assert_relative_eq!(norm_pdf(1.3), norm_pdf(-1.3), epsilon = 1e-15);
        assert!(norm_pdf(1.0) < norm_pdf(0.5));
    }

    proptest! {
        #[test]
        fn prop_cdf_symmetry(x in -10.0f64..10.0) {
            prop_assert!((norm_cdf(x) + norm_cdf(-x) - 1.0).abs() < 1e-14);
        }

        #[test]
        fn prop_cdf_monotone(x in -10.0f64..10.0, dx in 1e-3f64..1.0) {
            prop_assert!(norm_cdf(x + dx) >= norm_cdf(x));
        }

        #[test]
        fn prop_pdf_is_cdf_derivative(x in -5.0f64..5.0) {
            let h = 1e-5;
            let numeric = (norm_cdf(x + h) - norm_cdf(x - h)) / (2.0 * h);
            prop_assert!((numeric - norm_pdf(x)).abs() < 1e-8);
        }
    }
}
