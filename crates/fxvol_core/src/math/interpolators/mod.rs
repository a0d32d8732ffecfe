//! One-dimensional interpolation.
//!
//! - [`LinearInterpolator`]: piecewise linear
//! - [`CubicSplineInterpolator`]: natural cubic spline, C² continuous
//! - [`MonotonicInterpolator`]: Fritsch-Carlson monotone cubic
//!
//! All of them implement [`Interpolator`], which is strict at the domain
//! edges and offers [`Interpolator::interpolate_flat`] for boundary-held
//! extrapolation. They are generic over `T: num_traits::Float`.
//!
//! ```
//! use fxvol_core::math::interpolators::{Interpolator, LinearInterpolator};
//!
//! let interp = LinearInterpolator::<f64>::new(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 4.0, 9.0]).unwrap();
//! assert_eq!(interp.domain(), (0.0, 3.0));
//! assert!((interp.interpolate(1.5).unwrap() - 2.5).abs() < 1e-10);
//! ```

mod cubic_spline;
mod linear;
mod monotonic;
mod traits;

pub use cubic_spline::CubicSplineInterpolator;
pub use linear::LinearInterpolator;
pub use monotonic::MonotonicInterpolator;
pub use traits::Interpolator;
