//! Zero-rate curves.
//!
//! - [`ZeroCurve`]: date-keyed continuously compounded zero rates
//! - [`FlatZeroCurve`]: constant rate
//! - [`InterpolatedZeroCurve`]: pillar curve, [`CurveInterpolation`] between pillars

mod flat;
mod interpolated;
mod traits;

pub use flat::FlatZeroCurve;
pub use interpolated::{CurveInterpolation, InterpolatedZeroCurve};
pub use traits::ZeroCurve;
