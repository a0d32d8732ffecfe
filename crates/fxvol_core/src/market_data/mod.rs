//! Market data: zero curves and the FX forward curve.
//!
//! - [`curves`]: the [`ZeroCurve`] trait with flat and interpolated implementations
//! - [`forward`]: [`ForwardCurve`], log-linear outright forwards keyed by date
//! - [`error`]: [`MarketDataError`]

pub mod curves;
pub mod error;
pub mod forward;

pub use curves::{CurveInterpolation, FlatZeroCurve, InterpolatedZeroCurve, ZeroCurve};
pub use error::MarketDataError;
pub use forward::ForwardCurve;
