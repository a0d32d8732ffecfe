//! Numerical building blocks: interpolation, root finding, least squares
//! and quadrature.

pub mod interpolators;
pub mod quadrature;
pub mod solvers;
