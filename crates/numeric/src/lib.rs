//! Numerical building blocks for tabulated atomic data
//!
#![doc = include_str!("../readme.md")]
//!
//! ```rust
//! # use eprtools_numeric::{Interp, Tabular};
//! let xs = Tabular::new(vec![1.0, 10.0], vec![1.0, 100.0], Interp::LogLog).unwrap();
//! assert!((xs.evaluate(5.0) - 25.0).abs() < 1e-12);
//! ```

// Split into subfiles for development, but anything important is re-exported
mod error;
mod grid_generator;
mod interp;
mod quadrature;
mod tabular;
mod two_d;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use grid_generator::GridGenerator;

#[doc(inline)]
pub use interp::Interp;

#[doc(inline)]
pub use quadrature::GaussKronrod;

#[doc(inline)]
pub use tabular::Tabular;

#[doc(inline)]
pub use two_d::{TwoDGrid, TwoDInterp, TwoDTable};

/// Relative difference between two values, zero when both are zero
///
/// ```rust
/// # use eprtools_numeric::relative_error;
/// assert_eq!(relative_error(0.0, 0.0), 0.0);
/// assert_eq!(relative_error(1.0, 2.0), 0.5);
/// ```
pub fn relative_error(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        0.0
    } else {
        (a - b).abs() / a.abs().max(b.abs())
    }
}
