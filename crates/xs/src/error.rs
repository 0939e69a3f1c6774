//! Result and Error types for eprtools-xs

/// Type alias for Result<T, xs::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `eprtools-xs` crate
///
/// Grid construction failures are the nudge and empty grid variants, while
/// negative values and size mismatches are data consistency failures.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("numerical operation failed")]
    Numeric(#[from] eprtools_numeric::Error),

    #[error("grid operation failed")]
    Utils(#[from] eprtools_utils::Error),

    /// Coincident grid points could not be separated
    #[error("grid point {value:e} still coincident after {nudges} nudges")]
    NudgeLimitExceeded { value: f64, nudges: usize },

    #[error("nudge factor must be at least 1.0 (found {0})")]
    InvalidNudgeFactor(f64),

    #[error("union grid needs at least two points (found {0})")]
    DegenerateGrid(usize),

    /// Retabulation produced a negative cross section
    #[error("negative cross section {value:e} at grid index {index}")]
    NegativeCrossSection { index: usize, value: f64 },

    #[error("cross section does not fit the grid (expected {expected:?}, found {found:?})")]
    SizeMismatch { expected: usize, found: usize },
}
