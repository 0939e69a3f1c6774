//! Result and Error types for eprtools-numeric

/// Type alias for Result<T, numeric::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `eprtools-numeric` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Failure in one of the slice utilities
    #[error("grid operation failed")]
    Utils(#[from] eprtools_utils::Error),

    #[error("tabulated data need at least {minimum:?} points (found {found:?})")]
    TooFewPoints { found: usize, minimum: usize },

    #[error("inconsistent table lengths (expected {expected:?}, found {found:?})")]
    LengthMismatch { expected: usize, found: usize },

    #[error("independent values decrease at index {0}")]
    Unsorted(usize),

    #[error("unknown interpolation policy \"{0}\"")]
    UnknownPolicy(String),

    /// A tolerance given to a grid generator or integrator is out of range
    #[error("{name} of {value:e} is outside of the allowed range {range}")]
    InvalidTolerance {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    /// Refinement stopped on the distance or absolute difference tolerance
    /// before the convergence tolerance was met
    #[error(
        "dirty convergence on [{lower:e}, {upper:e}] (relative error {relative_error:e} > {tolerance:e})"
    )]
    DirtyConvergence {
        lower: f64,
        upper: f64,
        relative_error: f64,
        tolerance: f64,
    },

    #[error("function evaluated to an undefined value at {0:e}")]
    UndefinedFunctionValue(f64),

    #[error(
        "quadrature on [{lower:e}, {upper:e}] did not converge (estimate {estimate:e}, error {error:e})"
    )]
    QuadratureNotConverged {
        lower: f64,
        upper: f64,
        estimate: f64,
        error: f64,
    },

    #[error("energy {energy:e} is outside of the 2-D table [{lower:e}, {upper:e}]")]
    EnergyOutsideTable { energy: f64, lower: f64, upper: f64 },
}
