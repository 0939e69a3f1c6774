//! Result and Error types for eprtools-elastic

/// Type alias for Result<T, elastic::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `eprtools-elastic` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("numerical operation failed")]
    Numeric(#[from] eprtools_numeric::Error),

    #[error("cutoff angle cosine {0} is outside of [-1, 1]")]
    InvalidCutoffAngleCosine(f64),

    #[error("invalid elastic sample at {energy:e} MeV: {reason}")]
    InvalidSample { energy: f64, reason: String },

    /// No moment preserving quadrature could be found for an energy
    #[error("moment reduction failed at {energy:e} MeV: {reason}")]
    MomentReduction { energy: f64, reason: String },
}
