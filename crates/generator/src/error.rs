//! Result and Error types for eprtools-generator

use crate::generator::GeneratorState;

/// Type alias for Result<T, generator::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `eprtools-generator` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to (de)serialise json")]
    JsonError(#[from] serde_json::Error),

    #[error("failed to (de)serialise binary data")]
    BincodeError(#[from] Box<bincode::ErrorKind>),

    #[error("failed to initialise progress bar: {0}")]
    ProgressBarError(String),

    #[error("slice operation failed")]
    UtilsError(#[from] eprtools_utils::Error),

    #[error("cross section failure")]
    CrossSectionError(#[from] eprtools_xs::Error),

    #[error("numerical failure")]
    NumericError(#[from] eprtools_numeric::Error),

    #[error("elastic reduction failure")]
    ElasticError(#[from] eprtools_elastic::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("inconsistent data: {0}")]
    DataConsistency(String),

    #[error("atomic numbers differ between the ACE ({ace:?}) and ENDL ({endl:?}) tables")]
    AtomicNumberMismatch { ace: u32, endl: u32 },

    #[error("no {quantity} data for subshell {subshell:?}")]
    MissingSubshellData {
        quantity: &'static str,
        subshell: u32,
    },

    #[error("generator is {found:?}, expected {expected:?}")]
    InvalidState {
        found: GeneratorState,
        expected: GeneratorState,
    },
}

/// Broad failure categories of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any stage ran
    Configuration,
    /// Nudge limit exceeded or dirty grid convergence
    GridConstruction,
    /// Negative values, size mismatches and malformed tables
    DataConsistency,
    /// Discrete elastic angles could not be built
    MomentReduction,
    /// Reading or writing files
    Io,
}

impl Error {
    /// Category of the failure
    ///
    /// ```rust
    /// # use eprtools_generator::{Error, ErrorKind};
    /// let error = Error::InvalidConfiguration("min > max".to_string());
    /// assert_eq!(error.kind(), ErrorKind::Configuration);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        use eprtools_elastic::Error as ElasticError;
        use eprtools_numeric::Error as NumericError;
        use eprtools_xs::Error as XsError;

        match self {
            Error::IOError(_) | Error::JsonError(_) | Error::BincodeError(_) | Error::ProgressBarError(_) => {
                ErrorKind::Io
            }
            Error::InvalidConfiguration(_) | Error::InvalidState { .. } => ErrorKind::Configuration,
            Error::CrossSectionError(XsError::NudgeLimitExceeded { .. })
            | Error::CrossSectionError(XsError::DegenerateGrid(_))
            | Error::CrossSectionError(XsError::Numeric(NumericError::DirtyConvergence { .. }))
            | Error::NumericError(NumericError::DirtyConvergence { .. }) => ErrorKind::GridConstruction,
            Error::CrossSectionError(XsError::InvalidNudgeFactor(_))
            | Error::NumericError(NumericError::InvalidTolerance { .. }) => ErrorKind::Configuration,
            Error::ElasticError(ElasticError::InvalidCutoffAngleCosine(_)) => ErrorKind::Configuration,
            Error::ElasticError(_) => ErrorKind::MomentReduction,
            _ => ErrorKind::DataConsistency,
        }
    }
}
