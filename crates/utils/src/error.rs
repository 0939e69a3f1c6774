//! Result and Error types for grid checks

/// Type alias for `Result<T, utils::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for `eprtools_utils`
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Grid has no values at all
    EmptyGrid,

    /// Grid contains NAN or INFINITY
    UndefinedGridValue,

    /// Energy searched for outside of the grid
    EnergyOutsideGrid {
        value: f64,
        lower_bound: f64,
        upper_bound: f64,
    },

    /// Grid is too short to form a single bin
    GridTooShort { length: usize, minimum_required: usize },

    /// Index of the first point that is not above its predecessor
    NotStrictlyAscending { index: usize },
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::EmptyGrid => write!(fmt, "grid contains no values"),
            Error::UndefinedGridValue => write!(fmt, "grid contains NAN or INFINITY"),
            Error::EnergyOutsideGrid {
                value,
                lower_bound,
                upper_bound,
            } => write!(fmt, "{value:e} is outside of the grid [{lower_bound:e}, {upper_bound:e}]"),
            Error::GridTooShort {
                length,
                minimum_required,
            } => write!(fmt, "grid has {length} points, at least {minimum_required} required"),
            Error::NotStrictlyAscending { index } => {
                write!(fmt, "grid is not strictly ascending at index {index}")
            }
        }
    }
}

impl std::error::Error for Error {}
