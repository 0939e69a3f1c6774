//! Union energy grids and cross sections retabulated onto them
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod aggregate;
mod error;
mod retabulate;
mod union;

pub mod constants;

#[doc(inline)]
pub use aggregate::{sum_subshells, TotalCrossSection};

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use retabulate::{
    populate, retabulate, retabulate_with, screened_rutherford, threshold_value, RetabulatedCrossSection,
};

#[doc(inline)]
pub use union::{build_union, UnionGridBuilder};
