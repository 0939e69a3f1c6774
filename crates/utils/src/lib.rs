//! Grid and formatting helpers shared by the `eprtools` crates
//!
//! Energy grids are plain float slices, so the checks and bin searches live
//! on an extension trait rather than a wrapper type.

// Alias for the format! macro
pub use std::format as f;

mod error;
mod slice_ext;
mod value_ext;

pub use error::{Error, Result};
pub use slice_ext::SliceExt;
pub use value_ext::ValueExt;
