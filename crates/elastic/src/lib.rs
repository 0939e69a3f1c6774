//! Moment preserving elastic angular distributions
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod legendre;
mod radau;
mod reducer;
mod sample;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use legendre::{legendre, legendre_series};

#[doc(inline)]
pub use radau::RadauQuadrature;

#[doc(inline)]
pub use reducer::{ElasticMomentReducer, MomentPreservingRepresentation};

#[doc(inline)]
pub use sample::{angles_from_delta_mu, cutoff_cdf, from_tail_interval, to_tail_interval, ElasticSample};

/// Angle cosine where the tabulated cutoff distribution ends
pub const PEAK_ANGLE_COSINE: f64 = 0.999999;

/// Width of the screened Rutherford peak, 1 - [PEAK_ANGLE_COSINE]
pub const DELTA_PEAK: f64 = 1e-6;

/// Largest cutoff angle cosine for which a reduction is attempted
pub const MAX_CUTOFF_ANGLE_COSINE: f64 = 0.999999;
