//! `eprtools` is a semi-modular toolkit for generating tabulated
//! electron-photon relaxation data
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use eprtools_numeric as numeric;

#[doc(inline)]
pub use eprtools_utils as utils;

#[cfg(feature = "xs")]
#[cfg_attr(docsrs, doc(cfg(feature = "xs")))]
#[doc(inline)]
pub use eprtools_xs as xs;

#[cfg(feature = "elastic")]
#[cfg_attr(docsrs, doc(cfg(feature = "elastic")))]
#[doc(inline)]
pub use eprtools_elastic as elastic;

#[cfg(feature = "generator")]
#[cfg_attr(docsrs, doc(cfg(feature = "generator")))]
#[doc(inline)]
pub use eprtools_generator as generator;
