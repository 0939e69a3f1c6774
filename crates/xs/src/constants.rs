//! Physical constants used when building grids and cross sections
//!
//! Energies are in MeV and areas in barns.

/// Electron rest mass energy (MeV)
pub const ELECTRON_REST_MASS_ENERGY: f64 = 0.51099895;

/// Pair production threshold, 2 mₑc² (MeV)
pub const PAIR_PRODUCTION_THRESHOLD: f64 = 2.0 * ELECTRON_REST_MASS_ENERGY;

/// Triplet production threshold, 4 mₑc² (MeV)
pub const TRIPLET_PRODUCTION_THRESHOLD: f64 = 4.0 * ELECTRON_REST_MASS_ENERGY;

/// Inverse of the fine structure constant
pub const INVERSE_FINE_STRUCTURE_CONSTANT: f64 = 137.035999084;

/// Classical electron radius (cm)
pub const CLASSICAL_ELECTRON_RADIUS: f64 = 2.8179403262e-13;

/// Conversion from cm² to barns
pub const BARNS_PER_SQUARE_CM: f64 = 1e24;

/// Offset below a binding energy added to union grids (MeV)
pub const BINDING_ENERGY_OFFSET: f64 = 1e-9;
