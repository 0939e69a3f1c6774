//! Electron-photon relaxation data generation
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod angular;
mod compton;
mod config;
mod container;
mod electron;
mod error;
mod generator;
mod incoherent;
mod photon;
mod provider;
mod relaxation;
mod tables;

#[doc(inline)]
pub use config::{GeneratorConfig, GridTolerances};

#[doc(inline)]
pub use container::EprDataContainer;

#[doc(inline)]
pub use error::{Error, ErrorKind, Result};

#[doc(inline)]
pub use generator::{GeneratorState, RelaxationDataGenerator};

#[doc(inline)]
pub use provider::{
    AceAndEndlReference, EndlReference, GeneratorVariant, ReferenceDataProvider, RelaxationTransition,
    SubshellRelaxation,
};

#[doc(inline)]
pub use tables::{
    AceTables, AceTransition, EndlTables, EnergyTable, NonRadiativeTransition, RadiativeTransition, Table,
};
