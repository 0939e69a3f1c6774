//! Already extracted ENDL and ACE tables
//!
//! The raw file formats are not parsed here. These structures hold the
//! tables a reader extracts, and can be filled from JSON.

// crate modules
use crate::error::{Error, Result};

// eprtools modules
use eprtools_numeric::{Interp, Tabular, TwoDTable};
use eprtools_utils::SliceExt;

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// external crates
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A single tabulated function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Independent values
    pub x: Vec<f64>,
    /// Dependent values
    pub y: Vec<f64>,
}

impl Table {
    /// New table from its values
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    /// Checked tabular function with an interpolation policy
    pub fn tabular(&self, interp: Interp) -> Result<Tabular> {
        Ok(Tabular::new(self.x.clone(), self.y.clone(), interp)?)
    }

    /// Log-log cross section from the first non-zero value on
    ///
    /// Tables that start at a threshold with a zero value cannot be used on
    /// log-log, so the leading zeros are dropped.
    ///
    /// ```rust
    /// # use eprtools_generator::Table;
    /// let table = Table::new(vec![1.0, 2.0, 4.0], vec![0.0, 1.0, 4.0]);
    /// let cross_section = table.cross_section().unwrap();
    /// assert_eq!(cross_section.lower_bound(), 2.0);
    /// assert!((cross_section.evaluate(3.0) - 2.25).abs() < 1e-12);
    /// ```
    pub fn cross_section(&self) -> Result<Tabular> {
        let start = self.y.iter().position(|y| *y > 0.0).unwrap_or(self.y.len());

        Ok(Tabular::new(
            self.x.iter().skip(start).copied().collect(),
            self.y.iter().skip(start).copied().collect(),
            Interp::LogLog,
        )?)
    }

    /// The table without its first point
    ///
    /// Form factors and scattering functions start at zero momentum, which
    /// log-log interpolation cannot use.
    pub fn without_first_point(&self) -> Table {
        Table {
            x: self.x.iter().skip(1).copied().collect(),
            y: self.y.iter().skip(1).copied().collect(),
        }
    }
}

/// Secondary distributions tabulated per incident energy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyTable {
    /// Incident energies (MeV)
    pub energies: Vec<f64>,
    /// Secondary grid at each incident energy
    pub x: Vec<Vec<f64>>,
    /// Probability density at each incident energy
    pub pdf: Vec<Vec<f64>>,
}

impl EnergyTable {
    /// Lin-lin 2-D table of the distributions
    pub fn two_d(&self) -> Result<TwoDTable> {
        if self.x.len() != self.energies.len() || self.pdf.len() != self.energies.len() {
            return Err(Error::DataConsistency(format!(
                "{} incident energies with {} secondary grids and {} pdfs",
                self.energies.len(),
                self.x.len(),
                self.pdf.len()
            )));
        }

        let distributions = self
            .x
            .iter()
            .zip(self.pdf.iter())
            .map(|(x, pdf)| Tabular::new(x.clone(), pdf.clone(), Interp::LinLin))
            .collect::<std::result::Result<Vec<Tabular>, _>>()?;

        Ok(TwoDTable::new(self.energies.clone(), distributions)?)
    }

    /// Flatten a 2-D table back into its stored form
    pub fn from_two_d(table: &TwoDTable) -> Self {
        Self {
            energies: table.energies().to_vec(),
            x: table.distributions().iter().map(|d| d.x().to_vec()).collect(),
            pdf: table.distributions().iter().map(|d| d.y().to_vec()).collect(),
        }
    }

    /// Number of incident energies
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    /// True if there are no incident energies
    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }
}

/// Radiative transition filling a vacancy from another shell
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RadiativeTransition {
    /// Shell the filling electron comes from
    pub shell: u32,
    /// Transition probability
    pub probability: f64,
    /// Emitted photon energy (MeV)
    pub energy: f64,
}

/// Non-radiative transition leaving two new vacancies
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NonRadiativeTransition {
    /// Shell the filling electron comes from
    pub primary: u32,
    /// Shell the emitted electron comes from
    pub secondary: u32,
    /// Transition probability
    pub probability: f64,
    /// Emitted electron energy (MeV)
    pub energy: f64,
}

/// Transition as stored in ACE relaxation data
///
/// A secondary shell of zero marks a radiative transition. Probabilities are
/// cumulative over the transitions of a shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AceTransition {
    /// Shell the filling electron comes from
    pub primary: u32,
    /// Shell the emitted electron comes from, zero for a photon
    pub secondary: u32,
    /// Emitted particle energy (MeV)
    pub energy: f64,
    /// Cumulative probability
    pub cumulative_probability: f64,
}

/// Extracted ENDL tables of one element
///
/// Subshells use ENDF designators. Compton profile momenta are in atomic
/// units, angular distributions are tabulated against `1 - μ`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndlTables {
    pub atomic_number: u32,
    pub atomic_weight: f64,

    pub subshells: Vec<u32>,
    pub subshell_occupancies: BTreeMap<u32, f64>,
    pub subshell_binding_energies: BTreeMap<u32, f64>,
    pub radiative_transitions: BTreeMap<u32, Vec<RadiativeTransition>>,
    pub non_radiative_transitions: BTreeMap<u32, Vec<NonRadiativeTransition>>,

    pub coherent_cross_section: Table,
    pub coherent_form_factor: Table,
    pub incoherent_cross_section: Table,
    pub incoherent_scattering_function: Table,
    pub pair_production_cross_section: Table,
    pub triplet_production_cross_section: Table,
    pub photoelectric_cross_sections: BTreeMap<u32, Table>,
    pub compton_profiles: BTreeMap<u32, Table>,

    pub cutoff_elastic_cross_section: Table,
    pub total_elastic_cross_section: Table,
    pub elastic_angular_distribution: EnergyTable,
    pub electroionization_cross_sections: BTreeMap<u32, Table>,
    pub electroionization_recoil: BTreeMap<u32, EnergyTable>,
    pub bremsstrahlung_cross_section: Table,
    pub bremsstrahlung_photon: EnergyTable,
    pub atomic_excitation_cross_section: Table,
    pub atomic_excitation_energy_loss: Table,
}

impl EndlTables {
    /// Read the tables from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json(path)
    }

    /// Photon energy range covered by the coherent and incoherent tables
    pub fn photon_energy_limits(&self) -> Result<(f64, f64)> {
        let energies = self
            .coherent_cross_section
            .x
            .iter()
            .chain(self.incoherent_cross_section.x.iter())
            .copied()
            .collect::<Vec<f64>>();

        Ok((energies.try_min()?, energies.try_max()?))
    }

    /// Electron energy range covered by the elastic tables
    pub fn electron_energy_limits(&self) -> Result<(f64, f64)> {
        let energies = &self.cutoff_elastic_cross_section.x;
        Ok((energies.try_min()?, energies.try_max()?))
    }

    /// Binding energy of a subshell (MeV)
    pub fn binding_energy(&self, subshell: u32) -> Result<f64> {
        subshell_value(&self.subshell_binding_energies, subshell, "binding energy")
    }

    /// Electron occupancy of a subshell
    pub fn occupancy(&self, subshell: u32) -> Result<f64> {
        subshell_value(&self.subshell_occupancies, subshell, "occupancy")
    }

    /// Binding energies of every subshell in subshell order
    pub fn binding_energies(&self) -> Result<Vec<f64>> {
        self.subshells
            .iter()
            .map(|s| self.binding_energy(*s))
            .collect()
    }
}

/// Extracted ACE photoatomic tables of one element
///
/// The photon grid and cross sections are stored as natural logs, with a
/// zero entry standing in for a zero cross section. Subshells use the same
/// designators as the ENDL tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AceTables {
    pub atomic_number: u32,

    pub ln_energy_grid: Vec<f64>,
    pub ln_incoherent_cross_section: Vec<f64>,
    pub ln_coherent_cross_section: Vec<f64>,
    pub heating_numbers: Vec<f64>,

    pub subshells: Vec<u32>,
    pub subshell_occupancies: BTreeMap<u32, f64>,
    pub subshell_binding_energies: BTreeMap<u32, f64>,
    pub ln_subshell_photoelectric_cross_sections: BTreeMap<u32, Vec<f64>>,
    pub relaxation_transitions: BTreeMap<u32, Vec<AceTransition>>,

    pub compton_profiles: BTreeMap<u32, Table>,
    pub incoherent_scattering_function: Table,
    pub coherent_form_factor: Table,
}

impl AceTables {
    /// Read the tables from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json(path)
    }

    /// Photon energy range of the ACE grid
    pub fn photon_energy_limits(&self) -> Result<(f64, f64)> {
        let energies = self
            .ln_energy_grid
            .iter()
            .map(|e| e.exp())
            .collect::<Vec<f64>>();

        Ok((energies.try_min()?, energies.try_max()?))
    }
}

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub(crate) fn subshell_value<T: Clone>(
    map: &BTreeMap<u32, T>,
    subshell: u32,
    quantity: &'static str,
) -> Result<T> {
    map.get(&subshell)
        .cloned()
        .ok_or(Error::MissingSubshellData { quantity, subshell })
}
