// crate modules
use crate::config::GridTolerances;
use crate::error::{Error, Result};
use crate::tables::EnergyTable;

// eprtools modules
use eprtools_numeric::{Interp, TwoDGrid, TwoDInterp};
use eprtools_utils::SliceExt;
use eprtools_xs::RetabulatedCrossSection;

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// external crates
use serde::{Deserialize, Serialize};

/// Generated electron-photon relaxation data for one element
///
/// Retabulated cross sections are stored from their threshold index on the
/// union grid of their particle type. Per-subshell data are keyed by ENDF
/// subshell designator, and elastic angular data are aligned with the
/// `elastic_angular_energy_grid`.
///
/// Field names are the persisted contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EprDataContainer {
    // Table data
    pub atomic_number: u32,
    pub atomic_weight: f64,
    pub min_photon_energy: f64,
    pub max_photon_energy: f64,
    pub min_electron_energy: f64,
    pub max_electron_energy: f64,
    pub photon_grid_tolerances: GridTolerances,
    pub electron_grid_tolerances: GridTolerances,
    pub occupation_number_evaluation_tolerance: f64,
    pub subshell_incoherent_evaluation_tolerance: f64,
    pub photon_threshold_energy_nudge_factor: f64,
    pub cutoff_angle_cosine: f64,
    pub number_of_moment_preserving_angles: usize,
    pub electron_tabular_evaluation_tolerance: f64,
    pub electron_two_d_interp_policy: TwoDInterp,
    pub electron_two_d_grid_policy: TwoDGrid,
    pub electron_total_elastic_integrated_cross_section_mode: bool,

    // Relaxation data
    pub subshells: Vec<u32>,
    pub subshell_occupancies: BTreeMap<u32, f64>,
    pub subshell_binding_energies: BTreeMap<u32, f64>,
    pub subshell_relaxation_transitions: BTreeMap<u32, usize>,
    pub subshell_relaxation_vacancies: BTreeMap<u32, Vec<(u32, u32)>>,
    pub subshell_relaxation_particle_energies: BTreeMap<u32, Vec<f64>>,
    pub subshell_relaxation_probabilities: BTreeMap<u32, Vec<f64>>,

    // Photon reference data
    pub compton_profile_momentum_grids: BTreeMap<u32, Vec<f64>>,
    pub compton_profiles: BTreeMap<u32, Vec<f64>>,
    pub occupation_number_momentum_grids: BTreeMap<u32, Vec<f64>>,
    pub occupation_numbers: BTreeMap<u32, Vec<f64>>,
    pub waller_hartree_scattering_function_momentum_grid: Vec<f64>,
    pub waller_hartree_scattering_function: Vec<f64>,
    pub waller_hartree_atomic_form_factor_momentum_grid: Vec<f64>,
    pub waller_hartree_atomic_form_factor: Vec<f64>,
    pub waller_hartree_squared_atomic_form_factor_squared_momentum_grid: Vec<f64>,
    pub waller_hartree_squared_atomic_form_factor: Vec<f64>,

    // Photon cross sections
    pub photon_energy_grid: Vec<f64>,
    pub has_average_photon_heating_numbers: bool,
    pub average_photon_heating_numbers: Vec<f64>,
    pub waller_hartree_incoherent_cross_section: RetabulatedCrossSection,
    pub waller_hartree_coherent_cross_section: RetabulatedCrossSection,
    pub pair_production_cross_section: RetabulatedCrossSection,
    pub triplet_production_cross_section: RetabulatedCrossSection,
    pub subshell_photoelectric_cross_sections: BTreeMap<u32, RetabulatedCrossSection>,
    pub photoelectric_cross_section: RetabulatedCrossSection,
    pub impulse_approx_subshell_incoherent_cross_sections: BTreeMap<u32, RetabulatedCrossSection>,
    pub impulse_approx_incoherent_cross_section: RetabulatedCrossSection,
    pub waller_hartree_total_cross_section: Vec<f64>,
    pub impulse_approx_total_cross_section: Vec<f64>,

    // Electron data
    pub electron_energy_grid: Vec<f64>,
    pub electron_cross_section_interp_policy: Interp,
    pub cutoff_elastic_cross_section: RetabulatedCrossSection,
    pub total_elastic_cross_section: RetabulatedCrossSection,
    pub screened_rutherford_elastic_cross_section: RetabulatedCrossSection,
    pub bremsstrahlung_cross_section: RetabulatedCrossSection,
    pub atomic_excitation_cross_section: RetabulatedCrossSection,
    pub electroionization_cross_sections: BTreeMap<u32, RetabulatedCrossSection>,
    pub total_electron_cross_section: Vec<f64>,
    pub elastic_angular_energy_grid: Vec<f64>,
    pub cutoff_elastic_angles: Vec<Vec<f64>>,
    pub cutoff_elastic_pdf: Vec<Vec<f64>>,
    pub moment_preserving_elastic_discrete_angles: Vec<Vec<f64>>,
    pub moment_preserving_elastic_weights: Vec<Vec<f64>>,
    pub moment_preserving_cross_section_reductions: Vec<f64>,
    pub moment_preserving_cross_section: RetabulatedCrossSection,
    pub electroionization_recoil: BTreeMap<u32, EnergyTable>,
    pub bremsstrahlung_photon: EnergyTable,
    pub atomic_excitation_energy_grid: Vec<f64>,
    pub atomic_excitation_energy_loss: Vec<f64>,
}

impl EprDataContainer {
    /// Write the container to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let f = BufWriter::new(File::create(path)?);
        Ok(serde_json::to_writer_pretty(f, self)?)
    }

    /// Read a container from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(f)?)
    }

    /// Write the container to a binary file
    pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let f = BufWriter::new(File::create(path)?);
        Ok(bincode::serialize_into(f, self)?)
    }

    /// Read a container from a binary file
    pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(f)?)
    }

    /// True if discrete moment preserving elastic data were generated
    pub fn has_moment_preserving_data(&self) -> bool {
        !self.moment_preserving_elastic_discrete_angles.is_empty()
    }

    /// Check that every grid is usable and every cross section fits its grid
    pub fn check_consistency(&self) -> Result<()> {
        self.photon_energy_grid.check_strictly_ascending()?;
        self.electron_energy_grid.check_strictly_ascending()?;

        let photon = self.photon_energy_grid.len();
        let electron = self.electron_energy_grid.len();

        let photon_cross_sections = [
            &self.waller_hartree_incoherent_cross_section,
            &self.waller_hartree_coherent_cross_section,
            &self.pair_production_cross_section,
            &self.triplet_production_cross_section,
            &self.photoelectric_cross_section,
            &self.impulse_approx_incoherent_cross_section,
        ];

        for cross_section in photon_cross_sections
            .into_iter()
            .chain(self.subshell_photoelectric_cross_sections.values())
            .chain(self.impulse_approx_subshell_incoherent_cross_sections.values())
        {
            cross_section.check_grid_len(photon)?;
        }

        let electron_cross_sections = [
            &self.cutoff_elastic_cross_section,
            &self.total_elastic_cross_section,
            &self.screened_rutherford_elastic_cross_section,
            &self.bremsstrahlung_cross_section,
            &self.atomic_excitation_cross_section,
        ];

        for cross_section in electron_cross_sections
            .into_iter()
            .chain(self.electroionization_cross_sections.values())
        {
            cross_section.check_grid_len(electron)?;
        }

        for (name, length, expected) in [
            ("heating numbers", self.average_photon_heating_numbers.len(), photon),
            (
                "Waller-Hartree total",
                self.waller_hartree_total_cross_section.len(),
                photon,
            ),
            (
                "impulse approximation total",
                self.impulse_approx_total_cross_section.len(),
                photon,
            ),
            (
                "total electron",
                self.total_electron_cross_section.len(),
                electron,
            ),
            (
                "cutoff elastic angles",
                self.cutoff_elastic_angles.len(),
                self.elastic_angular_energy_grid.len(),
            ),
        ] {
            if length != expected {
                return Err(Error::DataConsistency(format!(
                    "{name} has {length} values for a grid of {expected}"
                )));
            }
        }

        if self.has_moment_preserving_data() {
            self.moment_preserving_cross_section.check_grid_len(electron)?;

            let angular = self.elastic_angular_energy_grid.len();
            if self.moment_preserving_elastic_discrete_angles.len() != angular
                || self.moment_preserving_elastic_weights.len() != angular
                || self.moment_preserving_cross_section_reductions.len() != angular
            {
                return Err(Error::DataConsistency(
                    "moment preserving data do not match the angular energy grid".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod container_tests {
    use super::*;

    fn small_container() -> EprDataContainer {
        let retabulated = |n: usize| RetabulatedCrossSection {
            threshold_index: 0,
            values: vec![1.0; n],
        };

        EprDataContainer {
            atomic_number: 1,
            photon_energy_grid: vec![1e-3, 1.0, 20.0],
            electron_energy_grid: vec![1e-5, 1e5],
            average_photon_heating_numbers: vec![0.0; 3],
            waller_hartree_incoherent_cross_section: retabulated(3),
            waller_hartree_coherent_cross_section: retabulated(3),
            pair_production_cross_section: RetabulatedCrossSection {
                threshold_index: 2,
                values: vec![0.0],
            },
            triplet_production_cross_section: RetabulatedCrossSection {
                threshold_index: 3,
                values: vec![],
            },
            photoelectric_cross_section: retabulated(3),
            impulse_approx_incoherent_cross_section: retabulated(3),
            waller_hartree_total_cross_section: vec![3.0; 3],
            impulse_approx_total_cross_section: vec![3.0; 3],
            cutoff_elastic_cross_section: retabulated(2),
            total_elastic_cross_section: retabulated(2),
            screened_rutherford_elastic_cross_section: retabulated(2),
            bremsstrahlung_cross_section: retabulated(2),
            atomic_excitation_cross_section: retabulated(2),
            total_electron_cross_section: vec![4.0; 2],
            ..Default::default()
        }
    }

    #[test]
    fn consistent_container() {
        assert!(small_container().check_consistency().is_ok());
    }

    #[test]
    fn cross_section_off_grid() {
        let mut container = small_container();
        container.bremsstrahlung_cross_section.values.push(1.0);
        assert!(container.check_consistency().is_err());
    }

    #[test]
    fn total_off_grid() {
        let mut container = small_container();
        container.total_electron_cross_section.pop();
        assert!(matches!(
            container.check_consistency(),
            Err(Error::DataConsistency(_))
        ));
    }

    #[test]
    fn json_keeps_field_names() {
        let json = serde_json::to_value(small_container()).unwrap();
        assert!(json.get("waller_hartree_total_cross_section").is_some());
        assert!(json.get("moment_preserving_cross_section_reductions").is_some());
        assert_eq!(json["electron_cross_section_interp_policy"], "Lin-Lin");
    }

    #[test]
    fn binary_round_trip() {
        let container = small_container();
        let bytes = bincode::serialize(&container).unwrap();
        let decoded: EprDataContainer = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, container);
    }
}
