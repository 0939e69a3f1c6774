// crate modules
use crate::error::{Error, Result};

// eprtools modules
use eprtools_numeric::{GridGenerator, Interp, TwoDGrid, TwoDInterp};

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// external crates
use serde::{Deserialize, Serialize};

/// Tolerances of an adaptive energy grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTolerances {
    /// Relative error at a bin midpoint accepted as converged
    pub convergence: f64,
    /// Absolute difference of bin end values below which refinement stops
    pub absolute_difference: f64,
    /// Relative bin width below which refinement stops
    pub distance: f64,
}

impl Default for GridTolerances {
    fn default() -> Self {
        Self {
            convergence: 1e-3,
            absolute_difference: 1e-13,
            distance: 1e-13,
        }
    }
}

impl GridTolerances {
    /// Build a grid generator with these tolerances
    pub fn generator(&self, interp: Interp, fail_on_dirty_convergence: bool) -> Result<GridGenerator> {
        let mut generator = GridGenerator::new(
            interp,
            self.convergence,
            self.absolute_difference,
            self.distance,
        )?;

        if fail_on_dirty_convergence {
            generator.fail_on_dirty_convergence();
        }

        Ok(generator)
    }

    fn validate(&self, particle: &str) -> Result<()> {
        if !(self.convergence > 0.0 && self.convergence <= 1.0) {
            return Err(invalid(format!(
                "{particle} grid convergence tolerance {} is outside (0, 1]",
                self.convergence
            )));
        }

        if !(0.0..=1.0).contains(&self.absolute_difference) {
            return Err(invalid(format!(
                "{particle} grid absolute difference tolerance {} is outside [0, 1]",
                self.absolute_difference
            )));
        }

        if !(0.0..=1.0).contains(&self.distance) {
            return Err(invalid(format!(
                "{particle} grid distance tolerance {} is outside [0, 1]",
                self.distance
            )));
        }

        Ok(())
    }
}

/// Settings of a generation run
///
/// Every field has a default, so a JSON configuration only needs the values
/// that differ.
///
/// ```rust
/// # use eprtools_generator::GeneratorConfig;
/// let config: GeneratorConfig = serde_json::from_str(
///     r#"{ "cutoff_angle_cosine": 0.9, "number_of_moment_preserving_angles": 2 }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.number_of_moment_preserving_angles, 2);
/// assert_eq!(config.photon_threshold_energy_nudge_factor, 1.0001);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Lowest photon energy (MeV)
    pub min_photon_energy: f64,
    /// Highest photon energy (MeV)
    pub max_photon_energy: f64,
    /// Lowest electron energy (MeV)
    pub min_electron_energy: f64,
    /// Highest electron energy (MeV)
    pub max_electron_energy: f64,
    /// Photon union grid tolerances
    pub photon_grid: GridTolerances,
    /// Electron union grid tolerances
    pub electron_grid: GridTolerances,
    /// Tolerance of the occupation number momentum grids
    pub occupation_number_evaluation_tolerance: f64,
    /// Relative tolerance of the impulse approximation integrals
    pub subshell_incoherent_evaluation_tolerance: f64,
    /// Factor separating coincident grid points and threshold points
    pub photon_threshold_energy_nudge_factor: f64,
    /// Cosine above which elastic scattering is reduced to discrete angles
    pub cutoff_angle_cosine: f64,
    /// Number of discrete moment preserving angles, zero to disable
    pub number_of_moment_preserving_angles: usize,
    /// Tolerance used when tabulating secondary distributions
    pub tabular_evaluation_tolerance: f64,
    /// Interpolation between electron secondary distributions
    pub electron_two_d_interp: TwoDInterp,
    /// Grid policy between electron secondary distributions
    pub electron_two_d_grid: TwoDGrid,
    /// Retabulate secondary electron distributions on the union grid
    pub refine_secondary_electron_grids: bool,
    /// Synthesise elastic distributions at the electron energy bounds
    pub generate_new_distribution_at_min_and_max_energy: bool,
    /// Derive the total elastic cross section from the cutoff data
    pub electron_total_elastic_integrated_cross_section_mode: bool,
    /// Abort when a grid only converges on the distance or difference tolerance
    pub fail_on_dirty_convergence: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_photon_energy: 1e-3,
            max_photon_energy: 20.0,
            min_electron_energy: 1e-5,
            max_electron_energy: 1e5,
            photon_grid: GridTolerances::default(),
            electron_grid: GridTolerances::default(),
            occupation_number_evaluation_tolerance: 1e-3,
            subshell_incoherent_evaluation_tolerance: 1e-3,
            photon_threshold_energy_nudge_factor: 1.0001,
            cutoff_angle_cosine: 1.0,
            number_of_moment_preserving_angles: 0,
            tabular_evaluation_tolerance: 1e-7,
            electron_two_d_interp: TwoDInterp::default(),
            electron_two_d_grid: TwoDGrid::default(),
            refine_secondary_electron_grids: false,
            generate_new_distribution_at_min_and_max_energy: false,
            electron_total_elastic_integrated_cross_section_mode: false,
            fail_on_dirty_convergence: false,
        }
    }
}

impl GeneratorConfig {
    /// Read a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Check every bound and tolerance before any work is done
    pub fn validate(&self) -> Result<()> {
        Self::validate_energies("photon", self.min_photon_energy, self.max_photon_energy)?;
        Self::validate_energies(
            "electron",
            self.min_electron_energy,
            self.max_electron_energy,
        )?;

        self.photon_grid.validate("photon")?;
        self.electron_grid.validate("electron")?;

        Self::validate_fraction(
            "occupation number evaluation tolerance",
            self.occupation_number_evaluation_tolerance,
        )?;

        Self::validate_fraction(
            "subshell incoherent evaluation tolerance",
            self.subshell_incoherent_evaluation_tolerance,
        )?;

        if !(self.photon_threshold_energy_nudge_factor >= 1.0
            && self.photon_threshold_energy_nudge_factor.is_finite())
        {
            return Err(invalid(format!(
                "nudge factor {} must be at least 1",
                self.photon_threshold_energy_nudge_factor
            )));
        }

        if !(-1.0..=1.0).contains(&self.cutoff_angle_cosine) {
            return Err(invalid(format!(
                "cutoff angle cosine {} is outside [-1, 1]",
                self.cutoff_angle_cosine
            )));
        }

        if !(self.tabular_evaluation_tolerance > 0.0 && self.tabular_evaluation_tolerance < 1.0) {
            return Err(invalid(format!(
                "tabular evaluation tolerance {} is outside (0, 1)",
                self.tabular_evaluation_tolerance
            )));
        }

        Ok(())
    }

    fn validate_energies(particle: &str, min: f64, max: f64) -> Result<()> {
        if !(min > 0.0 && min.is_finite()) {
            return Err(invalid(format!("min {particle} energy {min} must be positive")));
        }

        if !(max > min && max.is_finite()) {
            return Err(invalid(format!(
                "max {particle} energy {max} must be above the min {particle} energy {min}"
            )));
        }

        Ok(())
    }

    fn validate_fraction(name: &str, value: f64) -> Result<()> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(invalid(format!("{name} {value} is outside (0, 1]")));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> Error {
    Error::InvalidConfiguration(reason)
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.photon_grid.convergence, 1e-3);
        assert_eq!(config.electron_grid.distance, 1e-13);
        assert_eq!(config.electron_two_d_interp, TwoDInterp::LogLogLog);
        assert_eq!(config.electron_two_d_grid, TwoDGrid::UnitBaseCorrelated);
    }

    #[test]
    fn inverted_energies() {
        let config = GeneratorConfig {
            min_electron_energy: 10.0,
            max_electron_energy: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn bad_tolerances() {
        let mut config = GeneratorConfig::default();
        config.photon_grid.convergence = 0.0;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.electron_grid.distance = 2.0;
        assert!(config.validate().is_err());

        let config = GeneratorConfig {
            tabular_evaluation_tolerance: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_nudge_and_cutoff() {
        let config = GeneratorConfig {
            photon_threshold_energy_nudge_factor: 0.999,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GeneratorConfig {
            cutoff_angle_cosine: -1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn policies_from_json() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{ "electron_two_d_interp": "Lin-Lin-Log", "electron_two_d_grid": "Direct" }"#,
        )
        .unwrap();
        assert_eq!(config.electron_two_d_interp, TwoDInterp::LinLinLog);
        assert_eq!(config.electron_two_d_grid, TwoDGrid::Direct);
    }

    #[test]
    fn grid_generator_from_tolerances() {
        let tolerances = GridTolerances {
            convergence: 1e-4,
            ..Default::default()
        };
        let generator = tolerances.generator(Interp::LogLog, true).unwrap();
        assert_eq!(generator.convergence_tolerance(), 1e-4);
        assert_eq!(generator.interp(), Interp::LogLog);
    }
}
