// crate modules
use crate::angular::set_elastic_angular_data;
use crate::config::GeneratorConfig;
use crate::container::EprDataContainer;
use crate::electron::{set_electron_cross_sections, set_electron_total, set_secondary_electron_data};
use crate::error::{Error, Result};
use crate::photon::{set_photon_cross_sections, set_photon_reference_data, set_photon_totals};
use crate::provider::{AceAndEndlReference, EndlReference, GeneratorVariant, ReferenceDataProvider};
use crate::relaxation::set_relaxation_data;
use crate::tables::{AceTables, EndlTables};

// eprtools modules
use eprtools_utils::ValueExt;

// external crates
use kdam::{Bar, BarBuilder, BarExt};
use log::{info, warn};

/// Progress of a generation run
///
/// Stages run in order and a run that fails is left in
/// [GeneratorState::Failed] for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    /// Nothing generated yet
    Uninitialized,
    /// Relaxation, photon reference data, photon cross sections and their
    /// totals are set
    PhotonDataBuilt,
    /// Electron cross sections, elastic and secondary distributions are set
    ElectronDataBuilt,
    /// Total electron cross section is set
    TotalsAggregated,
    /// Container checked and ready
    Finalized,
    /// A stage returned an error
    Failed,
}

/// Populates an [EprDataContainer] from ENDL (and optionally ACE) tables
///
/// Energy bounds outside of the reference data are clamped to it with a
/// warning. Stages can be run one at a time with
/// [advance()](RelaxationDataGenerator::advance), or all at once with
/// [populate()](RelaxationDataGenerator::populate).
///
/// ```rust,ignore
/// # use eprtools_generator::{EndlTables, GeneratorConfig, RelaxationDataGenerator};
/// let tables = EndlTables::from_json_file("endl_6.json")?;
///
/// let mut generator = RelaxationDataGenerator::endl(tables, GeneratorConfig::default())?;
/// generator.disable_progress();
///
/// let container = generator.populate()?;
/// container.save_binary("epr_6.bin")?;
/// ```
#[derive(Debug)]
pub struct RelaxationDataGenerator<P: ReferenceDataProvider> {
    provider: P,
    config: GeneratorConfig,
    container: EprDataContainer,
    state: GeneratorState,
    /// Disable progress bar?
    disable_progress: bool,
}

impl RelaxationDataGenerator<EndlReference> {
    /// Generator using only ENDL tables
    pub fn endl(tables: EndlTables, config: GeneratorConfig) -> Result<Self> {
        Self::new(EndlReference::new(tables), config)
    }
}

impl RelaxationDataGenerator<AceAndEndlReference> {
    /// Generator using ACE photon reference data with ENDL tables
    pub fn ace_and_endl(ace: AceTables, endl: EndlTables, config: GeneratorConfig) -> Result<Self> {
        Self::new(AceAndEndlReference::new(ace, endl)?, config)
    }
}

impl<P: ReferenceDataProvider> RelaxationDataGenerator<P> {
    /// Generator for any source of reference data
    ///
    /// The configuration is validated before anything else.
    pub fn new(provider: P, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;

        let (photon_lower, photon_upper) = provider.photon_energy_limits()?;
        let (min_photon_energy, max_photon_energy) = clamp_energies(
            "photon",
            (config.min_photon_energy, config.max_photon_energy),
            (photon_lower, photon_upper),
        )?;

        let (electron_lower, electron_upper) = provider.endl().electron_energy_limits()?;
        let (min_electron_energy, max_electron_energy) = clamp_energies(
            "electron",
            (config.min_electron_energy, config.max_electron_energy),
            (electron_lower, electron_upper),
        )?;

        let container = EprDataContainer {
            atomic_number: provider.atomic_number(),
            atomic_weight: provider.endl().atomic_weight,
            min_photon_energy,
            max_photon_energy,
            min_electron_energy,
            max_electron_energy,
            photon_grid_tolerances: config.photon_grid,
            electron_grid_tolerances: config.electron_grid,
            occupation_number_evaluation_tolerance: config.occupation_number_evaluation_tolerance,
            subshell_incoherent_evaluation_tolerance: config.subshell_incoherent_evaluation_tolerance,
            photon_threshold_energy_nudge_factor: config.photon_threshold_energy_nudge_factor,
            cutoff_angle_cosine: config.cutoff_angle_cosine,
            number_of_moment_preserving_angles: config.number_of_moment_preserving_angles,
            electron_tabular_evaluation_tolerance: config.tabular_evaluation_tolerance,
            electron_two_d_interp_policy: config.electron_two_d_interp,
            electron_two_d_grid_policy: config.electron_two_d_grid,
            electron_total_elastic_integrated_cross_section_mode: config
                .electron_total_elastic_integrated_cross_section_mode,
            ..Default::default()
        };

        Ok(Self {
            provider,
            config,
            container,
            state: GeneratorState::Uninitialized,
            disable_progress: false,
        })
    }

    /// Do not print the tqdm progress indicators
    pub fn disable_progress(&mut self) {
        self.disable_progress = true;
    }

    /// Current state of the run
    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Source of the reference data
    pub fn variant(&self) -> GeneratorVariant {
        self.provider.variant()
    }

    /// Configuration in use, with unclamped energies
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The container, once the run is finalized
    pub fn container(&self) -> Option<&EprDataContainer> {
        match self.state {
            GeneratorState::Finalized => Some(&self.container),
            _ => None,
        }
    }

    /// Take the container out of a finalized run
    pub fn into_container(self) -> Result<EprDataContainer> {
        match self.state {
            GeneratorState::Finalized => Ok(self.container),
            found => Err(Error::InvalidState {
                found,
                expected: GeneratorState::Finalized,
            }),
        }
    }

    /// Run every remaining stage and return the finished container
    pub fn populate(mut self) -> Result<EprDataContainer> {
        info!(
            "Generating {:?} data for Z = {}",
            self.variant(),
            self.container.atomic_number
        );

        while self.state != GeneratorState::Finalized {
            self.advance()?;
        }

        self.into_container()
    }

    /// Run the next stage
    ///
    /// Advancing a finalized run does nothing. Any error leaves the run
    /// failed, and a failed run cannot be advanced.
    pub fn advance(&mut self) -> Result<GeneratorState> {
        let result = match self.state {
            GeneratorState::Uninitialized => self.build_photon_data().map(|_| GeneratorState::PhotonDataBuilt),
            GeneratorState::PhotonDataBuilt => self
                .build_electron_data()
                .map(|_| GeneratorState::ElectronDataBuilt),
            GeneratorState::ElectronDataBuilt => self
                .aggregate_totals()
                .map(|_| GeneratorState::TotalsAggregated),
            GeneratorState::TotalsAggregated => self.finalize().map(|_| GeneratorState::Finalized),
            GeneratorState::Finalized => return Ok(GeneratorState::Finalized),
            GeneratorState::Failed => {
                return Err(Error::InvalidState {
                    found: GeneratorState::Failed,
                    expected: GeneratorState::Uninitialized,
                })
            }
        };

        match result {
            Ok(state) => {
                self.state = state;
                Ok(state)
            }
            Err(e) => {
                self.state = GeneratorState::Failed;
                Err(e)
            }
        }
    }
}

/// Stages
impl<P: ReferenceDataProvider> RelaxationDataGenerator<P> {
    fn build_photon_data(&mut self) -> Result<()> {
        info!("Setting the relaxation data");
        let relaxation = self.provider.subshell_relaxation()?;
        set_relaxation_data(&mut self.container, &relaxation);

        set_photon_reference_data(
            &self.provider,
            &self.config,
            &mut self.container,
            self.disable_progress,
        )?;

        set_photon_cross_sections(
            &self.provider,
            &self.config,
            &mut self.container,
            self.disable_progress,
        )?;

        set_photon_totals(&mut self.container)
    }

    fn build_electron_data(&mut self) -> Result<()> {
        let endl = self.provider.endl();

        set_electron_cross_sections(endl, &self.config, &mut self.container, self.disable_progress)?;
        set_elastic_angular_data(endl, &self.config, &mut self.container, self.disable_progress)?;
        set_secondary_electron_data(endl, &self.config, &mut self.container, self.disable_progress)
    }

    fn aggregate_totals(&mut self) -> Result<()> {
        info!("Aggregating the total electron cross section");
        set_electron_total(&mut self.container)
    }

    fn finalize(&mut self) -> Result<()> {
        self.container.check_consistency()?;
        info!(
            "Finished with {} photon and {} electron energies",
            self.container.photon_energy_grid.len(),
            self.container.electron_energy_grid.len()
        );
        Ok(())
    }
}

/// Clamp requested energy bounds to the limits of the reference data
fn clamp_energies(particle: &str, requested: (f64, f64), limits: (f64, f64)) -> Result<(f64, f64)> {
    let (mut min, mut max) = requested;

    if min < limits.0 {
        warn!(
            "Min {particle} energy {} is below the table limit, using {}",
            min.sci(5, 2),
            limits.0.sci(5, 2)
        );
        min = limits.0;
    }

    if max > limits.1 {
        warn!(
            "Max {particle} energy {} is above the table limit, using {}",
            max.sci(5, 2),
            limits.1.sci(5, 2)
        );
        max = limits.1;
    }

    if min >= max {
        return Err(Error::InvalidConfiguration(format!(
            "no {particle} energies left in [{}, {}] after clamping to the tables",
            min.sci(5, 2),
            max.sci(5, 2)
        )));
    }

    Ok((min, max))
}

/// Initialise a progress bar, if wanted
pub(crate) fn init_progress_bar(total: usize, desc: &str, disable_progress: bool) -> Result<Bar> {
    let mut progress_bar = BarBuilder::default()
        .total(total)
        .desc(desc)
        .unit(" items")
        .disable(disable_progress)
        .build()
        .map_err(Error::ProgressBarError)?;

    if !disable_progress {
        progress_bar.refresh()?;
    }

    Ok(progress_bar)
}

/// Need an extra line for clean spacing if the progress bar is printed
pub(crate) fn finish_progress_bar(disable_progress: bool) {
    if !disable_progress {
        eprintln!()
    }
}

#[cfg(test)]
mod generator_tests {
    use super::*;

    #[test]
    fn energies_are_clamped() {
        let (min, max) = clamp_energies("photon", (1e-6, 1e6), (1e-5, 1e5)).unwrap();
        assert_eq!((min, max), (1e-5, 1e5));

        let (min, max) = clamp_energies("photon", (1e-3, 20.0), (1e-5, 1e5)).unwrap();
        assert_eq!((min, max), (1e-3, 20.0));
    }

    #[test]
    fn nothing_left_after_clamping() {
        let result = clamp_energies("electron", (1e6, 1e7), (1e-5, 1e5));
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn photon_totals_with_the_photon_data() {
        let tables = EndlTables::from_json_file("./data/hydrogen_endl.json").unwrap();
        let mut generator = RelaxationDataGenerator::endl(tables, GeneratorConfig::default()).unwrap();
        generator.disable_progress();

        assert_eq!(generator.advance().unwrap(), GeneratorState::PhotonDataBuilt);

        let c = &generator.container;
        assert!(!c.photon_energy_grid.is_empty());
        assert_eq!(c.waller_hartree_total_cross_section.len(), c.photon_energy_grid.len());
        assert_eq!(c.impulse_approx_total_cross_section.len(), c.photon_energy_grid.len());
        assert!(c.total_electron_cross_section.is_empty());

        assert_eq!(generator.advance().unwrap(), GeneratorState::ElectronDataBuilt);
        assert!(generator.container.total_electron_cross_section.is_empty());

        assert_eq!(generator.advance().unwrap(), GeneratorState::TotalsAggregated);
        let c = &generator.container;
        assert_eq!(c.total_electron_cross_section.len(), c.electron_energy_grid.len());
    }

    #[test]
    fn invalid_configuration_before_any_stage() {
        let config = GeneratorConfig {
            min_photon_energy: -1.0,
            ..Default::default()
        };
        let result = RelaxationDataGenerator::endl(EndlTables::default(), config);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }
}
