// crate modules
use crate::error::{Error, Result};
use crate::tables::{subshell_value, AceTables, AceTransition, EndlTables, Table};

// eprtools modules
use eprtools_numeric::{Interp, Tabular};

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

/// Source of the photon reference data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorVariant {
    /// Everything from the ENDL tables
    Endl,
    /// Photon reference data from ACE, the rest from ENDL
    AceAndEndl,
}

/// Vacancies left, particle energy and probability of one transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelaxationTransition {
    /// Primary and secondary vacancy, secondary zero for a radiative transition
    pub vacancies: (u32, u32),
    /// Energy of the emitted photon or electron (MeV)
    pub energy: f64,
    /// Probability of the transition
    pub probability: f64,
}

/// Atomic data of one subshell
#[derive(Debug, Clone, PartialEq)]
pub struct SubshellRelaxation {
    /// ENDF subshell designator
    pub subshell: u32,
    /// Number of electrons
    pub occupancy: f64,
    /// Binding energy (MeV)
    pub binding_energy: f64,
    /// Transitions filling a vacancy in this subshell
    pub transitions: Vec<RelaxationTransition>,
}

/// Photon reference data used by the pipeline
///
/// Implementations differ in where the relaxation data, Compton profiles,
/// scattering functions, heating numbers and Waller-Hartree and
/// photoelectric cross sections come from. The electron data, pair and
/// triplet production always come from the ENDL tables.
pub trait ReferenceDataProvider {
    /// Which variant this is
    fn variant(&self) -> GeneratorVariant;

    /// ENDL tables, always present
    fn endl(&self) -> &EndlTables;

    /// Atomic number of the element
    fn atomic_number(&self) -> u32 {
        self.endl().atomic_number
    }

    /// Photon energy range of the reference data
    fn photon_energy_limits(&self) -> Result<(f64, f64)>;

    /// Subshells with their occupancy, binding energy and transitions
    fn subshell_relaxation(&self) -> Result<Vec<SubshellRelaxation>>;

    /// Half Compton profile of a subshell, momentum in atomic units
    fn half_compton_profile(&self, subshell: u32) -> Result<Tabular>;

    /// Incoherent scattering function including the zero momentum point
    fn scattering_function(&self) -> &Table;

    /// Coherent form factor including the zero momentum point
    fn form_factor(&self) -> &Table;

    /// Average photon heating numbers, if the reference data has them
    fn heating_numbers(&self) -> Result<Option<Tabular>>;

    /// Waller-Hartree incoherent cross section
    fn waller_hartree_incoherent(&self) -> Result<Tabular>;

    /// Waller-Hartree coherent cross section
    fn waller_hartree_coherent(&self) -> Result<Tabular>;

    /// Photoelectric cross section of a subshell
    fn subshell_photoelectric(&self, subshell: u32) -> Result<Tabular>;
}

/// Reference data taken entirely from ENDL
#[derive(Debug, Clone)]
pub struct EndlReference {
    tables: EndlTables,
}

impl EndlReference {
    /// Wrap the ENDL tables
    pub fn new(tables: EndlTables) -> Self {
        Self { tables }
    }
}

impl ReferenceDataProvider for EndlReference {
    fn variant(&self) -> GeneratorVariant {
        GeneratorVariant::Endl
    }

    fn endl(&self) -> &EndlTables {
        &self.tables
    }

    fn photon_energy_limits(&self) -> Result<(f64, f64)> {
        self.tables.photon_energy_limits()
    }

    fn subshell_relaxation(&self) -> Result<Vec<SubshellRelaxation>> {
        let tables = &self.tables;

        tables
            .subshells
            .iter()
            .map(|subshell| {
                Ok(SubshellRelaxation {
                    subshell: *subshell,
                    occupancy: tables.occupancy(*subshell)?,
                    binding_energy: tables.binding_energy(*subshell)?,
                    transitions: endl_transitions(tables, *subshell)?,
                })
            })
            .collect()
    }

    fn half_compton_profile(&self, subshell: u32) -> Result<Tabular> {
        subshell_value(&self.tables.compton_profiles, subshell, "Compton profile")?.tabular(Interp::LinLin)
    }

    fn scattering_function(&self) -> &Table {
        &self.tables.incoherent_scattering_function
    }

    fn form_factor(&self) -> &Table {
        &self.tables.coherent_form_factor
    }

    fn heating_numbers(&self) -> Result<Option<Tabular>> {
        Ok(None)
    }

    fn waller_hartree_incoherent(&self) -> Result<Tabular> {
        self.tables.incoherent_cross_section.cross_section()
    }

    fn waller_hartree_coherent(&self) -> Result<Tabular> {
        self.tables.coherent_cross_section.cross_section()
    }

    fn subshell_photoelectric(&self, subshell: u32) -> Result<Tabular> {
        subshell_value(
            &self.tables.photoelectric_cross_sections,
            subshell,
            "photoelectric cross section",
        )?
        .cross_section()
    }
}

/// Radiative and non-radiative transitions of an ENDL subshell
///
/// A subshell has either both kinds of transition or neither.
fn endl_transitions(tables: &EndlTables, subshell: u32) -> Result<Vec<RelaxationTransition>> {
    let radiative = tables
        .radiative_transitions
        .get(&subshell)
        .filter(|t| !t.is_empty());

    let non_radiative = tables
        .non_radiative_transitions
        .get(&subshell)
        .filter(|t| !t.is_empty());

    match (radiative, non_radiative) {
        (None, None) => Ok(Vec::new()),
        (Some(_), None) => Err(Error::DataConsistency(format!(
            "subshell {subshell} has radiative but no non-radiative transitions"
        ))),
        (None, Some(_)) => Err(Error::DataConsistency(format!(
            "subshell {subshell} has non-radiative but no radiative transitions"
        ))),
        (Some(radiative), Some(non_radiative)) => {
            let radiative = radiative.iter().map(|t| RelaxationTransition {
                vacancies: (t.shell, 0),
                energy: t.energy,
                probability: t.probability,
            });

            let non_radiative = non_radiative.iter().map(|t| RelaxationTransition {
                vacancies: (t.primary, t.secondary),
                energy: t.energy,
                probability: t.probability,
            });

            Ok(radiative.chain(non_radiative).collect())
        }
    }
}

/// Photon reference data from ACE with the ENDL tables for everything else
#[derive(Debug, Clone)]
pub struct AceAndEndlReference {
    ace: AceTables,
    endl: EndlTables,
}

impl AceAndEndlReference {
    /// Pair the tables, which must describe the same element
    pub fn new(ace: AceTables, endl: EndlTables) -> Result<Self> {
        if ace.atomic_number != endl.atomic_number {
            return Err(Error::AtomicNumberMismatch {
                ace: ace.atomic_number,
                endl: endl.atomic_number,
            });
        }
        Ok(Self { ace, endl })
    }

    /// The ACE tables
    pub fn ace(&self) -> &AceTables {
        &self.ace
    }
}

impl ReferenceDataProvider for AceAndEndlReference {
    fn variant(&self) -> GeneratorVariant {
        GeneratorVariant::AceAndEndl
    }

    fn endl(&self) -> &EndlTables {
        &self.endl
    }

    fn photon_energy_limits(&self) -> Result<(f64, f64)> {
        self.ace.photon_energy_limits()
    }

    fn subshell_relaxation(&self) -> Result<Vec<SubshellRelaxation>> {
        let ace = &self.ace;

        ace.subshells
            .iter()
            .map(|subshell| {
                let transitions = ace
                    .relaxation_transitions
                    .get(subshell)
                    .map(|t| ace_transitions(t.as_slice()))
                    .unwrap_or_default();

                debug!("Subshell {subshell}: {} ACE transitions", transitions.len());

                Ok(SubshellRelaxation {
                    subshell: *subshell,
                    occupancy: subshell_value(&ace.subshell_occupancies, *subshell, "occupancy")?,
                    binding_energy: subshell_value(
                        &ace.subshell_binding_energies,
                        *subshell,
                        "binding energy",
                    )?,
                    transitions,
                })
            })
            .collect()
    }

    fn half_compton_profile(&self, subshell: u32) -> Result<Tabular> {
        subshell_value(&self.ace.compton_profiles, subshell, "Compton profile")?.tabular(Interp::LinLin)
    }

    fn scattering_function(&self) -> &Table {
        &self.ace.incoherent_scattering_function
    }

    fn form_factor(&self) -> &Table {
        &self.ace.coherent_form_factor
    }

    fn heating_numbers(&self) -> Result<Option<Tabular>> {
        let energies = self.ace.ln_energy_grid.iter().map(|e| e.exp()).collect();
        let heating = Tabular::new(energies, self.ace.heating_numbers.clone(), Interp::LinLog)?;
        Ok(Some(heating))
    }

    fn waller_hartree_incoherent(&self) -> Result<Tabular> {
        Ok(Tabular::from_log_processed(
            &self.ace.ln_energy_grid,
            &self.ace.ln_incoherent_cross_section,
            Interp::LogLog,
        )?)
    }

    fn waller_hartree_coherent(&self) -> Result<Tabular> {
        Ok(Tabular::from_log_processed(
            &self.ace.ln_energy_grid,
            &self.ace.ln_coherent_cross_section,
            Interp::LogLog,
        )?)
    }

    fn subshell_photoelectric(&self, subshell: u32) -> Result<Tabular> {
        let ln_cross_section = self
            .ace
            .ln_subshell_photoelectric_cross_sections
            .get(&subshell)
            .ok_or(Error::MissingSubshellData {
                quantity: "photoelectric cross section",
                subshell,
            })?;

        Ok(Tabular::from_log_processed(
            &self.ace.ln_energy_grid,
            ln_cross_section,
            Interp::LogLog,
        )?)
    }
}

/// Individual probabilities from cumulative ACE transitions
fn ace_transitions(transitions: &[AceTransition]) -> Vec<RelaxationTransition> {
    let mut previous = 0.0;

    transitions
        .iter()
        .map(|t| {
            let probability = t.cumulative_probability - previous;
            previous = t.cumulative_probability;
            RelaxationTransition {
                vacancies: (t.primary, t.secondary),
                energy: t.energy,
                probability,
            }
        })
        .collect()
}

#[cfg(test)]
mod provider_tests {
    use super::*;
    use crate::tables::{NonRadiativeTransition, RadiativeTransition};
    use std::collections::BTreeMap;

    fn endl_with_transitions(radiative: bool, non_radiative: bool) -> EndlTables {
        let mut tables = EndlTables {
            atomic_number: 6,
            subshells: vec![1],
            subshell_occupancies: BTreeMap::from([(1, 2.0)]),
            subshell_binding_energies: BTreeMap::from([(1, 2.9e-4)]),
            ..Default::default()
        };

        if radiative {
            tables.radiative_transitions.insert(
                1,
                vec![RadiativeTransition {
                    shell: 5,
                    probability: 1e-3,
                    energy: 2.8e-4,
                }],
            );
        }

        if non_radiative {
            tables.non_radiative_transitions.insert(
                1,
                vec![NonRadiativeTransition {
                    primary: 3,
                    secondary: 5,
                    probability: 0.999,
                    energy: 2.6e-4,
                }],
            );
        }

        tables
    }

    #[test]
    fn endl_relaxation() {
        let provider = EndlReference::new(endl_with_transitions(true, true));
        let relaxation = provider.subshell_relaxation().unwrap();

        assert_eq!(relaxation.len(), 1);
        let vacancies = relaxation[0]
            .transitions
            .iter()
            .map(|t| t.vacancies)
            .collect::<Vec<(u32, u32)>>();
        assert_eq!(vacancies, vec![(5, 0), (3, 5)]);
    }

    #[test]
    fn endl_relaxation_needs_both_kinds() {
        let provider = EndlReference::new(endl_with_transitions(true, false));
        assert!(matches!(
            provider.subshell_relaxation(),
            Err(Error::DataConsistency(_))
        ));

        let provider = EndlReference::new(endl_with_transitions(false, true));
        assert!(provider.subshell_relaxation().is_err());
    }

    #[test]
    fn endl_without_transitions() {
        let provider = EndlReference::new(endl_with_transitions(false, false));
        assert!(provider.subshell_relaxation().unwrap()[0]
            .transitions
            .is_empty());
        assert!(provider.heating_numbers().unwrap().is_none());
    }

    #[test]
    fn mismatched_atomic_numbers() {
        let ace = AceTables {
            atomic_number: 1,
            ..Default::default()
        };
        let result = AceAndEndlReference::new(ace, endl_with_transitions(false, false));
        assert!(matches!(
            result,
            Err(Error::AtomicNumberMismatch { ace: 1, endl: 6 })
        ));
    }

    #[test]
    fn cumulative_probabilities() {
        let transitions = [
            AceTransition {
                primary: 3,
                secondary: 0,
                energy: 1e-4,
                cumulative_probability: 0.25,
            },
            AceTransition {
                primary: 3,
                secondary: 5,
                energy: 2e-4,
                cumulative_probability: 1.0,
            },
        ];

        let relaxation = ace_transitions(&transitions);
        assert_eq!(relaxation[0].probability, 0.25);
        assert_eq!(relaxation[1].probability, 0.75);
        assert_eq!(relaxation[1].vacancies, (3, 5));
    }

    #[test]
    fn ace_log_processed_cross_sections() {
        let ace = AceTables {
            atomic_number: 6,
            ln_energy_grid: vec![(1e-3_f64).ln(), (1.0_f64).ln(), (10.0_f64).ln()],
            ln_coherent_cross_section: vec![(4.0_f64).ln(), (2.0_f64).ln(), (1.0_f64).ln()],
            heating_numbers: vec![1e-4, 0.1, 1.0],
            ..Default::default()
        };
        let provider = AceAndEndlReference::new(ace, endl_with_transitions(false, false)).unwrap();

        let coherent = provider.waller_hartree_coherent().unwrap();
        assert!((coherent.evaluate(1.0) - 2.0).abs() < 1e-12);

        let heating = provider.heating_numbers().unwrap().unwrap();
        assert_eq!(heating.interp(), Interp::LinLog);

        let (min, max) = provider.photon_energy_limits().unwrap();
        assert!((min - 1e-3).abs() < 1e-15 && (max - 10.0).abs() < 1e-12);
    }
}
