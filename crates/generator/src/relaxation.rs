//! Subshell relaxation data

// crate modules
use crate::container::EprDataContainer;
use crate::provider::SubshellRelaxation;

// external crates
use log::debug;

/// Copy subshells, occupancies, binding energies and transitions
///
/// Transition data are only stored for subshells that have transitions.
pub(crate) fn set_relaxation_data(container: &mut EprDataContainer, relaxation: &[SubshellRelaxation]) {
    container.subshells = relaxation.iter().map(|r| r.subshell).collect();

    for r in relaxation {
        let s = r.subshell;
        debug!("Subshell {s}: {} transitions", r.transitions.len());

        container.subshell_occupancies.insert(s, r.occupancy);
        container.subshell_binding_energies.insert(s, r.binding_energy);

        if r.transitions.is_empty() {
            continue;
        }

        container
            .subshell_relaxation_transitions
            .insert(s, r.transitions.len());
        container
            .subshell_relaxation_vacancies
            .insert(s, r.transitions.iter().map(|t| t.vacancies).collect());
        container
            .subshell_relaxation_particle_energies
            .insert(s, r.transitions.iter().map(|t| t.energy).collect());
        container
            .subshell_relaxation_probabilities
            .insert(s, r.transitions.iter().map(|t| t.probability).collect());
    }
}

#[cfg(test)]
mod relaxation_tests {
    use super::*;
    use crate::provider::RelaxationTransition;

    #[test]
    fn transitions_are_split_by_quantity() {
        let relaxation = vec![
            SubshellRelaxation {
                subshell: 1,
                occupancy: 2.0,
                binding_energy: 2.9e-4,
                transitions: vec![
                    RelaxationTransition {
                        vacancies: (3, 0),
                        energy: 2.8e-4,
                        probability: 0.25,
                    },
                    RelaxationTransition {
                        vacancies: (3, 5),
                        energy: 2.6e-4,
                        probability: 0.75,
                    },
                ],
            },
            SubshellRelaxation {
                subshell: 3,
                occupancy: 2.0,
                binding_energy: 1.1e-5,
                transitions: vec![],
            },
        ];

        let mut container = EprDataContainer::default();
        set_relaxation_data(&mut container, &relaxation);

        assert_eq!(container.subshells, vec![1, 3]);
        assert_eq!(container.subshell_relaxation_transitions[&1], 2);
        assert!(!container.subshell_relaxation_transitions.contains_key(&3));
        assert_eq!(container.subshell_relaxation_vacancies[&1], vec![(3, 0), (3, 5)]);
        assert_eq!(container.subshell_relaxation_particle_energies[&1], vec![2.8e-4, 2.6e-4]);
        assert_eq!(container.subshell_relaxation_probabilities[&1], vec![0.25, 0.75]);
        assert!(!container.subshell_relaxation_vacancies.contains_key(&3));
        assert!(!container.subshell_relaxation_particle_energies.contains_key(&3));
        assert!(!container.subshell_relaxation_probabilities.contains_key(&3));
        assert_eq!(container.subshell_binding_energies[&3], 1.1e-5);
    }
}
