//! Photon reference data and photon cross sections

// crate modules
use crate::compton::{refine_momentum_table, squared_form_factor, ComptonData};
use crate::config::{GeneratorConfig, GridTolerances};
use crate::container::EprDataContainer;
use crate::error::Result;
use crate::generator::{finish_progress_bar, init_progress_bar};
use crate::incoherent::ImpulseApproxIncoherent;
use crate::provider::ReferenceDataProvider;
use crate::tables::subshell_value;

// eprtools modules
use eprtools_numeric::{Interp, Tabular};
use eprtools_utils::ValueExt;
use eprtools_xs::constants::{PAIR_PRODUCTION_THRESHOLD, TRIPLET_PRODUCTION_THRESHOLD};
use eprtools_xs::{
    retabulate, retabulate_with, sum_subshells, threshold_value, TotalCrossSection, UnionGridBuilder,
};

// external crates
use kdam::BarExt;
use log::{debug, info, warn};

/// Compton profiles, occupation numbers, scattering function and form factor
pub(crate) fn set_photon_reference_data<P: ReferenceDataProvider>(
    provider: &P,
    config: &GeneratorConfig,
    container: &mut EprDataContainer,
    disable_progress: bool,
) -> Result<()> {
    info!("Setting the photon reference data");

    let fail = config.fail_on_dirty_convergence;
    let profile_generator = config.photon_grid.generator(Interp::LinLin, fail)?;
    let occupation_generator = GridTolerances {
        convergence: config.occupation_number_evaluation_tolerance,
        ..config.photon_grid
    }
    .generator(Interp::LinLin, fail)?;

    let subshells = container.subshells.clone();
    let mut progress_bar = init_progress_bar(subshells.len(), "Compton profiles", disable_progress)?;

    for subshell in subshells {
        let half_profile = provider.half_compton_profile(subshell)?;
        let data = ComptonData::from_half_profile(&half_profile, &profile_generator, &occupation_generator)?;

        debug!(
            "Subshell {subshell}: {} profile points, {} occupation points",
            data.momentum_grid.len(),
            data.occupation_momentum_grid.len()
        );

        container
            .compton_profile_momentum_grids
            .insert(subshell, data.momentum_grid);
        container.compton_profiles.insert(subshell, data.profile);
        container
            .occupation_number_momentum_grids
            .insert(subshell, data.occupation_momentum_grid);
        container
            .occupation_numbers
            .insert(subshell, data.occupation_number);

        progress_bar.update(1)?;
    }

    finish_progress_bar(disable_progress);

    let (grid, values) = refine_momentum_table(provider.scattering_function(), &profile_generator)?;
    container.waller_hartree_scattering_function_momentum_grid = grid;
    container.waller_hartree_scattering_function = values;

    let (grid, values) = refine_momentum_table(provider.form_factor(), &profile_generator)?;
    let (squared_grid, squared) = squared_form_factor(&grid, &values, &profile_generator)?;
    container.waller_hartree_atomic_form_factor_momentum_grid = grid;
    container.waller_hartree_atomic_form_factor = values;
    container.waller_hartree_squared_atomic_form_factor_squared_momentum_grid = squared_grid;
    container.waller_hartree_squared_atomic_form_factor = squared;

    Ok(())
}

/// Photoelectric cross section of one subshell with its threshold
struct SubshellPhotoelectric {
    subshell: u32,
    binding_energy: f64,
    cross_section: Tabular,
}

/// Union grid, heating numbers and every photon cross section
///
/// Cross sections that start at a threshold only refine the grid above it.
pub(crate) fn set_photon_cross_sections<P: ReferenceDataProvider>(
    provider: &P,
    config: &GeneratorConfig,
    container: &mut EprDataContainer,
    disable_progress: bool,
) -> Result<()> {
    info!("Setting the photon cross sections");

    let endl = provider.endl();
    let (min, max) = (container.min_photon_energy, container.max_photon_energy);

    // seed the union grid
    let binding_energies = container
        .subshell_binding_energies
        .values()
        .copied()
        .collect::<Vec<f64>>();

    let mut builder = UnionGridBuilder::new(config.photon_threshold_energy_nudge_factor)?;
    builder.add(min);
    builder.add(max);
    builder.add_binding_energies(&binding_energies, min, max);
    builder.add_photon_thresholds(min, max);
    let mut grid = builder.build()?;

    // collect every function the grid is refined against
    let heating = provider.heating_numbers()?;
    let incoherent = provider.waller_hartree_incoherent()?;
    let coherent = provider.waller_hartree_coherent()?;
    let pair = endl.pair_production_cross_section.cross_section()?;
    let triplet = endl.triplet_production_cross_section.cross_section()?;

    let photoelectric = container
        .subshells
        .iter()
        .map(|s| {
            Ok(SubshellPhotoelectric {
                subshell: *s,
                binding_energy: subshell_value(&container.subshell_binding_energies, *s, "binding energy")?,
                cross_section: provider.subshell_photoelectric(*s)?,
            })
        })
        .collect::<Result<Vec<SubshellPhotoelectric>>>()?;

    let impulse_approx = impulse_approx_evaluators(config, container)?;

    // refine
    let generator = config
        .photon_grid
        .generator(Interp::LinLin, config.fail_on_dirty_convergence)?;

    match &heating {
        Some(heating) => generator.generate_in_place(&mut grid, |e| heating.evaluate(e))?,
        None => generator.generate_in_place(&mut grid, |_| 1.0)?,
    }

    generator.generate_in_place(&mut grid, |e| threshold_value(&incoherent, 0.0, false, e))?;
    generator.generate_in_place(&mut grid, |e| threshold_value(&coherent, 0.0, false, e))?;

    generator.refine_in_place(
        &mut grid,
        |e| threshold_value(&pair, PAIR_PRODUCTION_THRESHOLD, true, e),
        PAIR_PRODUCTION_THRESHOLD,
        max,
    )?;

    generator.refine_in_place(
        &mut grid,
        |e| threshold_value(&triplet, TRIPLET_PRODUCTION_THRESHOLD, true, e),
        TRIPLET_PRODUCTION_THRESHOLD,
        max,
    )?;

    let mut progress_bar = init_progress_bar(
        photoelectric.len() + impulse_approx.len(),
        "Photon subshells",
        disable_progress,
    )?;

    for pe in &photoelectric {
        generator.refine_in_place(
            &mut grid,
            |e| threshold_value(&pe.cross_section, pe.binding_energy, false, e),
            pe.binding_energy,
            max,
        )?;
        progress_bar.update(1)?;
    }

    for (_, incoherent) in &impulse_approx {
        generator.refine_in_place(
            &mut grid,
            |e| incoherent.evaluate_or_nan(e),
            incoherent.binding_energy(),
            max,
        )?;
        progress_bar.update(1)?;
    }

    finish_progress_bar(disable_progress);

    info!("Photon union grid has {} points", grid.len());

    // retabulate
    match &heating {
        Some(heating) => {
            container.has_average_photon_heating_numbers = true;
            container.average_photon_heating_numbers = grid.iter().map(|e| heating.evaluate(*e)).collect();
        }
        None => {
            warn!("Average photon heating numbers cannot be generated from the ENDL tables");
            container.has_average_photon_heating_numbers = false;
            container.average_photon_heating_numbers = vec![0.0; grid.len()];
        }
    }

    container.waller_hartree_incoherent_cross_section = retabulate(&grid, &incoherent, 0.0, false)?;
    container.waller_hartree_coherent_cross_section = retabulate(&grid, &coherent, 0.0, false)?;
    container.pair_production_cross_section = retabulate(&grid, &pair, PAIR_PRODUCTION_THRESHOLD, true)?;
    container.triplet_production_cross_section = retabulate(&grid, &triplet, TRIPLET_PRODUCTION_THRESHOLD, true)?;

    for pe in &photoelectric {
        let retabulated = retabulate(&grid, &pe.cross_section, pe.binding_energy, false)?;
        debug!(
            "Subshell {} photoelectric threshold at {} MeV",
            pe.subshell,
            grid.get(retabulated.threshold_index)
                .copied()
                .unwrap_or(max)
                .sci(5, 2)
        );
        container
            .subshell_photoelectric_cross_sections
            .insert(pe.subshell, retabulated);
    }

    container.photoelectric_cross_section = sum_subshells(
        grid.len(),
        container.subshell_photoelectric_cross_sections.values(),
        false,
    )?;

    for (subshell, incoherent) in &impulse_approx {
        let retabulated = retabulate_with(&grid, |e| incoherent.evaluate_or_nan(e), true)?;
        container
            .impulse_approx_subshell_incoherent_cross_sections
            .insert(*subshell, retabulated);
    }

    container.impulse_approx_incoherent_cross_section = sum_subshells(
        grid.len(),
        container.impulse_approx_subshell_incoherent_cross_sections.values(),
        true,
    )?;

    container.photon_energy_grid = grid;

    Ok(())
}

/// Impulse approximation evaluators from the stored occupation numbers
fn impulse_approx_evaluators(
    config: &GeneratorConfig,
    container: &EprDataContainer,
) -> Result<Vec<(u32, ImpulseApproxIncoherent)>> {
    container
        .subshells
        .iter()
        .map(|s| {
            let incoherent = ImpulseApproxIncoherent::new(
                *s,
                subshell_value(&container.subshell_binding_energies, *s, "binding energy")?,
                subshell_value(&container.subshell_occupancies, *s, "occupancy")?,
                &subshell_value(
                    &container.occupation_number_momentum_grids,
                    *s,
                    "occupation number momentum grid",
                )?,
                &subshell_value(&container.occupation_numbers, *s, "occupation number")?,
                config.subshell_incoherent_evaluation_tolerance,
            )?;
            Ok((*s, incoherent))
        })
        .collect()
}

/// Waller-Hartree and impulse approximation total cross sections
pub(crate) fn set_photon_totals(container: &mut EprDataContainer) -> Result<()> {
    let n = container.photon_energy_grid.len();

    let shared = [
        &container.waller_hartree_coherent_cross_section,
        &container.pair_production_cross_section,
        &container.triplet_production_cross_section,
        &container.photoelectric_cross_section,
    ];

    let mut waller_hartree = TotalCrossSection::zeros(n);
    waller_hartree.add_contribution(&container.waller_hartree_incoherent_cross_section)?;
    waller_hartree.add_all(shared)?;

    let mut impulse_approx = TotalCrossSection::zeros(n);
    impulse_approx.add_contribution(&container.impulse_approx_incoherent_cross_section)?;
    impulse_approx.add_all(shared)?;

    container.waller_hartree_total_cross_section = waller_hartree.into_values();
    container.impulse_approx_total_cross_section = impulse_approx.into_values();

    Ok(())
}
