//! Electron cross sections and secondary electron distributions

// crate modules
use crate::angular::{elastic_angular_table, energy_in_table};
use crate::config::GeneratorConfig;
use crate::container::EprDataContainer;
use crate::error::Result;
use crate::generator::{finish_progress_bar, init_progress_bar};
use crate::tables::{subshell_value, EndlTables, EnergyTable};

// eprtools modules
use eprtools_elastic::{DELTA_PEAK, PEAK_ANGLE_COSINE};
use eprtools_numeric::{GridGenerator, Interp, Tabular, TwoDTable};
use eprtools_xs::constants::{ELECTRON_REST_MASS_ENERGY, INVERSE_FINE_STRUCTURE_CONSTANT};
use eprtools_xs::{
    populate, retabulate, screened_rutherford, threshold_value, RetabulatedCrossSection, TotalCrossSection,
    UnionGridBuilder,
};

// standard library
use std::collections::BTreeMap;

// external crates
use kdam::BarExt;
use log::{debug, info};

/// Relative difference below which total and cutoff elastic are the same
const SCREENED_RUTHERFORD_TOLERANCE: f64 = 1e-6;

/// Electroionization cross section of one subshell with its threshold
struct SubshellElectroionization {
    subshell: u32,
    binding_energy: f64,
    cross_section: Tabular,
}

/// Union grid and every electron cross section
pub(crate) fn set_electron_cross_sections(
    endl: &EndlTables,
    config: &GeneratorConfig,
    container: &mut EprDataContainer,
    disable_progress: bool,
) -> Result<()> {
    info!("Setting the electron cross sections");

    let (min, max) = (container.min_electron_energy, container.max_electron_energy);

    let cutoff = endl.cutoff_elastic_cross_section.cross_section()?;
    let total = endl.total_elastic_cross_section.cross_section()?;
    let bremsstrahlung = endl.bremsstrahlung_cross_section.cross_section()?;
    let excitation = endl.atomic_excitation_cross_section.cross_section()?;
    let excitation_threshold = endl
        .atomic_excitation_cross_section
        .x
        .first()
        .copied()
        .unwrap_or(excitation.lower_bound());

    let electroionization = endl
        .electroionization_cross_sections
        .iter()
        .map(|(s, table)| {
            Ok(SubshellElectroionization {
                subshell: *s,
                binding_energy: subshell_value(&container.subshell_binding_energies, *s, "binding energy")?,
                cross_section: table.cross_section()?,
            })
        })
        .collect::<Result<Vec<SubshellElectroionization>>>()?;

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

    builder.merge_clipped(&endl.cutoff_elastic_cross_section.x, min, max);
    builder.merge_clipped(&endl.total_elastic_cross_section.x, min, max);
    for table in endl.electroionization_cross_sections.values() {
        builder.merge_clipped(&table.x, min, max);
    }
    builder.merge_clipped(&endl.bremsstrahlung_cross_section.x, min, max);
    builder.merge_clipped(&endl.atomic_excitation_cross_section.x, min, max);

    let mut grid = builder.build()?;

    // refine
    let generator = config
        .electron_grid
        .generator(Interp::LogLog, config.fail_on_dirty_convergence)?;

    generator.generate_in_place(&mut grid, |e| threshold_value(&cutoff, cutoff.lower_bound(), false, e))?;

    if !config.electron_total_elastic_integrated_cross_section_mode {
        generator.generate_in_place(&mut grid, |e| threshold_value(&total, total.lower_bound(), false, e))?;
    }

    generator.generate_in_place(&mut grid, |e| {
        threshold_value(&bremsstrahlung, bremsstrahlung.lower_bound(), false, e)
    })?;

    generator.refine_in_place(
        &mut grid,
        |e| threshold_value(&excitation, excitation_threshold, true, e),
        excitation_threshold,
        max,
    )?;

    let mut progress_bar = init_progress_bar(electroionization.len(), "Electroionization", disable_progress)?;

    for ei in &electroionization {
        generator.refine_in_place(
            &mut grid,
            |e| threshold_value(&ei.cross_section, ei.binding_energy, true, e),
            ei.binding_energy,
            max,
        )?;
        progress_bar.update(1)?;
    }

    finish_progress_bar(disable_progress);

    info!("Electron union grid has {} points", grid.len());

    // retabulate
    container.electron_cross_section_interp_policy = Interp::LogLog;

    container.cutoff_elastic_cross_section = retabulate(&grid, &cutoff, cutoff.lower_bound(), false)?;

    container.total_elastic_cross_section = if config.electron_total_elastic_integrated_cross_section_mode {
        info!("Integrating the total elastic cross section from the cutoff data");
        integrated_total_elastic(
            endl,
            config,
            &grid,
            &container.cutoff_elastic_cross_section,
        )?
    } else {
        retabulate(&grid, &total, total.lower_bound(), false)?
    };

    container.screened_rutherford_elastic_cross_section = screened_rutherford(
        &container.total_elastic_cross_section,
        &container.cutoff_elastic_cross_section,
        SCREENED_RUTHERFORD_TOLERANCE,
    )?;

    container.bremsstrahlung_cross_section = retabulate(&grid, &bremsstrahlung, bremsstrahlung.lower_bound(), false)?;
    container.atomic_excitation_cross_section = retabulate(&grid, &excitation, excitation_threshold, true)?;

    for ei in &electroionization {
        let retabulated = retabulate(&grid, &ei.cross_section, ei.binding_energy, true)?;
        debug!(
            "Subshell {} electroionization from index {}",
            ei.subshell, retabulated.threshold_index
        );
        container
            .electroionization_cross_sections
            .insert(ei.subshell, retabulated);
    }

    container.electron_energy_grid = grid;

    Ok(())
}

/// Moliere screening parameter of the screened Rutherford peak
///
/// ```text
/// η = ¼ (α mₑc² Z^⅓ / (0.885 pc))² (1.13 + 3.76 (αZ/β)²)
/// ```
pub(crate) fn moliere_screening_constant(energy: f64, atomic_number: u32) -> f64 {
    let z = f64::from(atomic_number);
    let alpha = 1.0 / INVERSE_FINE_STRUCTURE_CONSTANT;

    let momentum_squared = energy * (energy + 2.0 * ELECTRON_REST_MASS_ENERGY);
    let beta_squared = momentum_squared / (energy + ELECTRON_REST_MASS_ENERGY).powi(2);

    0.25 * (alpha * ELECTRON_REST_MASS_ENERGY * z.cbrt()).powi(2) / (0.885f64.powi(2) * momentum_squared)
        * (1.13 + 3.76 * (alpha * z).powi(2) / beta_squared)
}

/// Total elastic cross section from the cutoff cross section and pdf
///
/// The screened Rutherford peak on [μ_peak, 1] is matched to the normalised
/// cutoff pdf at μ_peak, which fixes its integral relative to the cutoff
/// cross section.
fn integrated_total_elastic(
    endl: &EndlTables,
    config: &GeneratorConfig,
    grid: &[f64],
    cutoff: &RetabulatedCrossSection,
) -> Result<RetabulatedCrossSection> {
    let angular = elastic_angular_table(endl)?;

    let raw = grid
        .iter()
        .enumerate()
        .map(|(i, energy)| {
            let sigma_cutoff = cutoff.value_at(i);
            if sigma_cutoff == 0.0 {
                return Ok(0.0);
            }

            let distribution = angular.distribution_at(
                energy_in_table(&angular, *energy),
                config.electron_two_d_interp,
                config.electron_two_d_grid,
                config.tabular_evaluation_tolerance,
            )?;

            let norm = distribution.integral();
            let peak_pdf = if norm > 0.0 {
                distribution.evaluate(PEAK_ANGLE_COSINE) / norm
            } else {
                0.0
            };

            let eta = moliere_screening_constant(*energy, endl.atomic_number);
            Ok(sigma_cutoff * (1.0 + peak_pdf * DELTA_PEAK * (eta + DELTA_PEAK) / eta))
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(populate(raw, false)?)
}

/// Total electron cross section, elastic plus every inelastic reaction
pub(crate) fn set_electron_total(container: &mut EprDataContainer) -> Result<()> {
    let mut total = TotalCrossSection::zeros(container.electron_energy_grid.len());

    total.add_all([
        &container.total_elastic_cross_section,
        &container.bremsstrahlung_cross_section,
        &container.atomic_excitation_cross_section,
    ])?;
    total.add_all(container.electroionization_cross_sections.values())?;

    container.total_electron_cross_section = total.into_values();

    Ok(())
}

/// Electroionization recoil, bremsstrahlung photon and excitation energy loss
///
/// Distributions are copied as tabulated unless the secondary grids are to be
/// refined, in which case they are rebuilt on the electron union grid.
pub(crate) fn set_secondary_electron_data(
    endl: &EndlTables,
    config: &GeneratorConfig,
    container: &mut EprDataContainer,
    disable_progress: bool,
) -> Result<()> {
    info!("Setting the secondary electron distributions");

    container.atomic_excitation_energy_grid = endl.atomic_excitation_energy_loss.x.clone();
    container.atomic_excitation_energy_loss = endl.atomic_excitation_energy_loss.y.clone();

    if !config.refine_secondary_electron_grids {
        container.electroionization_recoil = endl.electroionization_recoil.clone();
        container.bremsstrahlung_photon = endl.bremsstrahlung_photon.clone();
        return Ok(());
    }

    let grid = &container.electron_energy_grid;
    let mut progress_bar = init_progress_bar(
        endl.electroionization_recoil.len() + 1,
        "Secondary distributions",
        disable_progress,
    )?;

    let mut recoil = BTreeMap::new();
    for (subshell, table) in &endl.electroionization_recoil {
        recoil.insert(*subshell, refine_secondary_table(table, grid, config)?);
        progress_bar.update(1)?;
    }

    let photon = refine_secondary_table(&endl.bremsstrahlung_photon, grid, config)?;
    progress_bar.update(1)?;

    finish_progress_bar(disable_progress);

    container.electroionization_recoil = recoil;
    container.bremsstrahlung_photon = photon;

    Ok(())
}

/// Rebuild a secondary distribution table on the union grid energies
///
/// Each distribution is first interpolated from the bracketing tables, then
/// its secondary grid is refined against the 2-D evaluation.
pub(crate) fn refine_secondary_table(
    table: &EnergyTable,
    union_grid: &[f64],
    config: &GeneratorConfig,
) -> Result<EnergyTable> {
    let two_d = table.two_d()?;
    let (lower, upper) = match (two_d.energies().first(), two_d.energies().last()) {
        (Some(lower), Some(upper)) => (*lower, *upper),
        _ => return Ok(table.clone()),
    };

    let generator = config
        .electron_grid
        .generator(Interp::LinLin, config.fail_on_dirty_convergence)?;

    let energies = union_grid
        .iter()
        .copied()
        .filter(|e| *e >= lower && *e <= upper)
        .collect::<Vec<f64>>();

    let distributions = energies
        .iter()
        .map(|energy| refine_distribution(&two_d, *energy, config, &generator))
        .collect::<Result<Vec<Tabular>>>()?;

    Ok(EnergyTable::from_two_d(&TwoDTable::new(energies, distributions)?))
}

fn refine_distribution(
    table: &TwoDTable,
    energy: f64,
    config: &GeneratorConfig,
    generator: &GridGenerator,
) -> Result<Tabular> {
    let (interp, grid_policy) = (config.electron_two_d_interp, config.electron_two_d_grid);

    let distribution = table.distribution_at(energy, interp, grid_policy, config.tabular_evaluation_tolerance)?;

    let mut x = distribution.x().to_vec();
    let pdf = generator.generate_and_evaluate_in_place(&mut x, |x| {
        table
            .evaluate(energy, x, interp, grid_policy)
            .unwrap_or(f64::NAN)
    })?;

    Ok(Tabular::new(x, pdf, Interp::LinLin)?)
}

#[cfg(test)]
mod electron_tests {
    use super::*;

    #[test]
    fn screening_falls_with_energy() {
        let low = moliere_screening_constant(1e-3, 6);
        let high = moliere_screening_constant(1.0, 6);
        assert!(low > high);
        assert!(high > 0.0);
    }

    #[test]
    fn screening_grows_with_atomic_number() {
        assert!(moliere_screening_constant(1e-2, 82) > moliere_screening_constant(1e-2, 1));
    }

    #[test]
    fn electron_total() {
        let retabulated = |raw: Vec<f64>, zero: bool| populate(raw, zero).unwrap();

        let mut container = EprDataContainer {
            electron_energy_grid: vec![1e-5, 1e-3, 1e5],
            total_elastic_cross_section: retabulated(vec![10.0, 5.0, 1.0], false),
            bremsstrahlung_cross_section: retabulated(vec![1.0, 1.0, 1.0], false),
            atomic_excitation_cross_section: retabulated(vec![0.0, 2.0, 2.0], true),
            electroionization_cross_sections: BTreeMap::from([
                (1, retabulated(vec![0.0, 0.0, 3.0], true)),
                (3, retabulated(vec![0.0, 1.0, 1.0], true)),
            ]),
            ..Default::default()
        };

        set_electron_total(&mut container).unwrap();
        assert_eq!(container.total_electron_cross_section, vec![11.0, 9.0, 8.0]);
    }

    #[test]
    fn secondary_table_on_union_grid() {
        let table = EnergyTable {
            energies: vec![1e-3, 1e-1],
            x: vec![vec![0.0, 1e-3], vec![0.0, 1e-1]],
            pdf: vec![vec![1e3, 1e3], vec![10.0, 10.0]],
        };

        let union_grid = [1e-5, 1e-3, 1e-2, 1e-1, 1.0];
        let refined = refine_secondary_table(&table, &union_grid, &GeneratorConfig::default()).unwrap();

        assert_eq!(refined.energies, vec![1e-3, 1e-2, 1e-1]);
        assert_eq!(refined.x[0], vec![0.0, 1e-3]);
        assert_eq!(refined.x.len(), 3);
        assert!(refined.pdf.iter().flatten().all(|p| *p >= 0.0));
    }
}
