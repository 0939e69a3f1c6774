//! Elastic angular distributions and moment preserving data

// crate modules
use crate::config::GeneratorConfig;
use crate::container::EprDataContainer;
use crate::error::Result;
use crate::generator::{finish_progress_bar, init_progress_bar};
use crate::tables::EndlTables;

// eprtools modules
use eprtools_elastic::{
    angles_from_delta_mu, cutoff_cdf, ElasticMomentReducer, ElasticSample, MomentPreservingRepresentation,
};
use eprtools_numeric::{Interp, Tabular, TwoDInterp, TwoDTable};
use eprtools_utils::ValueExt;
use eprtools_xs::RetabulatedCrossSection;

// external crates
use itertools::izip;
use kdam::BarExt;
use log::{debug, info, warn};

/// ENDL elastic angular distributions as a 2-D table in angle cosine
pub(crate) fn elastic_angular_table(endl: &EndlTables) -> Result<TwoDTable> {
    let table = &endl.elastic_angular_distribution;
    let two_d = table.two_d()?;

    let distributions = two_d
        .distributions()
        .iter()
        .map(|d| Ok(angles_from_delta_mu(d.x(), d.y())?))
        .collect::<Result<Vec<Tabular>>>()?;

    Ok(TwoDTable::new(table.energies.clone(), distributions)?)
}

/// Energy clamped into the incident energy range of a table
pub(crate) fn energy_in_table(table: &TwoDTable, energy: f64) -> f64 {
    match (table.energies().first(), table.energies().last()) {
        (Some(lower), Some(upper)) => energy.clamp(*lower, *upper),
        _ => energy,
    }
}

/// Incident energies of the elastic angular data
///
/// Source energies are truncated to [min, max]. A bound that is not already
/// on the grid is either added, so a distribution is synthesised there, or
/// covered by keeping the nearest source energy beyond it.
///
/// ```text
/// source   1  2  3  4  5
/// min 2.5, max 4
/// new      2.5  3  4
/// kept     2  3  4
/// ```
pub(crate) fn angular_energy_grid(source: &[f64], min: f64, max: f64, generate_new: bool) -> Vec<f64> {
    let mut grid = source
        .iter()
        .copied()
        .filter(|e| *e >= min && *e <= max)
        .collect::<Vec<f64>>();

    if grid.first() != Some(&min) {
        if generate_new {
            grid.insert(0, min);
        } else if let Some(below) = source.iter().rev().find(|e| **e < min) {
            grid.insert(0, *below);
        }
    }

    if grid.last() != Some(&max) {
        if generate_new {
            grid.push(max);
        } else if let Some(above) = source.iter().find(|e| **e > max) {
            grid.push(*above);
        }
    }

    grid
}

/// Angular distributions and, if requested, moment preserving data
pub(crate) fn set_elastic_angular_data(
    endl: &EndlTables,
    config: &GeneratorConfig,
    container: &mut EprDataContainer,
    disable_progress: bool,
) -> Result<()> {
    info!("Setting the elastic angular distributions");

    let table = elastic_angular_table(endl)?;

    let source = if config.refine_secondary_electron_grids {
        container.electron_energy_grid.clone()
    } else {
        table.energies().to_vec()
    };

    let generate_new = config.generate_new_distribution_at_min_and_max_energy;
    let grid = angular_energy_grid(
        &source,
        container.min_electron_energy,
        container.max_electron_energy,
        generate_new,
    );

    let distributions = grid
        .iter()
        .map(|e| distribution_at(&table, config, *e))
        .collect::<Result<Vec<Tabular>>>()?;

    debug!("{} elastic angular energies", grid.len());

    container.elastic_angular_energy_grid = grid;
    container.cutoff_elastic_angles = distributions.iter().map(|d| d.x().to_vec()).collect();
    container.cutoff_elastic_pdf = distributions.iter().map(|d| d.y().to_vec()).collect();

    let reducer = ElasticMomentReducer::new(
        config.cutoff_angle_cosine,
        config.number_of_moment_preserving_angles,
    )?;

    if !reducer.is_enabled() {
        info!("Moment preserving elastic data are not generated");
        return Ok(());
    }

    info!(
        "Reducing elastic tails above {} to {} discrete angles",
        config.cutoff_angle_cosine,
        config.number_of_moment_preserving_angles
    );

    let representations = moment_preserving_representations(endl, &reducer, container, &distributions, generate_new)?;

    container.moment_preserving_elastic_discrete_angles =
        representations.iter().map(|r| r.angles.clone()).collect();
    container.moment_preserving_elastic_weights = representations.iter().map(|r| r.weights.clone()).collect();
    container.moment_preserving_cross_section_reductions = representations
        .iter()
        .map(|r| r.cross_section_reduction)
        .collect();

    container.moment_preserving_cross_section =
        moment_preserving_cross_section(&table, config, container, disable_progress)?;

    Ok(())
}

fn distribution_at(table: &TwoDTable, config: &GeneratorConfig, energy: f64) -> Result<Tabular> {
    Ok(table.distribution_at(
        energy_in_table(table, energy),
        config.electron_two_d_interp,
        config.electron_two_d_grid,
        config.tabular_evaluation_tolerance,
    )?)
}

/// Reduce the tail at every angular energy
///
/// A failure at the first or last energy is retried once with cross sections
/// taken straight from the ENDL tables when distributions are synthesised at
/// the bounds. Any other failure is fatal.
fn moment_preserving_representations(
    endl: &EndlTables,
    reducer: &ElasticMomentReducer,
    container: &EprDataContainer,
    distributions: &[Tabular],
    generate_new: bool,
) -> Result<Vec<MomentPreservingRepresentation>> {
    let union_grid = &container.electron_energy_grid;
    let cutoff = Tabular::new(
        union_grid.clone(),
        container.cutoff_elastic_cross_section.dense(),
        Interp::LogLog,
    )?;
    let rutherford = Tabular::new(
        union_grid.clone(),
        container.screened_rutherford_elastic_cross_section.dense(),
        Interp::LogLog,
    )?;

    // kept neighbours may sit just outside of the union grid
    let (lower, upper) = (cutoff.lower_bound(), cutoff.upper_bound());

    let samples = izip!(&container.elastic_angular_energy_grid, distributions)
        .map(|(energy, distribution)| {
            let union_energy = energy.clamp(lower, upper);
            Ok(ElasticSample::new(
                *energy,
                distribution.clone(),
                cutoff.evaluate(union_energy),
                rutherford.evaluate(union_energy),
            )?)
        })
        .collect::<Result<Vec<ElasticSample>>>()?;

    let last = samples.len().saturating_sub(1);

    reducer
        .reduce_all(&samples)
        .into_iter()
        .enumerate()
        .map(|(i, result)| match result {
            Ok(representation) => Ok(representation),
            Err(e) if generate_new && (i == 0 || i == last) => {
                warn!(
                    "Moment reduction failed at {} MeV ({e}), retrying with the tabulated cross sections",
                    samples[i].energy().sci(5, 2)
                );
                let sample = tabulated_sample(endl, &samples[i])?;
                Ok(reducer.reduce(&sample)?)
            }
            Err(e) => Err(e.into()),
        })
        .collect()
}

/// Same sample with cross sections from the ENDL tables
fn tabulated_sample(endl: &EndlTables, sample: &ElasticSample) -> Result<ElasticSample> {
    let energy = sample.energy();
    let cutoff = endl.cutoff_elastic_cross_section.cross_section()?;
    let total = endl.total_elastic_cross_section.cross_section()?;

    let sigma_cutoff = cutoff.evaluate(energy.clamp(cutoff.lower_bound(), cutoff.upper_bound()));
    let sigma_total = total.evaluate(energy.clamp(total.lower_bound(), total.upper_bound()));

    Ok(ElasticSample::new(
        energy,
        sample.distribution().clone(),
        sigma_cutoff,
        (sigma_total - sigma_cutoff).max(0.0),
    )?)
}

/// Reduced elastic cross section on the electron union grid
///
/// Above the cutoff elastic threshold this is the reduction factor times the
/// screened Rutherford cross section plus the cutoff cross section above the
/// cutoff angle cosine.
fn moment_preserving_cross_section(
    table: &TwoDTable,
    config: &GeneratorConfig,
    container: &EprDataContainer,
    disable_progress: bool,
) -> Result<RetabulatedCrossSection> {
    let reduction = reduction_interpolator(
        &container.elastic_angular_energy_grid,
        &container.moment_preserving_cross_section_reductions,
        config.electron_two_d_interp,
    )?;

    let grid = &container.electron_energy_grid;
    let threshold_index = container.cutoff_elastic_cross_section.threshold_index;

    let mut progress_bar = init_progress_bar(
        grid.len() - threshold_index,
        "Moment preserving cross section",
        disable_progress,
    )?;

    let mut values = Vec::with_capacity(grid.len() - threshold_index);

    for (i, energy) in grid.iter().enumerate().skip(threshold_index) {
        let distribution = distribution_at(table, config, *energy)?;
        let tail = 1.0 - cutoff_cdf(&distribution, config.cutoff_angle_cosine);

        let sigma_cutoff = container.cutoff_elastic_cross_section.value_at(i);
        let sigma_rutherford = container.screened_rutherford_elastic_cross_section.value_at(i);

        values.push(reduction(*energy) * (sigma_rutherford + tail * sigma_cutoff));
        progress_bar.update(1)?;
    }

    finish_progress_bar(disable_progress);

    Ok(RetabulatedCrossSection {
        threshold_index,
        values,
    })
}

/// Reduction factor at any energy, zero beyond the angular grid
///
/// A single reduction factor applies everywhere.
fn reduction_interpolator(
    energies: &[f64],
    reductions: &[f64],
    interp: TwoDInterp,
) -> Result<Box<dyn Fn(f64) -> f64>> {
    if reductions.len() == 1 {
        let reduction = reductions[0];
        return Ok(Box::new(move |_| reduction));
    }

    let energy_interp = match interp {
        TwoDInterp::LinLinLog => Interp::LinLog,
        _ => Interp::LinLin,
    };

    let table = Tabular::new(energies.to_vec(), reductions.to_vec(), energy_interp)?;
    Ok(Box::new(move |energy| table.evaluate(energy)))
}
