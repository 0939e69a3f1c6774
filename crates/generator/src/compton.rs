//! Compton profiles, occupation numbers and momentum tables

// crate modules
use crate::error::Result;
use crate::tables::Table;

// eprtools modules
use eprtools_numeric::{GridGenerator, Interp, Tabular};
use eprtools_xs::constants::INVERSE_FINE_STRUCTURE_CONSTANT;

/// Starting momentum grid (mₑc) for profiles and occupation numbers
const MOMENTUM_GRID: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];

/// Optimised Compton profile and occupation number of one subshell
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ComptonData {
    pub momentum_grid: Vec<f64>,
    pub profile: Vec<f64>,
    pub occupation_momentum_grid: Vec<f64>,
    pub occupation_number: Vec<f64>,
}

impl ComptonData {
    /// Build everything from a half profile in atomic units
    ///
    /// The profile and the occupation number each get their own grid
    /// generator, since they are refined to different tolerances.
    pub fn from_half_profile(
        half: &Tabular,
        profile_generator: &GridGenerator,
        occupation_generator: &GridGenerator,
    ) -> Result<Self> {
        let full = full_profile(half)?;

        let mut momentum_grid = MOMENTUM_GRID.to_vec();
        let profile = profile_generator.generate_and_evaluate_in_place(&mut momentum_grid, |p| full.evaluate(p))?;

        let (occupation_momentum_grid, occupation_number) =
            occupation_number(&momentum_grid, &profile, occupation_generator)?;

        Ok(Self {
            momentum_grid,
            profile,
            occupation_momentum_grid,
            occupation_number,
        })
    }
}

/// Mirror a half profile about zero momentum and convert it to mₑc units
///
/// Momentum is divided by the inverse fine structure constant and the
/// profile multiplied by it, so the area under the profile is unchanged.
pub(crate) fn full_profile(half: &Tabular) -> Result<Tabular> {
    let starts_at_zero = half.lower_bound() == 0.0;

    let negative = half
        .x()
        .iter()
        .zip(half.y().iter())
        .rev()
        .filter(|(p, _)| !(starts_at_zero && **p == 0.0))
        .map(|(p, j)| (-p, *j));

    let positive = half.x().iter().copied().zip(half.y().iter().copied());

    let (momentum, profile): (Vec<f64>, Vec<f64>) = negative
        .chain(positive)
        .map(|(p, j)| {
            (
                p / INVERSE_FINE_STRUCTURE_CONSTANT,
                j * INVERSE_FINE_STRUCTURE_CONSTANT,
            )
        })
        .unzip();

    Ok(Tabular::new(momentum, profile, Interp::LogLin)?)
}

/// Normalised running integral of a lin-lin profile
///
/// Values that round to one or above are set to exactly one.
pub(crate) fn occupation_number(
    momentum_grid: &[f64],
    profile: &[f64],
    generator: &GridGenerator,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let profile = Tabular::new(momentum_grid.to_vec(), profile.to_vec(), Interp::LinLin)?;
    let norm = profile.integral();

    let mut grid = MOMENTUM_GRID.to_vec();
    let mut values = generator.generate_and_evaluate_in_place(&mut grid, |p| {
        if norm > 0.0 {
            profile.integral_to(p) / norm
        } else {
            0.0
        }
    })?;

    if let Some(first_unity) = values.iter().position(|n| *n >= 1.0) {
        values[first_unity..].iter_mut().for_each(|n| *n = 1.0);
    }

    Ok((grid, values))
}

/// Refine a momentum table with log-log evaluation
///
/// A leading zero momentum point cannot be evaluated on log-log, so it is
/// kept aside and put back in front of the refined table.
pub(crate) fn refine_momentum_table(table: &Table, generator: &GridGenerator) -> Result<(Vec<f64>, Vec<f64>)> {
    let (head, body) = match (table.x.first(), table.y.first()) {
        (Some(x), Some(y)) if *x == 0.0 => (Some((*x, *y)), table.without_first_point()),
        _ => (None, table.clone()),
    };

    let function = body.tabular(Interp::LogLog)?;

    let mut grid = vec![function.lower_bound(), function.upper_bound()];
    let mut values = generator.generate_and_evaluate_in_place(&mut grid, |x| function.evaluate(x))?;

    if let Some((x, y)) = head {
        grid.insert(0, x);
        values.insert(0, y);
    }

    Ok((grid, values))
}

/// Squared form factor on a squared momentum grid
pub(crate) fn squared_form_factor(
    momentum_grid: &[f64],
    form_factor: &[f64],
    generator: &GridGenerator,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let function = Tabular::new(momentum_grid.to_vec(), form_factor.to_vec(), Interp::LinLin)?;

    let mut grid = vec![
        function.lower_bound().powi(2),
        function.upper_bound().powi(2),
    ];

    let values = generator.generate_and_evaluate_in_place(&mut grid, |q2| function.evaluate(q2.sqrt()).powi(2))?;

    Ok((grid, values))
}

#[cfg(test)]
mod compton_tests {
    use super::*;

    fn generator() -> GridGenerator {
        GridGenerator::new(Interp::LinLin, 1e-3, 1e-13, 1e-13).unwrap()
    }

    fn half_profile() -> Tabular {
        let momentum = vec![0.0, 0.5, 1.0, 2.0, 5.0, 10.0, 50.0, 137.0];
        let profile = momentum
            .iter()
            .map(|p: &f64| 0.5 / (1.0 + p * p).powi(2))
            .collect();
        Tabular::new(momentum, profile, Interp::LinLin).unwrap()
    }

    #[test]
    fn mirrored_profile() {
        let full = full_profile(&half_profile()).unwrap();

        assert_eq!(full.x().len(), 15);
        assert!((full.lower_bound() + 137.0 / INVERSE_FINE_STRUCTURE_CONSTANT).abs() < 1e-15);
        assert_eq!(full.x()[7], 0.0);
        assert!((full.evaluate(0.0) - 0.5 * INVERSE_FINE_STRUCTURE_CONSTANT).abs() < 1e-9);

        let p = 2.0 / INVERSE_FINE_STRUCTURE_CONSTANT;
        assert!((full.evaluate(p) - full.evaluate(-p)).abs() < 1e-12);
    }

    #[test]
    fn occupation_number_is_a_cdf() {
        let data = ComptonData::from_half_profile(&half_profile(), &generator(), &generator()).unwrap();

        let n = &data.occupation_number;
        assert_eq!(data.occupation_momentum_grid.first(), Some(&-1.0));
        assert_eq!(data.occupation_momentum_grid.last(), Some(&1.0));
        assert_eq!(n[0], 0.0);
        assert_eq!(n[n.len() - 1], 1.0);
        assert!(n.windows(2).all(|w| w[1] >= w[0]));

        // symmetric profile, half the electrons below zero momentum
        let i = data
            .occupation_momentum_grid
            .iter()
            .position(|p| *p == 0.0)
            .unwrap();
        assert!((n[i] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn zero_momentum_is_kept_aside() {
        let table = Table::new(vec![0.0, 1e6, 1e8, 1e9], vec![6.0, 5.5, 1.0, 1e-3]);
        let (grid, values) = refine_momentum_table(&table, &generator()).unwrap();

        assert_eq!(grid[0], 0.0);
        assert_eq!(values[0], 6.0);
        assert_eq!(grid[1], 1e6);
        assert_eq!(grid.last(), Some(&1e9));
        assert!(grid.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn squared_grid() {
        let (grid, values) = squared_form_factor(&[0.0, 1.0, 2.0], &[6.0, 3.0, 1.0], &generator()).unwrap();
        assert_eq!(grid.first(), Some(&0.0));
        assert_eq!(grid.last(), Some(&4.0));
        assert_eq!(values[0], 36.0);
        assert_eq!(values[values.len() - 1], 1.0);
    }
}
