// crate modules
use crate::error::{Error, Result};

// eprtools modules
use eprtools_numeric::{Interp, Tabular};

// external crates
use serde::{Deserialize, Serialize};

/// Cross section on a union grid, stored from its threshold index up
///
/// Values below the threshold index are implicit zeros, so that
/// `values.len() == grid.len() - threshold_index` always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetabulatedCrossSection {
    /// Index of the first stored value on the union grid
    pub threshold_index: usize,
    /// Values from the threshold index to the end of the grid
    pub values: Vec<f64>,
}

impl RetabulatedCrossSection {
    /// Length of the grid this cross section was retabulated onto
    pub fn grid_len(&self) -> usize {
        self.threshold_index + self.values.len()
    }

    /// Value at a grid index, zero below the threshold
    pub fn value_at(&self, index: usize) -> f64 {
        index
            .checked_sub(self.threshold_index)
            .and_then(|i| self.values.get(i))
            .copied()
            .unwrap_or(0.0)
    }

    /// Values expanded to the full grid with explicit zeros
    pub fn dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.threshold_index];
        dense.extend_from_slice(&self.values);
        dense
    }

    /// Check the cross section fits a grid of the given length
    pub fn check_grid_len(&self, grid_len: usize) -> Result<()> {
        if self.grid_len() != grid_len {
            return Err(Error::SizeMismatch {
                expected: grid_len,
                found: self.grid_len(),
            });
        }
        Ok(())
    }
}

/// Retabulate a cross section onto a union grid
///
/// Below the true threshold the cross section is zero. Between the true
/// threshold and the first tabulated energy a lin-lin line rises to the
/// first tabulated value, starting from zero when `zero_at_threshold` is set
/// or from that same first value otherwise. Everything else is evaluated with
/// the table's own interpolation.
///
/// ```rust
/// # use eprtools_numeric::{Interp, Tabular};
/// # use eprtools_xs::retabulate;
/// let grid = [1.0, 2.0, 3.0, 4.0];
/// let xs = Tabular::new(vec![3.0, 4.0], vec![6.0, 8.0], Interp::LinLin).unwrap();
///
/// let retabulated = retabulate(&grid, &xs, 2.0, true).unwrap();
/// assert_eq!(retabulated.threshold_index, 1);
/// assert_eq!(retabulated.values, vec![0.0, 6.0, 8.0]);
/// ```
pub fn retabulate(
    grid: &[f64],
    cross_section: &Tabular,
    true_threshold: f64,
    zero_at_threshold: bool,
) -> Result<RetabulatedCrossSection> {
    let raw = grid
        .iter()
        .map(|energy| threshold_value(cross_section, true_threshold, zero_at_threshold, *energy))
        .collect::<Vec<f64>>();

    populate(raw, zero_at_threshold)
}

/// Value of a cross section at one energy with its threshold region
///
/// This is the function [retabulate()] evaluates on every grid point, so it
/// is also the function to refine a union grid against.
///
/// ```rust
/// # use eprtools_numeric::{Interp, Tabular};
/// # use eprtools_xs::threshold_value;
/// let xs = Tabular::new(vec![2.0, 4.0], vec![4.0, 8.0], Interp::LinLin).unwrap();
///
/// assert_eq!(threshold_value(&xs, 1.0, true, 0.5), 0.0);
/// assert_eq!(threshold_value(&xs, 1.0, true, 1.5), 2.0);
/// assert_eq!(threshold_value(&xs, 1.0, false, 1.5), 4.0);
/// assert_eq!(threshold_value(&xs, 1.0, true, 3.0), 6.0);
/// ```
pub fn threshold_value(cross_section: &Tabular, true_threshold: f64, zero_at_threshold: bool, energy: f64) -> f64 {
    let current_threshold = cross_section.lower_bound();

    if energy < true_threshold {
        0.0
    } else if energy < current_threshold {
        let threshold_value = cross_section.evaluate(current_threshold);
        let start_value = if zero_at_threshold { 0.0 } else { threshold_value };
        Interp::LinLin.interpolate(
            true_threshold,
            current_threshold,
            energy,
            start_value,
            threshold_value,
        )
    } else {
        cross_section.evaluate(energy)
    }
}

/// Retabulate any function of energy onto a union grid
///
/// ```rust
/// # use eprtools_xs::retabulate_with;
/// let grid = [1.0, 2.0, 3.0];
/// let retabulated = retabulate_with(&grid, |e| (e - 2.0).max(0.0), true).unwrap();
/// assert_eq!(retabulated.threshold_index, 1);
/// assert_eq!(retabulated.values, vec![0.0, 1.0]);
/// ```
pub fn retabulate_with<F>(grid: &[f64], function: F, zero_at_threshold: bool) -> Result<RetabulatedCrossSection>
where
    F: Fn(f64) -> f64,
{
    populate(grid.iter().map(|e| function(*e)).collect(), zero_at_threshold)
}

/// Store dense values from their threshold up
///
/// The threshold is the first non-zero value. When `zero_at_threshold` is
/// set the zero just before it is kept as well. A negative or undefined value
/// anywhere is an error.
///
/// ```rust
/// # use eprtools_xs::populate;
/// let kept = populate(vec![0.0, 0.0, 1.0, 2.0], true).unwrap();
/// assert_eq!((kept.threshold_index, kept.values.len()), (1, 3));
///
/// let dropped = populate(vec![0.0, 0.0, 1.0, 2.0], false).unwrap();
/// assert_eq!((dropped.threshold_index, dropped.values.len()), (2, 2));
/// ```
pub fn populate(raw: Vec<f64>, zero_at_threshold: bool) -> Result<RetabulatedCrossSection> {
    if let Some((index, value)) = raw
        .iter()
        .enumerate()
        .find(|(_, v)| **v < 0.0 || !v.is_finite())
    {
        return Err(Error::NegativeCrossSection {
            index,
            value: *value,
        });
    }

    let mut threshold_index = raw.iter().position(|v| *v != 0.0).unwrap_or(raw.len());

    if threshold_index > 0 && zero_at_threshold {
        threshold_index -= 1;
    }

    Ok(RetabulatedCrossSection {
        threshold_index,
        values: raw[threshold_index..].to_vec(),
    })
}

/// Screened Rutherford elastic cross section from total and cutoff elastic
///
/// The difference is zeroed wherever it is smaller than `tolerance` relative
/// to the total, and the threshold sits just above the last zeroed point.
///
/// ```rust
/// # use eprtools_xs::{populate, screened_rutherford};
/// let total = populate(vec![2.0, 3.0, 5.0], false).unwrap();
/// let cutoff = populate(vec![2.0, 2.0, 2.0], false).unwrap();
///
/// let rutherford = screened_rutherford(&total, &cutoff, 1e-6).unwrap();
/// assert_eq!(rutherford.threshold_index, 1);
/// assert_eq!(rutherford.values, vec![1.0, 3.0]);
/// ```
pub fn screened_rutherford(
    total: &RetabulatedCrossSection,
    cutoff: &RetabulatedCrossSection,
    tolerance: f64,
) -> Result<RetabulatedCrossSection> {
    let n = total.grid_len();
    cutoff.check_grid_len(n)?;

    let mut threshold_index = 0;
    let mut raw = Vec::with_capacity(n);

    for i in 0..n {
        let total_value = total.value_at(i);
        let difference = total_value - cutoff.value_at(i);

        if total_value <= 0.0 || difference / total_value < tolerance {
            raw.push(0.0);
            threshold_index = i + 1;
        } else {
            raw.push(difference);
        }
    }

    Ok(RetabulatedCrossSection {
        threshold_index,
        values: raw.split_off(threshold_index),
    })
}

#[cfg(test)]
mod retabulate_tests {
    use super::*;

    #[test]
    fn threshold_region_without_zero() {
        let grid = [1.0, 2.0, 3.0];
        let xs = Tabular::new(vec![3.0, 4.0], vec![5.0, 5.0], Interp::LinLin).unwrap();

        let retabulated = retabulate(&grid, &xs, 1.5, false).unwrap();
        assert_eq!(retabulated.threshold_index, 1);
        assert_eq!(retabulated.values, vec![5.0, 5.0]);
    }

    #[test]
    fn threshold_region_ramp() {
        let grid = [1.0, 2.0, 3.0];
        let xs = Tabular::new(vec![3.0, 4.0], vec![4.0, 4.0], Interp::LinLin).unwrap();

        let retabulated = retabulate(&grid, &xs, 1.0, true).unwrap();
        assert_eq!(retabulated.threshold_index, 0);
        assert_eq!(retabulated.values, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn above_table_is_zero_prefix_only() {
        let grid = [1.0, 2.0, 3.0];
        let xs = Tabular::new(vec![0.5, 2.0], vec![1.0, 1.0], Interp::LinLin).unwrap();

        // zero above the table is stored, not part of the threshold
        let retabulated = retabulate(&grid, &xs, 0.0, false).unwrap();
        assert_eq!(retabulated.threshold_index, 0);
        assert_eq!(retabulated.values, vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn negative_value_is_rejected() {
        let result = populate(vec![0.0, 1.0, -1.0], false);
        assert!(matches!(
            result,
            Err(Error::NegativeCrossSection { index: 2, .. })
        ));
    }

    #[test]
    fn all_zero() {
        let kept = populate(vec![0.0; 3], true).unwrap();
        assert_eq!(kept.threshold_index, 2);
        assert_eq!(kept.values, vec![0.0]);

        let dropped = populate(vec![0.0; 3], false).unwrap();
        assert_eq!(dropped.threshold_index, 3);
        assert!(dropped.values.is_empty());
    }

    #[test]
    fn value_at_and_dense() {
        let xs = RetabulatedCrossSection {
            threshold_index: 2,
            values: vec![1.0, 2.0],
        };
        assert_eq!(xs.value_at(0), 0.0);
        assert_eq!(xs.value_at(3), 2.0);
        assert_eq!(xs.value_at(9), 0.0);
        assert_eq!(xs.dense(), vec![0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn rutherford_grid_mismatch() {
        let total = populate(vec![1.0, 2.0], false).unwrap();
        let cutoff = populate(vec![1.0], false).unwrap();
        assert!(matches!(
            screened_rutherford(&total, &cutoff, 1e-6),
            Err(Error::SizeMismatch { .. })
        ));
    }
}
