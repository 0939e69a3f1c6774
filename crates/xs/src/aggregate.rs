// crate modules
use crate::error::{Error, Result};
use crate::retabulate::{populate, RetabulatedCrossSection};

// external crates
use serde::{Deserialize, Serialize};

/// Running total of cross sections on a union grid
///
/// ```rust
/// # use eprtools_xs::{populate, TotalCrossSection};
/// let mut total = TotalCrossSection::zeros(3);
/// total.add_contribution(&populate(vec![1.0, 1.0, 1.0], false).unwrap()).unwrap();
/// total.add_contribution(&populate(vec![0.0, 2.0, 3.0], true).unwrap()).unwrap();
///
/// assert_eq!(total.values(), &[1.0, 3.0, 4.0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalCrossSection {
    values: Vec<f64>,
}

impl TotalCrossSection {
    /// Zero total on a grid of the given length
    pub fn zeros(grid_len: usize) -> Self {
        Self {
            values: vec![0.0; grid_len],
        }
    }

    /// Dense values aligned with the union grid
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Take the dense values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Add a retabulated cross section from its threshold up
    pub fn add_contribution(&mut self, contribution: &RetabulatedCrossSection) -> Result<()> {
        contribution.check_grid_len(self.values.len())?;

        let start = self.values.len() - contribution.values.len();
        for (total, value) in self.values[start..].iter_mut().zip(contribution.values.iter()) {
            *total += value;
        }
        Ok(())
    }

    /// Add several contributions in turn
    pub fn add_all<'a, I>(&mut self, contributions: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a RetabulatedCrossSection>,
    {
        for contribution in contributions {
            self.add_contribution(contribution)?;
        }
        Ok(())
    }

    /// Retabulated view of the total, dropping any zero prefix
    pub fn to_retabulated(&self, zero_at_threshold: bool) -> Result<RetabulatedCrossSection> {
        populate(self.values.clone(), zero_at_threshold)
    }
}

/// Sum subshell cross sections into a single retabulated total
///
/// The subshell photoelectric total keeps no zero at its threshold, while the
/// impulse approximation incoherent total does.
///
/// ```rust
/// # use eprtools_xs::{populate, sum_subshells};
/// let k = populate(vec![0.0, 0.0, 2.0], false).unwrap();
/// let l = populate(vec![0.0, 1.0, 1.0], false).unwrap();
///
/// let total = sum_subshells(3, [&k, &l], false).unwrap();
/// assert_eq!(total.threshold_index, 1);
/// assert_eq!(total.values, vec![1.0, 3.0]);
/// ```
pub fn sum_subshells<'a, I>(grid_len: usize, subshells: I, zero_at_threshold: bool) -> Result<RetabulatedCrossSection>
where
    I: IntoIterator<Item = &'a RetabulatedCrossSection>,
{
    let mut total = TotalCrossSection::zeros(grid_len);
    total.add_all(subshells)?;

    if total.values.is_empty() {
        return Err(Error::SizeMismatch {
            expected: 1,
            found: 0,
        });
    }

    total.to_retabulated(zero_at_threshold)
}
