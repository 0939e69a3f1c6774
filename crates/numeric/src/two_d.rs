// crate modules
use crate::error::{Error, Result};
use crate::interp::Interp;
use crate::tabular::Tabular;

// eprtools modules
use eprtools_utils::SliceExt;

// standard library
use std::fmt;
use std::str::FromStr;

// external crates
use serde::{Deserialize, Serialize};

/// Interpolation policy between two secondary distributions
///
/// The three parts are the secondary value, the secondary variable and the
/// incident energy. Only the first and last parts change the result of
/// tabulating a distribution at an intermediate energy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TwoDInterp {
    /// Log pdf, log secondary, log energy
    #[default]
    #[serde(rename = "Log-Log-Log")]
    LogLogLog,
    /// Lin pdf, lin secondary, lin energy
    #[serde(rename = "Lin-Lin-Lin")]
    LinLinLin,
    /// Lin pdf, lin secondary, log energy
    #[serde(rename = "Lin-Lin-Log")]
    LinLinLog,
}

impl TwoDInterp {
    /// Display name used in the data container
    pub fn name(&self) -> &'static str {
        match self {
            TwoDInterp::LogLogLog => "Log-Log-Log",
            TwoDInterp::LinLinLin => "Lin-Lin-Lin",
            TwoDInterp::LinLinLog => "Lin-Lin-Log",
        }
    }

    /// Policy used along the incident energy axis
    pub fn energy_interp(&self) -> Interp {
        match self {
            TwoDInterp::LogLogLog => Interp::LogLog,
            TwoDInterp::LinLinLin => Interp::LinLin,
            TwoDInterp::LinLinLog => Interp::LinLog,
        }
    }
}

impl fmt::Display for TwoDInterp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TwoDInterp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "log-log-log" | "logloglog" => Ok(TwoDInterp::LogLogLog),
            "lin-lin-lin" | "linlinlin" => Ok(TwoDInterp::LinLinLin),
            "lin-lin-log" | "linlinlog" => Ok(TwoDInterp::LinLinLog),
            _ => Err(Error::UnknownPolicy(s.to_string())),
        }
    }
}

/// Grid policy for matching two secondary distributions
///
/// For tabulation the unit-base policies scale each distribution onto a
/// common unit interval before interpolating, while the direct policies
/// interpolate at the same secondary value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TwoDGrid {
    /// Unit-base scaling with correlated sampling
    #[default]
    #[serde(rename = "Unit-base Correlated")]
    UnitBaseCorrelated,
    /// Unit-base scaling
    #[serde(rename = "Unit-base")]
    UnitBase,
    /// Correlated sampling on the raw secondary grids
    #[serde(rename = "Correlated")]
    Correlated,
    /// Direct interpolation on the raw secondary grids
    #[serde(rename = "Direct")]
    Direct,
}

impl TwoDGrid {
    /// Display name used in the data container
    pub fn name(&self) -> &'static str {
        match self {
            TwoDGrid::UnitBaseCorrelated => "Unit-base Correlated",
            TwoDGrid::UnitBase => "Unit-base",
            TwoDGrid::Correlated => "Correlated",
            TwoDGrid::Direct => "Direct",
        }
    }

    /// Does the policy scale distributions to a unit base
    pub fn is_unit_base(&self) -> bool {
        matches!(self, TwoDGrid::UnitBaseCorrelated | TwoDGrid::UnitBase)
    }
}

impl fmt::Display for TwoDGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TwoDGrid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "unit-base-correlated" | "unitbasecorrelated" => Ok(TwoDGrid::UnitBaseCorrelated),
            "unit-base" | "unitbase" => Ok(TwoDGrid::UnitBase),
            "correlated" => Ok(TwoDGrid::Correlated),
            "direct" => Ok(TwoDGrid::Direct),
            _ => Err(Error::UnknownPolicy(s.to_string())),
        }
    }
}

/// Energy dependent secondary distributions
///
/// One tabulated distribution per incident energy, used for elastic angular
/// distributions and the secondary energy distributions of electrons.
///
/// ```rust
/// # use eprtools_numeric::{Interp, Tabular, TwoDGrid, TwoDInterp, TwoDTable};
/// let low = Tabular::new(vec![0.0, 1.0], vec![1.0, 1.0], Interp::LinLin).unwrap();
/// let high = Tabular::new(vec![0.0, 2.0], vec![0.5, 0.5], Interp::LinLin).unwrap();
/// let table = TwoDTable::new(vec![1.0, 3.0], vec![low, high]).unwrap();
///
/// let mid = table
///     .distribution_at(2.0, TwoDInterp::LinLinLin, TwoDGrid::UnitBase, 1e-7)
///     .unwrap();
/// assert!((mid.upper_bound() - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoDTable {
    energies: Vec<f64>,
    distributions: Vec<Tabular>,
}

impl TwoDTable {
    /// Build a table of distributions on an ascending energy grid
    pub fn new(energies: Vec<f64>, distributions: Vec<Tabular>) -> Result<Self> {
        if energies.is_empty() {
            return Err(Error::TooFewPoints {
                found: 0,
                minimum: 1,
            });
        }

        if energies.len() != distributions.len() {
            return Err(Error::LengthMismatch {
                expected: energies.len(),
                found: distributions.len(),
            });
        }

        energies.check_strictly_ascending()?;
        Ok(Self {
            energies,
            distributions,
        })
    }

    /// Incident energy grid
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// Distribution at each incident energy
    pub fn distributions(&self) -> &[Tabular] {
        &self.distributions
    }

    /// Consume the table into its parts
    pub fn into_parts(self) -> (Vec<f64>, Vec<Tabular>) {
        (self.energies, self.distributions)
    }

    /// Evaluate the secondary distribution at (energy, x)
    pub fn evaluate(&self, energy: f64, x: f64, interp: TwoDInterp, grid: TwoDGrid) -> Result<f64> {
        let (lower, upper, beta) = match self.bracket(energy, interp)? {
            Bracket::Exact(i) => return Ok(self.distributions[i].evaluate(x)),
            Bracket::Between(i, beta) => (&self.distributions[i], &self.distributions[i + 1], beta),
        };

        let value_interp = Self::value_interp(interp);

        if !grid.is_unit_base() {
            return Ok(value_interp.blend(beta, lower.evaluate(x), upper.evaluate(x)));
        }

        // interpolated bounds of the intermediate distribution
        let (min, max) = Self::interpolated_bounds(lower, upper, beta);
        if x < min || x > max || max <= min {
            return Ok(0.0);
        }

        let u = (x - min) / (max - min);
        let l0 = lower.upper_bound() - lower.lower_bound();
        let l1 = upper.upper_bound() - upper.lower_bound();

        let p0 = lower.evaluate(lower.lower_bound() + u * l0) * l0;
        let p1 = upper.evaluate(upper.lower_bound() + u * l1) * l1;

        Ok(value_interp.blend(beta, p0, p1) / (max - min))
    }

    /// Tabulate the secondary distribution at an incident energy
    ///
    /// Exact grid energies return a copy of the stored distribution. Between
    /// grid energies the result is evaluated on the union of both secondary
    /// grids (mapped through the unit base for unit-base policies), with
    /// points closer than the relative tolerance merged.
    pub fn distribution_at(
        &self,
        energy: f64,
        interp: TwoDInterp,
        grid: TwoDGrid,
        tolerance: f64,
    ) -> Result<Tabular> {
        let (lower, upper, beta) = match self.bracket(energy, interp)? {
            Bracket::Exact(i) => return Ok(self.distributions[i].clone()),
            Bracket::Between(i, beta) => (&self.distributions[i], &self.distributions[i + 1], beta),
        };

        let mut x = if grid.is_unit_base() {
            let (min, max) = Self::interpolated_bounds(lower, upper, beta);
            Self::unit_grid(lower)
                .chain(Self::unit_grid(upper))
                .map(|u| min + u * (max - min))
                .collect::<Vec<f64>>()
        } else {
            lower.x().iter().chain(upper.x().iter()).copied().collect()
        };

        x.sort_by(|a, b| a.total_cmp(b));
        x.dedup_by(|b, a| (*b - *a).abs() <= tolerance * a.abs().max(b.abs()));

        let y = x
            .iter()
            .map(|xi| self.evaluate(energy, *xi, interp, grid))
            .collect::<Result<Vec<f64>>>()?;

        Tabular::new(x, y, Interp::LinLin)
    }

    fn unit_grid(table: &Tabular) -> impl Iterator<Item = f64> + '_ {
        let (min, max) = (table.lower_bound(), table.upper_bound());
        table.x().iter().map(move |x| if max > min { (x - min) / (max - min) } else { 0.0 })
    }

    fn interpolated_bounds(lower: &Tabular, upper: &Tabular, beta: f64) -> (f64, f64) {
        let min = Interp::LinLin.blend(beta, lower.lower_bound(), upper.lower_bound());
        let max = Interp::LinLin.blend(beta, lower.upper_bound(), upper.upper_bound());
        (min, max)
    }

    fn value_interp(interp: TwoDInterp) -> Interp {
        match interp {
            TwoDInterp::LogLogLog => Interp::LogLin,
            _ => Interp::LinLin,
        }
    }

    fn bracket(&self, energy: f64, interp: TwoDInterp) -> Result<Bracket> {
        let n = self.energies.len();
        let (lower, upper) = (self.energies[0], self.energies[n - 1]);

        if energy < lower || energy > upper || energy.is_nan() {
            return Err(Error::EnergyOutsideTable {
                energy,
                lower,
                upper,
            });
        }

        if let Some(i) = self.energies.iter().position(|e| *e == energy) {
            return Ok(Bracket::Exact(i));
        }

        let i = self.energies.find_interval(energy)?;
        let beta = interp
            .energy_interp()
            .fraction(self.energies[i], self.energies[i + 1], energy);
        Ok(Bracket::Between(i, beta))
    }
}

enum Bracket {
    Exact(usize),
    Between(usize, f64),
}

#[cfg(test)]
mod two_d_tests {
    use super::*;

    fn flat(min: f64, max: f64) -> Tabular {
        let h = 1.0 / (max - min);
        Tabular::new(vec![min, max], vec![h, h], Interp::LinLin).unwrap()
    }

    #[test]
    fn exact_energy_returns_stored() {
        let table = TwoDTable::new(vec![1.0, 2.0], vec![flat(0.0, 1.0), flat(0.0, 2.0)]).unwrap();
        let d = table
            .distribution_at(2.0, TwoDInterp::LogLogLog, TwoDGrid::Direct, 1e-7)
            .unwrap();
        assert_eq!(d, flat(0.0, 2.0));
    }

    #[test]
    fn outside_energy_range() {
        let table = TwoDTable::new(vec![1.0, 2.0], vec![flat(0.0, 1.0), flat(0.0, 2.0)]).unwrap();
        assert!(table
            .distribution_at(3.0, TwoDInterp::LinLinLin, TwoDGrid::Direct, 1e-7)
            .is_err());
    }

    #[test]
    fn unit_base_stays_normalised() {
        let table = TwoDTable::new(vec![1.0, 4.0], vec![flat(0.0, 1.0), flat(0.0, 4.0)]).unwrap();
        let d = table
            .distribution_at(2.0, TwoDInterp::LinLinLog, TwoDGrid::UnitBase, 1e-7)
            .unwrap();
        assert!((d.integral() - 1.0).abs() < 1e-12);
        assert!((d.upper_bound() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn direct_uses_union_grid() {
        let a = Tabular::new(vec![0.0, 0.5, 1.0], vec![1.0, 1.0, 1.0], Interp::LinLin).unwrap();
        let b = Tabular::new(vec![0.0, 0.25, 1.0], vec![2.0, 2.0, 2.0], Interp::LinLin).unwrap();
        let table = TwoDTable::new(vec![1.0, 3.0], vec![a, b]).unwrap();

        let d = table
            .distribution_at(2.0, TwoDInterp::LinLinLin, TwoDGrid::Direct, 1e-7)
            .unwrap();
        assert_eq!(d.x(), &[0.0, 0.25, 0.5, 1.0]);
        assert!(d.y().iter().all(|y| (y - 1.5).abs() < 1e-12));
    }

    #[test]
    fn policy_names() {
        assert_eq!(
            "Unit-base Correlated".parse::<TwoDGrid>().unwrap(),
            TwoDGrid::UnitBaseCorrelated
        );
        assert_eq!("Lin-Lin-Log".parse::<TwoDInterp>().unwrap(), TwoDInterp::LinLinLog);
        assert_eq!(TwoDInterp::default().to_string(), "Log-Log-Log");
    }
}
