// crate modules
use crate::error::{Error, Result};
use crate::interp::Interp;

// eprtools modules
use eprtools_utils::SliceExt;

// external crates
use serde::{Deserialize, Serialize};

/// One dimensional tabulated function with an interpolation policy
///
/// The independent values must be non-decreasing. A repeated value marks a
/// discontinuity, and evaluation exactly on it takes the upper branch.
///
/// Evaluation outside of the tabulated range is zero.
///
/// ```rust
/// # use eprtools_numeric::{Interp, Tabular};
/// let table = Tabular::new(vec![1.0, 2.0, 4.0], vec![2.0, 4.0, 8.0], Interp::LinLin).unwrap();
///
/// assert_eq!(table.lower_bound(), 1.0);
/// assert_eq!(table.upper_bound(), 4.0);
/// assert_eq!(table.evaluate(3.0), 6.0);
/// assert_eq!(table.evaluate(5.0), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tabular {
    x: Vec<f64>,
    y: Vec<f64>,
    interp: Interp,
}

impl Tabular {
    /// Build a table, checking lengths and ordering
    pub fn new(x: Vec<f64>, y: Vec<f64>, interp: Interp) -> Result<Self> {
        if x.len() < 2 {
            return Err(Error::TooFewPoints {
                found: x.len(),
                minimum: 2,
            });
        }

        if x.len() != y.len() {
            return Err(Error::LengthMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }

        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(eprtools_utils::Error::UndefinedGridValue.into());
        }

        if let Some(i) = x.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::Unsorted(i + 1));
        }

        Ok(Self { x, y, interp })
    }

    /// Build a table from log processed data
    ///
    /// Processed reference tables store ln(x) and ln(y), with a zero entry
    /// standing in for a zero value. The leading run of zero entries is
    /// trimmed before recovering the raw values.
    ///
    /// ```rust
    /// # use eprtools_numeric::{Interp, Tabular};
    /// let ln_e = vec![0.0_f64, 1.0, 2.0];
    /// let ln_xs = vec![0.0_f64, 1.0, 0.5];
    /// let table = Tabular::from_log_processed(&ln_e, &ln_xs, Interp::LogLog).unwrap();
    /// assert_eq!(table.x().len(), 2);
    /// assert!((table.lower_bound() - 1.0_f64.exp()).abs() < 1e-12);
    /// ```
    pub fn from_log_processed(ln_x: &[f64], ln_y: &[f64], interp: Interp) -> Result<Self> {
        if ln_x.len() != ln_y.len() {
            return Err(Error::LengthMismatch {
                expected: ln_x.len(),
                found: ln_y.len(),
            });
        }

        let start = ln_y.iter().position(|v| *v != 0.0).unwrap_or(ln_y.len());

        Self::new(
            ln_x[start..].iter().map(|v| v.exp()).collect(),
            ln_y[start..].iter().map(|v| v.exp()).collect(),
            interp,
        )
    }

    /// Independent values
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Dependent values
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Interpolation policy
    pub fn interp(&self) -> Interp {
        self.interp
    }

    /// Lowest tabulated independent value
    pub fn lower_bound(&self) -> f64 {
        self.x[0]
    }

    /// Highest tabulated independent value
    pub fn upper_bound(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Evaluate the function at x, zero outside of the tabulated range
    pub fn evaluate(&self, x: f64) -> f64 {
        let i = match self.x.find_interval(x) {
            Ok(i) => i,
            Err(_) => return 0.0,
        };

        let (x0, x1) = (self.x[i], self.x[i + 1]);
        if x == x1 {
            return self.y[i + 1];
        }

        self.interp
            .interpolate(x0, x1, x, self.y[i], self.y[i + 1])
    }

    /// Same table with a different interpolation policy
    pub fn with_interp(mut self, interp: Interp) -> Self {
        self.interp = interp;
        self
    }

    /// Running integral over the table, treating each segment as linear
    ///
    /// ```rust
    /// # use eprtools_numeric::{Interp, Tabular};
    /// let pdf = Tabular::new(vec![0.0, 1.0, 2.0], vec![1.0, 1.0, 1.0], Interp::LinLin).unwrap();
    /// assert_eq!(pdf.running_integral(), vec![0.0, 1.0, 2.0]);
    /// ```
    pub fn running_integral(&self) -> Vec<f64> {
        let mut cdf = Vec::with_capacity(self.x.len());
        cdf.push(0.0);

        let mut total = 0.0;
        for i in 1..self.x.len() {
            total += 0.5 * (self.y[i] + self.y[i - 1]) * (self.x[i] - self.x[i - 1]);
            cdf.push(total);
        }
        cdf
    }

    /// Integral over the full table, treating each segment as linear
    pub fn integral(&self) -> f64 {
        self.running_integral().last().copied().unwrap_or(0.0)
    }

    /// Integral from the lower bound up to x, treating segments as linear
    pub fn integral_to(&self, x: f64) -> f64 {
        if x <= self.lower_bound() {
            return 0.0;
        }
        if x >= self.upper_bound() {
            return self.integral();
        }

        let mut total = 0.0;
        for i in 1..self.x.len() {
            let (x0, x1) = (self.x[i - 1], self.x[i]);
            let (y0, y1) = (self.y[i - 1], self.y[i]);
            if x1 <= x {
                total += 0.5 * (y0 + y1) * (x1 - x0);
            } else {
                let yx = Interp::LinLin.interpolate(x0, x1, x, y0, y1);
                total += 0.5 * (y0 + yx) * (x - x0);
                break;
            }
        }
        total
    }
}
