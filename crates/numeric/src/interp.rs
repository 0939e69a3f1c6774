// crate modules
use crate::error::{Error, Result};

// standard library
use std::fmt;
use std::str::FromStr;

// external crates
use serde::{Deserialize, Serialize};

/// Interpolation policy of a tabulated function
///
/// Names follow the usual evaluated data convention of dependent first, then
/// independent. `LinLog` is therefore linear in y and logarithmic in x.
///
/// Log processing of a non-positive value is undefined, so any segment with a
/// zero or negative end point drops back to linear processing for that
/// variable. This is what allows a cross section to rise from zero at a
/// threshold under a Log-Log policy.
///
/// ```rust
/// # use eprtools_numeric::Interp;
/// let y = Interp::LogLog.interpolate(1.0, 100.0, 10.0, 1.0, 1e4);
/// assert!((y - 100.0).abs() < 1e-9);
///
/// let policy: Interp = "Lin-Log".parse().unwrap();
/// assert_eq!(policy, Interp::LinLog);
/// assert_eq!(policy.to_string(), "Lin-Log");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interp {
    /// Linear y, linear x
    #[default]
    #[serde(rename = "Lin-Lin")]
    LinLin,
    /// Log y, log x
    #[serde(rename = "Log-Log")]
    LogLog,
    /// Linear y, log x
    #[serde(rename = "Lin-Log")]
    LinLog,
    /// Log y, linear x
    #[serde(rename = "Log-Lin")]
    LogLin,
}

impl Interp {
    /// Display name used in the data container
    pub fn name(&self) -> &'static str {
        match self {
            Interp::LinLin => "Lin-Lin",
            Interp::LogLog => "Log-Log",
            Interp::LinLog => "Lin-Log",
            Interp::LogLin => "Log-Lin",
        }
    }

    /// Is the independent variable processed with a logarithm
    pub fn is_log_independent(&self) -> bool {
        matches!(self, Interp::LogLog | Interp::LinLog)
    }

    /// Is the dependent variable processed with a logarithm
    pub fn is_log_dependent(&self) -> bool {
        matches!(self, Interp::LogLog | Interp::LogLin)
    }

    /// Map an independent value into the interpolation space
    pub fn process_independent(&self, x: f64) -> f64 {
        if self.is_log_independent() {
            x.ln()
        } else {
            x
        }
    }

    /// Map a processed independent value back
    pub fn recover_independent(&self, processed: f64) -> f64 {
        if self.is_log_independent() {
            processed.exp()
        } else {
            processed
        }
    }

    /// Map a dependent value into the interpolation space
    pub fn process_dependent(&self, y: f64) -> f64 {
        if self.is_log_dependent() {
            y.ln()
        } else {
            y
        }
    }

    /// Map a processed dependent value back
    pub fn recover_dependent(&self, processed: f64) -> f64 {
        if self.is_log_dependent() {
            processed.exp()
        } else {
            processed
        }
    }

    /// Fraction of the way `x` lies between `x0` and `x1` in processed space
    ///
    /// Degenerate bins give zero.
    pub fn fraction(&self, x0: f64, x1: f64, x: f64) -> f64 {
        if x1 == x0 {
            return 0.0;
        }

        if self.is_log_independent() && x0 > 0.0 && x > 0.0 {
            (x / x0).ln() / (x1 / x0).ln()
        } else {
            (x - x0) / (x1 - x0)
        }
    }

    /// Blend two dependent values by a processed fraction `beta`
    pub fn blend(&self, beta: f64, y0: f64, y1: f64) -> f64 {
        if self.is_log_dependent() && y0 > 0.0 && y1 > 0.0 {
            (y0.ln() + beta * (y1 / y0).ln()).exp()
        } else {
            y0 + beta * (y1 - y0)
        }
    }

    /// Interpolate between (x0, y0) and (x1, y1) at x
    pub fn interpolate(&self, x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64 {
        self.blend(self.fraction(x0, x1, x), y0, y1)
    }

    /// Midpoint of a bin in processed space
    ///
    /// ```rust
    /// # use eprtools_numeric::Interp;
    /// assert_eq!(Interp::LinLin.midpoint(1.0, 3.0), 2.0);
    /// assert!((Interp::LogLog.midpoint(1.0, 100.0) - 10.0).abs() < 1e-12);
    /// ```
    pub fn midpoint(&self, x0: f64, x1: f64) -> f64 {
        if self.is_log_independent() && x0 > 0.0 && x1 > 0.0 {
            (0.5 * (x0.ln() + x1.ln())).exp()
        } else {
            0.5 * (x0 + x1)
        }
    }
}

impl fmt::Display for Interp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Interp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "lin-lin" | "linlin" => Ok(Interp::LinLin),
            "log-log" | "loglog" => Ok(Interp::LogLog),
            "lin-log" | "linlog" => Ok(Interp::LinLog),
            "log-lin" | "loglin" => Ok(Interp::LogLin),
            _ => Err(Error::UnknownPolicy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod interp_tests {
    use super::*;

    #[test]
    fn lin_lin() {
        let y = Interp::LinLin.interpolate(0.0, 2.0, 0.5, 1.0, 3.0);
        assert_eq!(y, 1.5);
    }

    #[test]
    fn lin_log() {
        // linear in y against log of x
        let y = Interp::LinLog.interpolate(1.0, 100.0, 10.0, 0.0, 2.0);
        assert!((y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn log_lin() {
        // log of y against linear x
        let y = Interp::LogLin.interpolate(0.0, 2.0, 1.0, 1.0, 100.0);
        assert!((y - 10.0).abs() < 1e-12);
    }

    #[test]
    fn zero_end_point_falls_back_to_linear() {
        let y = Interp::LogLog.interpolate(1.0, 3.0, 2.0, 0.0, 4.0);
        assert!(y.is_finite());
        assert!(y > 0.0 && y < 4.0);
    }

    #[test]
    fn round_trip_processing() {
        for policy in [Interp::LinLin, Interp::LogLog, Interp::LinLog, Interp::LogLin] {
            let x = policy.recover_independent(policy.process_independent(3.5));
            let y = policy.recover_dependent(policy.process_dependent(7.25));
            assert!((x - 3.5).abs() < 1e-12);
            assert!((y - 7.25).abs() < 1e-12);
        }
    }

    #[test]
    fn unknown_name() {
        assert!("Cubic".parse::<Interp>().is_err());
    }
}
