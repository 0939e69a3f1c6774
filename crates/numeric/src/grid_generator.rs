// crate modules
use crate::error::{Error, Result};
use crate::interp::Interp;
use crate::relative_error;

// eprtools modules
use eprtools_utils::ValueExt;

// external crates
use log::warn;

/// Adaptive refinement of a grid against an arbitrary function
///
/// Each bin is split at its midpoint in the processed space of the
/// interpolation policy until interpolating across the bin reproduces the
/// function at the midpoint within the convergence tolerance.
///
/// Refinement of a bin also stops when:
///
/// - the relative width of the bin falls to the distance tolerance
/// - the absolute difference at the midpoint falls to the absolute tolerance
///
/// Stopping on either of these while the convergence tolerance is not met is
/// "dirty convergence". It is logged as a warning by default, or treated as
/// an error once [GridGenerator::fail_on_dirty_convergence()] is set.
///
/// ```rust
/// # use eprtools_numeric::{GridGenerator, Interp};
/// let generator = GridGenerator::new(Interp::LinLin, 1e-3, 1e-13, 1e-13).unwrap();
///
/// let mut grid = vec![0.0, 1.0];
/// generator.generate_in_place(&mut grid, |x| x * x).unwrap();
///
/// assert!(grid.len() > 2);
/// assert_eq!(grid.first(), Some(&0.0));
/// assert_eq!(grid.last(), Some(&1.0));
/// ```
#[derive(Debug, Clone)]
pub struct GridGenerator {
    interp: Interp,
    convergence_tolerance: f64,
    absolute_difference_tolerance: f64,
    distance_tolerance: f64,
    fail_on_dirty_convergence: bool,
}

impl GridGenerator {
    /// Create a new generator
    ///
    /// The convergence tolerance must be in (0, 1], the absolute difference
    /// and distance tolerances in [0, 1].
    pub fn new(
        interp: Interp,
        convergence_tolerance: f64,
        absolute_difference_tolerance: f64,
        distance_tolerance: f64,
    ) -> Result<Self> {
        if !(convergence_tolerance > 0.0 && convergence_tolerance <= 1.0) {
            return Err(Error::InvalidTolerance {
                name: "convergence tolerance",
                value: convergence_tolerance,
                range: "(0, 1]",
            });
        }

        if !(0.0..=1.0).contains(&absolute_difference_tolerance) {
            return Err(Error::InvalidTolerance {
                name: "absolute difference tolerance",
                value: absolute_difference_tolerance,
                range: "[0, 1]",
            });
        }

        if !(0.0..=1.0).contains(&distance_tolerance) {
            return Err(Error::InvalidTolerance {
                name: "distance tolerance",
                value: distance_tolerance,
                range: "[0, 1]",
            });
        }

        Ok(Self {
            interp,
            convergence_tolerance,
            absolute_difference_tolerance,
            distance_tolerance,
            fail_on_dirty_convergence: false,
        })
    }

    /// Treat dirty convergence as an error rather than a warning
    pub fn fail_on_dirty_convergence(&mut self) {
        self.fail_on_dirty_convergence = true;
    }

    /// Interpolation policy used for midpoints and estimates
    pub fn interp(&self) -> Interp {
        self.interp
    }

    /// Convergence tolerance
    pub fn convergence_tolerance(&self) -> f64 {
        self.convergence_tolerance
    }

    /// Absolute difference tolerance
    pub fn absolute_difference_tolerance(&self) -> f64 {
        self.absolute_difference_tolerance
    }

    /// Distance tolerance
    pub fn distance_tolerance(&self) -> f64 {
        self.distance_tolerance
    }

    /// Refine every bin of the grid
    ///
    /// The grid must already contain at least two points, and these are all
    /// kept.
    pub fn generate_in_place<F>(&self, grid: &mut Vec<f64>, function: F) -> Result<()>
    where
        F: Fn(f64) -> f64,
    {
        let (refined, _) = self.refine(grid, &function, f64::NEG_INFINITY, f64::INFINITY)?;
        *grid = refined;
        Ok(())
    }

    /// Refine only the bins that lie within [min, max]
    ///
    /// Bins outside of the range are left untouched.
    ///
    /// ```rust
    /// # use eprtools_numeric::{GridGenerator, Interp};
    /// let generator = GridGenerator::new(Interp::LinLin, 1e-3, 1e-13, 1e-13).unwrap();
    ///
    /// let mut grid = vec![0.0, 1.0, 2.0];
    /// generator.refine_in_place(&mut grid, |x| x * x, 1.0, 2.0).unwrap();
    ///
    /// // the first bin is untouched
    /// assert_eq!(grid[0..2], [0.0, 1.0]);
    /// assert!(grid.len() > 3);
    /// ```
    pub fn refine_in_place<F>(&self, grid: &mut Vec<f64>, function: F, min: f64, max: f64) -> Result<()>
    where
        F: Fn(f64) -> f64,
    {
        let (refined, _) = self.refine(grid, &function, min, max)?;
        *grid = refined;
        Ok(())
    }

    /// Refine every bin and return the function evaluated on the new grid
    pub fn generate_and_evaluate_in_place<F>(&self, grid: &mut Vec<f64>, function: F) -> Result<Vec<f64>>
    where
        F: Fn(f64) -> f64,
    {
        let (refined, values) = self.refine(grid, &function, f64::NEG_INFINITY, f64::INFINITY)?;
        *grid = refined;
        Ok(values)
    }
}

/// Refinement internals
impl GridGenerator {
    fn refine<F>(&self, grid: &[f64], function: &F, min: f64, max: f64) -> Result<(Vec<f64>, Vec<f64>)>
    where
        F: Fn(f64) -> f64,
    {
        if grid.len() < 2 {
            return Err(Error::TooFewPoints {
                found: grid.len(),
                minimum: 2,
            });
        }

        let evaluate = |x: f64| -> Result<f64> {
            let y = function(x);
            if y.is_finite() {
                Ok(y)
            } else {
                Err(Error::UndefinedFunctionValue(x))
            }
        };

        let mut x_out = Vec::with_capacity(grid.len());
        let mut y_out = Vec::with_capacity(grid.len());
        x_out.push(grid[0]);
        y_out.push(evaluate(grid[0])?);

        for window in grid.windows(2) {
            let (lower, upper) = (window[0], window[1]);
            let upper_value = evaluate(upper)?;

            // bins outside of the requested range are kept as they are
            if lower < min || upper > max || lower == upper {
                x_out.push(upper);
                y_out.push(upper_value);
                continue;
            }

            // pending upper edges, the current lower edge is the last output
            let mut pending = vec![(upper, upper_value)];

            while let Some(&(x1, y1)) = pending.last() {
                let x0 = x_out[x_out.len() - 1];
                let y0 = y_out[y_out.len() - 1];

                let x_mid = self.interp.midpoint(x0, x1);
                let y_mid = evaluate(x_mid)?;
                let y_estimate = self.interp.interpolate(x0, x1, x_mid, y0, y1);

                let error = relative_error(y_mid, y_estimate);

                if error <= self.convergence_tolerance {
                    x_out.push(x1);
                    y_out.push(y1);
                    pending.pop();
                    continue;
                }

                let too_close = relative_error(x0, x1) <= self.distance_tolerance
                    || x_mid <= x0
                    || x_mid >= x1;
                let too_small = (y_mid - y_estimate).abs() <= self.absolute_difference_tolerance;

                if too_close || too_small {
                    self.dirty_convergence(x0, x1, error)?;
                    x_out.push(x1);
                    y_out.push(y1);
                    pending.pop();
                } else {
                    pending.push((x_mid, y_mid));
                }
            }
        }

        Ok((x_out, y_out))
    }

    fn dirty_convergence(&self, lower: f64, upper: f64, error: f64) -> Result<()> {
        if self.fail_on_dirty_convergence {
            return Err(Error::DirtyConvergence {
                lower,
                upper,
                relative_error: error,
                tolerance: self.convergence_tolerance,
            });
        }

        warn!(
            "Dirty convergence on [{}, {}] with relative error {}",
            lower.sci(6, 2),
            upper.sci(6, 2),
            error.sci(3, 2)
        );
        Ok(())
    }
}

#[cfg(test)]
mod generator_tests {
    use super::*;

    fn default_generator(interp: Interp) -> GridGenerator {
        GridGenerator::new(interp, 1e-3, 1e-13, 1e-13).unwrap()
    }

    #[test]
    fn invalid_tolerances() {
        assert!(GridGenerator::new(Interp::LinLin, 0.0, 1e-13, 1e-13).is_err());
        assert!(GridGenerator::new(Interp::LinLin, 1.5, 1e-13, 1e-13).is_err());
        assert!(GridGenerator::new(Interp::LinLin, 1e-3, -1.0, 1e-13).is_err());
        assert!(GridGenerator::new(Interp::LinLin, 1e-3, 1e-13, 2.0).is_err());
    }

    #[test]
    fn linear_function_needs_no_points() {
        let mut grid = vec![1.0, 5.0, 10.0];
        default_generator(Interp::LinLin)
            .generate_in_place(&mut grid, |x| 3.0 * x + 1.0)
            .unwrap();
        assert_eq!(grid, vec![1.0, 5.0, 10.0]);
    }

    #[test]
    fn power_law_exact_in_log_log() {
        let mut grid = vec![1e-3, 1e3];
        default_generator(Interp::LogLog)
            .generate_in_place(&mut grid, |x| x.powf(-2.5))
            .unwrap();
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn refined_grid_meets_tolerance() {
        let generator = default_generator(Interp::LinLin);
        let mut grid = vec![0.0, std::f64::consts::PI];
        let values = generator
            .generate_and_evaluate_in_place(&mut grid, f64::sin)
            .unwrap();

        assert_eq!(grid.len(), values.len());
        assert!(grid.windows(2).all(|w| w[0] < w[1]));

        // every midpoint is reproduced to the tolerance
        for i in 0..grid.len() - 1 {
            let mid = 0.5 * (grid[i] + grid[i + 1]);
            let estimate = 0.5 * (values[i] + values[i + 1]);
            assert!(relative_error(mid.sin(), estimate) <= 1e-3);
        }
    }

    #[test]
    fn dirty_convergence_is_an_error_when_requested() {
        let mut generator = GridGenerator::new(Interp::LinLin, 1e-6, 1e-13, 0.1).unwrap();
        generator.fail_on_dirty_convergence();

        let mut grid = vec![0.0, 1.0];
        let result = generator.generate_in_place(&mut grid, |x| x.powi(8));
        assert!(matches!(result, Err(Error::DirtyConvergence { .. })));
    }

    #[test]
    fn dirty_convergence_is_a_warning_by_default() {
        let generator = GridGenerator::new(Interp::LinLin, 1e-6, 1e-13, 0.1).unwrap();
        let mut grid = vec![0.0, 1.0];
        assert!(generator.generate_in_place(&mut grid, |x| x.powi(8)).is_ok());
    }

    #[test]
    fn undefined_values_are_rejected() {
        let mut grid = vec![-1.0, 1.0];
        let result = default_generator(Interp::LinLin).generate_in_place(&mut grid, |x| x.ln());
        assert!(matches!(result, Err(Error::UndefinedFunctionValue(_))));
    }
}
