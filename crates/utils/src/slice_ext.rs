use crate::error::{Error, Result};

/// Extends functionality for slices of float arrays
pub trait SliceExt<T> {
    /// Find the minimum value in float arrays
    ///
    /// Only provides the minimum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use eprtools_utils::SliceExt;
    /// # use eprtools_utils::Error;
    /// // Successful cases
    /// assert_eq!([1.1, 0.5, 2.2].try_min(), Ok(0.5));
    /// assert_eq!([1.1, f64::MIN, 2.2].try_min(), Ok(f64::MIN));
    ///
    /// // Error cases
    /// assert_eq!([1.1, f64::NAN, 2.2].try_min(), Err(Error::UndefinedGridValue));
    /// assert_eq!(Vec::<f64>::new().try_min(), Err(Error::EmptyGrid));
    /// ```
    ///
    /// The float primitives do not implement `Ord` due to `NaN` being
    /// incomparable, so this uses `total_cmp` on the validated values.
    fn try_min(&self) -> Result<T>;

    /// Find the maximum value in float arrays
    ///
    /// ```rust
    /// # use eprtools_utils::SliceExt;
    /// # use eprtools_utils::Error;
    /// assert_eq!([1.1, 0.5, 2.2].try_max(), Ok(2.2));
    /// assert_eq!([1.1, f64::INFINITY].try_max(), Err(Error::UndefinedGridValue));
    /// ```
    fn try_max(&self) -> Result<T>;

    /// Find index bin containing 'value', where bins are low <= value < high
    ///
    /// This is the lookup used for interpolation on a tabulated grid. A value
    /// on a bin edge returns the bin above, and a value equal to the highest
    /// bound is considered part of the last bin.
    ///
    /// ```text
    ///     0.0 <= bin 0 < 0.1
    ///     0.1 <= bin 1 < 1.0
    ///     1.0 <= bin 2 <= 20.0
    /// ```
    ///
    /// The search is a binary search, so the slice must be sorted.
    ///
    /// ```rust
    /// # use eprtools_utils::SliceExt;
    /// let grid = vec![0.0, 0.1, 1.0, 20.0];
    ///
    /// assert_eq!(grid.find_interval(0.0 ), Ok(0));
    /// assert_eq!(grid.find_interval(0.5 ), Ok(1));
    /// assert_eq!(grid.find_interval(1.0 ), Ok(2));
    /// assert_eq!(grid.find_interval(20.0), Ok(2));
    ///
    /// // Values outside the grid are an error case
    /// assert!(grid.find_interval(-1.0).is_err());
    /// assert!(grid.find_interval(21.0).is_err());
    /// ```
    fn find_interval(&self, value: T) -> Result<usize>;

    /// Index of the first value strictly greater than 'value'
    ///
    /// Returns the length of the slice if every value is less than or equal
    /// to the one requested.
    ///
    /// ```rust
    /// # use eprtools_utils::SliceExt;
    /// let grid = vec![1.0, 2.0, 3.0];
    /// assert_eq!(grid.upper_bound_index(0.5), 0);
    /// assert_eq!(grid.upper_bound_index(2.0), 2);
    /// assert_eq!(grid.upper_bound_index(9.0), 3);
    /// ```
    fn upper_bound_index(&self, value: T) -> usize;

    /// Check that every value is finite and strictly greater than the last
    ///
    /// ```rust
    /// # use eprtools_utils::SliceExt;
    /// # use eprtools_utils::Error;
    /// assert!([1.0, 2.0, 3.0].check_strictly_ascending().is_ok());
    /// assert_eq!(
    ///     [1.0, 2.0, 2.0].check_strictly_ascending(),
    ///     Err(Error::NotStrictlyAscending { index: 2 })
    /// );
    /// ```
    fn check_strictly_ascending(&self) -> Result<()>;
}

impl SliceExt<f64> for [f64] {
    fn try_min(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::UndefinedGridValue);
        };

        if let Some(v) = self.iter().min_by(|a, b| a.total_cmp(b)).copied() {
            Ok(v)
        } else {
            Err(Error::EmptyGrid)
        }
    }

    fn try_max(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::UndefinedGridValue);
        };

        if let Some(v) = self.iter().max_by(|a, b| a.total_cmp(b)).copied() {
            Ok(v)
        } else {
            Err(Error::EmptyGrid)
        }
    }

    fn find_interval(&self, value: f64) -> Result<usize> {
        // make sure there are bin edges to check against
        let n = self.len();
        if n < 2 {
            return Err(Error::GridTooShort {
                length: n,
                minimum_required: 2,
            });
        }

        let lower_bound = self[0];
        let upper_bound = self[n - 1];

        // is the value relevant?
        if value < lower_bound || value > upper_bound || value.is_nan() {
            return Err(Error::EnergyOutsideGrid {
                value,
                lower_bound,
                upper_bound,
            });
        }

        // special case for being on the upper edge
        if value == upper_bound {
            return Ok(n - 2);
        }

        // first index above the value is the upper edge of the bin
        Ok(self.upper_bound_index(value) - 1)
    }

    fn upper_bound_index(&self, value: f64) -> usize {
        self.partition_point(|x| *x <= value)
    }

    fn check_strictly_ascending(&self) -> Result<()> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::UndefinedGridValue);
        }

        match self.windows(2).position(|w| w[1] <= w[0]) {
            Some(i) => Err(Error::NotStrictlyAscending { index: i + 1 }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod slice_tests {
    use super::*;

    #[test]
    fn interval_single_bin() {
        let grid = [1.0, 2.0];
        assert_eq!(grid.find_interval(1.0), Ok(0));
        assert_eq!(grid.find_interval(1.5), Ok(0));
        assert_eq!(grid.find_interval(2.0), Ok(0));
    }

    #[test]
    fn interval_too_short() {
        assert_eq!(
            [1.0].find_interval(1.0),
            Err(Error::GridTooShort {
                length: 1,
                minimum_required: 2
            })
        );
    }

    #[test]
    fn interval_nan() {
        assert!([1.0, 2.0].find_interval(f64::NAN).is_err());
    }

    #[test]
    fn ascending_empty_and_single() {
        assert!(Vec::<f64>::new().check_strictly_ascending().is_ok());
        assert!([4.0].check_strictly_ascending().is_ok());
    }

    #[test]
    fn ascending_undefined() {
        assert_eq!(
            [1.0, f64::NAN].check_strictly_ascending(),
            Err(Error::UndefinedGridValue)
        );
    }
}
