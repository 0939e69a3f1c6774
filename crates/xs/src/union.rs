// crate modules
use crate::constants::{BINDING_ENERGY_OFFSET, PAIR_PRODUCTION_THRESHOLD, TRIPLET_PRODUCTION_THRESHOLD};
use crate::error::{Error, Result};

// eprtools modules
use eprtools_utils::SliceExt;

// external crates
use itertools::Itertools;

/// Merge sorted source grids into a single union grid
///
/// Without nudging, equal values collapse to a single point. With nudging,
/// a value that is already present is multiplied by the nudge factor until
/// it is distinct, so every input contributes its own point.
///
/// ```rust
/// # use eprtools_xs::build_union;
/// let a = [1.0, 2.0, 4.0];
/// let b = [2.0, 3.0];
///
/// let union = build_union(&[&a, &b], false, 1.0001).unwrap();
/// assert_eq!(union, vec![1.0, 2.0, 3.0, 4.0]);
///
/// let nudged = build_union(&[&a, &b], true, 1.0001).unwrap();
/// assert_eq!(nudged, vec![1.0, 2.0, 2.0002, 3.0, 4.0]);
/// ```
pub fn build_union(source_grids: &[&[f64]], nudge_enabled: bool, nudge_factor: f64) -> Result<Vec<f64>> {
    let mut builder = UnionGridBuilder::new(nudge_factor)?;

    if nudge_enabled {
        for grid in source_grids {
            for value in grid.iter() {
                builder.add_nudged(*value)?;
            }
        }
    } else {
        builder.add_grid(source_grids.iter().map(|g| g.iter().copied()).kmerge());
    }

    builder.build()
}

/// Incremental construction of a strictly ascending union grid
///
/// Points are kept sorted and unique at all times. The builder also knows
/// how to seed a grid with the special points of an atom:
///
/// - binding energies, with a point just below and just above each edge
/// - pair and triplet production thresholds
///
/// ```rust
/// # use eprtools_xs::UnionGridBuilder;
/// let mut builder = UnionGridBuilder::new(1.0001).unwrap();
/// builder.add(1e-3);
/// builder.add(20.0);
/// builder.add_binding_energies(&[1.36e-5, 0.01], 1e-3, 20.0);
///
/// let grid = builder.build().unwrap();
/// assert_eq!(grid.len(), 5);
/// assert_eq!(grid[2], 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct UnionGridBuilder {
    points: Vec<f64>,
    nudge_factor: f64,
    max_nudges: usize,
}

impl UnionGridBuilder {
    /// Empty builder with a relative nudge factor
    pub fn new(nudge_factor: f64) -> Result<Self> {
        if !(nudge_factor >= 1.0 && nudge_factor.is_finite()) {
            return Err(Error::InvalidNudgeFactor(nudge_factor));
        }

        Ok(Self {
            points: Vec::new(),
            nudge_factor,
            max_nudges: 100,
        })
    }

    /// Change the number of nudges tried before giving up
    pub fn with_max_nudges(mut self, max_nudges: usize) -> Self {
        self.max_nudges = max_nudges;
        self
    }

    /// Nudge factor applied to coincident values and threshold points
    pub fn nudge_factor(&self) -> f64 {
        self.nudge_factor
    }

    /// Current points
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Add a value, collapsing it onto an existing equal point
    pub fn add(&mut self, value: f64) -> bool {
        match self.search(value) {
            Ok(_) => false,
            Err(i) => {
                self.points.insert(i, value);
                true
            }
        }
    }

    /// Add a value, nudging it upwards until it is distinct
    pub fn add_nudged(&mut self, value: f64) -> Result<f64> {
        let mut candidate = value;

        for _ in 0..=self.max_nudges {
            if let Err(i) = self.search(candidate) {
                self.points.insert(i, candidate);
                return Ok(candidate);
            }
            candidate *= self.nudge_factor;
        }

        Err(Error::NudgeLimitExceeded {
            value,
            nudges: self.max_nudges,
        })
    }

    /// Add every value of a grid without nudging
    pub fn add_grid<I: IntoIterator<Item = f64>>(&mut self, grid: I) {
        for value in grid {
            self.add(value);
        }
    }

    /// Add the points either side of each binding energy
    ///
    /// For a binding energy B this adds B - 1e-9, B, and B times the nudge
    /// factor, each only if it lies strictly within (min, max).
    pub fn add_binding_energies(&mut self, binding_energies: &[f64], min: f64, max: f64) {
        for energy in binding_energies {
            self.add_inside(energy - BINDING_ENERGY_OFFSET, min, max);
            self.add_inside(*energy, min, max);
            self.add_inside(energy * self.nudge_factor, min, max);
        }
    }

    /// Add the pair and triplet production thresholds and their nudged values
    pub fn add_photon_thresholds(&mut self, min: f64, max: f64) {
        for threshold in [PAIR_PRODUCTION_THRESHOLD, TRIPLET_PRODUCTION_THRESHOLD] {
            self.add_inside(threshold, min, max);
            self.add_inside(threshold * self.nudge_factor, min, max);
        }
    }

    /// Merge a reaction grid and drop everything outside of [min, max]
    ///
    /// ```rust
    /// # use eprtools_xs::UnionGridBuilder;
    /// let mut builder = UnionGridBuilder::new(1.0001).unwrap();
    /// builder.add_grid([1.0, 10.0]);
    /// builder.merge_clipped(&[0.1, 5.0, 5.0, 50.0], 1.0, 10.0);
    /// assert_eq!(builder.points(), &[1.0, 5.0, 10.0]);
    /// ```
    pub fn merge_clipped(&mut self, grid: &[f64], min: f64, max: f64) {
        self.add_grid(grid.iter().copied());
        self.points.retain(|p| *p >= min && *p <= max);
    }

    /// Finish the grid, checking it is usable
    pub fn build(self) -> Result<Vec<f64>> {
        if self.points.len() < 2 {
            return Err(Error::DegenerateGrid(self.points.len()));
        }
        self.points.check_strictly_ascending()?;
        Ok(self.points)
    }

    fn add_inside(&mut self, value: f64, min: f64, max: f64) {
        if value > min && value < max {
            self.add(value);
        }
    }

    fn search(&self, value: f64) -> std::result::Result<usize, usize> {
        self.points.binary_search_by(|p| p.total_cmp(&value))
    }
}
