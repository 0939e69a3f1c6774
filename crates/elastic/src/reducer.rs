// crate modules
use crate::error::{Error, Result};
use crate::radau::RadauQuadrature;
use crate::sample::{from_tail_interval, ElasticSample};
use crate::MAX_CUTOFF_ANGLE_COSINE;

// eprtools modules
use eprtools_numeric::GaussKronrod;
use eprtools_utils::ValueExt;

// external crates
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Discrete angles replacing the elastic tail at one incident energy
///
/// Angles are ascending and lie in (cutoff, 1], the weights sum to one and
/// the reduction factor lies in (0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentPreservingRepresentation {
    /// Incident energy (MeV)
    pub energy: f64,
    /// Discrete scattering angle cosines
    pub angles: Vec<f64>,
    /// Probability of each discrete angle
    pub weights: Vec<f64>,
    /// Factor applied to the tail cross section
    pub cross_section_reduction: f64,
}

/// Reduces elastic tails to moment preserving discrete angles
///
/// For `N` discrete angles, Legendre moments `0..=2N` of the tail above the
/// cutoff angle cosine are matched by a Radau quadrature with `N + 1` nodes.
/// The node fixed at μ = 1 is dropped and its weight is removed from the
/// cross section through the reduction factor.
///
/// The quadrature is built on the tail interval [cutoff, 1] mapped onto
/// [-1, 1]. The mapping is affine, so every polynomial moment in μ up to
/// order 2N is matched as well.
///
/// ```rust
/// # use eprtools_elastic::{ElasticMomentReducer, ElasticSample};
/// # use eprtools_numeric::{Interp, Tabular};
/// let pdf = Tabular::new(vec![-1.0, 0.9, 0.999999], vec![0.1, 1.0, 50.0], Interp::LinLin).unwrap();
/// let sample = ElasticSample::new(1e-2, pdf, 1e5, 2e3).unwrap();
///
/// let reducer = ElasticMomentReducer::new(0.9, 2).unwrap();
/// let discrete = reducer.reduce(&sample).unwrap();
///
/// assert_eq!(discrete.angles.len(), 2);
/// assert!((discrete.weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// assert!(discrete.cross_section_reduction > 0.0 && discrete.cross_section_reduction <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct ElasticMomentReducer {
    cutoff_angle_cosine: f64,
    number_of_angles: usize,
    integrator: GaussKronrod,
    weight_tolerance: f64,
}

impl ElasticMomentReducer {
    /// Reducer for a cutoff angle cosine and number of discrete angles
    pub fn new(cutoff_angle_cosine: f64, number_of_angles: usize) -> Result<Self> {
        if !(-1.0..=1.0).contains(&cutoff_angle_cosine) {
            return Err(Error::InvalidCutoffAngleCosine(cutoff_angle_cosine));
        }

        Ok(Self {
            cutoff_angle_cosine,
            number_of_angles,
            integrator: GaussKronrod::new(1e-13).with_absolute_tolerance(1e-15),
            weight_tolerance: 1e-8,
        })
    }

    /// Cutoff angle cosine
    pub fn cutoff_angle_cosine(&self) -> f64 {
        self.cutoff_angle_cosine
    }

    /// Number of discrete angles
    pub fn number_of_angles(&self) -> usize {
        self.number_of_angles
    }

    /// Is there anything to reduce
    ///
    /// A cutoff above 0.999999 leaves only the Rutherford peak, and zero
    /// angles means no discrete representation was asked for.
    pub fn is_enabled(&self) -> bool {
        self.cutoff_angle_cosine <= MAX_CUTOFF_ANGLE_COSINE && self.number_of_angles >= 1
    }

    /// Reduce the tail of one sample
    ///
    /// With a single angle a failed quadrature falls back to one angle at the
    /// mean scattering cosine of the tail.
    pub fn reduce(&self, sample: &ElasticSample) -> Result<MomentPreservingRepresentation> {
        match self.reduce_radau(sample) {
            Ok(representation) => Ok(representation),
            Err(e) if self.number_of_angles == 1 => {
                warn!(
                    "Radau reduction failed at {} MeV ({e}), using the mean scattering cosine",
                    sample.energy().sci(5, 2)
                );
                self.reduce_mean_cosine(sample)
            }
            Err(e) => Err(e),
        }
    }

    /// Reduce every sample in parallel, keeping their order
    pub fn reduce_all(&self, samples: &[ElasticSample]) -> Vec<Result<MomentPreservingRepresentation>> {
        samples.par_iter().map(|sample| self.reduce(sample)).collect()
    }
}

/// Reduction internals
impl ElasticMomentReducer {
    fn reduce_radau(&self, sample: &ElasticSample) -> Result<MomentPreservingRepresentation> {
        let energy = sample.energy();
        let n = self.number_of_angles;

        let moments = sample
            .tail_interval_legendre_moments(self.cutoff_angle_cosine, 2 * n, &self.integrator)
            .map_err(|e| at_energy(e, energy))?;

        let radau = RadauQuadrature::from_legendre_moments(&moments, n).map_err(|e| at_energy(e, energy))?;

        if radau.nodes().len() < n {
            debug!(
                "Only {} of {} discrete angles at {} MeV",
                radau.nodes().len(),
                n,
                energy.sci(5, 2)
            );
        }

        if radau.endpoint_weight() < 0.0 {
            warn!(
                "Non-physical weight {} at μ = 1 for {} MeV",
                radau.endpoint_weight().sci(5, 2),
                energy.sci(5, 2)
            );
        }

        let reduction: f64 = radau.weights().iter().sum();

        if !(reduction > 0.0) || reduction > 1.0 + self.weight_tolerance {
            return Err(failure(energy, format!("reduction factor {reduction} outside (0, 1]")));
        }

        let weights = radau.weights().iter().map(|w| w / reduction).collect::<Vec<f64>>();
        let representation = MomentPreservingRepresentation {
            energy,
            angles: radau
                .nodes()
                .iter()
                .map(|t| from_tail_interval(self.cutoff_angle_cosine, *t))
                .collect(),
            weights,
            cross_section_reduction: reduction.min(1.0),
        };

        self.validate(representation)
    }

    fn reduce_mean_cosine(&self, sample: &ElasticSample) -> Result<MomentPreservingRepresentation> {
        let energy = sample.energy();
        let mean = sample
            .tail_mean_cosine(self.cutoff_angle_cosine, &self.integrator)
            .map_err(|e| at_energy(e, energy))?;

        self.validate(MomentPreservingRepresentation {
            energy,
            angles: vec![mean],
            weights: vec![1.0],
            cross_section_reduction: 1.0,
        })
    }

    fn validate(&self, representation: MomentPreservingRepresentation) -> Result<MomentPreservingRepresentation> {
        let energy = representation.energy;

        if representation.angles.is_empty() {
            return Err(failure(energy, "no discrete angles".to_string()));
        }

        if let Some(angle) = representation
            .angles
            .iter()
            .find(|a| !(**a > self.cutoff_angle_cosine && **a <= 1.0))
        {
            return Err(failure(
                energy,
                format!("angle {angle} outside ({}, 1]", self.cutoff_angle_cosine),
            ));
        }

        if let Some(weight) = representation.weights.iter().find(|w| !(**w >= 0.0)) {
            return Err(failure(energy, format!("negative weight {weight}")));
        }

        let sum: f64 = representation.weights.iter().sum();
        if (sum - 1.0).abs() > self.weight_tolerance {
            return Err(failure(energy, format!("weights sum to {sum}")));
        }

        Ok(representation)
    }
}

fn failure(energy: f64, reason: String) -> Error {
    Error::MomentReduction { energy, reason }
}

/// Attach the incident energy to errors raised without one
fn at_energy(error: Error, energy: f64) -> Error {
    match error {
        Error::MomentReduction { reason, .. } => Error::MomentReduction { energy, reason },
        Error::Numeric(e) => Error::MomentReduction {
            energy,
            reason: e.to_string(),
        },
        other => other,
    }
}

#[cfg(test)]
mod reducer_tests {
    use super::*;
    use eprtools_numeric::{Interp, Tabular};

    fn peaked_sample(energy: f64) -> ElasticSample {
        let pdf = Tabular::new(
            vec![-1.0, 0.0, 0.5, 0.9, 0.99, 0.999999],
            vec![0.01, 0.05, 0.2, 1.0, 10.0, 200.0],
            Interp::LinLin,
        )
        .unwrap();
        ElasticSample::new(energy, pdf, 1e6, 3e4).unwrap()
    }

    #[test]
    fn invalid_cutoff() {
        assert!(ElasticMomentReducer::new(1.5, 2).is_err());
        assert!(ElasticMomentReducer::new(-1.01, 2).is_err());
    }

    #[test]
    fn disabled_reducer() {
        assert!(!ElasticMomentReducer::new(1.0, 2).unwrap().is_enabled());
        assert!(!ElasticMomentReducer::new(0.9, 0).unwrap().is_enabled());
        assert!(ElasticMomentReducer::new(0.9, 1).unwrap().is_enabled());
    }

    #[test]
    fn angles_are_above_cutoff() {
        let reducer = ElasticMomentReducer::new(0.5, 3).unwrap();
        let discrete = reducer.reduce(&peaked_sample(1.0)).unwrap();

        assert!(discrete.angles.iter().all(|a| *a > 0.5 && *a <= 1.0));
        assert!(discrete.angles.windows(2).all(|w| w[0] < w[1]));
        assert!(discrete.weights.iter().all(|w| *w >= 0.0));
    }

    #[test]
    fn single_angle() {
        let reducer = ElasticMomentReducer::new(0.9, 1).unwrap();
        let discrete = reducer.reduce(&peaked_sample(1.0)).unwrap();
        assert_eq!(discrete.angles.len(), 1);
        assert_eq!(discrete.weights, vec![1.0]);
    }

    #[test]
    fn parallel_keeps_order() {
        let reducer = ElasticMomentReducer::new(0.9, 2).unwrap();
        let samples = [1e-3, 1e-2, 1e-1, 1.0].map(peaked_sample);

        let results = reducer.reduce_all(&samples);
        let energies = results
            .into_iter()
            .map(|r| r.unwrap().energy)
            .collect::<Vec<f64>>();
        assert_eq!(energies, vec![1e-3, 1e-2, 1e-1, 1.0]);
    }

    #[test]
    fn nothing_above_cutoff() {
        let pdf = Tabular::new(vec![-1.0, 0.0, 0.5], vec![1.0, 1.0, 0.0], Interp::LinLin).unwrap();
        let sample = ElasticSample::new(1.0, pdf, 1.0, 0.0).unwrap();

        let reducer = ElasticMomentReducer::new(0.9, 2).unwrap();
        assert!(matches!(
            reducer.reduce(&sample),
            Err(Error::MomentReduction { energy, .. }) if energy == 1.0
        ));
    }
}
