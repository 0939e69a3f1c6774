// crate modules
use crate::error::{Error, Result};
use crate::legendre::legendre;
use crate::{DELTA_PEAK, PEAK_ANGLE_COSINE};

// eprtools modules
use eprtools_numeric::{GaussKronrod, Interp, Tabular};

/// Convert an ENDL angular table to angle cosines
///
/// ENDL tabulates against `1 - μ` in ascending order, so the table is
/// reversed to give ascending μ with each pdf value kept on its angle.
///
/// ```rust
/// # use eprtools_elastic::angles_from_delta_mu;
/// let table = angles_from_delta_mu(&[0.5, 1.0, 2.0], &[3.0, 2.0, 1.0]).unwrap();
/// assert_eq!(table.x(), &[-1.0, 0.0, 0.5]);
/// assert_eq!(table.y(), &[1.0, 2.0, 3.0]);
/// ```
pub fn angles_from_delta_mu(delta_mu: &[f64], pdf: &[f64]) -> Result<Tabular> {
    let mu = delta_mu.iter().rev().map(|d| 1.0 - d).collect();
    let pdf = pdf.iter().rev().copied().collect();
    Ok(Tabular::new(mu, pdf, Interp::LinLin)?)
}

/// Cumulative distribution of a lin-lin pdf at an angle cosine
///
/// ```rust
/// # use eprtools_elastic::cutoff_cdf;
/// # use eprtools_numeric::{Interp, Tabular};
/// let pdf = Tabular::new(vec![-1.0, 1.0], vec![0.5, 0.5], Interp::LinLin).unwrap();
/// assert_eq!(cutoff_cdf(&pdf, 0.0), 0.5);
/// ```
pub fn cutoff_cdf(distribution: &Tabular, angle_cosine: f64) -> f64 {
    let norm = distribution.integral();
    if norm > 0.0 {
        distribution.integral_to(angle_cosine) / norm
    } else {
        0.0
    }
}

/// Map an angle cosine on [cutoff, 1] onto [-1, 1]
///
/// ```rust
/// # use eprtools_elastic::{from_tail_interval, to_tail_interval};
/// assert_eq!(to_tail_interval(0.9, 1.0), 1.0);
/// assert_eq!(to_tail_interval(0.5, 0.5), -1.0);
/// assert!((from_tail_interval(0.9, 0.0) - 0.95).abs() < 1e-15);
/// ```
pub fn to_tail_interval(cutoff_angle_cosine: f64, angle_cosine: f64) -> f64 {
    (2.0 * angle_cosine - 1.0 - cutoff_angle_cosine) / (1.0 - cutoff_angle_cosine)
}

/// Inverse of [to_tail_interval]
pub fn from_tail_interval(cutoff_angle_cosine: f64, t: f64) -> f64 {
    cutoff_angle_cosine + 0.5 * (1.0 - cutoff_angle_cosine) * (t + 1.0)
}

/// Elastic scattering at one incident energy
///
/// Holds the normalised cutoff angular distribution with the cutoff and
/// screened Rutherford cross sections that weight it. Above the cutoff angle
/// cosine the two combine into the continuous "tail" that is reduced to
/// discrete angles.
#[derive(Debug, Clone)]
pub struct ElasticSample {
    energy: f64,
    distribution: Tabular,
    cutoff_cross_section: f64,
    rutherford_cross_section: f64,
}

/// Shape of the screened Rutherford peak on [μ_peak, 1]
#[derive(Debug, Clone, Copy)]
enum Peak {
    None,
    /// A / (η + 1 - μ)² matched to the cutoff pdf at μ_peak
    Screened { amplitude: f64, eta: f64 },
    /// Constant density when the peak cannot be matched
    Flat { density: f64 },
}

impl ElasticSample {
    /// Build a sample, normalising the cutoff distribution
    pub fn new(
        energy: f64,
        distribution: Tabular,
        cutoff_cross_section: f64,
        rutherford_cross_section: f64,
    ) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSample {
            energy,
            reason: reason.to_string(),
        };

        if !(energy > 0.0) {
            return Err(invalid("energy must be positive"));
        }

        if !(cutoff_cross_section >= 0.0) || !(rutherford_cross_section >= 0.0) {
            return Err(invalid("cross sections must be non-negative"));
        }

        if distribution.lower_bound() < -1.0 || distribution.upper_bound() > 1.0 {
            return Err(invalid("angle cosines must lie in [-1, 1]"));
        }

        if distribution.y().iter().any(|p| *p < 0.0) {
            return Err(invalid("negative pdf value"));
        }

        let norm = distribution.integral();
        if !(norm > 0.0) {
            return Err(invalid("pdf does not integrate to a positive value"));
        }

        let distribution = Tabular::new(
            distribution.x().to_vec(),
            distribution.y().iter().map(|p| p / norm).collect(),
            Interp::LinLin,
        )?;

        Ok(Self {
            energy,
            distribution,
            cutoff_cross_section,
            rutherford_cross_section,
        })
    }

    /// Incident energy (MeV)
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Normalised cutoff angular distribution
    pub fn distribution(&self) -> &Tabular {
        &self.distribution
    }

    /// Cutoff elastic cross section (b)
    pub fn cutoff_cross_section(&self) -> f64 {
        self.cutoff_cross_section
    }

    /// Screened Rutherford elastic cross section (b)
    pub fn rutherford_cross_section(&self) -> f64 {
        self.rutherford_cross_section
    }

    /// Cross section of everything scattered above the cutoff angle cosine
    pub fn tail_cross_section(&self, cutoff_angle_cosine: f64) -> f64 {
        let fraction = 1.0 - cutoff_cdf(&self.distribution, cutoff_angle_cosine.min(PEAK_ANGLE_COSINE));
        self.cutoff_cross_section * fraction + self.rutherford_cross_section
    }

    /// Legendre moments of orders `0..=max_order` of the normalised tail
    ///
    /// The zeroth moment is one by construction.
    pub fn tail_legendre_moments(
        &self,
        cutoff_angle_cosine: f64,
        max_order: usize,
        integrator: &GaussKronrod,
    ) -> Result<Vec<f64>> {
        self.tail_moments(cutoff_angle_cosine, max_order, integrator, |mu| mu)
    }

    /// Legendre moments of the normalised tail with [cutoff, 1] mapped onto [-1, 1]
    ///
    /// See [to_tail_interval] for the mapping. These stay well conditioned
    /// when the cutoff is close to one.
    pub fn tail_interval_legendre_moments(
        &self,
        cutoff_angle_cosine: f64,
        max_order: usize,
        integrator: &GaussKronrod,
    ) -> Result<Vec<f64>> {
        self.tail_moments(cutoff_angle_cosine, max_order, integrator, |mu| {
            to_tail_interval(cutoff_angle_cosine, mu)
        })
    }

    /// Mean scattering angle cosine of the tail
    pub fn tail_mean_cosine(&self, cutoff_angle_cosine: f64, integrator: &GaussKronrod) -> Result<f64> {
        Ok(self.tail_legendre_moments(cutoff_angle_cosine, 1, integrator)?[1])
    }

    /// Moments of `P_l(variable(μ))` over the normalised tail
    fn tail_moments<V: Fn(f64) -> f64>(
        &self,
        cutoff_angle_cosine: f64,
        max_order: usize,
        integrator: &GaussKronrod,
        variable: V,
    ) -> Result<Vec<f64>> {
        let total = self.tail_cross_section(cutoff_angle_cosine);
        if !(total > 0.0) {
            return Err(Error::MomentReduction {
                energy: self.energy,
                reason: "no scattering above the cutoff angle cosine".to_string(),
            });
        }

        let mut moments = vec![0.0; max_order + 1];

        // tabulated cutoff distribution, one segment at a time
        let x = self.distribution.x();
        for i in 0..x.len() - 1 {
            let lower = x[i].max(cutoff_angle_cosine);
            let upper = x[i + 1].min(PEAK_ANGLE_COSINE);
            if upper <= lower {
                continue;
            }

            for (l, moment) in moments.iter_mut().enumerate() {
                let value = integrator.integrate(
                    |mu| legendre(l, variable(mu)) * self.distribution.evaluate(mu),
                    lower,
                    upper,
                )?;
                *moment += self.cutoff_cross_section * value;
            }
        }

        // screened Rutherford peak
        match self.peak() {
            Peak::None => (),
            Peak::Screened { amplitude, eta } => {
                // with t = 1 / (η + 1 - μ) the peak is flat in t
                let t_lower = 1.0 / (eta + DELTA_PEAK);
                let t_upper = 1.0 / eta;
                for (l, moment) in moments.iter_mut().enumerate() {
                    let value = integrator.integrate(
                        |t| legendre(l, variable(1.0 + eta - 1.0 / t)),
                        t_lower,
                        t_upper,
                    )?;
                    *moment += amplitude * value;
                }
            }
            Peak::Flat { density } => {
                for (l, moment) in moments.iter_mut().enumerate() {
                    let value = integrator.integrate(
                        |mu| legendre(l, variable(mu)),
                        PEAK_ANGLE_COSINE.max(cutoff_angle_cosine),
                        1.0,
                    )?;
                    *moment += density * value;
                }
            }
        }

        Ok(moments.into_iter().map(|m| m / total).collect())
    }

    fn peak(&self) -> Peak {
        let sigma_r = self.rutherford_cross_section;
        if sigma_r <= 0.0 {
            return Peak::None;
        }

        // continuity with the cutoff pdf at μ_peak fixes η
        let matched = self.cutoff_cross_section * self.distribution.evaluate(PEAK_ANGLE_COSINE);
        let ratio = sigma_r / matched;

        if matched > 0.0 && ratio.is_finite() && ratio > DELTA_PEAK {
            let eta = DELTA_PEAK * DELTA_PEAK / (ratio - DELTA_PEAK);
            let amplitude = sigma_r * eta * (eta + DELTA_PEAK) / DELTA_PEAK;
            Peak::Screened { amplitude, eta }
        } else {
            Peak::Flat {
                density: sigma_r / DELTA_PEAK,
            }
        }
    }
}
