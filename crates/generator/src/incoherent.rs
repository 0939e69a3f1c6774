//! Impulse approximation subshell incoherent cross sections

// crate modules
use crate::error::Result;

// eprtools modules
use eprtools_numeric::{GaussKronrod, Interp, Tabular};
use eprtools_utils::ValueExt;
use eprtools_xs::constants::{BARNS_PER_SQUARE_CM, CLASSICAL_ELECTRON_RADIUS, ELECTRON_REST_MASS_ENERGY};

// standard library
use std::f64::consts::PI;

// external crates
use log::warn;

/// Klein-Nishina differential cross section dσ/dμ (b)
pub(crate) fn klein_nishina(energy: f64, angle_cosine: f64) -> f64 {
    let ratio = 1.0 / (1.0 + (energy / ELECTRON_REST_MASS_ENERGY) * (1.0 - angle_cosine));

    PI * CLASSICAL_ELECTRON_RADIUS.powi(2)
        * ratio.powi(2)
        * (ratio + 1.0 / ratio - 1.0 + angle_cosine.powi(2))
        * BARNS_PER_SQUARE_CM
}

/// Largest projected momentum (mₑc) of an electron that can be ejected
pub(crate) fn max_electron_momentum(energy: f64, binding_energy: f64, angle_cosine: f64) -> f64 {
    let transfer = energy * (energy - binding_energy) * (1.0 - angle_cosine);

    (transfer - ELECTRON_REST_MASS_ENERGY * binding_energy)
        / (ELECTRON_REST_MASS_ENERGY * (2.0 * transfer + binding_energy.powi(2)).sqrt())
}

/// Incoherent scattering off one subshell in the impulse approximation
///
/// The Klein-Nishina cross section is weighted by the occupation number at
/// the largest momentum that still lets the electron escape, then integrated
/// over the scattering angle cosine.
#[derive(Debug, Clone)]
pub(crate) struct ImpulseApproxIncoherent {
    subshell: u32,
    binding_energy: f64,
    occupancy: f64,
    occupation_number: Tabular,
    integrator: GaussKronrod,
}

impl ImpulseApproxIncoherent {
    pub fn new(
        subshell: u32,
        binding_energy: f64,
        occupancy: f64,
        momentum_grid: &[f64],
        occupation_number: &[f64],
        tolerance: f64,
    ) -> Result<Self> {
        Ok(Self {
            subshell,
            binding_energy,
            occupancy,
            occupation_number: Tabular::new(momentum_grid.to_vec(), occupation_number.to_vec(), Interp::LinLin)?,
            integrator: GaussKronrod::new(tolerance).with_absolute_tolerance(1e-20),
        })
    }

    /// Binding energy of the subshell (MeV)
    pub fn binding_energy(&self) -> f64 {
        self.binding_energy
    }

    fn occupation_number_at(&self, momentum: f64) -> f64 {
        if momentum <= -1.0 {
            0.0
        } else if momentum >= 1.0 {
            1.0
        } else {
            self.occupation_number.evaluate(momentum)
        }
    }

    /// Cross section (b) at an incident photon energy
    pub fn evaluate(&self, energy: f64) -> Result<f64> {
        if energy <= self.binding_energy {
            return Ok(0.0);
        }

        let integral = self.integrator.integrate(
            |mu| {
                klein_nishina(energy, mu)
                    * self.occupation_number_at(max_electron_momentum(energy, self.binding_energy, mu))
            },
            -1.0,
            1.0,
        )?;

        Ok(self.occupancy * integral)
    }

    /// Cross section for grid refinement, undefined where integration fails
    pub fn evaluate_or_nan(&self, energy: f64) -> f64 {
        self.evaluate(energy).unwrap_or_else(|e| {
            warn!(
                "Subshell {} incoherent integral failed at {} MeV: {e}",
                self.subshell,
                energy.sci(5, 2)
            );
            f64::NAN
        })
    }
}

#[cfg(test)]
mod incoherent_tests {
    use super::*;

    /// Total Klein-Nishina cross section per electron (b)
    fn klein_nishina_total(energy: f64) -> f64 {
        let k = energy / ELECTRON_REST_MASS_ENERGY;
        let log_term = (1.0 + 2.0 * k).ln();

        2.0 * PI
            * CLASSICAL_ELECTRON_RADIUS.powi(2)
            * ((1.0 + k) / k.powi(2) * (2.0 * (1.0 + k) / (1.0 + 2.0 * k) - log_term / k)
                + log_term / (2.0 * k)
                - (1.0 + 3.0 * k) / (1.0 + 2.0 * k).powi(2))
            * BARNS_PER_SQUARE_CM
    }

    fn free_electrons(occupancy: f64) -> ImpulseApproxIncoherent {
        ImpulseApproxIncoherent::new(
            1,
            1e-5,
            occupancy,
            &[-1.0, -1e-3, 1e-3, 1.0],
            &[0.0, 0.0, 1.0, 1.0],
            1e-6,
        )
        .unwrap()
    }

    #[test]
    fn thomson_limit() {
        // soft forward scattering reduces to the Thomson limit
        let expected = 2.0 * PI * CLASSICAL_ELECTRON_RADIUS.powi(2) * BARNS_PER_SQUARE_CM;
        assert!((klein_nishina(1e-9, 1.0) - expected).abs() < 1e-9 * expected);
    }

    #[test]
    fn integrated_klein_nishina() {
        let integral = GaussKronrod::new(1e-10)
            .integrate(|mu| klein_nishina(1.0, mu), -1.0, 1.0)
            .unwrap();
        assert!((integral - klein_nishina_total(1.0)).abs() < 1e-8 * integral);
    }

    #[test]
    fn momentum_sign() {
        // backscatter of a hard photon can eject any electron
        assert!(max_electron_momentum(10.0, 1e-5, -1.0) > 1.0);
        // no momentum transfer leaves the electron bound
        assert!(max_electron_momentum(10.0, 1e-5, 1.0) < 0.0);
    }

    #[test]
    fn zero_below_binding_energy() {
        let incoherent = free_electrons(2.0);
        assert_eq!(incoherent.evaluate(1e-5).unwrap(), 0.0);
        assert_eq!(incoherent.evaluate(1e-6).unwrap(), 0.0);
    }

    #[test]
    fn loosely_bound_electrons_are_free() {
        let incoherent = free_electrons(2.0);
        let sigma = incoherent.evaluate(10.0).unwrap();
        let expected = 2.0 * klein_nishina_total(10.0);
        assert!((sigma - expected).abs() < 1e-2 * expected);
    }

    #[test]
    fn scales_with_occupancy() {
        let one = free_electrons(1.0).evaluate(1.0).unwrap();
        let two = free_electrons(2.0).evaluate(1.0).unwrap();
        assert!((two - 2.0 * one).abs() < 1e-12 * two);
    }
}
