// crate modules
use crate::error::{Error, Result};

/// Kronrod abscissae on [0, 1], the odd entries are the Gauss nodes
const XGK: [f64; 11] = [
    0.995657163025808080735527280689003,
    0.973906528517171720077964012084452,
    0.930157491355708226001207180059508,
    0.865063366688984510732096688423493,
    0.780817726586416897063717578345042,
    0.679409568299024406234327365114874,
    0.562757134668604683339000099272694,
    0.433395394129247190799265943165784,
    0.294392862701460198131126603103866,
    0.148874338981631210884826001129720,
    0.000000000000000000000000000000000,
];

/// Kronrod weights
const WGK: [f64; 11] = [
    0.011694638867371874278064396062192,
    0.032558162307964727478818972459390,
    0.054755896574351996031381300244580,
    0.075039674810919952767043140916190,
    0.093125454583697605535065465083366,
    0.109387158802297641899210590325805,
    0.123491976262065851077600525452690,
    0.134709217311473325928054001771707,
    0.142775938577060080797094273138717,
    0.147739104901338491374841515972068,
    0.149445554002916905664936468389821,
];

/// Gauss weights for the 10-point rule
const WG: [f64; 5] = [
    0.066671344308688137593568809893332,
    0.149451349150580593145776339657697,
    0.219086362515982043995534934228163,
    0.269266719309996355091226921569469,
    0.295524224714752870173892994651338,
];

/// Adaptive 21-point Gauss-Kronrod integrator
///
/// The interval with the largest error estimate is bisected until the
/// summed error estimate meets the relative (or absolute) tolerance.
///
/// ```rust
/// # use eprtools_numeric::GaussKronrod;
/// let integrator = GaussKronrod::new(1e-10);
/// let area = integrator.integrate(|x| x.sin(), 0.0, std::f64::consts::PI).unwrap();
/// assert!((area - 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct GaussKronrod {
    relative_tolerance: f64,
    absolute_tolerance: f64,
    max_subintervals: usize,
}

impl Default for GaussKronrod {
    fn default() -> Self {
        Self {
            relative_tolerance: 1e-12,
            absolute_tolerance: 0.0,
            max_subintervals: 1000,
        }
    }
}

impl GaussKronrod {
    /// Integrator with a given relative tolerance
    pub fn new(relative_tolerance: f64) -> Self {
        Self {
            relative_tolerance,
            ..Default::default()
        }
    }

    /// Set an absolute tolerance, useful for integrals that may be zero
    pub fn with_absolute_tolerance(mut self, absolute_tolerance: f64) -> Self {
        self.absolute_tolerance = absolute_tolerance;
        self
    }

    /// Set the maximum number of subintervals before giving up
    pub fn with_max_subintervals(mut self, max_subintervals: usize) -> Self {
        self.max_subintervals = max_subintervals.max(1);
        self
    }

    /// Integrate over [a, b]
    pub fn integrate<F>(&self, function: F, a: f64, b: f64) -> Result<f64>
    where
        F: Fn(f64) -> f64,
    {
        if a == b {
            return Ok(0.0);
        }

        // (lower, upper, estimate, error)
        let mut segments = vec![Self::rule(&function, a, b)];

        loop {
            let estimate: f64 = segments.iter().map(|s| s.2).sum();
            let error: f64 = segments.iter().map(|s| s.3).sum();

            if !estimate.is_finite() {
                return Err(Error::UndefinedFunctionValue(a));
            }

            let target = self.absolute_tolerance.max(self.relative_tolerance * estimate.abs());
            if error <= target {
                return Ok(estimate);
            }

            if segments.len() >= self.max_subintervals {
                return Err(Error::QuadratureNotConverged {
                    lower: a,
                    upper: b,
                    estimate,
                    error,
                });
            }

            // bisect the worst segment
            let worst = segments
                .iter()
                .enumerate()
                .max_by(|x, y| x.1 .3.total_cmp(&y.1 .3))
                .map(|(i, _)| i)
                .unwrap_or(0);

            let (lower, upper, _, _) = segments.swap_remove(worst);
            let centre = 0.5 * (lower + upper);

            // floating point exhaustion, nothing more to gain here
            if centre <= lower.min(upper) || centre >= lower.max(upper) {
                return Ok(estimate);
            }

            segments.push(Self::rule(&function, lower, centre));
            segments.push(Self::rule(&function, centre, upper));
        }
    }

    /// Single application of the 21-point rule
    fn rule<F>(function: &F, lower: f64, upper: f64) -> (f64, f64, f64, f64)
    where
        F: Fn(f64) -> f64,
    {
        let centre = 0.5 * (lower + upper);
        let half = 0.5 * (upper - lower);

        let f_centre = function(centre);
        let mut kronrod = WGK[10] * f_centre;
        let mut gauss = 0.0;

        for j in 0..10 {
            let dx = half * XGK[j];
            let pair = function(centre - dx) + function(centre + dx);
            kronrod += WGK[j] * pair;
            if j % 2 == 1 {
                gauss += WG[j / 2] * pair;
            }
        }

        let estimate = kronrod * half;
        let error = ((kronrod - gauss) * half).abs();
        (lower, upper, estimate, error)
    }
}
