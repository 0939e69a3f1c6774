// crate modules
use crate::error::{Error, Result};
use crate::legendre::{leading_coefficient, monic_beta};

// external crates
use log::warn;
use nalgebra::{DMatrix, SymmetricEigen};

/// Radau quadrature on [-1, 1] with one node fixed at x = 1
///
/// Built from the Legendre moments of a positive measure, it reproduces
/// those moments with `nodes.len()` free nodes plus the fixed endpoint.
///
/// ```rust
/// # use eprtools_elastic::RadauQuadrature;
/// // uniform measure on [-1, 1] normalised to one
/// let moments = [1.0, 0.0, 0.0];
/// let radau = RadauQuadrature::from_legendre_moments(&moments, 1).unwrap();
///
/// // two point Radau rule: x = -1/3 with 3/4, x = 1 with 1/4
/// assert!((radau.nodes()[0] + 1.0 / 3.0).abs() < 1e-12);
/// assert!((radau.weights()[0] - 0.75).abs() < 1e-12);
/// assert!((radau.endpoint_weight() - 0.25).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RadauQuadrature {
    nodes: Vec<f64>,
    weights: Vec<f64>,
    endpoint_weight: f64,
}

impl RadauQuadrature {
    /// Quadrature from Legendre moments of orders `0..=2n`
    ///
    /// The free nodes are the Gauss nodes of the measure `(1 - x) dλ(x)`,
    /// found with Chebyshev's modified moment algorithm against the monic
    /// Legendre polynomials. If the recurrence breaks down (a non-positive
    /// variance or a free node outside (-1, 1)) the number of free nodes is
    /// reduced with a warning.
    pub fn from_legendre_moments(legendre_moments: &[f64], n: usize) -> Result<Self> {
        if n == 0 || legendre_moments.len() < 2 * n + 1 {
            return Err(Error::MomentReduction {
                energy: f64::NAN,
                reason: format!(
                    "{} Legendre moments cannot support {} nodes",
                    legendre_moments.len(),
                    n
                ),
            });
        }

        let mut order = n;
        while order > 0 {
            let radau = Self::with_free_nodes(legendre_moments, order)?;
            let free = radau.nodes.len();

            let outside = radau.nodes.iter().copied().find(|x| !(*x > -1.0 && *x < 1.0));
            match outside {
                None => return Ok(radau),
                Some(x) => {
                    warn!(
                        "Free Radau node {x} outside (-1, 1), reducing from {} to {} nodes",
                        free,
                        free - 1
                    );
                    order = free - 1;
                }
            }
        }

        Err(Error::MomentReduction {
            energy: f64::NAN,
            reason: "no free Radau node inside (-1, 1)".to_string(),
        })
    }

    /// Rule with at most `n` free nodes, which may lie anywhere
    fn with_free_nodes(legendre_moments: &[f64], n: usize) -> Result<Self> {
        // modified moments of dλ against the monic Legendre polynomials
        let m = legendre_moments[..=2 * n]
            .iter()
            .enumerate()
            .map(|(k, l)| l / leading_coefficient(k))
            .collect::<Vec<f64>>();

        // modified moments of (1 - x) dλ
        let r = (0..2 * n)
            .map(|k| {
                let lower = if k == 0 { 0.0 } else { monic_beta(k) * m[k - 1] };
                m[k] - m[k + 1] - lower
            })
            .collect::<Vec<f64>>();

        let (alpha, beta) = modified_chebyshev(&r, n)?;
        let (nodes, gauss_weights) = gauss_from_recurrence(&alpha, &beta);

        let weights = nodes
            .iter()
            .zip(gauss_weights.iter())
            .map(|(x, w)| w / (1.0 - x))
            .collect::<Vec<f64>>();

        let endpoint_weight = legendre_moments[0] - weights.iter().sum::<f64>();

        Ok(Self {
            nodes,
            weights,
            endpoint_weight,
        })
    }

    /// Free nodes in ascending order
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Weights of the free nodes
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight of the node fixed at x = 1
    pub fn endpoint_weight(&self) -> f64 {
        self.endpoint_weight
    }

    /// Apply the rule to a function, including the fixed endpoint
    pub fn integrate<F: Fn(f64) -> f64>(&self, function: F) -> f64 {
        self.nodes
            .iter()
            .zip(self.weights.iter())
            .map(|(x, w)| w * function(*x))
            .sum::<f64>()
            + self.endpoint_weight * function(1.0)
    }
}

/// Chebyshev's modified moment algorithm for monic Legendre polynomials
///
/// Returns the recurrence coefficients (alpha, beta) of the measure whose
/// modified moments are `r`, truncated where the variance stops being
/// positive.
fn modified_chebyshev(r: &[f64], n: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    if !(r[0] > 0.0) {
        return Err(Error::MomentReduction {
            energy: f64::NAN,
            reason: format!("zeroth Radau moment {} is not positive", r[0]),
        });
    }

    let width = 2 * n;
    let mut alpha = vec![r[1] / r[0]];
    let mut beta = vec![r[0]];

    let mut previous = vec![0.0; width];
    let mut current = r.to_vec();

    for k in 1..n {
        let mut next = vec![0.0; width];
        for l in k..(width - k) {
            next[l] = current[l + 1] - alpha[k - 1] * current[l] - beta[k - 1] * previous[l]
                + monic_beta(l) * current[l - 1];
        }

        let beta_k = next[k] / current[k - 1];
        if !(beta_k > 0.0) || !beta_k.is_finite() {
            warn!(
                "Non-positive variance in Radau recurrence, reducing from {} to {} nodes",
                n, k
            );
            break;
        }

        alpha.push(next[k + 1] / next[k] - current[k] / current[k - 1]);
        beta.push(beta_k);

        previous = current;
        current = next;
    }

    Ok((alpha, beta))
}

/// Golub-Welsch: nodes and weights from the symmetric Jacobi matrix
fn gauss_from_recurrence(alpha: &[f64], beta: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = alpha.len();
    let jacobi = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            alpha[i]
        } else if i + 1 == j {
            beta[j].sqrt()
        } else if j + 1 == i {
            beta[i].sqrt()
        } else {
            0.0
        }
    });

    let eigen = SymmetricEigen::new(jacobi);

    let mut pairs = (0..n)
        .map(|i| {
            let v0 = eigen.eigenvectors[(0, i)];
            (eigen.eigenvalues[i], beta[0] * v0 * v0)
        })
        .collect::<Vec<(f64, f64)>>();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    pairs.into_iter().unzip()
}
