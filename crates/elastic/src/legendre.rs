/// Legendre polynomial of order `l` at `x`
///
/// ```rust
/// # use eprtools_elastic::legendre;
/// assert_eq!(legendre(0, 0.3), 1.0);
/// assert_eq!(legendre(1, 0.3), 0.3);
/// assert!((legendre(2, 0.5) + 0.125).abs() < 1e-15);
/// ```
pub fn legendre(l: usize, x: f64) -> f64 {
    legendre_series(l, x)[l]
}

/// Legendre polynomials of orders `0..=max_order` at `x`
///
/// Uses the Bonnet recurrence `(n+1) P(n+1) = (2n+1) x P(n) - n P(n-1)`.
pub fn legendre_series(max_order: usize, x: f64) -> Vec<f64> {
    let mut p = Vec::with_capacity(max_order + 1);
    p.push(1.0);
    if max_order == 0 {
        return p;
    }

    p.push(x);
    for n in 1..max_order {
        let n_f = n as f64;
        let next = ((2.0 * n_f + 1.0) * x * p[n] - n_f * p[n - 1]) / (n_f + 1.0);
        p.push(next);
    }
    p
}

/// Leading coefficient of the Legendre polynomial of order `l`
///
/// This is (2l)! / (2^l (l!)^2), built up as a running product.
pub(crate) fn leading_coefficient(l: usize) -> f64 {
    (1..=l).fold(1.0, |c, k| c * (2.0 * k as f64 - 1.0) / k as f64)
}

/// Recurrence coefficient of the monic Legendre polynomials
///
/// The monic polynomials satisfy `p(k+1) = x p(k) - b(k) p(k-1)`, with no
/// diagonal term as the weight is symmetric.
pub(crate) fn monic_beta(k: usize) -> f64 {
    if k == 0 {
        2.0
    } else {
        let k2 = (k * k) as f64;
        k2 / (4.0 * k2 - 1.0)
    }
}
