//! Integration tests for the moment preserving reduction

use eprtools_elastic::{angles_from_delta_mu, legendre, ElasticMomentReducer, ElasticSample};
use eprtools_numeric::{GaussKronrod, Interp, Tabular};
use rstest::{fixture, rstest};

/// Screened Rutherford shaped cutoff distribution, tabulated like ENDL data
#[fixture]
fn ref_distribution() -> Tabular {
    let eta: f64 = 1e-3;
    let delta_mu = [
        1e-6, 1e-5, 1e-4, 1e-3, 3e-3, 1e-2, 3e-2, 0.1, 0.3, 0.6, 1.0, 1.5, 2.0,
    ];
    let pdf = delta_mu
        .iter()
        .map(|d| 1.0 / (eta + d).powi(2))
        .collect::<Vec<f64>>();
    angles_from_delta_mu(&delta_mu, &pdf).unwrap()
}

#[fixture]
fn ref_sample(ref_distribution: Tabular) -> ElasticSample {
    ElasticSample::new(1e-2, ref_distribution, 4e5, 1.5e4).unwrap()
}

#[rstest]
#[case(-1.0, 1)] // case 1
#[case(0.0, 2)] // case 2
#[case(0.5, 2)] // case 3
#[case(0.9, 3)] // case 4
#[case(0.99, 4)] // case 5
#[case(0.99, 5)] // case 6
#[case(0.9, 5)] // case 7
#[case(0.999, 3)] // case 8
fn weights_and_angles(ref_sample: ElasticSample, #[case] cutoff: f64, #[case] n: usize) {
    let reducer = ElasticMomentReducer::new(cutoff, n).unwrap();
    let discrete = reducer.reduce(&ref_sample).unwrap();

    assert!(!discrete.angles.is_empty() && discrete.angles.len() <= n);
    assert_eq!(discrete.angles.len(), discrete.weights.len());
    assert!((discrete.weights.iter().sum::<f64>() - 1.0).abs() < 1e-8);
    assert!(discrete.weights.iter().all(|w| *w >= 0.0));
    assert!(discrete.angles.iter().all(|a| *a > cutoff && *a <= 1.0));
    assert!(discrete.cross_section_reduction > 0.0);
    assert!(discrete.cross_section_reduction <= 1.0);
}

#[rstest]
#[case(0.5, 2)] // case 1
#[case(0.9, 3)] // case 2
#[case(0.99, 4)] // case 3
fn moments_are_preserved(ref_sample: ElasticSample, #[case] cutoff: f64, #[case] n: usize) {
    let integrator = GaussKronrod::new(1e-13).with_absolute_tolerance(1e-15);
    let moments = ref_sample
        .tail_legendre_moments(cutoff, 2 * n, &integrator)
        .unwrap();

    let discrete = ElasticMomentReducer::new(cutoff, n)
        .unwrap()
        .reduce(&ref_sample)
        .unwrap();
    assert_eq!(discrete.angles.len(), n);

    // the dropped node at μ = 1 carries the rest of the weight
    let reduction = discrete.cross_section_reduction;
    for (l, expected) in moments.iter().enumerate() {
        let discrete_moment = reduction
            * discrete
                .angles
                .iter()
                .zip(discrete.weights.iter())
                .map(|(a, w)| w * legendre(l, *a))
                .sum::<f64>()
            + (1.0 - reduction);
        assert!(
            (discrete_moment - expected).abs() < 1e-7,
            "order {l}: {discrete_moment} != {expected}"
        );
    }
}

#[rstest]
fn reduction_is_idempotent(ref_sample: ElasticSample) {
    let reducer = ElasticMomentReducer::new(0.9, 2).unwrap();
    let first = reducer.reduce(&ref_sample).unwrap();
    let second = reducer.reduce(&ref_sample).unwrap();
    assert_eq!(first, second);
}

#[test]
fn uniform_distribution_without_rutherford() {
    let pdf = Tabular::new(vec![-1.0, 0.999999], vec![1.0, 1.0], Interp::LinLin).unwrap();
    let sample = ElasticSample::new(1.0, pdf, 10.0, 0.0).unwrap();

    let discrete = ElasticMomentReducer::new(0.0, 1)
        .unwrap()
        .reduce(&sample)
        .unwrap();

    // two point Radau on a uniform [0, 1) tail
    assert!((discrete.angles[0] - 1.0 / 3.0).abs() < 1e-5);
    assert!((discrete.cross_section_reduction - 0.75).abs() < 1e-5);
}
