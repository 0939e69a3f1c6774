//! Integration tests for union grids and retabulation invariants

use eprtools_numeric::{Interp, Tabular};
use eprtools_xs::constants::{PAIR_PRODUCTION_THRESHOLD, TRIPLET_PRODUCTION_THRESHOLD};
use eprtools_xs::{build_union, retabulate, sum_subshells, TotalCrossSection, UnionGridBuilder};
use rstest::{fixture, rstest};

#[fixture]
fn ref_sources() -> Vec<Vec<f64>> {
    vec![
        vec![1e-5, 1e-4, 1e-3, 1e-2, 0.1, 1.0, 10.0, 100.0],
        vec![1e-3, 2e-3, 5e-3, 1.0, 2.0],
        vec![1.36e-5, 1e-2, 1e-2, 20.0],
    ]
}

#[fixture]
fn ref_grid() -> Vec<f64> {
    let mut builder = UnionGridBuilder::new(1.0001).unwrap();
    builder.add_grid([1e-3, 20.0]);
    builder.add_binding_energies(&[2.9e-4, 1.6e-2], 1e-3, 20.0);
    builder.add_photon_thresholds(1e-3, 20.0);
    builder.merge_clipped(&[1e-4, 1e-2, 0.5, 5.0, 50.0], 1e-3, 20.0);
    builder.build().unwrap()
}

#[rstest]
#[case(false)] // case 1
#[case(true)] // case 2
fn union_is_strictly_ascending(ref_sources: Vec<Vec<f64>>, #[case] nudge: bool) {
    let sources = ref_sources.iter().map(|s| s.as_slice()).collect::<Vec<_>>();
    let union = build_union(&sources, nudge, 1.0001).unwrap();
    assert!(union.windows(2).all(|w| w[0] < w[1]));
}

#[rstest]
fn union_without_nudge_is_a_superset(ref_sources: Vec<Vec<f64>>) {
    let sources = ref_sources.iter().map(|s| s.as_slice()).collect::<Vec<_>>();
    let union = build_union(&sources, false, 1.0001).unwrap();

    for value in ref_sources.iter().flatten() {
        assert!(union.contains(value), "{value} missing from union");
    }
}

#[rstest]
fn union_with_nudge_keeps_every_point(ref_sources: Vec<Vec<f64>>) {
    let sources = ref_sources.iter().map(|s| s.as_slice()).collect::<Vec<_>>();
    let union = build_union(&sources, true, 1.0001).unwrap();

    let total_points: usize = ref_sources.iter().map(|s| s.len()).sum();
    assert_eq!(union.len(), total_points);
}

#[rstest]
fn seeded_grid_contains_special_points(ref_grid: Vec<f64>) {
    assert_eq!(ref_grid.first(), Some(&1e-3));
    assert_eq!(ref_grid.last(), Some(&20.0));
    assert!(ref_grid.contains(&1.6e-2));
    assert!(ref_grid.contains(&(1.6e-2 - 1e-9)));
    assert!(ref_grid.contains(&PAIR_PRODUCTION_THRESHOLD));
    assert!(ref_grid.contains(&TRIPLET_PRODUCTION_THRESHOLD));

    // binding energy below the minimum is ignored
    assert!(!ref_grid.contains(&2.9e-4));
}

#[rstest]
#[case(0.0, false)] // case 1
#[case(PAIR_PRODUCTION_THRESHOLD, true)] // case 2
#[case(TRIPLET_PRODUCTION_THRESHOLD, true)] // case 3
#[case(1.6e-2, false)] // case 4
fn threshold_invariant(ref_grid: Vec<f64>, #[case] threshold: f64, #[case] zero: bool) {
    let start = threshold.max(1e-3) * 1.2;
    let xs = Tabular::new(vec![start, 30.0], vec![1.0, 10.0], Interp::LogLog).unwrap();

    let retabulated = retabulate(&ref_grid, &xs, threshold, zero).unwrap();
    assert_eq!(
        retabulated.values.len(),
        ref_grid.len() - retabulated.threshold_index
    );

    // everything below the threshold index is zero by construction
    for (i, energy) in ref_grid.iter().enumerate().take(retabulated.threshold_index) {
        assert!(*energy < start, "non-zero region dropped at {i}");
    }
}

#[rstest]
fn aggregation_is_additive(ref_grid: Vec<f64>) {
    let a = Tabular::new(vec![1e-3, 20.0], vec![5.0, 1.0], Interp::LogLog).unwrap();
    let b = Tabular::new(vec![1.1, 20.0], vec![0.1, 2.0], Interp::LogLog).unwrap();

    let a = retabulate(&ref_grid, &a, 0.0, false).unwrap();
    let b = retabulate(&ref_grid, &b, PAIR_PRODUCTION_THRESHOLD, true).unwrap();

    let mut total = TotalCrossSection::zeros(ref_grid.len());
    total.add_all([&a, &b]).unwrap();

    for i in 0..ref_grid.len() {
        let expected = a.value_at(i) + b.value_at(i);
        assert!((total.values()[i] - expected).abs() <= 1e-12 * expected.max(1.0));
    }

    let summed = sum_subshells(ref_grid.len(), [&a, &b], false).unwrap();
    assert_eq!(summed.dense(), total.values());
}
