mod common;

use bench_dashboard_wasm::domain::benchmark::{BenchmarkResult, ResultSet};
use bench_dashboard_wasm::domain::comparison::{
    ComparisonStatus, SIMILARITY_THRESHOLD_PERCENT, build_rows, compare,
};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

#[quickcheck]
fn equal_measurements_are_similar(reference: f64) -> TestResult {
    if !reference.is_finite() || reference <= 0.0 {
        return TestResult::discard();
    }
    let result = compare(reference, Some(reference)).unwrap();
    let similar = result.status == ComparisonStatus::Similar;
    TestResult::from_bool(result.percent_change == 0.0 && similar)
}

#[quickcheck]
fn missing_or_zero_baseline_has_no_comparison(current: f64) -> bool {
    compare(current, Some(0.0)).is_none() && compare(current, None).is_none()
}

#[quickcheck]
fn status_agrees_with_percent_change(current: u32, reference: u32) -> TestResult {
    if reference == 0 {
        return TestResult::discard();
    }
    let result = compare(f64::from(current), Some(f64::from(reference))).unwrap();
    let expected = if result.percent_change.abs() <= SIMILARITY_THRESHOLD_PERCENT {
        ComparisonStatus::Similar
    } else if result.percent_change < 0.0 {
        ComparisonStatus::Faster
    } else {
        ComparisonStatus::Slower
    };
    TestResult::from_bool(result.status == expected)
}

#[test]
fn five_percent_is_inclusive() {
    assert_eq!(compare(105.0, Some(100.0)).unwrap().status, ComparisonStatus::Similar);
    assert_eq!(compare(95.0, Some(100.0)).unwrap().status, ComparisonStatus::Similar);
    assert_eq!(compare(105.0001, Some(100.0)).unwrap().status, ComparisonStatus::Slower);
    assert_eq!(compare(94.9999, Some(100.0)).unwrap().status, ComparisonStatus::Faster);
}

#[test]
fn derived_fields() {
    let result = compare(50.0, Some(100.0)).unwrap();
    assert_eq!(result.diff, -50.0);
    assert_eq!(result.percent_change, -50.0);
    assert_eq!(result.speedup, 2.0);
    assert_eq!(result.status, ComparisonStatus::Faster);
}

#[test]
fn tiny_differences_snap_to_zero() {
    let result = compare(100.000001, Some(100.0)).unwrap();
    assert_eq!(result.percent_change, 0.0);
}

#[test]
fn rows_compare_against_the_base_column() {
    let catalog = common::benchmarks(&["fine/fill", "fine/strip", "scene_cpu/tiger"]);
    let base: ResultSet = [
        BenchmarkResult::new("fine/fill", 200.0),
        BenchmarkResult::new("scene_cpu/tiger", 10.0),
    ]
    .into_iter()
    .collect();
    let current: ResultSet =
        [BenchmarkResult::new("fine/fill", 100.0), BenchmarkResult::new("fine/strip", 5.0)]
            .into_iter()
            .collect();

    let rows = build_rows(&catalog, Some(&base), Some(&current));
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].base_ns, Some(200.0));
    assert_eq!(rows[0].compare_ns, Some(100.0));
    assert_eq!(rows[0].comparison.unwrap().status, ComparisonStatus::Faster);

    assert_eq!(rows[1].base_ns, None);
    assert_eq!(rows[1].compare_ns, Some(5.0));
    assert!(rows[1].comparison.is_none());

    assert_eq!(rows[2].base_ns, Some(10.0));
    assert_eq!(rows[2].compare_ns, None);
    assert!(rows[2].comparison.is_none());
}

#[test]
fn rows_without_selections_are_empty_cells() {
    let catalog = common::benchmarks(&["fine/fill"]);
    let rows = build_rows(&catalog, None, None);
    assert_eq!(rows[0].base_ns, None);
    assert_eq!(rows[0].compare_ns, None);
    assert!(rows[0].comparison.is_none());
}
