//! Relating a measurement to a baseline.
//!
//! [`compare`] is the whole engine; [`build_rows`] applies it to every
//! catalog entry against the resolved base and compare selections.

use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::domain::benchmark::{Benchmark, BenchmarkId, ResultSet};

/// Changes within this many percent either way count as noise.
pub const SIMILARITY_THRESHOLD_PERCENT: f64 = 5.0;

/// Percent changes smaller than this are reported as exactly zero.
const ZERO_SNAP_PERCENT: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    Faster,
    Slower,
    Similar,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub diff: f64,
    pub percent_change: f64,
    pub speedup: f64,
    pub status: ComparisonStatus,
}

/// `None` when there is no usable baseline (absent or zero).
pub fn compare(current_ns: f64, reference_ns: Option<f64>) -> Option<Comparison> {
    let reference_ns = reference_ns.filter(|r| *r != 0.0)?;

    let diff = current_ns - reference_ns;
    let mut percent_change = diff / reference_ns * 100.0;
    if percent_change.abs() < ZERO_SNAP_PERCENT {
        percent_change = 0.0;
    }

    let status = if percent_change.abs() <= SIMILARITY_THRESHOLD_PERCENT {
        ComparisonStatus::Similar
    } else if percent_change < 0.0 {
        ComparisonStatus::Faster
    } else {
        ComparisonStatus::Slower
    };

    Some(Comparison { diff, percent_change, speedup: reference_ns / current_ns, status })
}

/// One benchmark line of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub id: BenchmarkId,
    pub name: String,
    pub category: String,
    pub base_ns: Option<f64>,
    pub compare_ns: Option<f64>,
    pub comparison: Option<Comparison>,
}

/// Rows in catalog order. The compare column is measured against the base
/// column.
pub fn build_rows(
    benchmarks: &[Benchmark],
    base: Option<&ResultSet>,
    compared: Option<&ResultSet>,
) -> Vec<ComparisonRow> {
    benchmarks
        .iter()
        .map(|benchmark| {
            let base_ns = base.and_then(|set| set.mean_ns(&benchmark.id));
            let compare_ns = compared.and_then(|set| set.mean_ns(&benchmark.id));
            let comparison = compare_ns.and_then(|current| compare(current, base_ns));
            ComparisonRow {
                id: benchmark.id.clone(),
                name: benchmark.name.clone(),
                category: benchmark.category.clone(),
                base_ns,
                compare_ns,
                comparison,
            }
        })
        .collect()
}
