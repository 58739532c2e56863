//! Pure projection of dashboard state into display strings.

use strum::{AsRefStr, Display};

use crate::domain::{
    benchmark::{BenchmarkId, ResultSet, RunPhase},
    comparison::{ComparisonRow, ComparisonStatus},
    reference::ReferenceIndexEntry,
    run_state::RunState,
};

/// Placeholder for an empty cell.
pub const EMPTY_CELL: &str = "-";

/// Picks ns, µs, ms or s so the number stays short.
pub fn format_duration_ns(ns: f64) -> String {
    let abs = ns.abs();
    if abs < 1_000.0 {
        format!("{ns:.1} ns")
    } else if abs < 1_000_000.0 {
        format!("{:.2} µs", ns / 1_000.0)
    } else if abs < 1_000_000_000.0 {
        format!("{:.2} ms", ns / 1_000_000.0)
    } else {
        format!("{:.2} s", ns / 1_000_000_000.0)
    }
}

/// Signed with two decimals; zero has no sign.
pub fn format_percent(percent: f64) -> String {
    if percent == 0.0 { "0.00%".to_string() } else { format!("{percent:+.2}%") }
}

/// A zero-time measurement has no finite speedup and renders as empty.
pub fn format_speedup(speedup: f64) -> String {
    if speedup.is_finite() { format!("{speedup:.2}x") } else { EMPTY_CELL.to_string() }
}

/// Display state of one benchmark row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum RowStatus {
    #[strum(serialize = "idle")]
    Idle,
    #[strum(serialize = "queued")]
    Queued,
    #[strum(serialize = "warming up")]
    WarmingUp,
    #[strum(serialize = "measuring")]
    Measuring,
    #[strum(serialize = "done")]
    Done,
}

/// A failed id has no result and is no longer queued, so it shows as idle.
pub fn row_status(id: &BenchmarkId, state: &RunState, results: &ResultSet) -> RowStatus {
    if state.running() == Some(id) {
        return match state.phase() {
            Some(RunPhase::Measuring) => RowStatus::Measuring,
            _ => RowStatus::WarmingUp,
        };
    }
    if state.is_queued(id) {
        RowStatus::Queued
    } else if results.contains_key(id) {
        RowStatus::Done
    } else {
        RowStatus::Idle
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: BenchmarkId,
    pub name: String,
    pub category: String,
    pub status: RowStatus,
    pub base: String,
    pub compare: String,
    pub change: String,
    pub speedup: String,
    /// CSS class of the change cell.
    pub change_class: &'static str,
}

pub fn project_row(row: &ComparisonRow, state: &RunState, results: &ResultSet) -> RowView {
    let empty = || EMPTY_CELL.to_string();
    let cell = |value: Option<f64>| value.map(format_duration_ns).unwrap_or_else(empty);
    RowView {
        id: row.id.clone(),
        name: row.name.clone(),
        category: row.category.clone(),
        status: row_status(&row.id, state, results),
        base: cell(row.base_ns),
        compare: cell(row.compare_ns),
        change: row.comparison.map(|c| format_percent(c.percent_change)).unwrap_or_else(empty),
        speedup: row.comparison.map(|c| format_speedup(c.speedup)).unwrap_or_else(empty),
        change_class: row.comparison.map(|c| status_class(c.status)).unwrap_or("none"),
    }
}

fn status_class(status: ComparisonStatus) -> &'static str {
    match status {
        ComparisonStatus::Faster => "faster",
        ComparisonStatus::Slower => "slower",
        ComparisonStatus::Similar => "similar",
    }
}

pub fn reference_label(entry: &ReferenceIndexEntry) -> String {
    match entry.benchmark_count {
        1 => format!("{} (1 result)", entry.name),
        n => format!("{} ({n} results)", entry.name),
    }
}
