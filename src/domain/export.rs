use serde::Serialize;

use crate::domain::benchmark::ResultSet;
use crate::domain::errors::BenchResult;

/// Downloadable copy of the current results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub file_name: String,
    pub contents: String,
}

/// Pretty-printed JSON array of results ordered by id. `stamp` is embedded
/// in the file name verbatim.
pub fn export_results(results: &ResultSet, stamp: &str) -> BenchResult<ExportDocument> {
    let entries = results.to_entries();
    let contents = serde_json::to_string_pretty(&entries)?;
    Ok(ExportDocument { file_name: format!("bench-results-{stamp}.json"), contents })
}

/// File-name-safe form of an ISO-8601 timestamp.
pub fn file_stamp(iso_timestamp: &str) -> String {
    iso_timestamp.chars().map(|c| if c == ':' || c == '.' { '-' } else { c }).collect()
}
