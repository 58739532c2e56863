use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};

use crate::domain::benchmark::BenchmarkResult;
use crate::domain::errors::{BenchError, BenchResult};

/// Reference name restricted to `[A-Za-z0-9_-]`
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Deref, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ReferenceName(String);

impl ReferenceName {
    /// Trims the input and replaces every other character with `_`.
    pub fn sanitize(raw: &str) -> BenchResult<Self> {
        let sanitized: String = raw
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        if sanitized.is_empty() {
            return Err(BenchError::EmptyName);
        }
        Ok(Self(sanitized))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Named, persisted copy of a result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSnapshot {
    pub name: ReferenceName,
    pub created_at: u64,
    pub entries: Vec<BenchmarkResult>,
}

impl ReferenceSnapshot {
    pub fn index_entry(&self) -> ReferenceIndexEntry {
        ReferenceIndexEntry {
            name: self.name.clone(),
            created_at: self.created_at,
            benchmark_count: self.entries.len(),
        }
    }
}

/// Listing metadata, stored apart from snapshot bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceIndexEntry {
    pub name: ReferenceName,
    pub created_at: u64,
    pub benchmark_count: usize,
}

/// Newest first.
pub fn sort_index(entries: &mut [ReferenceIndexEntry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Drops any entry named like `entry` and puts `entry` at the front.
pub fn upsert_index(entries: &mut Vec<ReferenceIndexEntry>, entry: ReferenceIndexEntry) {
    entries.retain(|existing| existing.name != entry.name);
    entries.insert(0, entry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_disallowed_characters() {
        assert_eq!(ReferenceName::sanitize("My Run!").unwrap().value(), "My_Run_");
        assert_eq!(ReferenceName::sanitize("  main-2024_01 ").unwrap().value(), "main-2024_01");
        assert_eq!(ReferenceName::sanitize("ä/b").unwrap().value(), "__b");
    }

    #[test]
    fn empty_after_sanitizing_is_rejected() {
        assert_eq!(ReferenceName::sanitize("   "), Err(BenchError::EmptyName));
        assert_eq!(ReferenceName::sanitize(""), Err(BenchError::EmptyName));
    }

    #[test]
    fn upsert_replaces_and_prepends() {
        let entry = |name: &str, created_at| ReferenceIndexEntry {
            name: ReferenceName::sanitize(name).unwrap(),
            created_at,
            benchmark_count: 1,
        };
        let mut index = vec![entry("a", 1), entry("b", 2)];
        upsert_index(&mut index, entry("a", 3));
        let names: Vec<&str> = index.iter().map(|e| e.name.value()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(index[0].created_at, 3);
    }
}
