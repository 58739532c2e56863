use std::collections::BTreeMap;

use derive_more::Deref;
use serde::{Deserialize, Serialize};

use super::value_objects::{BenchmarkGroup, BenchmarkId};

/// One listed benchmark. Immutable for the lifetime of a catalog load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benchmark {
    pub id: BenchmarkId,
    pub name: String,
    pub category: String,
}

impl Benchmark {
    pub fn new(
        id: impl Into<BenchmarkId>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), name: name.into(), category: category.into() }
    }

    pub fn group(&self) -> BenchmarkGroup {
        BenchmarkGroup::classify(&self.category)
    }
}

/// Timing statistics. Only `mean_ns` is interpreted; every other field the
/// producer attaches is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean_ns: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Statistics {
    pub fn from_mean(mean_ns: f64) -> Self {
        Self { mean_ns, extra: serde_json::Map::new() }
    }
}

/// Outcome of one successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub id: BenchmarkId,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub simd_variant: String,
    pub statistics: Statistics,
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl BenchmarkResult {
    pub fn new(id: impl Into<BenchmarkId>, mean_ns: f64) -> Self {
        let id = id.into();
        Self {
            category: id.category().to_string(),
            name: id.name().to_string(),
            id,
            simd_variant: String::new(),
            statistics: Statistics::from_mean(mean_ns),
            timestamp_ms: 0,
        }
    }

    pub fn mean_ns(&self) -> f64 {
        self.statistics.mean_ns
    }
}

/// Results keyed by benchmark id; a newer run replaces the older entry.
#[derive(Debug, Clone, Default, PartialEq, Deref)]
pub struct ResultSet(BTreeMap<BenchmarkId, BenchmarkResult>);

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, result: BenchmarkResult) -> Option<BenchmarkResult> {
        self.0.insert(result.id.clone(), result)
    }

    pub fn remove(&mut self, id: &BenchmarkId) -> Option<BenchmarkResult> {
        self.0.remove(id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn mean_ns(&self, id: &BenchmarkId) -> Option<f64> {
        self.0.get(id).map(BenchmarkResult::mean_ns)
    }

    /// Entries ordered by id.
    pub fn to_entries(&self) -> Vec<BenchmarkResult> {
        self.0.values().cloned().collect()
    }
}

impl FromIterator<BenchmarkResult> for ResultSet {
    fn from_iter<I: IntoIterator<Item = BenchmarkResult>>(iter: I) -> Self {
        let mut set = Self::new();
        for result in iter {
            set.insert(result);
        }
        set
    }
}

/// Rendered frame of a scene: non-premultiplied RGBA8, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Screenshot {
    /// Whether the pixel buffer matches the stated dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.rgba.len() == self.width as usize * self.height as usize * 4
    }
}
