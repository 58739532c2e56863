use super::entities::Benchmark;
use super::value_objects::{BenchmarkGroup, BenchmarkId};

/// Benchmarks offered by the active backend. Replaced wholesale on every
/// reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkCatalog {
    benchmarks: Vec<Benchmark>,
}

impl BenchmarkCatalog {
    /// Keeps listing order; later duplicates of an id are dropped.
    pub fn new(benchmarks: Vec<Benchmark>) -> Self {
        let mut unique: Vec<Benchmark> = Vec::with_capacity(benchmarks.len());
        for benchmark in benchmarks {
            if !unique.iter().any(|b| b.id == benchmark.id) {
                unique.push(benchmark);
            }
        }
        Self { benchmarks: unique }
    }

    pub fn benchmarks(&self) -> &[Benchmark] {
        &self.benchmarks
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    pub fn find(&self, id: &BenchmarkId) -> Option<&Benchmark> {
        self.benchmarks.iter().find(|b| &b.id == id)
    }

    pub fn ids(&self) -> Vec<BenchmarkId> {
        self.benchmarks.iter().map(|b| b.id.clone()).collect()
    }

    pub fn in_group(&self, group: BenchmarkGroup) -> impl Iterator<Item = &Benchmark> {
        self.benchmarks.iter().filter(move |b| b.group() == group)
    }

    pub fn ids_in_group(&self, group: BenchmarkGroup) -> Vec<BenchmarkId> {
        self.in_group(group).map(|b| b.id.clone()).collect()
    }

    pub fn ids_in_category(&self, category: &str) -> Vec<BenchmarkId> {
        self.benchmarks.iter().filter(|b| b.category == category).map(|b| b.id.clone()).collect()
    }

    /// Distinct categories of a group, in first-listed order.
    pub fn categories(&self, group: BenchmarkGroup) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for benchmark in self.in_group(group) {
            if !categories.contains(&benchmark.category.as_str()) {
                categories.push(&benchmark.category);
            }
        }
        categories
    }
}
