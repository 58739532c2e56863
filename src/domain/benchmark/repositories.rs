use futures::future::LocalBoxFuture;

use super::entities::{Benchmark, BenchmarkResult, Screenshot};
use super::value_objects::{BenchmarkId, ExecutorKind, SimdLevelInfo, TimingConfig};
use crate::domain::errors::BenchResult;
use crate::domain::reference::{ReferenceIndexEntry, ReferenceName};

/// Something that can list and run benchmarks
pub trait BenchmarkExecutor {
    fn kind(&self) -> ExecutorKind;

    /// Whether runs can be routed here right now.
    fn is_ready(&self) -> bool {
        true
    }

    /// Fails with `BackendUnavailable`.
    fn list_benchmarks(&self) -> LocalBoxFuture<'_, BenchResult<Vec<Benchmark>>>;

    /// Fails with `RunFailed` or `BackendUnavailable`.
    fn run<'a>(
        &'a self,
        id: &'a BenchmarkId,
        timing: &'a TimingConfig,
    ) -> LocalBoxFuture<'a, BenchResult<BenchmarkResult>>;

    /// Executors without SIMD variants ignore this.
    fn select_simd_level(&self, _level: Option<&str>) {}
}

/// Named reference snapshots
pub trait ReferenceStore {
    /// Newest first.
    fn list(&self) -> LocalBoxFuture<'_, BenchResult<Vec<ReferenceIndexEntry>>>;

    /// Sanitizes `name`, overwrites any snapshot of the same name and returns
    /// the name it was stored under.
    fn save<'a>(
        &'a self,
        name: &'a str,
        results: &'a [BenchmarkResult],
    ) -> LocalBoxFuture<'a, BenchResult<ReferenceName>>;

    /// Sanitizes `name` like `save`. Fails with `NotFound`.
    fn load<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, BenchResult<Vec<BenchmarkResult>>>;

    /// Deleting an absent name is not an error.
    fn delete<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, BenchResult<()>>;
}

/// Command channel to the out-of-process native host
pub trait HostBridge {
    fn invoke(
        &self,
        command: &'static str,
        args: serde_json::Value,
    ) -> LocalBoxFuture<'_, BenchResult<serde_json::Value>>;
}

/// String key/value persistence
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> BenchResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> BenchResult<()>;
    fn remove(&self, key: &str) -> BenchResult<()>;
}

/// Computation module loaded on the orchestrating thread. Calls block until
/// the measurement is done.
pub trait BlockingBenchModule {
    fn is_ready(&self) -> bool;

    /// `None` when the module does not know the id.
    fn run_blocking(
        &self,
        id: &BenchmarkId,
        timing: &TimingConfig,
    ) -> BenchResult<Option<BenchmarkResult>>;

    fn simd_levels(&self) -> BenchResult<Vec<SimdLevelInfo>>;
}

/// Renders a scene once for visual verification
pub trait ScreenshotProvider {
    fn capture<'a>(
        &'a self,
        scene_name: &'a str,
        category: &'a str,
    ) -> LocalBoxFuture<'a, BenchResult<Screenshot>>;
}
