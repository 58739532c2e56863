use std::rc::Rc;

use crate::domain::{
    benchmark::{
        BenchmarkCatalog, BenchmarkExecutor, BlockingBenchModule, ExecutionMode, HostBridge,
        SimdLevelInfo,
    },
    errors::BenchResult,
    logging::{LogComponent, get_logger},
};

/// Loads the benchmark listing from the active backend's catalog source.
pub async fn load_catalog(source: &dyn BenchmarkExecutor) -> BenchResult<BenchmarkCatalog> {
    let benchmarks = source.list_benchmarks().await?;
    let catalog = BenchmarkCatalog::new(benchmarks);
    get_logger().info(
        LogComponent::Application("Catalog"),
        &format!("Loaded {} benchmark(s) from {} executor", catalog.len(), source.kind()),
    );
    Ok(catalog)
}

/// Where SIMD levels come from for each mode
#[derive(Clone, Default)]
pub struct SimdLevelSources {
    pub host: Option<Rc<dyn HostBridge>>,
    pub module: Option<Rc<dyn BlockingBenchModule>>,
}

impl SimdLevelSources {
    /// Empty when the active backend cannot report levels.
    pub async fn load(&self, mode: ExecutionMode) -> Vec<SimdLevelInfo> {
        let levels = match (mode, &self.host, &self.module) {
            (ExecutionMode::Native, Some(host), _) => {
                crate::infrastructure::host::fetch_simd_levels(host.as_ref()).await
            }
            (ExecutionMode::Wasm, _, Some(module)) if module.is_ready() => module.simd_levels(),
            _ => Ok(Vec::new()),
        };
        levels.unwrap_or_else(|err| {
            let message = format!("SIMD levels unavailable: {err}");
            get_logger().warn(LogComponent::Application("Catalog"), &message);
            Vec::new()
        })
    }
}
