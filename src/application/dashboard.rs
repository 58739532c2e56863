use std::cell::RefCell;
use std::rc::Rc;

use crate::application::{
    baselines::{self, BaselineSelection, BaselineSlot, BaselineSource, SnapshotCache},
    catalog_service::{self, SimdLevelSources},
    orchestrator::{BatchOutcome, BenchmarkOrchestrator},
    screenshot::ScreenshotService,
};
use crate::domain::{
    benchmark::{
        BenchmarkCatalog, BenchmarkGroup, BenchmarkId, ExecutionMode, ReferenceStore, ResultSet,
        Screenshot, SimdLevelInfo, TimingConfig,
    },
    comparison::{self, ComparisonRow},
    errors::{BenchError, BenchResult},
    events::RunEvent,
    export::{self, ExportDocument},
    logging::{LogComponent, get_logger},
    reference::{ReferenceIndexEntry, ReferenceName},
    run_state::RunState,
};

/// Lifecycle of the benchmark listing
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CatalogState {
    #[default]
    Loading,
    Ready(BenchmarkCatalog),
    /// Run controls stay disabled until a reload succeeds.
    Failed(String),
}

/// The one controller instance. Owns the orchestrator, the reference store,
/// the loaded catalog and the baseline selection; the presentation layer only
/// ever holds an `Rc` to it.
pub struct DashboardController {
    orchestrator: Rc<BenchmarkOrchestrator>,
    references: Rc<dyn ReferenceStore>,
    simd_sources: SimdLevelSources,
    screenshots: ScreenshotService,
    default_timing: TimingConfig,
    catalog: RefCell<CatalogState>,
    simd_levels: RefCell<Vec<SimdLevelInfo>>,
    selected_simd: RefCell<Option<String>>,
    reference_index: RefCell<Vec<ReferenceIndexEntry>>,
    selection: RefCell<BaselineSelection>,
    snapshots: RefCell<SnapshotCache>,
}

impl DashboardController {
    pub fn new(
        orchestrator: Rc<BenchmarkOrchestrator>,
        references: Rc<dyn ReferenceStore>,
        simd_sources: SimdLevelSources,
        screenshots: ScreenshotService,
        default_timing: TimingConfig,
    ) -> Self {
        orchestrator.set_timing(default_timing);
        Self {
            orchestrator,
            references,
            simd_sources,
            screenshots,
            default_timing,
            catalog: RefCell::new(CatalogState::Loading),
            simd_levels: RefCell::new(Vec::new()),
            selected_simd: RefCell::new(None),
            reference_index: RefCell::new(Vec::new()),
            selection: RefCell::new(BaselineSelection::default()),
            snapshots: RefCell::new(SnapshotCache::default()),
        }
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&RunEvent) + 'static,
    {
        self.orchestrator.subscribe(handler);
    }

    pub fn mode(&self) -> ExecutionMode {
        self.orchestrator.router().mode()
    }

    pub fn available_modes(&self) -> Vec<ExecutionMode> {
        let router = self.orchestrator.router();
        let mut modes = Vec::with_capacity(2);
        if router.has_native() {
            modes.push(ExecutionMode::Native);
        }
        if router.has_wasm() {
            modes.push(ExecutionMode::Wasm);
        }
        modes
    }

    pub fn catalog_state(&self) -> CatalogState {
        self.catalog.borrow().clone()
    }

    pub fn catalog(&self) -> Option<BenchmarkCatalog> {
        match &*self.catalog.borrow() {
            CatalogState::Ready(catalog) => Some(catalog.clone()),
            _ => None,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.orchestrator.run_state()
    }

    pub fn results(&self) -> ResultSet {
        self.orchestrator.results()
    }

    /// Catalog loaded and nothing running.
    pub fn can_run(&self) -> bool {
        matches!(*self.catalog.borrow(), CatalogState::Ready(_)) && !self.orchestrator.is_running()
    }

    /// Replaces the catalog wholesale, then refreshes the SIMD levels of the
    /// active mode. A failure leaves the catalog in `Failed`.
    pub async fn load_catalog(&self) -> BenchResult<()> {
        *self.catalog.borrow_mut() = CatalogState::Loading;

        let source = self.orchestrator.router().catalog_source();
        let loaded = match source {
            Ok(source) => catalog_service::load_catalog(source.as_ref()).await,
            Err(err) => Err(err),
        };

        match loaded {
            Ok(catalog) => {
                *self.catalog.borrow_mut() = CatalogState::Ready(catalog);
            }
            Err(err) => {
                let message = format!("Catalog load failed: {err}");
                get_logger().error(LogComponent::Application("Dashboard"), &message);
                *self.catalog.borrow_mut() = CatalogState::Failed(err.to_string());
                return Err(err);
            }
        }

        let levels = self.simd_sources.load(self.mode()).await;
        self.set_simd_level(levels.first().map(|level| level.id.clone()));
        *self.simd_levels.borrow_mut() = levels;
        Ok(())
    }

    /// Refused while a batch runs. Results of the previous backend are
    /// dropped together with its catalog.
    pub async fn switch_mode(&self, mode: ExecutionMode) -> BenchResult<bool> {
        if mode == self.mode() {
            return Ok(false);
        }
        if self.orchestrator.with_router_mut(|router| router.set_mode(mode)).is_none() {
            get_logger().warn(
                LogComponent::Application("Dashboard"),
                "Backend switch refused while a batch runs",
            );
            return Ok(false);
        }

        let message = format!("Switched to {mode} mode");
        get_logger().info(LogComponent::Application("Dashboard"), &message);
        self.orchestrator.clear_results();
        self.load_catalog().await?;
        Ok(true)
    }

    pub fn simd_levels(&self) -> Vec<SimdLevelInfo> {
        self.simd_levels.borrow().clone()
    }

    pub fn selected_simd_level(&self) -> Option<String> {
        self.selected_simd.borrow().clone()
    }

    pub fn set_simd_level(&self, level: Option<String>) {
        self.orchestrator.router().select_simd_level(level.as_deref());
        *self.selected_simd.borrow_mut() = level;
    }

    pub fn timing(&self) -> TimingConfig {
        self.orchestrator.timing()
    }

    /// Parses raw input; unparsable fields keep the configured defaults.
    pub fn set_timing_input(&self, warmup: &str, iterations: &str) -> TimingConfig {
        let timing = TimingConfig::from_input(warmup, iterations, self.default_timing);
        self.orchestrator.set_timing(timing);
        timing
    }

    pub async fn run_ids(&self, ids: Vec<BenchmarkId>) -> BatchOutcome {
        if !self.can_run() {
            return BatchOutcome::Rejected;
        }
        self.orchestrator.run_batch(ids).await
    }

    pub async fn run_all(&self) -> BatchOutcome {
        let ids = self.catalog().map(|catalog| catalog.ids()).unwrap_or_default();
        self.run_ids(ids).await
    }

    pub async fn run_group(&self, group: BenchmarkGroup) -> BatchOutcome {
        let ids = self.catalog().map(|catalog| catalog.ids_in_group(group)).unwrap_or_default();
        self.run_ids(ids).await
    }

    pub async fn run_category(&self, category: &str) -> BatchOutcome {
        let ids = self
            .catalog()
            .map(|catalog| catalog.ids_in_category(category))
            .unwrap_or_default();
        self.run_ids(ids).await
    }

    pub fn abort(&self) {
        self.orchestrator.abort();
    }

    pub fn reference_index(&self) -> Vec<ReferenceIndexEntry> {
        self.reference_index.borrow().clone()
    }

    pub async fn refresh_references(&self) -> BenchResult<Vec<ReferenceIndexEntry>> {
        let index = self.references.list().await?;
        *self.reference_index.borrow_mut() = index.clone();
        Ok(index)
    }

    /// Saves the current results under `name` (sanitized).
    pub async fn save_reference(&self, name: &str) -> BenchResult<ReferenceName> {
        let entries = self.orchestrator.results().to_entries();
        let saved = self.references.save(name, &entries).await?;
        get_logger().info(
            LogComponent::Application("Dashboard"),
            &format!("Saved reference {saved} with {} result(s)", entries.len()),
        );

        // A cached body of the same name is stale now.
        self.snapshots.borrow_mut().remove(&saved);
        if self.selection.borrow().base.reference_name() == Some(&saved)
            || self.selection.borrow().compare.reference_name() == Some(&saved)
        {
            self.snapshots.borrow_mut().insert(saved.clone(), entries.into_iter().collect());
        }

        self.refresh_references().await?;
        Ok(saved)
    }

    /// Any selector pointing at the deleted reference falls back to none.
    pub async fn delete_reference(&self, name: &str) -> BenchResult<()> {
        self.references.delete(name).await?;
        if let Ok(name) = ReferenceName::sanitize(name) {
            self.selection.borrow_mut().forget_reference(&name);
            self.snapshots.borrow_mut().remove(&name);
        }
        self.refresh_references().await?;
        Ok(())
    }

    pub fn selection(&self) -> BaselineSelection {
        self.selection.borrow().clone()
    }

    /// Loads a reference body on first use. On failure the selection is left
    /// unchanged.
    pub async fn select_baseline(
        &self,
        slot: BaselineSlot,
        source: BaselineSource,
    ) -> BenchResult<()> {
        if let Some(name) = source.reference_name() {
            let cached = self.snapshots.borrow().contains(name);
            if !cached {
                let entries = self.references.load(name.value()).await?;
                self.snapshots.borrow_mut().insert(name.clone(), entries.into_iter().collect());
            }
        }
        self.selection.borrow_mut().set(slot, source);
        Ok(())
    }

    /// One row per catalog entry, compare column measured against base.
    pub fn comparison_rows(&self) -> Vec<ComparisonRow> {
        let Some(catalog) = self.catalog() else {
            return Vec::new();
        };
        let current = self.orchestrator.results();
        let selection = self.selection.borrow();
        let snapshots = self.snapshots.borrow();
        let base = baselines::resolve(&selection.base, &current, &snapshots);
        let compared = baselines::resolve(&selection.compare, &current, &snapshots);
        comparison::build_rows(catalog.benchmarks(), base, compared)
    }

    pub fn export_results(&self, stamp: &str) -> BenchResult<ExportDocument> {
        export::export_results(&self.orchestrator.results(), stamp)
    }

    pub async fn capture_screenshot(&self, id: &BenchmarkId) -> BenchResult<Screenshot> {
        let benchmark = self
            .catalog()
            .and_then(|catalog| catalog.find(id).cloned())
            .ok_or_else(|| {
                BenchError::BackendUnavailable(format!("{id} is not in the loaded catalog"))
            })?;
        self.screenshots.capture(self.mode(), &benchmark).await
    }

    pub fn can_capture(&self, id: &BenchmarkId) -> bool {
        self.catalog()
            .and_then(|catalog| catalog.find(id).cloned())
            .is_some_and(|benchmark| self.screenshots.supports(&benchmark))
    }
}
