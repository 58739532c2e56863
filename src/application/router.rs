use std::rc::Rc;

use crate::domain::{
    benchmark::{BenchmarkExecutor, BenchmarkId, ExecutionMode},
    errors::{BenchError, BenchResult},
};

/// Picks the executor for a benchmark from the ones available this session.
pub struct ExecutorRouter {
    mode: ExecutionMode,
    native: Option<Rc<dyn BenchmarkExecutor>>,
    worker: Option<Rc<dyn BenchmarkExecutor>>,
    main_thread: Option<Rc<dyn BenchmarkExecutor>>,
}

impl ExecutorRouter {
    pub fn new(mode: ExecutionMode) -> Self {
        Self { mode, native: None, worker: None, main_thread: None }
    }

    pub fn with_native(mut self, executor: Rc<dyn BenchmarkExecutor>) -> Self {
        self.native = Some(executor);
        self
    }

    pub fn with_worker(mut self, executor: Rc<dyn BenchmarkExecutor>) -> Self {
        self.worker = Some(executor);
        self
    }

    pub fn with_main_thread(mut self, executor: Rc<dyn BenchmarkExecutor>) -> Self {
        self.main_thread = Some(executor);
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ExecutionMode) {
        self.mode = mode;
    }

    pub fn has_native(&self) -> bool {
        self.native.is_some()
    }

    pub fn has_wasm(&self) -> bool {
        self.worker.is_some() || self.main_thread.is_some()
    }

    fn native_active(&self) -> Option<&Rc<dyn BenchmarkExecutor>> {
        match self.mode {
            ExecutionMode::Native => self.native.as_ref(),
            ExecutionMode::Wasm => None,
        }
    }

    /// Native when selected and present, else the main-thread executor for
    /// ids that need the graphics context once it is initialised, else the
    /// worker.
    pub fn select(&self, id: &BenchmarkId) -> BenchResult<Rc<dyn BenchmarkExecutor>> {
        if let Some(native) = self.native_active() {
            return Ok(Rc::clone(native));
        }
        if id.requires_main_thread() {
            let ready = self.main_thread.as_ref().filter(|executor| executor.is_ready());
            if let Some(main_thread) = ready {
                return Ok(Rc::clone(main_thread));
            }
        }
        self.worker.as_ref().map(Rc::clone).ok_or_else(|| {
            let message = format!("no executor can run {id} in {} mode", self.mode);
            BenchError::BackendUnavailable(message)
        })
    }

    pub fn select_simd_level(&self, level: Option<&str>) {
        for executor in [&self.native, &self.worker, &self.main_thread].into_iter().flatten() {
            executor.select_simd_level(level);
        }
    }

    /// Executor whose listing is the catalog for the current mode.
    pub fn catalog_source(&self) -> BenchResult<Rc<dyn BenchmarkExecutor>> {
        self.native_active().or(self.worker.as_ref()).map(Rc::clone).ok_or_else(|| {
            let message = format!("no benchmark listing available in {} mode", self.mode);
            BenchError::BackendUnavailable(message)
        })
    }
}
