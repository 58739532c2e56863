#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use bench_dashboard_wasm::application::scheduler::Scheduler;
use bench_dashboard_wasm::domain::{
    benchmark::{
        Benchmark, BenchmarkExecutor, BenchmarkId, BenchmarkResult, BlockingBenchModule,
        ExecutorKind, HostBridge, Screenshot, ScreenshotProvider, SimdLevelInfo, TimingConfig,
    },
    errors::{BenchError, BenchResult},
};
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use serde_json::{Value, json};

#[derive(Default, Clone, Copy, PartialEq, Eq)]
enum Timers {
    #[default]
    Never,
    Immediate,
    Held,
}

/// Yields immediately. The phase timer never fires, fires at once, or waits
/// for the test to fire it through `timers`.
#[derive(Default)]
pub struct TestScheduler {
    mode: Timers,
    pub yields: Cell<usize>,
    pub timers: RefCell<Vec<oneshot::Sender<()>>>,
}

impl TestScheduler {
    pub fn silent() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn eager_label() -> Rc<Self> {
        Rc::new(Self { mode: Timers::Immediate, ..Self::default() })
    }

    pub fn held_timers() -> Rc<Self> {
        Rc::new(Self { mode: Timers::Held, ..Self::default() })
    }
}

impl Scheduler for TestScheduler {
    fn yield_now(&self) -> LocalBoxFuture<'static, ()> {
        self.yields.set(self.yields.get() + 1);
        future::ready(()).boxed_local()
    }

    fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
        match self.mode {
            Timers::Never => future::pending().boxed_local(),
            Timers::Immediate => future::ready(()).boxed_local(),
            Timers::Held => {
                let (sender, receiver) = oneshot::channel();
                self.timers.borrow_mut().push(sender);
                receiver.map(|_| ()).boxed_local()
            }
        }
    }
}

pub fn benchmarks(ids: &[&str]) -> Vec<Benchmark> {
    ids.iter()
        .map(|id| {
            let id = BenchmarkId::from(*id);
            Benchmark::new(id.clone(), id.name(), id.category())
        })
        .collect()
}

pub fn ids(ids: &[&str]) -> Vec<BenchmarkId> {
    ids.iter().map(|id| BenchmarkId::from(*id)).collect()
}

/// Scriptable executor. Ids in `failing` error out; gated ids wait until
/// their gate is released.
pub struct MockExecutor {
    kind: ExecutorKind,
    listing: Option<Vec<Benchmark>>,
    failing: HashSet<BenchmarkId>,
    means: HashMap<BenchmarkId, f64>,
    gates: RefCell<HashMap<BenchmarkId, oneshot::Receiver<()>>>,
    pub calls: RefCell<Vec<BenchmarkId>>,
    pub timings: RefCell<Vec<TimingConfig>>,
    pub simd_level: RefCell<Option<String>>,
}

impl MockExecutor {
    pub fn new(kind: ExecutorKind) -> Self {
        Self {
            kind,
            listing: None,
            failing: HashSet::new(),
            means: HashMap::new(),
            gates: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            timings: RefCell::new(Vec::new()),
            simd_level: RefCell::new(None),
        }
    }

    pub fn listing(mut self, ids: &[&str]) -> Self {
        self.listing = Some(benchmarks(ids));
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(BenchmarkId::from(id));
        self
    }

    pub fn mean(mut self, id: &str, mean_ns: f64) -> Self {
        self.means.insert(BenchmarkId::from(id), mean_ns);
        self
    }

    /// The run for `id` blocks until the returned sender fires or drops.
    pub fn gate(&self, id: &str) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.gates.borrow_mut().insert(BenchmarkId::from(id), receiver);
        sender
    }

    pub fn call_ids(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|id| id.to_string()).collect()
    }
}

impl BenchmarkExecutor for MockExecutor {
    fn kind(&self) -> ExecutorKind {
        self.kind
    }

    fn list_benchmarks(&self) -> LocalBoxFuture<'_, BenchResult<Vec<Benchmark>>> {
        let listing = self
            .listing
            .clone()
            .ok_or_else(|| BenchError::BackendUnavailable(format!("{} cannot list", self.kind)));
        future::ready(listing).boxed_local()
    }

    fn run<'a>(
        &'a self,
        id: &'a BenchmarkId,
        timing: &'a TimingConfig,
    ) -> LocalBoxFuture<'a, BenchResult<BenchmarkResult>> {
        async move {
            self.calls.borrow_mut().push(id.clone());
            self.timings.borrow_mut().push(*timing);
            let gate = self.gates.borrow_mut().remove(id);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.failing.contains(id) {
                return Err(BenchError::run_failed(id.value(), "scripted failure"));
            }
            Ok(BenchmarkResult::new(id.clone(), self.means.get(id).copied().unwrap_or(100.0)))
        }
        .boxed_local()
    }

    fn select_simd_level(&self, level: Option<&str>) {
        *self.simd_level.borrow_mut() = level.map(str::to_string);
    }
}

/// In-memory stand-in for the native host process.
#[derive(Default)]
pub struct FakeHost {
    pub calls: RefCell<Vec<(&'static str, Value)>>,
    references: RefCell<BTreeMap<String, (u64, Value)>>,
    clock: Cell<u64>,
    pub listing: RefCell<Vec<Benchmark>>,
    pub offline: Cell<bool>,
}

impl FakeHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn with_listing(ids: &[&str]) -> Rc<Self> {
        let host = Self::new();
        *host.listing.borrow_mut() = benchmarks(ids);
        host
    }

    pub fn commands(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|(command, _)| *command).collect()
    }

    pub fn last_args(&self, command: &str) -> Option<Value> {
        self.calls.borrow().iter().rev().find(|(c, _)| *c == command).map(|(_, args)| args.clone())
    }

    fn handle(&self, command: &'static str, args: &Value) -> BenchResult<Value> {
        if self.offline.get() {
            return Err(BenchError::Host("host is not responding".to_string()));
        }
        let name = || args["name"].as_str().unwrap_or_default().to_string();
        match command {
            "list_benchmarks" => Ok(serde_json::to_value(&*self.listing.borrow())?),
            "get_simd_levels" => {
                Ok(json!([{"id": "scalar", "name": "Scalar"}, {"id": "avx2", "name": "AVX2"}]))
            }
            "run_benchmark" => {
                let id = args["id"].as_str().unwrap_or_default();
                if id.starts_with("broken/") {
                    return Err(BenchError::Host(format!("panic while running {id}")));
                }
                Ok(json!({
                    "id": id,
                    "category": id.split('/').next().unwrap_or_default(),
                    "name": id.split_once('/').map(|(_, n)| n).unwrap_or(id),
                    "simd_variant": args["simdLevel"].as_str().unwrap_or("scalar"),
                    "statistics": {"mean_ns": 42.0, "iterations": args["iterations"]},
                    "timestamp_ms": 1_700_000_000_000u64,
                }))
            }
            "screenshot" => Ok(json!({"rgba_base64": "AAAA/w==", "width": 1, "height": 1})),
            "list_references" => {
                let refs = self.references.borrow();
                let mut entries: Vec<Value> = refs
                    .iter()
                    .map(|(name, (created_at, results))| {
                        json!({
                            "name": name,
                            "created_at": created_at,
                            "benchmark_count": results.as_array().map(Vec::len).unwrap_or(0),
                        })
                    })
                    .collect();
                // Host lists oldest first; the store must sort.
                entries.sort_by_key(|entry| entry["created_at"].as_u64());
                Ok(Value::Array(entries))
            }
            "save_reference" => {
                self.clock.set(self.clock.get() + 10);
                let entry = (self.clock.get(), args["results"].clone());
                self.references.borrow_mut().insert(name(), entry);
                Ok(Value::Null)
            }
            "load_reference" => self
                .references
                .borrow()
                .get(&name())
                .map(|(_, results)| results.clone())
                .ok_or_else(|| BenchError::Host(format!("Reference '{}' not found", name()))),
            "delete_reference" => match self.references.borrow_mut().remove(&name()) {
                Some(_) => Ok(Value::Null),
                None => Err(BenchError::Host(format!("reference {} not found", name()))),
            },
            other => Err(BenchError::Host(format!("unknown command {other}"))),
        }
    }
}

impl HostBridge for FakeHost {
    fn invoke(&self, command: &'static str, args: Value) -> LocalBoxFuture<'_, BenchResult<Value>> {
        let response = self.handle(command, &args);
        self.calls.borrow_mut().push((command, args));
        future::ready(response).boxed_local()
    }
}

/// Blocking module double for the main-thread executor.
pub struct FakeModule {
    pub ready: Cell<bool>,
    pub known: HashSet<BenchmarkId>,
    pub runs: RefCell<Vec<BenchmarkId>>,
}

impl FakeModule {
    pub fn new(known: &[&str]) -> Rc<Self> {
        Rc::new(Self {
            ready: Cell::new(true),
            known: ids(known).into_iter().collect(),
            runs: RefCell::new(Vec::new()),
        })
    }
}

impl BlockingBenchModule for FakeModule {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn run_blocking(
        &self,
        id: &BenchmarkId,
        _timing: &TimingConfig,
    ) -> BenchResult<Option<BenchmarkResult>> {
        self.runs.borrow_mut().push(id.clone());
        Ok(self.known.contains(id).then(|| BenchmarkResult::new(id.clone(), 7.5)))
    }

    fn simd_levels(&self) -> BenchResult<Vec<SimdLevelInfo>> {
        Ok(vec![SimdLevelInfo { id: "simd128".to_string(), name: "SIMD128".to_string() }])
    }
}

/// Returns a fixed 2x1 frame.
#[derive(Default)]
pub struct FakeRenderer {
    pub captures: Cell<usize>,
}

impl ScreenshotProvider for FakeRenderer {
    fn capture<'a>(
        &'a self,
        _scene_name: &'a str,
        _category: &'a str,
    ) -> LocalBoxFuture<'a, BenchResult<Screenshot>> {
        self.captures.set(self.captures.get() + 1);
        future::ready(Ok(Screenshot { width: 2, height: 1, rgba: vec![255; 8] })).boxed_local()
    }
}
