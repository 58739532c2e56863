mod common;

use bench_dashboard_wasm::domain::{
    benchmark::{BenchmarkExecutor, BenchmarkId, ExecutorKind, TimingConfig},
    errors::BenchError,
    graphics::GraphicsContext,
};
use bench_dashboard_wasm::infrastructure::main_thread::MainThreadExecutor;
use common::FakeModule;
use futures::executor::block_on;

fn run(executor: &MainThreadExecutor, id: &str) -> Result<f64, BenchError> {
    let id = BenchmarkId::from(id);
    block_on(executor.run(&id, &TimingConfig::default())).map(|result| result.mean_ns())
}

#[test]
fn runs_known_ids_on_the_module() {
    let module = FakeModule::new(&["scene_hybrid/tiger"]);
    let graphics = GraphicsContext::new();
    let executor = MainThreadExecutor::new(module.clone(), graphics.clone());

    assert_eq!(executor.kind(), ExecutorKind::MainThread);
    assert_eq!(run(&executor, "scene_hybrid/tiger"), Ok(7.5));
    assert_eq!(*module.runs.borrow(), [BenchmarkId::from("scene_hybrid/tiger")]);
    assert!(!graphics.is_in_use());
}

#[test]
fn unknown_ids_fail_the_run() {
    let executor = MainThreadExecutor::new(FakeModule::new(&[]), GraphicsContext::new());
    assert_eq!(
        run(&executor, "vello_hybrid/missing"),
        Err(BenchError::run_failed("vello_hybrid/missing", "unknown benchmark"))
    );
}

#[test]
fn module_that_is_not_ready_is_unavailable() {
    let module = FakeModule::new(&["scene_hybrid/tiger"]);
    module.ready.set(false);
    let executor = MainThreadExecutor::new(module.clone(), GraphicsContext::new());

    assert!(matches!(run(&executor, "scene_hybrid/tiger"), Err(BenchError::BackendUnavailable(_))));
    assert!(module.runs.borrow().is_empty());
}

#[test]
fn busy_graphics_context_fails_the_run() {
    let module = FakeModule::new(&["scene_hybrid/tiger"]);
    let graphics = GraphicsContext::new();
    let executor = MainThreadExecutor::new(module.clone(), graphics.clone());

    let lease = graphics.try_acquire().unwrap();
    assert!(matches!(run(&executor, "scene_hybrid/tiger"), Err(BenchError::RunFailed { .. })));
    assert!(module.runs.borrow().is_empty());

    drop(lease);
    assert_eq!(run(&executor, "scene_hybrid/tiger"), Ok(7.5));
}

#[test]
fn cannot_list_benchmarks() {
    let executor = MainThreadExecutor::new(FakeModule::new(&[]), GraphicsContext::new());
    assert!(matches!(block_on(executor.list_benchmarks()), Err(BenchError::BackendUnavailable(_))));
}
