//! Composition root: picks the executors and the reference store once, at
//! startup, and hands the controller to the view.

use std::rc::Rc;

use crate::application::{
    catalog_service::SimdLevelSources,
    dashboard::DashboardController,
    orchestrator::BenchmarkOrchestrator,
    router::ExecutorRouter,
    screenshot::ScreenshotService,
};
use crate::config::DashboardConfig;
use crate::domain::{
    benchmark::{HostBridge, ReferenceStore},
    graphics::GraphicsContext,
    logging::{LogComponent, get_logger},
};
use crate::infrastructure::{
    host::{HostReferenceStore, HostScreenshots, NativeExecutor, TauriHostBridge, host_available},
    main_thread::{JsBenchModule, MainThreadExecutor},
    services::GlooScheduler,
    storage::{BrowserReferenceStore, LocalStorageBackend},
    worker::WorkerExecutor,
};

pub async fn build_controller(config: &DashboardConfig) -> Rc<DashboardController> {
    let graphics = GraphicsContext::new();
    let host: Option<Rc<dyn HostBridge>> =
        host_available().then(|| Rc::new(TauriHostBridge::new()) as Rc<dyn HostBridge>);

    let mode = config.initial_mode(host.is_some());
    let mut router = ExecutorRouter::new(mode);
    let mut screenshots = ScreenshotService::new(graphics.clone());
    let mut simd_sources = SimdLevelSources::default();

    if let Some(host) = &host {
        router = router.with_native(Rc::new(NativeExecutor::new(Rc::clone(host))));
        screenshots = screenshots.with_native(Rc::new(HostScreenshots::new(Rc::clone(host))));
        simd_sources.host = Some(Rc::clone(host));
        get_logger().info(LogComponent::Presentation("Bootstrap"), "Native host detected");
    }

    match WorkerExecutor::spawn(&config.worker_script_url).await {
        Ok(worker) => router = router.with_worker(Rc::new(worker)),
        Err(err) => {
            let message = format!("No wasm worker: {err}");
            get_logger().warn(LogComponent::Presentation("Bootstrap"), &message);
        }
    }

    match JsBenchModule::attach(&config.module_global) {
        Ok(module) => {
            if let Err(err) = module.init_hybrid() {
                get_logger().warn(
                    LogComponent::Presentation("Bootstrap"),
                    &format!("Hybrid renderer unavailable, using the worker: {err}"),
                );
            }
            let main_thread = MainThreadExecutor::new(module.clone(), graphics.clone());
            router = router.with_main_thread(Rc::new(main_thread));
            screenshots = screenshots.with_wasm(module.clone());
            simd_sources.module = Some(module);
        }
        Err(err) => {
            let message = format!("No main-thread module: {err}");
            get_logger().debug(LogComponent::Presentation("Bootstrap"), &message);
        }
    }

    let references: Rc<dyn ReferenceStore> = match &host {
        Some(host) => Rc::new(HostReferenceStore::new(Rc::clone(host))),
        None => {
            let namespace = config.storage_namespace.clone();
            Rc::new(BrowserReferenceStore::new(LocalStorageBackend::new(), namespace))
        }
    };

    let orchestrator = Rc::new(
        BenchmarkOrchestrator::new(router, Rc::new(GlooScheduler::new()))
            .with_phase_label_delay(config.phase_label_delay()),
    );
    let controller = Rc::new(DashboardController::new(
        orchestrator,
        references,
        simd_sources,
        screenshots,
        config.timing(),
    ));

    // Failures are logged and reflected in the catalog state.
    let _ = controller.load_catalog().await;
    if let Err(err) = controller.refresh_references().await {
        let message = format!("References unavailable: {err}");
        get_logger().warn(LogComponent::Presentation("Bootstrap"), &message);
    }

    controller
}
