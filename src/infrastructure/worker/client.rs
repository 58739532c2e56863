use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{ErrorEvent, MessageEvent, Worker, WorkerOptions, WorkerType};

use super::correlation::{PendingRequests, Resolution};
use super::protocol::{WorkerRequest, WorkerResponse};
use crate::domain::{
    benchmark::{
        Benchmark, BenchmarkExecutor, BenchmarkId, BenchmarkResult, ExecutorKind, TimingConfig,
    },
    errors::{BenchError, BenchResult},
    logging::{LogComponent, get_logger},
};

type Pending = Rc<RefCell<PendingRequests<WorkerResponse>>>;

fn js_error(value: &wasm_bindgen::JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Runs benchmarks in a module worker holding the computation module
pub struct WorkerExecutor {
    worker: Worker,
    pending: Pending,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(ErrorEvent)>,
}

impl WorkerExecutor {
    /// Starts the worker and waits until it has loaded its module.
    pub async fn spawn(script_url: &str) -> BenchResult<Self> {
        let options = WorkerOptions::new();
        options.set_type(WorkerType::Module);
        let worker = Worker::new_with_options(script_url, &options).map_err(|e| {
            BenchError::BackendUnavailable(format!("worker {script_url}: {}", js_error(&e)))
        })?;

        let pending: Pending = Rc::new(RefCell::new(PendingRequests::new()));

        let on_message = {
            let pending = Rc::clone(&pending);
            Closure::wrap(Box::new(move |event: MessageEvent| {
                let response = js_sys::JSON::stringify(&event.data())
                    .ok()
                    .and_then(|text| text.as_string())
                    .ok_or_else(|| "non-JSON worker message".to_string())
                    .and_then(|text| {
                        serde_json::from_str::<WorkerResponse>(&text).map_err(|e| e.to_string())
                    });
                match response {
                    Ok(response) => {
                        let request_id = response.request_id();
                        match pending.borrow_mut().resolve(request_id, response) {
                            Resolution::Delivered => {}
                            Resolution::Superseded { cancelled } => get_logger().warn(
                                LogComponent::Infrastructure("Worker"),
                                &format!("Uncorrelated response cancelled {cancelled} request(s)"),
                            ),
                            Resolution::Unmatched => get_logger().warn(
                                LogComponent::Infrastructure("Worker"),
                                &format!("Dropping response for unknown request {request_id:?}"),
                            ),
                        }
                    }
                    Err(err) => get_logger().error(
                        LogComponent::Infrastructure("Worker"),
                        &format!("Unreadable worker message: {err}"),
                    ),
                }
            }) as Box<dyn FnMut(MessageEvent)>)
        };

        let on_error = {
            let pending = Rc::clone(&pending);
            Closure::wrap(Box::new(move |event: ErrorEvent| {
                let failed = pending.borrow_mut().fail_all();
                get_logger().error(
                    LogComponent::Infrastructure("Worker"),
                    &format!("Worker error: {} ({failed} request(s) cancelled)", event.message()),
                );
            }) as Box<dyn FnMut(ErrorEvent)>)
        };

        worker.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        worker.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let executor = Self { worker, pending, _on_message: on_message, _on_error: on_error };
        executor.request(|request_id| WorkerRequest::Load { request_id }).await?.into_loaded()?;
        let message = format!("Worker {script_url} loaded");
        get_logger().info(LogComponent::Infrastructure("Worker"), &message);
        Ok(executor)
    }

    async fn request(
        &self,
        build: impl FnOnce(u64) -> WorkerRequest,
    ) -> BenchResult<WorkerResponse> {
        let (request_id, receiver) = self.pending.borrow_mut().register();
        let request = build(request_id);

        let message = js_sys::JSON::parse(&serde_json::to_string(&request)?)
            .map_err(|e| BenchError::Serialization(js_error(&e)))?;
        if let Err(e) = self.worker.post_message(&message) {
            self.pending.borrow_mut().forget(request_id);
            return Err(BenchError::BackendUnavailable(js_error(&e)));
        }

        receiver.await.map_err(|_| {
            BenchError::BackendUnavailable(format!("worker dropped request {request_id}"))
        })
    }
}

impl BenchmarkExecutor for WorkerExecutor {
    fn kind(&self) -> ExecutorKind {
        ExecutorKind::Worker
    }

    fn list_benchmarks(&self) -> LocalBoxFuture<'_, BenchResult<Vec<Benchmark>>> {
        Box::pin(async move {
            let response = self.request(|request_id| WorkerRequest::List { request_id }).await?;
            response.into_benchmarks()
        })
    }

    fn run<'a>(
        &'a self,
        id: &'a BenchmarkId,
        timing: &'a TimingConfig,
    ) -> LocalBoxFuture<'a, BenchResult<BenchmarkResult>> {
        Box::pin(async move {
            let response = self
                .request(|request_id| WorkerRequest::run(request_id, id, timing))
                .await
                .map_err(|e| BenchError::run_failed(id.value(), e.to_string()))?;
            response.into_result(id)
        })
    }
}

impl Drop for WorkerExecutor {
    fn drop(&mut self) {
        self.worker.set_onmessage(None);
        self.worker.set_onerror(None);
        self.worker.terminate();
    }
}
