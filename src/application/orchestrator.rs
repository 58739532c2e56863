use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::{FutureExt, pin_mut, select};

use crate::application::{router::ExecutorRouter, scheduler::Scheduler};
use crate::domain::{
    benchmark::{BenchmarkId, BenchmarkResult, ExecutorKind, ResultSet, RunPhase, TimingConfig},
    errors::BenchResult,
    events::{EventDispatcher, InMemoryEventDispatcher, RunEvent},
    logging::{LogComponent, get_logger},
    run_state::RunState,
};

/// Delay before the phase label switches from warming up to measuring.
pub const DEFAULT_PHASE_LABEL_DELAY: Duration = Duration::from_millis(100);

/// How a `run_batch` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Another batch was already running; nothing happened.
    Rejected,
    Finished { completed: usize, failed: usize, aborted: bool },
}

/// Runs queued benchmarks one at a time against the routed executor and
/// keeps the current result set.
pub struct BenchmarkOrchestrator {
    router: RefCell<ExecutorRouter>,
    scheduler: Rc<dyn Scheduler>,
    state: RefCell<RunState>,
    results: RefCell<ResultSet>,
    timing: Cell<TimingConfig>,
    phase_label_delay: Duration,
    events: RefCell<InMemoryEventDispatcher>,
}

impl BenchmarkOrchestrator {
    pub fn new(router: ExecutorRouter, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            router: RefCell::new(router),
            scheduler,
            state: RefCell::new(RunState::new()),
            results: RefCell::new(ResultSet::new()),
            timing: Cell::new(TimingConfig::default()),
            phase_label_delay: DEFAULT_PHASE_LABEL_DELAY,
            events: RefCell::new(InMemoryEventDispatcher::new()),
        }
    }

    pub fn with_phase_label_delay(mut self, delay: Duration) -> Self {
        self.phase_label_delay = delay;
        self
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&RunEvent) + 'static,
    {
        self.events.borrow_mut().subscribe_to_run_events(handler);
    }

    pub fn router(&self) -> Ref<'_, ExecutorRouter> {
        self.router.borrow()
    }

    /// Refused while a batch runs.
    pub fn with_router_mut<R>(&self, f: impl FnOnce(&mut ExecutorRouter) -> R) -> Option<R> {
        if self.is_running() {
            return None;
        }
        Some(f(&mut self.router.borrow_mut()))
    }

    pub fn run_state(&self) -> RunState {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running()
    }

    pub fn results(&self) -> ResultSet {
        self.results.borrow().clone()
    }

    pub fn mean_ns(&self, id: &BenchmarkId) -> Option<f64> {
        self.results.borrow().mean_ns(id)
    }

    pub fn clear_results(&self) {
        self.results.borrow_mut().clear();
    }

    /// Read at the start of every run, so edits apply to the next queued id.
    pub fn set_timing(&self, timing: TimingConfig) {
        self.timing.set(timing);
    }

    pub fn timing(&self) -> TimingConfig {
        self.timing.get()
    }

    /// Takes effect before the next queued id; an in-flight run finishes.
    pub fn abort(&self) {
        if self.state.borrow_mut().request_abort() {
            get_logger().info(LogComponent::Application("Orchestrator"), "Abort requested");
        }
    }

    /// Runs `ids` in order. A failing id is logged and skipped; the batch
    /// goes on.
    pub async fn run_batch(&self, ids: Vec<BenchmarkId>) -> BatchOutcome {
        if self.is_running() {
            get_logger().warn(
                LogComponent::Application("Orchestrator"),
                "Batch requested while another batch is running; ignoring",
            );
            return BatchOutcome::Rejected;
        }

        {
            let mut results = self.results.borrow_mut();
            for id in &ids {
                results.remove(id);
            }
        }
        self.state.borrow_mut().begin_batch(&ids);
        get_logger().info(
            LogComponent::Application("Orchestrator"),
            &format!("Starting batch of {} benchmark(s)", ids.len()),
        );
        self.publish(RunEvent::BatchStarted { queued: ids.clone() });

        let mut completed = 0;
        let mut failed = 0;
        let mut aborted = false;

        for id in ids {
            if self.state.borrow().abort_requested() {
                aborted = true;
                break;
            }

            let timing = self.timing.get();
            self.state.borrow_mut().start(&id);
            self.publish(RunEvent::PhaseChanged { id: id.clone(), phase: RunPhase::WarmingUp });

            match self.execute(&id, &timing).await {
                Ok(result) => {
                    completed += 1;
                    let result = BenchmarkResult { id: id.clone(), ..result };
                    crate::log_debug!(
                        LogComponent::Application("Orchestrator"),
                        "{} finished: {:.1} ns",
                        id,
                        result.mean_ns()
                    );
                    self.results.borrow_mut().insert(result.clone());
                    self.publish(RunEvent::ResultRecorded { result });
                }
                Err(err) => {
                    failed += 1;
                    let message = format!("{id}: {err}");
                    get_logger().error(LogComponent::Application("Orchestrator"), &message);
                    self.publish(RunEvent::RunFailed { id: id.clone(), reason: err.to_string() });
                }
            }

            self.state.borrow_mut().finish_current();
        }

        if aborted {
            let skipped = self.state.borrow().queued().len();
            get_logger().info(
                LogComponent::Application("Orchestrator"),
                &format!("Batch aborted; {skipped} queued benchmark(s) skipped"),
            );
        }
        self.state.borrow_mut().end_batch();
        self.publish(RunEvent::BatchFinished { completed, failed, aborted });

        BatchOutcome::Finished { completed, failed, aborted }
    }

    async fn execute(
        &self,
        id: &BenchmarkId,
        timing: &TimingConfig,
    ) -> BenchResult<BenchmarkResult> {
        let executor = self.router.borrow().select(id)?;

        if executor.kind() == ExecutorKind::MainThread {
            // The main-thread call blocks; let the running state render first.
            self.scheduler.yield_now().await;
        }

        let call = executor.run(id, timing).fuse();
        let label = self.scheduler.sleep(self.phase_label_delay).fuse();
        pin_mut!(call, label);

        loop {
            select! {
                outcome = call => return outcome,
                () = label => self.set_phase(id, RunPhase::Measuring),
            }
        }
    }

    fn set_phase(&self, id: &BenchmarkId, phase: RunPhase) {
        if self.state.borrow_mut().set_phase(id, phase) {
            self.publish(RunEvent::PhaseChanged { id: id.clone(), phase });
        }
    }

    fn publish(&self, event: RunEvent) {
        debug_assert!(self.state.borrow().is_consistent());
        self.events.borrow().publish_run_event(event);
    }
}
