use crate::domain::benchmark::{BenchmarkId, BenchmarkResult, RunPhase};

/// Progress of a batch, published in the order things happen
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    BatchStarted { queued: Vec<BenchmarkId> },
    PhaseChanged { id: BenchmarkId, phase: RunPhase },
    ResultRecorded { result: BenchmarkResult },
    RunFailed { id: BenchmarkId, reason: String },
    BatchFinished { completed: usize, failed: usize, aborted: bool },
}

pub trait EventDispatcher {
    fn publish_run_event(&self, event: RunEvent);
}

/// Synchronous fan-out to registered handlers
#[derive(Default)]
pub struct InMemoryEventDispatcher {
    run_handlers: Vec<Box<dyn Fn(&RunEvent)>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_to_run_events<F>(&mut self, handler: F)
    where
        F: Fn(&RunEvent) + 'static,
    {
        self.run_handlers.push(Box::new(handler));
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn publish_run_event(&self, event: RunEvent) {
        for handler in &self.run_handlers {
            handler(&event);
        }
    }
}
