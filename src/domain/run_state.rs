use std::collections::BTreeSet;

use crate::domain::benchmark::{BenchmarkId, RunPhase};

/// Batch progress owned by the orchestrator.
///
/// Invariants: `running` is set only while a batch is running, and the
/// running id is never also queued.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    queued: BTreeSet<BenchmarkId>,
    running: Option<BenchmarkId>,
    phase: Option<RunPhase>,
    is_running: bool,
    abort_requested: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queued(&self) -> &BTreeSet<BenchmarkId> {
        &self.queued
    }

    pub fn is_queued(&self, id: &BenchmarkId) -> bool {
        self.queued.contains(id)
    }

    pub fn running(&self) -> Option<&BenchmarkId> {
        self.running.as_ref()
    }

    pub fn phase(&self) -> Option<RunPhase> {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn abort_requested(&self) -> bool {
        self.abort_requested
    }

    /// Queues every id at once.
    pub fn begin_batch<'a>(&mut self, ids: impl IntoIterator<Item = &'a BenchmarkId>) {
        self.queued = ids.into_iter().cloned().collect();
        self.running = None;
        self.phase = None;
        self.is_running = true;
        self.abort_requested = false;
    }

    /// Moves `id` out of the queue and marks it warming up.
    pub fn start(&mut self, id: &BenchmarkId) {
        self.queued.remove(id);
        self.running = Some(id.clone());
        self.phase = Some(RunPhase::WarmingUp);
    }

    /// Only the currently running id can change phase.
    pub fn set_phase(&mut self, id: &BenchmarkId, phase: RunPhase) -> bool {
        if self.running.as_ref() == Some(id) {
            self.phase = Some(phase);
            true
        } else {
            false
        }
    }

    pub fn finish_current(&mut self) {
        self.running = None;
        self.phase = None;
    }

    /// Ignored when no batch is running.
    pub fn request_abort(&mut self) -> bool {
        if self.is_running {
            self.abort_requested = true;
        }
        self.abort_requested
    }

    pub fn end_batch(&mut self) {
        *self = Self::default();
    }

    pub fn is_consistent(&self) -> bool {
        let running_ok = match &self.running {
            Some(id) => self.is_running && !self.queued.contains(id) && self.phase.is_some(),
            None => self.phase.is_none(),
        };
        let idle_ok = self.is_running || (self.queued.is_empty() && !self.abort_requested);
        running_ok && idle_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<BenchmarkId> {
        raw.iter().map(|id| BenchmarkId::from(*id)).collect()
    }

    #[test]
    fn lifecycle_keeps_invariants() {
        let batch = ids(&["a", "b"]);
        let mut state = RunState::new();
        state.begin_batch(&batch);
        assert!(state.is_consistent());
        assert_eq!(state.queued().len(), 2);

        state.start(&batch[0]);
        assert!(state.is_consistent());
        assert!(!state.is_queued(&batch[0]));
        assert_eq!(state.phase(), Some(RunPhase::WarmingUp));

        assert!(!state.set_phase(&batch[1], RunPhase::Measuring));
        assert!(state.set_phase(&batch[0], RunPhase::Measuring));

        state.finish_current();
        state.end_batch();
        assert_eq!(state, RunState::default());
    }

    #[test]
    fn abort_outside_batch_is_ignored() {
        let mut state = RunState::new();
        assert!(!state.request_abort());
        assert!(state.is_consistent());
    }
}
