use std::collections::BTreeMap;

use futures::channel::oneshot;

/// What happened to a response handed to [`PendingRequests::resolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Delivered,
    /// Delivered to the newest request; this many older ones were cancelled.
    Superseded { cancelled: usize },
    /// Nothing was waiting for it.
    Unmatched,
}

/// In-flight worker requests keyed by request id.
///
/// A response naming its request id completes exactly that request. A
/// response without one completes the most recent request and cancels all
/// older ones, so a caller that issued two requests without waiting sees the
/// first one fail.
#[derive(Debug)]
pub struct PendingRequests<T> {
    next_id: u64,
    pending: BTreeMap<u64, oneshot::Sender<T>>,
}

impl<T> Default for PendingRequests<T> {
    fn default() -> Self {
        Self { next_id: 1, pending: BTreeMap::new() }
    }
}

impl<T> PendingRequests<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self) -> (u64, oneshot::Receiver<T>) {
        let id = self.next_id;
        self.next_id += 1;
        let (sender, receiver) = oneshot::channel();
        self.pending.insert(id, sender);
        (id, receiver)
    }

    pub fn resolve(&mut self, request_id: Option<u64>, value: T) -> Resolution {
        match request_id {
            Some(id) => match self.pending.remove(&id) {
                Some(sender) => {
                    let _ = sender.send(value);
                    Resolution::Delivered
                }
                None => Resolution::Unmatched,
            },
            None => {
                let Some((_, sender)) = self.pending.pop_last() else {
                    return Resolution::Unmatched;
                };
                let cancelled = self.pending.len();
                self.pending.clear();
                let _ = sender.send(value);
                if cancelled == 0 {
                    Resolution::Delivered
                } else {
                    Resolution::Superseded { cancelled }
                }
            }
        }
    }

    /// Cancels every waiter, e.g. after the worker died.
    pub fn fail_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn forget(&mut self, request_id: u64) {
        self.pending.remove(&request_id);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
