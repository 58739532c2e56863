use std::cell::Cell;
use std::rc::Rc;

use crate::domain::errors::{BenchError, BenchResult};

/// The single main-thread graphics context. Main-thread benchmark runs and
/// screenshot capture each hold a lease for their whole duration.
#[derive(Debug, Clone, Default)]
pub struct GraphicsContext {
    in_use: Rc<Cell<bool>>,
}

impl GraphicsContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> BenchResult<GraphicsLease> {
        if self.in_use.replace(true) {
            return Err(BenchError::GraphicsContextBusy);
        }
        Ok(GraphicsLease { in_use: Rc::clone(&self.in_use) })
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use.get()
    }
}

/// Released on drop.
#[derive(Debug)]
pub struct GraphicsLease {
    in_use: Rc<Cell<bool>>,
}

impl Drop for GraphicsLease {
    fn drop(&mut self) {
        self.in_use.set(false);
    }
}
