use std::time::Duration;

use futures::future::LocalBoxFuture;

/// Cooperative scheduling on the orchestrating thread
pub trait Scheduler {
    /// Lets queued tasks (rendering included) run once before continuing.
    fn yield_now(&self) -> LocalBoxFuture<'static, ()>;

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}
