//! Browser implementations of the logging, clock and scheduling seams.

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::time::Duration;

    use futures::future::LocalBoxFuture;
    use gloo_timers::future::{TimeoutFuture, sleep};

    use crate::application::scheduler::Scheduler;
    use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider};

    /// Writes log lines to the devtools console
    pub struct ConsoleLogger {
        min_level: LogLevel,
    }

    impl ConsoleLogger {
        pub fn new(min_level: LogLevel) -> Self {
            Self { min_level }
        }
    }

    impl Logger for ConsoleLogger {
        fn log(&self, entry: LogEntry) {
            if entry.level < self.min_level {
                return;
            }
            let line = entry.render().into();
            match entry.level {
                LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&line),
                LogLevel::Info => web_sys::console::info_1(&line),
                LogLevel::Warn => web_sys::console::warn_1(&line),
                LogLevel::Error => web_sys::console::error_1(&line),
            }
        }
    }

    /// `Date.now()` with local `HH:MM:SS.mmm` formatting
    #[derive(Default)]
    pub struct BrowserTimeProvider;

    impl BrowserTimeProvider {
        pub fn new() -> Self {
            Self
        }
    }

    impl TimeProvider for BrowserTimeProvider {
        fn current_timestamp(&self) -> u64 {
            js_sys::Date::now() as u64
        }

        fn format_timestamp(&self, timestamp: u64) -> String {
            let date = js_sys::Date::new(&(timestamp as f64).into());
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                date.get_hours(),
                date.get_minutes(),
                date.get_seconds(),
                date.get_milliseconds()
            )
        }
    }

    /// Event-loop scheduling through browser timers
    #[derive(Default, Clone, Copy)]
    pub struct GlooScheduler;

    impl GlooScheduler {
        pub fn new() -> Self {
            Self
        }
    }

    impl Scheduler for GlooScheduler {
        fn yield_now(&self) -> LocalBoxFuture<'static, ()> {
            Box::pin(TimeoutFuture::new(0))
        }

        fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
            Box::pin(sleep(duration))
        }
    }

    /// ISO-8601 UTC time, e.g. `2024-05-01T12:30:00.000Z`.
    pub fn iso_now() -> String {
        js_sys::Date::new_0().to_iso_string().into()
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserTimeProvider, ConsoleLogger, GlooScheduler, iso_now};
