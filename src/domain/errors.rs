use derive_more::Display;

/// Every failure the dashboard can surface.
///
/// Per-run failures (`RunFailed`) are contained by the orchestrator; store and
/// screenshot failures propagate to the caller; a catalog failure disables the
/// run controls for the session.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum BenchError {
    #[display(fmt = "Backend unavailable: {}", _0)]
    BackendUnavailable(String),
    #[display(fmt = "Benchmark {} failed: {}", id, reason)]
    RunFailed { id: String, reason: String },
    #[display(fmt = "Reference not found: {}", _0)]
    NotFound(String),
    #[display(fmt = "Reference name is empty after sanitizing")]
    EmptyName,
    #[display(fmt = "Graphics context is busy")]
    GraphicsContextBusy,
    #[display(fmt = "Storage error: {}", _0)]
    Storage(String),
    #[display(fmt = "Serialization error: {}", _0)]
    Serialization(String),
    #[display(fmt = "Host error: {}", _0)]
    Host(String),
}

impl BenchError {
    pub fn run_failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RunFailed { id: id.into(), reason: reason.into() }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable(reason.into())
    }
}

impl std::error::Error for BenchError {}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type BenchResult<T> = Result<T, BenchError>;
