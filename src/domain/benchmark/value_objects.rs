use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Benchmark ids that need the main-thread graphics context.
pub const MAIN_THREAD_PREFIXES: [&str; 2] = ["scene_hybrid/", "vello_hybrid/"];

/// Category prefixes that place a benchmark in the scene group.
const SCENE_CATEGORY_PREFIXES: [&str; 2] = ["scene_", "vello_"];

/// Slash-structured benchmark identifier, e.g. `vello_cpu/filled_rects`
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    Deref,
    From,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct BenchmarkId(String);

impl BenchmarkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Leading path segment.
    pub fn category(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }

    /// Everything after the category.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(_, name)| name).unwrap_or(&self.0)
    }

    pub fn requires_main_thread(&self) -> bool {
        MAIN_THREAD_PREFIXES.iter().any(|prefix| self.0.starts_with(prefix))
    }
}

impl From<&str> for BenchmarkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Top-level grouping shown as separate tables in the dashboard
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkGroup {
    Micro,
    Scene,
}

impl BenchmarkGroup {
    pub fn classify(category: &str) -> Self {
        let leading = category.split('/').next().unwrap_or_default();
        if SCENE_CATEGORY_PREFIXES.iter().any(|prefix| leading.starts_with(prefix)) {
            Self::Scene
        } else {
            Self::Micro
        }
    }
}

/// Where benchmarks execute
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Native,
    Wasm,
}

/// Concrete executor that served a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExecutorKind {
    Native,
    Worker,
    MainThread,
}

/// Cosmetic sub-state of the running benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RunPhase {
    WarmingUp,
    Measuring,
}

pub const DEFAULT_WARMUP: u32 = 5;
pub const DEFAULT_ITERATIONS: u32 = 50;

/// Warm-up and measurement iteration counts for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub warmup: u32,
    pub iterations: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { warmup: DEFAULT_WARMUP, iterations: DEFAULT_ITERATIONS }
    }
}

impl TimingConfig {
    /// Clamps to the minimum bounds: any warm-up, at least one iteration.
    pub fn new(warmup: u32, iterations: u32) -> Self {
        Self { warmup, iterations: iterations.max(1) }
    }

    /// Builds a config from raw input fields. Unparsable fields fall back to
    /// `fallback`.
    pub fn from_input(warmup: &str, iterations: &str, fallback: TimingConfig) -> Self {
        let warmup = warmup.trim().parse::<u32>().unwrap_or(fallback.warmup);
        let iterations = iterations.trim().parse::<u32>().unwrap_or(fallback.iterations);
        Self::new(warmup, iterations)
    }
}

/// Selectable instruction-set variant of the computation module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimdLevelInfo {
    pub id: String,
    pub name: String,
}
