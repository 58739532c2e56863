use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::domain::{
    benchmark::{ExecutionMode, TimingConfig},
    errors::BenchResult,
    logging::LogLevel,
};

/// Name of the optional page global holding a JSON configuration object.
pub const CONFIG_GLOBAL: &str = "BENCH_DASHBOARD_CONFIG";

/// Runtime settings. Every field is optional in the source JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub worker_script_url: String,
    /// Global under which the page exposes the main-thread module.
    pub module_global: String,
    pub storage_namespace: String,
    pub phase_label_delay_ms: u64,
    pub default_timing: TimingConfig,
    pub log_level: String,
    /// `None` picks native when the host is present.
    pub default_mode: Option<ExecutionMode>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            worker_script_url: "./bench-worker.js".to_string(),
            module_global: "benchModule".to_string(),
            storage_namespace: "bench-dashboard".to_string(),
            phase_label_delay_ms: 100,
            default_timing: TimingConfig::default(),
            log_level: "debug".to_string(),
            default_mode: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_json(text: &str) -> BenchResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Unknown level names fall back to debug.
    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_str(&self.log_level).unwrap_or(LogLevel::Debug)
    }

    pub fn phase_label_delay(&self) -> Duration {
        Duration::from_millis(self.phase_label_delay_ms)
    }

    pub fn timing(&self) -> TimingConfig {
        TimingConfig::new(self.default_timing.warmup, self.default_timing.iterations)
    }

    /// A configured native mode without a host falls back to wasm.
    pub fn initial_mode(&self, host_available: bool) -> ExecutionMode {
        match (self.default_mode, host_available) {
            (Some(ExecutionMode::Native), true) | (None, true) => ExecutionMode::Native,
            _ => ExecutionMode::Wasm,
        }
    }

    /// Reads `window.BENCH_DASHBOARD_CONFIG`; defaults when absent or
    /// malformed.
    #[cfg(target_arch = "wasm32")]
    pub fn from_window() -> Self {
        use crate::domain::logging::{LogComponent, get_logger};

        let Some(value) = web_sys::window()
            .and_then(|window| js_sys::Reflect::get(&window, &CONFIG_GLOBAL.into()).ok())
            .filter(|value| !value.is_undefined() && !value.is_null())
        else {
            return Self::default();
        };

        let text = js_sys::JSON::stringify(&value)
            .ok()
            .and_then(|text| text.as_string())
            .unwrap_or_default();
        Self::from_json(&text).unwrap_or_else(|err| {
            let message = format!("Ignoring {CONFIG_GLOBAL}: {err}");
            get_logger().warn(LogComponent::Presentation("Config"), &message);
            Self::default()
        })
    }
}

static CONFIG: OnceCell<DashboardConfig> = OnceCell::new();

/// Later calls are ignored.
pub fn init_config(config: DashboardConfig) {
    let _ = CONFIG.set(config);
}

pub fn config() -> &'static DashboardConfig {
    CONFIG.get_or_init(DashboardConfig::default)
}
