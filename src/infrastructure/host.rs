//! Out-of-process native host.
//!
//! Every call goes through a [`HostBridge`] as a named command with a JSON
//! argument object. The command names are shared with the host process and
//! must not change.

use std::cell::RefCell;
use std::rc::Rc;

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use futures::future::LocalBoxFuture;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::{
    benchmark::{
        Benchmark, BenchmarkExecutor, BenchmarkId, BenchmarkResult, ExecutorKind, HostBridge,
        ReferenceStore, Screenshot, ScreenshotProvider, SimdLevelInfo, TimingConfig,
    },
    errors::{BenchError, BenchResult},
    logging::{LogComponent, get_logger},
    reference::{ReferenceIndexEntry, ReferenceName, sort_index},
};

pub mod commands {
    pub const LIST_BENCHMARKS: &str = "list_benchmarks";
    pub const GET_SIMD_LEVELS: &str = "get_simd_levels";
    pub const RUN_BENCHMARK: &str = "run_benchmark";
    pub const SCREENSHOT: &str = "screenshot";
    pub const LIST_REFERENCES: &str = "list_references";
    pub const SAVE_REFERENCE: &str = "save_reference";
    pub const LOAD_REFERENCE: &str = "load_reference";
    pub const DELETE_REFERENCE: &str = "delete_reference";
}

fn decode<T: DeserializeOwned>(command: &str, value: serde_json::Value) -> BenchResult<T> {
    serde_json::from_value(value).map_err(|e| BenchError::Serialization(format!("{command}: {e}")))
}

fn is_not_found(err: &BenchError) -> bool {
    match err {
        BenchError::NotFound(_) => true,
        BenchError::Host(message) => message.to_ascii_lowercase().contains("not found"),
        _ => false,
    }
}

pub async fn fetch_simd_levels(host: &dyn HostBridge) -> BenchResult<Vec<SimdLevelInfo>> {
    let value = host.invoke(commands::GET_SIMD_LEVELS, json!({})).await?;
    decode(commands::GET_SIMD_LEVELS, value)
}

/// Runs benchmarks in the native host process
pub struct NativeExecutor {
    host: Rc<dyn HostBridge>,
    simd_level: RefCell<Option<String>>,
}

impl NativeExecutor {
    pub fn new(host: Rc<dyn HostBridge>) -> Self {
        Self { host, simd_level: RefCell::new(None) }
    }

    pub fn simd_level(&self) -> Option<String> {
        self.simd_level.borrow().clone()
    }
}

impl BenchmarkExecutor for NativeExecutor {
    fn kind(&self) -> ExecutorKind {
        ExecutorKind::Native
    }

    fn list_benchmarks(&self) -> LocalBoxFuture<'_, BenchResult<Vec<Benchmark>>> {
        Box::pin(async move {
            let value = self
                .host
                .invoke(commands::LIST_BENCHMARKS, json!({}))
                .await
                .map_err(|e| BenchError::BackendUnavailable(e.to_string()))?;
            decode(commands::LIST_BENCHMARKS, value)
        })
    }

    fn run<'a>(
        &'a self,
        id: &'a BenchmarkId,
        timing: &'a TimingConfig,
    ) -> LocalBoxFuture<'a, BenchResult<BenchmarkResult>> {
        Box::pin(async move {
            let args = json!({
                "id": id,
                "simdLevel": self.simd_level(),
                "warmup": timing.warmup,
                "iterations": timing.iterations,
            });
            let value = self
                .host
                .invoke(commands::RUN_BENCHMARK, args)
                .await
                .map_err(|e| BenchError::run_failed(id.value(), e.to_string()))?;
            decode::<BenchmarkResult>(commands::RUN_BENCHMARK, value)
                .map_err(|e| BenchError::run_failed(id.value(), e.to_string()))
        })
    }

    fn select_simd_level(&self, level: Option<&str>) {
        *self.simd_level.borrow_mut() = level.map(str::to_string);
    }
}

/// References persisted by the native host
pub struct HostReferenceStore {
    host: Rc<dyn HostBridge>,
}

impl HostReferenceStore {
    pub fn new(host: Rc<dyn HostBridge>) -> Self {
        Self { host }
    }
}

impl ReferenceStore for HostReferenceStore {
    fn list(&self) -> LocalBoxFuture<'_, BenchResult<Vec<ReferenceIndexEntry>>> {
        Box::pin(async move {
            let value = self.host.invoke(commands::LIST_REFERENCES, json!({})).await?;
            let mut entries: Vec<ReferenceIndexEntry> = decode(commands::LIST_REFERENCES, value)?;
            sort_index(&mut entries);
            Ok(entries)
        })
    }

    fn save<'a>(
        &'a self,
        name: &'a str,
        results: &'a [BenchmarkResult],
    ) -> LocalBoxFuture<'a, BenchResult<ReferenceName>> {
        Box::pin(async move {
            let name = ReferenceName::sanitize(name)?;
            self.host
                .invoke(commands::SAVE_REFERENCE, json!({ "name": name, "results": results }))
                .await?;
            get_logger().debug(
                LogComponent::Infrastructure("HostReferences"),
                &format!("Saved {name} ({} results)", results.len()),
            );
            Ok(name)
        })
    }

    fn load<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, BenchResult<Vec<BenchmarkResult>>> {
        Box::pin(async move {
            let sanitized =
                ReferenceName::sanitize(name).map_err(|_| BenchError::NotFound(name.to_string()))?;
            let args = json!({ "name": sanitized });
            let value = match self.host.invoke(commands::LOAD_REFERENCE, args).await {
                Ok(value) => value,
                Err(err) if is_not_found(&err) => {
                    return Err(BenchError::NotFound(sanitized.to_string()));
                }
                Err(err) => return Err(err),
            };
            if value.is_null() {
                return Err(BenchError::NotFound(sanitized.to_string()));
            }
            decode(commands::LOAD_REFERENCE, value)
        })
    }

    fn delete<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, BenchResult<()>> {
        Box::pin(async move {
            let Ok(sanitized) = ReferenceName::sanitize(name) else {
                return Ok(());
            };
            match self.host.invoke(commands::DELETE_REFERENCE, json!({ "name": sanitized })).await {
                Ok(_) => Ok(()),
                Err(err) if is_not_found(&err) => Ok(()),
                Err(err) => Err(err),
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct HostScreenshot {
    rgba_base64: String,
    width: u32,
    height: u32,
}

/// Scene screenshots rendered by the native host
pub struct HostScreenshots {
    host: Rc<dyn HostBridge>,
}

impl HostScreenshots {
    pub fn new(host: Rc<dyn HostBridge>) -> Self {
        Self { host }
    }
}

impl ScreenshotProvider for HostScreenshots {
    fn capture<'a>(
        &'a self,
        scene_name: &'a str,
        category: &'a str,
    ) -> LocalBoxFuture<'a, BenchResult<Screenshot>> {
        Box::pin(async move {
            let args = json!({ "sceneName": scene_name, "category": category });
            let value = self.host.invoke(commands::SCREENSHOT, args).await?;
            let shot: HostScreenshot = decode(commands::SCREENSHOT, value)?;
            let rgba = decode_base64(&shot.rgba_base64)?;
            Ok(Screenshot { width: shot.width, height: shot.height, rgba })
        })
    }
}

const HOST_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Standard alphabet, padding optional, ASCII whitespace ignored.
pub fn decode_base64(input: &str) -> BenchResult<Vec<u8>> {
    let compact: Vec<u8> = input.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    HOST_BASE64
        .decode(compact)
        .map_err(|e| BenchError::Serialization(format!("screenshot payload: {e}")))
}

/// Whether the page runs inside the native host shell.
#[cfg(target_arch = "wasm32")]
pub fn host_available() -> bool {
    web_sys::window()
        .and_then(|window| js_sys::Reflect::get(&window, &"__TAURI__".into()).ok())
        .is_some_and(|value| !value.is_undefined() && !value.is_null())
}

#[cfg(target_arch = "wasm32")]
mod tauri {
    use futures::future::LocalBoxFuture;
    use wasm_bindgen::prelude::*;

    use crate::domain::{
        benchmark::HostBridge,
        errors::{BenchError, BenchResult},
    };

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(catch, js_namespace = ["window", "__TAURI__", "core"], js_name = invoke)]
        async fn tauri_invoke(command: &str, args: JsValue) -> Result<JsValue, JsValue>;
    }

    fn js_error(value: &JsValue) -> String {
        value
            .as_string()
            .or_else(|| js_sys::JSON::stringify(value).ok().and_then(|s| s.as_string()))
            .unwrap_or_else(|| format!("{value:?}"))
    }

    /// Bridge over the host shell's `invoke` command channel
    #[derive(Default)]
    pub struct TauriHostBridge;

    impl TauriHostBridge {
        pub fn new() -> Self {
            Self
        }
    }

    impl HostBridge for TauriHostBridge {
        fn invoke(
            &self,
            command: &'static str,
            args: serde_json::Value,
        ) -> LocalBoxFuture<'_, BenchResult<serde_json::Value>> {
            Box::pin(async move {
                let args = js_sys::JSON::parse(&args.to_string())
                    .map_err(|e| BenchError::Serialization(js_error(&e)))?;
                let value = tauri_invoke(command, args)
                    .await
                    .map_err(|e| BenchError::Host(js_error(&e)))?;
                if value.is_undefined() || value.is_null() {
                    return Ok(serde_json::Value::Null);
                }
                let text = js_sys::JSON::stringify(&value)
                    .map_err(|e| BenchError::Serialization(js_error(&e)))?
                    .as_string()
                    .unwrap_or_default();
                Ok(serde_json::from_str(&text)?)
            })
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use tauri::TauriHostBridge;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_padded_and_unpadded_input() {
        assert_eq!(decode_base64("AAEC/w==").unwrap(), vec![0, 1, 2, 255]);
        assert_eq!(decode_base64("AAEC/w").unwrap(), vec![0, 1, 2, 255]);
        assert_eq!(decode_base64("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_base64("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_base64("AAEC\n/w==\n").unwrap(), vec![0, 1, 2, 255]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_base64("a=b=").is_err());
        assert!(decode_base64("abcde").is_err());
        assert!(decode_base64("ab!d").is_err());
    }

    #[test]
    fn host_not_found_message_is_recognised() {
        assert!(is_not_found(&BenchError::Host("Reference Not Found: x".into())));
        assert!(!is_not_found(&BenchError::Host("disk full".into())));
    }
}
