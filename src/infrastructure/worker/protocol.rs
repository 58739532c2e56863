//! Messages exchanged with the benchmark worker script.
//!
//! Requests carry a `requestId` that the worker echoes back. Older worker
//! scripts omit it in responses; see [`super::correlation`] for how those are
//! matched.

use serde::{Deserialize, Serialize};

use crate::domain::{
    benchmark::{Benchmark, BenchmarkId, BenchmarkResult, TimingConfig},
    errors::{BenchError, BenchResult},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum WorkerRequest {
    Load { request_id: u64 },
    List { request_id: u64 },
    Run { request_id: u64, id: BenchmarkId, warmup: u32, iterations: u32 },
}

impl WorkerRequest {
    pub fn run(request_id: u64, id: &BenchmarkId, timing: &TimingConfig) -> Self {
        Self::Run {
            request_id,
            id: id.clone(),
            warmup: timing.warmup,
            iterations: timing.iterations,
        }
    }

    pub fn request_id(&self) -> u64 {
        match self {
            Self::Load { request_id }
            | Self::List { request_id }
            | Self::Run { request_id, .. } => *request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum WorkerResponse {
    Loaded {
        #[serde(default)]
        request_id: Option<u64>,
    },
    Benchmarks {
        #[serde(default)]
        request_id: Option<u64>,
        benchmarks: Vec<Benchmark>,
    },
    Result {
        #[serde(default)]
        request_id: Option<u64>,
        #[serde(default)]
        result: Option<BenchmarkResult>,
    },
    Error {
        #[serde(default)]
        request_id: Option<u64>,
        message: String,
    },
}

impl WorkerResponse {
    pub fn request_id(&self) -> Option<u64> {
        match self {
            Self::Loaded { request_id }
            | Self::Benchmarks { request_id, .. }
            | Self::Result { request_id, .. }
            | Self::Error { request_id, .. } => *request_id,
        }
    }

    pub fn into_loaded(self) -> BenchResult<()> {
        match self {
            Self::Loaded { .. } => Ok(()),
            Self::Error { message, .. } => Err(BenchError::BackendUnavailable(message)),
            other => Err(unexpected("loaded", &other)),
        }
    }

    pub fn into_benchmarks(self) -> BenchResult<Vec<Benchmark>> {
        match self {
            Self::Benchmarks { benchmarks, .. } => Ok(benchmarks),
            Self::Error { message, .. } => Err(BenchError::BackendUnavailable(message)),
            other => Err(unexpected("benchmarks", &other)),
        }
    }

    /// A `null` result means the worker module does not know the id.
    pub fn into_result(self, id: &BenchmarkId) -> BenchResult<BenchmarkResult> {
        match self {
            Self::Result { result: Some(result), .. } => Ok(result),
            Self::Result { result: None, .. } => {
                Err(BenchError::run_failed(id.value(), "unknown benchmark"))
            }
            Self::Error { message, .. } => Err(BenchError::run_failed(id.value(), message)),
            other => {
                let reason = unexpected("result", &other).to_string();
                Err(BenchError::run_failed(id.value(), reason))
            }
        }
    }
}

fn unexpected(expected: &str, got: &WorkerResponse) -> BenchError {
    BenchError::Serialization(format!("expected a {expected} message from the worker, got {got:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_request_wire_shape() {
        let id = BenchmarkId::from("fine/fill");
        let request = WorkerRequest::run(7, &id, &TimingConfig::new(2, 10));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "run",
                "requestId": 7,
                "id": "fine/fill",
                "warmup": 2,
                "iterations": 10,
            })
        );
    }

    #[test]
    fn legacy_response_without_request_id() {
        let response: WorkerResponse = serde_json::from_str(r#"{"type":"loaded"}"#).unwrap();
        assert_eq!(response, WorkerResponse::Loaded { request_id: None });
    }
}
