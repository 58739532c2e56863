pub mod correlation;
pub mod protocol;

#[cfg(target_arch = "wasm32")]
mod client;

#[cfg(target_arch = "wasm32")]
pub use client::WorkerExecutor;
