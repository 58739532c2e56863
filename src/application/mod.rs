pub mod baselines;
pub mod catalog_service;
pub mod dashboard;
pub mod orchestrator;
pub mod router;
pub mod scheduler;
pub mod screenshot;
