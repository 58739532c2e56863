pub mod benchmark;
pub mod comparison;
pub mod errors;
pub mod events;
pub mod export;
pub mod graphics;
pub mod logging;
pub mod reference;
pub mod run_state;
