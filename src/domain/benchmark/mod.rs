//! Benchmark aggregate: what can be run, how it is timed and what a run
//! produces.

pub mod catalog;
pub mod entities;
pub mod repositories;
pub mod value_objects;

pub use catalog::*;
pub use entities::*;
pub use repositories::*;
pub use value_objects::*;
