//! Local cluster bootstrap
//!
//! - `ClusterConfig`: JSON configuration, validated on load
//! - `generate_tables`: deterministic synthetic sales data per worker
//! - `launch`: one thread per rank over an in-process transport

mod config;
mod dataset;
mod errors;
mod launcher;

pub use config::ClusterConfig;
pub use dataset::generate_tables;
pub use errors::{ClusterError, ClusterResult, RankFailure};
pub use launcher::{launch, ClusterReport};
