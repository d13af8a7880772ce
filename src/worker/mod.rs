//! Worker tier
//!
//! A worker owns a slice of the sales data and answers queries forwarded by
//! its paired coordinator. Workers never talk to each other; the coordinator
//! tier does all merging.

mod errors;
mod server;
mod table;

pub use errors::{WorkerError, WorkerResult};
pub use server::run_worker;
pub use table::SalesTable;
