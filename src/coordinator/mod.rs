//! Coordinator tier
//!
//! Coordinators never hold data of their own. Each one forwards the Root's
//! query to its paired worker, collects the worker's partial result, and
//! takes part in a collective aggregation that leaves the merged result at
//! the Root.
//!
//! # Lockstep
//!
//! Every coordinator issues the same collectives in the same order. The
//! strategy is chosen from the broadcast query only, and no coordinator
//! skips a collective because its local partial is empty.

mod bucket_sort;
mod collect;
mod dispatch;
mod errors;
mod forward;
mod partition;
mod reduce;
mod runner;
mod state;

pub use bucket_sort::bucket_sort;
pub use collect::wait_for_reply;
pub use dispatch::{aggregate, AggregationObservers};
pub use errors::{CoordinatorError, CoordinatorErrorCode, CoordinatorResult, Severity};
pub use forward::forward_query;
pub use partition::{DateBuckets, SendShape};
pub use reduce::reduce_by_company;
pub use runner::Coordinator;
pub use state::{IterationState, LoopPhase};
