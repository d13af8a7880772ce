//! Cluster topology and role model
//!
//! Roles are assigned by rank parity in the global group:
//!
//! - even ranks are coordinators, odd ranks are workers
//! - each coordinator at rank `r` is paired with the worker at `r + 1`
//! - rank 0 is the Root coordinator, the only process that talks to the operator
//!
//! The topology is immutable after construction. A world that cannot be
//! split into coordinator/worker pairs is a fatal configuration error.

mod errors;
mod topology;

pub use errors::{TopologyError, TopologyErrorCode, TopologyResult};
pub use topology::{ClusterTopology, Role, PAIR_TAG, ROOT_RANK};
