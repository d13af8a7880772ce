//! paradb - a coordinator/worker sales query engine
//!
//! Processes form coordinator/worker pairs. Workers own data and answer
//! forwarded queries; coordinators merge worker partials with collective
//! aggregation and the Root coordinator serves the operator.

pub mod cli;
pub mod cluster;
pub mod coordinator;
pub mod frontend;
pub mod model;
pub mod observability;
pub mod topology;
pub mod transport;
pub mod wire;
pub mod worker;
