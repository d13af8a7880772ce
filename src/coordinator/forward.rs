//! Query broadcast and forwarding
//!
//! Every coordinator calls `forward_query` exactly once per loop iteration.
//! The Root supplies the query; the others learn it from the broadcast.

use super::errors::{CoordinatorError, CoordinatorResult};
use crate::model::Query;
use crate::topology::{ClusterTopology, PAIR_TAG};
use crate::wire::encode_slice;

/// Broadcast the Root's query to all coordinators, then send it on to this
/// coordinator's paired worker.
///
/// The Root passes `Some(query)`; every other coordinator passes `None`.
/// Returns the query every coordinator now agrees on.
pub fn forward_query(
    topology: &ClusterTopology,
    pending: Option<&Query>,
) -> CoordinatorResult<Query> {
    if topology.is_root() && pending.is_none() {
        return Err(CoordinatorError::configuration(
            "Root must supply the query it broadcasts",
        ));
    }

    let coworkers = topology.coworker_group();
    let query = coworkers.broadcast(0, if topology.is_root() { pending } else { None })?;

    topology
        .global_group()
        .send(topology.paired_rank(), PAIR_TAG, encode_slice(&[query]))?;

    Ok(query)
}
