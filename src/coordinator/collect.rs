//! Partial result collection
//!
//! A worker's reply length depends on its data, so the coordinator probes
//! the reply first, allocates exactly that many rows, then receives into
//! the buffer. There is no timeout at this layer.

use super::errors::{CoordinatorError, CoordinatorResult};
use crate::model::RowContainer;
use crate::topology::{ClusterTopology, PAIR_TAG};
use crate::wire::decode_slice;

/// Block until the paired worker's reply arrives and return it as an owned
/// container sized to the reply.
pub fn wait_for_reply(topology: &ClusterTopology) -> CoordinatorResult<RowContainer> {
    let global = topology.global_group();
    let worker = topology.paired_rank();
    let datatype = topology.row_datatype();

    let byte_len = global.probe(worker, PAIR_TAG)?;
    let row_count = datatype.count_of(byte_len)?;

    let mut buffer = vec![0u8; datatype.bytes_for(row_count)];
    let received = global.recv_into(worker, PAIR_TAG, &mut buffer)?;
    if received != buffer.len() {
        return Err(CoordinatorError::protocol_violation(format!(
            "worker {} announced {} bytes but delivered {}",
            worker,
            buffer.len(),
            received
        )));
    }

    Ok(RowContainer::from_rows(decode_slice(&buffer)?))
}
