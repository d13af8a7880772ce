//! Worker request loop

use super::errors::{WorkerError, WorkerResult};
use super::table::SalesTable;
use crate::model::Query;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::topology::{ClusterTopology, Role, PAIR_TAG};
use crate::wire::{decode_slice, encode_slice};

/// Serve queries from the paired coordinator until EXIT.
///
/// Every non-EXIT query gets exactly one reply, possibly empty. Returns the
/// number of queries answered. On failure the cluster is aborted.
pub fn run_worker(topology: &ClusterTopology, table: &SalesTable) -> WorkerResult<u64> {
    if topology.role() != Role::Worker {
        return Err(WorkerError::NotAWorker(topology.rank()));
    }

    let result = serve(topology, table);
    match &result {
        Ok(_) => log_event(Event::WorkerExit, topology.rank()),
        Err(e) => {
            log_event_with_fields(
                Event::ClusterAborted,
                topology.rank(),
                &[("message", &e.to_string())],
            );
            topology.global_group().abort(&e.to_string());
        }
    }
    result
}

fn serve(topology: &ClusterTopology, table: &SalesTable) -> WorkerResult<u64> {
    let mut answered = 0;
    loop {
        let query = receive_query(topology)?;
        if query.is_exit() {
            return Ok(answered);
        }

        let rows = table.answer(&query);
        topology
            .global_group()
            .send(topology.paired_rank(), PAIR_TAG, encode_slice(&rows))?;
        answered += 1;

        log_event_with_fields(
            Event::WorkerReplied,
            topology.rank(),
            &[
                ("query", query.kind().as_str()),
                ("rows", &rows.len().to_string()),
            ],
        );
    }
}

fn receive_query(topology: &ClusterTopology) -> WorkerResult<Query> {
    let global = topology.global_group();
    let coordinator = topology.paired_rank();
    let datatype = topology.query_datatype();

    let byte_len = global.probe(coordinator, PAIR_TAG)?;
    let mut buffer = vec![0u8; byte_len];
    global.recv_into(coordinator, PAIR_TAG, &mut buffer)?;

    let count = datatype.count_of(byte_len)?;
    let mut queries: Vec<Query> = decode_slice(&buffer)?;
    match queries.pop() {
        Some(query) if count == 1 => Ok(query),
        _ => Err(WorkerError::MalformedRequest { coordinator, count }),
    }
}
