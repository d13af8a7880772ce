//! Thread-per-rank cluster launcher
//!
//! # Boot sequence
//!
//! 1. Validate configuration and the worker table count
//! 2. Create the in-process world (two ranks per pair)
//! 3. Spawn one thread per rank; each builds its own topology
//! 4. Root coordinator takes the operator front end
//! 5. Join every rank, collecting loop summaries
//!
//! Any rank that fails aborts the whole world, so no thread is left
//! blocked on a peer that will never answer. A panicking rank aborts too.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use serde::Serialize;
use uuid::Uuid;

use super::config::ClusterConfig;
use super::errors::{ClusterError, ClusterResult, RankFailure};
use crate::coordinator::Coordinator;
use crate::frontend::Frontend;
use crate::observability::{log_event_with_fields, Event, LoopSummary};
use crate::topology::{ClusterTopology, Role, ROOT_RANK};
use crate::transport::{LocalCluster, Transport};
use crate::worker::{run_worker, SalesTable};

/// Outcome of a cluster run that ended with EXIT
#[derive(Debug, Clone, Serialize)]
pub struct ClusterReport {
    /// Identifier of this run, repeated in every boot log line
    pub cluster_id: Uuid,
    /// Loop summary of each coordinator, in coordinator order
    pub coordinators: Vec<LoopSummary>,
    /// Queries answered by each worker, in worker order
    pub worker_replies: Vec<u64>,
}

impl ClusterReport {
    /// Summary of the Root coordinator
    pub fn root(&self) -> Option<&LoopSummary> {
        self.coordinators.first()
    }
}

enum RankOutcome {
    Coordinator(LoopSummary),
    Worker(u64),
    Failed(String),
}

/// Aborts the world if the owning rank thread unwinds.
struct AbortOnPanic {
    transport: Arc<dyn Transport>,
}

impl Drop for AbortOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.transport.abort("rank thread panicked");
        }
    }
}

/// Boot a local cluster and serve the operator until EXIT.
///
/// `tables` holds one table per worker, in worker order.
pub fn launch(
    config: &ClusterConfig,
    tables: Vec<SalesTable>,
    frontend: &mut dyn Frontend,
) -> ClusterResult<ClusterReport> {
    config.validate()?;
    if tables.len() != config.coordinators {
        return Err(ClusterError::TableCount {
            expected: config.coordinators,
            actual: tables.len(),
        });
    }

    let cluster_id = Uuid::new_v4();
    let id_field = cluster_id.to_string();
    let world_size = config.world_size();
    let cluster = match config.recv_timeout() {
        Some(timeout) => LocalCluster::with_recv_timeout(world_size, timeout),
        None => LocalCluster::new(world_size),
    };

    log_event_with_fields(
        Event::ClusterBootBegin,
        ROOT_RANK,
        &[
            ("cluster_id", &id_field),
            ("world_size", &world_size.to_string()),
        ],
    );

    let boot = Boot::new(&cluster, &id_field);
    let mut frontend = Some(frontend);
    let outcomes: Vec<RankOutcome> = thread::scope(|s| {
        let mut handles = Vec::with_capacity(world_size);
        for (pair, table) in tables.into_iter().enumerate() {
            let coordinator_rank = pair * 2;
            let operator = if coordinator_rank == ROOT_RANK {
                frontend.take()
            } else {
                None
            };
            let boot = &boot;
            handles.push(s.spawn(move || run_coordinator_rank(boot, coordinator_rank, operator)));
            handles.push(s.spawn(move || run_worker_rank(boot, coordinator_rank + 1, &table)));
        }

        handles
            .into_iter()
            .enumerate()
            .map(|(rank, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| RankOutcome::Failed(format!("rank {} panicked", rank)))
            })
            .collect()
    });

    let mut report = ClusterReport {
        cluster_id,
        coordinators: Vec::with_capacity(config.coordinators),
        worker_replies: Vec::with_capacity(config.coordinators),
    };
    let mut failures = Vec::new();
    for (rank, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            RankOutcome::Coordinator(summary) => report.coordinators.push(summary),
            RankOutcome::Worker(replies) => report.worker_replies.push(replies),
            RankOutcome::Failed(message) => failures.push(RankFailure {
                rank,
                role: Role::of_rank(rank),
                message,
            }),
        }
    }

    if failures.is_empty() && !cluster.is_aborted() {
        log_event_with_fields(Event::ClusterShutdown, ROOT_RANK, &[("cluster_id", &id_field)]);
        return Ok(report);
    }

    let reason = cluster
        .abort_reason()
        .or_else(|| failures.first().map(|f| f.to_string()))
        .unwrap_or_else(|| "cluster aborted".to_string());
    log_event_with_fields(
        Event::ClusterAborted,
        ROOT_RANK,
        &[("cluster_id", &id_field), ("reason", &reason)],
    );
    Err(ClusterError::Aborted { reason, failures })
}

/// Tracks ranks through boot. The last rank to build its topology logs
/// boot completion.
struct Boot<'a> {
    cluster: &'a LocalCluster,
    cluster_id: &'a str,
    ready: AtomicUsize,
}

impl<'a> Boot<'a> {
    fn new(cluster: &'a LocalCluster, cluster_id: &'a str) -> Self {
        Self {
            cluster,
            cluster_id,
            ready: AtomicUsize::new(0),
        }
    }

    /// Build `rank`'s topology and count it ready
    fn topology(&self, rank: usize) -> Result<ClusterTopology, String> {
        let topology = rank_topology(self.cluster, rank)?;
        self.mark_ready(rank);
        Ok(topology)
    }

    /// Returns true for the rank that completes the boot
    fn mark_ready(&self, rank: usize) -> bool {
        let ready = self.ready.fetch_add(1, Ordering::SeqCst) + 1;
        if ready != self.cluster.world_size() {
            return false;
        }
        log_event_with_fields(
            Event::ClusterBootComplete,
            rank,
            &[("cluster_id", self.cluster_id)],
        );
        true
    }
}

fn rank_topology(cluster: &LocalCluster, rank: usize) -> Result<ClusterTopology, String> {
    let transport: Arc<dyn Transport> =
        Arc::new(cluster.endpoint(rank).map_err(|e| e.to_string())?);
    ClusterTopology::new(Arc::clone(&transport)).map_err(|e| {
        transport.abort(&e.to_string());
        e.to_string()
    })
}

fn run_coordinator_rank(
    boot: &Boot<'_>,
    rank: usize,
    frontend: Option<&mut dyn Frontend>,
) -> RankOutcome {
    let topology = match boot.topology(rank) {
        Ok(topology) => topology,
        Err(message) => return RankOutcome::Failed(message),
    };
    let _guard = AbortOnPanic {
        transport: topology.global_group().transport(),
    };

    let mut coordinator = match Coordinator::new(topology) {
        Ok(coordinator) => coordinator,
        Err(e) => return RankOutcome::Failed(e.to_string()),
    };
    match coordinator.run(frontend) {
        Ok(summary) => RankOutcome::Coordinator(summary),
        Err(e) => RankOutcome::Failed(e.to_string()),
    }
}

fn run_worker_rank(boot: &Boot<'_>, rank: usize, table: &SalesTable) -> RankOutcome {
    let topology = match boot.topology(rank) {
        Ok(topology) => topology,
        Err(message) => return RankOutcome::Failed(message),
    };
    let _guard = AbortOnPanic {
        transport: topology.global_group().transport(),
    };

    match run_worker(&topology, table) {
        Ok(replies) => RankOutcome::Worker(replies),
        Err(e) => RankOutcome::Failed(e.to_string()),
    }
}
