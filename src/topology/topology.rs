//! Per-process cluster handle

use std::sync::Arc;

use super::errors::{TopologyError, TopologyResult};
use crate::model::{Query, Row};
use crate::transport::{Group, Transport, GLOBAL_CONTEXT, PEER_CONTEXT};
use crate::wire::{Datatype, WireRecord};

/// Rank of the Root coordinator in the global group
pub const ROOT_RANK: usize = 0;

/// Tag of every coordinator/worker message, in both directions
pub const PAIR_TAG: u32 = 0;

/// Role of a process, fixed by its rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Runs the aggregation protocol; paired with the worker at `rank + 1`
    Coordinator,
    /// Owns local rows; paired with the coordinator at `rank - 1`
    Worker,
}

impl Role {
    /// Role of a rank
    pub fn of_rank(rank: usize) -> Self {
        if rank % 2 == 0 {
            Role::Coordinator
        } else {
            Role::Worker
        }
    }

    /// Returns the role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coordinator => "coordinator",
            Role::Worker => "worker",
        }
    }
}

/// Immutable per-process view of the cluster.
///
/// `global_group` holds every process and carries coordinator/worker
/// point-to-point traffic. `coworker_group` holds only processes of this
/// process's role and carries every collective.
#[derive(Debug, Clone)]
pub struct ClusterTopology {
    rank: usize,
    role: Role,
    global: Group,
    coworkers: Group,
}

impl ClusterTopology {
    /// Build the topology for the calling process.
    ///
    /// Fails if the world is empty or has an odd number of processes.
    pub fn new(transport: Arc<dyn Transport>) -> TopologyResult<Self> {
        let world_size = transport.world_size();
        if world_size == 0 || world_size % 2 != 0 {
            return Err(TopologyError::invalid_world(world_size));
        }

        let rank = transport.rank();
        let role = Role::of_rank(rank);
        let peers: Vec<usize> = (0..world_size)
            .filter(|&r| Role::of_rank(r) == role)
            .collect();

        let global = Group::new(Arc::clone(&transport), (0..world_size).collect(), GLOBAL_CONTEXT)
            .map_err(TopologyError::group_failed)?;
        let coworkers =
            Group::new(transport, peers, PEER_CONTEXT).map_err(TopologyError::group_failed)?;

        Ok(Self {
            rank,
            role,
            global,
            coworkers,
        })
    }

    /// Rank in the global group
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Role of this process
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether this is the Root coordinator
    pub fn is_root(&self) -> bool {
        self.rank == ROOT_RANK
    }

    /// Global rank of the paired process
    pub fn paired_rank(&self) -> usize {
        match self.role {
            Role::Coordinator => self.rank + 1,
            Role::Worker => self.rank - 1,
        }
    }

    /// Group of every process, indexed by global rank
    pub fn global_group(&self) -> &Group {
        &self.global
    }

    /// Group of same-role processes; index 0 of the coordinator group is Root
    pub fn coworker_group(&self) -> &Group {
        &self.coworkers
    }

    /// Number of coordinators (equal to the number of workers)
    pub fn coordinator_count(&self) -> usize {
        self.global.size() / 2
    }

    /// Wire descriptor of a query message
    pub fn query_datatype(&self) -> Datatype {
        Query::DATATYPE
    }

    /// Wire descriptor of a row message
    pub fn row_datatype(&self) -> Datatype {
        Row::DATATYPE
    }
}
