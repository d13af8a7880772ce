//! Observable events for paradb
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events in paradb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Cluster lifecycle
    /// Local cluster boot begins
    ClusterBootBegin,
    /// Every rank has a topology and is entering its loop
    ClusterBootComplete,
    /// A process failed and aborted the cluster
    ClusterAborted,
    /// Every rank has terminated
    ClusterShutdown,

    // Configuration
    /// Configuration loaded and validated
    ConfigLoaded,

    // Coordinator loop
    /// Root accepted a query from the operator
    QueryReceived,
    /// Root rejected malformed operator input
    QueryRejected,
    /// Query broadcast among coordinators and forwarded to the worker
    QueryForwarded,
    /// Worker partial result received
    PartialsCollected,
    /// Aggregation strategy finished on this coordinator
    AggregationComplete,
    /// Root handed the final result to the operator
    ResultDelivered,
    /// Coordinator loop terminated on EXIT
    CoordinatorExit,
    /// Coordinator loop failed
    CoordinatorFailed,

    // Worker
    /// Worker replied to a forwarded query
    WorkerReplied,
    /// Worker terminated on EXIT
    WorkerExit,

    // Distributed sort checkpoints
    /// Send shape computed from the local pre-sort
    SortPartitioned,
    /// Send shapes exchanged with every peer
    SortShapeExchanged,
    /// Local bucket assembled, about to gather at Root
    SortGatherBegin,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ClusterBootBegin => "PARADB_CLUSTER_BOOT_BEGIN",
            Event::ClusterBootComplete => "PARADB_CLUSTER_BOOT_COMPLETE",
            Event::ClusterAborted => "PARADB_CLUSTER_ABORTED",
            Event::ClusterShutdown => "PARADB_CLUSTER_SHUTDOWN",

            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::QueryReceived => "QUERY_BEGIN",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::QueryForwarded => "QUERY_FORWARDED",
            Event::PartialsCollected => "PARTIALS_COLLECTED",
            Event::AggregationComplete => "AGGREGATION_COMPLETE",
            Event::ResultDelivered => "QUERY_COMPLETE",
            Event::CoordinatorExit => "COORDINATOR_EXIT",
            Event::CoordinatorFailed => "COORDINATOR_FAILED",

            Event::WorkerReplied => "WORKER_REPLIED",
            Event::WorkerExit => "WORKER_EXIT",

            Event::SortPartitioned => "BUCKET_SORT_PARTITIONED",
            Event::SortShapeExchanged => "BUCKET_SORT_SHAPE_EXCHANGED",
            Event::SortGatherBegin => "BUCKET_SORT_GATHER_BEGIN",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ClusterAborted | Event::CoordinatorFailed)
    }

    /// Returns true if this event is protocol-checkpoint detail
    pub fn is_checkpoint(&self) -> bool {
        matches!(
            self,
            Event::SortPartitioned | Event::SortShapeExchanged | Event::SortGatherBegin
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ClusterBootBegin,
            Event::ClusterBootComplete,
            Event::ClusterAborted,
            Event::ClusterShutdown,
            Event::ConfigLoaded,
            Event::QueryReceived,
            Event::QueryRejected,
            Event::QueryForwarded,
            Event::PartialsCollected,
            Event::AggregationComplete,
            Event::ResultDelivered,
            Event::CoordinatorExit,
            Event::CoordinatorFailed,
            Event::WorkerReplied,
            Event::WorkerExit,
            Event::SortPartitioned,
            Event::SortShapeExchanged,
            Event::SortGatherBegin,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::ClusterAborted.is_fatal());
        assert!(Event::CoordinatorFailed.is_fatal());
        assert!(!Event::QueryReceived.is_fatal());
    }

    #[test]
    fn test_checkpoint_events() {
        assert!(Event::SortPartitioned.is_checkpoint());
        assert!(!Event::ResultDelivered.is_checkpoint());
    }
}
