//! Aggregation dispatch
//!
//! The strategy is chosen from the broadcast query alone, which every
//! coordinator holds identically. Nothing here looks at local data, so all
//! coordinators enter the same strategy and issue the same collectives.

use super::bucket_sort::bucket_sort;
use super::errors::{CoordinatorError, CoordinatorResult};
use super::reduce::reduce_by_company;
use crate::model::{Query, RowContainer};
use crate::observability::{CoordinatorMetrics, SortCheckpoints};
use crate::topology::ClusterTopology;

/// Observers handed to aggregation strategies
pub struct AggregationObservers<'a> {
    /// Distributed-sort checkpoints
    pub checkpoints: &'a dyn SortCheckpoints,
    /// Counters of the owning coordinator
    pub metrics: &'a CoordinatorMetrics,
}

/// Run the aggregation strategy for `query` over this coordinator's partial.
///
/// The Root receives the complete merged result; other coordinators receive
/// their own contribution. `partials` may be reordered in place.
pub fn aggregate(
    topology: &ClusterTopology,
    query: &Query,
    partials: &mut RowContainer,
    observers: &AggregationObservers<'_>,
) -> CoordinatorResult<RowContainer> {
    match *query {
        Query::SalesByDate { start, end } => bucket_sort(topology, start, end, partials, observers),
        Query::SalesByCompany => reduce_by_company(topology, partials),
        Query::Exit => Err(CoordinatorError::query_unsupported(
            "EXIT terminates the loop and has no aggregation strategy",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::CoordinatorErrorCode;
    use crate::observability::LogCheckpoints;
    use crate::transport::LocalCluster;
    use std::sync::Arc;

    #[test]
    fn test_exit_is_rejected() {
        let cluster = LocalCluster::new(2);
        let topology = ClusterTopology::new(Arc::new(cluster.endpoint(0).unwrap())).unwrap();
        let metrics = CoordinatorMetrics::new();
        let observers = AggregationObservers {
            checkpoints: &LogCheckpoints,
            metrics: &metrics,
        };

        let mut partials = RowContainer::empty();
        let err = aggregate(&topology, &Query::Exit, &mut partials, &observers).unwrap_err();
        assert_eq!(err.code(), CoordinatorErrorCode::QueryUnsupported);
    }
}
