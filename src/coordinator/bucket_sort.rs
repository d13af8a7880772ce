//! Range-partitioned distributed sort
//!
//! # Protocol (every coordinator, same order)
//!
//! 1. Sort local partial by date
//! 2. Split it into one run per coordinator by date bucket
//! 3. All-to-all: run lengths, then run offsets
//! 4. All-to-all-v: the runs themselves
//! 5. Sort the received bucket by date (runs arrive concatenated, not merged)
//! 6. Gather bucket sizes at Root
//! 7. Gather-v buckets at Root in coordinator order
//!
//! Coordinator `i` owns bucket `i`, and bucket `i` never holds a later date
//! than bucket `i + 1`, so concatenating buckets in coordinator order is
//! already globally sorted.
//!
//! With a single coordinator there is nothing to redistribute: the partial
//! is sorted locally and returned.

use chrono::NaiveDate;

use super::errors::CoordinatorResult;
use super::partition::DateBuckets;
use super::AggregationObservers;
use crate::model::{Row, RowContainer};
use crate::topology::ClusterTopology;

/// Globally sort the rows of `start..=end` across all coordinators.
///
/// `partials` is sorted in place. The Root returns the complete sorted
/// result; every other coordinator returns its own sorted bucket.
pub fn bucket_sort(
    topology: &ClusterTopology,
    start: NaiveDate,
    end: NaiveDate,
    partials: &mut RowContainer,
    observers: &AggregationObservers<'_>,
) -> CoordinatorResult<RowContainer> {
    let coworkers = topology.coworker_group();
    let peers = coworkers.size();
    let me = coworkers.index();

    partials.sort_by_date();

    if peers == 1 {
        return Ok(partials.alias());
    }

    let buckets = DateBuckets::new(start, end, peers)?;
    let shape = buckets.send_shape(partials.rows());
    observers
        .checkpoints
        .post_partition(me, &shape.counts, &shape.offsets);

    let send_counts: Vec<u64> = shape.counts.iter().map(|&c| c as u64).collect();
    let send_offsets: Vec<u64> = shape.offsets.iter().map(|&o| o as u64).collect();
    let recv_counts: Vec<usize> = coworkers
        .alltoall(&send_counts)?
        .into_iter()
        .map(|c| c as usize)
        .collect();
    let peer_offsets: Vec<usize> = coworkers
        .alltoall(&send_offsets)?
        .into_iter()
        .map(|o| o as usize)
        .collect();
    observers
        .checkpoints
        .post_exchange(me, &recv_counts, &peer_offsets);

    let mut bucket: Vec<Row> =
        coworkers.alltoallv(partials.rows(), &shape.counts, &shape.offsets, &recv_counts)?;
    observers.metrics.add_rows_exchanged(bucket.len() as u64);

    bucket.sort_by_key(|row| row.date);
    observers.checkpoints.pre_gather(me, bucket.len());

    let sizes = coworkers.gather(0, bucket.len() as u64)?;
    let gathered = match sizes {
        Some(sizes) => {
            let counts: Vec<usize> = sizes.into_iter().map(|s| s as usize).collect();
            let offsets = prefix_offsets(&counts);
            coworkers.gatherv(0, &bucket, &counts, &offsets)?
        }
        None => coworkers.gatherv(0, &bucket, &[], &[])?,
    };

    Ok(match gathered {
        Some(rows) => RowContainer::from_rows(rows),
        None => RowContainer::from_rows(bucket),
    })
}

/// Exclusive prefix sums: where each run starts in the concatenation
fn prefix_offsets(counts: &[usize]) -> Vec<usize> {
    let mut next = 0;
    counts
        .iter()
        .map(|&count| {
            let at = next;
            next += count;
            at
        })
        .collect()
}
