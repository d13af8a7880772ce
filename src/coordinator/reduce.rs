//! Per-company sum reduction
//!
//! Each coordinator's partial holds exactly one row per company, slot `i`
//! carrying company `i + 1`. One sum-reduction per slot lands the global
//! total at the Root.
//!
//! Before any reduction, coordinators all-gather their slot count and a
//! mapping flag. Every coordinator sees the same votes and reaches the same
//! verdict, so a disagreement fails the query everywhere instead of leaving
//! some coordinators blocked in a reduction the others skipped.

use super::errors::{CoordinatorError, CoordinatorResult};
use crate::model::{Row, RowContainer};
use crate::topology::ClusterTopology;

/// Whether slot `i` of the partial holds company `i + 1`
fn slots_are_dense(partials: &[Row]) -> bool {
    partials
        .iter()
        .enumerate()
        .all(|(slot, row)| row.company_id as usize == slot + 1)
}

/// Reduce per-company partial sums at the Root.
///
/// The Root returns one row per company with the cluster-wide total; every
/// other coordinator returns an alias of its own partial.
pub fn reduce_by_company(
    topology: &ClusterTopology,
    partials: &RowContainer,
) -> CoordinatorResult<RowContainer> {
    let coworkers = topology.coworker_group();
    let groups = partials.len();

    let vote = [groups as u64, u64::from(slots_are_dense(partials.rows()))];
    let votes = coworkers.allgather(&vote)?;
    for (member, theirs) in votes.iter().enumerate() {
        if theirs.as_slice() != [groups as u64, 1] {
            return Err(CoordinatorError::protocol_violation(format!(
                "coordinator {} reports {} company slots (dense={}), coordinator {} holds {}",
                member,
                theirs.first().copied().unwrap_or(0),
                theirs.get(1) == Some(&1),
                coworkers.index(),
                groups
            )));
        }
    }

    let mut reduced: Option<Vec<Row>> = topology.is_root().then(|| {
        (0..groups)
            .map(|slot| Row::company_slot(slot as u32 + 1, 0.0))
            .collect()
    });

    for (slot, row) in partials.rows().iter().enumerate() {
        let total = coworkers.reduce_sum_f64(0, row.sales_total)?;
        if let (Some(reduced), Some(total)) = (reduced.as_mut(), total) {
            reduced[slot].sales_total = total;
        }
    }

    Ok(match reduced {
        Some(rows) => RowContainer::from_rows(rows),
        None => partials.alias(),
    })
}
