//! Main loop phases and per-iteration container ownership
//!
//! Each iteration binds two containers: the worker's partial and the
//! aggregated result. They may alias one storage block (a strategy that
//! hands back its input). Releasing the pair frees that block once.

use std::fmt;

use crate::model::{Released, RowContainer};

/// Phase of the coordinator main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Root waits for the operator; others wait for the broadcast
    AwaitingQuery,
    /// Coordinator-wide broadcast of the query
    Broadcasting,
    /// Point-to-point send of the query to the paired worker
    ForwardingToWorker,
    /// Blocking receive of the worker's partial
    CollectingPartials,
    /// Collective aggregation strategy
    Aggregating,
    /// Root presents the merged result
    Delivering,
    /// EXIT observed; loop finished
    Terminated,
}

impl LoopPhase {
    /// Returns the phase name
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopPhase::AwaitingQuery => "awaiting_query",
            LoopPhase::Broadcasting => "broadcasting",
            LoopPhase::ForwardingToWorker => "forwarding_to_worker",
            LoopPhase::CollectingPartials => "collecting_partials",
            LoopPhase::Aggregating => "aggregating",
            LoopPhase::Delivering => "delivering",
            LoopPhase::Terminated => "terminated",
        }
    }
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Containers owned by the current loop iteration
#[derive(Debug, Default)]
pub struct IterationState {
    partials: Option<RowContainer>,
    result: Option<RowContainer>,
}

impl IterationState {
    /// State with nothing bound
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind this iteration's containers, releasing whatever was bound before.
    ///
    /// Returns the number of storage blocks freed.
    pub fn bind(&mut self, partials: RowContainer, result: RowContainer) -> usize {
        let freed = self.release();
        self.partials = Some(partials);
        self.result = Some(result);
        freed
    }

    /// Release both containers. Returns the number of storage blocks freed:
    /// 2 for independent containers, 1 when they alias, 0 when unbound.
    pub fn release(&mut self) -> usize {
        [self.partials.take(), self.result.take()]
            .into_iter()
            .flatten()
            .map(RowContainer::release)
            .filter(|released| *released == Released::Freed)
            .count()
    }

    /// The bound partial, if any
    pub fn partials(&self) -> Option<&RowContainer> {
        self.partials.as_ref()
    }

    /// The bound result, if any
    pub fn result(&self) -> Option<&RowContainer> {
        self.result.as_ref()
    }

    /// Whether the bound containers share storage
    pub fn is_aliased(&self) -> bool {
        match (&self.partials, &self.result) {
            (Some(p), Some(r)) => p.shares_storage_with(r),
            _ => false,
        }
    }
}
