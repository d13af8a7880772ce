//! Coordinator main loop
//!
//! Every coordinator runs the same loop in lockstep:
//!
//! ```text
//! AwaitingQuery -> Broadcasting -> ForwardingToWorker
//!     -> (EXIT) Terminated
//!     -> CollectingPartials -> Aggregating -> Delivering -> AwaitingQuery
//! ```
//!
//! Only the Root reads from and writes to the operator. A fatal error aborts
//! the whole cluster: peers blocked in a collective would otherwise wait
//! forever for this coordinator.

use super::collect::wait_for_reply;
use super::dispatch::{aggregate, AggregationObservers};
use super::errors::{CoordinatorError, CoordinatorResult};
use super::forward::forward_query;
use super::state::{IterationState, LoopPhase};
use crate::frontend::Frontend;
use crate::model::Query;
use crate::observability::{
    log_event, log_event_with_fields, CoordinatorMetrics, Event, LogCheckpoints, Logger,
    LoopSummary, SortCheckpoints,
};
use crate::topology::{ClusterTopology, Role};

/// One coordinator's main loop
pub struct Coordinator {
    topology: ClusterTopology,
    checkpoints: Box<dyn SortCheckpoints>,
    metrics: CoordinatorMetrics,
    phase: LoopPhase,
}

impl Coordinator {
    /// Create a coordinator over its topology. Checkpoints go to the log.
    pub fn new(topology: ClusterTopology) -> CoordinatorResult<Self> {
        if topology.role() != Role::Coordinator {
            return Err(CoordinatorError::configuration(format!(
                "rank {} is a worker",
                topology.rank()
            )));
        }

        Ok(Self {
            topology,
            checkpoints: Box::new(LogCheckpoints),
            metrics: CoordinatorMetrics::new(),
            phase: LoopPhase::AwaitingQuery,
        })
    }

    /// Replace the distributed-sort checkpoint observer
    pub fn with_checkpoints(mut self, checkpoints: Box<dyn SortCheckpoints>) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    /// Current loop phase
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Run until EXIT.
    ///
    /// The Root must be given the operator front end; every other
    /// coordinator passes `None`. On a fatal error the cluster is aborted
    /// before the error is returned.
    pub fn run(&mut self, frontend: Option<&mut dyn Frontend>) -> CoordinatorResult<LoopSummary> {
        let rank = self.topology.rank();
        let mut state = IterationState::new();

        let outcome = match (self.topology.is_root(), frontend) {
            (true, None) => Err(CoordinatorError::configuration(
                "Root coordinator started without an operator front end",
            )),
            (true, Some(frontend)) => self.run_loop(&mut state, Some(frontend)),
            (false, _) => self.run_loop(&mut state, None),
        };

        self.metrics.add_storage_released(state.release() as u64);

        match outcome {
            Ok(()) => {
                self.phase = LoopPhase::Terminated;
                log_event(Event::CoordinatorExit, rank);
                Ok(self.metrics.snapshot())
            }
            Err(e) => {
                log_event_with_fields(
                    Event::CoordinatorFailed,
                    rank,
                    &[
                        ("code", e.code().code()),
                        ("message", e.message()),
                        ("phase", self.phase.as_str()),
                    ],
                );
                if e.is_fatal() {
                    self.topology.global_group().abort(&e.to_string());
                }
                Err(e)
            }
        }
    }

    fn run_loop(
        &mut self,
        state: &mut IterationState,
        mut frontend: Option<&mut dyn Frontend>,
    ) -> CoordinatorResult<()> {
        let rank = self.topology.rank();

        loop {
            self.metrics.add_storage_released(state.release() as u64);

            self.phase = LoopPhase::AwaitingQuery;
            let pending = match frontend.as_deref_mut() {
                Some(frontend) => Some(read_query(frontend, rank)),
                None => None,
            };

            self.phase = LoopPhase::Broadcasting;
            let query = forward_query(&self.topology, pending.as_ref())?;
            self.phase = LoopPhase::ForwardingToWorker;
            log_event_with_fields(
                Event::QueryForwarded,
                rank,
                &[("query", query.kind().as_str())],
            );

            if query.is_exit() {
                if let Some(frontend) = frontend.as_deref_mut() {
                    if let Err(e) = frontend.farewell() {
                        report_frontend_failure(rank, &CoordinatorError::from(e));
                    }
                }
                return Ok(());
            }

            self.phase = LoopPhase::CollectingPartials;
            let mut partials = wait_for_reply(&self.topology)?;
            self.metrics.add_rows_collected(partials.len() as u64);
            log_event_with_fields(
                Event::PartialsCollected,
                rank,
                &[("rows", &partials.len().to_string())],
            );

            self.phase = LoopPhase::Aggregating;
            let observers = AggregationObservers {
                checkpoints: self.checkpoints.as_ref(),
                metrics: &self.metrics,
            };
            let result = aggregate(&self.topology, &query, &mut partials, &observers)?;
            let aliased = result.shares_storage_with(&partials);
            log_event_with_fields(
                Event::AggregationComplete,
                rank,
                &[
                    ("aliased", &aliased.to_string()),
                    ("rows", &result.len().to_string()),
                ],
            );
            self.metrics
                .add_storage_released(state.bind(partials, result) as u64);

            if let (Some(frontend), Some(result)) = (frontend.as_deref_mut(), state.result()) {
                self.phase = LoopPhase::Delivering;
                match frontend.deliver(&query, result.rows()) {
                    Ok(()) => {
                        self.metrics.add_rows_delivered(result.len() as u64);
                        log_event_with_fields(
                            Event::ResultDelivered,
                            rank,
                            &[
                                ("query", query.kind().as_str()),
                                ("rows", &result.len().to_string()),
                            ],
                        );
                    }
                    Err(e) => report_frontend_failure(rank, &CoordinatorError::from(e)),
                }
            }

            self.metrics.increment_queries_completed();
        }
    }
}

/// Next query from the operator. An unreadable operator channel ends the
/// session the same way end of input does.
fn read_query(frontend: &mut dyn Frontend, rank: usize) -> Query {
    match frontend.next_query() {
        Ok(query) => {
            log_event_with_fields(Event::QueryReceived, rank, &[("query", query.kind().as_str())]);
            query
        }
        Err(e) => {
            report_frontend_failure(rank, &CoordinatorError::from(e));
            Query::Exit
        }
    }
}

fn report_frontend_failure(rank: usize, error: &CoordinatorError) {
    Logger::error(
        error.code().code(),
        &[("message", error.message()), ("rank", &rank.to_string())],
    );
}
