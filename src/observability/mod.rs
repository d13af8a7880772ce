//! Observability subsystem for paradb
//!
//! - Structured logging (JSON lines on stderr)
//! - Per-coordinator counters
//! - Distributed-sort checkpoints
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on protocol control flow
//! 3. No background threads
//! 4. Deterministic output

mod checkpoints;
mod events;
mod logger;
mod metrics;

pub use checkpoints::{LogCheckpoints, SortCheckpoints};
pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{CoordinatorMetrics, LoopSummary};

/// Log a lifecycle event for one rank
pub fn log_event(event: Event, rank: usize) {
    log_event_with_fields(event, rank, &[]);
}

/// Log a lifecycle event for one rank with extra fields
pub fn log_event_with_fields(event: Event, rank: usize, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else if event.is_checkpoint() {
        Severity::Trace
    } else {
        Severity::Info
    };

    let rank = rank.to_string();
    let mut all_fields: Vec<(&str, &str)> = Vec::with_capacity(fields.len() + 1);
    all_fields.push(("rank", &rank));
    all_fields.extend(fields.iter().copied());
    Logger::log(severity, event.as_str(), &all_fields);
}
