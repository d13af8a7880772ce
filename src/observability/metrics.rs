//! Per-coordinator counters
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters maintained by one coordinator's main loop
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    /// Queries that completed aggregation (EXIT excluded)
    queries_completed: AtomicU64,
    /// Rows received from the paired worker
    rows_collected: AtomicU64,
    /// Rows received during distributed-sort redistribution
    rows_exchanged: AtomicU64,
    /// Rows handed to the operator (Root only)
    rows_delivered: AtomicU64,
    /// Container storage blocks freed
    storage_released: AtomicU64,
}

impl CoordinatorMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment completed queries
    pub fn increment_queries_completed(&self) {
        self.queries_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Add rows collected from the worker
    pub fn add_rows_collected(&self, rows: u64) {
        self.rows_collected.fetch_add(rows, Ordering::Relaxed);
    }

    /// Add rows received in the personalized exchange
    pub fn add_rows_exchanged(&self, rows: u64) {
        self.rows_exchanged.fetch_add(rows, Ordering::Relaxed);
    }

    /// Add rows delivered to the operator
    pub fn add_rows_delivered(&self, rows: u64) {
        self.rows_delivered.fetch_add(rows, Ordering::Relaxed);
    }

    /// Add freed storage blocks
    pub fn add_storage_released(&self, blocks: u64) {
        self.storage_released.fetch_add(blocks, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> LoopSummary {
        LoopSummary {
            queries_completed: self.queries_completed.load(Ordering::Relaxed),
            rows_collected: self.rows_collected.load(Ordering::Relaxed),
            rows_exchanged: self.rows_exchanged.load(Ordering::Relaxed),
            rows_delivered: self.rows_delivered.load(Ordering::Relaxed),
            storage_released: self.storage_released.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of a coordinator's counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoopSummary {
    pub queries_completed: u64,
    pub rows_collected: u64,
    pub rows_exchanged: u64,
    pub rows_delivered: u64,
    pub storage_released: u64,
}
