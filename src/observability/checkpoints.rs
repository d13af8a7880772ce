//! Distributed-sort checkpoints
//!
//! Hooks invoked at fixed points of the bucket sort: after partitioning,
//! after the send-shape exchange and before the final gather. Hooks only
//! observe; they cannot alter the protocol.

use super::events::Event;
use super::logger::{Logger, Severity};

/// Observer of bucket-sort progress on one coordinator
pub trait SortCheckpoints {
    /// Local rows sorted and split into per-peer runs
    fn post_partition(&self, index: usize, send_counts: &[usize], send_offsets: &[usize]);

    /// Peer shapes received: how much each peer sends here, from which offset
    fn post_exchange(&self, index: usize, recv_counts: &[usize], peer_offsets: &[usize]);

    /// Local bucket assembled and re-sorted
    fn pre_gather(&self, index: usize, bucket_len: usize);
}

/// Writes every checkpoint to the structured log at TRACE
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCheckpoints;

fn join(values: &[usize]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl LogCheckpoints {
    /// Write one checkpoint at TRACE. `fields` is only built when TRACE is
    /// enabled. Returns whether the line was written.
    fn record<F>(&self, event: Event, fields: F) -> bool
    where
        F: FnOnce() -> Vec<(&'static str, String)>,
    {
        if !Logger::enabled(Severity::Trace) {
            return false;
        }
        let fields = fields();
        let borrowed: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        Logger::trace(event.as_str(), &borrowed);
        true
    }
}

impl SortCheckpoints for LogCheckpoints {
    fn post_partition(&self, index: usize, send_counts: &[usize], send_offsets: &[usize]) {
        self.record(Event::SortPartitioned, || {
            vec![
                ("coordinator", index.to_string()),
                ("send_counts", join(send_counts)),
                ("send_offsets", join(send_offsets)),
            ]
        });
    }

    fn post_exchange(&self, index: usize, recv_counts: &[usize], peer_offsets: &[usize]) {
        self.record(Event::SortShapeExchanged, || {
            vec![
                ("coordinator", index.to_string()),
                ("recv_counts", join(recv_counts)),
                ("peer_offsets", join(peer_offsets)),
            ]
        });
    }

    fn pre_gather(&self, index: usize, bucket_len: usize) {
        self.record(Event::SortGatherBegin, || {
            vec![
                ("bucket_rows", bucket_len.to_string()),
                ("coordinator", index.to_string()),
            ]
        });
    }
}
