//! In-process transport
//!
//! Each rank is a thread holding a `LocalEndpoint`. Sends append to the
//! destination mailbox; receives block on the caller's own mailbox.

use std::sync::Arc;
use std::time::Duration;

use super::errors::{CommError, CommResult};
use super::mailbox::{AbortSignal, Envelope, Mailbox};
use super::Transport;

#[derive(Debug)]
struct Shared {
    mailboxes: Vec<Mailbox>,
    abort: AbortSignal,
    recv_timeout: Option<Duration>,
}

/// A world of in-process ranks sharing one set of mailboxes.
#[derive(Debug, Clone)]
pub struct LocalCluster {
    shared: Arc<Shared>,
}

impl LocalCluster {
    /// Create a world of `world_size` ranks. Receives block indefinitely.
    pub fn new(world_size: usize) -> Self {
        Self::build(world_size, None)
    }

    /// Create a world whose receives fail after `timeout` without a match.
    pub fn with_recv_timeout(world_size: usize, timeout: Duration) -> Self {
        Self::build(world_size, Some(timeout))
    }

    fn build(world_size: usize, recv_timeout: Option<Duration>) -> Self {
        Self {
            shared: Arc::new(Shared {
                mailboxes: (0..world_size).map(|_| Mailbox::new()).collect(),
                abort: AbortSignal::default(),
                recv_timeout,
            }),
        }
    }

    /// Number of ranks
    pub fn world_size(&self) -> usize {
        self.shared.mailboxes.len()
    }

    /// Endpoint for one rank
    pub fn endpoint(&self, rank: usize) -> CommResult<LocalEndpoint> {
        if rank >= self.world_size() {
            return Err(CommError::invalid_rank(format!(
                "rank {} outside world of {}",
                rank,
                self.world_size()
            )));
        }
        Ok(LocalEndpoint {
            rank,
            shared: Arc::clone(&self.shared),
        })
    }

    /// Whether any rank aborted the cluster
    pub fn is_aborted(&self) -> bool {
        self.shared.abort.is_raised()
    }

    /// Reason given by the first rank that aborted
    pub fn abort_reason(&self) -> Option<String> {
        self.shared.abort.reason()
    }
}

/// One rank's view of a `LocalCluster`
#[derive(Debug)]
pub struct LocalEndpoint {
    rank: usize,
    shared: Arc<Shared>,
}

impl LocalEndpoint {
    fn mailbox(&self, rank: usize) -> CommResult<&Mailbox> {
        self.shared.mailboxes.get(rank).ok_or_else(|| {
            CommError::invalid_rank(format!(
                "rank {} outside world of {}",
                rank,
                self.shared.mailboxes.len()
            ))
        })
    }
}

impl Transport for LocalEndpoint {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.shared.mailboxes.len()
    }

    fn send(&self, dest: usize, context: u32, tag: u32, payload: Vec<u8>) -> CommResult<()> {
        if self.shared.abort.is_raised() {
            return Err(self.shared.abort.to_error());
        }
        self.mailbox(dest)?.deliver(Envelope {
            source: self.rank,
            context,
            tag,
            payload,
        });
        Ok(())
    }

    fn probe(&self, source: usize, context: u32, tag: u32) -> CommResult<usize> {
        self.mailbox(source)?;
        self.mailbox(self.rank)?.probe(
            source,
            context,
            tag,
            &self.shared.abort,
            self.shared.recv_timeout,
        )
    }

    fn recv_into(
        &self,
        source: usize,
        context: u32,
        tag: u32,
        buffer: &mut [u8],
    ) -> CommResult<usize> {
        self.mailbox(source)?;
        self.mailbox(self.rank)?.recv_into(
            source,
            context,
            tag,
            buffer,
            &self.shared.abort,
            self.shared.recv_timeout,
        )
    }

    fn abort(&self, reason: &str) {
        self.shared
            .abort
            .raise(&format!("rank {} aborted: {}", self.rank, reason));
        for mailbox in &self.shared.mailboxes {
            mailbox.interrupt();
        }
    }
}
