//! Message transport between cluster processes
//!
//! - `Transport`: blocking point-to-point primitives (send, probe, receive)
//! - `Group`: an ordered subset of ranks with its own message context, and
//!   the collective operations built on point-to-point
//! - `LocalCluster`: in-process transport, one mailbox per rank
//!
//! # Ordering
//!
//! Messages are matched by (source, context, tag). Two messages with the same
//! match key are received in the order they were sent. Collectives rely on
//! this: every member of a group must issue the same sequence of collective
//! calls, or the group deadlocks.

mod errors;
mod group;
mod local;
mod mailbox;

pub use errors::{CommError, CommErrorKind, CommResult};
pub use group::{Group, GLOBAL_CONTEXT, PEER_CONTEXT};
pub use local::{LocalCluster, LocalEndpoint};

/// Blocking point-to-point transport seen from one process.
pub trait Transport: Send + Sync {
    /// This process's rank in the world
    fn rank(&self) -> usize;

    /// Number of processes in the world
    fn world_size(&self) -> usize;

    /// Send a message. Returns once the message is queued at the destination.
    fn send(&self, dest: usize, context: u32, tag: u32, payload: Vec<u8>) -> CommResult<()>;

    /// Block until a matching message is available and return its byte length
    /// without consuming it.
    fn probe(&self, source: usize, context: u32, tag: u32) -> CommResult<usize>;

    /// Receive the next matching message into `buffer`.
    ///
    /// Returns the number of bytes written. Fails with `Truncated` if the
    /// message is larger than the buffer; the message is then left queued.
    fn recv_into(&self, source: usize, context: u32, tag: u32, buffer: &mut [u8])
        -> CommResult<usize>;

    /// Abort the whole cluster. Every blocked or future call on any process
    /// fails with `Aborted`.
    fn abort(&self, reason: &str);
}
