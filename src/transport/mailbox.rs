//! Per-rank mailbox for the in-process transport
//!
//! Messages wait in arrival order. A receive takes the oldest message whose
//! (source, context, tag) matches, which keeps same-key messages FIFO.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::errors::{CommError, CommResult};

/// A queued message
#[derive(Debug)]
pub(crate) struct Envelope {
    pub source: usize,
    pub context: u32,
    pub tag: u32,
    pub payload: Vec<u8>,
}

impl Envelope {
    fn matches(&self, source: usize, context: u32, tag: u32) -> bool {
        self.source == source && self.context == context && self.tag == tag
    }
}

/// Cluster-wide abort flag.
#[derive(Debug, Default)]
pub(crate) struct AbortSignal {
    raised: AtomicBool,
    reason: Mutex<Option<String>>,
}

impl AbortSignal {
    /// Raise the signal. Only the first reason is kept.
    pub fn raise(&self, reason: &str) {
        let mut slot = self.reason.lock().unwrap();
        if slot.is_none() {
            *slot = Some(reason.to_string());
        }
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// First reason given, if raised
    pub fn reason(&self) -> Option<String> {
        self.reason.lock().unwrap().clone()
    }

    pub fn to_error(&self) -> CommError {
        let reason = self
            .reason()
            .unwrap_or_else(|| "cluster aborted".to_string());
        CommError::aborted(reason)
    }
}

/// Mailbox of one rank
#[derive(Debug, Default)]
pub(crate) struct Mailbox {
    queue: Mutex<VecDeque<Envelope>>,
    arrived: Condvar,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message and wake any waiting receiver.
    pub fn deliver(&self, envelope: Envelope) {
        let mut queue = self.queue.lock().unwrap();
        queue.push_back(envelope);
        self.arrived.notify_all();
    }

    /// Wake every waiter so it re-checks the abort signal.
    ///
    /// Taking the lock orders this wake-up after any waiter that already
    /// checked the signal and is about to sleep.
    pub fn interrupt(&self) {
        let _queue = self.queue.lock().unwrap();
        self.arrived.notify_all();
    }

    /// Block until a matching message is queued; return its byte length.
    pub fn probe(
        &self,
        source: usize,
        context: u32,
        tag: u32,
        abort: &AbortSignal,
        timeout: Option<Duration>,
    ) -> CommResult<usize> {
        let queue = self.queue.lock().unwrap();
        let (queue, position) = self.wait_for(queue, source, context, tag, abort, timeout)?;
        Ok(queue[position].payload.len())
    }

    /// Block until a matching message is queued and copy it into `buffer`.
    pub fn recv_into(
        &self,
        source: usize,
        context: u32,
        tag: u32,
        buffer: &mut [u8],
        abort: &AbortSignal,
        timeout: Option<Duration>,
    ) -> CommResult<usize> {
        let queue = self.queue.lock().unwrap();
        let (mut queue, position) = self.wait_for(queue, source, context, tag, abort, timeout)?;

        let len = queue[position].payload.len();
        if len > buffer.len() {
            return Err(CommError::truncated(format!(
                "message of {} bytes from rank {} does not fit a {}-byte buffer",
                len,
                source,
                buffer.len()
            )));
        }

        if let Some(envelope) = queue.remove(position) {
            buffer[..len].copy_from_slice(&envelope.payload);
        }
        Ok(len)
    }

    fn wait_for<'a>(
        &'a self,
        mut queue: MutexGuard<'a, VecDeque<Envelope>>,
        source: usize,
        context: u32,
        tag: u32,
        abort: &AbortSignal,
        timeout: Option<Duration>,
    ) -> CommResult<(MutexGuard<'a, VecDeque<Envelope>>, usize)> {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            if let Some(position) = queue.iter().position(|e| e.matches(source, context, tag)) {
                return Ok((queue, position));
            }
            if abort.is_raised() {
                return Err(abort.to_error());
            }

            queue = match deadline {
                None => self.arrived.wait(queue).unwrap(),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(CommError::timeout(format!(
                            "no message from rank {} (context {}, tag {})",
                            source, context, tag
                        )));
                    }
                    self.arrived.wait_timeout(queue, deadline - now).unwrap().0
                }
            };
        }
    }
}
