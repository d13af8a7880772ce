//! Process groups and collective operations
//!
//! A group is an ordered list of world ranks plus a message context. Members
//! are addressed by their index in the list. Collectives are built from
//! point-to-point messages on reserved tags, so they never match
//! application messages.
//!
//! # Lockstep contract
//!
//! Every member must call the same collectives in the same order with
//! agreeing roots and shapes. Nothing here detects a member that skipped a
//! call: the others block until it arrives.

use std::sync::Arc;

use super::errors::{CommError, CommResult};
use super::Transport;
use crate::wire::{decode_slice, encode_slice, WireRecord};

/// Context of the group containing every process
pub const GLOBAL_CONTEXT: u32 = 0;

/// Context of a same-role subgroup
pub const PEER_CONTEXT: u32 = 1;

const TAG_BROADCAST: u32 = 0x1000;
const TAG_REDUCE: u32 = 0x1001;
const TAG_ALLTOALL: u32 = 0x1002;
const TAG_ALLTOALLV: u32 = 0x1003;
const TAG_GATHER: u32 = 0x1004;
const TAG_GATHERV: u32 = 0x1005;
const TAG_ALLGATHER: u32 = 0x1006;

/// An ordered group of processes sharing one transport.
#[derive(Clone)]
pub struct Group {
    transport: Arc<dyn Transport>,
    members: Vec<usize>,
    context: u32,
    index: usize,
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("members", &self.members)
            .field("context", &self.context)
            .field("index", &self.index)
            .finish()
    }
}

impl Group {
    /// Build a group. The calling process must be one of `members`.
    pub fn new(transport: Arc<dyn Transport>, members: Vec<usize>, context: u32) -> CommResult<Self> {
        let rank = transport.rank();
        let index = members.iter().position(|&m| m == rank).ok_or_else(|| {
            CommError::invalid_rank(format!("rank {} is not a member of {:?}", rank, members))
        })?;
        Ok(Self {
            transport,
            members,
            context,
            index,
        })
    }

    /// Number of members
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// This process's index within the group
    pub fn index(&self) -> usize {
        self.index
    }

    /// World rank of a member
    pub fn member(&self, index: usize) -> CommResult<usize> {
        self.members.get(index).copied().ok_or_else(|| {
            CommError::invalid_rank(format!(
                "index {} outside group of {}",
                index,
                self.members.len()
            ))
        })
    }

    /// Shared handle to the underlying transport
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Abort the cluster through the underlying transport
    pub fn abort(&self, reason: &str) {
        self.transport.abort(reason);
    }

    // ---------------------------------------------------------------------
    // Point-to-point
    // ---------------------------------------------------------------------

    /// Send a message to the member at `dest`
    pub fn send(&self, dest: usize, tag: u32, payload: Vec<u8>) -> CommResult<()> {
        let rank = self.member(dest)?;
        self.transport.send(rank, self.context, tag, payload)
    }

    /// Block until a message from `source` is available; return its byte length
    pub fn probe(&self, source: usize, tag: u32) -> CommResult<usize> {
        let rank = self.member(source)?;
        self.transport.probe(rank, self.context, tag)
    }

    /// Receive a message from `source` into `buffer`
    pub fn recv_into(&self, source: usize, tag: u32, buffer: &mut [u8]) -> CommResult<usize> {
        let rank = self.member(source)?;
        self.transport.recv_into(rank, self.context, tag, buffer)
    }

    /// Receive a message whose size both sides already agree on.
    fn recv_exact(&self, source: usize, tag: u32, buffer: &mut [u8]) -> CommResult<()> {
        let len = self.recv_into(source, tag, buffer)?;
        if len != buffer.len() {
            return Err(CommError::shape_mismatch(format!(
                "expected {} bytes from member {}, received {}",
                buffer.len(),
                source,
                len
            )));
        }
        Ok(())
    }

    fn recv_record<T: WireRecord>(&self, source: usize, tag: u32) -> CommResult<T> {
        let mut buffer = vec![0u8; T::DATATYPE.stride];
        self.recv_exact(source, tag, &mut buffer)?;
        Ok(T::decode(&buffer)?)
    }

    fn check_root(&self, root: usize) -> CommResult<()> {
        if root >= self.size() {
            return Err(CommError::invalid_rank(format!(
                "root {} outside group of {}",
                root,
                self.size()
            )));
        }
        Ok(())
    }

    fn check_len(&self, what: &str, len: usize) -> CommResult<()> {
        if len != self.size() {
            return Err(CommError::shape_mismatch(format!(
                "{} has {} entries for a group of {}",
                what,
                len,
                self.size()
            )));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Collectives
    // ---------------------------------------------------------------------

    /// Broadcast one record from `root` to every member.
    ///
    /// The root passes `Some(value)`; other members pass `None` and receive
    /// the root's value.
    pub fn broadcast<T: WireRecord>(&self, root: usize, value: Option<&T>) -> CommResult<T> {
        self.check_root(root)?;

        if self.index != root {
            return self.recv_record(root, TAG_BROADCAST);
        }

        let value = value.ok_or_else(|| {
            CommError::shape_mismatch("broadcast root supplied no value")
        })?;
        let mut payload = Vec::with_capacity(T::DATATYPE.stride);
        value.encode_into(&mut payload);

        for member in (0..self.size()).filter(|&m| m != root) {
            self.send(member, TAG_BROADCAST, payload.clone())?;
        }
        Ok(T::decode(&payload)?)
    }

    /// Sum one value from every member at `root`.
    ///
    /// The root returns `Some(total)`, summed in member order; other members
    /// return `None`.
    pub fn reduce_sum_f64(&self, root: usize, value: f64) -> CommResult<Option<f64>> {
        self.check_root(root)?;

        if self.index != root {
            self.send(root, TAG_REDUCE, encode_slice(&[value]))?;
            return Ok(None);
        }

        let mut total = 0.0;
        for member in 0..self.size() {
            total += if member == root {
                value
            } else {
                self.recv_record::<f64>(member, TAG_REDUCE)?
            };
        }
        Ok(Some(total))
    }

    /// Personalized exchange of one record per member.
    ///
    /// `send[i]` goes to member `i`; the result holds at index `j` the value
    /// member `j` addressed to this process.
    pub fn alltoall<T: WireRecord + Copy>(&self, send: &[T]) -> CommResult<Vec<T>> {
        self.check_len("alltoall send buffer", send.len())?;

        for (member, value) in send.iter().enumerate() {
            if member != self.index {
                self.send(member, TAG_ALLTOALL, encode_slice(std::slice::from_ref(value)))?;
            }
        }

        let mut received = Vec::with_capacity(self.size());
        for member in 0..self.size() {
            received.push(if member == self.index {
                send[member]
            } else {
                self.recv_record(member, TAG_ALLTOALL)?
            });
        }
        Ok(received)
    }

    /// Personalized exchange of variable-length record runs.
    ///
    /// Sends `send[send_offsets[i]..][..send_counts[i]]` to member `i` and
    /// receives `recv_counts[j]` records from member `j`, placing them
    /// contiguously in member order.
    pub fn alltoallv<T: WireRecord>(
        &self,
        send: &[T],
        send_counts: &[usize],
        send_offsets: &[usize],
        recv_counts: &[usize],
    ) -> CommResult<Vec<T>> {
        self.check_len("alltoallv send counts", send_counts.len())?;
        self.check_len("alltoallv send offsets", send_offsets.len())?;
        self.check_len("alltoallv receive counts", recv_counts.len())?;

        let stride = T::DATATYPE.stride;
        let mut outgoing = Vec::with_capacity(self.size());
        for member in 0..self.size() {
            let start = send_offsets[member];
            let end = start + send_counts[member];
            let run = send.get(start..end).ok_or_else(|| {
                CommError::shape_mismatch(format!(
                    "send run {}..{} for member {} exceeds {} records",
                    start,
                    end,
                    member,
                    send.len()
                ))
            })?;
            outgoing.push(encode_slice(run));
        }

        let mut own = Vec::new();
        for (member, payload) in outgoing.into_iter().enumerate() {
            if member == self.index {
                own = payload;
            } else {
                self.send(member, TAG_ALLTOALLV, payload)?;
            }
        }

        let total: usize = recv_counts.iter().sum();
        let mut buffer = vec![0u8; total * stride];
        let mut offset = 0;
        for (member, &count) in recv_counts.iter().enumerate() {
            let segment = &mut buffer[offset..offset + count * stride];
            if member == self.index {
                if own.len() != segment.len() {
                    return Err(CommError::shape_mismatch(format!(
                        "member {} keeps {} bytes but expects {}",
                        member,
                        own.len(),
                        segment.len()
                    )));
                }
                segment.copy_from_slice(&own);
            } else {
                self.recv_exact(member, TAG_ALLTOALLV, segment)?;
            }
            offset += count * stride;
        }

        Ok(decode_slice(&buffer)?)
    }

    /// Gather one record from every member at `root`, in member order.
    pub fn gather<T: WireRecord + Copy>(&self, root: usize, value: T) -> CommResult<Option<Vec<T>>> {
        self.check_root(root)?;

        if self.index != root {
            self.send(root, TAG_GATHER, encode_slice(&[value]))?;
            return Ok(None);
        }

        let mut gathered = Vec::with_capacity(self.size());
        for member in 0..self.size() {
            gathered.push(if member == root {
                value
            } else {
                self.recv_record(member, TAG_GATHER)?
            });
        }
        Ok(Some(gathered))
    }

    /// Gather variable-length record runs at `root`.
    ///
    /// The root supplies the run length and destination offset of every
    /// member; other members pass empty slices. The root returns a buffer of
    /// the summed length with member `i`'s run at `recv_offsets[i]`.
    pub fn gatherv<T: WireRecord>(
        &self,
        root: usize,
        send: &[T],
        recv_counts: &[usize],
        recv_offsets: &[usize],
    ) -> CommResult<Option<Vec<T>>> {
        self.check_root(root)?;

        if self.index != root {
            self.send(root, TAG_GATHERV, encode_slice(send))?;
            return Ok(None);
        }

        self.check_len("gatherv receive counts", recv_counts.len())?;
        self.check_len("gatherv receive offsets", recv_offsets.len())?;

        let stride = T::DATATYPE.stride;
        let total: usize = recv_counts.iter().sum();
        let mut buffer = vec![0u8; total * stride];

        for member in 0..self.size() {
            let start = recv_offsets[member] * stride;
            let end = start + recv_counts[member] * stride;
            if end > buffer.len() {
                return Err(CommError::shape_mismatch(format!(
                    "run of member {} ends at byte {} past buffer of {}",
                    member,
                    end,
                    buffer.len()
                )));
            }
            let segment = &mut buffer[start..end];
            if member == root {
                let own = encode_slice(send);
                if own.len() != segment.len() {
                    return Err(CommError::shape_mismatch(format!(
                        "root contributes {} bytes but reserved {}",
                        own.len(),
                        segment.len()
                    )));
                }
                segment.copy_from_slice(&own);
            } else {
                self.recv_exact(member, TAG_GATHERV, segment)?;
            }
        }

        Ok(Some(decode_slice(&buffer)?))
    }

    /// Every member contributes a run of records and receives all runs,
    /// indexed by member.
    pub fn allgather<T: WireRecord + Clone>(&self, values: &[T]) -> CommResult<Vec<Vec<T>>> {
        let payload = encode_slice(values);
        for member in (0..self.size()).filter(|&m| m != self.index) {
            self.send(member, TAG_ALLGATHER, payload.clone())?;
        }

        let mut gathered = Vec::with_capacity(self.size());
        for member in 0..self.size() {
            if member == self.index {
                gathered.push(values.to_vec());
                continue;
            }
            let len = self.probe(member, TAG_ALLGATHER)?;
            let mut buffer = vec![0u8; len];
            self.recv_exact(member, TAG_ALLGATHER, &mut buffer)?;
            gathered.push(decode_slice(&buffer)?);
        }
        Ok(gathered)
    }
}
