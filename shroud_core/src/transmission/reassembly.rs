/*! Buffering of packets until their transmission can be joined.
*/

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use shroud_crypto::Id;
use shroud_packet::transport::*;

use super::errors::JoinError;
use super::join::join;
use super::segment::PacketSegments;

/// Packets of a transmission received so far.
#[derive(Clone, Debug)]
struct Pending {
    /// When the first packet arrived
    started: Instant,
    /// Metadata every packet must share with the first one
    length: u32,
    parity: u8,
    s_len: usize,
    segments: PacketSegments,
    /// Distinct shards received per group
    received: Vec<usize>,
    /// Groups with at least as many shards as data shards
    ready: usize,
    /// Last join found a group short of shards
    stalled: bool,
    /// Index of the first packet with a sequence number
    index: HashMap<u16, usize>,
    /// Sequence numbers with two different packets
    conflicts: HashSet<u16>,
    packets: Vec<Packet>,
}

impl Pending {
    fn new(packet: &Packet) -> Result<Pending, JoinError> {
        let s_len = packet.data.len();
        let segments = PacketSegments::new(packet.length as usize, s_len + PACKET_OVERHEAD, PACKET_OVERHEAD, packet.parity)
            .map_err(|_| JoinError::MetadataMismatch { field: "length", seq: packet.seq })?;
        Ok(Pending {
            started: packet.timestamp,
            length: packet.length,
            parity: packet.parity,
            s_len,
            received: vec![0; segments.segments().len()],
            segments,
            ready: 0,
            stalled: false,
            index: HashMap::new(),
            conflicts: HashSet::new(),
            packets: Vec::new(),
        })
    }

    fn check(&self, packet: &Packet) -> Result<(), JoinError> {
        let mismatch = |field| JoinError::MetadataMismatch { field, seq: packet.seq };
        if packet.length != self.length {
            return Err(mismatch("length"))
        }
        if packet.parity != self.parity {
            return Err(mismatch("parity"))
        }
        if packet.data.len() != self.s_len {
            return Err(mismatch("shard size"))
        }
        if packet.seq as usize >= self.segments.packets() {
            return Err(JoinError::SequenceOutOfRange { seq: packet.seq, total: self.segments.packets() })
        }
        Ok(())
    }

    /// Store checked packet. Returns whether the transmission is worth
    /// joining now.
    fn push(&mut self, packet: Packet) -> bool {
        if let Some(&i) = self.index.get(&packet.seq) {
            // join erases both copies, further copies change nothing
            if self.packets[i] != packet && self.conflicts.insert(packet.seq) {
                self.packets.push(packet);
            }
            return false
        }

        let mut filled = false;
        if let Some(group) = self.segments.group_of(packet.seq as usize) {
            self.received[group] += 1;
            if self.received[group] == self.segments.segments()[group].data_shards() {
                self.ready += 1;
                filled = true;
            }
        }
        self.index.insert(packet.seq, self.packets.len());
        self.packets.push(packet);
        self.ready == self.received.len() && (filled || self.stalled)
    }
}

/** Collects decrypted packets of many transmissions.

A transmission is joined once every group has as many packets as data shards.
If conflicting duplicates leave a group short, it is joined again on every
further new packet. Transmissions that don't complete within the timeout are
dropped. Ids of finished transmissions are remembered for the same time so
late packets don't start them over.
*/
#[derive(Clone, Debug)]
pub struct Reassembler {
    timeout: Duration,
    pending: HashMap<Id, Pending>,
    /// Finished transmissions and when they finished
    finished: HashMap<Id, Instant>,
}

impl Reassembler {
    /// Create new `Reassembler`.
    pub fn new(timeout: Duration) -> Reassembler {
        Reassembler { timeout, pending: HashMap::new(), finished: HashMap::new() }
    }

    fn finish(&mut self, id: Id, now: Instant, result: Result<Vec<u8>, JoinError>) -> Option<Result<Vec<u8>, JoinError>> {
        self.pending.remove(&id);
        self.finished.insert(id, now);
        Some(result)
    }

    /** Add packet to its transmission.

    Returns `None` while the transmission is incomplete. Once it is complete or
    can't ever be completed the transmission is forgotten and its payload or
    error is returned. Packets of finished transmissions are ignored.
    */
    pub fn add(&mut self, packet: Packet) -> Option<Result<Vec<u8>, JoinError>> {
        let id = packet.id;
        let now = packet.timestamp;
        if self.finished.contains_key(&id) {
            trace!("Ignoring packet {} of finished transmission {:02X?}", packet.seq, id);
            return None
        }
        if !self.pending.contains_key(&id) {
            match Pending::new(&packet) {
                Ok(pending) => {
                    trace!("New transmission {:02X?} needs {} packets", id, pending.segments.data_packets());
                    self.pending.insert(id, pending);
                },
                Err(e) => return self.finish(id, now, Err(e)),
            }
        }

        let pending = self.pending.get_mut(&id)?;
        if let Err(e) = pending.check(&packet) {
            return self.finish(id, now, Err(e))
        }
        if !pending.push(packet) {
            return None
        }

        match join(pending.packets.clone()) {
            Err(JoinError::NotEnoughShards { group, have, need }) => {
                trace!("Transmission {:02X?} waits for group {}: {} of {}", id, group, have, need);
                pending.stalled = true;
                None
            },
            result => self.finish(id, now, result.map(|(_, payload)| payload)),
        }
    }

    /// Drop transmissions that started more than the timeout before `now`.
    /// Returns their ids.
    pub fn clear_expired(&mut self, now: Instant) -> Vec<Id> {
        let timeout = self.timeout;
        self.finished.retain(|_, finished| now.saturating_duration_since(*finished) <= timeout);
        let expired: Vec<Id> = self.pending.iter()
            .filter(|(_, pending)| now.saturating_duration_since(pending.started) > timeout)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            debug!("Transmission {:02X?} expired", id);
            self.pending.remove(id);
        }
        expired
    }

    /// Number of incomplete transmissions.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether there are no incomplete transmissions.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
