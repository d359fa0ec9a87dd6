/*! Layout of a transmission in packets.
*/

use super::errors::SplitError;

/// Number of data and parity shards in a full group.
pub const GROUP_SIZE: usize = 256;

/// Largest number of packets a transmission can have. Sequence numbers are
/// `u16`.
pub const MAX_PACKETS: usize = u16::MAX as usize + 1;

/** One Reed-Solomon group of a transmission.

Packets `d_start..d_end` carry data shards, packets `d_end..p_end` carry
parity shards.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PacketSegment {
    /// Sequence number of the first data packet
    pub d_start: usize,
    /// Sequence number after the last data packet
    pub d_end: usize,
    /// Sequence number after the last parity packet
    pub p_end: usize,
    /// Size of a shard
    pub s_len: usize,
    /// Bytes of payload in the last data shard
    pub last: usize,
}

impl PacketSegment {
    /// Number of data shards.
    pub fn data_shards(&self) -> usize {
        self.d_end - self.d_start
    }

    /// Number of parity shards.
    pub fn parity_shards(&self) -> usize {
        self.p_end - self.d_end
    }

    /// Number of payload bytes carried by the group.
    pub fn payload_len(&self) -> usize {
        (self.data_shards() - 1) * self.s_len + self.last
    }
}

/// Shard size for packets of `packet_size` bytes.
pub fn shard_size(packet_size: usize, overhead: usize) -> Result<usize, SplitError> {
    if packet_size <= overhead {
        return Err(SplitError::PacketTooSmall { packet_size, overhead })
    }
    Ok(packet_size - overhead)
}

/// Parity shards of a last group with `data` of `k` data shards.
fn partial_parity(data: usize, parity: usize, k: usize) -> usize {
    if data == 0 {
        return 0
    }
    let partial = data * parity / k;
    if parity > 0 && partial == 0 { 1 } else { partial }
}

/** Deterministic layout of a payload in packets.

A full group has `256 - parity` data shards and `parity` parity shards. The
remaining `r` data shards form the last group with `r * parity / (256 - parity)`
parity shards, at least one when `parity` is not zero.
*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PacketSegments {
    segments: Vec<PacketSegment>,
}

impl PacketSegments {
    /// Compute layout of `payload_len` bytes in packets of `packet_size`
    /// bytes each carrying `overhead` bytes besides shard data.
    pub fn new(payload_len: usize, packet_size: usize, overhead: usize, parity: u8) -> Result<PacketSegments, SplitError> {
        if payload_len == 0 {
            return Err(SplitError::EmptyPayload)
        }
        let s_len = shard_size(packet_size, overhead)?;
        let parity = parity as usize;
        let k = GROUP_SIZE - parity;
        let data_shards = payload_len / s_len + usize::from(payload_len % s_len != 0);
        let tail = payload_len - (data_shards - 1) * s_len;

        let (full, rest) = (data_shards / k, data_shards % k);
        let rest_parity = partial_parity(rest, parity, k);
        let count = full.checked_mul(GROUP_SIZE)
            .and_then(|count| count.checked_add(rest + rest_parity))
            .unwrap_or(usize::MAX);
        if count > MAX_PACKETS {
            return Err(SplitError::TooManyShards { count, max: MAX_PACKETS })
        }

        let mut segments = Vec::with_capacity(full + 1);
        let mut seq = 0;
        let mut remaining = data_shards;
        while remaining > 0 {
            let (data, parity) = if remaining >= k {
                (k, parity)
            } else {
                (remaining, rest_parity)
            };
            remaining -= data;
            segments.push(PacketSegment {
                d_start: seq,
                d_end: seq + data,
                p_end: seq + data + parity,
                s_len,
                last: if remaining == 0 { tail } else { s_len },
            });
            seq += data + parity;
        }

        Ok(PacketSegments { segments })
    }

    /// Groups in order of sequence numbers.
    pub fn segments(&self) -> &[PacketSegment] {
        &self.segments
    }

    /// Total number of packets.
    pub fn packets(&self) -> usize {
        self.segments.last().map_or(0, |segment| segment.p_end)
    }

    /// Total number of data packets.
    pub fn data_packets(&self) -> usize {
        self.segments.iter().map(PacketSegment::data_shards).sum()
    }

    /// Index of the group `seq` belongs to.
    pub fn group_of(&self, seq: usize) -> Option<usize> {
        self.segments.iter().position(|segment| segment.d_start <= seq && seq < segment.p_end)
    }
}
