/*! Errors enum for splitting and joining transmissions.
*/

use thiserror::Error;

use shroud_packet::transport::PacketError;

/// Error that can happen when splitting a payload into packets.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SplitError {
    /// Nothing to split.
    #[error("Payload is empty")]
    EmptyPayload,
    /// Packet has no room for shard data.
    #[error("Packet size {packet_size} leaves no room for data after {overhead} bytes of overhead")]
    PacketTooSmall {
        /// Requested packet size.
        packet_size: usize,
        /// Bytes of every packet that are not shard data.
        overhead: usize,
    },
    /// Payload length doesn't fit into the length field.
    #[error("Payload of {len} bytes is too large")]
    PayloadTooLarge {
        /// Payload length.
        len: usize,
    },
    /// Sequence numbers would overflow.
    #[error("Transmission needs {count} packets but at most {max} are allowed")]
    TooManyShards {
        /// Number of packets needed.
        count: usize,
        /// Maximum number of packets.
        max: usize,
    },
    /// Reed-Solomon encoder failed.
    #[error("Erasure coding failed: {0}")]
    Codec(#[from] reed_solomon_erasure::Error),
    /// Packet can't be sealed.
    #[error("Failed to seal packet: {0}")]
    Packet(#[from] PacketError),
}

/// Error that can happen when joining packets into a payload.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum JoinError {
    /// No packets given.
    #[error("No packets to join")]
    Empty,
    /// Packet disagrees with the rest of the transmission.
    #[error("Packet {seq} has a different {field} than the transmission")]
    MetadataMismatch {
        /// Name of the mismatching field.
        field: &'static str,
        /// Sequence number of the packet.
        seq: u16,
    },
    /// Sequence number is outside of the transmission.
    #[error("Packet {seq} is out of range of a transmission of {total} packets")]
    SequenceOutOfRange {
        /// Sequence number of the packet.
        seq: u16,
        /// Number of packets in the transmission.
        total: usize,
    },
    /// Two different packets have the same sequence number and there is no
    /// redundancy to drop both.
    #[error("Conflicting duplicates of packet {seq} without redundancy")]
    DuplicateWithoutRedundancy {
        /// Sequence number of the packets.
        seq: u16,
    },
    /// Group lost more shards than it has parity shards.
    #[error("Group {group} has {have} shards but needs {need}")]
    NotEnoughShards {
        /// Index of the group.
        group: usize,
        /// Shards received.
        have: usize,
        /// Data shards of the group.
        need: usize,
    },
    /// Reed-Solomon decoder failed.
    #[error("Erasure decoding failed: {0}")]
    Codec(#[from] reed_solomon_erasure::Error),
}
