/*! Splitting payloads into packets.
*/

use reed_solomon_erasure::galois_8::ReedSolomon;

use shroud_crypto::*;
use shroud_packet::transport::*;

use super::errors::SplitError;
use super::segment::PacketSegments;

/// What to split and how.
#[derive(Clone, Copy, Debug)]
pub struct SplitParams<'a> {
    /// Transmission id
    pub id: Id,
    /// Payload to split
    pub payload: &'a [u8],
    /// Size of every resulting packet
    pub packet_size: usize,
    /// Parity shards per group of 256
    pub parity: u8,
}

impl<'a> SplitParams<'a> {
    /// Split `payload` under a fresh transmission id.
    pub fn new(payload: &'a [u8], packet_size: usize, parity: u8) -> SplitParams<'a> {
        SplitParams { id: gen_id(), payload, packet_size, parity }
    }
}

/** Split payload into unencrypted packets.

Every data shard is exactly one shard size long, the last one is padded with
zeroes. Parity shards of every group are computed with a systematic
Reed-Solomon code over GF(2^8).
*/
pub fn split_packets(params: &SplitParams) -> Result<Vec<Packet>, SplitError> {
    let len = params.payload.len();
    if len > u32::MAX as usize {
        return Err(SplitError::PayloadTooLarge { len })
    }
    let segments = PacketSegments::new(len, params.packet_size, PACKET_OVERHEAD, params.parity)?;

    let mut packets = Vec::with_capacity(segments.packets());
    let mut chunks = params.payload.chunks(params.packet_size - PACKET_OVERHEAD);
    for segment in segments.segments() {
        let mut shards = Vec::with_capacity(segment.data_shards() + segment.parity_shards());
        for _ in 0..segment.data_shards() {
            let mut shard = chunks.next().map_or_else(Vec::new, <[u8]>::to_vec);
            shard.resize(segment.s_len, 0);
            shards.push(shard);
        }

        if segment.parity_shards() > 0 {
            shards.resize(segment.data_shards() + segment.parity_shards(), vec![0; segment.s_len]);
            let codec = ReedSolomon::new(segment.data_shards(), segment.parity_shards())?;
            codec.encode(&mut shards)?;
        }

        for (i, shard) in shards.into_iter().enumerate() {
            let seq = (segment.d_start + i) as u16;
            packets.push(Packet::new(params.id, seq, len as u32, params.parity, shard));
        }
    }
    Ok(packets)
}

/** Split payload into encrypted packets addressed to `to`.

Every packet is sealed with its own one-time key. All packets carry the same
cloak so the recipient can recognise the batch.
*/
pub fn split(params: &SplitParams, to: &PublicKey) -> Result<Vec<Vec<u8>>, SplitError> {
    let cloak = cloak(to);
    split_packets(params)?
        .iter()
        .map(|packet| packet.seal(to, &cloak).map_err(SplitError::from))
        .collect()
}
