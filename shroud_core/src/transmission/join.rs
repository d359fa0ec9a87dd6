/*! Joining packets into payloads.
*/

use std::collections::HashSet;

use reed_solomon_erasure::galois_8::ReedSolomon;

use shroud_packet::transport::*;

use super::errors::JoinError;
use super::segment::PacketSegments;

fn mismatch(field: &'static str, packet: &Packet) -> JoinError {
    warn!("Packet {} of transmission {:02X?} has a different {}", packet.seq, packet.id, field);
    JoinError::MetadataMismatch { field, seq: packet.seq }
}

/** Reconstruct payload from packets of one transmission.

Packets may come in any order, with duplicates and with gaps. Returns the
packets the payload was built from, sorted by sequence number, together with
the payload.

Exact duplicates are dropped. Two different packets with the same sequence
number erase that shard when the transmission has parity and fail it when it
doesn't. Groups with missing shards are reconstructed as long as they have at
least as many shards as data shards.
*/
pub fn join(mut packets: Vec<Packet>) -> Result<(Vec<Packet>, Vec<u8>), JoinError> {
    if packets.is_empty() {
        return Err(JoinError::Empty)
    }
    packets.sort_by_key(|packet| packet.seq);

    let first = &packets[0];
    let (id, length, parity, s_len) = (first.id, first.length, first.parity, first.data.len());
    let segments = PacketSegments::new(length as usize, s_len + PACKET_OVERHEAD, PACKET_OVERHEAD, parity)
        .map_err(|_| mismatch("length", first))?;
    let total = segments.packets();

    let mut shards: Vec<Option<Vec<u8>>> = vec![None; total];
    let mut used: Vec<Packet> = Vec::with_capacity(packets.len());
    let mut conflicting = HashSet::new();
    for packet in packets {
        if packet.id != id {
            return Err(mismatch("id", &packet))
        }
        if used.last() == Some(&packet) {
            trace!("Dropping duplicate of packet {}", packet.seq);
            continue
        }
        if conflicting.contains(&packet.seq) {
            continue
        }
        if packet.length != length {
            return Err(mismatch("length", &packet))
        }
        if packet.parity != parity {
            return Err(mismatch("parity", &packet))
        }
        if packet.data.len() != s_len {
            return Err(mismatch("shard size", &packet))
        }
        let seq = packet.seq as usize;
        if seq >= total {
            return Err(JoinError::SequenceOutOfRange { seq: packet.seq, total })
        }
        if used.last().map_or(false, |previous| previous.seq == packet.seq) {
            if parity == 0 {
                return Err(JoinError::DuplicateWithoutRedundancy { seq: packet.seq })
            }
            debug!("Erasing conflicting duplicates of packet {}", packet.seq);
            used.pop();
            shards[seq] = None;
            conflicting.insert(packet.seq);
            continue
        }
        shards[seq] = Some(packet.data.clone());
        used.push(packet);
    }

    let mut payload = Vec::with_capacity(segments.data_packets() * s_len);
    for (group, segment) in segments.segments().iter().enumerate() {
        let mut group_shards: Vec<Option<Vec<u8>>> = shards[segment.d_start..segment.p_end]
            .iter_mut()
            .map(Option::take)
            .collect();
        let have = group_shards.iter().filter(|shard| shard.is_some()).count();
        let need = segment.data_shards();

        if have < group_shards.len() {
            if segment.parity_shards() == 0 || have < need {
                return Err(JoinError::NotEnoughShards { group, have, need })
            }
            debug!("Reconstructing group {} from {} of {} shards", group, have, group_shards.len());
            let codec = ReedSolomon::new(need, segment.parity_shards())?;
            codec.reconstruct_data(&mut group_shards)?;
        }

        for shard in group_shards.into_iter().take(need).flatten() {
            payload.extend_from_slice(&shard);
        }
    }
    payload.truncate(length as usize);

    Ok((used, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck::{quickcheck, TestResult};

    use crate::transmission::segment::GROUP_SIZE;
    use crate::transmission::split::*;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + i / 251) as u8).collect()
    }

    #[test]
    fn join_split_round_trip() {
        for &len in &[1, 1_000, 100_000] {
            for &parity in &[0, 1, 64, 128, 254] {
                let payload = payload(len);
                let packets = split_packets(&SplitParams::new(&payload, 1472, parity)).unwrap();
                let count = packets.len();
                let (used, joined) = join(packets).unwrap();
                assert_eq!(joined, payload, "len {} parity {}", len, parity);
                assert_eq!(used.len(), count);
            }
        }
    }

    #[test]
    fn join_encrypted_round_trip() {
        let (pk, sk) = shroud_crypto::gen_keypair();
        let payload = payload(50_000);
        let raw = split(&SplitParams::new(&payload, 1200, 32), &pk).unwrap();
        let packets = raw.iter().map(|bytes| Packet::open(bytes, &sk).unwrap()).collect();
        assert_eq!(join(packets).unwrap().1, payload);
    }

    #[test]
    fn join_shuffled_with_duplicates() {
        let payload = payload(10_000);
        let mut packets = split_packets(&SplitParams::new(&payload, 500, 0)).unwrap();
        let count = packets.len();
        packets.reverse();
        packets.push(packets[3].clone());
        packets.push(packets[0].clone());
        let (used, joined) = join(packets).unwrap();
        assert_eq!(joined, payload);
        assert_eq!(used.len(), count);
        assert!(used.windows(2).all(|pair| pair[0].seq < pair[1].seq));
    }

    /// Segment map example with 195 byte shards. Transport packets carry 91
    /// bytes of overhead, so the packets are 286 bytes long rather than 256.
    #[test]
    fn erasure_tolerance() {
        let payload = payload(262_255);
        let packets = split_packets(&SplitParams::new(&payload, 195 + PACKET_OVERHEAD, 64)).unwrap();
        assert_eq!(packets.len(), 1794);
        let in_group = |seq: u16, group: u16| seq / GROUP_SIZE as u16 == group;

        // lose 64 shards of group 2, data shards first
        let survivors: Vec<Packet> = packets.iter()
            .filter(|packet| !(in_group(packet.seq, 2) && packet.seq % 256 < 64))
            .cloned()
            .collect();
        assert_eq!(join(survivors).unwrap().1, payload);

        let survivors: Vec<Packet> = packets.iter()
            .filter(|packet| !(in_group(packet.seq, 2) && packet.seq % 256 < 65))
            .cloned()
            .collect();
        assert_eq!(
            join(survivors).err(),
            Some(JoinError::NotEnoughShards { group: 2, have: 191, need: 192 })
        );
    }

    #[test]
    fn missing_shard_without_parity() {
        let payload = payload(5_000);
        let mut packets = split_packets(&SplitParams::new(&payload, 1000, 0)).unwrap();
        packets.remove(2);
        assert_eq!(
            join(packets).err(),
            Some(JoinError::NotEnoughShards { group: 0, have: 5, need: 6 })
        );
    }

    #[test]
    fn same_seq_different_id() {
        let payload = payload(5_000);
        let mut packets = split_packets(&SplitParams::new(&payload, 1000, 64)).unwrap();
        let mut stranger = packets[1].clone();
        stranger.id = [0xFF; shroud_crypto::ID_SIZE];
        packets.push(stranger);
        match join(packets) {
            Err(JoinError::MetadataMismatch { field: "id", seq: 1 }) => {},
            result => panic!("Unexpected {:?}", result),
        }
    }

    #[test]
    fn conflicting_duplicate_without_parity() {
        let payload = payload(5_000);
        let mut packets = split_packets(&SplitParams::new(&payload, 1000, 0)).unwrap();
        let mut conflict = packets[3].clone();
        conflict.data[0] ^= 1;
        packets.push(conflict);
        assert_eq!(join(packets).err(), Some(JoinError::DuplicateWithoutRedundancy { seq: 3 }));
    }

    #[test]
    fn conflicting_duplicate_is_erased() {
        let payload = payload(5_000);
        let mut packets = split_packets(&SplitParams::new(&payload, 1000, 64)).unwrap();
        let count = packets.len();
        let mut conflict = packets[3].clone();
        conflict.data[0] ^= 1;
        packets.push(conflict);
        let (used, joined) = join(packets).unwrap();
        assert_eq!(joined, payload);
        assert_eq!(used.len(), count - 1);
        assert!(used.iter().all(|packet| packet.seq != 3));
    }

    #[test]
    fn length_mismatch() {
        let payload = payload(5_000);
        let mut packets = split_packets(&SplitParams::new(&payload, 1000, 64)).unwrap();
        packets[4].length += 1;
        assert_eq!(
            join(packets).err(),
            Some(JoinError::MetadataMismatch { field: "length", seq: 4 })
        );
    }

    #[test]
    fn sequence_out_of_range() {
        let payload = payload(5_000);
        let mut packets = split_packets(&SplitParams::new(&payload, 1000, 0)).unwrap();
        let total = packets.len();
        let mut extra = packets[0].clone();
        extra.seq = total as u16;
        packets.push(extra);
        assert_eq!(
            join(packets).err(),
            Some(JoinError::SequenceOutOfRange { seq: total as u16, total })
        );
    }

    #[test]
    fn huge_declared_length() {
        for &parity in &[0, 255] {
            let packet = Packet::new([1; shroud_crypto::ID_SIZE], 0, u32::MAX, parity, vec![0]);
            assert_eq!(
                join(vec![packet]).err(),
                Some(JoinError::MetadataMismatch { field: "length", seq: 0 })
            );
        }
    }

    #[test]
    fn join_nothing() {
        assert_eq!(join(Vec::new()).err(), Some(JoinError::Empty));
    }

    #[test]
    fn join_split_quickcheck() {
        fn with_payload(payload: Vec<u8>, parity: u8, packet_size: u8) -> TestResult {
            if payload.is_empty() {
                return TestResult::discard()
            }
            let packet_size = PACKET_OVERHEAD + 1 + packet_size as usize;
            let packets = match split_packets(&SplitParams::new(&payload, packet_size, parity)) {
                Ok(packets) => packets,
                Err(_) => return TestResult::discard(),
            };
            let (_, joined) = join(packets).unwrap();
            TestResult::from_bool(joined == payload)
        }
        quickcheck(with_payload as fn(Vec<u8>, u8, u8) -> TestResult);
    }
}
