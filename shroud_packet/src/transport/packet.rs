/*! Transport packet
*/

use std::time::Instant;

use thiserror::Error;

use shroud_binary_io::*;
use shroud_crypto::*;

/// Size of the plaintext part of a packet.
pub const PACKET_HEADER_SIZE: usize = CHECK_SIZE + KEY_SIZE + CLOAK_SIZE + NONCE_SIZE;

/// Bytes of every packet that are not shard data.
pub const PACKET_OVERHEAD: usize = PACKET_HEADER_SIZE + ID_SIZE + 2 + 4 + 1;

/// Error that can happen when sealing or opening a packet.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PacketError {
    /// Packet is shorter than its fixed part.
    #[error("Packet needs at least {need} bytes but has {have}")]
    TooShort {
        /// Size of the fixed part.
        need: usize,
        /// Size of the packet.
        have: usize,
    },
    /// Integrity check doesn't match packet contents.
    #[error("Packet integrity check failed")]
    IntegrityCheck,
    /// Key agreement failed.
    #[error("Key agreement failed: {0}")]
    Crypto(#[from] CryptoError),
    /// Packet fields can't be read or written.
    #[error("Packet codec error: {0}")]
    Splice(#[from] SpliceError),
}

/** Plaintext part of a packet. It's enough to find the key a packet is
encrypted for.

Serialized form:

Length   | Content
-------- | ------
`4`      | Integrity check of everything after it
`32`     | One-time `PublicKey` of sender
`16`     | Cloaked recipient `PublicKey`
`24`     | `Nonce`

*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PacketHeader {
    /// First bytes of SHA-256 of everything after the check
    pub check: [u8; CHECK_SIZE],
    /// One-time `PublicKey` of sender
    pub sender: PublicKey,
    /// Cloaked recipient `PublicKey`
    pub cloak: Cloak,
    /// Nonce of the encrypted part
    pub nonce: Nonce,
}

impl FromBytes for PacketHeader {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, check) = <[u8; CHECK_SIZE]>::from_bytes(input)?;
        let (input, sender) = PublicKey::from_bytes(input)?;
        let (input, cloak) = Cloak::from_bytes(input)?;
        let (input, nonce) = Nonce::from_bytes(input)?;
        Ok((input, PacketHeader { check, sender, cloak, nonce }))
    }
}

impl PacketHeader {
    /// Parse header of a raw packet without decrypting it.
    pub fn parse(bytes: &[u8]) -> Result<PacketHeader, PacketError> {
        if bytes.len() < PACKET_OVERHEAD {
            return Err(PacketError::TooShort { need: PACKET_OVERHEAD, have: bytes.len() })
        }
        PacketHeader::from_bytes(&bytes[..PACKET_HEADER_SIZE])
            .map(|(_, header)| header)
            .map_err(|_| PacketError::from(SpliceError::Deserialize { label: "header", offset: 0 }))
    }
}

/** One shard of a transmission.

Serialized form:

Length   | Content
-------- | ------
`76`     | `PacketHeader`
`8`      | Transmission id
`2`      | Sequence number
`4`      | Payload length of the whole transmission
`1`      | Parity shards per group of 256
variable | Shard data

where everything after `PacketHeader` is encrypted with the key derived from
the sender `PublicKey` and the recipient key.

*/
#[derive(Clone, Debug)]
pub struct Packet {
    /// Transmission id
    pub id: Id,
    /// Sequence number of the shard
    pub seq: u16,
    /// Payload length of the whole transmission
    pub length: u32,
    /// Parity shards per group of 256
    pub parity: u8,
    /// Shard data
    pub data: Vec<u8>,
    /// When the packet was received or created. Not serialized.
    pub timestamp: Instant,
}

impl PartialEq for Packet {
    fn eq(&self, other: &Packet) -> bool {
        self.id == other.id
            && self.seq == other.seq
            && self.length == other.length
            && self.parity == other.parity
            && self.data == other.data
    }
}

impl Eq for Packet {}

impl Packet {
    /// Create new packet stamped with the current time.
    pub fn new(id: Id, seq: u16, length: u32, parity: u8, data: Vec<u8>) -> Packet {
        Packet { id, seq, length, parity, data, timestamp: Instant::now() }
    }

    /// Serialized size of the packet.
    pub fn size(&self) -> usize {
        PACKET_OVERHEAD + self.data.len()
    }

    /** Serialize and encrypt the packet for `to`.

    Every packet is encrypted with a fresh one-time key. `cloak` names the
    recipient and is shared by all packets of a transmission.
    */
    pub fn seal(&self, to: &PublicKey, cloak: &Cloak) -> Result<Vec<u8>, PacketError> {
        let (sender, from) = gen_keypair();
        let key = derive_key(&from, to)?;
        let nonce = gen_nonce();

        let mut splice = Splice::new(self.size());
        splice.advance(CHECK_SIZE, "check")?
            .write("sender", &sender)?
            .write("cloak", cloak)?
            .write("nonce", &nonce)?
            .write("id", &self.id)?
            .write("seq", &self.seq)?
            .write("length", &self.length)?
            .write("parity", &self.parity)?
            .write_slice("data", &self.data)?;

        let len = splice.len();
        encipher(&key, &nonce, splice.range_mut(PACKET_HEADER_SIZE, len)?);
        let check = check(splice.range(CHECK_SIZE, len)?);
        splice.range_mut(0, CHECK_SIZE)?.copy_from_slice(&check);
        Ok(splice.into_bytes())
    }

    /// Check integrity of raw packet and decrypt it with `sk`.
    pub fn open(bytes: &[u8], sk: &SecretKey) -> Result<Packet, PacketError> {
        let header = PacketHeader::parse(bytes)?;
        if check(&bytes[CHECK_SIZE..]) != header.check {
            return Err(PacketError::IntegrityCheck)
        }
        let key = derive_key(sk, &header.sender)?;

        let mut splice = Splice::load(bytes.to_vec());
        let len = splice.len();
        encipher(&key, &header.nonce, splice.range_mut(PACKET_HEADER_SIZE, len)?);
        splice.set_cursor(PACKET_HEADER_SIZE)?;
        let id = splice.read("id")?;
        let seq = splice.read("seq")?;
        let length = splice.read("length")?;
        let parity = splice.read("parity")?;
        let data = splice.read_slice("data", splice.remaining())?;
        Ok(Packet::new(id, seq, length, parity, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overhead() {
        assert_eq!(PACKET_HEADER_SIZE, 76);
        assert_eq!(PACKET_OVERHEAD, 91);
    }

    #[test]
    fn seal_open() {
        let (pk, sk) = gen_keypair();
        let packet = Packet::new([1; ID_SIZE], 7, 1000, 64, vec![42; 100]);
        let bytes = packet.seal(&pk, &cloak(&pk)).unwrap();
        assert_eq!(bytes.len(), PACKET_OVERHEAD + 100);

        let header = PacketHeader::parse(&bytes).unwrap();
        assert!(cloak_matches(&header.cloak, &pk));
        assert_eq!(Packet::open(&bytes, &sk).unwrap(), packet);
    }

    #[test]
    fn open_corrupted() {
        let (pk, sk) = gen_keypair();
        let packet = Packet::new([1; ID_SIZE], 0, 10, 0, vec![1; 10]);
        let mut bytes = packet.seal(&pk, &cloak(&pk)).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 1;
        assert_eq!(Packet::open(&bytes, &sk), Err(PacketError::IntegrityCheck));
    }

    #[test]
    fn open_too_short() {
        let (_pk, sk) = gen_keypair();
        assert_eq!(
            Packet::open(&[0; PACKET_OVERHEAD - 1], &sk),
            Err(PacketError::TooShort { need: PACKET_OVERHEAD, have: PACKET_OVERHEAD - 1 })
        );
    }

    #[test]
    fn open_with_wrong_key_garbles() {
        let (pk, _sk) = gen_keypair();
        let (_other_pk, other_sk) = gen_keypair();
        let packet = Packet::new([1; ID_SIZE], 3, 10, 0, vec![1; 10]);
        let bytes = packet.seal(&pk, &cloak(&pk)).unwrap();
        assert_ne!(Packet::open(&bytes, &other_sk).unwrap(), packet);
    }

    #[test]
    fn packets_use_fresh_keys() {
        let (pk, _sk) = gen_keypair();
        let cloak = cloak(&pk);
        let packet = Packet::new([1; ID_SIZE], 0, 10, 0, vec![1; 10]);
        let first = PacketHeader::parse(&packet.seal(&pk, &cloak).unwrap()).unwrap();
        let second = PacketHeader::parse(&packet.seal(&pk, &cloak).unwrap()).unwrap();
        assert_ne!(first.sender, second.sender);
        assert_eq!(first.cloak, second.cloak);
    }
}
