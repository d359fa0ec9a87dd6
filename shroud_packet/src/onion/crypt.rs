/*! Crypt skin
*/

use nom::bytes::complete::tag;

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{CRYPT, MAGIC_SIZE};
use super::errors::EncodeError;
use super::SEGMENT_SIZE;

/// Serialized size of `Crypt`.
pub const CRYPT_SIZE: usize = MAGIC_SIZE + CLOAK_SIZE + KEY_SIZE + NONCE_SIZE;

/// Keys a `Crypt` is encrypted with. Known only to the builder of an onion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Seal {
    /// Number of routing header segments after this one plus one, or `0` for a
    /// plain onion layer
    pub depth: usize,
    /// Key derived with the recipient header key
    pub header: SymKey,
    /// Key derived with the recipient payload key
    pub payload: SymKey,
}

/** Everything after this skin is encrypted for the recipient named by the
cloak.

The recipient derives keys from its secret keys and `sender`. Depth is not
serialized so a hop can't learn its position in a circuit.

Region encrypted by a crypt of depth `d` starting right after it at `start`:

Depth    | Header key                          | Payload key
-------- | ------                              | ------
`0`      | `start..len`                        | nothing
`d > 0`  | `start..start + (d - 1) * 99`       | the rest up to `len`

Serialized form:

Length   | Content
-------- | ------
`4`      | `cryp`
`16`     | Cloaked recipient header `PublicKey`
`32`     | One-time `PublicKey` of sender
`24`     | `Nonce`

*/
#[derive(Clone, Debug)]
pub struct Crypt {
    /// Cloaked recipient header `PublicKey`
    pub cloak: Cloak,
    /// One-time `PublicKey` of sender
    pub sender: PublicKey,
    /// Nonce for both keys
    pub nonce: Nonce,
    /// Keys to encrypt with, present only on the building side
    pub seal: Option<Seal>,
}

impl PartialEq for Crypt {
    fn eq(&self, other: &Crypt) -> bool {
        self.cloak == other.cloak && self.sender == other.sender && self.nonce == other.nonce
    }
}

impl Eq for Crypt {}

impl FromBytes for Crypt {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&CRYPT[..])(input)?;
        let (input, cloak) = Cloak::from_bytes(input)?;
        let (input, sender) = PublicKey::from_bytes(input)?;
        let (input, nonce) = Nonce::from_bytes(input)?;
        Ok((input, Crypt { cloak, sender, nonce, seal: None }))
    }
}

impl ToBytes for Crypt {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&CRYPT[..]) >>
            gen_slice!(&self.cloak[..]) >>
            gen_slice!(self.sender.as_bytes()) >>
            gen_slice!(&self.nonce[..])
        )
    }
}

impl Crypt {
    /** Create sealed `Crypt` from the given one-time secret key and nonce.

    `to_header` and `to_payload` are the recipient keys. For plain onion
    layers they are the same key.
    */
    pub fn new(from: &SecretKey, nonce: Nonce, to_header: &PublicKey, to_payload: &PublicKey, depth: usize) -> Result<Crypt, CryptoError> {
        let seal = Seal {
            depth,
            header: derive_key(from, to_header)?,
            payload: derive_key(from, to_payload)?,
        };
        Ok(Crypt {
            cloak: cloak(to_header),
            sender: PublicKey::from(from),
            nonce,
            seal: Some(seal),
        })
    }

    /// Create sealed `Crypt` with a fresh one-time key and nonce.
    pub fn ephemeral(to_header: &PublicKey, to_payload: &PublicKey, depth: usize) -> Result<Crypt, CryptoError> {
        let (_, from) = gen_keypair();
        Crypt::new(&from, gen_nonce(), to_header, to_payload, depth)
    }

    /// Check if the crypt is addressed to `pk`.
    pub fn is_for(&self, pk: &PublicKey) -> bool {
        cloak_matches(&self.cloak, pk)
    }

    /// Derive the symmetric key from one of our secret keys.
    pub fn open(&self, sk: &SecretKey) -> Result<SymKey, CryptoError> {
        derive_key(sk, &self.sender)
    }

    /// Encrypt the region owned by this crypt. `start` is the offset right
    /// after the crypt header.
    pub fn encipher_spans(&self, splice: &mut Splice, start: usize) -> Result<(), EncodeError> {
        let seal = self.seal.as_ref().ok_or(EncodeError::Unsealed { offset: start })?;
        let len = splice.len();
        if seal.depth == 0 {
            encipher(&seal.header, &self.nonce, splice.range_mut(start, len)?);
            return Ok(())
        }

        let end = start + (seal.depth - 1) * SEGMENT_SIZE;
        if end > len {
            return Err(EncodeError::DepthOutOfRange { depth: seal.depth, end, len })
        }
        encipher(&seal.header, &self.nonce, splice.range_mut(start, end)?);
        encipher(&seal.payload, &self.nonce, splice.range_mut(end, len)?);
        Ok(())
    }
}
