/*! Session skin
*/

use std::fmt;

use nom::bytes::complete::tag;

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{MAGIC_SIZE, SESSION};

/// Serialized size of `Session`.
pub const SESSION_SIZE: usize = MAGIC_SIZE + KEY_SIZE * 2;

/** Provisions a relay with the secret keys of a new session.

Routing headers built later address the relay by the public halves of these
keys so that the relay identity key never appears in a return path. Must be
sent right after a `Crypt` opened with the relay identity key.

Serialized form:

Length   | Content
-------- | ------
`4`      | `sesn`
`32`     | Header `SecretKey`
`32`     | Payload `SecretKey`

*/
#[derive(Clone)]
pub struct Session {
    /// Secret key peeling routing header segments
    pub header: SecretKey,
    /// Secret key decrypting payloads
    pub payload: SecretKey,
}

impl Session {
    /// Create session with fresh random keys.
    pub fn random() -> Session {
        Session {
            header: gen_keypair().1,
            payload: gen_keypair().1,
        }
    }

    /// Public key addressing the header key.
    pub fn header_pk(&self) -> PublicKey {
        PublicKey::from(&self.header)
    }

    /// Public key addressing the payload key.
    pub fn payload_pk(&self) -> PublicKey {
        PublicKey::from(&self.payload)
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Session) -> bool {
        self.header.to_bytes() == other.header.to_bytes()
            && self.payload.to_bytes() == other.payload.to_bytes()
    }
}

impl Eq for Session {}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Session")
            .field("header_pk", &self.header_pk())
            .field("payload_pk", &self.payload_pk())
            .finish()
    }
}

impl FromBytes for Session {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&SESSION[..])(input)?;
        let (input, header) = SecretKey::from_bytes(input)?;
        let (input, payload) = SecretKey::from_bytes(input)?;
        Ok((input, Session { header, payload }))
    }
}

impl ToBytes for Session {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&SESSION[..]) >>
            gen_call!(|buf, sk| <SecretKey as ToBytes>::to_bytes(sk, buf), &self.header) >>
            gen_call!(|buf, sk| <SecretKey as ToBytes>::to_bytes(sk, buf), &self.payload)
        )
    }
}
