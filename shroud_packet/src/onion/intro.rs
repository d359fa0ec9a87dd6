/*! Intro skin
*/

use std::net::SocketAddr;

use nom::bytes::complete::tag;
use nom::number::complete::be_u64;

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{INTRO, MAGIC_SIZE};

/// Serialized size of `Intro`.
pub const INTRO_SIZE: usize = MAGIC_SIZE + ID_SIZE + KEY_SIZE + SIZE_ADDRESS + 8 + SIGNATURE_SIZE;

/** Announces where a hidden service can be reached.

The signature covers the fields before it and is checked by the service layer,
the skin carries it opaquely.

Serialized form:

Length   | Content
-------- | ------
`4`      | `intr`
`8`      | Intro id
`32`     | Address `PublicKey` of the hidden service
`19`     | Address of the introducing relay
`8`      | Expiry as unix time in seconds
`64`     | Signature

*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Intro {
    /// Intro id
    pub id: Id,
    /// Address `PublicKey` of the hidden service
    pub key: PublicKey,
    /// Address of the introducing relay
    pub address: SocketAddr,
    /// Expiry as unix time in seconds
    pub expiry: u64,
    /// Signature over the fields above
    pub signature: Signature,
}

impl FromBytes for Intro {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&INTRO[..])(input)?;
        let (input, id) = Id::from_bytes(input)?;
        let (input, key) = PublicKey::from_bytes(input)?;
        let (input, address) = SocketAddr::from_bytes(input)?;
        let (input, expiry) = be_u64(input)?;
        let (input, signature) = Signature::from_bytes(input)?;
        Ok((input, Intro { id, key, address, expiry, signature }))
    }
}

impl ToBytes for Intro {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&INTRO[..]) >>
            gen_slice!(&self.id[..]) >>
            gen_slice!(self.key.as_bytes()) >>
            gen_call!(|buf, address| SocketAddr::to_bytes(address, buf), &self.address) >>
            gen_be_u64!(self.expiry) >>
            gen_slice!(&self.signature[..])
        )
    }
}
