/*! Ready skin
*/

use nom::bytes::complete::tag;

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{MAGIC_SIZE, READY};
use super::{Reply, REPLY_SIZE};

/// Serialized size of `Ready`.
pub const READY_SIZE: usize = MAGIC_SIZE + ID_SIZE + KEY_SIZE + REPLY_SIZE * 2;

/** Sent by a hidden service when it's ready to exchange messages over a
route.

Serialized form:

Length   | Content
-------- | ------
`4`      | `redy`
`8`      | Route id
`32`     | Address `PublicKey` of the hidden service
`465`    | `Reply` towards the hidden service
`465`    | `Reply` back to the client

*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ready {
    /// Route id
    pub id: Id,
    /// Address `PublicKey` of the hidden service
    pub address: PublicKey,
    /// Return path towards the hidden service
    pub forward: Reply,
    /// Return path back to the client
    pub ret: Reply,
}

impl FromBytes for Ready {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&READY[..])(input)?;
        let (input, id) = Id::from_bytes(input)?;
        let (input, address) = PublicKey::from_bytes(input)?;
        let (input, forward) = Reply::from_bytes(input)?;
        let (input, ret) = Reply::from_bytes(input)?;
        Ok((input, Ready { id, address, forward, ret }))
    }
}

impl ToBytes for Ready {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&READY[..]) >>
            gen_slice!(&self.id[..]) >>
            gen_slice!(self.address.as_bytes()) >>
            gen_call!(|buf, reply| Reply::to_bytes(reply, buf), &self.forward) >>
            gen_call!(|buf, reply| Reply::to_bytes(reply, buf), &self.ret)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    encode_decode_test!(
        ready_encode_decode,
        Ready {
            id: [3; ID_SIZE],
            address: gen_keypair().0,
            forward: Reply { routing_header: [1; super::super::ROUTING_HEADER_SIZE], ..Reply::default() },
            ret: Reply::default(),
        }
    );
}
