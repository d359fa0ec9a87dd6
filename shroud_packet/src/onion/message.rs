/*! Message skin
*/

use nom::bytes::complete::tag;

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{MAGIC_SIZE, MESSAGE};
use super::{Reply, REPLY_SIZE};

/// Size of `Message` with empty payload.
pub const MESSAGE_MIN_SIZE: usize = MAGIC_SIZE + KEY_SIZE + ID_SIZE * 2 + REPLY_SIZE + LENGTH_PREFIX_SIZE;

/** Message exchanged with a hidden service.

Serialized form:

Length   | Content
-------- | ------
`4`      | `mesg`
`32`     | Address `PublicKey` of the hidden service
`8`      | Message id
`8`      | Id the answer should carry
`465`    | `Reply` for the answer
`4`      | Payload length
variable | Payload

*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    /// Address `PublicKey` of the hidden service
    pub address: PublicKey,
    /// Message id
    pub id: Id,
    /// Id the answer should carry
    pub reply_id: Id,
    /// Return path for the answer
    pub reply: Reply,
    /// Message body
    pub payload: Vec<u8>,
}

impl FromBytes for Message {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&MESSAGE[..])(input)?;
        let (input, address) = PublicKey::from_bytes(input)?;
        let (input, id) = Id::from_bytes(input)?;
        let (input, reply_id) = Id::from_bytes(input)?;
        let (input, reply) = Reply::from_bytes(input)?;
        let (input, payload) = Vec::<u8>::from_bytes(input)?;
        Ok((input, Message { address, id, reply_id, reply, payload }))
    }
}

impl ToBytes for Message {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&MESSAGE[..]) >>
            gen_slice!(self.address.as_bytes()) >>
            gen_slice!(&self.id[..]) >>
            gen_slice!(&self.reply_id[..]) >>
            gen_call!(|buf, reply| Reply::to_bytes(reply, buf), &self.reply) >>
            gen_call!(|buf, payload| Vec::<u8>::to_bytes(payload, buf), &self.payload)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    encode_decode_test!(
        message_encode_decode,
        Message {
            address: gen_keypair().0,
            id: [1; ID_SIZE],
            reply_id: [2; ID_SIZE],
            reply: Reply::default(),
            payload: b"hello".to_vec(),
        }
    );
}
