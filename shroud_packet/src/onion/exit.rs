/*! Exit skin
*/

use nom::bytes::complete::tag;
use nom::number::complete::be_u16;

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{EXIT, MAGIC_SIZE};
use super::{Reply, REPLY_SIZE};

/// Size of `Exit` with empty payload.
pub const EXIT_MIN_SIZE: usize = MAGIC_SIZE + ID_SIZE + 2 + REPLY_SIZE + LENGTH_PREFIX_SIZE;

/** Request that leaves the onion network at the current hop.

The hop hands `payload` to the local service listening on `port`. The service
answer travels back through `reply` as a `Response`.

Serialized form:

Length   | Content
-------- | ------
`4`      | `exit`
`8`      | Request id
`2`      | Service port
`465`    | `Reply`
`4`      | Payload length
variable | Payload

*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Exit {
    /// Request id, repeated in the `Response`
    pub id: Id,
    /// Port of the exit service
    pub port: u16,
    /// Return path for the response
    pub reply: Reply,
    /// Request for the exit service
    pub payload: Vec<u8>,
}

impl FromBytes for Exit {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&EXIT[..])(input)?;
        let (input, id) = Id::from_bytes(input)?;
        let (input, port) = be_u16(input)?;
        let (input, reply) = Reply::from_bytes(input)?;
        let (input, payload) = Vec::<u8>::from_bytes(input)?;
        Ok((input, Exit { id, port, reply, payload }))
    }
}

impl ToBytes for Exit {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&EXIT[..]) >>
            gen_slice!(&self.id[..]) >>
            gen_be_u16!(self.port) >>
            gen_call!(|buf, reply| Reply::to_bytes(reply, buf), &self.reply) >>
            gen_call!(|buf, payload| Vec::<u8>::to_bytes(payload, buf), &self.payload)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    encode_decode_test!(
        exit_encode_decode,
        Exit {
            id: [1; ID_SIZE],
            port: 80,
            reply: Reply::default(),
            payload: b"GET / HTTP/1.1".to_vec(),
        }
    );
}
