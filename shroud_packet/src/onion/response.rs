/*! Response skin
*/

use nom::bytes::complete::tag;
use nom::number::complete::{be_u16, le_u8};

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{MAGIC_SIZE, RESPONSE};

/// Size of `Response` with empty payload.
pub const RESPONSE_MIN_SIZE: usize = MAGIC_SIZE + ID_SIZE + 2 + 1 + LENGTH_PREFIX_SIZE;

/** Answer of an exit service delivered through a `Reply`.

Serialized form:

Length   | Content
-------- | ------
`4`      | `resp`
`8`      | Id of the `Exit` request
`2`      | Service port
`1`      | Load of the exit relay
`4`      | Payload length
variable | Payload

*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    /// Id of the `Exit` request
    pub id: Id,
    /// Port of the exit service
    pub port: u16,
    /// Load of the exit relay, `0` is idle and `255` is saturated
    pub load: u8,
    /// Service answer
    pub payload: Vec<u8>,
}

impl FromBytes for Response {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&RESPONSE[..])(input)?;
        let (input, id) = Id::from_bytes(input)?;
        let (input, port) = be_u16(input)?;
        let (input, load) = le_u8(input)?;
        let (input, payload) = Vec::<u8>::from_bytes(input)?;
        Ok((input, Response { id, port, load, payload }))
    }
}

impl ToBytes for Response {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&RESPONSE[..]) >>
            gen_slice!(&self.id[..]) >>
            gen_be_u16!(self.port) >>
            gen_be_u8!(self.load) >>
            gen_call!(|buf, payload| Vec::<u8>::to_bytes(payload, buf), &self.payload)
        )
    }
}
