/*! Forward skin
*/

use std::net::SocketAddr;

use nom::bytes::complete::tag;

use shroud_binary_io::*;

use crate::magic::{FORWARD, MAGIC_SIZE};

/// Serialized size of `Forward`.
pub const FORWARD_SIZE: usize = MAGIC_SIZE + SIZE_ADDRESS;

/** Instructs the hop to relay the rest of the message to another relay.

Serialized form:

Length   | Content
-------- | ------
`4`      | `fwrd`
`19`     | Address of the next relay

*/
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Forward {
    /// Address of the next relay
    pub to: SocketAddr,
}

impl FromBytes for Forward {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&FORWARD[..])(input)?;
        let (input, to) = SocketAddr::from_bytes(input)?;
        Ok((input, Forward { to }))
    }
}

impl ToBytes for Forward {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&FORWARD[..]) >>
            gen_call!(|buf, to| SocketAddr::to_bytes(to, buf), &self.to)
        )
    }
}
