/*! Route skin
*/

use nom::bytes::complete::tag;

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{MAGIC_SIZE, ROUTE};
use super::{Reply, REPLY_SIZE};

/// Serialized size of `Route`.
pub const ROUTE_SIZE: usize = MAGIC_SIZE + CLOAK_SIZE + KEY_SIZE + NONCE_SIZE + ID_SIZE + REPLY_SIZE;

/** Asks the introducing relay of a hidden service to open a route to it.

The hidden service is named only by the cloak of its address key, so the
introducing relay learns nothing beyond what it already announced.

Serialized form:

Length   | Content
-------- | ------
`4`      | `rout`
`16`     | Cloaked address `PublicKey` of the hidden service
`32`     | One-time `PublicKey` of the client
`24`     | `Nonce`
`8`      | Route id
`465`    | `Reply` back to the client

*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Route {
    /// Cloaked address `PublicKey` of the hidden service
    pub cloak: Cloak,
    /// One-time `PublicKey` of the client
    pub sender: PublicKey,
    /// Nonce of the request
    pub nonce: Nonce,
    /// Route id
    pub id: Id,
    /// Return path back to the client
    pub reply: Reply,
}

impl FromBytes for Route {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&ROUTE[..])(input)?;
        let (input, cloak) = Cloak::from_bytes(input)?;
        let (input, sender) = PublicKey::from_bytes(input)?;
        let (input, nonce) = Nonce::from_bytes(input)?;
        let (input, id) = Id::from_bytes(input)?;
        let (input, reply) = Reply::from_bytes(input)?;
        Ok((input, Route { cloak, sender, nonce, id, reply }))
    }
}

impl ToBytes for Route {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&ROUTE[..]) >>
            gen_slice!(&self.cloak[..]) >>
            gen_slice!(self.sender.as_bytes()) >>
            gen_slice!(&self.nonce[..]) >>
            gen_slice!(&self.id[..]) >>
            gen_call!(|buf, reply| Reply::to_bytes(reply, buf), &self.reply)
        )
    }
}
