/*! Confirmation skin
*/

use nom::bytes::complete::tag;
use nom::number::complete::le_u8;

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{CONFIRMATION, MAGIC_SIZE};

/// Serialized size of `Confirmation`.
pub const CONFIRMATION_SIZE: usize = MAGIC_SIZE + ID_SIZE + 1;

/** Acknowledges that a message with the given id reached its destination.

Serialized form:

Length   | Content
-------- | ------
`4`      | `conf`
`8`      | Confirmed id
`1`      | Load of the confirming relay

*/
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Confirmation {
    /// Confirmed id
    pub id: Id,
    /// Load of the confirming relay
    pub load: u8,
}

impl FromBytes for Confirmation {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&CONFIRMATION[..])(input)?;
        let (input, id) = Id::from_bytes(input)?;
        let (input, load) = le_u8(input)?;
        Ok((input, Confirmation { id, load }))
    }
}

impl ToBytes for Confirmation {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&CONFIRMATION[..]) >>
            gen_slice!(&self.id[..]) >>
            gen_be_u8!(self.load)
        )
    }
}
