/*! Balance skin
*/

use nom::bytes::complete::tag;
use nom::number::complete::be_u64;

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{BALANCE, MAGIC_SIZE};

/// Serialized size of `Balance`.
pub const BALANCE_SIZE: usize = MAGIC_SIZE + ID_SIZE * 2 + 8;

/** Balance of a channel as seen by a relay.

Serialized form:

Length   | Content
-------- | ------
`4`      | `bala`
`8`      | Channel id
`8`      | Confirmation id from `GetBalance`
`8`      | Amount in millisatoshi

*/
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Balance {
    /// Channel id
    pub id: Id,
    /// Confirmation id from `GetBalance`
    pub confirmation_id: Id,
    /// Amount in millisatoshi
    pub amount: u64,
}

impl FromBytes for Balance {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&BALANCE[..])(input)?;
        let (input, id) = Id::from_bytes(input)?;
        let (input, confirmation_id) = Id::from_bytes(input)?;
        let (input, amount) = be_u64(input)?;
        Ok((input, Balance { id, confirmation_id, amount }))
    }
}

impl ToBytes for Balance {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&BALANCE[..]) >>
            gen_slice!(&self.id[..]) >>
            gen_slice!(&self.confirmation_id[..]) >>
            gen_be_u64!(self.amount)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    encode_decode_test!(
        balance_encode_decode,
        Balance {
            id: [1; ID_SIZE],
            confirmation_id: [2; ID_SIZE],
            amount: 21_000_000_000,
        }
    );
}
