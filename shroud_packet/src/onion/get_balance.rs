/*! GetBalance skin
*/

use nom::bytes::complete::tag;

use shroud_binary_io::*;
use shroud_crypto::*;

use crate::magic::{GET_BALANCE, MAGIC_SIZE};
use super::{Reply, REPLY_SIZE};

/// Serialized size of `GetBalance`.
pub const GET_BALANCE_SIZE: usize = MAGIC_SIZE + ID_SIZE * 2 + REPLY_SIZE;

/** Asks a relay for the balance of the channel identified by `id`.

Serialized form:

Length   | Content
-------- | ------
`4`      | `gbal`
`8`      | Channel id
`8`      | Confirmation id
`465`    | `Reply` for the `Balance`

*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetBalance {
    /// Channel id
    pub id: Id,
    /// Id the `Balance` answer carries
    pub confirmation_id: Id,
    /// Return path for the answer
    pub reply: Reply,
}

impl FromBytes for GetBalance {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&GET_BALANCE[..])(input)?;
        let (input, id) = Id::from_bytes(input)?;
        let (input, confirmation_id) = Id::from_bytes(input)?;
        let (input, reply) = Reply::from_bytes(input)?;
        Ok((input, GetBalance { id, confirmation_id, reply }))
    }
}

impl ToBytes for GetBalance {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&GET_BALANCE[..]) >>
            gen_slice!(&self.id[..]) >>
            gen_slice!(&self.confirmation_id[..]) >>
            gen_call!(|buf, reply| Reply::to_bytes(reply, buf), &self.reply)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    encode_decode_test!(
        get_balance_encode_decode,
        GetBalance {
            id: [1; ID_SIZE],
            confirmation_id: [2; ID_SIZE],
            reply: Reply::default(),
        }
    );
}
