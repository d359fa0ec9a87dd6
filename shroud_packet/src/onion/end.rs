/*! End skin
*/

use nom::bytes::complete::tag;

use shroud_binary_io::*;

use crate::magic::{END, MAGIC_SIZE};

/// Serialized size of `End`.
pub const END_SIZE: usize = MAGIC_SIZE;

/// Terminates a chain of skins. Nothing after it is processed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct End;

impl FromBytes for End {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&END[..])(input)?;
        Ok((input, End))
    }
}

impl ToBytes for End {
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        gen_slice!(buf, &END[..])
    }
}
