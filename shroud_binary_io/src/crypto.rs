use nom::IResult;
use nom::bytes::streaming::take;
use nom::combinator::{map, map_opt};

use x25519_dalek::{PublicKey, StaticSecret};

use super::{FromBytes, ToBytes, GenError};

/// Size of x25519 public and secret keys.
const KEY_SIZE: usize = 32;

impl FromBytes for PublicKey {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        map(map_opt(take(KEY_SIZE), |pk: &[u8]| pk.try_into().ok()), |pk: [u8; KEY_SIZE]| pk.into())(input)
    }
}

impl ToBytes for PublicKey {
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        gen_slice!(buf, self.as_bytes())
    }
}

impl FromBytes for StaticSecret {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        map(map_opt(take(KEY_SIZE), |sk: &[u8]| sk.try_into().ok()), |sk: [u8; KEY_SIZE]| sk.into())(input)
    }
}

impl ToBytes for StaticSecret {
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        gen_slice!(buf, self.as_bytes())
    }
}
