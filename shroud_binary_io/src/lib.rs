/*! Encoding/decoding traits and the cursor addressed `Splice` codec.

Every wire structure in shroud implements [`FromBytes`] (parsing with `nom`)
and [`ToBytes`] (generation with `cookie_factory`). [`Splice`] glues both
traits to a single owned buffer with a cursor so that nested onion layers can
be written and read one after another.
*/

#![forbid(unsafe_code)]

#[macro_use]
extern crate cookie_factory;

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

pub use nom::IResult;
pub use cookie_factory::GenError;

use nom::bytes::complete::take;
use nom::combinator::{map, map_opt};
use nom::number::complete::{be_u16, be_u32, be_u64, le_u8};

#[cfg(feature = "crypto")]
mod crypto;
mod splice;

pub use self::splice::*;

/// Size of the big endian length prefix written before variable length blobs.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Size of serialized `SocketAddr`.
pub const SIZE_ADDRESS: usize = 19;

/// IPv4 addresses are padded with 12 bytes of zeros so that both IPv4 and
/// IPv6 addresses have the same stored size.
pub const IPV4_PADDING_SIZE: usize = 12;

/// The trait provides method to deserialize struct from raw bytes
pub trait FromBytes: Sized {
    /// Deserialize struct using `nom` from raw bytes
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self>;
}

/// The trait provides method to serialize struct into raw bytes
pub trait ToBytes: Sized {
    /// Serialize struct into raw bytes using `cookie_factory`
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError>;
}

/// Fail generation with custom error code.
pub fn gen_error(_buf: (&mut [u8], usize), error: u32) -> Result<(&mut [u8], usize), GenError> {
    Err(GenError::CustomError(error))
}

impl FromBytes for u8 {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        le_u8(input)
    }
}

impl ToBytes for u8 {
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        gen_be_u8!(buf, *self)
    }
}

impl FromBytes for u16 {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        be_u16(input)
    }
}

impl ToBytes for u16 {
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        gen_be_u16!(buf, *self)
    }
}

impl FromBytes for u32 {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        be_u32(input)
    }
}

impl ToBytes for u32 {
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        gen_be_u32!(buf, *self)
    }
}

impl FromBytes for u64 {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        be_u64(input)
    }
}

impl ToBytes for u64 {
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        gen_be_u64!(buf, *self)
    }
}

impl<const N: usize> FromBytes for [u8; N] {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        map_opt(take(N), |bytes: &[u8]| bytes.try_into().ok())(input)
    }
}

impl<const N: usize> ToBytes for [u8; N] {
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        gen_slice!(buf, &self[..])
    }
}

/** Variable length blob.

Serialized form:

Length   | Content
-------- | ------
`4`      | Length of the blob as big endian `u32`
variable | Blob

*/
impl FromBytes for Vec<u8> {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, len) = be_u32(input)?;
        let (input, bytes) = take(len as usize)(input)?;
        Ok((input, bytes.to_vec()))
    }
}

impl ToBytes for Vec<u8> {
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_cond!(self.len() > u32::MAX as usize, |buf| gen_error(buf, 0)) >>
            gen_be_u32!(self.len() as u32) >>
            gen_slice!(self.as_slice())
        )
    }
}

/** Network address of a relay.

Serialized form:

Length   | Content
-------- | ------
`1`      | Address family: `4` or `6`
`16`     | IPv6 address or IPv4 address followed by 12 zero bytes
`2`      | Port as big endian `u16`

*/
impl FromBytes for SocketAddr {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, family) = nom::combinator::verify(le_u8, |family: &u8| *family == 4 || *family == 6)(input)?;
        let (input, ip_addr) = if family == 4 {
            let (input, octets) = <[u8; 4]>::from_bytes(input)?;
            let (input, _) = take(IPV4_PADDING_SIZE)(input)?;
            (input, IpAddr::V4(Ipv4Addr::from(octets)))
        } else {
            map(<[u8; 16]>::from_bytes, |octets| IpAddr::V6(Ipv6Addr::from(octets)))(input)?
        };
        let (input, port) = be_u16(input)?;
        Ok((input, SocketAddr::new(ip_addr, port)))
    }
}

impl ToBytes for SocketAddr {
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        match self.ip() {
            IpAddr::V4(ip) => do_gen!(buf,
                gen_be_u8!(4) >>
                gen_slice!(&ip.octets()[..]) >>
                gen_slice!(&[0; IPV4_PADDING_SIZE][..]) >>
                gen_be_u16!(self.port())
            ),
            IpAddr::V6(ip) => do_gen!(buf,
                gen_be_u8!(6) >>
                gen_slice!(&ip.octets()[..]) >>
                gen_be_u16!(self.port())
            ),
        }
    }
}

/// Create a test that serializes value, deserializes it back and checks
/// that both values are equal.
#[macro_export]
macro_rules! encode_decode_test (
    ($test:ident, $value:expr) => (
        #[test]
        fn $test() {
            use $crate::{FromBytes, ToBytes};

            let value = $value;
            let mut buf = vec![0; 1024 * 64];
            let (_, size) = value.to_bytes((&mut buf, 0)).unwrap();
            assert!(size <= 1024 * 64);
            let (rest, decoded_value) = FromBytes::from_bytes(&buf[..size]).unwrap();
            // this helps compiler to infer type of decoded_value
            // i.e. it means that decoded_value has the same type as value
            fn infer<T>(_: &T, _: &T) { }
            infer(&decoded_value, &value);
            assert!(rest.is_empty());
            assert_eq!(decoded_value, value);
        }
    )
);
