/*! Reverse skin
*/

use std::net::SocketAddr;

use nom::bytes::complete::tag;

use shroud_binary_io::*;

use crate::magic::{MAGIC_SIZE, REVERSE};

/// Serialized size of `Reverse`.
pub const REVERSE_SIZE: usize = MAGIC_SIZE + SIZE_ADDRESS;

/** Front half of a routing header segment. Names the relay that should peel
the `Crypt` following it.

A relay only accepts a `Reverse` that carries its own address.

Serialized form:

Length   | Content
-------- | ------
`4`      | `rvrs`
`19`     | Address of the relay peeling the segment

*/
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Reverse {
    /// Address of the relay peeling the segment
    pub to: SocketAddr,
}

impl FromBytes for Reverse {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, _) = tag(&REVERSE[..])(input)?;
        let (input, to) = SocketAddr::from_bytes(input)?;
        Ok((input, Reverse { to }))
    }
}

impl ToBytes for Reverse {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&REVERSE[..]) >>
            gen_call!(|buf, to| SocketAddr::to_bytes(to, buf), &self.to)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    encode_decode_test!(
        reverse_encode_decode,
        Reverse { to: "[2001:db8::7]:443".parse().unwrap() }
    );

    #[test]
    fn reverse_size() {
        let mut buf = [0; 64];
        let (_, size) = Reverse { to: "1.2.3.4:1".parse().unwrap() }.to_bytes((&mut buf, 0)).unwrap();
        assert_eq!(size, REVERSE_SIZE);
        assert_eq!(REVERSE_SIZE, 23);
    }
}
