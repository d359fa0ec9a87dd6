/*! Pre-built return path
*/

use std::net::SocketAddr;

use shroud_binary_io::*;
use shroud_crypto::*;

use super::{Reverse, REVERSE_SIZE, CRYPT_SIZE};

/// Number of hops in a return path.
pub const HOPS: usize = 3;

/// Size of one routing header segment: `Reverse` followed by `Crypt`.
pub const SEGMENT_SIZE: usize = REVERSE_SIZE + CRYPT_SIZE;

/// Size of routing header. It doesn't depend on the number of real hops.
pub const ROUTING_HEADER_SIZE: usize = HOPS * SEGMENT_SIZE;

/// Serialized size of `Reply`.
pub const REPLY_SIZE: usize = ROUTING_HEADER_SIZE + HOPS * (SYM_KEY_SIZE + NONCE_SIZE);

/// Encrypted routing header.
pub type RoutingHeader = [u8; ROUTING_HEADER_SIZE];

/** Return path handed to a responder.

The responder prepends `routing_header` to its answer and encrypts the answer
with all three `ciphers`. Every hop on the way back removes one layer, so the
answer reaches the requester as it was written.

Serialized form:

Length   | Content
-------- | ------
`297`    | Routing header
`96`     | Payload keys of the three hops
`72`     | Nonces of the three hops

*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reply {
    /// Routing header of the return path
    pub routing_header: RoutingHeader,
    /// Payload keys of the hops in order of traversal
    pub ciphers: [SymKey; HOPS],
    /// Nonces of the hops in order of traversal
    pub nonces: [Nonce; HOPS],
}

impl Default for Reply {
    fn default() -> Reply {
        Reply {
            routing_header: [0; ROUTING_HEADER_SIZE],
            ciphers: [[0; SYM_KEY_SIZE]; HOPS],
            nonces: [[0; NONCE_SIZE]; HOPS],
        }
    }
}

impl FromBytes for Reply {
    fn from_bytes(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, routing_header) = RoutingHeader::from_bytes(input)?;
        let (input, cipher_1) = SymKey::from_bytes(input)?;
        let (input, cipher_2) = SymKey::from_bytes(input)?;
        let (input, cipher_3) = SymKey::from_bytes(input)?;
        let (input, nonce_1) = Nonce::from_bytes(input)?;
        let (input, nonce_2) = Nonce::from_bytes(input)?;
        let (input, nonce_3) = Nonce::from_bytes(input)?;
        Ok((input, Reply {
            routing_header,
            ciphers: [cipher_1, cipher_2, cipher_3],
            nonces: [nonce_1, nonce_2, nonce_3],
        }))
    }
}

impl ToBytes for Reply {
    #[rustfmt::skip]
    fn to_bytes<'a>(&self, buf: (&'a mut [u8], usize)) -> Result<(&'a mut [u8], usize), GenError> {
        do_gen!(buf,
            gen_slice!(&self.routing_header[..]) >>
            gen_slice!(&self.ciphers[0][..]) >>
            gen_slice!(&self.ciphers[1][..]) >>
            gen_slice!(&self.ciphers[2][..]) >>
            gen_slice!(&self.nonces[0][..]) >>
            gen_slice!(&self.nonces[1][..]) >>
            gen_slice!(&self.nonces[2][..])
        )
    }
}

impl Reply {
    /// Encrypt `body` with the payload keys of every hop.
    pub fn seal(&self, body: &mut [u8]) {
        for (cipher, nonce) in self.ciphers.iter().zip(self.nonces.iter()) {
            encipher(cipher, nonce, body);
        }
    }

    /// Address the reply should be sent to.
    pub fn first_hop(&self) -> Option<SocketAddr> {
        Reverse::from_bytes(&self.routing_header[..REVERSE_SIZE])
            .ok()
            .map(|(_, reverse)| reverse.to)
    }

    /// Build the message to send back: routing header followed by sealed
    /// `body`.
    pub fn message(&self, body: &[u8]) -> Vec<u8> {
        let mut message = Vec::with_capacity(ROUTING_HEADER_SIZE + body.len());
        message.extend_from_slice(&self.routing_header);
        message.extend_from_slice(body);
        self.seal(&mut message[ROUTING_HEADER_SIZE..]);
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck::quickcheck;

    encode_decode_test!(
        reply_encode_decode,
        Reply {
            routing_header: [42; ROUTING_HEADER_SIZE],
            ciphers: [[1; SYM_KEY_SIZE], [2; SYM_KEY_SIZE], [3; SYM_KEY_SIZE]],
            nonces: [[4; NONCE_SIZE], [5; NONCE_SIZE], [6; NONCE_SIZE]],
        }
    );

    #[test]
    fn sizes() {
        assert_eq!(ROUTING_HEADER_SIZE, 297);
        assert_eq!(REPLY_SIZE, 465);
    }

    #[test]
    fn seal_applies_every_key() {
        let reply = Reply {
            routing_header: [0; ROUTING_HEADER_SIZE],
            ciphers: [[1; SYM_KEY_SIZE], [2; SYM_KEY_SIZE], [3; SYM_KEY_SIZE]],
            nonces: [[4; NONCE_SIZE], [5; NONCE_SIZE], [6; NONCE_SIZE]],
        };
        let mut body = b"response body".to_vec();
        reply.seal(&mut body);
        for i in 0..HOPS {
            encipher(&reply.ciphers[i], &reply.nonces[i], &mut body);
        }
        assert_eq!(body, b"response body");
    }

    #[test]
    fn first_hop_of_garbage() {
        assert_eq!(Reply::default().first_hop(), None);
    }

    #[test]
    fn reply_quickcheck() {
        fn with_body(reply: Reply, body: Vec<u8>) -> bool {
            let mut buf = [0; REPLY_SIZE];
            let (_, size) = reply.to_bytes((&mut buf, 0)).unwrap();
            let decoded = Reply::from_bytes(&buf[..size]).ok().map(|(_, decoded)| decoded);

            let mut message = reply.message(&body);
            for i in 0..HOPS {
                encipher(&reply.ciphers[i], &reply.nonces[i], &mut message[ROUTING_HEADER_SIZE..]);
            }
            decoded == Some(reply.clone())
                && message[..ROUTING_HEADER_SIZE] == reply.routing_header[..]
                && message[ROUTING_HEADER_SIZE..] == body[..]
        }
        quickcheck(with_body as fn(Reply, Vec<u8>) -> bool);
    }
}
