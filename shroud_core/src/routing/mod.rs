/*! Routing headers for return paths.

A routing header is three segments, each a `Reverse` naming the relay that
peels it followed by a `Crypt` addressed to that relay's session key. The
builder encrypts segments so that every relay on the way back decrypts the
segment of the next relay and nothing else:

```text
hop 1: [ rvrs 1 | cryp 1 ][ segment 2, 3 under header key 1 ][ body ]
hop 2: [ rvrs 2 | cryp 2 ][ segment 3 under header key 2 | noise ][ body ]
hop 3: [ rvrs 3 | cryp 3 ][ noise ][ body ]
```

The body after the header is encrypted by the responder with the payload keys
of all three relays and every relay removes one layer.
*/

mod errors;

pub use self::errors::*;

use std::net::SocketAddr;

use shroud_binary_io::*;
use shroud_crypto::*;
use shroud_packet::magic::{Magic, CRYPT, MAGIC_SIZE, REVERSE};
use shroud_packet::onion::*;

use crate::keys::SessionKeys;

/// Relay on a return path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutingHop {
    /// Address of the relay
    pub address: SocketAddr,
    /// Session header `PublicKey` of the relay
    pub header: PublicKey,
    /// Session payload `PublicKey` of the relay
    pub payload: PublicKey,
}

impl RoutingHop {
    /// Create new `RoutingHop`.
    pub fn new(address: SocketAddr, header: PublicKey, payload: PublicKey) -> RoutingHop {
        RoutingHop { address, header, payload }
    }

    /// Hop with unspecified address and throwaway keys. It fills a slot of
    /// the routing header so its size stays the same.
    pub fn placeholder() -> RoutingHop {
        RoutingHop {
            address: SocketAddr::from(([0, 0, 0, 0], 0)),
            header: gen_keypair().0,
            payload: gen_keypair().0,
        }
    }
}

/** Build routing header from hops in order of traversal.

`keys` are one-time secret keys of the builder, one per hop, and `nonces` are
the nonces of the hops. `None` hops are filled with placeholders. The
resulting `Reply` carries the header together with payload keys and nonces
the responder needs to seal its answer.
*/
pub fn build_routing_header(
    hops: &[Option<RoutingHop>; HOPS],
    keys: &[SecretKey; HOPS],
    nonces: &[Nonce; HOPS],
) -> Result<Reply, EncodeError> {
    let mut onion = Onion::default();
    let mut ciphers = [[0; SYM_KEY_SIZE]; HOPS];
    for (i, hop) in hops.iter().enumerate() {
        let hop = hop.clone().unwrap_or_else(RoutingHop::placeholder);
        let crypt = Crypt::new(&keys[i], nonces[i], &hop.header, &hop.payload, HOPS - i)?;
        if let Some(seal) = &crypt.seal {
            ciphers[i] = seal.payload;
        }
        onion.wrap(Skin::Reverse(Reverse { to: hop.address }))
            .wrap(Skin::Crypt(crypt));
    }

    let splice = onion.encode()?;
    let mut routing_header = [0; ROUTING_HEADER_SIZE];
    routing_header.copy_from_slice(splice.range(0, ROUTING_HEADER_SIZE)?);
    Ok(Reply { routing_header, ciphers, nonces: *nonces })
}

/// Build routing header with fresh one-time keys and nonces.
pub fn build_reply(hops: &[Option<RoutingHop>; HOPS]) -> Result<Reply, EncodeError> {
    let keys = [gen_keypair().1, gen_keypair().1, gen_keypair().1];
    let nonces = [gen_nonce(), gen_nonce(), gen_nonce()];
    build_routing_header(hops, &keys, &nonces)
}

/// Result of peeling one hop.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Peeled {
    /// Message should be relayed to the next hop.
    Forward {
        /// Address of the next hop
        to: SocketAddr,
        /// Message with the next segment in front
        message: Vec<u8>,
    },
    /// This hop was the last one.
    Terminal {
        /// Decrypted body following the routing header
        payload: Vec<u8>,
    },
}

fn magic_at(splice: &Splice, offset: usize) -> Result<Magic, SpliceError> {
    let mut magic = [0; MAGIC_SIZE];
    magic.copy_from_slice(splice.range(offset, offset + MAGIC_SIZE)?);
    Ok(magic)
}

fn expect_magic(splice: &Splice, offset: usize, expected: Magic) -> Result<(), PeelError> {
    let magic = magic_at(splice, offset)?;
    if magic != expected {
        return Err(DecodeError::UnknownMagic { magic }.into())
    }
    Ok(())
}

/** Peel one hop off a message starting with a routing header.

The two segments after the front one are decrypted with the header key, the
body with the payload key. Then the segments are moved one segment width up
and the freed last segment is filled with random noise, so the message keeps
its length and a peeled header looks like an unpeeled one.
*/
pub fn peel(message: Vec<u8>, keys: &SessionKeys) -> Result<Peeled, PeelError> {
    if message.len() < ROUTING_HEADER_SIZE {
        return Err(PeelError::TooShort { need: ROUTING_HEADER_SIZE, have: message.len() })
    }

    let mut splice = Splice::load(message);
    expect_magic(&splice, 0, REVERSE)?;
    expect_magic(&splice, REVERSE_SIZE, CRYPT)?;
    splice.set_cursor(REVERSE_SIZE)?;
    let crypt: Crypt = splice.read("crypt")?;

    let header_key = crypt.open(&keys.header)?;
    let payload_key = crypt.open(&keys.payload)?;
    let len = splice.len();
    encipher(&header_key, &crypt.nonce, splice.range_mut(SEGMENT_SIZE, ROUTING_HEADER_SIZE)?);
    encipher(&payload_key, &crypt.nonce, splice.range_mut(ROUTING_HEADER_SIZE, len)?);

    splice.copy_within(SEGMENT_SIZE..ROUTING_HEADER_SIZE, 0)?;
    splice.noise(ROUTING_HEADER_SIZE - SEGMENT_SIZE, ROUTING_HEADER_SIZE)?;

    if magic_at(&splice, 0)? == REVERSE && magic_at(&splice, REVERSE_SIZE)? == CRYPT {
        splice.set_cursor(0)?;
        let reverse: Reverse = splice.read("reverse")?;
        Ok(Peeled::Forward { to: reverse.to, message: splice.into_bytes() })
    } else {
        let mut payload = splice.into_bytes();
        payload.drain(..ROUTING_HEADER_SIZE);
        Ok(Peeled::Terminal { payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use shroud_packet::onion::Session;

    struct Relay {
        address: SocketAddr,
        session: Session,
    }

    impl Relay {
        fn new(address: &str) -> Relay {
            Relay { address: address.parse().unwrap(), session: Session::random() }
        }

        fn hop(&self) -> Option<RoutingHop> {
            Some(RoutingHop::new(self.address, self.session.header_pk(), self.session.payload_pk()))
        }

        fn keys(&self) -> SessionKeys {
            SessionKeys::from(&self.session)
        }
    }

    fn relays() -> [Relay; HOPS] {
        [Relay::new("10.0.0.1:1"), Relay::new("10.0.0.2:2"), Relay::new("10.0.0.3:3")]
    }

    #[test]
    fn routing_header_length_is_constant() {
        let relays = relays();
        let full = build_reply(&[relays[0].hop(), relays[1].hop(), relays[2].hop()]).unwrap();
        let empty = build_reply(&[None, None, None]).unwrap();
        let mixed = build_reply(&[relays[0].hop(), None, relays[2].hop()]).unwrap();
        for reply in &[full, empty, mixed] {
            let mut buf = [0; REPLY_SIZE];
            let (_, size) = reply.to_bytes((&mut buf, 0)).unwrap();
            assert_eq!(size, REPLY_SIZE);
            assert_eq!(reply.routing_header.len(), ROUTING_HEADER_SIZE);
        }
    }

    #[test]
    fn first_hop_is_readable() {
        let relays = relays();
        let reply = build_reply(&[relays[0].hop(), relays[1].hop(), relays[2].hop()]).unwrap();
        assert_eq!(reply.first_hop(), Some(relays[0].address));
    }

    #[test]
    fn reply_travels_three_hops() {
        let relays = relays();
        let reply = build_reply(&[relays[0].hop(), relays[1].hop(), relays[2].hop()]).unwrap();
        let body = b"the answer is 42".to_vec();
        let message = reply.message(&body);
        let len = message.len();

        let message = match peel(message, &relays[0].keys()).unwrap() {
            Peeled::Forward { to, message } => {
                assert_eq!(to, relays[1].address);
                message
            },
            peeled => panic!("Unexpected {:?}", peeled),
        };
        assert_eq!(message.len(), len);

        let message = match peel(message, &relays[1].keys()).unwrap() {
            Peeled::Forward { to, message } => {
                assert_eq!(to, relays[2].address);
                message
            },
            peeled => panic!("Unexpected {:?}", peeled),
        };
        assert_eq!(message.len(), len);

        match peel(message, &relays[2].keys()).unwrap() {
            Peeled::Terminal { payload } => assert_eq!(payload, body),
            peeled => panic!("Unexpected {:?}", peeled),
        }
    }

    #[test]
    fn build_with_given_keys_is_deterministic() {
        let relays = relays();
        let hops = [relays[0].hop(), relays[1].hop(), relays[2].hop()];
        let keys = [gen_keypair().1, gen_keypair().1, gen_keypair().1];
        let nonces = [[1; NONCE_SIZE], [2; NONCE_SIZE], [3; NONCE_SIZE]];
        let first = build_routing_header(&hops, &keys, &nonces).unwrap();
        let second = build_routing_header(&hops, &keys, &nonces).unwrap();
        // cloaks are blinded with fresh randomness, everything else is derived
        assert_eq!(first.ciphers, second.ciphers);
        assert_eq!(first.nonces, nonces);
        assert_eq!(first.routing_header[..MAGIC_SIZE], REVERSE);
    }

    fn peel_first(relays: &[Relay; HOPS], body: &[u8]) -> Vec<u8> {
        let reply = build_reply(&[relays[0].hop(), relays[1].hop(), relays[2].hop()]).unwrap();
        match peel(reply.message(body), &relays[0].keys()).unwrap() {
            Peeled::Forward { message, .. } => message,
            peeled => panic!("Unexpected {:?}", peeled),
        }
    }

    #[test]
    fn peel_pads_with_fresh_noise() {
        let relays = relays();
        let reply = build_reply(&[relays[0].hop(), relays[1].hop(), relays[2].hop()]).unwrap();
        let message = reply.message(b"body");
        let tail = ROUTING_HEADER_SIZE - SEGMENT_SIZE..ROUTING_HEADER_SIZE;

        let first = match peel(message.clone(), &relays[0].keys()).unwrap() {
            Peeled::Forward { message, .. } => message,
            peeled => panic!("Unexpected {:?}", peeled),
        };
        let second = match peel(message, &relays[0].keys()).unwrap() {
            Peeled::Forward { message, .. } => message,
            peeled => panic!("Unexpected {:?}", peeled),
        };
        assert_eq!(first[..tail.start], second[..tail.start]);
        assert_ne!(first[tail.clone()], second[tail.clone()]);
        assert_eq!(first[tail.end..], second[tail.end..]);
    }

    #[test]
    fn padding_has_no_recurring_pattern() {
        const PEELS: usize = 16;
        const WINDOW: usize = 8;
        let start = ROUTING_HEADER_SIZE - SEGMENT_SIZE;
        let tails: Vec<Vec<u8>> = (0..PEELS)
            .map(|_| peel_first(&relays(), b"body")[start..ROUTING_HEADER_SIZE].to_vec())
            .collect();

        // no position holds the same byte after every peel
        for i in 0..SEGMENT_SIZE {
            assert!(tails.iter().any(|tail| tail[i] != tails[0][i]), "byte {} is fixed", i);
        }

        // no two paddings share a run of bytes anywhere
        let mut windows = std::collections::HashMap::new();
        for (n, tail) in tails.iter().enumerate() {
            for window in tail.windows(WINDOW) {
                if let Some(other) = windows.insert(window.to_vec(), n) {
                    assert_eq!(other, n, "paddings {} and {} share {:02X?}", other, n, window);
                }
            }
        }
    }

    #[test]
    fn peel_with_foreign_keys_ends_the_path() {
        let relays = relays();
        let reply = build_reply(&[relays[0].hop(), relays[1].hop(), relays[2].hop()]).unwrap();
        let message = reply.message(b"body");
        // decrypting with wrong keys yields noise instead of the next segment
        let peeled = peel(message, &relays[1].keys()).unwrap();
        assert!(matches!(peeled, Peeled::Terminal { .. }));
    }

    #[test]
    fn peel_too_short() {
        let relays = relays();
        assert_eq!(
            peel(vec![0; ROUTING_HEADER_SIZE - 1], &relays[0].keys()),
            Err(PeelError::TooShort { need: ROUTING_HEADER_SIZE, have: ROUTING_HEADER_SIZE - 1 })
        );
    }

    #[test]
    fn peel_not_a_segment() {
        let relays = relays();
        let mut message = vec![0; ROUTING_HEADER_SIZE];
        message[..MAGIC_SIZE].copy_from_slice(&REVERSE);
        assert_eq!(
            peel(message, &relays[0].keys()),
            Err(PeelError::Decode(DecodeError::UnknownMagic { magic: [0; MAGIC_SIZE] }))
        );
    }
}
