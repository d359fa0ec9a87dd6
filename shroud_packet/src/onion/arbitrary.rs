/*! `Arbitrary` skins for property tests. **Use only in tests!**
*/

use std::net::{IpAddr, SocketAddr};

use quickcheck::{Arbitrary, Gen};

use shroud_crypto::*;

use super::*;

/// Array filled with arbitrary bytes.
fn arb_array<const N: usize>(g: &mut Gen) -> [u8; N] {
    let mut bytes = [0; N];
    for byte in bytes.iter_mut() {
        *byte = u8::arbitrary(g);
    }
    bytes
}

/// Address without IPv6 flow info and scope id, which are not serialized.
fn arb_addr(g: &mut Gen) -> SocketAddr {
    SocketAddr::new(IpAddr::arbitrary(g), u16::arbitrary(g))
}

fn arb_pk(g: &mut Gen) -> PublicKey {
    PublicKey::from(arb_array::<KEY_SIZE>(g))
}

fn arb_sk(g: &mut Gen) -> SecretKey {
    SecretKey::from(arb_array::<KEY_SIZE>(g))
}

impl Arbitrary for Reply {
    fn arbitrary(g: &mut Gen) -> Self {
        Reply {
            routing_header: arb_array(g),
            ciphers: [arb_array(g), arb_array(g), arb_array(g)],
            nonces: [arb_array(g), arb_array(g), arb_array(g)],
        }
    }
}

impl Arbitrary for Forward {
    fn arbitrary(g: &mut Gen) -> Self {
        Forward { to: arb_addr(g) }
    }
}

impl Arbitrary for Reverse {
    fn arbitrary(g: &mut Gen) -> Self {
        Reverse { to: arb_addr(g) }
    }
}

impl Arbitrary for Crypt {
    fn arbitrary(g: &mut Gen) -> Self {
        Crypt { cloak: arb_array(g), sender: arb_pk(g), nonce: arb_array(g), seal: None }
    }
}

impl Arbitrary for Session {
    fn arbitrary(g: &mut Gen) -> Self {
        Session { header: arb_sk(g), payload: arb_sk(g) }
    }
}

impl Arbitrary for Exit {
    fn arbitrary(g: &mut Gen) -> Self {
        Exit {
            id: arb_array(g),
            port: u16::arbitrary(g),
            reply: Reply::arbitrary(g),
            payload: Vec::arbitrary(g),
        }
    }
}

impl Arbitrary for Response {
    fn arbitrary(g: &mut Gen) -> Self {
        Response {
            id: arb_array(g),
            port: u16::arbitrary(g),
            load: u8::arbitrary(g),
            payload: Vec::arbitrary(g),
        }
    }
}

impl Arbitrary for Confirmation {
    fn arbitrary(g: &mut Gen) -> Self {
        Confirmation { id: arb_array(g), load: u8::arbitrary(g) }
    }
}

impl Arbitrary for Message {
    fn arbitrary(g: &mut Gen) -> Self {
        Message {
            address: arb_pk(g),
            id: arb_array(g),
            reply_id: arb_array(g),
            reply: Reply::arbitrary(g),
            payload: Vec::arbitrary(g),
        }
    }
}

impl Arbitrary for Ready {
    fn arbitrary(g: &mut Gen) -> Self {
        Ready {
            id: arb_array(g),
            address: arb_pk(g),
            forward: Reply::arbitrary(g),
            ret: Reply::arbitrary(g),
        }
    }
}

impl Arbitrary for Route {
    fn arbitrary(g: &mut Gen) -> Self {
        Route {
            cloak: arb_array(g),
            sender: arb_pk(g),
            nonce: arb_array(g),
            id: arb_array(g),
            reply: Reply::arbitrary(g),
        }
    }
}

impl Arbitrary for Intro {
    fn arbitrary(g: &mut Gen) -> Self {
        Intro {
            id: arb_array(g),
            key: arb_pk(g),
            address: arb_addr(g),
            expiry: u64::arbitrary(g),
            signature: arb_array(g),
        }
    }
}

impl Arbitrary for GetBalance {
    fn arbitrary(g: &mut Gen) -> Self {
        GetBalance { id: arb_array(g), confirmation_id: arb_array(g), reply: Reply::arbitrary(g) }
    }
}

impl Arbitrary for Balance {
    fn arbitrary(g: &mut Gen) -> Self {
        Balance { id: arb_array(g), confirmation_id: arb_array(g), amount: u64::arbitrary(g) }
    }
}

impl Arbitrary for End {
    fn arbitrary(_g: &mut Gen) -> Self {
        End
    }
}

impl Arbitrary for Skin {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 14 {
            0 => Skin::Forward(Forward::arbitrary(g)),
            1 => Skin::Reverse(Reverse::arbitrary(g)),
            2 => Skin::Crypt(Crypt::arbitrary(g)),
            3 => Skin::Session(Session::arbitrary(g)),
            4 => Skin::Exit(Exit::arbitrary(g)),
            5 => Skin::Response(Response::arbitrary(g)),
            6 => Skin::Confirmation(Confirmation::arbitrary(g)),
            7 => Skin::Message(Message::arbitrary(g)),
            8 => Skin::Ready(Ready::arbitrary(g)),
            9 => Skin::Route(Route::arbitrary(g)),
            10 => Skin::Intro(Intro::arbitrary(g)),
            11 => Skin::GetBalance(GetBalance::arbitrary(g)),
            12 => Skin::Balance(Balance::arbitrary(g)),
            _ => Skin::End(End),
        }
    }
}
