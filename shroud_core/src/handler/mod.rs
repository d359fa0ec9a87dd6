/*! Handling of messages arriving at a relay.

A message is a chain of skins. The handler walks the chain, removes every
layer addressed to this relay and stops at the first skin that sends the rest
of the message elsewhere.
*/

mod errors;

pub use self::errors::*;

use std::net::SocketAddr;
use std::sync::Arc;

use shroud_binary_io::*;
use shroud_crypto::*;
use shroud_packet::magic::Registry;
use shroud_packet::onion::*;

use crate::keys::{KeySource, KeyTable, SessionKeys};
use crate::routing::{peel, Peeled};

/// What the caller has to do after a message was handled.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Send `message` to `to`.
    Forward {
        /// Address of the next relay
        to: SocketAddr,
        /// Rest of the message
        message: Vec<u8>,
    },
    /// Hand `payload` to the local service on `port` and send its answer
    /// back through `reply`.
    Exit {
        /// Request id
        id: Id,
        /// Port of the local service
        port: u16,
        /// Request for the service
        payload: Vec<u8>,
        /// Return path
        reply: Reply,
    },
    /// Skin is for the service layer on top of the relay.
    Deliver(Skin),
}

/** Relay side of the onion protocol.

Clones share the key table, so sessions provisioned through one clone are
visible to all of them.
*/
#[derive(Clone)]
pub struct Handler {
    /// Address this relay is reachable at
    address: SocketAddr,
    /// Known skins
    registry: Arc<Registry>,
    /// Identity and session keys
    keys: KeyTable,
}

impl Handler {
    /// Create new `Handler`.
    pub fn new(address: SocketAddr, registry: Arc<Registry>, keys: KeyTable) -> Handler {
        Handler { address, registry, keys }
    }

    /// Address this relay is reachable at.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Keys of the relay.
    pub fn keys(&self) -> &KeyTable {
        &self.keys
    }

    async fn find_keys(&self, cloak: &Cloak) -> Option<(KeySource, SessionKeys)> {
        match self.keys.find_cloaked(cloak).await {
            Ok(found) => Some(found),
            Err(e) => {
                trace!("Dropping message at {}: {}", self.address, e);
                None
            },
        }
    }

    /** Handle one message.

    Messages with layers encrypted for somebody else are dropped silently and
    produce no outcomes. Any other failure drops the message and is returned.
    */
    pub async fn handle(&self, message: Vec<u8>) -> Result<Vec<Outcome>, HandleError> {
        let mut outcomes = Vec::new();
        let mut splice = Splice::load(message);
        // source of the key that opened the crypt right before the current skin
        let mut opened_with = None;

        while splice.remaining() > 0 {
            let offset = splice.cursor();
            let skin = Skin::decode(&self.registry, &mut splice)?;
            let previous = opened_with.take();

            match skin {
                Skin::Forward(forward) => {
                    let rest = splice.range(splice.cursor(), splice.len())?.to_vec();
                    outcomes.push(Outcome::Forward { to: forward.to, message: rest });
                    return Ok(outcomes)
                },
                Skin::Crypt(crypt) => {
                    let (source, keys) = match self.find_keys(&crypt.cloak).await {
                        Some(found) => found,
                        None => return Ok(Vec::new()),
                    };
                    let key = crypt.open(&keys.header)?;
                    let (start, len) = (splice.cursor(), splice.len());
                    encipher(&key, &crypt.nonce, splice.range_mut(start, len)?);
                    opened_with = Some(source);
                },
                Skin::Session(session) => {
                    if previous != Some(KeySource::Identity) {
                        return Err(ProtocolError::UnexpectedSession { offset }.into())
                    }
                    let keys = SessionKeys::from(&session);
                    let header_pk = keys.header_pk();
                    if self.keys.insert(keys).await {
                        debug!("Provisioned session {:?} at {}", header_pk, self.address);
                    }
                },
                Skin::Reverse(reverse) => {
                    if reverse.to != self.address {
                        return Err(ProtocolError::Misdirected { expected: self.address, got: reverse.to }.into())
                    }
                    let crypt: Crypt = splice.peek()?;
                    let (_, keys) = match self.find_keys(&crypt.cloak).await {
                        Some(found) => found,
                        None => return Ok(Vec::new()),
                    };
                    let message = splice.range(offset, splice.len())?.to_vec();
                    match peel(message, &keys)? {
                        Peeled::Forward { to, message } => {
                            outcomes.push(Outcome::Forward { to, message });
                            return Ok(outcomes)
                        },
                        Peeled::Terminal { payload } => {
                            trace!("Return path ends at {}", self.address);
                            splice = Splice::load(payload);
                        },
                    }
                },
                Skin::Exit(exit) => {
                    outcomes.push(Outcome::Exit {
                        id: exit.id,
                        port: exit.port,
                        payload: exit.payload,
                        reply: exit.reply,
                    });
                },
                Skin::End(_) => return Ok(outcomes),
                skin => outcomes.push(Outcome::Deliver(skin)),
            }
        }

        Ok(outcomes)
    }
}
