//! Secret keys a relay can be addressed with.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::lock::Mutex;

use shroud_crypto::*;
use shroud_packet::onion::Session;

/// Where a matching key came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeySource {
    /// Long term identity key of the relay.
    Identity,
    /// Key provisioned with a `Session` skin.
    Session,
}

/// Pair of secret keys used to open one crypt. For the identity key both
/// halves are the identity key.
#[derive(Clone)]
pub struct SessionKeys {
    /// Key peeling routing header segments
    pub header: SecretKey,
    /// Key decrypting payloads
    pub payload: SecretKey,
}

impl SessionKeys {
    /// Use one key for both halves.
    pub fn single(sk: SecretKey) -> SessionKeys {
        SessionKeys { header: sk.clone(), payload: sk }
    }

    /// Public key crypts addressed to these keys are cloaked with.
    pub fn header_pk(&self) -> PublicKey {
        PublicKey::from(&self.header)
    }
}

impl From<&Session> for SessionKeys {
    fn from(session: &Session) -> SessionKeys {
        SessionKeys {
            header: session.header.clone(),
            payload: session.payload.clone(),
        }
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("header_pk", &self.header_pk())
            .finish()
    }
}

/** Identity key and session keys of a relay.

Session keys are added and looked up concurrently by every handler so they
live behind one async mutex. A lookup scans all keys under a single lock.
*/
#[derive(Clone)]
pub struct KeyTable {
    identity: SessionKeys,
    identity_pk: PublicKey,
    sessions: Arc<Mutex<HashMap<PublicKey, SessionKeys>>>,
}

impl KeyTable {
    /// Create new `KeyTable` with no sessions.
    pub fn new(identity: SecretKey) -> KeyTable {
        let identity = SessionKeys::single(identity);
        KeyTable {
            identity_pk: identity.header_pk(),
            identity,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Public identity key of the relay.
    pub fn identity_pk(&self) -> PublicKey {
        self.identity_pk
    }

    /// Add session keys. Returns `false` if the session was already known.
    pub async fn insert(&self, keys: SessionKeys) -> bool {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(keys.header_pk(), keys).is_none()
    }

    /// Remove session addressed by `header_pk`. Returns `false` if there was
    /// no such session.
    pub async fn remove(&self, header_pk: &PublicKey) -> bool {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(header_pk).is_some()
    }

    /// Number of sessions.
    pub async fn sessions_len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Find keys whose header public key matches `cloak`.
    pub async fn find_cloaked(&self, cloak: &Cloak) -> Result<(KeySource, SessionKeys), CryptoError> {
        if cloak_matches(cloak, &self.identity_pk) {
            return Ok((KeySource::Identity, self.identity.clone()))
        }

        let sessions = self.sessions.lock().await;
        sessions.iter()
            .find(|(pk, _)| cloak_matches(cloak, pk))
            .map(|(_, keys)| (KeySource::Session, keys.clone()))
            .ok_or(CryptoError::NoMatchingKey)
    }
}
