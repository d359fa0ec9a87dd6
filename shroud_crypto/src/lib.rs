//! Functions for the core crypto.
//!
//! Every onion layer is encrypted with a symmetric key derived from an x25519
//! agreement between a one-time sender key and the recipient key. Recipients
//! are never named on the wire, only by a cloak: a blinded truncated hash of
//! their public key that only the owner of the key can recognise.

#![forbid(unsafe_code)]

use rand::{thread_rng, RngCore};
use salsa20::{Key, XNonce, XSalsa20};
use salsa20::cipher::{KeyIvInit, StreamCipher};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use x25519_dalek::{PublicKey, StaticSecret as SecretKey};

/// Size of x25519 public and secret keys.
pub const KEY_SIZE: usize = 32;
/// Size of the XSalsa20 nonce.
pub const NONCE_SIZE: usize = 24;
/// Size of the symmetric key derived from a shared secret.
pub const SYM_KEY_SIZE: usize = 32;
/// Size of random blinder that opens a cloak.
pub const BLINDER_SIZE: usize = 4;
/// Size of a cloaked public key.
pub const CLOAK_SIZE: usize = 16;
/// Size of transmission and message ids.
pub const ID_SIZE: usize = 8;
/// Size of SHA-256 hash.
pub const HASH_SIZE: usize = 32;
/// Size of integrity check prefix.
pub const CHECK_SIZE: usize = 4;
/// Size of a signature. Signatures are carried opaquely.
pub const SIGNATURE_SIZE: usize = 64;

/// XSalsa20 nonce.
pub type Nonce = [u8; NONCE_SIZE];
/// Symmetric key for the stream cipher.
pub type SymKey = [u8; SYM_KEY_SIZE];
/// Blinded recipient tag.
pub type Cloak = [u8; CLOAK_SIZE];
/// Random identifier.
pub type Id = [u8; ID_SIZE];
/// SHA-256 digest.
pub type Hash = [u8; HASH_SIZE];
/// Opaque signature bytes.
pub type Signature = [u8; SIGNATURE_SIZE];

/// Error that can happen during key agreement or key lookup.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CryptoError {
    /// Peer public key is a low order point so shared secret is all zeros.
    #[error("Shared secret is non-contributory")]
    NonContributory,
    /// None of the local keys opens the cloak.
    #[error("No local key matches the cloak")]
    NoMatchingKey,
}

/// Generate new random key pair.
pub fn gen_keypair() -> (PublicKey, SecretKey) {
    let sk = SecretKey::random_from_rng(thread_rng());
    (PublicKey::from(&sk), sk)
}

/// Generate random nonce.
pub fn gen_nonce() -> Nonce {
    let mut nonce = [0; NONCE_SIZE];
    thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Generate random id.
pub fn gen_id() -> Id {
    let mut id = [0; ID_SIZE];
    thread_rng().fill_bytes(&mut id);
    id
}

/// SHA-256 of `data`.
pub fn hash(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Short integrity check: first bytes of SHA-256 of `data`.
pub fn check(data: &[u8]) -> [u8; CHECK_SIZE] {
    let mut check = [0; CHECK_SIZE];
    check.copy_from_slice(&Sha256::digest(data)[..CHECK_SIZE]);
    check
}

/** Derive symmetric key from our secret key and their public key.

The key is SHA-256 of x25519 shared secret. Low order public keys are
rejected since they would force the shared secret to zeros.
*/
pub fn derive_key(sk: &SecretKey, pk: &PublicKey) -> Result<SymKey, CryptoError> {
    let shared = sk.diffie_hellman(pk);
    if !shared.was_contributory() {
        return Err(CryptoError::NonContributory)
    }
    Ok(hash(shared.as_bytes()))
}

/// Apply XSalsa20 keystream to `data` in place. Encryption and decryption
/// are the same operation.
pub fn encipher(key: &SymKey, nonce: &Nonce, data: &mut [u8]) {
    let mut cipher = XSalsa20::new(Key::from_slice(key), XNonce::from_slice(nonce));
    cipher.apply_keystream(data);
}

/// Cloak public key with a fresh random blinder.
pub fn cloak(pk: &PublicKey) -> Cloak {
    let mut blinder = [0; BLINDER_SIZE];
    thread_rng().fill_bytes(&mut blinder);
    cloak_with(blinder, pk)
}

/// Cloak public key with the given blinder.
pub fn cloak_with(blinder: [u8; BLINDER_SIZE], pk: &PublicKey) -> Cloak {
    let mut hasher = Sha256::new();
    hasher.update(blinder);
    hasher.update(pk.as_bytes());
    let digest = hasher.finalize();

    let mut cloak = [0; CLOAK_SIZE];
    cloak[..BLINDER_SIZE].copy_from_slice(&blinder);
    cloak[BLINDER_SIZE..].copy_from_slice(&digest[..CLOAK_SIZE - BLINDER_SIZE]);
    cloak
}

/// Check if `cloak` was made for `pk`.
pub fn cloak_matches(cloak: &Cloak, pk: &PublicKey) -> bool {
    let mut blinder = [0; BLINDER_SIZE];
    blinder.copy_from_slice(&cloak[..BLINDER_SIZE]);
    cloak_with(blinder, pk) == *cloak
}
