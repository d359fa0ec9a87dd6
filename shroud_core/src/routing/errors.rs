/*! Errors enum for routing headers.
*/

use thiserror::Error;

use shroud_binary_io::SpliceError;
use shroud_crypto::CryptoError;
use shroud_packet::onion::DecodeError;

/// Error that can happen when peeling a routing header.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PeelError {
    /// Message is shorter than a routing header.
    #[error("Message needs at least {need} bytes but has {have}")]
    TooShort {
        /// Size of routing header.
        need: usize,
        /// Size of the message.
        have: usize,
    },
    /// Front segment is not a `Reverse` followed by a `Crypt`.
    #[error("Invalid front segment: {0}")]
    Decode(#[from] DecodeError),
    /// Key agreement failed.
    #[error("Key agreement failed: {0}")]
    Crypto(#[from] CryptoError),
    /// Message bytes can't be accessed.
    #[error("Failed to access message: {0}")]
    Splice(#[from] SpliceError),
}
