/*! Errors enum for the skin handler.
*/

use std::net::SocketAddr;

use thiserror::Error;

use shroud_binary_io::SpliceError;
use shroud_crypto::CryptoError;
use shroud_packet::onion::DecodeError;

use crate::routing::PeelError;

/// Skin arrived where the protocol doesn't allow it.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ProtocolError {
    /// `Session` not directly inside a `Crypt` opened with the identity key.
    #[error("Session at {offset} is not encrypted with the identity key")]
    UnexpectedSession {
        /// Offset of the `Session` skin.
        offset: usize,
    },
    /// `Reverse` names another relay.
    #[error("Reverse segment for {got} arrived at {expected}")]
    Misdirected {
        /// Address of this relay.
        expected: SocketAddr,
        /// Address in the segment.
        got: SocketAddr,
    },
}

/// Error that can happen when handling a message.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum HandleError {
    /// Skin can't be decoded.
    #[error("Failed to decode skin: {0}")]
    Decode(#[from] DecodeError),
    /// Key agreement failed.
    #[error("Key agreement failed: {0}")]
    Crypto(#[from] CryptoError),
    /// Routing header can't be peeled.
    #[error("Failed to peel routing header: {0}")]
    Peel(#[from] PeelError),
    /// Skin is out of place.
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
    /// Message bytes can't be accessed.
    #[error("Failed to access message: {0}")]
    Splice(#[from] SpliceError),
}
