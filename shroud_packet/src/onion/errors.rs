/*! Errors enum for onion skins.
*/

use thiserror::Error;

use shroud_binary_io::SpliceError;
use shroud_crypto::CryptoError;

use crate::magic::Magic;

/// Error that can happen when decoding a skin.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    /// Not enough bytes left for the fixed part of the skin.
    #[error("Skin {magic:?} needs {need} bytes but only {have} are left")]
    TooShort {
        /// Magic of the skin being decoded.
        magic: Magic,
        /// Size of the fixed part of the skin.
        need: usize,
        /// Bytes left in the buffer.
        have: usize,
    },
    /// Magic at the cursor is not registered.
    #[error("Unknown magic {magic:?}")]
    UnknownMagic {
        /// Magic found at the cursor.
        magic: Magic,
    },
    /// Skin fields can't be read.
    #[error("Failed to read skin: {0}")]
    Splice(#[from] SpliceError),
}

/// Error that can happen when encoding an onion.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EncodeError {
    /// Crypt skin has no keys to encrypt with. Only crypts created with
    /// `Crypt::new` can be encoded.
    #[error("Crypt skin at offset {offset} has no sealing keys")]
    Unsealed {
        /// Offset of encrypted region.
        offset: usize,
    },
    /// Crypt depth requires more bytes after it than the onion has.
    #[error("Crypt of depth {depth} needs a header region up to {end} but onion has {len} bytes")]
    DepthOutOfRange {
        /// Depth of the crypt.
        depth: usize,
        /// End of header region the depth requires.
        end: usize,
        /// Length of the onion.
        len: usize,
    },
    /// Key agreement failed.
    #[error("Key agreement failed: {0}")]
    Crypto(#[from] CryptoError),
    /// Skin doesn't fit into the buffer.
    #[error("Failed to write skin: {0}")]
    Splice(#[from] SpliceError),
}
