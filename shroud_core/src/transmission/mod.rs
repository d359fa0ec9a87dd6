/*! Erasure-coded transport of payloads larger than a packet.

A payload is cut into shards of equal size, shards are grouped into
Reed-Solomon codewords of at most 256 shards and every shard travels in its
own encrypted `Packet`. The receiver joins whatever arrived and reconstructs
lost shards from parity.
*/

mod errors;
mod join;
mod reassembly;
mod segment;
mod split;

pub use self::errors::*;
pub use self::join::*;
pub use self::reassembly::*;
pub use self::segment::*;
pub use self::split::*;
