/*! Wire structures of the shroud protocol.

- [`magic`] holds the 4-byte tags every onion layer starts with and the
  registry that maps them to layer kinds.
- [`onion`] holds the layers ("skins") themselves and the onion chain that
  serialises and encrypts a list of skins into one buffer.
- [`transport`] holds the fixed size packets a message is split into.
*/

#![forbid(unsafe_code)]

#[macro_use]
extern crate cookie_factory;

pub mod magic;
pub mod onion;
pub mod transport;
