/*!
Core of the shroud onion protocol: return paths, erasure coded transport and
the relay side message handler.

Everything here works on owned buffers and does no I/O. Sending and receiving
packets is up to the embedding application.
*/

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod config;
pub mod handler;
pub mod keys;
pub mod routing;
pub mod transmission;
