/*! Fixed size transport packets
*/

mod packet;

pub use self::packet::*;
