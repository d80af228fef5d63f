//! OSC vocabulary of the engine: addresses, outbound commands, replies and
//! the value types they carry.
//!
//! Encoding and decoding is done by [`rosc`]; this module only decides what
//! goes into a message and how a reply is read back.

pub mod address;
pub mod command;
pub mod reply;
pub mod types;

pub use command::{Command, DUMMY_ARG, decode_datagram};
pub use reply::Reply;
pub use types::{Location, Quality, Resolution, Rotation};
