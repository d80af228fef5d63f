//! UDP transport for both directions of the OSC link.
//!
//! Commands leave through a blocking [`CommandSocket`]; replies arrive on a
//! non-blocking, mio-registered [`ReplySocket`] owned by the listener thread.

pub mod endpoint;
pub mod sender;
pub mod socket;

pub use endpoint::Endpoint;
pub use sender::CommandSocket;
pub use socket::ReplySocket;
