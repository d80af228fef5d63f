//! Error type shared by every communicator operation.

use std::io;
use std::path::PathBuf;

use rosc::OscType;

use crate::net::Endpoint;

/// Errors raised while talking to the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A socket could not be bound. Raised only during construction.
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },
    /// The listener thread could not be started.
    #[error("failed to spawn listener thread: {0}")]
    Spawn(#[source] io::Error),
    /// A command could not be handed to the transport.
    #[error("failed to send command: {0}")]
    Send(#[source] io::Error),
    /// rosc refused to encode an outbound message.
    #[error("failed to encode OSC message: {0}")]
    Encode(String),
    /// The reply did not have the shape the request expects.
    #[error("unexpected reply on {address}: {args:?}")]
    UnexpectedReply { address: String, args: Vec<OscType> },
    /// Graphics quality outside `0..=4`.
    #[error("quality level {0} is out of range 0-4")]
    InvalidQuality(u8),
    /// A resolution string that is not `WIDTHxHEIGHT`.
    #[error("invalid resolution {0:?}, expected WIDTHxHEIGHT")]
    InvalidResolution(String),
    /// A bounded request saw no reply in time.
    #[error("timed out waiting for a reply")]
    Timeout,
    /// The communicator was already closed.
    #[error("communicator is closed")]
    Closed,
    /// A screenshot path that cannot be sent as an OSC string.
    #[error("path {} is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),
    /// A saved screenshot could not be read back.
    #[error("failed to read image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_names_endpoint() {
        let err = Error::Bind {
            endpoint: Endpoint::localhost(7001),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().starts_with("failed to bind 127.0.0.1:7001"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_is_displayed_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let err = Error::NonUtf8Path(PathBuf::from(OsStr::from_bytes(b"shot\xff.png")));
        assert_eq!(err.to_string(), "path shot\u{fffd}.png is not valid UTF-8");
    }

    #[test]
    fn unexpected_reply_lists_args() {
        let err = Error::UnexpectedReply {
            address: "/get/location".into(),
            args: vec![OscType::Float(1.0)],
        };
        assert_eq!(
            err.to_string(),
            "unexpected reply on /get/location: [Float(1.0)]"
        );
    }
}
