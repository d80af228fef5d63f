//! Network endpoint of either side of the OSC link.

use std::fmt;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An IP address and port: the engine's command port or the local reply port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(SocketAddr);

impl Endpoint {
    /// Creates a new endpoint from an IP address and port.
    #[must_use]
    pub const fn new(addr: IpAddr, port: u16) -> Self {
        Self(SocketAddr::new(addr, port))
    }

    /// Creates a loopback endpoint on the given port.
    ///
    /// The engine usually runs on the same machine as the controlling script.
    #[must_use]
    pub const fn localhost(port: u16) -> Self {
        Self(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)))
    }

    /// Returns the IP address.
    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.0.port()
    }

    /// Wildcard address of the same family on an OS-assigned port.
    ///
    /// Used to bind the outbound sender so it can reach `self`.
    #[must_use]
    pub const fn unspecified_peer(&self) -> Self {
        match self.0 {
            SocketAddr::V4(_) => Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => Self::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        }
    }

    /// Returns the underlying [`SocketAddr`].
    #[must_use]
    pub const fn as_socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl From<Endpoint> for SocketAddr {
    fn from(ep: Endpoint) -> Self {
        ep.0
    }
}

impl FromStr for Endpoint {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SocketAddr>().map(Self)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_is_loopback_v4() {
        let ep = Endpoint::localhost(7447);
        assert_eq!(ep.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(ep.port(), 7447);
    }

    #[test]
    fn parse_and_display() {
        let ep: Endpoint = "10.0.0.5:7001".parse().unwrap();
        assert_eq!(ep.port(), 7001);
        assert_eq!(format!("{ep}"), "10.0.0.5:7001");
        assert!("10.0.0.5".parse::<Endpoint>().is_err());
    }

    #[test]
    fn unspecified_peer_matches_family() {
        let v4 = Endpoint::localhost(9000).unspecified_peer();
        assert_eq!(v4.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(v4.port(), 0);

        let v6: Endpoint = "[::1]:9000".parse().unwrap();
        assert_eq!(
            v6.unspecified_peer().ip(),
            IpAddr::V6(Ipv6Addr::UNSPECIFIED)
        );
    }
}
