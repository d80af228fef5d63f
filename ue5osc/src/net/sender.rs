//! Outbound socket for commands sent to the engine.

use std::io;
use std::net::UdpSocket;

use super::Endpoint;

/// A blocking UDP socket with a fixed destination.
///
/// Not `connect`ed: a connected UDP socket surfaces ICMP port-unreachable
/// as `ECONNREFUSED` on later sends while the engine is down.
#[derive(Debug)]
pub struct CommandSocket {
    socket: UdpSocket,
    target: Endpoint,
}

impl CommandSocket {
    /// Binds an ephemeral local port able to reach `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub fn bind(target: Endpoint) -> io::Result<Self> {
        let socket = UdpSocket::bind(target.unspecified_peer().as_socket_addr())?;
        Ok(Self { socket, target })
    }

    /// Where commands are sent.
    #[must_use]
    pub const fn target(&self) -> Endpoint {
        self.target
    }

    /// Sends one datagram to the target.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or if the datagram was truncated.
    pub fn send(&self, datagram: &[u8]) -> io::Result<()> {
        let sent = self.socket.send_to(datagram, self.target.as_socket_addr())?;
        if sent != datagram.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {sent} of {} bytes", datagram.len()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn send_reaches_target() {
        let engine = UdpSocket::bind("127.0.0.1:0").unwrap();
        engine
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let target = Endpoint::from(engine.local_addr().unwrap());

        let sender = CommandSocket::bind(target).unwrap();
        assert_eq!(sender.target(), target);
        sender.send(b"/reset").unwrap();

        let mut buf = [0u8; 32];
        let (n, _) = engine.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"/reset");
    }
}
