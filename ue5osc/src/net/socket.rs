//! Non-blocking UDP socket that receives engine replies.
//!
//! Thin wrapper around [`mio::net::UdpSocket`] so the listener thread can wait
//! on socket readiness and a shutdown waker with a single [`mio::Poll`].

use std::io::{self, ErrorKind};
use std::os::fd::{AsFd, BorrowedFd};

use mio::event::Source;
use mio::net::UdpSocket as MioUdpSocket;
use mio::{Interest, Registry, Token};

use super::Endpoint;

/// The local end that replies from the engine arrive on.
pub struct ReplySocket {
    inner: MioUdpSocket,
}

impl ReplySocket {
    /// Binds a non-blocking socket to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is in use or not local.
    pub fn bind(endpoint: Endpoint) -> io::Result<Self> {
        let inner = MioUdpSocket::bind(endpoint.into())?;
        Ok(Self { inner })
    }

    /// Returns the address the socket is actually bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be retrieved.
    pub fn local_addr(&self) -> io::Result<Endpoint> {
        self.inner.local_addr().map(Endpoint::from)
    }

    /// Receives one datagram, returning `Ok(None)` instead of `WouldBlock`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than `WouldBlock`.
    pub fn try_recv_from(&self, buf: &mut [u8]) -> io::Result<Option<(usize, Endpoint)>> {
        match self.inner.recv_from(buf) {
            Ok((n, addr)) => Ok(Some((n, Endpoint::from(addr)))),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Sets `SO_RCVBUF`. The kernel may round or double the value.
    ///
    /// # Errors
    ///
    /// Returns an error if the option cannot be set.
    pub fn set_recv_buffer_size(&self, size: usize) -> io::Result<()> {
        // mio does not expose socket options
        rustix::net::sockopt::set_socket_recv_buffer_size(self.inner.as_fd(), size)?;
        Ok(())
    }

    /// Gets the current `SO_RCVBUF`.
    ///
    /// # Errors
    ///
    /// Returns an error if the option cannot be retrieved.
    pub fn recv_buffer_size(&self) -> io::Result<usize> {
        Ok(rustix::net::sockopt::socket_recv_buffer_size(
            self.inner.as_fd(),
        )?)
    }
}

impl AsFd for ReplySocket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.inner.as_fd()
    }
}

impl Source for ReplySocket {
    fn register(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> io::Result<()> {
        self.inner.register(registry, token, interests)
    }

    fn reregister(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> io::Result<()> {
        self.inner.reregister(registry, token, interests)
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        self.inner.deregister(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_assigns_ephemeral_port() {
        let socket = ReplySocket::bind(Endpoint::localhost(0)).unwrap();
        assert_ne!(socket.local_addr().unwrap().port(), 0);
    }

    #[test]
    fn bind_conflict_is_an_error() {
        let first = ReplySocket::bind(Endpoint::localhost(0)).unwrap();
        let taken = first.local_addr().unwrap();
        assert!(ReplySocket::bind(taken).is_err());
    }

    #[test]
    fn try_recv_reports_empty_then_data() {
        let socket = ReplySocket::bind(Endpoint::localhost(0)).unwrap();
        let mut buf = [0u8; 64];
        assert!(socket.try_recv_from(&mut buf).unwrap().is_none());

        let sender = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let to = socket.local_addr().unwrap().as_socket_addr();
        sender.send_to(b"reply", to).unwrap();

        // Loopback delivery is fast but not synchronous.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        loop {
            if let Some((n, from)) = socket.try_recv_from(&mut buf).unwrap() {
                assert_eq!(&buf[..n], b"reply");
                assert_eq!(from.as_socket_addr(), sender.local_addr().unwrap());
                break;
            }
            assert!(std::time::Instant::now() < deadline, "datagram never arrived");
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }

    #[test]
    fn recv_buffer_size_can_grow() {
        let socket = ReplySocket::bind(Endpoint::localhost(0)).unwrap();
        let before = socket.recv_buffer_size().unwrap();
        assert!(before > 0);
        socket.set_recv_buffer_size(256 * 1024).unwrap();
        assert!(socket.recv_buffer_size().unwrap() > 0);
    }
}
