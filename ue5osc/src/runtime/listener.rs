//! Background thread that receives engine replies.
//!
//! The thread blocks in [`mio::Poll::poll`] on two sources: the reply socket
//! and a [`mio::Waker`]. Datagrams are drained until `WouldBlock`, decoded
//! with rosc, and every message (bundles are flattened) goes through the
//! [`Dispatcher`]. [`Listener::shutdown`] raises a flag, fires the waker and
//! joins the thread, so no handler runs after it returns.
//!
//! The thread can also end on its own, when polling fails or a handler
//! panics. [`Listener::is_running`] reports `false` from then on, and the
//! dispatcher (with every handler it owns) has been dropped.

use std::io::ErrorKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use mio::{Events, Interest, Poll, Token, Waker};

use crate::error::Error;
use crate::net::{Endpoint, ReplySocket};
use crate::osc::decode_datagram;
use crate::trace::{debug, error, info, trace, warn};

use super::dispatch::Dispatcher;

/// Largest datagram the engine can send us.
const MAX_DATAGRAM_SIZE: usize = 65_535;

/// Readiness events handled per poll.
const EVENT_CAPACITY: usize = 8;

const SOCKET: Token = Token(0);
const WAKER: Token = Token(1);

/// Name given to the listener thread.
pub const THREAD_NAME: &str = "ue5osc-listener";

/// Handle to a running listener thread.
///
/// Dropping the handle shuts the thread down and joins it.
#[derive(Debug)]
pub struct Listener {
    local_addr: Endpoint,
    shutdown_flag: Arc<AtomicBool>,
    /// Set by the thread itself as it exits, however it exits.
    exited: Arc<AtomicBool>,
    waker: Arc<Waker>,
    handle: Option<JoinHandle<()>>,
}

impl Listener {
    /// Starts dispatching datagrams that arrive on `socket`.
    ///
    /// Either the thread is running when this returns `Ok`, or nothing was
    /// started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the poller cannot be set up or the thread
    /// cannot be spawned.
    pub fn spawn(mut socket: ReplySocket, dispatcher: Dispatcher) -> Result<Self, Error> {
        let local_addr = socket.local_addr().map_err(Error::Spawn)?;

        let poll = Poll::new().map_err(Error::Spawn)?;
        poll.registry()
            .register(&mut socket, SOCKET, Interest::READABLE)
            .map_err(Error::Spawn)?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKER).map_err(Error::Spawn)?);
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let exited = Arc::new(AtomicBool::new(false));
        let exit_guard = ExitGuard(Arc::clone(&exited));

        let mut worker = ListenerThread {
            poll,
            socket,
            dispatcher,
            shutdown_flag: Arc::clone(&shutdown_flag),
            recv_buf: vec![0u8; MAX_DATAGRAM_SIZE],
        };

        debug!(%local_addr, "spawning listener thread");
        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || {
                let _exit_guard = exit_guard;
                info!("listener thread started");
                worker.run();
                info!("listener thread exiting");
            })
            .map_err(|e| {
                error!(error = %e, "failed to spawn listener thread");
                Error::Spawn(e)
            })?;

        Ok(Self {
            local_addr,
            shutdown_flag,
            exited,
            waker,
            handle: Some(handle),
        })
    }

    /// The address replies must be sent to.
    #[must_use]
    pub const fn local_addr(&self) -> Endpoint {
        self.local_addr
    }

    /// Returns `true` until the thread has exited, either through
    /// [`shutdown`](Self::shutdown) or on its own.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.exited.load(Ordering::Acquire)
    }

    /// Stops the receive loop and waits for the thread to exit.
    ///
    /// Calling it again is a no-op.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        debug!("listener shutdown initiated");
        self.shutdown_flag.store(true, Ordering::Release);
        if let Err(_e) = self.waker.wake() {
            // The flag alone still stops the loop at the next datagram.
            warn!(error = %_e, "failed to wake listener thread");
        }
        if handle.join().is_err() {
            error!("listener thread panicked");
        }
        debug!("listener thread joined");
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Marks the thread as exited when dropped, including during unwinding.
struct ExitGuard(Arc<AtomicBool>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// State owned by the listener thread.
struct ListenerThread {
    poll: Poll,
    socket: ReplySocket,
    dispatcher: Dispatcher,
    shutdown_flag: Arc<AtomicBool>,
    recv_buf: Vec<u8>,
}

impl ListenerThread {
    /// Runs until the shutdown flag is raised or polling fails.
    fn run(&mut self) {
        let mut events = Events::with_capacity(EVENT_CAPACITY);
        while !self.shutdown_flag.load(Ordering::Acquire) {
            if let Err(e) = self.poll.poll(&mut events, None) {
                if e.kind() == ErrorKind::Interrupted {
                    continue;
                }
                error!(error = %e, "poll failed, listener stopping");
                return;
            }
            for event in &events {
                if event.token() == SOCKET {
                    self.drain_socket();
                }
            }
        }
    }

    /// Reads datagrams until the socket would block.
    fn drain_socket(&mut self) {
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                return;
            }
            match self.socket.try_recv_from(&mut self.recv_buf) {
                Ok(Some((len, from))) => self.handle_datagram(len, from),
                Ok(None) => return,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(_e) => {
                    // ICMP errors can surface here; the socket stays usable.
                    warn!(error = %_e, "receive failed");
                    return;
                }
            }
        }
    }

    fn handle_datagram(&mut self, len: usize, _from: Endpoint) {
        let messages = match decode_datagram(&self.recv_buf[..len]) {
            Ok(messages) => messages,
            Err(_e) => {
                warn!(from = %_from, len, error = ?_e, "dropping undecodable datagram");
                return;
            }
        };
        for msg in messages {
            trace!(from = %_from, address = %msg.addr, args = ?msg.args, "received message");
            self.dispatcher.dispatch(msg);
        }
    }
}
