//! The client that drives a running Unreal Engine 5 simulation.
//!
//! # Protocol
//!
//! Every operation sends exactly one OSC message to the engine. Two kinds
//! exist:
//!
//! | Kind | Returns | Example |
//! |------|---------|---------|
//! | fire-and-forget | once the datagram is handed to the socket | `/move/forward [5.0]` |
//! | request/response | the single reply the engine sends back | `/get/location [0.0]` → `[x, y, z]` |
//!
//! Replies are not correlated with requests on the wire. Requests therefore
//! strictly alternate with replies: each request holds an internal lock from
//! send until its reply has been taken, and a reply that is already waiting
//! before a request goes out is discarded as stale.
//!
//! The typed getters wait for their reply without a deadline. If the engine
//! never answers they never return; use
//! [`Communicator::send_and_wait_timeout`] where that matters.
//!
//! # Lifecycle
//!
//! [`Communicator::connect`] binds both sockets and starts the listener
//! thread before returning. [`Communicator::close`] stops and joins it and
//! may be called any number of times; dropping the communicator calls it
//! too, so the listener never outlives the value that owns it.
//!
//! # Example
//!
//! ```no_run
//! use ue5osc::{Communicator, CommunicatorConfig};
//!
//! # fn main() -> ue5osc::Result<()> {
//! let comm = Communicator::connect(CommunicatorConfig::default())?;
//! println!("connected to {}", comm.get_project_name()?);
//! comm.move_forward(100.0)?;
//! comm.set_yaw(90.0)?;
//! comm.save_image("C:\\captures\\frame_0001.png")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use rosc::OscType;

use crate::config::CommunicatorConfig;
use crate::error::{Error, Result};
use crate::net::{CommandSocket, Endpoint, ReplySocket};
use crate::osc::address;
use crate::osc::{Command, Location, Quality, Reply, Resolution, Rotation};
use crate::runtime::{Dispatcher, Listener};
use crate::sync::{ReplySlot, Timeout};
use crate::trace::{debug, info, trace, warn};

/// Connection to one engine instance.
#[derive(Debug)]
pub struct Communicator {
    config: CommunicatorConfig,
    sender: CommandSocket,
    replies: Arc<ReplySlot<Reply>>,
    /// Held from sending a request until its reply is taken.
    request_turn: Mutex<()>,
    listener: Listener,
}

impl Communicator {
    /// Binds the command and reply sockets and starts the listener thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] if either socket cannot be bound (or the
    /// receive buffer size cannot be applied) and [`Error::Spawn`] if the
    /// listener cannot be started. No thread is left running on error.
    pub fn connect(config: CommunicatorConfig) -> Result<Self> {
        info!(
            engine = %config.engine_addr,
            listen = %config.listen_addr,
            "communicator starting"
        );

        let sender = CommandSocket::bind(config.engine_addr).map_err(|source| Error::Bind {
            endpoint: config.engine_addr.unspecified_peer(),
            source,
        })?;

        let bind_error = |source| Error::Bind {
            endpoint: config.listen_addr,
            source,
        };
        let socket = ReplySocket::bind(config.listen_addr).map_err(bind_error)?;
        if let Some(size) = config.recv_buffer_size {
            socket.set_recv_buffer_size(size).map_err(bind_error)?;
        }

        let replies = Arc::new(ReplySlot::new());
        let dispatcher = Dispatcher::new().fallback(deposit_into(Arc::clone(&replies)));
        let listener = Listener::spawn(socket, dispatcher)?;

        info!(listen = %listener.local_addr(), "communicator ready");
        Ok(Self {
            config,
            sender,
            replies,
            request_turn: Mutex::new(()),
            listener,
        })
    }

    /// Where commands are sent.
    #[must_use]
    pub const fn engine_addr(&self) -> Endpoint {
        self.sender.target()
    }

    /// Where replies are received; resolves an ephemeral listen port.
    #[must_use]
    pub const fn local_addr(&self) -> Endpoint {
        self.listener.local_addr()
    }

    #[must_use]
    pub const fn config(&self) -> &CommunicatorConfig {
        &self.config
    }

    /// Returns `true` once [`close`](Self::close) has run or the listener
    /// thread has stopped on its own.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.listener.is_running()
    }

    /// Stops the listener and waits for its thread to exit.
    ///
    /// No reply is dispatched after this returns. Later calls do nothing;
    /// every other operation returns [`Error::Closed`].
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        info!("communicator closing");
        self.listener.shutdown();
        info!("communicator closed");
    }

    // ---------------------------------------------------------------------
    // Transport primitives
    // ---------------------------------------------------------------------

    /// Sends one prepared command.
    ///
    /// # Errors
    ///
    /// [`Error::Closed`], [`Error::Encode`] or [`Error::Send`].
    pub fn send_command(&self, command: &Command) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        let datagram = command.encode()?;
        trace!(address = command.address(), args = ?command.args(), "sending command");
        self.sender.send(&datagram).map_err(Error::Send)
    }

    /// Sends `address` with `args` without waiting for anything.
    ///
    /// An empty `args` is padded with the dummy float.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub fn send(&self, address: &str, args: Vec<OscType>) -> Result<()> {
        if address::expects_reply(address) {
            debug!(address, "request sent without waiting; its reply will be discarded");
        }
        self.send_command(&Command::new(address, args))
    }

    /// Sends `address` with the dummy argument and blocks until the reply
    /// arrives.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command). Never times out.
    pub fn send_and_wait(&self, address: &str) -> Result<Reply> {
        self.request(address, Timeout::Infinite)
    }

    /// Like [`send_and_wait`](Self::send_and_wait) with an upper bound.
    ///
    /// A reply arriving after the deadline is discarded if it lands before
    /// the next request is sent. Replies carry no request id, so one that
    /// lands later is taken as the next request's answer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no reply arrives within `timeout`, and
    /// [`Error::Closed`] if the listener stops while waiting.
    pub fn send_and_wait_timeout(&self, address: &str, timeout: Duration) -> Result<Reply> {
        self.request(address, Timeout::Duration(timeout))
    }

    fn request(&self, address: &str, timeout: Timeout) -> Result<Reply> {
        let _turn = self
            .request_turn
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(_stale) = self.replies.try_take() {
            debug!(address = %_stale.address, "discarding stale reply");
        }
        self.send_command(&Command::bare(address))?;

        let Some(reply) = self.replies.wait_timeout(timeout) else {
            return Err(if self.replies.is_closed() {
                Error::Closed
            } else {
                Error::Timeout
            });
        };
        trace!(address = %reply.address, args = ?reply.args, "reply consumed");
        Ok(reply)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Name of the project loaded in the engine.
    ///
    /// # Errors
    ///
    /// Transport errors, or [`Error::UnexpectedReply`] if the reply is not a
    /// single string.
    pub fn get_project_name(&self) -> Result<String> {
        self.send_and_wait(address::GET_PROJECT)?.into_string()
    }

    /// Player location.
    ///
    /// # Errors
    ///
    /// Transport errors, or [`Error::UnexpectedReply`] if the reply is not
    /// three numbers.
    pub fn get_location(&self) -> Result<Location> {
        Location::try_from(self.send_and_wait(address::GET_LOCATION)?)
    }

    /// Player rotation.
    ///
    /// # Errors
    ///
    /// Transport errors, or [`Error::UnexpectedReply`] if the reply is not
    /// three numbers.
    pub fn get_rotation(&self) -> Result<Rotation> {
        Rotation::try_from(self.send_and_wait(address::GET_ROTATION)?)
    }

    // ---------------------------------------------------------------------
    // Motion
    // ---------------------------------------------------------------------

    /// Teleports the player.
    ///
    /// # Errors
    ///
    /// Transport errors.
    pub fn set_location(&self, x: f32, y: f32, z: f32) -> Result<()> {
        self.send_command(&Command::floats(address::SET_LOCATION, &[x, y, z]))
    }

    /// Sets the full player rotation.
    ///
    /// # Errors
    ///
    /// Transport errors.
    pub fn set_rotation(&self, rotation: Rotation) -> Result<()> {
        self.send_command(&Command::floats(
            address::SET_ROTATION,
            &rotation.to_command_order(),
        ))
    }

    /// Sets the yaw, keeping the current pitch and roll.
    ///
    /// Reads the rotation, then writes it back with the new yaw. A rotation
    /// change made by anything else between the two steps is overwritten.
    ///
    /// # Errors
    ///
    /// Errors from [`get_rotation`](Self::get_rotation) or
    /// [`set_rotation`](Self::set_rotation).
    pub fn set_yaw(&self, yaw: f32) -> Result<()> {
        let current = self.get_rotation()?;
        self.set_rotation(current.with_yaw(yaw))
    }

    /// Moves along the facing direction.
    ///
    /// # Errors
    ///
    /// Transport errors.
    pub fn move_forward(&self, amount: f32) -> Result<()> {
        self.send_command(&Command::float(address::MOVE_FORWARD, amount))
    }

    /// Moves against the facing direction.
    ///
    /// # Errors
    ///
    /// Transport errors.
    pub fn move_backward(&self, amount: f32) -> Result<()> {
        self.send_command(&Command::float(address::MOVE_FORWARD, -amount))
    }

    /// # Errors
    ///
    /// Transport errors.
    pub fn rotate_left(&self, degrees: f32) -> Result<()> {
        self.send_command(&Command::float(address::ROTATE_LEFT, degrees))
    }

    /// # Errors
    ///
    /// Transport errors.
    pub fn rotate_right(&self, degrees: f32) -> Result<()> {
        self.send_command(&Command::float(address::ROTATE_RIGHT, degrees))
    }

    /// Returns the player to its start location, then waits
    /// [`reset_settle`](CommunicatorConfig::reset_settle).
    ///
    /// # Errors
    ///
    /// Transport errors.
    pub fn reset(&self) -> Result<()> {
        self.send_command(&Command::bare(address::RESET))?;
        settle(self.config.reset_settle);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Rendering and engine settings
    // ---------------------------------------------------------------------

    /// # Errors
    ///
    /// Transport errors.
    pub fn set_resolution(&self, resolution: Resolution) -> Result<()> {
        self.send_command(&Command::string(
            address::SET_RESOLUTION,
            resolution.to_string(),
        ))
    }

    /// Sets the scalability level, 0 (lowest) to 4.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQuality`] for levels above 4 (nothing is sent), or
    /// transport errors.
    pub fn set_quality(&self, level: u8) -> Result<()> {
        let quality = Quality::new(level)?;
        self.send_command(&Command::int(
            address::QUALITY,
            i32::from(quality.level()),
        ))
    }

    /// Toggles between the camera that shows the robot and the one that
    /// does not.
    ///
    /// # Errors
    ///
    /// Transport errors.
    pub fn switch_camera(&self) -> Result<()> {
        self.send_command(&Command::bare(address::SWITCH_VIEW))
    }

    /// Runs `command` in the engine console.
    ///
    /// # Errors
    ///
    /// Transport errors.
    pub fn console(&self, command: &str) -> Result<()> {
        self.send_command(&Command::string(address::CONSOLE, command))
    }

    // ---------------------------------------------------------------------
    // Screenshots
    // ---------------------------------------------------------------------

    /// Asks the engine to write a screenshot to `path`, then waits
    /// [`save_image_settle`](CommunicatorConfig::save_image_settle).
    ///
    /// Backslashes are sent as forward slashes.
    ///
    /// # Errors
    ///
    /// [`Error::NonUtf8Path`] (nothing is sent), or transport errors.
    pub fn save_image(&self, path: impl AsRef<Path>) -> Result<()> {
        let engine_path = engine_path(path.as_ref())?;
        self.send_command(&Command::string(address::SAVE_IMAGE, engine_path))?;
        settle(self.config.save_image_settle);
        Ok(())
    }

    /// Reads the bytes of a screenshot saved earlier. The image is not
    /// decoded.
    ///
    /// # Errors
    ///
    /// [`Error::Image`] if the file cannot be read.
    pub fn read_image(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        std::fs::read(path).map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })
    }

    /// [`save_image`](Self::save_image) followed by
    /// [`read_image`](Self::read_image).
    ///
    /// Only meaningful when the engine writes to a filesystem this process
    /// can read.
    ///
    /// # Errors
    ///
    /// Errors from either step.
    pub fn capture_image(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        self.save_image(path)?;
        self.read_image(path)
    }
}

impl Drop for Communicator {
    fn drop(&mut self) {
        self.close();
    }
}

/// Runs `f` with a fresh communicator and closes it afterwards, whether `f`
/// succeeds, fails or panics.
///
/// # Errors
///
/// Errors from [`Communicator::connect`] or from `f`.
pub fn with_communicator<T>(
    config: CommunicatorConfig,
    f: impl FnOnce(&Communicator) -> Result<T>,
) -> Result<T> {
    let mut comm = Communicator::connect(config)?;
    let result = f(&comm);
    comm.close();
    result
}

/// Converts `path` to the forward-slash form the engine accepts.
///
/// # Errors
///
/// [`Error::NonUtf8Path`] if `path` is not valid UTF-8.
pub fn engine_path(path: &Path) -> Result<String> {
    path.to_str()
        .map(|s| s.replace('\\', "/"))
        .ok_or_else(|| Error::NonUtf8Path(path.to_path_buf()))
}

/// Closes the reply slot when the listener thread drops its handler, so a
/// waiting request fails with [`Error::Closed`] instead of hanging.
struct SlotCloser(Arc<ReplySlot<Reply>>);

impl Drop for SlotCloser {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// The listener-side half of the reply hand-off.
fn deposit_into(replies: Arc<ReplySlot<Reply>>) -> impl FnMut(rosc::OscMessage) + Send + 'static {
    let replies = SlotCloser(replies);
    move |msg| {
        let reply = Reply::from(msg);
        trace!(address = %reply.address, "reply arrived");
        if let Some(_overwritten) = replies.0.deposit(reply) {
            warn!(
                address = %_overwritten.address,
                "previous reply was never consumed, overwriting"
            );
        }
    }
}

fn settle(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
