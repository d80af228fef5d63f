//! OSC client for an Unreal Engine 5 simulation.
//!
//! [`Communicator`] sends motion, camera and settings commands to the engine
//! and reads back project name, location and rotation. Replies arrive on a
//! background listener thread and are handed to the waiting caller through a
//! single-value [`sync::ReplySlot`].

pub mod communicator;
pub mod config;
pub mod error;
pub mod net;
pub mod osc;
pub mod runtime;
pub mod sync;
mod trace;

pub use communicator::{Communicator, engine_path, with_communicator};
pub use config::CommunicatorConfig;
pub use error::{Error, Result};
pub use net::Endpoint;
pub use osc::{Location, Quality, Reply, Resolution, Rotation};
pub use trace::init_tracing;
