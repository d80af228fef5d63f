//! Runtime pieces that live on the listener thread.
//!
//! - `dispatch`: address → handler routing for decoded messages.
//! - `listener`: the thread itself, its poll loop and its shutdown handle.

pub mod dispatch;
pub mod listener;

pub use dispatch::{Dispatcher, Handler};
pub use listener::Listener;
