//! Synchronization between the listener thread and callers awaiting replies.

pub mod slot;

pub use slot::{ReplySlot, Timeout};
