//! Routing of decoded inbound messages to handlers by address.

use std::collections::HashMap;
use std::fmt;

use rosc::OscMessage;

use crate::trace::trace;

/// Callback invoked on the listener thread for each routed message.
///
/// Handlers run inside the receive loop; they must not block.
pub type Handler = Box<dyn FnMut(OscMessage) + Send>;

/// Address → handler table with an optional fallback.
#[derive(Default)]
pub struct Dispatcher {
    routes: HashMap<String, Handler>,
    fallback: Option<Handler>,
}

impl Dispatcher {
    /// Creates a dispatcher with no routes and no fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes messages with exactly `address` to `handler`, replacing any
    /// previous route for that address.
    #[must_use]
    pub fn route<F>(mut self, address: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(OscMessage) + Send + 'static,
    {
        self.routes.insert(address.into(), Box::new(handler));
        self
    }

    /// Handles every message no route matches.
    #[must_use]
    pub fn fallback<F>(mut self, handler: F) -> Self
    where
        F: FnMut(OscMessage) + Send + 'static,
    {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Hands `msg` to its handler.
    ///
    /// Returns `false` if neither a route nor a fallback accepted it.
    pub fn dispatch(&mut self, msg: OscMessage) -> bool {
        if let Some(handler) = self.routes.get_mut(&msg.addr) {
            handler(msg);
            return true;
        }
        match self.fallback.as_mut() {
            Some(handler) => {
                handler(msg);
                true
            }
            None => {
                trace!(address = %msg.addr, "no handler for message");
                false
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
