//! Communicator configuration.

use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::net::Endpoint;

/// Port the engine's OSC plugin listens on by default.
pub const DEFAULT_ENGINE_PORT: u16 = 7447;

/// Port replies are sent back to by default.
pub const DEFAULT_LISTEN_PORT: u16 = 7001;

/// Time the engine needs to write a screenshot to disk.
pub const DEFAULT_SAVE_IMAGE_SETTLE: Duration = Duration::from_millis(1500);

/// Time the engine needs to move the agent back to its start location.
pub const DEFAULT_RESET_SETTLE: Duration = Duration::from_secs(1);

/// Configuration for [`Communicator::connect`](crate::Communicator::connect).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicatorConfig {
    /// Where commands are sent.
    pub engine_addr: Endpoint,
    /// Where the engine sends replies. Port 0 picks an ephemeral port.
    pub listen_addr: Endpoint,
    /// `SO_RCVBUF` for the reply socket; `None` keeps the OS default.
    pub recv_buffer_size: Option<usize>,
    /// Sleep after `save_image` so the file exists when it returns.
    pub save_image_settle: Duration,
    /// Sleep after `reset` so the agent is back in place when it returns.
    pub reset_settle: Duration,
}

impl CommunicatorConfig {
    /// Engine and listener on the same host: `ip:engine_port` for commands,
    /// `ip:listen_port` for replies.
    #[must_use]
    pub fn new(ip: IpAddr, engine_port: u16, listen_port: u16) -> Self {
        Self {
            engine_addr: Endpoint::new(ip, engine_port),
            listen_addr: Endpoint::new(ip, listen_port),
            ..Self::default()
        }
    }

    /// Disables both settle delays.
    #[must_use]
    pub const fn without_settle(mut self) -> Self {
        self.save_image_settle = Duration::ZERO;
        self.reset_settle = Duration::ZERO;
        self
    }
}

impl Default for CommunicatorConfig {
    fn default() -> Self {
        Self {
            engine_addr: Endpoint::localhost(DEFAULT_ENGINE_PORT),
            listen_addr: Endpoint::localhost(DEFAULT_LISTEN_PORT),
            recv_buffer_size: None,
            save_image_settle: DEFAULT_SAVE_IMAGE_SETTLE,
            reset_settle: DEFAULT_RESET_SETTLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn new_shares_ip_between_ports() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 20));
        let config = CommunicatorConfig::new(ip, 7447, 7001);
        assert_eq!(config.engine_addr, Endpoint::new(ip, 7447));
        assert_eq!(config.listen_addr, Endpoint::new(ip, 7001));
        assert_eq!(config.save_image_settle, DEFAULT_SAVE_IMAGE_SETTLE);
    }

    #[test]
    fn without_settle_zeroes_delays() {
        let config = CommunicatorConfig::default().without_settle();
        assert!(config.save_image_settle.is_zero());
        assert!(config.reset_settle.is_zero());
    }
}
