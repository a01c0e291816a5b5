#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Connectivity probe used to pick between the online and offline feedback
//! paths.

use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::{
    config::Settings,
    constants::{PROBE_ADDR, PROBE_TIMEOUT},
};

/// Anything that can tell whether a network path is currently available.
pub trait Connectivity {
    /// Returns true when the network appears reachable.
    fn is_online(&self) -> bool;
}

impl<F> Connectivity for F
where
    F: Fn() -> bool,
{
    fn is_online(&self) -> bool {
        self()
    }
}

/// Dials a fixed address over TCP with a short timeout.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    /// `host:port` to connect to.
    addr:    String,
    /// Upper bound for each connection attempt.
    timeout: Duration,
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(PROBE_ADDR, PROBE_TIMEOUT)
    }
}

impl TcpProbe {
    /// Creates a probe for `addr`.
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    /// Creates a probe for the address and timeout in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.probe_addr(), settings.probe_timeout())
    }
}

impl Connectivity for TcpProbe {
    fn is_online(&self) -> bool {
        let addrs = match self.addr.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                tracing::debug!("Could not resolve probe address {}: {e}", self.addr);
                return false;
            }
        };

        addrs
            .into_iter()
            .any(|addr| TcpStream::connect_timeout(&addr, self.timeout).is_ok())
    }
}

/// Checks whether the well-known probe address is reachable.
pub fn probe() -> bool {
    TcpProbe::default().is_online()
}
