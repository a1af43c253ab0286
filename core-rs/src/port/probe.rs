/**
 * probe.rs
 * Point-in-time OS availability check for a TCP port
 *
 * A successful probe binds 127.0.0.1:port and immediately drops the
 * listener. Nothing is held afterwards, so another process may take the
 * port between the probe and the caller's own bind. The registry narrows
 * that window for callers in this process by recording the allocation
 * under its lock; unrelated processes are not covered.
 */

use std::net::{Ipv4Addr, TcpListener};

use tracing::debug;

/// Availability check used by the registry before it records an allocation
pub trait PortProbe: Send + Sync {
    /// true if the port can be bound right now
    fn is_bindable(&self, port: u16) -> bool;
}

/// Probe backed by a real bind on the loopback interface
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl PortProbe for SystemProbe {
    fn is_bindable(&self, port: u16) -> bool {
        is_port_bindable(port)
    }
}

/// Test if port can be bound on localhost
///
/// std sets `SO_REUSEADDR` on Unix listeners, so ports in TIME_WAIT from a
/// previous tenant still probe as free. Any bind error (in use, permission
/// denied, ...) is reported as not available.
///
/// # Returns
/// true if available, false if in use or not bindable
pub fn is_port_bindable(port: u16) -> bool {
    // Binding port 0 succeeds with an ephemeral port, which says nothing
    // about port 0 itself.
    if port == 0 {
        return false;
    }

    match TcpListener::bind((Ipv4Addr::LOCALHOST, port)) {
        Ok(listener) => {
            drop(listener);
            true
        }
        Err(e) => {
            debug!(port, error = %e, "port probe failed");
            false
        }
    }
}
