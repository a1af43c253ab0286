//! Process-wide registry
//!
//! One lazily-built `PortRegistry` with the default range, shared by every
//! caller in the process. It is created on first access and lives until
//! process exit. Code that needs its own bounds (tests, isolated tools)
//! should construct a `PortRegistry` directly instead.

use once_cell::sync::OnceCell;

use super::registry::PortRegistry;

static PORT_REGISTRY_INSTANCE: OnceCell<PortRegistry> = OnceCell::new();

/// Get the process-wide registry
///
/// # Returns
/// Reference to singleton PortRegistry (range 8765-8864)
pub fn get_port_manager() -> &'static PortRegistry {
    PORT_REGISTRY_INSTANCE.get_or_init(PortRegistry::default)
}

/// Find an available port in `[start, end]` without allocating it
///
/// Checks the singleton's bookkeeping first, then the OS.
pub fn find_available_port(start: u16, end: u16) -> Option<u16> {
    get_port_manager().find_available_port(Some(start), Some(end))
}

/// Allocate a port from the singleton
pub fn allocate_service_port(owner_id: &str, preferred_port: Option<u16>) -> Option<u16> {
    get_port_manager().allocate_port(owner_id, preferred_port)
}

/// Release a port held in the singleton
pub fn release_service_port(port: u16, owner_id: &str) -> bool {
    get_port_manager().release_port(port, owner_id)
}

/// Active port for an owner in the singleton
pub fn get_service_port(owner_id: &str) -> Option<u16> {
    get_port_manager().port_of(owner_id)
}
