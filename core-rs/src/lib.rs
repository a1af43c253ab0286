//! # CKP Ports - ConceptKernel Port Registry
//!
//! Coordinates exclusive use of a bounded range of TCP ports among agents and
//! services started independently on one host. A caller asks the registry
//! for a port under its own identifier, binds its listener out-of-band, and
//! releases the port by number and identifier on shutdown.
//!
//! ## Key Features
//!
//! - Live availability probing with a real loopback bind
//! - One lock around all bookkeeping: a port is never handed out twice
//! - Pooled multi-port reservation with partial fulfillment
//! - Time-based expiry of released records, on demand or in the background
//! - Process-wide singleton for callers that don't wire a registry through
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │   callers (agents, launchers)        │
//! └──────────────────────────────────────┘
//!           │                  │
//!     ┌─────┴────────┐   ┌─────┴───────┐
//!     │ PortRegistry │◄──│ Sweeper     │
//!     │ (Mutex)      │   │ (thread)    │
//!     └─────┬────────┘   └─────────────┘
//!           │
//!     ┌─────┴────────┐
//!     │ PortProbe    │  bind 127.0.0.1:port
//!     └──────────────┘
//! ```
//!
//! Collisions with unrelated processes are caught only by the probe at
//! allocation time. Nothing is held open afterwards, so a foreign process
//! can still grab the port before the caller binds it.

pub mod config;
pub mod errors;
pub mod logging;
pub mod port;
pub mod sweeper;

pub use config::RegistryConfig;
pub use errors::PortError;
pub use port::{
    allocate_service_port, find_available_port, get_port_manager, get_service_port,
    is_port_bindable, release_service_port, ActiveAllocation, AllocationStatus, PortAllocation,
    PortProbe, PortRange, PortRegistry, SystemProbe,
};
pub use sweeper::CleanupSweeper;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
