/**
 * port module
 * Exclusive TCP port allocation for co-located agents
 */

pub mod allocation;
pub mod global;
pub mod probe;
pub mod range;
pub mod registry;
pub mod status;

pub use allocation::PortAllocation;
pub use global::{
    allocate_service_port, find_available_port, get_port_manager, get_service_port,
    release_service_port,
};
pub use probe::{is_port_bindable, PortProbe, SystemProbe};
pub use range::{PortRange, DEFAULT_END_PORT, DEFAULT_START_PORT};
pub use registry::{PortRegistry, DEFAULT_RETENTION_HOURS};
pub use status::{ActiveAllocation, AllocationStatus};
