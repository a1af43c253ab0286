/**
 * registry.rs
 * Thread-safe port allocation registry
 *
 * State:
 * - allocated_ports: ports currently held (O(1) membership)
 * - port_allocations: every record created, active and released, pruned
 *   only by expiry cleanup
 *
 * Allocation strategy:
 * - Preferred port first, if inside the range and free
 * - Otherwise ascending scan of the configured range
 * - A candidate must be absent from allocated_ports AND pass the OS probe
 *
 * All public operations take the single state lock for their whole
 * duration, including the probe syscall. "Check membership, then insert"
 * is therefore atomic for every caller sharing this registry.
 */

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::allocation::PortAllocation;
use super::probe::{PortProbe, SystemProbe};
use super::range::PortRange;
use super::status::AllocationStatus;
use crate::errors::Result;

/// Default retention for released records
pub const DEFAULT_RETENTION_HOURS: i64 = 24;

#[derive(Debug, Default)]
struct RegistryState {
    allocated_ports: HashSet<u16>,
    port_allocations: Vec<PortAllocation>,
}

/// Port Registry - owns the bookkeeping for one port range
pub struct PortRegistry {
    range: PortRange,
    probe: Box<dyn PortProbe>,
    state: Mutex<RegistryState>,
}

impl PortRegistry {
    /// Create a registry for `[start_port, end_port]` backed by real OS probes
    ///
    /// # Errors
    /// Returns `InvalidRange` if `start_port` is 0 or greater than `end_port`
    ///
    /// # Example
    /// ```
    /// let registry = ckp_ports::PortRegistry::new(9000, 9010)?;
    /// # Ok::<(), ckp_ports::PortError>(())
    /// ```
    pub fn new(start_port: u16, end_port: u16) -> Result<Self> {
        let range = PortRange::new(start_port, end_port)?;
        Ok(Self::with_probe(range, SystemProbe))
    }

    /// Create a registry with a custom availability probe
    pub fn with_probe<P: PortProbe + 'static>(range: PortRange, probe: P) -> Self {
        info!(range = %range, "port registry initialized");
        PortRegistry {
            range,
            probe: Box::new(probe),
            state: Mutex::new(RegistryState::default()),
        }
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    pub fn start_port(&self) -> u16 {
        self.range.start()
    }

    pub fn end_port(&self) -> u16 {
        self.range.end()
    }

    // A panic while holding the lock cannot leave the two collections out
    // of step (every mutation is a single insert/remove pair), so a poisoned
    // lock is still usable.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_candidate(&self, state: &RegistryState, port: u16) -> bool {
        !state.allocated_ports.contains(&port) && self.probe.is_bindable(port)
    }

    fn scan(&self, state: &RegistryState, start: u16, end: u16) -> Option<u16> {
        (start..=end).find(|&port| self.is_candidate(state, port))
    }

    /// Find an available port without allocating it
    ///
    /// # Arguments
    /// * `start` - First port to try (defaults to the configured start)
    /// * `end` - Last port to try, inclusive (defaults to the configured end)
    ///
    /// # Returns
    /// Lowest free port in the range, or None if every port is taken
    pub fn find_available_port(&self, start: Option<u16>, end: Option<u16>) -> Option<u16> {
        let start = start.unwrap_or(self.range.start());
        let end = end.unwrap_or(self.range.end());

        let state = self.lock();
        let found = self.scan(&state, start, end);
        if found.is_none() {
            warn!(start, end, "no available ports in range");
        }
        found
    }

    /// Allocate a port to an owner
    ///
    /// # Arguments
    /// * `owner_id` - Owner identifier (e.g. "visual_analysis_agent")
    /// * `preferred_port` - Port to try first; ignored if outside the range
    ///
    /// # Returns
    /// Allocated port, or None if the range is exhausted
    pub fn allocate_port(&self, owner_id: &str, preferred_port: Option<u16>) -> Option<u16> {
        let mut state = self.lock();

        let preferred = preferred_port.filter(|&p| {
            let in_range = self.range.contains(p);
            if !in_range {
                debug!(port = p, range = %self.range, "preferred port outside range, ignoring");
            }
            in_range && self.is_candidate(&state, p)
        });

        let port = match preferred.or_else(|| self.scan(&state, self.range.start(), self.range.end())) {
            Some(port) => port,
            None => {
                warn!(owner = owner_id, range = %self.range, "failed to allocate port: range exhausted");
                return None;
            }
        };

        state.allocated_ports.insert(port);
        state.port_allocations.push(PortAllocation::new(port, owner_id));

        info!(port, owner = owner_id, "port allocated");
        Some(port)
    }

    /// Release a port held by an owner
    ///
    /// # Returns
    /// true if released; false if the port is not allocated or is held by
    /// a different owner
    pub fn release_port(&self, port: u16, owner_id: &str) -> bool {
        let mut state = self.lock();
        let RegistryState {
            allocated_ports,
            port_allocations,
        } = &mut *state;

        if !allocated_ports.contains(&port) {
            warn!(port, owner = owner_id, "attempted to release unallocated port");
            return false;
        }

        let record = port_allocations
            .iter_mut()
            .find(|a| a.in_use && a.port == port && a.is_owned_by(owner_id));

        match record {
            Some(allocation) => {
                allocation.in_use = false;
                allocated_ports.remove(&port);
                info!(port, owner = owner_id, "port released");
                true
            }
            None => {
                warn!(port, owner = owner_id, "port not allocated to this owner");
                false
            }
        }
    }

    /// Allocate up to `pool_size` ports
    ///
    /// Each slot is owned by `"{owner_id}_pool_{i}"`. Stops at the first
    /// failure and returns what was obtained; already-allocated ports are
    /// not rolled back, releasing them is up to the caller.
    pub fn get_port_pool(&self, owner_id: &str, pool_size: usize) -> Vec<u16> {
        let mut ports = Vec::with_capacity(pool_size.min(self.range.len()));

        for i in 0..pool_size {
            match self.allocate_port(&pool_slot_owner(owner_id, i), None) {
                Some(port) => ports.push(port),
                None => {
                    warn!(
                        owner = owner_id,
                        obtained = ports.len(),
                        requested = pool_size,
                        "port pool only partially allocated"
                    );
                    break;
                }
            }
        }

        info!(owner = owner_id, size = ports.len(), "port pool allocated");
        ports
    }

    /// Remove released records older than `max_age`
    ///
    /// Active records are never removed, however old. A `max_age` reaching
    /// back past the earliest representable time removes nothing.
    ///
    /// # Returns
    /// Number of records removed
    pub fn cleanup_expired_allocations(&self, max_age: Duration) -> usize {
        match Utc::now().checked_sub_signed(max_age) {
            Some(cutoff) => self.cleanup_expired_allocations_before(cutoff),
            None => {
                debug!(?max_age, "retention window exceeds representable time, nothing expired");
                0
            }
        }
    }

    /// Remove released records created before `cutoff`
    pub fn cleanup_expired_allocations_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut state = self.lock();
        let RegistryState {
            allocated_ports,
            port_allocations,
        } = &mut *state;

        let before = port_allocations.len();
        let mut expired_ports = Vec::new();
        port_allocations.retain(|a| {
            if a.is_expired(cutoff) {
                expired_ports.push(a.port);
                false
            } else {
                true
            }
        });
        let removed = before - port_allocations.len();

        // Released ports are already out of the set; only drop a stray entry
        // when no active record still claims the port.
        for port in expired_ports {
            let still_active = port_allocations.iter().any(|a| a.in_use && a.port == port);
            if !still_active && allocated_ports.remove(&port) {
                debug!(port, "dropped stale allocated port during cleanup");
            }
        }

        if removed > 0 {
            info!(removed, "cleaned up expired port allocations");
        }
        removed
    }

    /// Snapshot of current utilization
    pub fn get_allocation_status(&self) -> AllocationStatus {
        let state = self.lock();
        AllocationStatus::compute(
            self.range,
            state.allocated_ports.len(),
            &state.port_allocations,
        )
    }

    /// Check if port is currently allocated
    pub fn is_port_allocated(&self, port: u16) -> bool {
        self.lock().allocated_ports.contains(&port)
    }

    /// Port currently held by an owner
    ///
    /// # Returns
    /// Most recent active port for `owner_id`, or None
    pub fn port_of(&self, owner_id: &str) -> Option<u16> {
        self.lock()
            .port_allocations
            .iter()
            .rev()
            .find(|a| a.in_use && a.is_owned_by(owner_id))
            .map(|a| a.port)
    }

    /// All retained records, oldest first
    pub fn allocations(&self) -> Vec<PortAllocation> {
        self.lock().port_allocations.clone()
    }

    /// Records still in use, oldest first
    pub fn active_allocations(&self) -> Vec<PortAllocation> {
        self.lock()
            .port_allocations
            .iter()
            .filter(|a| a.in_use)
            .cloned()
            .collect()
    }
}

impl Default for PortRegistry {
    fn default() -> Self {
        Self::with_probe(PortRange::default(), SystemProbe)
    }
}

impl std::fmt::Debug for PortRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("PortRegistry")
            .field("range", &self.range)
            .field("allocated_ports", &state.allocated_ports.len())
            .field("port_allocations", &state.port_allocations.len())
            .finish()
    }
}

fn pool_slot_owner(owner_id: &str, index: usize) -> String {
    format!("{}_pool_{}", owner_id, index)
}
