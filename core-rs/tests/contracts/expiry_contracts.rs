// Expiry Contract Tests
//
// Cleanup prunes history. It must never touch an allocation that is still in use.

use chrono::{Duration, Utc};
use ckp_ports::{PortProbe, PortRange, PortRegistry};

struct AllFree;

impl PortProbe for AllFree {
    fn is_bindable(&self, _port: u16) -> bool {
        true
    }
}

fn registry() -> PortRegistry {
    PortRegistry::with_probe(PortRange::new(21000, 21009).unwrap(), AllFree)
}

/// WHY: Active allocations are never force-expired
/// REASON: Long-lived services hold their port for the whole session
/// BREAKS: A second agent is given a port that is still being listened on
#[test]
fn active_allocation_survives_any_age() {
    let registry = registry();
    let port = registry.allocate_port("long_lived_service", None).unwrap();

    // Cutoff ten years from now: every record is "older" than it
    let cutoff = Utc::now() + Duration::days(3650);
    assert_eq!(registry.cleanup_expired_allocations_before(cutoff), 0);
    assert_eq!(registry.cleanup_expired_allocations(Duration::zero()), 0);

    assert!(registry.is_port_allocated(port));
    assert_eq!(registry.port_of("long_lived_service"), Some(port));
}

/// WHY: Released records older than the window are always removed
/// REASON: Bounds memory over long-running sessions
#[test]
fn old_inactive_allocation_is_removed() {
    let registry = registry();
    let port = registry.allocate_port("short_job", None).unwrap();
    assert!(registry.release_port(port, "short_job"));

    // Equivalent to running cleanup(24h) 25 hours after allocation
    let cutoff = Utc::now() + Duration::hours(1);
    assert_eq!(registry.cleanup_expired_allocations_before(cutoff), 1);
    assert!(registry.allocations().is_empty());
}

/// WHY: Released records younger than the window are preserved
/// REASON: Recent history stays visible to diagnostics
#[test]
fn young_inactive_allocation_is_preserved() {
    let registry = registry();
    let port = registry.allocate_port("short_job", None).unwrap();
    assert!(registry.release_port(port, "short_job"));

    assert_eq!(registry.cleanup_expired_allocations(Duration::hours(24)), 0);
    let records = registry.allocations();
    assert_eq!(records.len(), 1);
    assert!(!records[0].in_use);
}

/// WHY: Cleanup of a past tenant's record must not free the current tenant
/// REASON: Historical and active records for one port coexist
/// BREAKS: Double allocation after a routine cleanup pass
#[test]
fn cleanup_preserves_current_tenant_of_port() {
    let registry = PortRegistry::with_probe(PortRange::new(21100, 21100).unwrap(), AllFree);

    registry.allocate_port("first", None).unwrap();
    assert!(registry.release_port(21100, "first"));
    registry.allocate_port("second", None).unwrap();

    let cutoff = Utc::now() + Duration::days(1);
    assert_eq!(registry.cleanup_expired_allocations_before(cutoff), 1);

    assert!(registry.is_port_allocated(21100));
    assert_eq!(registry.allocate_port("third", None), None);
    assert!(registry.release_port(21100, "second"));
}

/// WHY: Mixed history is pruned selectively
#[test]
fn cleanup_counts_only_expired_records() {
    let registry = registry();
    let pool = registry.get_port_pool("batch", 4);
    assert!(registry.release_port(pool[0], "batch_pool_0"));
    assert!(registry.release_port(pool[2], "batch_pool_2"));

    let cutoff = Utc::now() + Duration::seconds(1);
    assert_eq!(registry.cleanup_expired_allocations_before(cutoff), 2);

    let remaining: Vec<u16> = registry.allocations().iter().map(|a| a.port).collect();
    assert_eq!(remaining, vec![pool[1], pool[3]]);
    assert_eq!(registry.get_allocation_status().allocated_ports, 2);
}
