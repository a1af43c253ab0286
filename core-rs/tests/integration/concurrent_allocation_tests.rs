//! Integration tests for multi-threaded use of a shared registry
//!
//! Covers:
//! - Concurrent allocation with real OS probes
//! - Mixed allocate/release churn
//! - Singleton shared across threads

use ckp_ports::{get_port_manager, get_service_port, PortRegistry};
use std::collections::HashSet;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

#[test]
fn test_thread_safety_of_port_allocation() {
    let registry = Arc::new(PortRegistry::new(47300, 47399).unwrap());
    let allocated = Arc::new(Mutex::new(Vec::new()));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let allocated = Arc::clone(&allocated);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..5 {
                    if let Some(port) = registry.allocate_port(&format!("thread_agent_{}_{}", t, i), None) {
                        allocated.lock().unwrap().push(port);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let allocated = allocated.lock().unwrap();
    let unique: HashSet<u16> = allocated.iter().copied().collect();
    assert!(!allocated.is_empty());
    assert_eq!(unique.len(), allocated.len(), "Duplicate ports allocated");
    assert_eq!(
        registry.get_allocation_status().allocated_ports,
        allocated.len()
    );
}

#[test]
fn test_allocate_release_churn_keeps_state_consistent() {
    let registry = Arc::new(PortRegistry::new(47400, 47419).unwrap());

    let handles: Vec<_> = (0..6)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let owner = format!("churn_{}", t);
                let mut held = Vec::new();
                for round in 0..30 {
                    if round % 3 == 2 {
                        if let Some(port) = held.pop() {
                            assert!(registry.release_port(port, &owner));
                        }
                    } else if let Some(port) = registry.allocate_port(&owner, None) {
                        held.push(port);
                    }
                }
                held
            })
        })
        .collect();

    let mut still_held = Vec::new();
    for handle in handles {
        still_held.extend(handle.join().unwrap());
    }

    let unique: HashSet<u16> = still_held.iter().copied().collect();
    assert_eq!(unique.len(), still_held.len());

    let status = registry.get_allocation_status();
    assert_eq!(status.allocated_ports, still_held.len());
    assert_eq!(status.active_allocations.len(), still_held.len());
    assert_eq!(status.allocated_ports + status.available_ports, 20);
}

#[test]
fn test_singleton_shared_across_threads() {
    let addresses: Vec<usize> = (0..4)
        .map(|_| thread::spawn(|| get_port_manager() as *const PortRegistry as usize))
        .map(|h| h.join().unwrap())
        .collect();

    assert!(addresses.windows(2).all(|w| w[0] == w[1]));

    // An allocation made on one thread is visible from another
    let owner = "singleton_cross_thread_agent";
    let port = thread::spawn(move || get_port_manager().allocate_port(owner, None))
        .join()
        .unwrap();
    if let Some(port) = port {
        assert_eq!(get_service_port(owner), Some(port));
        assert!(get_port_manager().release_port(port, owner));
    }
}
