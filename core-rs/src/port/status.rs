/**
 * status.rs
 * Point-in-time utilization summary of a registry
 *
 * Built under the registry lock, so `allocated_ports + available_ports`
 * always equals `total_ports`.
 */

use serde::{Deserialize, Serialize};

use super::allocation::PortAllocation;
use super::range::PortRange;
use crate::errors::Result;

/// Active allocation as reported to monitoring callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveAllocation {
    pub port: u16,
    pub allocated_to: String,
    /// RFC3339 timestamp
    pub allocated_at: String,
    pub in_use: bool,
}

impl From<&PortAllocation> for ActiveAllocation {
    fn from(allocation: &PortAllocation) -> Self {
        ActiveAllocation {
            port: allocation.port,
            allocated_to: allocation.allocated_to.clone(),
            allocated_at: allocation.allocated_at.to_rfc3339(),
            in_use: allocation.in_use,
        }
    }
}

/// Registry utilization summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationStatus {
    /// "start-end"
    pub port_range: String,
    pub total_ports: usize,
    pub allocated_ports: usize,
    pub available_ports: usize,
    pub utilization_percent: f64,
    /// Active and released records still retained
    pub total_records: usize,
    pub active_allocations: Vec<ActiveAllocation>,
}

impl AllocationStatus {
    pub(crate) fn compute(
        range: PortRange,
        allocated_count: usize,
        records: &[PortAllocation],
    ) -> Self {
        let total_ports = range.len();
        let allocated_ports = allocated_count.min(total_ports);
        let available_ports = total_ports - allocated_ports;
        let utilization_percent = if total_ports == 0 {
            0.0
        } else {
            (allocated_ports as f64 / total_ports as f64) * 100.0
        };

        AllocationStatus {
            port_range: range.to_string(),
            total_ports,
            allocated_ports,
            available_ports,
            utilization_percent,
            total_records: records.len(),
            active_allocations: records
                .iter()
                .filter(|a| a.in_use)
                .map(ActiveAllocation::from)
                .collect(),
        }
    }

    /// Pretty JSON for dashboards and logs
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
