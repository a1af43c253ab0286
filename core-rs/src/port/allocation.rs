use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One allocation record
///
/// Created active by a successful allocation, flipped inactive by a release
/// with the matching owner, and dropped by expiry cleanup once inactive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortAllocation {
    pub port: u16,
    pub allocated_at: DateTime<Utc>,
    /// Opaque owner identifier (e.g. "visual_analysis_agent")
    pub allocated_to: String,
    pub in_use: bool,
}

impl PortAllocation {
    /// New active record stamped with the current time
    pub fn new(port: u16, allocated_to: impl Into<String>) -> Self {
        PortAllocation {
            port,
            allocated_at: Utc::now(),
            allocated_to: allocated_to.into(),
            in_use: true,
        }
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.allocated_to == owner_id
    }

    /// Inactive and created before `cutoff`
    pub fn is_expired(&self, cutoff: DateTime<Utc>) -> bool {
        !self.in_use && self.allocated_at < cutoff
    }
}
