/**
 * range.rs
 * Inclusive port range managed by a registry
 *
 * Default range: [8765, 8864] (100 ports reserved for local agents)
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{PortError, Result};

/// First port of the default agent range
pub const DEFAULT_START_PORT: u16 = 8765;

/// Last port of the default agent range (inclusive)
pub const DEFAULT_END_PORT: u16 = 8864;

/// Inclusive port range
///
/// Only built through `new` (or deserialization, which runs the same
/// checks), so `1 <= start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPortRange")]
pub struct PortRange {
    start: u16,
    end: u16,
}

#[derive(Deserialize)]
struct RawPortRange {
    start: u16,
    end: u16,
}

impl TryFrom<RawPortRange> for PortRange {
    type Error = PortError;

    fn try_from(raw: RawPortRange) -> Result<Self> {
        PortRange::new(raw.start, raw.end)
    }
}

impl PortRange {
    /// Create a validated range
    ///
    /// # Errors
    /// Returns `InvalidRange` if `start` is 0 or `start > end`
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start == 0 {
            return Err(PortError::InvalidRange(format!(
                "start port must be non-zero (got {}-{})",
                start, end
            )));
        }
        if start > end {
            return Err(PortError::InvalidRange(format!(
                "start port {} is greater than end port {}",
                start, end
            )));
        }
        Ok(PortRange { start, end })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Check if port is within this range
    pub fn contains(&self, port: u16) -> bool {
        port >= self.start && port <= self.end
    }

    /// Number of ports in the range
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ports in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

impl Default for PortRange {
    fn default() -> Self {
        PortRange {
            start: DEFAULT_START_PORT,
            end: DEFAULT_END_PORT,
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
