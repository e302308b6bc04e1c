/*!
 * Pool Types
 * Read-only snapshot and pressure levels for the resource pool
 */

use crate::core::limits;
use serde::{Deserialize, Serialize};

/// Point-in-time view of the pool counters.
///
/// This is what the visualization layer consumes once per tick to render
/// the CPU and memory bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PoolSnapshot {
    pub used_cpu: f64,
    pub total_cpu: f64,
    pub used_memory_mb: u64,
    pub total_memory_mb: u64,
}

impl PoolSnapshot {
    /// CPU usage as a percentage of total capacity
    #[inline]
    #[must_use]
    pub fn cpu_percentage(&self) -> f64 {
        if self.total_cpu <= 0.0 {
            0.0
        } else {
            (self.used_cpu / self.total_cpu) * 100.0
        }
    }

    /// Memory usage as a percentage of total capacity
    #[inline]
    #[must_use]
    pub fn memory_percentage(&self) -> f64 {
        if self.total_memory_mb == 0 {
            0.0
        } else {
            (self.used_memory_mb as f64 / self.total_memory_mb as f64) * 100.0
        }
    }

    /// Pressure level derived from the more loaded of the two resources
    #[must_use]
    pub fn pressure(&self) -> PoolPressure {
        let usage = self.cpu_percentage().max(self.memory_percentage());
        if usage >= limits::PRESSURE_CRITICAL_PERCENT {
            PoolPressure::Critical
        } else if usage >= limits::PRESSURE_HIGH_PERCENT {
            PoolPressure::High
        } else if usage >= limits::PRESSURE_MEDIUM_PERCENT {
            PoolPressure::Medium
        } else {
            PoolPressure::Low
        }
    }
}

/// Pool pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for PoolPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PoolPressure::Low => write!(f, "LOW"),
            PoolPressure::Medium => write!(f, "MEDIUM"),
            PoolPressure::High => write!(f, "HIGH"),
            PoolPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
