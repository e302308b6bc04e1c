/*!
 * Core Types
 * Common types shared across the simulator
 */

use crate::core::limits;
use serde::{Deserialize, Serialize};

/// Process ID type
pub type Pid = u32;

/// Discrete simulation time, counted in ticks since start (or last reset)
pub type Ticks = u64;

/// Common result type for simulator operations
pub type SimResult<T> = Result<T, super::errors::SimulationError>;

/// Resource demand a process declares at creation and holds for its entire
/// lifetime: a CPU share in percent of the machine and a memory footprint
/// in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Demand {
    pub cpu: f64,
    pub memory_mb: u64,
}

impl Demand {
    #[inline]
    #[must_use]
    pub const fn new(cpu: f64, memory_mb: u64) -> Self {
        Self { cpu, memory_mb }
    }

    /// Check whether this demand can never be admitted against the given
    /// capacities, even with an empty pool.
    ///
    /// Such a process stays `Waiting` forever. Known degenerate case of the
    /// toy model, surfaced as a warning at creation time.
    #[inline]
    #[must_use]
    pub fn exceeds_capacity(&self, total_cpu: f64, total_memory_mb: u64) -> bool {
        self.cpu > total_cpu || self.memory_mb > total_memory_mb
    }
}

impl Default for Demand {
    fn default() -> Self {
        Self {
            cpu: limits::DEFAULT_CPU_DEMAND,
            memory_mb: limits::DEFAULT_MEMORY_DEMAND_MB,
        }
    }
}

impl std::fmt::Display for Demand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.1}% cpu / {} MB", self.cpu, self.memory_mb)
    }
}
