/*!
 * Resource Pool
 *
 * Aggregate admission counters for CPU and memory. The pool knows nothing
 * about individual processes; it only tracks how much of each capacity is
 * currently committed. Admission is first-come-first-admitted with no
 * reordering and no preemption of already-admitted work.
 */

mod types;

pub use types::{PoolPressure, PoolSnapshot};

use crate::core::limits;
use crate::core::types::Demand;

/// Resource pool with two scalar capacities.
///
/// Invariant: `0 <= used_cpu <= total_cpu` and
/// `0 <= used_memory_mb <= total_memory_mb` at all times. `try_admit`
/// commits both amounts or neither; `release` clamps at zero so a buggy
/// call sequence cannot drive the counters negative.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    total_cpu: f64,
    total_memory_mb: u64,
    used_cpu: f64,
    used_memory_mb: u64,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::with_capacity(limits::TOTAL_CPU_PERCENT, limits::TOTAL_MEMORY_MB)
    }

    /// Create a pool with custom capacities (useful for testing)
    pub fn with_capacity(total_cpu: f64, total_memory_mb: u64) -> Self {
        Self {
            total_cpu,
            total_memory_mb,
            used_cpu: 0.0,
            used_memory_mb: 0,
        }
    }

    /// Attempt to commit a demand against the remaining capacity.
    ///
    /// Succeeds iff BOTH amounts stay within their totals; on failure
    /// nothing is committed. Rejection is a normal outcome, not an error.
    pub fn try_admit(&mut self, demand: Demand) -> bool {
        // Negative or non-finite cpu demand is never admittable
        if !demand.cpu.is_finite() || demand.cpu < 0.0 {
            return false;
        }

        let fits_cpu = self.used_cpu + demand.cpu <= self.total_cpu;
        let fits_memory = self
            .used_memory_mb
            .checked_add(demand.memory_mb)
            .map_or(false, |used| used <= self.total_memory_mb);

        if !(fits_cpu && fits_memory) {
            return false;
        }

        self.used_cpu += demand.cpu;
        self.used_memory_mb += demand.memory_mb;
        debug_assert!(self.used_cpu <= self.total_cpu);
        debug_assert!(self.used_memory_mb <= self.total_memory_mb);
        true
    }

    /// Return a previously admitted demand to the pool.
    ///
    /// Clamped at zero: callers release exactly what they admitted, so the
    /// clamp only matters for invalid call sequences.
    pub fn release(&mut self, demand: Demand) {
        if demand.cpu.is_finite() && demand.cpu > 0.0 {
            self.used_cpu = (self.used_cpu - demand.cpu).max(0.0);
        }
        self.used_memory_mb = self.used_memory_mb.saturating_sub(demand.memory_mb);
    }

    /// Zero the committed counters, leaving capacities untouched
    pub fn reset(&mut self) {
        self.used_cpu = 0.0;
        self.used_memory_mb = 0;
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            used_cpu: self.used_cpu,
            total_cpu: self.total_cpu,
            used_memory_mb: self.used_memory_mb,
            total_memory_mb: self.total_memory_mb,
        }
    }

    #[inline]
    #[must_use]
    pub fn used_cpu(&self) -> f64 {
        self.used_cpu
    }

    #[inline]
    #[must_use]
    pub fn used_memory_mb(&self) -> u64 {
        self.used_memory_mb
    }

    #[inline]
    #[must_use]
    pub fn total_cpu(&self) -> f64 {
        self.total_cpu
    }

    #[inline]
    #[must_use]
    pub fn total_memory_mb(&self) -> u64 {
        self.total_memory_mb
    }

    #[inline]
    #[must_use]
    pub fn available_cpu(&self) -> f64 {
        (self.total_cpu - self.used_cpu).max(0.0)
    }

    #[inline]
    #[must_use]
    pub fn available_memory_mb(&self) -> u64 {
        self.total_memory_mb.saturating_sub(self.used_memory_mb)
    }
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_within_capacity() {
        let mut pool = ResourcePool::new();
        assert!(pool.try_admit(Demand::new(20.0, 512)));
        assert_eq!(pool.used_cpu(), 20.0);
        assert_eq!(pool.used_memory_mb(), 512);
    }

    #[test]
    fn test_admit_exact_fit() {
        let mut pool = ResourcePool::new();
        assert!(pool.try_admit(Demand::new(100.0, 2048)));
        assert_eq!(pool.available_cpu(), 0.0);
        assert_eq!(pool.available_memory_mb(), 0);
    }

    #[test]
    fn test_reject_cpu_exceeded() {
        let mut pool = ResourcePool::new();
        assert!(pool.try_admit(Demand::new(90.0, 2000)));

        // CPU would exceed 100; nothing may be committed
        assert!(!pool.try_admit(Demand::new(20.0, 10)));
        assert_eq!(pool.used_cpu(), 90.0);
        assert_eq!(pool.used_memory_mb(), 2000);
    }

    #[test]
    fn test_reject_memory_exceeded() {
        let mut pool = ResourcePool::new();
        assert!(pool.try_admit(Demand::new(10.0, 2000)));

        assert!(!pool.try_admit(Demand::new(10.0, 100)));
        assert_eq!(pool.used_cpu(), 10.0);
        assert_eq!(pool.used_memory_mb(), 2000);
    }

    #[test]
    fn test_reject_commits_nothing() {
        let mut pool = ResourcePool::with_capacity(50.0, 100);
        assert!(!pool.try_admit(Demand::new(60.0, 50)));
        assert_eq!(pool.used_cpu(), 0.0);
        assert_eq!(pool.used_memory_mb(), 0);
    }

    #[test]
    fn test_release_returns_capacity() {
        let mut pool = ResourcePool::new();
        let demand = Demand::new(30.0, 1024);
        assert!(pool.try_admit(demand));

        pool.release(demand);
        assert_eq!(pool.used_cpu(), 0.0);
        assert_eq!(pool.used_memory_mb(), 0);
        assert!(pool.try_admit(Demand::new(100.0, 2048)));
    }

    #[test]
    fn test_release_clamps_at_zero() {
        let mut pool = ResourcePool::new();
        pool.release(Demand::new(50.0, 4096));
        assert_eq!(pool.used_cpu(), 0.0);
        assert_eq!(pool.used_memory_mb(), 0);
    }

    #[test]
    fn test_invalid_cpu_demand_never_admitted() {
        let mut pool = ResourcePool::new();
        assert!(!pool.try_admit(Demand::new(-5.0, 10)));
        assert!(!pool.try_admit(Demand::new(f64::NAN, 10)));
        assert_eq!(pool.used_cpu(), 0.0);
    }

    #[test]
    fn test_reset_zeroes_counters() {
        let mut pool = ResourcePool::new();
        assert!(pool.try_admit(Demand::new(40.0, 256)));
        pool.reset();
        assert_eq!(pool.used_cpu(), 0.0);
        assert_eq!(pool.used_memory_mb(), 0);
        assert_eq!(pool.total_cpu(), 100.0);
    }

    #[test]
    fn test_snapshot_percentages() {
        let mut pool = ResourcePool::new();
        assert!(pool.try_admit(Demand::new(25.0, 1024)));

        let snap = pool.snapshot();
        assert_eq!(snap.cpu_percentage(), 25.0);
        assert_eq!(snap.memory_percentage(), 50.0);
    }

    #[test]
    fn test_pressure_levels() {
        let mut pool = ResourcePool::new();
        assert_eq!(pool.snapshot().pressure(), PoolPressure::Low);

        assert!(pool.try_admit(Demand::new(60.0, 0)));
        assert_eq!(pool.snapshot().pressure(), PoolPressure::Medium);

        assert!(pool.try_admit(Demand::new(25.0, 0)));
        assert_eq!(pool.snapshot().pressure(), PoolPressure::High);

        assert!(pool.try_admit(Demand::new(10.0, 0)));
        assert_eq!(pool.snapshot().pressure(), PoolPressure::Critical);
    }
}
