/*!
 * Simulator Limits and Constants
 *
 * Centralized location for all simulation-wide limits, thresholds, and
 * magic numbers. Organized by domain for maintainability.
 */

use super::types::Pid;
use std::time::Duration;

// =============================================================================
// POOL CAPACITY
// =============================================================================

/// Total schedulable CPU, in percent of the whole machine.
/// Admission commits against this cap; it is never exceeded.
pub const TOTAL_CPU_PERCENT: f64 = 100.0;

/// Total simulated memory pool (2 GB expressed in MB).
pub const TOTAL_MEMORY_MB: u64 = 2048;

// =============================================================================
// PACING
// =============================================================================

/// Interval between driver ticks (450 ms).
/// Chosen so a default process finishes in about a minute of wall time.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(450);

/// Progress gained per tick per percent of CPU held.
/// A process holding `cpu` percent advances `cpu * PROGRESS_SCALE` points
/// per tick. 0.05 base rate with a 1.5x speed boost.
pub const PROGRESS_SCALE: f64 = 0.05 * 1.5;

/// Progress value at which a running process completes.
pub const PROGRESS_COMPLETE: f64 = 100.0;

// =============================================================================
// PROCESS IDENTITY
// =============================================================================

/// First pid handed out; also the value the counter returns to on reset.
/// Keeps simulated pids visually distinct from small "system" numbers.
pub const PID_START: Pid = 1001;

/// First index used for auto-generated `Process_<n>` names.
pub const NAME_INDEX_START: u32 = 1;

// =============================================================================
// DEMAND GENERATION
// =============================================================================

/// Smallest CPU share a generated process may request.
pub const MIN_CPU_DEMAND: f64 = 1.0;

/// Largest CPU share a generated process may request (a full machine).
pub const MAX_CPU_DEMAND: f64 = 100.0;

/// CPU share used when the caller specifies no demand.
pub const DEFAULT_CPU_DEMAND: f64 = 10.0;

/// Smallest memory footprint a generated process may request.
pub const MIN_MEMORY_DEMAND_MB: u64 = 0;

/// Largest memory footprint a generated process may request (the whole pool).
pub const MAX_MEMORY_DEMAND_MB: u64 = 2048;

/// Memory footprint used when the caller specifies no demand.
pub const DEFAULT_MEMORY_DEMAND_MB: u64 = 256;

// =============================================================================
// POOL PRESSURE THRESHOLDS
// =============================================================================

/// Usage percentage above which pressure is reported as Medium.
pub const PRESSURE_MEDIUM_PERCENT: f64 = 60.0;

/// Usage percentage above which pressure is reported as High.
pub const PRESSURE_HIGH_PERCENT: f64 = 80.0;

/// Usage percentage above which pressure is reported as Critical.
pub const PRESSURE_CRITICAL_PERCENT: f64 = 95.0;

// =============================================================================
// OBSERVABILITY
// =============================================================================

/// Bounded capacity of the in-memory event ring.
/// Oldest events are dropped first once the ring is full.
pub const EVENT_RING_CAPACITY: usize = 1024;
