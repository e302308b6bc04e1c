/*!
 * Process Types
 * Lifecycle states, process records, and their serializable views
 */

use crate::core::limits;
use crate::core::serde::{is_none, is_zero_f64};
use crate::core::types::{Demand, Pid, Ticks};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a simulated process.
///
/// `Ready` is transient: a freshly created process attempts admission
/// immediately and leaves `Ready` within the same operation, either
/// holding resources (`Running`) or queued for retry (`Waiting`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Created but not yet offered to the pool
    Ready,
    /// Holds its demand from the pool and advances each tick
    Running,
    /// Admission failed; retries at every tick
    Waiting,
    /// Reached full progress; resources released, terminal
    Completed,
}

impl ProcessState {
    /// Whether this state currently holds pool capacity
    #[inline(always)]
    #[must_use]
    pub const fn holds_resources(&self) -> bool {
        matches!(self, ProcessState::Running)
    }

    /// Whether this state should be offered to the pool on the next tick
    #[inline(always)]
    #[must_use]
    pub const fn awaits_admission(&self) -> bool {
        matches!(self, ProcessState::Ready | ProcessState::Waiting)
    }

    /// Whether this state is terminal
    #[inline(always)]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Completed)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Ready => write!(f, "Ready"),
            ProcessState::Running => write!(f, "Running"),
            ProcessState::Waiting => write!(f, "Waiting"),
            ProcessState::Completed => write!(f, "Completed"),
        }
    }
}

/// A live entry in the process table.
///
/// Records are owned exclusively by the table; everything outside the
/// simulation core sees them through [`ProcessSnapshot`].
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub name: String,
    pub demand: Demand,
    pub state: ProcessState,
    pub progress: f64,
    pub created_at: Ticks,
    pub completed_at: Option<Ticks>,
}

impl ProcessRecord {
    pub fn new(pid: Pid, name: String, demand: Demand, created_at: Ticks) -> Self {
        Self {
            pid,
            name,
            demand,
            state: ProcessState::Ready,
            progress: 0.0,
            created_at,
            completed_at: None,
        }
    }

    /// Advance progress by one tick's worth of work and report whether
    /// the process completed on this call.
    ///
    /// Progress grows by `cpu demand * scale` and saturates at
    /// [`limits::PROGRESS_COMPLETE`]. Only running processes advance.
    pub(crate) fn advance(&mut self, scale: f64, now: Ticks) -> bool {
        debug_assert!(
            self.state == ProcessState::Running,
            "advance() on non-running process {}",
            self.pid
        );

        self.progress = (self.progress + self.demand.cpu * scale).min(limits::PROGRESS_COMPLETE);
        if self.progress >= limits::PROGRESS_COMPLETE {
            self.state = ProcessState::Completed;
            self.completed_at = Some(now);
            true
        } else {
            false
        }
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    #[inline]
    #[must_use]
    pub fn holds_resources(&self) -> bool {
        self.state.holds_resources()
    }
}

/// Point-in-time view of a process, safe to hand across thread and
/// serialization boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessSnapshot {
    pub pid: Pid,
    pub name: String,
    pub cpu_demand: f64,
    pub memory_demand_mb: u64,
    pub state: ProcessState,
    #[serde(skip_serializing_if = "is_zero_f64", default)]
    pub progress: f64,
    pub created_at: Ticks,
    #[serde(skip_serializing_if = "is_none", default)]
    pub completed_at: Option<Ticks>,
}

impl ProcessSnapshot {
    /// CPU actually drawn from the pool right now (zero unless running)
    #[inline]
    #[must_use]
    pub fn allocated_cpu(&self) -> f64 {
        if self.state.holds_resources() {
            self.cpu_demand
        } else {
            0.0
        }
    }

    /// Memory actually drawn from the pool right now (zero unless running)
    #[inline]
    #[must_use]
    pub fn memory_used_mb(&self) -> u64 {
        if self.state.holds_resources() {
            self.memory_demand_mb
        } else {
            0
        }
    }
}

impl From<&ProcessRecord> for ProcessSnapshot {
    fn from(record: &ProcessRecord) -> Self {
        Self {
            pid: record.pid,
            name: record.name.clone(),
            cpu_demand: record.demand.cpu,
            memory_demand_mb: record.demand.memory_mb,
            state: record.state,
            progress: record.progress,
            created_at: record.created_at,
            completed_at: record.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cpu: f64) -> ProcessRecord {
        ProcessRecord::new(1001, "worker".to_string(), Demand::new(cpu, 256), 0)
    }

    #[test]
    fn test_state_helpers() {
        assert!(ProcessState::Running.holds_resources());
        assert!(!ProcessState::Waiting.holds_resources());
        assert!(ProcessState::Ready.awaits_admission());
        assert!(ProcessState::Waiting.awaits_admission());
        assert!(!ProcessState::Completed.awaits_admission());
        assert!(ProcessState::Completed.is_terminal());
        assert!(!ProcessState::Running.is_terminal());
    }

    #[test]
    fn test_advance_accumulates_progress() {
        let mut rec = record(10.0);
        rec.state = ProcessState::Running;

        assert!(!rec.advance(0.075, 1));
        assert!((rec.progress - 0.75).abs() < 1e-9);
        assert_eq!(rec.state, ProcessState::Running);
        assert_eq!(rec.completed_at, None);
    }

    #[test]
    fn test_advance_completes_and_saturates() {
        let mut rec = record(60.0);
        rec.state = ProcessState::Running;

        assert!(!rec.advance(1.0, 1));
        assert!(rec.advance(1.0, 2));
        assert_eq!(rec.progress, limits::PROGRESS_COMPLETE);
        assert_eq!(rec.state, ProcessState::Completed);
        assert_eq!(rec.completed_at, Some(2));
    }

    #[test]
    fn test_advance_exact_boundary_completes() {
        let mut rec = record(100.0);
        rec.state = ProcessState::Running;

        assert!(rec.advance(1.0, 5));
        assert_eq!(rec.progress, 100.0);
        assert_eq!(rec.completed_at, Some(5));
    }

    #[test]
    fn test_snapshot_reflects_allocation() {
        let mut rec = record(25.0);
        let snap = ProcessSnapshot::from(&rec);
        assert_eq!(snap.allocated_cpu(), 0.0);
        assert_eq!(snap.memory_used_mb(), 0);

        rec.state = ProcessState::Running;
        let snap = ProcessSnapshot::from(&rec);
        assert_eq!(snap.allocated_cpu(), 25.0);
        assert_eq!(snap.memory_used_mb(), 256);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&ProcessState::Waiting).unwrap();
        assert_eq!(json, "\"waiting\"");

        let state: ProcessState = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(state, ProcessState::Completed);
    }

    #[test]
    fn test_snapshot_skips_empty_fields() {
        let rec = record(10.0);
        let json = serde_json::to_string(&ProcessSnapshot::from(&rec)).unwrap();
        assert!(!json.contains("progress"));
        assert!(!json.contains("completed_at"));
    }
}
