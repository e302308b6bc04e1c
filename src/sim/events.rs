/*!
 * Simulation Events
 * Strongly-typed lifecycle events, a bounded in-memory log, and
 * cumulative run counters
 */

use crate::core::limits;
use crate::core::serde::is_zero_u64;
use crate::core::types::{Pid, Ticks};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Event severity for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Severity {
    Info = 0,
    Warn = 1,
}

/// One observable state change, stamped with the tick it happened on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Event {
    pub tick: Ticks,
    #[serde(skip_serializing_if = "crate::core::serde::is_none", default)]
    pub pid: Option<Pid>,
    pub payload: Payload,
}

/// Event payload, one variant per lifecycle transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    ProcessCreated {
        name: String,
        cpu: f64,
        memory_mb: u64,
    },
    ProcessAdmitted,
    AdmissionRejected,
    ProcessCompleted,
    ProcessDeleted {
        was_running: bool,
    },
    SimulationReset,
}

impl Payload {
    #[inline]
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Payload::AdmissionRejected => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl Event {
    #[inline]
    #[must_use]
    pub fn new(tick: Ticks, payload: Payload) -> Self {
        Self {
            tick,
            pid: None,
            payload,
        }
    }

    /// Attach process context
    #[inline]
    #[must_use]
    pub fn with_pid(mut self, pid: Pid) -> Self {
        self.pid = Some(pid);
        self
    }

    #[inline]
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.payload.severity()
    }
}

/// Bounded event log. Oldest events are evicted once the ring is full;
/// `total_emitted` keeps counting regardless.
///
/// Shared behind an `Arc` between the simulation (writer) and whoever
/// inspects history (readers).
pub struct Collector {
    ring: RwLock<VecDeque<Event>>,
    capacity: usize,
    total_emitted: AtomicU64,
}

impl Collector {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            total_emitted: AtomicU64::new(0),
        }
    }

    pub fn emit(&self, event: Event) {
        self.total_emitted.fetch_add(1, Ordering::Relaxed);

        let mut ring = self.ring.write();
        if ring.len() == self.capacity {
            ring.pop_front();
        }
        if self.capacity > 0 {
            ring.push_back(event);
        }
    }

    /// The most recent `count` events, oldest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<Event> {
        let ring = self.ring.read();
        let skip = ring.len().saturating_sub(count);
        ring.iter().skip(skip).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.read().is_empty()
    }

    /// Events emitted since construction, including evicted ones
    #[must_use]
    pub fn total_emitted(&self) -> u64 {
        self.total_emitted.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.ring.write().clear();
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(limits::EVENT_RING_CAPACITY)
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("total_emitted", &self.total_emitted())
            .finish()
    }
}

/// Cumulative run counters. These survive `reset()` so a long session
/// keeps its history of rejections and completions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimStats {
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub ticks: u64,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub processes_created: u64,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub admissions: u64,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub rejections: u64,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub completions: u64,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub deletions: u64,
}
