/*!
 * Process Table
 * Insertion-ordered registry of simulated processes with pid allocation
 */

use crate::core::limits;
use crate::core::types::{Demand, Pid, Ticks};

use super::types::{ProcessRecord, ProcessSnapshot};

/// Owns every live process record and hands out pids.
///
/// Records keep their insertion order, which is also the order the
/// simulation visits them on each tick. Earlier processes therefore get
/// first claim on freed capacity.
#[derive(Debug, Clone)]
pub struct ProcessTable {
    records: Vec<ProcessRecord>,
    next_pid: Pid,
    next_name_index: u32,
}

impl ProcessTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_pid: limits::PID_START,
            next_name_index: limits::NAME_INDEX_START,
        }
    }

    /// Register a new record in `Ready` state and return it for
    /// immediate admission.
    ///
    /// When no name is given one is generated from a monotonic index.
    /// The index advances on every insert, named or not, so generated
    /// names track the total number of creations rather than filling
    /// gaps.
    pub(crate) fn insert(
        &mut self,
        name: Option<String>,
        demand: Demand,
        now: Ticks,
    ) -> &mut ProcessRecord {
        let pid = self.next_pid;
        self.next_pid += 1;

        let name = name.unwrap_or_else(|| format!("Process_{}", self.next_name_index));
        self.next_name_index += 1;

        let index = self.records.len();
        self.records.push(ProcessRecord::new(pid, name, demand, now));
        &mut self.records[index]
    }

    /// Remove a record, preserving the order of the rest.
    pub(crate) fn remove(&mut self, pid: Pid) -> Option<ProcessRecord> {
        let index = self.records.iter().position(|r| r.pid == pid)?;
        Some(self.records.remove(index))
    }

    #[must_use]
    pub fn get(&self, pid: Pid) -> Option<&ProcessRecord> {
        self.records.iter().find(|r| r.pid == pid)
    }

    #[must_use]
    pub fn contains(&self, pid: Pid) -> bool {
        self.get(pid).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.records.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ProcessRecord> {
        self.records.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records and rewind the pid and name counters to their
    /// initial values, as if the table had just been constructed.
    pub(crate) fn reset(&mut self) {
        self.records.clear();
        self.next_pid = limits::PID_START;
        self.next_name_index = limits::NAME_INDEX_START;
    }

    /// Snapshot every record in insertion order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<ProcessSnapshot> {
        self.records.iter().map(ProcessSnapshot::from).collect()
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}
