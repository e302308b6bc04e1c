/*!
 * Simulation Module
 * Admission-control loop tying pool, process table, and demand source
 * together behind a single state struct
 */

pub mod events;
pub mod task;

pub use events::{Collector, Event, Payload, Severity, SimStats};
pub use task::{SimCommand, SimulationTask};

use crate::core::errors::ConfigError;
use crate::core::limits;
use crate::core::serde::is_empty_vec;
use crate::core::types::{Demand, Pid, SimResult, Ticks};
use crate::demand::{DemandRange, DemandSource, RandomDemand};
use crate::pool::{PoolSnapshot, ResourcePool};
use crate::process::{ProcessSnapshot, ProcessState, ProcessTable};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Tunable knobs for a simulation run.
///
/// The defaults reproduce the reference setup: a 100% / 2048 MB pool
/// ticking every 450 ms with progress scaled at 0.075 per cpu point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SimConfig {
    pub total_cpu: f64,
    pub total_memory_mb: u64,
    pub progress_scale: f64,
    pub tick_interval: Duration,
    pub demand_range: DemandRange,
    pub seed: Option<u64>,
    pub event_capacity: usize,
}

impl SimConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(mut self, total_cpu: f64, total_memory_mb: u64) -> Self {
        self.total_cpu = total_cpu;
        self.total_memory_mb = total_memory_mb;
        self
    }

    #[must_use]
    pub fn with_progress_scale(mut self, scale: f64) -> Self {
        self.progress_scale = scale;
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    #[must_use]
    pub fn with_demand_range(mut self, range: DemandRange) -> Self {
        self.demand_range = range;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::InvalidTickInterval);
        }
        if !self.progress_scale.is_finite() || self.progress_scale <= 0.0 {
            return Err(ConfigError::InvalidProgressScale(self.progress_scale));
        }
        if !self.total_cpu.is_finite() || self.total_cpu <= 0.0 || self.total_memory_mb == 0 {
            return Err(ConfigError::InvalidCapacity {
                cpu: self.total_cpu,
                memory_mb: self.total_memory_mb,
            });
        }
        // the range may have been built by hand, re-check its bounds
        DemandRange::new(
            self.demand_range.min_cpu,
            self.demand_range.max_cpu,
            self.demand_range.min_memory_mb,
            self.demand_range.max_memory_mb,
        )?;
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_cpu: limits::TOTAL_CPU_PERCENT,
            total_memory_mb: limits::TOTAL_MEMORY_MB,
            progress_scale: limits::PROGRESS_SCALE,
            tick_interval: limits::DEFAULT_TICK_INTERVAL,
            demand_range: DemandRange::default(),
            seed: None,
            event_capacity: limits::EVENT_RING_CAPACITY,
        }
    }
}

/// What one tick changed: pids admitted from the wait queue and pids
/// that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TickOutcome {
    pub tick: Ticks,
    #[serde(skip_serializing_if = "is_empty_vec", default)]
    pub admitted: Vec<Pid>,
    #[serde(skip_serializing_if = "is_empty_vec", default)]
    pub completed: Vec<Pid>,
}

/// Full read-only view of the simulation at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimSnapshot {
    pub tick: Ticks,
    pub pool: PoolSnapshot,
    #[serde(skip_serializing_if = "is_empty_vec", default)]
    pub processes: Vec<ProcessSnapshot>,
    pub stats: SimStats,
}

/// The simulation proper: owns the pool, the process table, and the
/// demand source, and mutates them only through its operations.
///
/// Plain synchronous state. Callers that need concurrent access wrap it
/// in `Arc<RwLock<..>>` and drive it from a [`SimulationTask`].
pub struct Simulation {
    config: SimConfig,
    pool: ResourcePool,
    table: ProcessTable,
    demand: Box<dyn DemandSource>,
    stats: SimStats,
    collector: Option<Arc<Collector>>,
    now: Ticks,
}

impl Simulation {
    /// Simulation with default configuration and an entropy-seeded
    /// demand source.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(SimConfig::default(), Box::new(RandomDemand::new()))
    }

    /// Simulation from a validated configuration. A configured seed
    /// makes the demand sequence reproducible.
    pub fn with_config(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let demand: Box<dyn DemandSource> = match config.seed {
            Some(seed) => Box::new(RandomDemand::seeded(seed).with_range(config.demand_range)),
            None => Box::new(RandomDemand::new().with_range(config.demand_range)),
        };
        Ok(Self::from_parts(config, demand))
    }

    /// Replace the demand source, e.g. with a scripted one in tests.
    #[must_use]
    pub fn with_demand_source(mut self, source: impl DemandSource + 'static) -> Self {
        self.demand = Box::new(source);
        self
    }

    /// Attach an event collector. Lifecycle events are dropped silently
    /// when none is attached.
    #[must_use]
    pub fn with_collector(mut self, collector: Arc<Collector>) -> Self {
        self.collector = Some(collector);
        self
    }

    fn from_parts(config: SimConfig, demand: Box<dyn DemandSource>) -> Self {
        info!(
            "Simulation initialized: {:.0}% cpu / {} MB pool, tick every {:?}",
            config.total_cpu, config.total_memory_mb, config.tick_interval
        );
        Self {
            pool: ResourcePool::with_capacity(config.total_cpu, config.total_memory_mb),
            table: ProcessTable::new(),
            demand,
            stats: SimStats::default(),
            collector: None,
            now: 0,
            config,
        }
    }

    /// Create a process and immediately offer it to the pool.
    ///
    /// Name and demand fall back to a generated name and a draw from
    /// the demand source. The process ends up `Running` on success or
    /// `Waiting` on rejection; both count in the stats. A demand larger
    /// than the whole pool is accepted but can never be admitted.
    pub fn add_process(&mut self, name: Option<String>, demand: Option<Demand>) -> Pid {
        let demand = demand.unwrap_or_else(|| self.demand.next_demand());

        if demand.exceeds_capacity(self.config.total_cpu, self.config.total_memory_mb) {
            warn!(
                "Demand {} can never fit a {:.0}% cpu / {} MB pool; process will wait forever",
                demand, self.config.total_cpu, self.config.total_memory_mb
            );
        }

        self.stats.processes_created += 1;

        let record = self.table.insert(name, demand, self.now);
        let pid = record.pid;
        let name = record.name.clone();

        let admitted = if self.pool.try_admit(record.demand) {
            record.state = ProcessState::Running;
            true
        } else {
            record.state = ProcessState::Waiting;
            false
        };

        if admitted {
            self.stats.admissions += 1;
            info!("Process {} '{}' created and admitted ({})", pid, name, demand);
        } else {
            self.stats.rejections += 1;
            info!("Process {} '{}' created, waiting for capacity ({})", pid, name, demand);
        }

        self.emit(
            Event::new(
                self.now,
                Payload::ProcessCreated {
                    name,
                    cpu: demand.cpu,
                    memory_mb: demand.memory_mb,
                },
            )
            .with_pid(pid),
        );
        let outcome = if admitted {
            Payload::ProcessAdmitted
        } else {
            Payload::AdmissionRejected
        };
        self.emit(Event::new(self.now, outcome).with_pid(pid));

        pid
    }

    /// Remove a process, releasing its held resources if it was
    /// running. Returns false for unknown pids.
    pub fn delete_process(&mut self, pid: Pid) -> bool {
        match self.table.remove(pid) {
            Some(record) => {
                let was_running = record.holds_resources();
                if was_running {
                    self.pool.release(record.demand);
                }
                self.stats.deletions += 1;
                info!("Process {} '{}' deleted ({})", pid, record.name, record.state);
                self.emit(Event::new(self.now, Payload::ProcessDeleted { was_running }).with_pid(pid));
                true
            }
            None => {
                debug!("Delete ignored: unknown pid {}", pid);
                false
            }
        }
    }

    /// Advance the simulation by one tick.
    ///
    /// Processes are visited in insertion order. Waiting ones retry
    /// admission and, once admitted, advance within the same tick;
    /// running ones advance and release their resources the moment they
    /// complete, so capacity freed early in the pass is available to
    /// processes visited later in the same pass.
    pub fn tick(&mut self) -> TickOutcome {
        self.now += 1;
        self.stats.ticks += 1;
        let now = self.now;
        let scale = self.config.progress_scale;

        let mut admitted = Vec::new();
        let mut completed = Vec::new();
        let mut failed_retries = 0u64;

        for record in self.table.iter_mut() {
            if record.state.awaits_admission() {
                if self.pool.try_admit(record.demand) {
                    record.state = ProcessState::Running;
                    admitted.push(record.pid);
                } else {
                    record.state = ProcessState::Waiting;
                    failed_retries += 1;
                    continue;
                }
            }

            if record.state.holds_resources() && record.advance(scale, now) {
                self.pool.release(record.demand);
                completed.push(record.pid);
            }
        }

        self.stats.admissions += admitted.len() as u64;
        self.stats.rejections += failed_retries;
        self.stats.completions += completed.len() as u64;

        for &pid in &admitted {
            self.emit(Event::new(now, Payload::ProcessAdmitted).with_pid(pid));
        }
        for &pid in &completed {
            self.emit(Event::new(now, Payload::ProcessCompleted).with_pid(pid));
        }

        if !admitted.is_empty() || !completed.is_empty() {
            debug!(
                "Tick {}: {} admitted, {} completed, pool at {:.1}% cpu",
                now,
                admitted.len(),
                completed.len(),
                self.pool.snapshot().cpu_percentage()
            );
        }

        TickOutcome {
            tick: now,
            admitted,
            completed,
        }
    }

    /// Wipe all processes, free the pool, and rewind the clock and pid
    /// counters. Cumulative stats and collected events survive.
    pub fn reset(&mut self) {
        let dropped = self.table.len();
        self.table.reset();
        self.pool.reset();
        self.now = 0;

        info!("Simulation reset: {} processes dropped, counters rewound", dropped);
        self.emit(Event::new(0, Payload::SimulationReset));
    }

    #[must_use]
    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            tick: self.now,
            pool: self.pool.snapshot(),
            processes: self.table.snapshots(),
            stats: self.stats,
        }
    }

    #[inline]
    #[must_use]
    pub fn now(&self) -> Ticks {
        self.now
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> SimStats {
        self.stats
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    #[inline]
    #[must_use]
    pub fn processes(&self) -> &ProcessTable {
        &self.table
    }

    fn emit(&self, event: Event) {
        if let Some(collector) = &self.collector {
            collector.emit(event);
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.now)
            .field("processes", &self.table.len())
            .field("pool", &self.pool.snapshot())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::ScriptedDemand;

    fn scripted(demands: Vec<Demand>) -> Simulation {
        Simulation::new().with_demand_source(ScriptedDemand::new(demands))
    }

    #[test]
    fn test_add_admits_within_capacity() {
        let mut sim = Simulation::new();
        let pid = sim.add_process(None, Some(Demand::new(20.0, 512)));

        let record = sim.processes().get(pid).unwrap();
        assert_eq!(record.state, ProcessState::Running);
        assert_eq!(sim.pool().used_cpu(), 20.0);
        assert_eq!(sim.pool().used_memory_mb(), 512);
        assert_eq!(sim.stats().admissions, 1);
    }

    #[test]
    fn test_add_queues_when_pool_is_full() {
        let mut sim = Simulation::new();
        sim.add_process(None, Some(Demand::new(90.0, 1800)));
        let pid = sim.add_process(None, Some(Demand::new(20.0, 100)));

        assert_eq!(sim.processes().get(pid).unwrap().state, ProcessState::Waiting);
        assert_eq!(sim.pool().used_cpu(), 90.0);
        assert_eq!(sim.stats().rejections, 1);
    }

    #[test]
    fn test_add_draws_demand_from_source() {
        let scripted_demand = Demand::new(33.0, 777);
        let mut sim = scripted(vec![scripted_demand]);
        let pid = sim.add_process(None, None);

        assert_eq!(sim.processes().get(pid).unwrap().demand, scripted_demand);
    }

    #[test]
    fn test_tick_counts_failed_retries() {
        let mut sim = Simulation::new();
        sim.add_process(None, Some(Demand::new(90.0, 100)));
        sim.add_process(None, Some(Demand::new(50.0, 100)));
        assert_eq!(sim.stats().rejections, 1);

        sim.tick();
        sim.tick();
        // one failed retry per tick while the big process runs
        assert_eq!(sim.stats().rejections, 3);
    }

    #[test]
    fn test_completion_frees_capacity_within_the_same_tick() {
        let config = SimConfig::default().with_progress_scale(1.0);
        let mut sim = Simulation::with_config(config).unwrap();
        let first = sim.add_process(None, Some(Demand::new(80.0, 500)));
        let second = sim.add_process(None, Some(Demand::new(30.0, 200)));

        sim.tick();
        assert_eq!(sim.processes().get(second).unwrap().state, ProcessState::Waiting);

        let outcome = sim.tick();
        assert_eq!(outcome.completed, vec![first]);
        assert_eq!(outcome.admitted, vec![second]);
        assert_eq!(sim.processes().get(second).unwrap().progress, 30.0);
        assert_eq!(sim.pool().used_cpu(), 30.0);
    }

    #[test]
    fn test_stats_accumulate_across_reset() {
        let mut sim = Simulation::new();
        sim.add_process(None, Some(Demand::new(10.0, 128)));
        sim.tick();
        sim.reset();

        assert_eq!(sim.now(), 0);
        assert!(sim.processes().is_empty());
        assert_eq!(sim.pool().used_cpu(), 0.0);

        let stats = sim.stats();
        assert_eq!(stats.processes_created, 1);
        assert_eq!(stats.ticks, 1);

        let pid = sim.add_process(None, Some(Demand::new(10.0, 128)));
        assert_eq!(pid, limits::PID_START);
    }

    #[test]
    fn test_collector_sees_lifecycle_in_order() {
        let collector = Arc::new(Collector::default());
        let config = SimConfig::default().with_progress_scale(10.0);
        let mut sim = Simulation::with_config(config)
            .unwrap()
            .with_collector(Arc::clone(&collector));

        let pid = sim.add_process(Some("job".to_string()), Some(Demand::new(10.0, 64)));
        sim.tick();
        sim.delete_process(pid);

        let kinds: Vec<Payload> = collector.recent(16).into_iter().map(|e| e.payload).collect();
        assert_eq!(
            kinds,
            vec![
                Payload::ProcessCreated {
                    name: "job".to_string(),
                    cpu: 10.0,
                    memory_mb: 64,
                },
                Payload::ProcessAdmitted,
                Payload::ProcessCompleted,
                Payload::ProcessDeleted { was_running: false },
            ]
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(SimConfig::default().validate().is_ok());
        assert!(matches!(
            SimConfig::default()
                .with_tick_interval(Duration::ZERO)
                .validate(),
            Err(ConfigError::InvalidTickInterval)
        ));
        assert!(matches!(
            SimConfig::default().with_progress_scale(0.0).validate(),
            Err(ConfigError::InvalidProgressScale(_))
        ));
        assert!(matches!(
            SimConfig::default().with_capacity(0.0, 2048).validate(),
            Err(ConfigError::InvalidCapacity { .. })
        ));

        let mut config = SimConfig::default();
        config.demand_range.min_cpu = 50.0;
        config.demand_range.max_cpu = 10.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCpuRange { .. })
        ));
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let mut sim = scripted(vec![Demand::new(25.0, 512)]);
        sim.add_process(None, None);
        sim.tick();

        let snapshot = sim.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SimSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }
}
