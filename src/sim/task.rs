/*!
 * Simulation Task - Autonomous Tick Driver
 *
 * Background task that owns the tick cadence. The simulation itself
 * stays synchronous; this loop serializes all mutations and publishes a
 * fresh snapshot through a watch channel after every change.
 */

use super::{SimSnapshot, Simulation};
use crate::core::types::{Demand, Pid};
use crate::tracer::span_tick;
use log::{info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

/// Control messages for the simulation task
#[derive(Debug, Clone)]
pub enum SimCommand {
    /// Create a process (name and demand optional, as in `add_process`)
    AddProcess {
        name: Option<String>,
        demand: Option<Demand>,
    },
    /// Remove a process
    DeleteProcess(Pid),
    /// Clear all processes and rewind the clock
    Reset,
    /// Suspend automatic ticking
    Pause,
    /// Resume automatic ticking
    Resume,
    /// Run one tick immediately, even while paused
    Trigger,
    /// Change the tick cadence
    SetTickInterval(Duration),
    /// Shutdown the simulation task
    Shutdown,
}

/// Handle to the simulation background task
pub struct SimulationTask {
    command_tx: mpsc::UnboundedSender<SimCommand>,
    snapshot_rx: watch::Receiver<SimSnapshot>,
    handle: Option<JoinHandle<()>>,
}

impl SimulationTask {
    /// Spawn a driver that ticks automatically at the configured
    /// interval. The first tick fires immediately.
    pub fn spawn(simulation: Arc<RwLock<Simulation>>) -> Self {
        Self::spawn_inner(simulation, true)
    }

    /// Spawn a driver with automatic ticking suspended. Time only
    /// advances through [`SimCommand::Trigger`] or after a `Resume`,
    /// which keeps tests deterministic.
    pub fn spawn_paused(simulation: Arc<RwLock<Simulation>>) -> Self {
        Self::spawn_inner(simulation, false)
    }

    fn spawn_inner(simulation: Arc<RwLock<Simulation>>, active: bool) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let initial = simulation.read().snapshot();
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            run_simulation_loop(simulation, command_rx, snapshot_tx, active).await;
        });

        info!(
            "Simulation task spawned ({})",
            if active { "ticking" } else { "paused" }
        );

        Self {
            command_tx,
            snapshot_rx,
            handle: Some(handle),
        }
    }

    /// Queue a process creation
    pub fn add_process(&self, name: Option<String>, demand: Option<Demand>) {
        let _ = self.command_tx.send(SimCommand::AddProcess { name, demand });
    }

    /// Queue a process removal
    pub fn delete_process(&self, pid: Pid) {
        let _ = self.command_tx.send(SimCommand::DeleteProcess(pid));
    }

    /// Queue a full reset
    pub fn reset(&self) {
        let _ = self.command_tx.send(SimCommand::Reset);
    }

    /// Suspend automatic ticking
    pub fn pause(&self) {
        let _ = self.command_tx.send(SimCommand::Pause);
    }

    /// Resume automatic ticking
    pub fn resume(&self) {
        let _ = self.command_tx.send(SimCommand::Resume);
    }

    /// Force one tick now, even while paused
    pub fn trigger(&self) {
        let _ = self.command_tx.send(SimCommand::Trigger);
    }

    /// Change the tick cadence (zero intervals are ignored)
    pub fn set_tick_interval(&self, interval: Duration) {
        let _ = self.command_tx.send(SimCommand::SetTickInterval(interval));
    }

    /// Receiver over published snapshots; `borrow()` gives the latest
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<SimSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Latest published snapshot
    #[must_use]
    pub fn latest(&self) -> SimSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Snapshot feed as an async stream, one item per published change
    #[must_use]
    pub fn snapshot_stream(&self) -> WatchStream<SimSnapshot> {
        WatchStream::new(self.snapshot_rx.clone())
    }

    /// Shutdown the simulation task gracefully
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(SimCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Simulation task shutdown error: {}", e);
            } else {
                info!("Simulation task shutdown complete");
            }
        }
    }
}

/// Core driver loop: periodic ticks plus serialized command handling
async fn run_simulation_loop(
    simulation: Arc<RwLock<Simulation>>,
    mut command_rx: mpsc::UnboundedReceiver<SimCommand>,
    snapshot_tx: watch::Sender<SimSnapshot>,
    mut active: bool,
) {
    let mut tick_interval = simulation.read().config().tick_interval;
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("Simulation loop started, tick every {:?}", tick_interval);

    loop {
        tokio::select! {
            // Periodic tick (first fires immediately)
            _ = interval.tick() => {
                if active {
                    let snapshot = {
                        let mut sim = simulation.write();
                        let span = span_tick(sim.now() + 1, tick_interval);
                        let outcome = sim.tick();
                        span.record_admitted(outcome.admitted.len());
                        span.record_completed(outcome.completed.len());
                        drop(span);
                        sim.snapshot()
                    };
                    let _ = snapshot_tx.send(snapshot);
                }
            }

            // Handle control commands
            Some(cmd) = command_rx.recv() => {
                match cmd {
                    SimCommand::AddProcess { name, demand } => {
                        let snapshot = {
                            let mut sim = simulation.write();
                            let pid = sim.add_process(name, demand);
                            log::trace!("Command: process {} added", pid);
                            sim.snapshot()
                        };
                        let _ = snapshot_tx.send(snapshot);
                    }

                    SimCommand::DeleteProcess(pid) => {
                        let snapshot = {
                            let mut sim = simulation.write();
                            if !sim.delete_process(pid) {
                                warn!("Delete command for unknown pid {}", pid);
                            }
                            sim.snapshot()
                        };
                        let _ = snapshot_tx.send(snapshot);
                    }

                    SimCommand::Reset => {
                        let snapshot = {
                            let mut sim = simulation.write();
                            sim.reset();
                            sim.snapshot()
                        };
                        let _ = snapshot_tx.send(snapshot);
                    }

                    SimCommand::Pause => {
                        info!("Simulation task paused");
                        active = false;
                    }

                    SimCommand::Resume => {
                        info!("Simulation task resumed");
                        active = true;
                    }

                    SimCommand::Trigger => {
                        let snapshot = {
                            let mut sim = simulation.write();
                            let span = span_tick(sim.now() + 1, tick_interval);
                            let outcome = sim.tick();
                            span.record_admitted(outcome.admitted.len());
                            span.record_completed(outcome.completed.len());
                            drop(span);
                            log::trace!("Manual tick {} triggered", outcome.tick);
                            sim.snapshot()
                        };
                        let _ = snapshot_tx.send(snapshot);
                    }

                    SimCommand::SetTickInterval(new_interval) => {
                        if new_interval.is_zero() {
                            warn!("Ignoring zero tick interval");
                        } else {
                            info!("Tick interval updated: {:?}", new_interval);
                            tick_interval = new_interval;
                            interval = tokio::time::interval(new_interval);
                            interval.set_missed_tick_behavior(
                                tokio::time::MissedTickBehavior::Skip,
                            );
                        }
                    }

                    SimCommand::Shutdown => {
                        info!("Simulation task shutting down");
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for SimulationTask {
    fn drop(&mut self) {
        // Attempt graceful shutdown if handle still exists
        if self.handle.is_some() {
            let _ = self.command_tx.send(SimCommand::Shutdown);
        }
    }
}
