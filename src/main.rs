/*!
 * Resource Allocation Simulator - Main Entry Point
 *
 * Demo binary that:
 * - Seeds a mixed workload into the simulation
 * - Drives ticks from a background task
 * - Streams snapshots and logs a periodic status line
 */

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use resource_sim::{
    init_tracing, Collector, Demand, ProcessState, SimConfig, SimSnapshot, Simulation,
    SimulationTask,
};
use tokio_stream::StreamExt;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize structured tracing
    init_tracing();

    info!("Resource allocation simulator starting...");
    info!("================================================");

    // Optional environment overrides; defaults apply when unset
    let mut config = SimConfig::default();
    if let Ok(value) = std::env::var("SIM_TICK_MS") {
        match value.parse::<u64>() {
            Ok(ms) if ms > 0 => {
                config = config.with_tick_interval(Duration::from_millis(ms));
            }
            _ => warn!(value = %value, "Ignoring invalid SIM_TICK_MS"),
        }
    }
    if let Ok(value) = std::env::var("SIM_SEED") {
        match value.parse::<u64>() {
            Ok(seed) => config = config.with_seed(seed),
            Err(_) => warn!(value = %value, "Ignoring invalid SIM_SEED"),
        }
    }

    info!("Initializing event collector...");
    let collector = Arc::new(Collector::default());

    info!("Initializing simulation...");
    let simulation = Simulation::with_config(config)?.with_collector(Arc::clone(&collector));
    let simulation = Arc::new(RwLock::new(simulation));

    // Seed a mixed workload. The combined demand oversubscribes the
    // pool, so the last process waits until earlier ones complete.
    {
        let mut sim = simulation.write();
        sim.add_process(Some("compile-job".to_string()), Some(Demand::new(25.0, 512)));
        sim.add_process(Some("indexer".to_string()), Some(Demand::new(10.0, 256)));
        sim.add_process(Some("media-encode".to_string()), Some(Demand::new(40.0, 1024)));
        sim.add_process(Some("backup".to_string()), Some(Demand::new(30.0, 768)));
    }

    info!("Simulation initialization complete");
    info!("================================================");
    info!("Simulator running - press Ctrl+C to exit");

    let task = SimulationTask::spawn(Arc::clone(&simulation));
    let mut snapshots = task.snapshot_stream();

    let mut last_status = tokio::time::Instant::now();
    loop {
        tokio::select! {
            maybe_snapshot = snapshots.next() => {
                match maybe_snapshot {
                    Some(snapshot) => {
                        if last_status.elapsed() >= Duration::from_secs(5) {
                            log_status(&snapshot);
                            last_status = tokio::time::Instant::now();
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                break;
            }
        }
    }

    log_status(&task.latest());
    info!(
        events = collector.total_emitted(),
        "Simulator stopped"
    );

    task.shutdown().await;
    Ok(())
}

/// One status line summarizing the latest snapshot
fn log_status(snapshot: &SimSnapshot) {
    let mut running = 0usize;
    let mut waiting = 0usize;
    let mut completed = 0usize;
    for process in &snapshot.processes {
        match process.state {
            ProcessState::Running => running += 1,
            ProcessState::Waiting => waiting += 1,
            ProcessState::Completed => completed += 1,
            ProcessState::Ready => {}
        }
    }

    info!(
        tick = snapshot.tick,
        running = running,
        waiting = waiting,
        completed = completed,
        pressure = %snapshot.pool.pressure(),
        "pool at {:.1}% cpu, {:.1}% memory",
        snapshot.pool.cpu_percentage(),
        snapshot.pool.memory_percentage(),
    );
}
