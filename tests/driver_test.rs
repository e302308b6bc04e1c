/*!
 * Driver Tests
 * End-to-end tests for the background tick task and its command channel
 */

use parking_lot::RwLock;
use pretty_assertions::assert_eq;
use resource_sim::{Demand, ProcessState, SimConfig, SimSnapshot, Simulation, SimulationTask};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::StreamExt;

fn shared(config: SimConfig) -> Arc<RwLock<Simulation>> {
    Arc::new(RwLock::new(Simulation::with_config(config).unwrap()))
}

/// Await publishes until the predicate holds on the latest snapshot
async fn wait_until(
    rx: &mut watch::Receiver<SimSnapshot>,
    pred: impl Fn(&SimSnapshot) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if pred(&rx.borrow()) {
                return;
            }
            rx.changed().await.expect("snapshot channel closed");
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_spawn_publishes_initial_snapshot() {
    let task = SimulationTask::spawn_paused(shared(SimConfig::default()));

    let snapshot = task.latest();
    assert_eq!(snapshot.tick, 0);
    assert!(snapshot.processes.is_empty());
    assert_eq!(snapshot.pool.used_cpu, 0.0);

    task.shutdown().await;
}

#[tokio::test]
async fn test_commands_drive_a_deterministic_run() {
    let config = SimConfig::default().with_progress_scale(1.0);
    let task = SimulationTask::spawn_paused(shared(config));
    let mut rx = task.snapshots();

    // 50 cpu runs immediately; 60 cpu must wait for it to finish
    task.add_process(Some("first".to_string()), Some(Demand::new(50.0, 400)));
    task.add_process(Some("second".to_string()), Some(Demand::new(60.0, 500)));
    wait_until(&mut rx, |s| s.processes.len() == 2).await;

    {
        let snapshot = rx.borrow();
        assert_eq!(snapshot.processes[0].state, ProcessState::Running);
        assert_eq!(snapshot.processes[1].state, ProcessState::Waiting);
    }

    // tick 1: first at 50; tick 2: first done, second admitted at 60;
    // tick 3: second done
    task.trigger();
    task.trigger();
    task.trigger();
    wait_until(&mut rx, |s| s.tick == 3).await;

    let snapshot = rx.borrow().clone();
    assert_eq!(snapshot.processes[0].state, ProcessState::Completed);
    assert_eq!(snapshot.processes[0].completed_at, Some(2));
    assert_eq!(snapshot.processes[1].state, ProcessState::Completed);
    assert_eq!(snapshot.processes[1].completed_at, Some(3));
    assert_eq!(snapshot.pool.used_cpu, 0.0);
    assert_eq!(snapshot.pool.used_memory_mb, 0);
    assert_eq!(snapshot.stats.completions, 2);

    task.shutdown().await;
}

#[tokio::test]
async fn test_snapshot_stream_yields_updates() {
    let task = SimulationTask::spawn_paused(shared(SimConfig::default()));
    let mut stream = task.snapshot_stream();

    // first item is the current snapshot
    let first = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("stream stalled")
        .expect("stream ended");
    assert_eq!(first.tick, 0);

    task.add_process(Some("streamed".to_string()), Some(Demand::new(10.0, 128)));
    let updated = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("stream stalled")
        .expect("stream ended");
    assert_eq!(updated.processes.len(), 1);
    assert_eq!(updated.processes[0].name, "streamed");

    task.shutdown().await;
}

#[tokio::test]
async fn test_interval_ticks_advance_time() {
    let config = SimConfig::default().with_tick_interval(Duration::from_millis(5));
    let task = SimulationTask::spawn(shared(config));
    let mut rx = task.snapshots();

    wait_until(&mut rx, |s| s.tick >= 3).await;

    task.shutdown().await;
}

#[tokio::test]
async fn test_pause_stops_the_clock() {
    let config = SimConfig::default().with_tick_interval(Duration::from_millis(5));
    let sim = shared(config);
    let task = SimulationTask::spawn(Arc::clone(&sim));
    let mut rx = task.snapshots();

    wait_until(&mut rx, |s| s.tick >= 1).await;
    task.pause();

    // commands are processed in order, so after this publish the pause
    // is in effect
    task.add_process(None, Some(Demand::new(5.0, 64)));
    wait_until(&mut rx, |s| !s.processes.is_empty()).await;

    let frozen = sim.read().now();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(sim.read().now(), frozen);

    task.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_publishing() {
    let config = SimConfig::default().with_tick_interval(Duration::from_millis(5));
    let task = SimulationTask::spawn(shared(config));
    let mut rx = task.snapshots();
    wait_until(&mut rx, |s| s.tick >= 1).await;

    task.shutdown().await;

    // the channel is closed once the loop exits
    assert!(rx.changed().await.is_err());
}
