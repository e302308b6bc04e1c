/*!
 * Resource Allocation Simulator Library
 * Admission-controlled process simulation exposed as a library
 */

pub mod core;
pub mod demand;
pub mod pool;
pub mod process;
pub mod sim;
pub mod tracer;

// Re-exports
pub use crate::core::{ConfigError, Demand, Pid, SimResult, SimulationError, Ticks};
pub use demand::{DemandRange, DemandSource, RandomDemand, ScriptedDemand};
pub use pool::{PoolPressure, PoolSnapshot, ResourcePool};
pub use process::{ProcessSnapshot, ProcessState, ProcessTable};
pub use sim::{
    Collector, Event, Payload, SimCommand, SimConfig, SimSnapshot, SimStats, Simulation,
    SimulationTask, TickOutcome,
};
pub use tracer::init_tracing;
