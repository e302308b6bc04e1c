/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors with serialization support
///
/// Admission rejection is NOT an error: a process that cannot be admitted
/// becomes `Waiting`, which is a modeled outcome. Errors exist only for
/// invalid configuration handed to the simulator before it runs.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Tick interval must be non-zero")]
    #[diagnostic(
        code(config::invalid_tick_interval),
        help("Set the tick interval to a positive duration, e.g. 450ms.")
    )]
    InvalidTickInterval,

    #[error("Progress scale must be positive and finite, got {0}")]
    #[diagnostic(
        code(config::invalid_progress_scale),
        help("Progress per tick is demand.cpu * scale; the scale must be > 0.")
    )]
    InvalidProgressScale(f64),

    #[error("Pool capacity must be positive and finite, got {cpu} cpu / {memory_mb} MB")]
    #[diagnostic(
        code(config::invalid_capacity),
        help("Defaults are 100% cpu and 2048 MB; both totals must be > 0.")
    )]
    InvalidCapacity { cpu: f64, memory_mb: u64 },

    #[error("Invalid cpu demand range: min {min} > max {max}")]
    #[diagnostic(
        code(config::invalid_cpu_range),
        help("Random cpu demand is drawn from [min, max]; min must not exceed max.")
    )]
    InvalidCpuRange { min: f64, max: f64 },

    #[error("Invalid memory demand range: min {min} MB > max {max} MB")]
    #[diagnostic(
        code(config::invalid_memory_range),
        help("Random memory demand is drawn from [min, max]; min must not exceed max.")
    )]
    InvalidMemoryRange { min: u64, max: u64 },
}

/// Unified simulator error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    #[diagnostic(
        code(sim::internal_error),
        help("An unexpected internal error occurred. Please report this issue.")
    )]
    Internal(String),
}

// Implement conversion from String for convenience
impl From<String> for SimulationError {
    fn from(msg: String) -> Self {
        SimulationError::Internal(msg)
    }
}

impl From<&str> for SimulationError {
    fn from(msg: &str) -> Self {
        SimulationError::Internal(msg.to_string())
    }
}
