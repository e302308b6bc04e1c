/*!
 * Core Module
 * Fundamental simulator types and error handling
 */

pub mod errors;
pub mod limits;
pub mod serde;
pub mod types;

// Re-export for convenience
pub use errors::{ConfigError, SimulationError};
pub use types::{Demand, Pid, SimResult, Ticks};
