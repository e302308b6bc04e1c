/*!
 * Process Module
 * Process lifecycle and the insertion-ordered process table
 */

pub mod table;
pub mod types;

// Re-export for convenience
pub use table::ProcessTable;
pub use types::{ProcessRecord, ProcessSnapshot, ProcessState};
