//! Hirschberg-Sinclair ring election simulator
//!
//! Builds rings, runs elections through `hs-election` and reports message
//! counts for single runs or averaged over many.

pub mod config;
pub mod harness;
pub mod logging;

pub use config::{ConfigError, SimulationConfig};
pub use harness::{run_simulation, RunRecord, RunStatistics};
pub use logging::init_logging;
