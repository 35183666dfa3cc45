//! Simulator Configuration
//!
//! Settings are read from a TOML (or JSON, by extension) file and then
//! overridden by command-line flags.
//!
//! ```toml
//! ring_size = 64
//! runs = 10
//! seed = 7                    # omit for a fresh random arrangement each run
//! election_timeout_ms = 5000  # omit to wait indefinitely
//! log_level = "info"
//! json_logs = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of processes on the ring
    pub ring_size: usize,
    /// Elections to run back to back
    pub runs: usize,
    /// Base seed; run `k` uses `seed + k`
    pub seed: Option<u64>,
    pub election_timeout_ms: Option<u64>,
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ring_size: 8,
            runs: 1,
            seed: None,
            election_timeout_ms: None,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl SimulationConfig {
    /// Load from a `.toml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&contents)?
        } else {
            // Default to TOML
            toml::from_str(&contents)?
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ring_size == 0 {
            return Err(ConfigError::Invalid {
                field: "ring_size",
                message: "ring needs at least one process".to_string(),
            });
        }

        if self.runs == 0 {
            return Err(ConfigError::Invalid {
                field: "runs",
                message: "at least one run is required".to_string(),
            });
        }

        if self.election_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "election_timeout_ms",
                message: "timeout must be positive".to_string(),
            });
        }

        Ok(())
    }

    pub fn election_timeout(&self) -> Option<Duration> {
        self.election_timeout_ms.map(Duration::from_millis)
    }

    /// Seed for run number `run`, if runs are reproducible
    pub fn seed_for_run(&self, run: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(run as u64))
    }
}
