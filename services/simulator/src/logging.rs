//! Logging setup for the simulator binary

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
pub fn default_filter(level: &str) -> String {
    format!("hs_simulator={level},hs_election={level},warn")
}

/// Install the global subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(level)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install JSON logger: {e}"))?;
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_both_crates() {
        let filter = default_filter("debug");
        assert!(filter.contains("hs_simulator=debug"));
        assert!(filter.contains("hs_election=debug"));
        assert!(EnvFilter::try_new(filter).is_ok());
    }
}
