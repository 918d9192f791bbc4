use crate::constants::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_HOPS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of hops the path finder may chain.
    pub max_hops: u8,
    /// Timeout for a single venue snapshot fetch in seconds.
    pub fetch_timeout_secs: u64,
    /// Capacity of each per-chain block trigger channel.
    pub block_trigger_capacity: usize,
    /// Optional TOML file describing the configured cross-chain routes.
    pub route_config_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            block_trigger_capacity: 16,
            route_config_path: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults. A `.env` file in the working directory is honored.
    pub fn from_env() -> eyre::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(max_hops) = std::env::var("EXCHANGE_MAX_HOPS") {
            config.max_hops =
                max_hops.parse().map_err(|e| eyre::eyre!("Invalid EXCHANGE_MAX_HOPS: {}", e))?;
        }

        if let Ok(timeout) = std::env::var("EXCHANGE_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout_secs = timeout
                .parse()
                .map_err(|e| eyre::eyre!("Invalid EXCHANGE_FETCH_TIMEOUT_SECS: {}", e))?;
        }

        if let Ok(capacity) = std::env::var("EXCHANGE_BLOCK_TRIGGER_CAPACITY") {
            config.block_trigger_capacity = capacity
                .parse()
                .map_err(|e| eyre::eyre!("Invalid EXCHANGE_BLOCK_TRIGGER_CAPACITY: {}", e))?;
        }

        if let Ok(path) = std::env::var("EXCHANGE_ROUTE_CONFIG") {
            config.route_config_path = Some(path);
        }

        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
