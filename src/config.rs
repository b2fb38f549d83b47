//! Orchestrator configuration.
//!
//! Loaded from a TOML file with environment fallback, defaulting to values
//! that match production behavior. All fields are optional in the file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Price granularity used when bucketing winning bid values for targeting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceGranularity {
    /// 0.50 increments, capped at 5.00.
    Low,
    /// 0.10 increments, capped at 20.00.
    Medium,
    /// 0.01 increments, capped at 20.00.
    High,
}

impl Default for PriceGranularity {
    fn default() -> Self {
        Self::Medium
    }
}

impl PriceGranularity {
    /// (increment, cap) for bucket computation.
    pub fn step_and_cap(&self) -> (f64, f64) {
        match self {
            Self::Low => (0.50, 5.0),
            Self::Medium => (0.10, 20.0),
            Self::High => (0.01, 20.0),
        }
    }
}

/// Cookie/state sync behavior after an auction completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSyncConfig {
    /// Disable to opt out of the automatic post-auction sync pass.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Delay before the sync pass runs.
    #[serde(default = "default_sync_delay_ms")]
    pub delay_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_sync_delay_ms() -> u64 {
    3000
}

impl Default for UserSyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: default_sync_delay_ms(),
        }
    }
}

/// Orchestrator-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Concurrent in-flight request cap per destination endpoint.
    #[serde(default = "default_max_requests_per_destination")]
    pub max_requests_per_destination: usize,

    /// Grace period added to the auction timeout before the timer forces
    /// completion.
    #[serde(default = "default_timeout_buffer_ms")]
    pub timeout_buffer_ms: u64,

    /// Default auction timeout when the caller does not supply one.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    #[serde(default)]
    pub user_sync: UserSyncConfig,

    #[serde(default)]
    pub price_granularity: PriceGranularity,

    /// Capacity of the notification broadcast channel.
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

fn default_max_requests_per_destination() -> usize {
    21
}

fn default_timeout_buffer_ms() -> u64 {
    400
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_event_bus_capacity() -> usize {
    256
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_requests_per_destination: default_max_requests_per_destination(),
            timeout_buffer_ms: default_timeout_buffer_ms(),
            default_timeout_ms: default_timeout_ms(),
            user_sync: UserSyncConfig::default(),
            price_granularity: PriceGranularity::default(),
            event_bus_capacity: default_event_bus_capacity(),
        }
    }
}

impl OrchestratorConfig {
    /// Load from TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from the path in `BIDHUB_CONFIG_PATH`, or defaults.
    pub fn from_env() -> Self {
        let path =
            std::env::var("BIDHUB_CONFIG_PATH").unwrap_or_else(|_| "bidhub.toml".to_string());

        Self::load(&path).unwrap_or_else(|e| {
            tracing::debug!("Using default orchestrator config ({}): {}", path, e);
            Self::default()
        })
    }

    pub fn timeout_buffer(&self) -> Duration {
        Duration::from_millis(self.timeout_buffer_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn user_sync_delay(&self) -> Duration {
        Duration::from_millis(self.user_sync.delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_values() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_requests_per_destination, 21);
        assert_eq!(config.timeout_buffer_ms, 400);
        assert!(config.user_sync.enabled);
        assert_eq!(config.price_granularity, PriceGranularity::Medium);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: OrchestratorConfig = toml::from_str(
            r#"
            max_requests_per_destination = 4

            [user_sync]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.max_requests_per_destination, 4);
        assert!(!config.user_sync.enabled);
        assert_eq!(config.timeout_buffer_ms, 400);
    }
}
