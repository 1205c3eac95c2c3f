//! # Configuration
//!
//! Intervals and limits are plain values, independent of any frame rate.
//! Defaults can be overridden from JSON or from `ORCHESTRATOR_*` environment
//! variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ORCHESTRATOR_HEALTH_CHECK_INTERVAL_MS` | `health_check_interval_ms` |
//! | `ORCHESTRATOR_MESSAGE_TIMEOUT_MS` | `message_timeout_ms` |
//! | `ORCHESTRATOR_MAX_QUEUE_SIZE` | `max_queue_size` |
//! | `ORCHESTRATOR_ROUTING_ENABLED` | `routing_enabled` |
//! | `ORCHESTRATOR_HEALTH_MONITORING_ENABLED` | `health_monitoring_enabled` |
//! | `ORCHESTRATOR_OVERFLOW_POLICY` | `overflow_policy` (`process_immediately` or `reject`) |
//! | `ORCHESTRATOR_TICK_INTERVAL_MS` | `tick_interval_ms` |
//! | `ORCHESTRATOR_REQUEST_BUFFER` | `request_buffer` |

use crate::error::ConfigError;
use crate::router::OverflowPolicy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

const ENV_PREFIX: &str = "ORCHESTRATOR_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub health_check_interval_ms: u64,
    pub message_timeout_ms: u64,
    pub max_queue_size: usize,
    pub routing_enabled: bool,
    pub health_monitoring_enabled: bool,
    pub overflow_policy: OverflowPolicy,
    /// Cadence at which the actor calls `tick()`.
    pub tick_interval_ms: u64,
    /// Capacity of the actor's request channel.
    pub request_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            health_check_interval_ms: 5_000,
            message_timeout_ms: 5_000,
            max_queue_size: 100,
            routing_enabled: true,
            health_monitoring_enabled: true,
            overflow_policy: OverflowPolicy::ProcessImmediately,
            tick_interval_ms: 100,
            request_buffer: 32,
        }
    }
}

impl OrchestratorConfig {
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with any `ORCHESTRATOR_*` variables in the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`, keyed by full variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let var = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value))
        };

        if let Some((k, v)) = var("HEALTH_CHECK_INTERVAL_MS") {
            config.health_check_interval_ms = parse(&k, &v)?;
        }
        if let Some((k, v)) = var("MESSAGE_TIMEOUT_MS") {
            config.message_timeout_ms = parse(&k, &v)?;
        }
        if let Some((k, v)) = var("MAX_QUEUE_SIZE") {
            config.max_queue_size = parse(&k, &v)?;
        }
        if let Some((k, v)) = var("ROUTING_ENABLED") {
            config.routing_enabled = parse(&k, &v)?;
        }
        if let Some((k, v)) = var("HEALTH_MONITORING_ENABLED") {
            config.health_monitoring_enabled = parse(&k, &v)?;
        }
        if let Some((k, v)) = var("OVERFLOW_POLICY") {
            config.overflow_policy = match v.trim().to_ascii_lowercase().as_str() {
                "process_immediately" => OverflowPolicy::ProcessImmediately,
                "reject" => OverflowPolicy::Reject,
                _ => return Err(ConfigError::InvalidValue { key: k, value: v }),
            };
        }
        if let Some((k, v)) = var("TICK_INTERVAL_MS") {
            config.tick_interval_ms = parse(&k, &v)?;
        }
        if let Some((k, v)) = var("REQUEST_BUFFER") {
            config.request_buffer = parse(&k, &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_queue_size == 0 {
            return Err(ConfigError::Invalid("max_queue_size must be at least 1".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be positive".into()));
        }
        if self.request_buffer == 0 {
            return Err(ConfigError::Invalid("request_buffer must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
