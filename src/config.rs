use serde::Deserialize;
use std::time::Duration;

use crate::models::{DEFAULT_HISTORY_CAPACITY, DEFAULT_TEMPERATURE_ALERT_CELSIUS};
use crate::poller::PollerConfig;
use crate::source::MockSourceConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub polling: PollingConfig,
    pub source: SourceConfig,
    pub publishing: PublishingConfig,
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    pub interval_ms: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Fire the first tick on activation instead of one interval later.
    #[serde(default = "default_fire_on_start")]
    pub fire_on_start: bool,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_fire_on_start() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Simulated latency of the mock source.
    pub delay_ms: u64,
    /// Probability in 0..=1 that a mock fetch fails.
    #[serde(default)]
    pub failure_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of views kept in the broadcast channel for /ws/telemetry (slow clients may lag).
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log poller stats (ticks succeeded/failed, subscribers) at INFO level.
    pub stats_log_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_temperature_alert_celsius")]
    pub temperature_alert_celsius: f64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            temperature_alert_celsius: default_temperature_alert_celsius(),
        }
    }
}

fn default_temperature_alert_celsius() -> f64 {
    DEFAULT_TEMPERATURE_ALERT_CELSIUS
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.polling.interval_ms > 0,
            "polling.interval_ms must be > 0, got {}",
            self.polling.interval_ms
        );
        anyhow::ensure!(
            self.polling.history_capacity > 0,
            "polling.history_capacity must be > 0, got {}",
            self.polling.history_capacity
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.source.failure_rate),
            "source.failure_rate must be within 0..=1, got {}",
            self.source.failure_rate
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.status.temperature_alert_celsius.is_finite(),
            "status.temperature_alert_celsius must be finite, got {}",
            self.status.temperature_alert_celsius
        );
        if self.source.delay_ms >= self.polling.interval_ms {
            tracing::warn!(
                delay_ms = self.source.delay_ms,
                interval_ms = self.polling.interval_ms,
                "source delay exceeds polling interval; ticks will be skipped"
            );
        }
        Ok(())
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(self.polling.interval_ms),
            history_capacity: self.polling.history_capacity,
            fire_on_start: self.polling.fire_on_start,
            broadcast_capacity: self.publishing.broadcast_capacity,
            stats_log_interval: Duration::from_secs(self.monitoring.stats_log_interval_secs),
        }
    }

    pub fn mock_source_config(&self) -> MockSourceConfig {
        MockSourceConfig {
            delay: Duration::from_millis(self.source.delay_ms),
            failure_rate: self.source.failure_rate,
        }
    }
}
