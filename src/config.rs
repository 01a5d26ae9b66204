use anyhow::{Result, anyhow};
use std::time::Duration;

/// Backoff policy for SSE reconnects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect attempt.
    pub initial: Duration,
    /// Upper bound on the delay between attempts.
    pub max: Duration,
    /// Multiplier applied after each failed attempt.
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl ReconnectPolicy {
    /// Delay to use after `attempt` consecutive failures (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.min(16) as i32);
        let millis = (self.initial.as_millis() as f64 * factor) as u64;
        Duration::from_millis(millis).min(self.max)
    }
}

/// Runtime configuration for the benchstock client.
///
/// `base_url` points at the REST backend; `events_path` is appended to it
/// for the unified SSE stream.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub events_path: String,
    pub reconnect: ReconnectPolicy,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Build a config for the given backend, applying environment overrides
    /// (`BENCHSTOCK_BASE_URL`, `BENCHSTOCK_EVENTS_PATH`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = std::env::var("BENCHSTOCK_BASE_URL").unwrap_or_else(|_| base_url.into());
        let events_path =
            std::env::var("BENCHSTOCK_EVENTS_PATH").unwrap_or_else(|_| "/api/events".to_string());
        Self::with_values(base_url, events_path)
    }

    /// Build a config from explicit values, skipping environment lookups.
    pub fn with_values(base_url: impl Into<String>, events_path: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let events_path = events_path.into();
        if base_url.is_empty() {
            return Err(anyhow!("base_url must not be empty"));
        }
        if !events_path.starts_with('/') {
            return Err(anyhow!("events_path must start with '/'"));
        }
        Ok(Self {
            // Trailing slashes would double up when joining paths
            base_url: base_url.trim_end_matches('/').to_string(),
            events_path,
            reconnect: ReconnectPolicy::default(),
            request_timeout: Duration::from_secs(30),
        })
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Absolute URL of the SSE event stream.
    pub fn events_url(&self) -> String {
        format!("{}{}", self.base_url, self.events_path)
    }

    /// Absolute URL for an API path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_trims_trailing_slash() {
        let config = ClientConfig::with_values("http://localhost:8080/", "/api/events").unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.events_url(), "http://localhost:8080/api/events");
    }

    #[test]
    fn config_rejects_empty_base_url() {
        assert!(ClientConfig::with_values("", "/api/events").is_err());
    }

    #[test]
    fn config_rejects_relative_events_path() {
        assert!(ClientConfig::with_values("http://h", "api/events").is_err());
    }

    #[test]
    fn url_for_joins_paths() {
        let config = ClientConfig::with_values("http://h", "/api/events").unwrap();
        assert_eq!(config.url_for("/api/parts"), "http://h/api/parts");
    }

    #[test]
    fn reconnect_delay_grows_and_caps() {
        let policy = ReconnectPolicy {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(1),
            multiplier: 2.0,
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        // Capped at max
        assert_eq!(policy.delay_for(10), Duration::from_secs(1));
    }
}
