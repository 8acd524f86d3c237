//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use std::time::Duration;
use tracing::warn;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Budget for application create (including an optional start) in seconds
    pub create_timeout_secs: u64,
    /// Budget for each wait inside an application update in seconds
    pub update_timeout_secs: u64,
    /// Budget for application delete (including an optional stop) in seconds
    pub delete_timeout_secs: u64,
    /// Budget for a snapshot to become READY in seconds
    pub snapshot_create_timeout_secs: u64,
    /// Budget for a snapshot to disappear in seconds
    pub snapshot_delete_timeout_secs: u64,
    /// Window in which IAM propagation errors are retried, in seconds
    pub propagation_timeout_secs: u64,
    /// Shortest pause between polls (milliseconds)
    pub poll_min_interval_ms: u64,
    /// Longest pause between polls (milliseconds)
    pub poll_max_interval_ms: u64,
    /// Pause before the first poll (milliseconds)
    pub poll_initial_delay_ms: u64,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
    /// AWS region override; `None` uses the SDK default provider chain
    pub region: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            create_timeout_secs: DEFAULT_APPLICATION_CREATE_TIMEOUT_SECS,
            update_timeout_secs: DEFAULT_APPLICATION_UPDATE_TIMEOUT_SECS,
            delete_timeout_secs: DEFAULT_APPLICATION_DELETE_TIMEOUT_SECS,
            snapshot_create_timeout_secs: DEFAULT_SNAPSHOT_CREATE_TIMEOUT_SECS,
            snapshot_delete_timeout_secs: DEFAULT_SNAPSHOT_DELETE_TIMEOUT_SECS,
            propagation_timeout_secs: DEFAULT_IAM_PROPAGATION_TIMEOUT_SECS,
            poll_min_interval_ms: DEFAULT_POLL_MIN_INTERVAL_MS,
            poll_max_interval_ms: DEFAULT_POLL_MAX_INTERVAL_MS,
            poll_initial_delay_ms: DEFAULT_POLL_INITIAL_DELAY_MS,
            log_level: "INFO".to_string(),
            log_format: "text".to_string(),
            region: None,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        use crate::constants::*;
        Self {
            create_timeout_secs: env_var_or_default(
                "APPLICATION_CREATE_TIMEOUT_SECS",
                DEFAULT_APPLICATION_CREATE_TIMEOUT_SECS,
            ),
            update_timeout_secs: env_var_or_default(
                "APPLICATION_UPDATE_TIMEOUT_SECS",
                DEFAULT_APPLICATION_UPDATE_TIMEOUT_SECS,
            ),
            delete_timeout_secs: env_var_or_default(
                "APPLICATION_DELETE_TIMEOUT_SECS",
                DEFAULT_APPLICATION_DELETE_TIMEOUT_SECS,
            ),
            snapshot_create_timeout_secs: env_var_or_default(
                "SNAPSHOT_CREATE_TIMEOUT_SECS",
                DEFAULT_SNAPSHOT_CREATE_TIMEOUT_SECS,
            ),
            snapshot_delete_timeout_secs: env_var_or_default(
                "SNAPSHOT_DELETE_TIMEOUT_SECS",
                DEFAULT_SNAPSHOT_DELETE_TIMEOUT_SECS,
            ),
            propagation_timeout_secs: env_var_or_default(
                "IAM_PROPAGATION_TIMEOUT_SECS",
                DEFAULT_IAM_PROPAGATION_TIMEOUT_SECS,
            ),
            poll_min_interval_ms: env_var_at_least(
                "POLL_MIN_INTERVAL_MS",
                MIN_POLL_INTERVAL_MS,
                DEFAULT_POLL_MIN_INTERVAL_MS,
            ),
            poll_max_interval_ms: env_var_or_default(
                "POLL_MAX_INTERVAL_MS",
                DEFAULT_POLL_MAX_INTERVAL_MS,
            ),
            poll_initial_delay_ms: env_var_or_default(
                "POLL_INITIAL_DELAY_MS",
                DEFAULT_POLL_INITIAL_DELAY_MS,
            ),
            log_level: env_var_or_default_str("LOG_LEVEL", "INFO"),
            log_format: env_var_or_default_str("LOG_FORMAT", "text"),
            region: std::env::var("AWS_REGION").ok().filter(|r| !r.is_empty()),
        }
    }

    /// Get application create timeout
    #[must_use]
    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_secs)
    }

    /// Get application update timeout
    #[must_use]
    pub fn update_timeout(&self) -> Duration {
        Duration::from_secs(self.update_timeout_secs)
    }

    /// Get application delete timeout
    #[must_use]
    pub fn delete_timeout(&self) -> Duration {
        Duration::from_secs(self.delete_timeout_secs)
    }

    /// Get snapshot create timeout
    #[must_use]
    pub fn snapshot_create_timeout(&self) -> Duration {
        Duration::from_secs(self.snapshot_create_timeout_secs)
    }

    /// Get snapshot delete timeout
    #[must_use]
    pub fn snapshot_delete_timeout(&self) -> Duration {
        Duration::from_secs(self.snapshot_delete_timeout_secs)
    }

    /// Get IAM propagation retry window
    #[must_use]
    pub fn propagation_timeout(&self) -> Duration {
        Duration::from_secs(self.propagation_timeout_secs)
    }

    /// Get poll settings used by the wait engine
    ///
    /// The minimum interval never drops below [`MIN_POLL_INTERVAL_MS`].
    ///
    /// [`MIN_POLL_INTERVAL_MS`]: crate::constants::MIN_POLL_INTERVAL_MS
    #[must_use]
    pub fn poll_settings(&self) -> PollSettings {
        let min = self
            .poll_min_interval_ms
            .max(crate::constants::MIN_POLL_INTERVAL_MS);
        PollSettings {
            initial_delay: Duration::from_millis(self.poll_initial_delay_ms),
            min_interval: Duration::from_millis(min),
            max_interval: Duration::from_millis(self.poll_max_interval_ms.max(min)),
        }
    }
}

/// Pacing of status polls and retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Pause before the first poll
    pub initial_delay: Duration,
    /// First (and smallest) pause between polls
    pub min_interval: Duration,
    /// Cap on the pause between polls
    pub max_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        ControllerConfig::default().poll_settings()
    }
}

/// Helper function to read environment variable or return default
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring malformed value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

/// Like [`env_var_or_default`], also rejecting values below `floor`
fn env_var_at_least(key: &str, floor: u64, default: u64) -> u64 {
    let value = env_var_or_default(key, default);
    if value < floor {
        warn!("Ignoring {} below {}: {}", key, floor, value);
        return default;
    }
    value
}

/// Helper function to read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let config = ControllerConfig::default();
        assert_eq!(config.create_timeout(), Duration::from_secs(600));
        assert_eq!(config.update_timeout(), Duration::from_secs(600));
        assert_eq!(config.delete_timeout(), Duration::from_secs(600));
        assert_eq!(config.propagation_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_poll_settings_max_never_below_min() {
        let config = ControllerConfig {
            poll_min_interval_ms: 5_000,
            poll_max_interval_ms: 1_000,
            ..ControllerConfig::default()
        };
        let poll = config.poll_settings();
        assert_eq!(poll.min_interval, Duration::from_secs(5));
        assert_eq!(poll.max_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_poll_interval_is_raised_to_floor() {
        let config = ControllerConfig {
            poll_min_interval_ms: 0,
            poll_max_interval_ms: 0,
            ..ControllerConfig::default()
        };
        let poll = config.poll_settings();
        assert_eq!(poll.min_interval, Duration::from_millis(10));
        assert_eq!(poll.max_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_env_var_below_floor_uses_default() {
        std::env::set_var("KAC_TEST_POLL_MIN_INTERVAL_ZERO", "0");
        assert_eq!(
            env_var_at_least("KAC_TEST_POLL_MIN_INTERVAL_ZERO", 10, 1_000),
            1_000
        );
        std::env::set_var("KAC_TEST_POLL_MIN_INTERVAL_OK", "250");
        assert_eq!(env_var_at_least("KAC_TEST_POLL_MIN_INTERVAL_OK", 10, 1_000), 250);
    }

    #[test]
    fn test_env_var_or_default_falls_back_on_garbage() {
        assert_eq!(
            env_var_or_default("KAC_TEST_UNSET_VARIABLE_FOR_DEFAULT", 42_u64),
            42
        );
    }
}
