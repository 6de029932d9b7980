//! Sync configuration
//!
//! [`SyncConfig`] controls feed reconnection and what happens to an
//! optimistic edit whose write fails. Loadable from TOML:
//!
//! ```toml
//! rollback_on_write_failure = false
//!
//! [retry]
//! max_attempts = 5
//! initial_backoff_ms = 500
//! max_backoff_ms = 30000
//! multiplier = 2
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Sync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Restore the pre-edit record when a write fails
    pub rollback_on_write_failure: bool,
    /// Feed resubscription policy
    pub retry: RetryPolicy,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// With rollback on failed writes
    #[inline]
    #[must_use]
    pub fn with_rollback(mut self, enabled: bool) -> Self {
        self.rollback_on_write_failure = enabled;
        self
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// Returns error on malformed TOML or inconsistent values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file is unreadable or invalid
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value consistency
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry.validate()
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            rollback_on_write_failure: false,
            retry: RetryPolicy::default(),
        }
    }
}

/// Exponential backoff for feed resubscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Resubscribe attempts after an error; 0 disables retry
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff_ms: u64,
    /// Upper bound for any delay
    pub max_backoff_ms: u64,
    /// Growth factor between attempts
    pub multiplier: u32,
}

impl RetryPolicy {
    /// Never resubscribe; the feed stays in `Error` after a failure
    #[inline]
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Fixed small delays, for tests
    #[inline]
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff_ms: 1,
            max_backoff_ms: 1,
            multiplier: 1,
        }
    }

    /// Delay before retry number `attempt` (1-based), `None` once exhausted
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let factor = u64::from(self.multiplier).saturating_pow(attempt - 1);
        let delay = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Some(Duration::from_millis(delay))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.multiplier == 0 {
            return Err(ConfigError::Invalid("retry.multiplier must be at least 1".into()));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ConfigError::Invalid(format!(
                "retry.initial_backoff_ms ({}) exceeds retry.max_backoff_ms ({})",
                self.initial_backoff_ms, self.max_backoff_ms
            )));
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            multiplier: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff_ms: 500,
            max_backoff_ms: 3_000,
            multiplier: 2,
        };
        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_for(2), Some(Duration::from_millis(1_000)));
        assert_eq!(policy.delay_for(3), Some(Duration::from_millis(2_000)));
        assert_eq!(policy.delay_for(4), Some(Duration::from_millis(3_000)));
        assert_eq!(policy.delay_for(10), Some(Duration::from_millis(3_000)));
        assert_eq!(policy.delay_for(11), None);
    }

    #[test]
    fn disabled_policy_never_retries() {
        assert_eq!(RetryPolicy::disabled().delay_for(1), None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SyncConfig::from_toml_str("rollback_on_write_failure = true").unwrap();
        assert!(config.rollback_on_write_failure);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn toml_roundtrip() {
        let config = SyncConfig::new()
            .with_rollback(true)
            .with_retry(RetryPolicy::immediate(3));
        let text = config.to_toml_string().unwrap();
        assert_eq!(SyncConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn inconsistent_backoff_rejected() {
        let err = SyncConfig::from_toml_str(
            "[retry]\ninitial_backoff_ms = 9000\nmax_backoff_ms = 10\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retry]\nmax_attempts = 0").unwrap();
        let config = SyncConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.retry.delay_for(1), None);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SyncConfig::from_toml_file("/nonexistent/cradle.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cradle.toml"));
    }
}
