//! Load run configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::validation::{Validatable, validate_positive};
use crate::error::ConfigResult;

/// Shape of a simulated load run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Number of simulated user sessions
    #[serde(default = "default_session_count")]
    pub session_count: usize,

    /// Maximum number of sessions running at once
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Deadline for a single action before it is recorded as a timeout
    #[serde(with = "humantime_serde", default = "default_action_timeout")]
    pub action_timeout: Duration,

    /// Cadence of the resource sampler
    #[serde(with = "humantime_serde", default = "default_sample_interval")]
    pub sample_interval: Duration,

    /// How long the resource sampler keeps sampling, independent of sessions
    #[serde(with = "humantime_serde", default = "default_sample_duration")]
    pub sample_duration: Duration,

    /// Optional deadline for the whole run
    #[serde(with = "humantime_serde", default, skip_serializing_if = "Option::is_none")]
    pub run_deadline: Option<Duration>,

    /// Seed for scenario selection; a fresh seed is drawn when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            session_count: default_session_count(),
            concurrency_limit: default_concurrency_limit(),
            action_timeout: default_action_timeout(),
            sample_interval: default_sample_interval(),
            sample_duration: default_sample_duration(),
            run_deadline: None,
            seed: None,
        }
    }
}

impl Validatable for LoadConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.concurrency_limit, "concurrency_limit", self.domain_name())?;

        validate_positive(
            self.action_timeout.as_millis(),
            "action_timeout",
            self.domain_name(),
        )?;

        validate_positive(
            self.sample_interval.as_millis(),
            "sample_interval",
            self.domain_name(),
        )?;

        if let Some(deadline) = self.run_deadline {
            validate_positive(deadline.as_millis(), "run_deadline", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "load"
    }
}

// Default value functions
fn default_session_count() -> usize {
    50
}

fn default_concurrency_limit() -> usize {
    10
}

fn default_action_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_sample_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_sample_duration() -> Duration {
    Duration::from_secs(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_defaults() {
        let config = LoadConfig::default();
        assert_eq!(config.session_count, 50);
        assert_eq!(config.concurrency_limit, 10);
        assert_eq!(config.sample_interval, Duration::from_millis(500));
        assert!(config.run_deadline.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_validation() {
        let mut config = LoadConfig::default();
        config.concurrency_limit = 0;
        assert!(config.validate().is_err());

        let mut config = LoadConfig::default();
        config.sample_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = LoadConfig::default();
        config.run_deadline = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_sessions_is_allowed() {
        let config = LoadConfig {
            session_count: 0,
            ..LoadConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_humantime_durations() {
        let yaml = r#"
session_count: 500
action_timeout: 2s
sample_interval: 250ms
run_deadline: 1m
seed: 42
"#;
        let config: LoadConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.session_count, 500);
        assert_eq!(config.action_timeout, Duration::from_secs(2));
        assert_eq!(config.sample_interval, Duration::from_millis(250));
        assert_eq!(config.run_deadline, Some(Duration::from_secs(60)));
        assert_eq!(config.seed, Some(42));
        // untouched fields keep their defaults
        assert_eq!(config.concurrency_limit, 10);
    }
}
