//! Synthetic executor configuration
//!
//! Latency and failure model used when sessions are executed against a
//! simulated target rather than a real one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use crate::validation::{Validatable, validate_fraction, validate_required_string};
use crate::error::ConfigResult;

/// Latency/failure profile for one action kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionProfile {
    /// Minimum latency of the action
    #[serde(with = "humantime_serde")]
    pub base_latency: Duration,

    /// Upper bound of the uniform random latency added on top
    #[serde(with = "humantime_serde", default)]
    pub jitter: Duration,

    /// Probability that the action succeeds
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
}

impl ActionProfile {
    pub fn new(base_latency: Duration, jitter: Duration, success_rate: f64) -> Self {
        Self {
            base_latency,
            jitter,
            success_rate,
        }
    }
}

/// Synthetic executor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Profile used for action kinds without an explicit entry
    #[serde(default = "default_profile")]
    pub default_profile: ActionProfile,

    /// Profiles keyed by action kind
    #[serde(default = "default_profiles")]
    pub profiles: BTreeMap<String, ActionProfile>,

    /// Seed for latency and failure draws; falls back to the load seed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SyntheticConfig {
    /// Profile for an action kind, falling back to the default profile
    pub fn profile_for(&self, kind: &str) -> &ActionProfile {
        self.profiles.get(kind).unwrap_or(&self.default_profile)
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            default_profile: default_profile(),
            profiles: default_profiles(),
            seed: None,
        }
    }
}

impl Validatable for SyntheticConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.default_profile.validate()?;
        for (kind, profile) in &self.profiles {
            validate_required_string(kind, "action kind", self.domain_name())?;
            profile.validate()?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "synthetic"
    }
}

impl Validatable for ActionProfile {
    fn validate(&self) -> ConfigResult<()> {
        validate_fraction(self.success_rate, "success_rate", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "synthetic.profile"
    }
}

// Default value functions
fn default_success_rate() -> f64 {
    1.0
}

fn default_profile() -> ActionProfile {
    ActionProfile::new(Duration::from_millis(20), Duration::from_millis(80), 0.95)
}

fn default_profiles() -> BTreeMap<String, ActionProfile> {
    let ms = Duration::from_millis;
    let mut profiles = BTreeMap::new();
    profiles.insert("login".to_string(), ActionProfile::new(ms(150), ms(250), 0.99));
    profiles.insert("view_dashboard".to_string(), ActionProfile::new(ms(80), ms(200), 0.98));
    profiles.insert("view_revenue".to_string(), ActionProfile::new(ms(60), ms(150), 0.95));
    profiles.insert("add_expense".to_string(), ActionProfile::new(ms(120), ms(300), 0.90));
    profiles.insert("view_reports".to_string(), ActionProfile::new(ms(200), ms(400), 0.95));
    profiles.insert("view_requests".to_string(), ActionProfile::new(ms(60), ms(120), 0.97));
    profiles
}
