//! Domain-specific configuration modules

pub mod catalog;
pub mod load;
pub mod logging;
pub mod scoring;
pub mod synthetic;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main Verdict configuration combining all domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VerdictConfig {
    /// Load run shape
    #[serde(default)]
    pub load: load::LoadConfig,

    /// Scenario catalog
    #[serde(default)]
    pub catalog: catalog::CatalogConfig,

    /// Synthetic executor latency/failure model
    #[serde(default)]
    pub synthetic: synthetic::SyntheticConfig,

    /// Scoring tables, weights and breakpoints
    #[serde(default)]
    pub scoring: scoring::ScoringConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl VerdictConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.load.validate()?;
        self.catalog.validate()?;
        self.synthetic.validate()?;
        self.scoring.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = VerdictConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
