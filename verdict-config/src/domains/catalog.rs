//! Scenario catalog configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use verdict_core::{ActionStep, Scenario};
use crate::validation::{Validatable, validate_positive, validate_required_string};
use crate::error::ConfigResult;

/// The fixed table of named scenarios a run draws sessions from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<Scenario>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            scenarios: default_scenarios(),
        }
    }
}

impl Validatable for CatalogConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.scenarios.is_empty() {
            return Err(self.validation_error("at least one scenario must be configured"));
        }

        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            validate_required_string(&scenario.name, "scenario name", self.domain_name())?;
            validate_positive(
                scenario.weight,
                &format!("weight of scenario '{}'", scenario.name),
                self.domain_name(),
            )?;
            if !scenario.weight.is_finite() {
                return Err(self.validation_error(format!(
                    "weight of scenario '{}' must be finite",
                    scenario.name
                )));
            }
            if !seen.insert(scenario.name.as_str()) {
                return Err(self.validation_error(format!(
                    "duplicate scenario name '{}'",
                    scenario.name
                )));
            }
            for step in &scenario.actions {
                validate_required_string(&step.kind, "action kind", self.domain_name())?;
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "catalog"
    }
}

fn scenario(name: &str, weight: f64, kinds: &[&str]) -> Scenario {
    Scenario::new(
        name,
        weight,
        kinds.iter().map(|kind| ActionStep::new(*kind)).collect(),
    )
}

// Dashboard-first sessions, weighted towards read traffic
fn default_scenarios() -> Vec<Scenario> {
    vec![
        scenario("revenue_review", 0.4, &["login", "view_dashboard", "view_revenue"]),
        scenario("expense_entry", 0.3, &["login", "view_dashboard", "add_expense"]),
        scenario("reporting", 0.2, &["login", "view_dashboard", "view_reports"]),
        scenario("request_triage", 0.1, &["login", "view_dashboard", "view_requests"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let config = CatalogConfig::default();
        assert_eq!(config.scenarios.len(), 4);
        assert!(config.validate().is_ok());

        let total: f64 = config.scenarios.iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_catalog_rejects_bad_weights() {
        let mut config = CatalogConfig::default();
        config.scenarios[1].weight = 0.0;
        assert!(config.validate().is_err());

        let mut config = CatalogConfig::default();
        config.scenarios[0].weight = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_catalog_rejects_empty_and_duplicates() {
        let config = CatalogConfig { scenarios: Vec::new() };
        assert!(config.validate().is_err());

        let mut config = CatalogConfig::default();
        config.scenarios[1].name = config.scenarios[0].name.clone();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate scenario name"));
    }
}
