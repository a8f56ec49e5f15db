//! Weighted scenario selection

use rand::Rng;
use verdict_core::{Result, Scenario, VerdictError};

/// Check that a catalog can be sampled from
pub fn validate_catalog(catalog: &[Scenario]) -> Result<()> {
    if catalog.is_empty() {
        return Err(VerdictError::InvalidCatalog(
            "catalog contains no scenarios".to_string(),
        ));
    }

    for scenario in catalog {
        if !(scenario.weight > 0.0) || !scenario.weight.is_finite() {
            return Err(VerdictError::InvalidCatalog(format!(
                "scenario '{}' has unusable weight {}",
                scenario.name, scenario.weight
            )));
        }
    }

    Ok(())
}

/// Picks scenarios in proportion to their weights.
///
/// Cumulative weights are computed once, in catalog order, so a given catalog
/// and random draw always map to the same scenario.
#[derive(Debug, Clone)]
pub struct ScenarioSelector<'a> {
    catalog: &'a [Scenario],
    cumulative: Vec<f64>,
    total_weight: f64,
}

impl<'a> ScenarioSelector<'a> {
    pub fn new(catalog: &'a [Scenario]) -> Result<Self> {
        validate_catalog(catalog)?;

        let mut running = 0.0;
        let cumulative: Vec<f64> = catalog
            .iter()
            .map(|scenario| {
                running += scenario.weight;
                running
            })
            .collect();

        if !running.is_finite() {
            return Err(VerdictError::InvalidCatalog(
                "total scenario weight overflows".to_string(),
            ));
        }

        Ok(Self {
            catalog,
            cumulative,
            total_weight: running,
        })
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Catalog index of the next scenario
    pub fn select_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if self.catalog.len() == 1 {
            return 0;
        }

        let r = rng.random_range(0.0..self.total_weight);
        let index = self.cumulative.partition_point(|&cumulative| cumulative <= r);

        // Rounding in the running sum can leave r just past the last bound
        index.min(self.catalog.len() - 1)
    }

    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> &'a Scenario {
        &self.catalog[self.select_index(rng)]
    }
}

/// One-shot selection without keeping a selector around
pub fn select_scenario<'a, R: Rng + ?Sized>(
    catalog: &'a [Scenario],
    rng: &mut R,
) -> Result<&'a Scenario> {
    Ok(ScenarioSelector::new(catalog)?.select(rng))
}
