//! One-call evaluation of a run: category scores, composite and gates

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use verdict_config::ScoringConfig;
use verdict_core::{FindingRegistry, Result};

use crate::category::{CategoryScore, CategoryScorer, MetricSource};
use crate::composite::{CompositeScore, CompositeScorer};
use crate::readiness::{assess, ReadinessAssessment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub categories: Vec<CategoryScore>,
    pub composite: CompositeScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gates: Option<ReadinessAssessment>,
}

impl Scorecard {
    /// Score every weighted category, compose them and check the gates.
    ///
    /// Only weight misconfiguration can fail here.
    pub fn evaluate(
        config: &ScoringConfig,
        registry: &FindingRegistry,
        load: Option<&dyn MetricSource>,
        measurements: &BTreeMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let categories = CategoryScorer::new(config.clone()).score_categories(
            registry,
            load,
            measurements,
        );
        let composite = CompositeScorer::from_config(config).compose(&categories)?;
        let gates = config
            .readiness_gates
            .as_ref()
            .map(|gates| assess(&composite, gates));

        Ok(Self {
            categories,
            composite,
            gates,
        })
    }
}
