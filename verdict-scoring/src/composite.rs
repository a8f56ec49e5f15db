//! Composite score and readiness classification

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;
use verdict_config::{ReadinessBreakpoints, ScoringConfig};
use verdict_core::{Result, VerdictError};

use crate::category::CategoryScore;

/// Default allowed deviation of the weight sum from 1
pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 1e-6;

/// Deployment readiness derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Readiness {
    Excellent,
    DeployableWithMonitoring,
    NeedsImprovement,
    NotDeployable,
}

impl Readiness {
    pub fn classify(overall: f64, breakpoints: &ReadinessBreakpoints) -> Self {
        if overall >= breakpoints.excellent {
            Readiness::Excellent
        } else if overall >= breakpoints.deployable {
            Readiness::DeployableWithMonitoring
        } else if overall >= breakpoints.needs_improvement {
            Readiness::NeedsImprovement
        } else {
            Readiness::NotDeployable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::Excellent => "excellent",
            Readiness::DeployableWithMonitoring => "deployable-with-monitoring",
            Readiness::NeedsImprovement => "needs-improvement",
            Readiness::NotDeployable => "not-deployable",
        }
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weighted combination of all category scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub overall: f64,
    pub per_category: BTreeMap<String, f64>,
    pub weights: BTreeMap<String, f64>,
    pub readiness: Readiness,
}

/// Combines category scores with fixed weights
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeScorer {
    weights: BTreeMap<String, f64>,
    breakpoints: ReadinessBreakpoints,
    tolerance: f64,
}

impl CompositeScorer {
    pub fn new(weights: BTreeMap<String, f64>, breakpoints: ReadinessBreakpoints) -> Self {
        Self {
            weights,
            breakpoints,
            tolerance: DEFAULT_WEIGHT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.category_weights.clone(), config.readiness_breakpoints)
            .with_tolerance(config.weight_tolerance)
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    /// Combine one score per weighted category.
    ///
    /// Fails with `WeightMismatch` unless every weighted category has exactly
    /// one score, no score lacks a weight, and the weights sum to 1.
    pub fn compose(&self, scores: &[CategoryScore]) -> Result<CompositeScore> {
        let mut per_category = BTreeMap::new();
        for score in scores {
            if per_category
                .insert(score.category.clone(), score.score)
                .is_some()
            {
                return Err(VerdictError::WeightMismatch(format!(
                    "category '{}' was scored more than once",
                    score.category
                )));
            }
        }

        let scored: BTreeSet<&String> = per_category.keys().collect();
        let weighted: BTreeSet<&String> = self.weights.keys().collect();
        if scored != weighted {
            let unweighted: Vec<&str> = scored.difference(&weighted).map(|s| s.as_str()).collect();
            let unscored: Vec<&str> = weighted.difference(&scored).map(|s| s.as_str()).collect();
            return Err(VerdictError::WeightMismatch(format!(
                "categories without weight: {:?}; weighted categories without score: {:?}",
                unweighted, unscored
            )));
        }

        if let Some((category, weight)) = self
            .weights
            .iter()
            .find(|(_, weight)| !weight.is_finite() || **weight < 0.0)
        {
            return Err(VerdictError::WeightMismatch(format!(
                "category '{}' has invalid weight {}",
                category, weight
            )));
        }

        let total: f64 = self.weights.values().sum();
        if (total - 1.0).abs() > self.tolerance {
            return Err(VerdictError::WeightMismatch(format!(
                "weights sum to {} instead of 1",
                total
            )));
        }

        // BTreeMap iteration is sorted by category, which fixes the summation order
        let weighted: f64 = self
            .weights
            .iter()
            .map(|(category, weight)| per_category[category] * weight)
            .sum();
        // Normalised by the actual sum so a loose tolerance cannot inflate the score
        let overall = (weighted / total).clamp(0.0, 100.0);

        let readiness = Readiness::classify(overall, &self.breakpoints);
        debug!(overall, %readiness, "Composed category scores");

        Ok(CompositeScore {
            overall,
            per_category,
            weights: self.weights.clone(),
            readiness,
        })
    }
}

/// Compose with the default tolerance
pub fn compose(
    scores: &[CategoryScore],
    weights: &BTreeMap<String, f64>,
    breakpoints: &ReadinessBreakpoints,
) -> Result<CompositeScore> {
    CompositeScorer::new(weights.clone(), *breakpoints).compose(scores)
}
