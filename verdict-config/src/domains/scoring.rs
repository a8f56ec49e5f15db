//! Scoring configuration
//!
//! Severity penalty tables, aggregate-metric thresholds, measurement rules,
//! category weights and readiness breakpoints are all configuration: the
//! scoring engine applies them but never hard-codes them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use verdict_core::Severity;
use crate::validation::{
    Validatable, validate_fraction, validate_non_negative, validate_positive,
    validate_required_string, validate_score,
};
use crate::error::ConfigResult;

/// Largest accepted deviation of the weight sum from 1
pub const MAX_WEIGHT_TOLERANCE: f64 = 1e-3;

/// Points subtracted from 100 per finding, keyed by severity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyTable {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl PenaltyTable {
    /// Same penalty for every severity, e.g. for categories where any breach is critical
    pub fn uniform(penalty: f64) -> Self {
        Self {
            critical: penalty,
            high: penalty,
            medium: penalty,
            low: penalty,
        }
    }

    pub fn penalty_for(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

impl Default for PenaltyTable {
    fn default() -> Self {
        Self {
            critical: 20.0,
            high: 15.0,
            medium: 8.0,
            low: 3.0,
        }
    }
}

/// Aggregate load metrics a threshold rule can inspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    SuccessRatePercent,
    ErrorRatePercent,
    AverageSessionSeconds,
    MaxSessionSeconds,
    ThroughputPerSecond,
    P95ActionMillis,
    PeakMemoryMb,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::SuccessRatePercent => "success_rate_percent",
            Metric::ErrorRatePercent => "error_rate_percent",
            Metric::AverageSessionSeconds => "average_session_seconds",
            Metric::MaxSessionSeconds => "max_session_seconds",
            Metric::ThroughputPerSecond => "throughput_per_second",
            Metric::P95ActionMillis => "p95_action_millis",
            Metric::PeakMemoryMb => "peak_memory_mb",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction in which a metric crosses its bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Below,
    Above,
}

impl Comparison {
    pub fn crosses(&self, value: f64, bound: f64) -> bool {
        match self {
            Comparison::Below => value < bound,
            Comparison::Above => value > bound,
        }
    }
}

/// One rung of a threshold rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTier {
    pub bound: f64,
    pub penalty: f64,
}

/// Penalty ladder for one metric.
///
/// Tiers are listed most severe first; only the first tier whose bound the
/// metric crosses is charged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub metric: Metric,
    pub comparison: Comparison,
    pub tiers: Vec<ThresholdTier>,
}

impl ThresholdRule {
    pub fn new(metric: Metric, comparison: Comparison, tiers: &[(f64, f64)]) -> Self {
        Self {
            metric,
            comparison,
            tiers: tiers
                .iter()
                .map(|&(bound, penalty)| ThresholdTier { bound, penalty })
                .collect(),
        }
    }
}

/// Rule for categories scored from a list of individual measurements
/// (page load seconds, API latency milliseconds, query times...)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRule {
    /// Measurements above this need improvement
    pub warn_above: f64,
    pub warn_penalty: f64,

    /// Measurements above this are poor
    pub poor_above: f64,
    pub poor_penalty: f64,

    /// Extra penalty when more than this share of measurements are poor
    pub poor_fraction: f64,
    pub fraction_penalty: f64,
}

/// Overall score breakpoints for readiness classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessBreakpoints {
    pub excellent: f64,
    pub deployable: f64,
    pub needs_improvement: f64,
}

impl Default for ReadinessBreakpoints {
    fn default() -> Self {
        Self {
            excellent: 90.0,
            deployable: 80.0,
            needs_improvement: 70.0,
        }
    }
}

/// Deployment checklist: minimum scores per category and overall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessGates {
    #[serde(default)]
    pub category_minimums: BTreeMap<String, f64>,
    pub overall_minimum: f64,
}

impl Default for ReadinessGates {
    fn default() -> Self {
        let mut category_minimums = BTreeMap::new();
        category_minimums.insert("security".to_string(), 75.0);
        category_minimums.insert("performance".to_string(), 70.0);
        Self {
            category_minimums,
            overall_minimum: 80.0,
        }
    }
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Penalty table for categories without an override
    #[serde(default)]
    pub default_penalties: PenaltyTable,

    /// Per-category penalty tables
    #[serde(default = "default_penalty_overrides")]
    pub penalty_overrides: BTreeMap<String, PenaltyTable>,

    /// Category scored from the load run's aggregate statistics
    #[serde(default = "default_load_category")]
    pub load_category: String,

    /// Threshold rules applied to the load category
    #[serde(default = "default_threshold_rules")]
    pub threshold_rules: Vec<ThresholdRule>,

    /// Measurement rules keyed by category
    #[serde(default)]
    pub measurement_rules: BTreeMap<String, MeasurementRule>,

    /// Weight of each category in the composite score; must sum to 1
    #[serde(default = "default_category_weights")]
    pub category_weights: BTreeMap<String, f64>,

    /// Allowed deviation of the weight sum from 1
    #[serde(default = "default_weight_tolerance")]
    pub weight_tolerance: f64,

    #[serde(default)]
    pub readiness_breakpoints: ReadinessBreakpoints,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_gates: Option<ReadinessGates>,
}

impl ScoringConfig {
    /// Penalty table for a category, falling back to the default table
    pub fn penalties_for(&self, category: &str) -> &PenaltyTable {
        self.penalty_overrides
            .get(category)
            .unwrap_or(&self.default_penalties)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_penalties: PenaltyTable::default(),
            penalty_overrides: default_penalty_overrides(),
            load_category: default_load_category(),
            threshold_rules: default_threshold_rules(),
            measurement_rules: BTreeMap::new(),
            category_weights: default_category_weights(),
            weight_tolerance: default_weight_tolerance(),
            readiness_breakpoints: ReadinessBreakpoints::default(),
            readiness_gates: Some(ReadinessGates::default()),
        }
    }
}

impl Validatable for ScoringConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.default_penalties.validate()?;
        for (category, table) in &self.penalty_overrides {
            validate_required_string(category, "penalty override category", self.domain_name())?;
            table.validate()?;
        }

        validate_required_string(&self.load_category, "load_category", self.domain_name())?;

        for rule in &self.threshold_rules {
            rule.validate()?;
        }

        for (category, rule) in &self.measurement_rules {
            validate_required_string(category, "measurement category", self.domain_name())?;
            rule.validate()?;
        }

        validate_positive(self.weight_tolerance, "weight_tolerance", self.domain_name())?;
        if self.weight_tolerance > MAX_WEIGHT_TOLERANCE {
            return Err(self.validation_error(format!(
                "weight_tolerance must be at most {}, got {}",
                MAX_WEIGHT_TOLERANCE, self.weight_tolerance
            )));
        }

        if self.category_weights.is_empty() {
            return Err(self.validation_error("at least one category weight must be configured"));
        }
        for (category, weight) in &self.category_weights {
            validate_required_string(category, "weighted category", self.domain_name())?;
            validate_non_negative(*weight, &format!("weight of '{}'", category), self.domain_name())?;
        }
        let total: f64 = self.category_weights.values().sum();
        if (total - 1.0).abs() > self.weight_tolerance {
            return Err(self.validation_error(format!(
                "category weights must sum to 1.0, got {}",
                total
            )));
        }

        self.readiness_breakpoints.validate()?;

        if let Some(ref gates) = self.readiness_gates {
            gates.validate()?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scoring"
    }
}

impl Validatable for PenaltyTable {
    fn validate(&self) -> ConfigResult<()> {
        for severity in Severity::all() {
            validate_non_negative(
                self.penalty_for(*severity),
                &format!("{} penalty", severity),
                self.domain_name(),
            )?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scoring.penalties"
    }
}

impl Validatable for ThresholdRule {
    fn validate(&self) -> ConfigResult<()> {
        if self.tiers.is_empty() {
            return Err(self.validation_error(format!(
                "rule for {} needs at least one tier",
                self.metric
            )));
        }
        for tier in &self.tiers {
            if !tier.bound.is_finite() {
                return Err(self.validation_error(format!(
                    "rule for {} has a non-finite bound",
                    self.metric
                )));
            }
            validate_non_negative(tier.penalty, "tier penalty", self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scoring.threshold_rules"
    }
}

impl Validatable for MeasurementRule {
    fn validate(&self) -> ConfigResult<()> {
        validate_non_negative(self.warn_penalty, "warn_penalty", self.domain_name())?;
        validate_non_negative(self.poor_penalty, "poor_penalty", self.domain_name())?;
        validate_non_negative(self.fraction_penalty, "fraction_penalty", self.domain_name())?;
        validate_fraction(self.poor_fraction, "poor_fraction", self.domain_name())?;
        if !(self.warn_above <= self.poor_above) {
            return Err(self.validation_error(format!(
                "warn_above ({}) must not exceed poor_above ({})",
                self.warn_above, self.poor_above
            )));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scoring.measurement_rules"
    }
}

impl Validatable for ReadinessBreakpoints {
    fn validate(&self) -> ConfigResult<()> {
        validate_score(self.excellent, "excellent", self.domain_name())?;
        validate_score(self.deployable, "deployable", self.domain_name())?;
        validate_score(self.needs_improvement, "needs_improvement", self.domain_name())?;
        if !(self.excellent >= self.deployable && self.deployable >= self.needs_improvement) {
            return Err(self.validation_error(
                "breakpoints must be ordered excellent >= deployable >= needs_improvement",
            ));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scoring.readiness_breakpoints"
    }
}

impl Validatable for ReadinessGates {
    fn validate(&self) -> ConfigResult<()> {
        validate_score(self.overall_minimum, "overall_minimum", self.domain_name())?;
        for (category, minimum) in &self.category_minimums {
            validate_score(*minimum, &format!("minimum for '{}'", category), self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scoring.readiness_gates"
    }
}

// Default value functions
fn default_penalty_overrides() -> BTreeMap<String, PenaltyTable> {
    let mut overrides = BTreeMap::new();
    // Any cross-branch data leak counts as a critical breach
    overrides.insert("branch_isolation".to_string(), PenaltyTable::uniform(20.0));
    overrides
}

fn default_load_category() -> String {
    "performance".to_string()
}

fn default_threshold_rules() -> Vec<ThresholdRule> {
    vec![
        ThresholdRule::new(
            Metric::SuccessRatePercent,
            Comparison::Below,
            &[(90.0, 15.0), (95.0, 8.0)],
        ),
        ThresholdRule::new(
            Metric::AverageSessionSeconds,
            Comparison::Above,
            &[(5.0, 10.0), (3.0, 5.0)],
        ),
    ]
}

fn default_category_weights() -> BTreeMap<String, f64> {
    let mut weights = BTreeMap::new();
    weights.insert("security".to_string(), 0.6);
    weights.insert("performance".to_string(), 0.4);
    weights
}

fn default_weight_tolerance() -> f64 {
    1e-6
}
