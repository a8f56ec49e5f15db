//! Scoring engine for Verdict
//!
//! Pure functions over the data a run produced: session results are reduced
//! to summary statistics, categories are scored from findings, thresholds or
//! measurements, and category scores are composed into an overall score with
//! a readiness classification.

pub mod aggregate;
pub mod category;
pub mod composite;
pub mod readiness;
pub mod scorecard;

pub use aggregate::{
    summarize, summarize_resources, LatencyDistribution, LoadSummary, ResourceSummary,
    ScenarioBreakdown,
};
pub use category::{
    classify, score_findings, score_measurements, score_thresholds, CategoryScore,
    CategoryScorer, MeasurementClass, MetricSource, RunMetrics,
};
pub use composite::{compose, CompositeScore, CompositeScorer, Readiness, DEFAULT_WEIGHT_TOLERANCE};
pub use readiness::{assess, GateCriterion, GateVerdict, ReadinessAssessment};
pub use scorecard::Scorecard;
