//! End-to-end scoring: session results and findings to a scorecard

use std::collections::BTreeMap;
use verdict_config::{
    Comparison, MeasurementRule, Metric, ScoringConfig, ThresholdRule,
};
use verdict_core::{
    ActionResult, Finding, FindingRegistry, ResourceSample, SessionResult, Severity, VerdictError,
};
use verdict_scoring::{
    summarize, summarize_resources, GateVerdict, MetricSource, Readiness, RunMetrics, Scorecard,
};

fn session(id: u64, secs: f64, succeeded: bool) -> SessionResult {
    let action = if succeeded {
        ActionResult::success("login", (secs * 1000.0) as u64)
    } else {
        ActionResult::failure("login", (secs * 1000.0) as u64, "timeout")
    };
    SessionResult::from_actions(id, "A", vec![action], secs)
}

fn security_findings() -> FindingRegistry {
    let registry = FindingRegistry::new();
    registry.record_all(vec![
        Finding::new("security", "sql_injection", Severity::Critical, "database error leaked"),
        Finding::new("security", "xss", Severity::High, "script tag reflected"),
        Finding::new("security", "headers", Severity::Medium, "missing CSP header"),
    ]);
    registry
}

#[test]
fn test_slow_run_with_security_findings() {
    let sessions: Vec<SessionResult> = (0..20).map(|id| session(id, 6.0, true)).collect();
    let load = summarize(&sessions, 30.0).unwrap();
    let metrics = RunMetrics {
        load: &load,
        resources: None,
    };

    let scorecard = Scorecard::evaluate(
        &ScoringConfig::default(),
        &security_findings(),
        Some(&metrics as &dyn MetricSource),
        &BTreeMap::new(),
    )
    .unwrap();

    // 100 - 20 - 15 - 8
    assert_eq!(scorecard.composite.per_category["security"], 57.0);
    // average session time above 5s
    assert_eq!(scorecard.composite.per_category["performance"], 90.0);
    // 57 * 0.6 + 90 * 0.4
    assert!((scorecard.composite.overall - 70.2).abs() < 1e-9);
    assert_eq!(scorecard.composite.readiness, Readiness::NeedsImprovement);

    let gates = scorecard.gates.unwrap();
    assert_eq!(gates.missed, 2);
    assert_eq!(gates.verdict, GateVerdict::NotReady);
}

#[test]
fn test_failed_sessions_still_score() {
    let mut sessions: Vec<SessionResult> = (0..8).map(|id| session(id, 2.0, true)).collect();
    sessions.extend((8..10).map(|id| session(id, 0.5, false)));
    let load = summarize(&sessions, 10.0).unwrap();
    assert_eq!(load.success_rate_percent, 80.0);
    assert_eq!(load.error_details["timeout"], 2);

    let scorecard = Scorecard::evaluate(
        &ScoringConfig::default(),
        &FindingRegistry::new(),
        Some(&load as &dyn MetricSource),
        &BTreeMap::new(),
    )
    .unwrap();

    assert_eq!(scorecard.composite.per_category["performance"], 85.0);
    assert_eq!(scorecard.composite.per_category["security"], 100.0);
    assert!((scorecard.composite.overall - 94.0).abs() < 1e-9);
    assert_eq!(scorecard.composite.readiness, Readiness::Excellent);
}

#[test]
fn test_measurements_and_memory_thresholds() {
    let mut config = ScoringConfig::default();
    config.category_weights = BTreeMap::from([
        ("security".to_string(), 0.5),
        ("performance".to_string(), 0.3),
        ("page_load".to_string(), 0.2),
    ]);
    config.measurement_rules.insert(
        "page_load".to_string(),
        MeasurementRule {
            warn_above: 2.0,
            warn_penalty: 5.0,
            poor_above: 4.0,
            poor_penalty: 15.0,
            poor_fraction: 0.5,
            fraction_penalty: 10.0,
        },
    );
    config.threshold_rules.push(ThresholdRule::new(
        Metric::PeakMemoryMb,
        Comparison::Above,
        &[(512.0, 10.0)],
    ));
    config.readiness_gates = None;

    let sessions: Vec<SessionResult> = (0..4).map(|id| session(id, 1.0, true)).collect();
    let load = summarize(&sessions, 4.0).unwrap();
    let samples: Vec<ResourceSample> = [400.0, 600.0, 550.0]
        .iter()
        .enumerate()
        .map(|(i, &mb)| ResourceSample {
            timestamp_offset_secs: i as f64,
            resident_memory_mb: mb,
        })
        .collect();
    let resources = summarize_resources(&samples).unwrap();
    let metrics = RunMetrics {
        load: &load,
        resources: Some(&resources),
    };

    let measurements = BTreeMap::from([("page_load".to_string(), vec![1.0, 2.5, 5.0])]);
    let scorecard = Scorecard::evaluate(
        &config,
        &security_findings(),
        Some(&metrics as &dyn MetricSource),
        &measurements,
    )
    .unwrap();

    let page_load = scorecard
        .categories
        .iter()
        .find(|c| c.category == "page_load")
        .unwrap();
    assert_eq!(page_load.score, 80.0);
    assert_eq!(page_load.findings_count, 2);
    assert_eq!(scorecard.composite.per_category["performance"], 90.0);

    // 57 * 0.5 + 90 * 0.3 + 80 * 0.2
    assert!((scorecard.composite.overall - 71.5).abs() < 1e-9);
    assert!(scorecard.gates.is_none());
}

#[test]
fn test_misconfigured_weights_refuse_to_score() {
    let mut config = ScoringConfig::default();
    config.category_weights.insert("security".to_string(), 0.5);

    let err = Scorecard::evaluate(
        &config,
        &security_findings(),
        None,
        &BTreeMap::new(),
    )
    .unwrap_err();
    assert!(matches!(err, VerdictError::WeightMismatch(_)));
}

#[test]
fn test_empty_run_cannot_be_summarized() {
    assert_eq!(summarize(&[], 1.0), Err(VerdictError::EmptyResultSet));
}
