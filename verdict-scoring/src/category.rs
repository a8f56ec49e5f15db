//! Category scoring
//!
//! A category score starts at 100 and loses points. Depending on the category
//! the points come from severity-tagged findings, from aggregate load metrics
//! crossing configured thresholds, or from individual measurements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;
use verdict_config::{MeasurementRule, Metric, PenaltyTable, ScoringConfig, ThresholdRule};
use verdict_core::{Finding, FindingRegistry, Severity, SeverityCounts};

use crate::aggregate::{LoadSummary, ResourceSummary};

const MAX_SCORE: f64 = 100.0;

/// Score of one assessment category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    /// Always within [0, 100]
    pub score: f64,
    pub findings_count: usize,
}

impl CategoryScore {
    fn from_penalty(category: &str, penalty: f64, findings_count: usize) -> Self {
        Self {
            category: category.to_string(),
            score: (MAX_SCORE - penalty).clamp(0.0, MAX_SCORE),
            findings_count,
        }
    }
}

/// Score a category from its findings.
///
/// Findings are tallied per severity before any arithmetic, so the same
/// multiset of findings gives the same score in any arrival order.
/// Findings recorded under another category are ignored.
pub fn score_findings(category: &str, findings: &[Finding], penalties: &PenaltyTable) -> CategoryScore {
    let mut counts = SeverityCounts::default();
    for finding in findings {
        if finding.category != category {
            debug!(category, other = %finding.category, "Skipping finding from another category");
            continue;
        }
        counts.add(finding.severity);
    }

    let penalty: f64 = Severity::all()
        .iter()
        .map(|&severity| counts.get(severity) as f64 * penalties.penalty_for(severity))
        .sum();

    CategoryScore::from_penalty(category, penalty, counts.total())
}

/// Anything that can report the aggregate metrics threshold rules look at
pub trait MetricSource {
    fn metric(&self, metric: Metric) -> Option<f64>;
}

impl MetricSource for LoadSummary {
    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::SuccessRatePercent => Some(self.success_rate_percent),
            Metric::ErrorRatePercent => Some(self.error_rate_percent),
            Metric::AverageSessionSeconds => Some(self.average_session_secs),
            Metric::MaxSessionSeconds => Some(self.max_session_secs),
            Metric::ThroughputPerSecond => Some(self.throughput_per_second),
            Metric::P95ActionMillis => self.action_latency.as_ref().map(|l| l.p95_ms as f64),
            Metric::PeakMemoryMb => None,
        }
    }
}

/// Load summary together with the resource readings of the same run
#[derive(Debug, Clone, Copy)]
pub struct RunMetrics<'a> {
    pub load: &'a LoadSummary,
    pub resources: Option<&'a ResourceSummary>,
}

impl MetricSource for RunMetrics<'_> {
    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::PeakMemoryMb => self.resources.map(|r| r.peak_mb),
            other => self.load.metric(other),
        }
    }
}

/// Score a category from aggregate metrics.
///
/// Each rule charges at most its first crossed tier. Rules whose metric the
/// source cannot provide are skipped. `findings_count` is the number of rules
/// that charged a penalty.
pub fn score_thresholds<M>(category: &str, source: &M, rules: &[ThresholdRule]) -> CategoryScore
where
    M: MetricSource + ?Sized,
{
    let mut penalty = 0.0;
    let mut breached = 0;

    for rule in rules {
        let Some(value) = source.metric(rule.metric) else {
            debug!(category, metric = %rule.metric, "Metric unavailable, rule skipped");
            continue;
        };

        if let Some(tier) = rule
            .tiers
            .iter()
            .find(|tier| rule.comparison.crosses(value, tier.bound))
        {
            debug!(
                category,
                metric = %rule.metric,
                value,
                bound = tier.bound,
                penalty = tier.penalty,
                "Threshold crossed"
            );
            penalty += tier.penalty;
            breached += 1;
        }
    }

    CategoryScore::from_penalty(category, penalty, breached)
}

/// How a single measurement rates against its rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurementClass {
    Good,
    NeedsImprovement,
    Poor,
}

impl MeasurementClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementClass::Good => "good",
            MeasurementClass::NeedsImprovement => "needs-improvement",
            MeasurementClass::Poor => "poor",
        }
    }
}

impl fmt::Display for MeasurementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn classify(value: f64, rule: &MeasurementRule) -> MeasurementClass {
    if value > rule.poor_above {
        MeasurementClass::Poor
    } else if value > rule.warn_above {
        MeasurementClass::NeedsImprovement
    } else {
        MeasurementClass::Good
    }
}

/// Score a category from individual measurements such as page load times.
///
/// `findings_count` is the number of measurements that were not good.
pub fn score_measurements(category: &str, values: &[f64], rule: &MeasurementRule) -> CategoryScore {
    let mut poor = 0usize;
    let mut needs_improvement = 0usize;

    for &value in values {
        match classify(value, rule) {
            MeasurementClass::Poor => poor += 1,
            MeasurementClass::NeedsImprovement => needs_improvement += 1,
            MeasurementClass::Good => {}
        }
    }

    let mut penalty = poor as f64 * rule.poor_penalty + needs_improvement as f64 * rule.warn_penalty;
    if !values.is_empty() && poor as f64 > rule.poor_fraction * values.len() as f64 {
        penalty += rule.fraction_penalty;
    }

    CategoryScore::from_penalty(category, penalty, poor + needs_improvement)
}

/// Applies the configured scoring rule of each category
#[derive(Debug, Clone)]
pub struct CategoryScorer {
    config: ScoringConfig,
}

impl CategoryScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score_findings(&self, category: &str, findings: &[Finding]) -> CategoryScore {
        score_findings(category, findings, self.config.penalties_for(category))
    }

    /// Score the load category from a run's metrics
    pub fn score_load<M: MetricSource + ?Sized>(&self, metrics: &M) -> CategoryScore {
        score_thresholds(&self.config.load_category, metrics, &self.config.threshold_rules)
    }

    /// `None` when the category has no measurement rule
    pub fn score_measurements(&self, category: &str, values: &[f64]) -> Option<CategoryScore> {
        self.config
            .measurement_rules
            .get(category)
            .map(|rule| score_measurements(category, values, rule))
    }

    /// Score every weighted category.
    ///
    /// The load category uses `load` when present; a category with a
    /// measurement rule and measurements uses those; every other category is
    /// scored from the registry's findings for it.
    pub fn score_categories(
        &self,
        registry: &FindingRegistry,
        load: Option<&dyn MetricSource>,
        measurements: &BTreeMap<String, Vec<f64>>,
    ) -> Vec<CategoryScore> {
        self.config
            .category_weights
            .keys()
            .map(|category| {
                if *category == self.config.load_category {
                    if let Some(load) = load {
                        return self.score_load(load);
                    }
                }

                if let Some(values) = measurements.get(category) {
                    if let Some(score) = self.score_measurements(category, values) {
                        return score;
                    }
                }

                self.score_findings(category, &registry.findings_for(category))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use proptest::prelude::*;
    use verdict_config::Comparison;
    use verdict_core::{ActionResult, SessionResult};

    fn finding(severity: Severity) -> Finding {
        Finding::new("security", "sql_injection", severity, "payload reflected")
    }

    fn summary(successes: usize, failures: usize, secs: f64) -> LoadSummary {
        let mut sessions = Vec::new();
        for id in 0..successes {
            sessions.push(SessionResult::from_actions(
                id as u64,
                "A",
                vec![ActionResult::success("login", 10)],
                secs,
            ));
        }
        for id in 0..failures {
            sessions.push(SessionResult::from_actions(
                (successes + id) as u64,
                "A",
                vec![ActionResult::failure("login", 10, "timeout")],
                secs,
            ));
        }
        summarize(&sessions, 10.0).unwrap()
    }

    fn page_load_rule() -> MeasurementRule {
        MeasurementRule {
            warn_above: 2.0,
            warn_penalty: 2.0,
            poor_above: 3.0,
            poor_penalty: 5.0,
            poor_fraction: 0.3,
            fraction_penalty: 10.0,
        }
    }

    #[test]
    fn test_default_penalties() {
        let findings = vec![
            finding(Severity::Critical),
            finding(Severity::High),
            finding(Severity::Medium),
        ];

        let score = score_findings("security", &findings, &PenaltyTable::default());
        assert_eq!(score.score, 57.0);
        assert_eq!(score.findings_count, 3);
        assert_eq!(score.category, "security");
    }

    #[test]
    fn test_other_category_findings_are_ignored() {
        let findings = vec![
            finding(Severity::High),
            Finding::new("headers", "missing_csp", Severity::Critical, "no CSP"),
        ];

        let score = score_findings("security", &findings, &PenaltyTable::default());
        assert_eq!(score.score, 85.0);
        assert_eq!(score.findings_count, 1);
    }

    #[test]
    fn test_no_findings_is_perfect() {
        let score = score_findings("headers", &[], &PenaltyTable::default());
        assert_eq!(score.score, 100.0);
        assert_eq!(score.findings_count, 0);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let findings = vec![finding(Severity::Critical); 12];
        let score = score_findings("security", &findings, &PenaltyTable::default());
        assert_eq!(score.score, 0.0);
        assert_eq!(score.findings_count, 12);
    }

    #[test]
    fn test_category_override_table() {
        let scorer = CategoryScorer::new(ScoringConfig::default());
        let findings = vec![Finding::new(
            "branch_isolation",
            "cross_branch_read",
            Severity::Low,
            "branch B rows visible to branch A",
        )];

        let score = scorer.score_findings("branch_isolation", &findings);
        assert_eq!(score.score, 80.0);
    }

    #[test]
    fn test_default_threshold_rules() {
        let scorer = CategoryScorer::new(ScoringConfig::default());

        // 85% success, average 6s: -15 and -10
        let score = scorer.score_load(&summary(17, 3, 6.0));
        assert_eq!(score.category, "performance");
        assert_eq!(score.score, 75.0);
        assert_eq!(score.findings_count, 2);

        // 92% success, average 4s: second tiers only
        let score = scorer.score_load(&summary(23, 2, 4.0));
        assert_eq!(score.score, 87.0);

        let score = scorer.score_load(&summary(20, 0, 1.0));
        assert_eq!(score.score, 100.0);
        assert_eq!(score.findings_count, 0);
    }

    #[test]
    fn test_unavailable_metric_is_skipped() {
        let load = summary(10, 0, 1.0);
        let rules = vec![ThresholdRule::new(Metric::PeakMemoryMb, Comparison::Above, &[(512.0, 10.0)])];

        assert_eq!(score_thresholds("performance", &load, &rules).score, 100.0);

        let resources = ResourceSummary {
            samples: 2,
            average_mb: 600.0,
            peak_mb: 700.0,
            min_mb: 500.0,
        };
        let metrics = RunMetrics {
            load: &load,
            resources: Some(&resources),
        };
        assert_eq!(score_thresholds("performance", &metrics, &rules).score, 90.0);
    }

    #[test]
    fn test_classify_measurements() {
        let rule = page_load_rule();
        assert_eq!(classify(1.2, &rule), MeasurementClass::Good);
        assert_eq!(classify(2.0, &rule), MeasurementClass::Good);
        assert_eq!(classify(2.5, &rule), MeasurementClass::NeedsImprovement);
        assert_eq!(classify(3.5, &rule), MeasurementClass::Poor);
        assert_eq!(MeasurementClass::NeedsImprovement.to_string(), "needs-improvement");
    }

    #[test]
    fn test_measurement_score() {
        let rule = page_load_rule();

        // one poor, one needs improvement, three good: 1/5 poor is under the fraction
        let score = score_measurements("page_load", &[1.0, 1.5, 2.5, 3.5, 0.9], &rule);
        assert_eq!(score.score, 93.0);
        assert_eq!(score.findings_count, 2);

        // two of four poor crosses the fraction
        let score = score_measurements("page_load", &[4.0, 5.0, 1.0, 1.0], &rule);
        assert_eq!(score.score, 80.0);

        assert_eq!(score_measurements("page_load", &[], &rule).score, 100.0);
    }

    #[test]
    fn test_score_categories_dispatch() {
        let mut config = ScoringConfig::default();
        config.measurement_rules.insert("page_load".to_string(), page_load_rule());
        config.category_weights = BTreeMap::from([
            ("security".to_string(), 0.5),
            ("performance".to_string(), 0.3),
            ("page_load".to_string(), 0.2),
        ]);
        let scorer = CategoryScorer::new(config);

        let registry = FindingRegistry::new();
        registry.record(finding(Severity::High));

        let load = summary(17, 3, 1.0);
        let measurements = BTreeMap::from([("page_load".to_string(), vec![3.5])]);

        let scores = scorer.score_categories(&registry, Some(&load), &measurements);
        let by_name: BTreeMap<_, _> = scores.iter().map(|s| (s.category.as_str(), s.score)).collect();

        assert_eq!(scores.len(), 3);
        assert_eq!(by_name["security"], 85.0);
        assert_eq!(by_name["performance"], 85.0);
        assert_eq!(by_name["page_load"], 85.0);
    }

    #[test]
    fn test_load_category_without_run_uses_findings() {
        let scorer = CategoryScorer::new(ScoringConfig::default());
        let scores = scorer.score_categories(&FindingRegistry::new(), None, &BTreeMap::new());

        assert!(scores.iter().all(|s| s.score == 100.0));
    }

    fn arb_severity() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Critical),
            Just(Severity::High),
            Just(Severity::Medium),
            Just(Severity::Low),
        ]
    }

    fn arb_table() -> impl Strategy<Value = PenaltyTable> {
        (0.0f64..40.0, 0.0f64..40.0, 0.0f64..40.0, 0.0f64..40.0).prop_map(
            |(critical, high, medium, low)| PenaltyTable {
                critical,
                high,
                medium,
                low,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_score_is_order_independent(
            severities in prop::collection::vec(arb_severity(), 1..40),
            table in arb_table(),
        ) {
            let findings: Vec<Finding> = severities.iter().copied().map(finding).collect();
            let mut reversed = findings.clone();
            reversed.reverse();
            let mut rotated = findings.clone();
            rotated.rotate_left(findings.len() / 2);

            let expected = score_findings("security", &findings, &table);
            prop_assert_eq!(&expected, &score_findings("security", &reversed, &table));
            prop_assert_eq!(&expected, &score_findings("security", &rotated, &table));
        }

        #[test]
        fn prop_score_stays_in_bounds(
            severities in prop::collection::vec(arb_severity(), 0..200),
            table in arb_table(),
        ) {
            let findings: Vec<Finding> = severities.into_iter().map(finding).collect();
            let score = score_findings("security", &findings, &table);
            prop_assert!((0.0..=100.0).contains(&score.score));
        }

        #[test]
        fn prop_measurement_score_stays_in_bounds(
            values in prop::collection::vec(0.0f64..20.0, 0..100),
        ) {
            let score = score_measurements("page_load", &values, &page_load_rule());
            prop_assert!((0.0..=100.0).contains(&score.score));
        }
    }
}
