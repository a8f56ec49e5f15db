//! Deployment readiness checklist
//!
//! Gates are minimum scores for individual categories and for the overall
//! score. The verdict depends on the share of them that were met.

use serde::{Deserialize, Serialize};
use std::fmt;
use verdict_config::ReadinessGates;

use crate::composite::CompositeScore;

/// Name of the overall-score criterion
pub const OVERALL_CRITERION: &str = "overall";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateVerdict {
    Ready,
    ReadyWithWarnings,
    NeedsImprovement,
    NotReady,
}

impl GateVerdict {
    /// Verdict from the share of criteria met: at least five sixths is
    /// ready, four sixths ready with warnings, half needs improvement.
    pub fn from_met(met: usize, total: usize) -> Self {
        if total == 0 || met * 6 >= total * 5 {
            GateVerdict::Ready
        } else if met * 6 >= total * 4 {
            GateVerdict::ReadyWithWarnings
        } else if met * 6 >= total * 3 {
            GateVerdict::NeedsImprovement
        } else {
            GateVerdict::NotReady
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateVerdict::Ready => "ready",
            GateVerdict::ReadyWithWarnings => "ready-with-warnings",
            GateVerdict::NeedsImprovement => "needs-improvement",
            GateVerdict::NotReady => "not-ready",
        }
    }
}

impl fmt::Display for GateVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of the checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCriterion {
    pub name: String,
    pub required: f64,
    /// `None` when the category was not part of the composite
    pub actual: Option<f64>,
    pub met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessAssessment {
    pub criteria: Vec<GateCriterion>,
    pub missed: usize,
    pub verdict: GateVerdict,
}

/// Check a composite score against the readiness gates
pub fn assess(composite: &CompositeScore, gates: &ReadinessGates) -> ReadinessAssessment {
    let mut criteria: Vec<GateCriterion> = gates
        .category_minimums
        .iter()
        .map(|(category, &required)| {
            let actual = composite.per_category.get(category).copied();
            GateCriterion {
                name: category.clone(),
                required,
                actual,
                met: actual.is_some_and(|score| score >= required),
            }
        })
        .collect();

    criteria.push(GateCriterion {
        name: OVERALL_CRITERION.to_string(),
        required: gates.overall_minimum,
        actual: Some(composite.overall),
        met: composite.overall >= gates.overall_minimum,
    });

    let missed = criteria.iter().filter(|c| !c.met).count();
    let verdict = GateVerdict::from_met(criteria.len() - missed, criteria.len());
    ReadinessAssessment {
        criteria,
        missed,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::Readiness;
    use std::collections::BTreeMap;

    fn composite(overall: f64, scores: &[(&str, f64)]) -> CompositeScore {
        CompositeScore {
            overall,
            per_category: scores.iter().map(|&(c, s)| (c.to_string(), s)).collect(),
            weights: BTreeMap::new(),
            readiness: Readiness::NeedsImprovement,
        }
    }

    fn gates(minimums: &[(&str, f64)], overall: f64) -> ReadinessGates {
        ReadinessGates {
            category_minimums: minimums.iter().map(|&(c, s)| (c.to_string(), s)).collect(),
            overall_minimum: overall,
        }
    }

    #[test]
    fn test_all_gates_met() {
        let assessment = assess(
            &composite(88.0, &[("security", 90.0), ("performance", 85.0)]),
            &ReadinessGates::default(),
        );

        assert_eq!(assessment.criteria.len(), 3);
        assert_eq!(assessment.missed, 0);
        assert_eq!(assessment.verdict, GateVerdict::Ready);
    }

    #[test]
    fn test_default_gates_on_weak_security() {
        let assessment = assess(
            &composite(70.2, &[("security", 57.0), ("performance", 90.0)]),
            &ReadinessGates::default(),
        );

        let missed: Vec<&str> = assessment
            .criteria
            .iter()
            .filter(|c| !c.met)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(missed, vec!["security", OVERALL_CRITERION]);
        assert_eq!(assessment.verdict, GateVerdict::NotReady);
    }

    #[test]
    fn test_absent_category_counts_as_missed() {
        let assessment = assess(
            &composite(95.0, &[("security", 95.0)]),
            &gates(&[("security", 75.0), ("sync", 80.0)], 80.0),
        );

        let sync = assessment.criteria.iter().find(|c| c.name == "sync").unwrap();
        assert!(!sync.met);
        assert!(sync.actual.is_none());
        assert_eq!(assessment.missed, 1);
        assert_eq!(assessment.verdict, GateVerdict::ReadyWithWarnings);
    }

    #[test]
    fn test_missing_only_overall_gate_warns() {
        // Both category gates pass at their minimums while the overall falls short
        let assessment = assess(
            &composite(73.0, &[("security", 75.0), ("performance", 70.0)]),
            &ReadinessGates::default(),
        );

        assert_eq!(assessment.missed, 1);
        assert_eq!(assessment.verdict, GateVerdict::ReadyWithWarnings);
    }

    #[test]
    fn test_verdict_by_share_met() {
        // Six gates
        assert_eq!(GateVerdict::from_met(6, 6), GateVerdict::Ready);
        assert_eq!(GateVerdict::from_met(5, 6), GateVerdict::Ready);
        assert_eq!(GateVerdict::from_met(4, 6), GateVerdict::ReadyWithWarnings);
        assert_eq!(GateVerdict::from_met(3, 6), GateVerdict::NeedsImprovement);
        assert_eq!(GateVerdict::from_met(2, 6), GateVerdict::NotReady);

        // Three gates
        assert_eq!(GateVerdict::from_met(3, 3), GateVerdict::Ready);
        assert_eq!(GateVerdict::from_met(2, 3), GateVerdict::ReadyWithWarnings);
        assert_eq!(GateVerdict::from_met(1, 3), GateVerdict::NotReady);

        assert_eq!(GateVerdict::NotReady.to_string(), "not-ready");
    }

    #[test]
    fn test_many_missed_gates() {
        let assessment = assess(
            &composite(40.0, &[("a", 10.0), ("b", 10.0), ("c", 10.0)]),
            &gates(&[("a", 50.0), ("b", 50.0), ("c", 50.0)], 60.0),
        );

        assert_eq!(assessment.missed, 4);
        assert_eq!(assessment.verdict, GateVerdict::NotReady);
    }
}
