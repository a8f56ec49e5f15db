//! Observation input and report output for the `run` command

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use uuid::Uuid;
use verdict_core::{Finding, FindingRegistry, SessionResult, Severity, SeverityCounts};
use verdict_scoring::{LoadSummary, ResourceSummary, Scorecard};

/// A finding as written in an observations file.
///
/// When `severity` is left out it is inferred from the description.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservedFinding {
    pub category: String,
    pub kind: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    pub description: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ObservedFinding {
    pub fn into_finding(self) -> Finding {
        let severity = self
            .severity
            .unwrap_or_else(|| Severity::infer_from_evidence(&self.description));

        self.metadata.into_iter().fold(
            Finding::new(self.category, self.kind, severity, self.description),
            |finding, (key, value)| finding.with_metadata(key, value),
        )
    }
}

/// Findings and measurements gathered outside the load run
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Observations {
    pub findings: Vec<ObservedFinding>,
    /// Measurements keyed by category
    pub measurements: BTreeMap<String, Vec<f64>>,
}

impl Observations {
    /// Read a YAML (or JSON) observations file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read observations from {:?}", path))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse observations in {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Record every observed finding into a fresh registry
    pub fn registry(&self) -> FindingRegistry {
        let registry = FindingRegistry::new();
        registry.record_all(self.findings.iter().cloned().map(ObservedFinding::into_finding));
        registry
    }
}

/// Everything the `run` command reports
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub seed: u64,
    pub wall_clock_secs: f64,
    /// Absent when the run had no sessions
    pub load: Option<LoadSummary>,
    pub resources: Option<ResourceSummary>,
    pub findings: BTreeMap<String, SeverityCounts>,
    pub scorecard: Scorecard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<SessionResult>>,
}

pub fn findings_by_category(registry: &FindingRegistry) -> BTreeMap<String, SeverityCounts> {
    registry
        .categories()
        .into_iter()
        .map(|category| {
            let counts = registry.severity_counts(&category);
            (category, counts)
        })
        .collect()
}

/// Human readable report
pub fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_summary(&mut out, report);
    out
}

fn write_summary(out: &mut String, report: &RunReport) -> std::fmt::Result {
    writeln!(out, "Run {} (seed {})", report.run_id, report.seed)?;
    writeln!(out, "Started {}, wall clock {:.2}s", report.started_at.to_rfc3339(), report.wall_clock_secs)?;
    writeln!(out)?;

    match &report.load {
        Some(load) => {
            writeln!(out, "Load")?;
            writeln!(
                out,
                "  sessions: {} total, {} succeeded, {} failed",
                load.total_sessions, load.successful_sessions, load.failed_sessions
            )?;
            writeln!(
                out,
                "  success rate: {:.1}%  error rate: {:.1}%",
                load.success_rate_percent, load.error_rate_percent
            )?;
            if load.no_successful_sessions {
                writeln!(out, "  session time: no successful sessions")?;
            } else {
                writeln!(
                    out,
                    "  session time: avg {:.3}s  min {:.3}s  max {:.3}s",
                    load.average_session_secs, load.min_session_secs, load.max_session_secs
                )?;
            }
            writeln!(out, "  throughput: {:.2} sessions/s", load.throughput_per_second)?;
            if let Some(latency) = &load.action_latency {
                writeln!(
                    out,
                    "  action latency: p50 {}ms  p95 {}ms  p99 {}ms",
                    latency.p50_ms, latency.p95_ms, latency.p99_ms
                )?;
            }
            for (detail, count) in &load.error_details {
                writeln!(out, "  error '{}': {}", detail, count)?;
            }
        }
        None => writeln!(out, "Load: no sessions")?,
    }

    if let Some(resources) = &report.resources {
        writeln!(
            out,
            "  memory: avg {:.1}MB  peak {:.1}MB over {} samples",
            resources.average_mb, resources.peak_mb, resources.samples
        )?;
    }
    writeln!(out)?;

    if !report.findings.is_empty() {
        writeln!(out, "Findings")?;
        for (category, counts) in &report.findings {
            writeln!(
                out,
                "  {}: {} critical, {} high, {} medium, {} low",
                category, counts.critical, counts.high, counts.medium, counts.low
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Scores")?;
    for score in &report.scorecard.categories {
        let weight = report
            .scorecard
            .composite
            .weights
            .get(&score.category)
            .copied()
            .unwrap_or_default();
        writeln!(
            out,
            "  {:<20} {:>6.1}  (weight {:.2}, {} findings)",
            score.category, score.score, weight, score.findings_count
        )?;
    }
    writeln!(
        out,
        "  {:<20} {:>6.1}  {}",
        "overall", report.scorecard.composite.overall, report.scorecard.composite.readiness
    )?;

    if let Some(gates) = &report.scorecard.gates {
        writeln!(out)?;
        writeln!(out, "Readiness gates: {} ({} missed)", gates.verdict, gates.missed)?;
        for criterion in &gates.criteria {
            let actual = criterion
                .actual
                .map(|a| format!("{:.1}", a))
                .unwrap_or_else(|| "n/a".to_string());
            writeln!(
                out,
                "  [{}] {} >= {:.1} (actual {})",
                if criterion.met { "x" } else { " " },
                criterion.name,
                criterion.required,
                actual
            )?;
        }
    }

    Ok(())
}
