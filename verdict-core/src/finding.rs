//! Severity-tagged findings and the registry that collects them
//!
//! Category runners record findings from parallel tasks. The registry is
//! append-only and never de-duplicates: detecting the same weakness with
//! three different payloads yields three findings.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Finding severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// All severities, most severe first
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ]
    }

    /// Classify raw evidence text (a response body, an error message) by the
    /// kind of leak it shows.
    pub fn infer_from_evidence(evidence: &str) -> Severity {
        const CRITICAL: &[&str] = &["sql", "database", "stack trace", "exception"];
        const HIGH: &[&str] = &["xss", "script", "javascript"];
        const MEDIUM: &[&str] = &["error", "warning", "failed"];

        let evidence = evidence.to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|k| evidence.contains(k));

        if mentions(CRITICAL) {
            Severity::Critical
        } else if mentions(HIGH) {
            Severity::High
        } else if mentions(MEDIUM) {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Invalid severity: {}", s)),
        }
    }
}

/// A single typed observation contributed by a test category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Area of assessment, e.g. `security` or `branch_isolation`
    pub category: String,

    /// Issue type within the category, e.g. `sql_injection`
    pub kind: String,

    pub severity: Severity,

    pub description: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    #[serde(default = "Utc::now")]
    pub recorded_at: DateTime<Utc>,
}

impl Finding {
    pub fn new(
        category: impl Into<String>,
        kind: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            kind: kind.into(),
            severity,
            description: description.into(),
            metadata: BTreeMap::new(),
            recorded_at: Utc::now(),
        }
    }

    /// Attach a metadata entry (payload, endpoint, evidence excerpt...)
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Per-severity tallies for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Append-only, concurrency-safe finding collection.
///
/// Cloning the registry hands out another handle to the same findings, so a
/// clone can be moved into each category runner's task.
#[derive(Debug, Clone, Default)]
pub struct FindingRegistry {
    findings: Arc<Mutex<Vec<Finding>>>,
}

impl FindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding
    pub fn record(&self, finding: Finding) {
        debug!(
            category = %finding.category,
            kind = %finding.kind,
            severity = %finding.severity,
            "Recording finding"
        );
        self.findings.lock().push(finding);
    }

    /// Append several findings under a single lock acquisition
    pub fn record_all(&self, findings: impl IntoIterator<Item = Finding>) {
        let mut guard = self.findings.lock();
        guard.extend(findings);
    }

    /// Findings recorded for one category, in arrival order
    pub fn findings_for(&self, category: &str) -> Vec<Finding> {
        self.findings
            .lock()
            .iter()
            .filter(|f| f.category == category)
            .cloned()
            .collect()
    }

    /// Snapshot of every recorded finding
    pub fn all(&self) -> Vec<Finding> {
        self.findings.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.findings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.lock().is_empty()
    }

    /// Categories that have at least one finding, sorted by name
    pub fn categories(&self) -> BTreeSet<String> {
        self.findings
            .lock()
            .iter()
            .map(|f| f.category.clone())
            .collect()
    }

    pub fn severity_counts(&self, category: &str) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for finding in self.findings.lock().iter().filter(|f| f.category == category) {
            counts.add(finding.severity);
        }
        counts
    }

    /// Number of findings per issue type within a category
    pub fn counts_by_kind(&self, category: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for finding in self.findings.lock().iter().filter(|f| f.category == category) {
            *counts.entry(finding.kind.clone()).or_insert(0) += 1;
        }
        counts
    }
}
