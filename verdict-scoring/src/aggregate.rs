//! Reduction of session results and resource samples into summary statistics
//!
//! Every formula here is a sum, count or sort, so the order in which sessions
//! finished has no effect on the outcome.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use verdict_core::{ResourceSample, Result, SessionResult, VerdictError};

/// Distribution of individual action latencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyDistribution {
    pub samples: usize,
    pub min_ms: u64,
    pub max_ms: u64,
    pub mean_ms: f64,
    pub p50_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
}

impl LatencyDistribution {
    /// Nearest-rank percentiles over the given latencies; `None` when empty
    pub fn from_durations(mut durations: Vec<u64>) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }
        durations.sort_unstable();

        let len = durations.len();
        Some(Self {
            samples: len,
            min_ms: durations[0],
            max_ms: durations[len - 1],
            mean_ms: durations.iter().map(|&d| d as f64).sum::<f64>() / len as f64,
            p50_ms: durations[len * 50 / 100],
            p95_ms: durations[len * 95 / 100],
            p99_ms: durations[len * 99 / 100],
        })
    }
}

/// Per-scenario session counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBreakdown {
    pub sessions: usize,
    pub successful: usize,
    pub failed: usize,
    pub error_rate_percent: f64,
}

/// Summary statistics for one load run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub total_sessions: usize,
    pub successful_sessions: usize,
    pub failed_sessions: usize,
    pub success_rate_percent: f64,
    /// Mean over successful sessions only
    pub average_session_secs: f64,
    pub min_session_secs: f64,
    pub max_session_secs: f64,
    /// Successful sessions per second of wall clock
    pub throughput_per_second: f64,
    pub error_rate_percent: f64,
    /// Set when average/min/max are zero because nothing succeeded
    pub no_successful_sessions: bool,
    pub wall_clock_secs: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_latency: Option<LatencyDistribution>,
    #[serde(default)]
    pub per_scenario: BTreeMap<String, ScenarioBreakdown>,
    /// Occurrences of each session-level error detail
    #[serde(default)]
    pub error_details: BTreeMap<String, usize>,
}

/// Summarize a run's sessions.
///
/// Fails with `EmptyResultSet` when there is nothing to summarize.
pub fn summarize(sessions: &[SessionResult], wall_clock_secs: f64) -> Result<LoadSummary> {
    if sessions.is_empty() {
        return Err(VerdictError::EmptyResultSet);
    }

    let total = sessions.len();
    let mut successful_durations = Vec::new();
    let mut action_durations = Vec::new();
    let mut per_scenario: BTreeMap<String, ScenarioBreakdown> = BTreeMap::new();
    let mut error_details: BTreeMap<String, usize> = BTreeMap::new();

    for session in sessions {
        let breakdown = per_scenario.entry(session.scenario_name.clone()).or_default();
        breakdown.sessions += 1;

        if session.succeeded {
            breakdown.successful += 1;
            successful_durations.push(session.total_duration_secs);
        } else {
            breakdown.failed += 1;
            let detail = session
                .error_detail
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            *error_details.entry(detail).or_insert(0) += 1;
        }

        action_durations.extend(session.actions.iter().map(|a| a.duration_ms));
    }

    for breakdown in per_scenario.values_mut() {
        breakdown.error_rate_percent = percent(breakdown.failed, breakdown.sessions);
    }

    let successful = successful_durations.len();
    let failed = total - successful;
    let no_successful_sessions = successful == 0;

    // Sorted so the mean is summed in the same order whatever the arrival order
    successful_durations.sort_by(|a, b| a.total_cmp(b));
    let (average, min, max) = match (successful_durations.first(), successful_durations.last()) {
        (Some(&min), Some(&max)) => (
            successful_durations.iter().sum::<f64>() / successful as f64,
            min,
            max,
        ),
        _ => (0.0, 0.0, 0.0),
    };

    let throughput = if wall_clock_secs > 0.0 {
        successful as f64 / wall_clock_secs
    } else {
        0.0
    };

    let summary = LoadSummary {
        total_sessions: total,
        successful_sessions: successful,
        failed_sessions: failed,
        success_rate_percent: percent(successful, total),
        average_session_secs: average,
        min_session_secs: min,
        max_session_secs: max,
        throughput_per_second: throughput,
        error_rate_percent: percent(failed, total),
        no_successful_sessions,
        wall_clock_secs,
        action_latency: LatencyDistribution::from_durations(action_durations),
        per_scenario,
        error_details,
    };

    debug!(
        total = summary.total_sessions,
        successful = summary.successful_sessions,
        success_rate = summary.success_rate_percent,
        "Summarized load run"
    );

    Ok(summary)
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Resident memory over a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub samples: usize,
    pub average_mb: f64,
    pub peak_mb: f64,
    pub min_mb: f64,
}

pub fn summarize_resources(samples: &[ResourceSample]) -> Option<ResourceSummary> {
    if samples.is_empty() {
        return None;
    }

    let readings = samples.iter().map(|s| s.resident_memory_mb);
    Some(ResourceSummary {
        samples: samples.len(),
        average_mb: readings.clone().sum::<f64>() / samples.len() as f64,
        peak_mb: readings.clone().fold(f64::MIN, f64::max),
        min_mb: readings.fold(f64::MAX, f64::min),
    })
}
