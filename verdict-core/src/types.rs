//! Scenario, session and sampling types
//!
//! Scenarios are configuration: loaded once per run and never mutated.
//! Action results, session results and resource samples are produced during
//! a single run and are write-once.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// A single named operation dispatched to the action executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    /// Kind of action, e.g. `login` or `view_dashboard`
    pub kind: String,

    /// Opaque parameters handed to the executor untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, JsonValue>,
}

impl ActionStep {
    /// Create an action step without parameters
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add a parameter to the step
    pub fn with_parameter(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

impl fmt::Display for ActionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// A named, weighted sequence of actions representing one kind of user session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    /// Relative selection weight; weights need not sum to 1
    pub weight: f64,

    #[serde(default)]
    pub actions: Vec<ActionStep>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, weight: f64, actions: Vec<ActionStep>) -> Self {
        Self {
            name: name.into(),
            weight,
            actions,
        }
    }

    /// Build a scenario from bare action kinds
    pub fn from_kinds(name: impl Into<String>, weight: f64, kinds: &[&str]) -> Self {
        Self::new(name, weight, kinds.iter().map(|k| ActionStep::new(*k)).collect())
    }
}

/// Outcome of one action within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_kind: String,
    pub duration_ms: u64,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ActionResult {
    pub fn success(action_kind: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            action_kind: action_kind.into(),
            duration_ms,
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failure(
        action_kind: impl Into<String>,
        duration_ms: u64,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            action_kind: action_kind.into(),
            duration_ms,
            succeeded: false,
            error_detail: Some(error_detail.into()),
        }
    }
}

/// Outcome of one simulated user session
///
/// A session succeeds only if every attempted action succeeded. The first
/// failing action ends the session, so `actions` may be shorter than the
/// scenario it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session_id: u64,
    pub scenario_name: String,
    pub actions: Vec<ActionResult>,
    pub total_duration_secs: f64,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl SessionResult {
    /// Assemble a session result from the actions that were attempted.
    ///
    /// Success and the session-level error detail are derived from the
    /// actions: the first failing action decides both.
    pub fn from_actions(
        session_id: u64,
        scenario_name: impl Into<String>,
        actions: Vec<ActionResult>,
        total_duration_secs: f64,
    ) -> Self {
        let first_failure = actions.iter().find(|a| !a.succeeded);
        let succeeded = first_failure.is_none();
        let error_detail = first_failure.map(|a| {
            a.error_detail
                .clone()
                .unwrap_or_else(|| format!("action '{}' failed", a.action_kind))
        });

        Self {
            session_id,
            scenario_name: scenario_name.into(),
            actions,
            total_duration_secs,
            succeeded,
            error_detail,
        }
    }

    /// A session that failed before any action produced a result
    pub fn aborted(
        session_id: u64,
        scenario_name: impl Into<String>,
        total_duration_secs: f64,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            scenario_name: scenario_name.into(),
            actions: Vec::new(),
            total_duration_secs,
            succeeded: false,
            error_detail: Some(error_detail.into()),
        }
    }
}

/// One reading of process resource usage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    /// Seconds since the sampler started
    pub timestamp_offset_secs: f64,
    pub resident_memory_mb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_from_successful_actions() {
        let actions = vec![
            ActionResult::success("login", 120),
            ActionResult::success("view_dashboard", 80),
        ];
        let session = SessionResult::from_actions(7, "A", actions, 0.2);

        assert!(session.succeeded);
        assert!(session.error_detail.is_none());
        assert_eq!(session.actions.len(), 2);
    }

    #[test]
    fn test_session_takes_first_failure_detail() {
        let actions = vec![
            ActionResult::success("login", 120),
            ActionResult::failure("add_expense", 5000, "timeout"),
        ];
        let session = SessionResult::from_actions(1, "B", actions, 5.1);

        assert!(!session.succeeded);
        assert_eq!(session.error_detail.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_session_failure_without_detail_gets_one() {
        let mut failed = ActionResult::failure("login", 10, "x");
        failed.error_detail = None;
        let session = SessionResult::from_actions(1, "A", vec![failed], 0.01);

        assert_eq!(session.error_detail.as_deref(), Some("action 'login' failed"));
    }

    #[test]
    fn test_empty_session_succeeds() {
        let session = SessionResult::from_actions(3, "idle", Vec::new(), 0.0);
        assert!(session.succeeded);
    }

    #[test]
    fn test_scenario_deserialization() {
        let value = json!({
            "name": "browse",
            "weight": 4,
            "actions": [
                {"kind": "login", "parameters": {"user": "demo"}},
                {"kind": "view_dashboard"}
            ]
        });
        let scenario: Scenario = serde_json::from_value(value).unwrap();

        assert_eq!(scenario.name, "browse");
        assert_eq!(scenario.weight, 4.0);
        assert_eq!(scenario.actions[0].parameters["user"], json!("demo"));
        assert!(scenario.actions[1].parameters.is_empty());
    }
}
