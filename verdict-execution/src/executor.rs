//! The action executor seam
//!
//! The engine never knows what an action does. Anything that can perform a
//! named step against a target and report how it went can drive a run.

use async_trait::async_trait;
use std::time::Duration;
use verdict_core::ActionStep;

use crate::error::ExecutorError;

/// What an executor reports back for one action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub succeeded: bool,
    /// Latency as measured by the executor. When absent the simulator uses
    /// its own wall-clock measurement.
    pub duration_ms: Option<u64>,
    pub error_detail: Option<String>,
}

impl ActionOutcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            duration_ms: None,
            error_detail: None,
        }
    }

    pub fn failure(error_detail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            duration_ms: None,
            error_detail: Some(error_detail.into()),
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Performs named actions against the system under test
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Perform one step. `deadline` is the time the simulator will wait
    /// before recording the action as timed out; the engine never retries.
    async fn perform(
        &self,
        step: &ActionStep,
        deadline: Duration,
    ) -> Result<ActionOutcome, ExecutorError>;
}
