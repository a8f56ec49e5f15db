//! Session simulation
//!
//! A session walks its scenario's actions in order and stops at the first
//! failure. Nothing that goes wrong inside the executor escapes `run`:
//! failures, timeouts and panics all become error details on the result.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};
use verdict_core::{ActionResult, Scenario, SessionResult};

use crate::executor::ActionExecutor;

/// Error detail for an action that exceeded its own timeout
pub const ACTION_TIMEOUT: &str = "timeout";

/// Error detail for work cut short by the run deadline
pub const RUN_DEADLINE_EXCEEDED: &str = "run-deadline-exceeded";

/// Error detail for an executor that panicked
pub const EXECUTOR_PANICKED: &str = "executor-panicked";

/// Runs one scenario through an action executor
#[derive(Clone)]
pub struct SessionSimulator {
    executor: Arc<dyn ActionExecutor>,
    action_timeout: Duration,
}

impl SessionSimulator {
    pub fn new(executor: Arc<dyn ActionExecutor>, action_timeout: Duration) -> Self {
        Self {
            executor,
            action_timeout,
        }
    }

    pub fn action_timeout(&self) -> Duration {
        self.action_timeout
    }

    /// Run a scenario to completion or to its first failing action.
    ///
    /// When `run_deadline` is set, no action is given longer than the time
    /// left before it.
    pub async fn run(
        &self,
        session_id: u64,
        scenario: &Scenario,
        run_deadline: Option<Instant>,
    ) -> SessionResult {
        let session_started = Instant::now();
        let mut actions = Vec::with_capacity(scenario.actions.len());

        for step in &scenario.actions {
            let started = Instant::now();
            let (budget, deadline_bound) = self.budget_for(started, run_deadline);

            let result = if budget.is_zero() && deadline_bound {
                ActionResult::failure(&step.kind, 0, RUN_DEADLINE_EXCEEDED)
            } else {
                let attempt = AssertUnwindSafe(self.executor.perform(step, budget)).catch_unwind();

                match timeout(budget, attempt).await {
                    Ok(Ok(Ok(outcome))) => {
                        let duration_ms = outcome.duration_ms.unwrap_or_else(|| elapsed_ms(started));
                        if outcome.succeeded {
                            ActionResult::success(&step.kind, duration_ms)
                        } else {
                            let detail = outcome
                                .error_detail
                                .unwrap_or_else(|| format!("action '{}' failed", step.kind));
                            ActionResult::failure(&step.kind, duration_ms, detail)
                        }
                    }
                    Ok(Ok(Err(err))) => {
                        ActionResult::failure(&step.kind, elapsed_ms(started), err.to_string())
                    }
                    Ok(Err(_panic)) => {
                        warn!(session_id, action = %step.kind, "Action executor panicked");
                        ActionResult::failure(&step.kind, elapsed_ms(started), EXECUTOR_PANICKED)
                    }
                    Err(_) if deadline_bound => ActionResult::failure(
                        &step.kind,
                        elapsed_ms(started),
                        RUN_DEADLINE_EXCEEDED,
                    ),
                    Err(_) => {
                        ActionResult::failure(&step.kind, elapsed_ms(started), ACTION_TIMEOUT)
                    }
                }
            };

            debug!(
                session_id,
                scenario = %scenario.name,
                action = %result.action_kind,
                duration_ms = result.duration_ms,
                succeeded = result.succeeded,
                "Action finished"
            );

            let failed = !result.succeeded;
            actions.push(result);
            if failed {
                break;
            }
        }

        // Executors may report latency without spending it here
        let reported_secs = actions.iter().map(|a| a.duration_ms as f64).sum::<f64>() / 1000.0;
        let measured_secs = session_started.elapsed().as_secs_f64();

        let result = SessionResult::from_actions(
            session_id,
            &scenario.name,
            actions,
            measured_secs.max(reported_secs),
        );

        debug!(
            session_id,
            scenario = %scenario.name,
            succeeded = result.succeeded,
            total_secs = result.total_duration_secs,
            "Session finished"
        );

        result
    }

    fn budget_for(&self, now: Instant, run_deadline: Option<Instant>) -> (Duration, bool) {
        match run_deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(now);
                if remaining < self.action_timeout {
                    (remaining, true)
                } else {
                    (self.action_timeout, false)
                }
            }
            None => (self.action_timeout, false),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
