//! Load simulation under concurrency
//!
//! Drives the orchestrator with many sessions against executors with random
//! latency or constant failure, on paused tokio time so the runs are fast
//! and the timing assertions are exact.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use verdict_core::{ActionStep, Scenario};
use verdict_execution::{
    ActionExecutor, ActionOutcome, ExecutorError, MemoryProbe, RunPlan, SessionOrchestrator,
    RUN_DEADLINE_EXCEEDED,
};
use verdict_scoring::summarize;

struct FlatProbe;

impl MemoryProbe for FlatProbe {
    fn resident_memory_mb(&self) -> Option<f64> {
        Some(128.0)
    }
}

/// Random latency between `min_ms` and `max_ms` per action
struct JitterExecutor {
    rng: Mutex<fastrand::Rng>,
    min_ms: u64,
    max_ms: u64,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl JitterExecutor {
    fn new(seed: u64, min_ms: u64, max_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
            min_ms,
            max_ms,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ActionExecutor for JitterExecutor {
    async fn perform(
        &self,
        _step: &ActionStep,
        _deadline: Duration,
    ) -> Result<ActionOutcome, ExecutorError> {
        let latency = self.rng.lock().u64(self.min_ms..=self.max_ms);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        sleep(Duration::from_millis(latency)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(ActionOutcome::success())
    }
}

struct BrokenTarget;

#[async_trait]
impl ActionExecutor for BrokenTarget {
    async fn perform(
        &self,
        step: &ActionStep,
        _deadline: Duration,
    ) -> Result<ActionOutcome, ExecutorError> {
        sleep(Duration::from_millis(3)).await;
        Err(ExecutorError::Unavailable(format!("{} refused", step.kind)))
    }
}

fn catalog() -> Vec<Scenario> {
    vec![
        Scenario::from_kinds("A", 4.0, &["login", "view_dashboard"]),
        Scenario::from_kinds("B", 1.0, &["login", "add_expense"]),
    ]
}

fn plan(sessions: usize, concurrency: usize) -> RunPlan {
    RunPlan::new(sessions, concurrency)
        .with_sampling(Duration::from_millis(250), Duration::from_secs(1))
        .with_seed(2024)
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_stress() {
    let executor = JitterExecutor::new(7, 10, 40);
    let orchestrator = SessionOrchestrator::with_probe(executor.clone(), Arc::new(FlatProbe));

    let output = orchestrator
        .execute(&catalog(), &plan(500, 10))
        .await
        .unwrap();

    assert_eq!(output.sessions.len(), 500);
    let ids: HashSet<u64> = output.sessions.iter().map(|s| s.session_id).collect();
    assert_eq!(ids.len(), 500);
    assert!(output.sessions.iter().all(|s| s.succeeded));
    assert!(executor.peak.load(Ordering::SeqCst) <= 10);

    let min_session = output
        .sessions
        .iter()
        .map(|s| s.total_duration_secs)
        .fold(f64::INFINITY, f64::min);
    assert!(min_session >= 0.020);
    assert!(output.wall_clock_secs() >= (500.0 / 10.0) * min_session);

    let summary = summarize(&output.sessions, output.wall_clock_secs()).unwrap();
    assert_eq!(summary.total_sessions, 500);
    assert_eq!(summary.success_rate_percent, 100.0);
    assert!(summary.throughput_per_second > 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_executor() {
    let orchestrator = SessionOrchestrator::with_probe(Arc::new(BrokenTarget), Arc::new(FlatProbe));

    let output = orchestrator
        .execute(&catalog(), &plan(100, 7))
        .await
        .unwrap();

    assert_eq!(output.sessions.len(), 100);
    for session in &output.sessions {
        assert!(!session.succeeded);
        assert_eq!(session.actions.len(), 1);
        assert_eq!(session.actions[0].action_kind, "login");
    }

    let summary = summarize(&output.sessions, output.wall_clock_secs()).unwrap();
    assert_eq!(summary.success_rate_percent, 0.0);
    assert_eq!(summary.error_rate_percent, 100.0);
    assert!(summary.no_successful_sessions);
    assert_eq!(summary.average_session_secs, 0.0);
    assert_eq!(summary.error_details.values().sum::<usize>(), 100);
}

#[tokio::test(start_paused = true)]
async fn test_weighted_selection_through_orchestrator() {
    let executor = JitterExecutor::new(1, 1, 1);
    let orchestrator = SessionOrchestrator::with_probe(executor, Arc::new(FlatProbe));

    let output = orchestrator
        .execute(&catalog(), &plan(1000, 50).with_seed(42))
        .await
        .unwrap();

    let picked_a = output
        .sessions
        .iter()
        .filter(|s| s.scenario_name == "A")
        .count();
    assert!((740..=860).contains(&picked_a), "A picked {} times", picked_a);

    let summary = summarize(&output.sessions, output.wall_clock_secs()).unwrap();
    assert_eq!(summary.per_scenario["A"].sessions, picked_a);
    assert_eq!(summary.per_scenario["B"].sessions, 1000 - picked_a);
}

#[tokio::test(start_paused = true)]
async fn test_run_deadline_bounds_the_run() {
    let executor = JitterExecutor::new(3, 50, 50);
    let orchestrator = SessionOrchestrator::with_probe(executor, Arc::new(FlatProbe));

    let output = orchestrator
        .execute(
            &catalog(),
            &plan(40, 2).with_run_deadline(Duration::from_millis(470)),
        )
        .await
        .unwrap();

    assert_eq!(output.sessions.len(), 40);
    let completed = output.sessions.iter().filter(|s| s.succeeded).count();
    // Two lanes of 100ms sessions finish four each before 470ms
    assert_eq!(completed, 8);
    assert!(output
        .sessions
        .iter()
        .filter(|s| !s.succeeded)
        .all(|s| s.error_detail.as_deref() == Some(RUN_DEADLINE_EXCEEDED)));
    assert!(output.wall_clock <= Duration::from_millis(480));
}
