//! Session orchestration
//!
//! Launches every session as its own task under a concurrency bound, runs the
//! resource sampler next to them and joins both. The returned run always
//! carries exactly one result per requested session.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};
use uuid::Uuid;
use verdict_config::LoadConfig;
use verdict_core::{ResourceSample, Result, Scenario, SessionResult, VerdictError};

use crate::executor::ActionExecutor;
use crate::sampler::{MemoryProbe, ResourceSampler, SysinfoProbe};
use crate::selector::ScenarioSelector;
use crate::session::{SessionSimulator, EXECUTOR_PANICKED, RUN_DEADLINE_EXCEEDED};

/// Shape of one load run
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub session_count: usize,
    pub concurrency_limit: usize,
    pub action_timeout: Duration,
    pub sample_interval: Duration,
    pub sample_duration: Duration,
    pub run_deadline: Option<Duration>,
    pub seed: Option<u64>,
}

impl RunPlan {
    /// A plan with the default timeout and sampling cadence
    pub fn new(session_count: usize, concurrency_limit: usize) -> Self {
        Self {
            session_count,
            concurrency_limit,
            ..Self::from(&LoadConfig::default())
        }
    }

    pub fn with_sampling(mut self, interval: Duration, duration: Duration) -> Self {
        self.sample_interval = interval;
        self.sample_duration = duration;
        self
    }

    pub fn with_action_timeout(mut self, action_timeout: Duration) -> Self {
        self.action_timeout = action_timeout;
        self
    }

    pub fn with_run_deadline(mut self, run_deadline: Duration) -> Self {
        self.run_deadline = Some(run_deadline);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(VerdictError::InvalidConfiguration(
                "concurrency_limit must be at least 1".to_string(),
            ));
        }
        if self.sample_interval.is_zero() {
            return Err(VerdictError::InvalidConfiguration(
                "sample_interval must be greater than zero".to_string(),
            ));
        }
        if self.action_timeout.is_zero() {
            return Err(VerdictError::InvalidConfiguration(
                "action_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&LoadConfig> for RunPlan {
    fn from(config: &LoadConfig) -> Self {
        Self {
            session_count: config.session_count,
            concurrency_limit: config.concurrency_limit,
            action_timeout: config.action_timeout,
            sample_interval: config.sample_interval,
            sample_duration: config.sample_duration,
            run_deadline: config.run_deadline,
            seed: config.seed,
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Seed the scenario draws were made with
    pub seed: u64,
    /// One result per session, ordered by session id
    pub sessions: Vec<SessionResult>,
    pub samples: Vec<ResourceSample>,
    #[serde(rename = "wall_clock_secs", serialize_with = "serialize_secs")]
    pub wall_clock: Duration,
}

impl RunOutput {
    pub fn wall_clock_secs(&self) -> f64 {
        self.wall_clock.as_secs_f64()
    }
}

fn serialize_secs<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Drives a load run against an action executor
pub struct SessionOrchestrator {
    executor: Arc<dyn ActionExecutor>,
    probe: Arc<dyn MemoryProbe>,
}

impl SessionOrchestrator {
    /// Orchestrator sampling this process's memory
    pub fn new(executor: Arc<dyn ActionExecutor>) -> Self {
        Self::with_probe(executor, Arc::new(SysinfoProbe::new()))
    }

    pub fn with_probe(executor: Arc<dyn ActionExecutor>, probe: Arc<dyn MemoryProbe>) -> Self {
        Self { executor, probe }
    }

    /// Execute `plan.session_count` sessions drawn from `catalog`.
    ///
    /// Returns once every session and the sampler have finished. Catalog and
    /// plan problems are rejected before anything runs; everything that goes
    /// wrong afterwards is recorded on the session results.
    pub async fn execute(&self, catalog: &[Scenario], plan: &RunPlan) -> Result<RunOutput> {
        let selector = ScenarioSelector::new(catalog)?;
        plan.validate()?;

        let seed = plan.seed.unwrap_or_else(rand::random);
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = Instant::now();
        let deadline = plan.run_deadline.map(|d| started + d);

        info!(
            %run_id,
            sessions = plan.session_count,
            concurrency = plan.concurrency_limit,
            seed,
            "Starting load run"
        );

        let sampler = ResourceSampler::new(
            self.probe.clone(),
            plan.sample_interval,
            plan.sample_duration,
        );
        let sampler_handle = tokio::spawn(async move { sampler.run(deadline).await });

        // Draw in submission order so a seed reproduces the same workload
        let mut rng = StdRng::seed_from_u64(seed);
        let shared: Vec<Arc<Scenario>> = catalog.iter().cloned().map(Arc::new).collect();

        let simulator = Arc::new(SessionSimulator::new(
            self.executor.clone(),
            plan.action_timeout,
        ));
        let semaphore = Arc::new(Semaphore::new(plan.concurrency_limit));
        let results = Arc::new(Mutex::new(Vec::with_capacity(plan.session_count)));
        let mut handles = Vec::with_capacity(plan.session_count);

        for session_id in 0..plan.session_count as u64 {
            let scenario = shared[selector.select_index(&mut rng)].clone();
            let scenario_name = scenario.name.clone();

            let handle = tokio::spawn(run_session(
                session_id,
                scenario,
                simulator.clone(),
                semaphore.clone(),
                deadline,
                results.clone(),
            ));
            handles.push((session_id, scenario_name, handle));
        }

        for (session_id, scenario_name, handle) in handles {
            if let Err(err) = handle.await {
                warn!(session_id, "Session task failed to complete: {}", err);
                results.lock().push(SessionResult::aborted(
                    session_id,
                    scenario_name,
                    0.0,
                    EXECUTOR_PANICKED,
                ));
            }
        }

        let samples = match sampler_handle.await {
            Ok(samples) => samples,
            Err(err) => {
                warn!("Resource sampler failed to complete: {}", err);
                Vec::new()
            }
        };

        let wall_clock = started.elapsed();
        let mut sessions = std::mem::take(&mut *results.lock());
        sessions.sort_by_key(|s| s.session_id);

        let failed = sessions.iter().filter(|s| !s.succeeded).count();
        info!(
            %run_id,
            sessions = sessions.len(),
            failed,
            samples = samples.len(),
            wall_clock_secs = wall_clock.as_secs_f64(),
            "Load run finished"
        );

        Ok(RunOutput {
            run_id,
            started_at,
            seed,
            sessions,
            samples,
            wall_clock,
        })
    }
}

async fn run_session(
    session_id: u64,
    scenario: Arc<Scenario>,
    simulator: Arc<SessionSimulator>,
    semaphore: Arc<Semaphore>,
    deadline: Option<Instant>,
    results: Arc<Mutex<Vec<SessionResult>>>,
) {
    let queued = Instant::now();
    let acquire = semaphore.acquire_owned();
    let permit = match deadline {
        Some(deadline) => timeout_at(deadline, acquire).await.ok(),
        None => Some(acquire.await),
    };

    let result = match permit {
        Some(Ok(permit)) => {
            let result = simulator.run(session_id, &scenario, deadline).await;
            drop(permit);
            result
        }
        Some(Err(_closed)) => SessionResult::aborted(
            session_id,
            &scenario.name,
            queued.elapsed().as_secs_f64(),
            "concurrency limiter closed",
        ),
        // Still queued when the run deadline passed
        None => SessionResult::aborted(
            session_id,
            &scenario.name,
            queued.elapsed().as_secs_f64(),
            RUN_DEADLINE_EXCEEDED,
        ),
    };

    results.lock().push(result);
}
