//! Seeded synthetic executor
//!
//! Stands in for a real target when the engine itself is being exercised.
//! Latency and failures are drawn from per-action profiles with a fixed seed,
//! so two runs on a single-threaded runtime behave identically.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::trace;
use verdict_config::SyntheticConfig;
use verdict_core::ActionStep;

use crate::error::ExecutorError;
use crate::executor::{ActionExecutor, ActionOutcome};

pub struct SyntheticExecutor {
    config: SyntheticConfig,
    rng: Mutex<fastrand::Rng>,
}

impl SyntheticExecutor {
    pub fn new(config: SyntheticConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }

    /// Use the configured seed, then `fallback_seed`, then a random one
    pub fn from_config(config: &SyntheticConfig, fallback_seed: Option<u64>) -> Self {
        let seed = config
            .seed
            .or(fallback_seed)
            .unwrap_or_else(|| fastrand::u64(..));
        Self::new(config.clone(), seed)
    }

    fn draw(&self, kind: &str) -> (Duration, bool) {
        let profile = self.config.profile_for(kind);
        let mut rng = self.rng.lock();

        let jitter_ms = u64::try_from(profile.jitter.as_millis()).unwrap_or(u64::MAX);
        let extra = if jitter_ms > 0 { rng.u64(0..jitter_ms) } else { 0 };
        let succeeded = rng.f64() < profile.success_rate;

        (profile.base_latency + Duration::from_millis(extra), succeeded)
    }
}

#[async_trait]
impl ActionExecutor for SyntheticExecutor {
    async fn perform(
        &self,
        step: &ActionStep,
        _deadline: Duration,
    ) -> Result<ActionOutcome, ExecutorError> {
        let (latency, succeeded) = self.draw(&step.kind);
        trace!(action = %step.kind, latency_ms = latency.as_millis() as u64, succeeded, "Synthetic action");

        sleep(latency).await;

        if succeeded {
            Ok(ActionOutcome::success())
        } else {
            Ok(ActionOutcome::failure(format!(
                "synthetic failure in '{}'",
                step.kind
            )))
        }
    }
}
