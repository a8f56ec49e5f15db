//! Resource sampling on a fixed cadence
//!
//! The sampler runs on its own schedule for its own duration. It is not tied
//! to session completion, so the idle tail of a run is observed too.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, warn};
use verdict_core::ResourceSample;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Source of resident memory readings
pub trait MemoryProbe: Send + Sync {
    /// Current resident memory in megabytes, if it can be read
    fn resident_memory_mb(&self) -> Option<f64>;
}

/// Reads this process's resident set size through sysinfo
pub struct SysinfoProbe {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(err) => {
                warn!("Cannot resolve current process id, memory samples disabled: {}", err);
                None
            }
        };

        Self {
            pid,
            system: Mutex::new(System::new_with_specifics(
                RefreshKind::nothing().with_processes(Self::refresh_kind()),
            )),
        }
    }

    fn refresh_kind() -> ProcessRefreshKind {
        ProcessRefreshKind::nothing().with_memory()
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SysinfoProbe {
    fn resident_memory_mb(&self) -> Option<f64> {
        let pid = self.pid?;
        let mut system = self.system.lock();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            Self::refresh_kind(),
        );
        system
            .process(pid)
            .map(|process| process.memory() as f64 / BYTES_PER_MB)
    }
}

/// Records a resource sample every `interval` until `duration` has elapsed
pub struct ResourceSampler {
    probe: Arc<dyn MemoryProbe>,
    interval: Duration,
    duration: Duration,
}

impl ResourceSampler {
    pub fn new(probe: Arc<dyn MemoryProbe>, interval: Duration, duration: Duration) -> Self {
        Self {
            probe,
            interval,
            duration,
        }
    }

    /// Sample until the configured duration, or `run_deadline` if that comes first.
    ///
    /// The first sample is taken immediately. A zero interval takes no samples.
    pub async fn run(&self, run_deadline: Option<Instant>) -> Vec<ResourceSample> {
        let started = Instant::now();
        let mut stop_at = started + self.duration;
        if let Some(deadline) = run_deadline {
            stop_at = stop_at.min(deadline);
        }

        let mut samples = Vec::new();
        if self.interval.is_zero() {
            return samples;
        }

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = sleep_until(stop_at) => break,
                _ = ticker.tick() => {}
            }

            let now = Instant::now();
            if now >= stop_at {
                break;
            }

            match self.probe.resident_memory_mb() {
                Some(resident_memory_mb) => samples.push(ResourceSample {
                    timestamp_offset_secs: now.duration_since(started).as_secs_f64(),
                    resident_memory_mb,
                }),
                None => debug!("Memory probe returned no reading"),
            }
        }

        debug!(samples = samples.len(), "Resource sampler finished");
        samples
    }
}
