//! Verdict Execution Engine
//!
//! Runs synthetic user sessions against an [`ActionExecutor`]: weighted
//! scenario selection, bounded-concurrency session execution with per-action
//! timing, and an independent resource sampler.

pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod sampler;
pub mod selector;
pub mod session;
pub mod synthetic;

// Re-export main types
pub use error::ExecutorError;
pub use executor::{ActionExecutor, ActionOutcome};
pub use orchestrator::{RunOutput, RunPlan, SessionOrchestrator};
pub use sampler::{MemoryProbe, ResourceSampler, SysinfoProbe};
pub use selector::{select_scenario, validate_catalog, ScenarioSelector};
pub use session::{SessionSimulator, ACTION_TIMEOUT, EXECUTOR_PANICKED, RUN_DEADLINE_EXCEEDED};
pub use synthetic::SyntheticExecutor;
