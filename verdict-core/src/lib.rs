//! Core domain models and types for Verdict
//!
//! This crate contains the data model shared by the load simulator and the
//! scoring engine: scenarios and the results they produce, resource samples,
//! severity-tagged findings and the error taxonomy. It has minimal
//! dependencies and defines the domain language of the application.

pub mod error;
pub mod finding;
pub mod types;

// Re-export commonly used types at the crate root
pub use error::{Result, VerdictError};
pub use finding::{Finding, FindingRegistry, Severity, SeverityCounts};
pub use types::{ActionResult, ActionStep, ResourceSample, Scenario, SessionResult};
