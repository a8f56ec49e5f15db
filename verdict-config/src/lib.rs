//! Domain-driven configuration management for Verdict
//!
//! This crate provides modular configuration split by functional domains
//! (load run shape, scenario catalog, synthetic executor, scoring tables and
//! logging), with validation, defaults, and environment variable support.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    catalog::CatalogConfig,
    load::LoadConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    scoring::{
        Comparison, MeasurementRule, Metric, PenaltyTable, ReadinessBreakpoints, ReadinessGates,
        ScoringConfig, ThresholdRule, ThresholdTier, MAX_WEIGHT_TOLERANCE,
    },
    synthetic::{ActionProfile, SyntheticConfig},
    VerdictConfig,
};
