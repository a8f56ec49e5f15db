//! Logging bootstrap for Verdict
//!
//! Every crate in the workspace logs through `tracing`; this crate only decides
//! where those events go and how they are rendered.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
