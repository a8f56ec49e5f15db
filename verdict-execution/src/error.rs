//! Error types for action execution

use thiserror::Error;

/// Errors an action executor may raise instead of reporting an outcome.
///
/// These never escape a session: the simulator records them as the failing
/// action's error detail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutorError {
    #[error("Action failed: {0}")]
    ActionFailed(String),

    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Executor unavailable: {0}")]
    Unavailable(String),
}
