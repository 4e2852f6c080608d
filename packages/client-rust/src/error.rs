//! Error types for handler wiring and per-call failures.

use std::sync::Arc;

use switchyard_core::ValidationError;

/// Wiring problems detected while building the registry or a facade.
///
/// These are deployment errors: a facade that fails with one of these is
/// never constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no handler bound for action `{action}`")]
    MissingHandler { action: &'static str },
    #[error("handler bound for action `{action}` has type {found}, expected {expected}")]
    HandlerTypeMismatch {
        action: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("action `{action}` is bound more than once")]
    DuplicateHandler { action: String },
}

/// Failure delivered through a [`Completion`](crate::Completion).
///
/// `Clone` so the one recorded failure can be handed to every observer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("action `{action}` is not implemented")]
    NotImplemented { action: &'static str },
    #[error("action `{action}` timed out after {timeout_ms}ms")]
    Timeout { action: &'static str, timeout_ms: u64 },
    #[error("gave up waiting for a result after {waited_ms}ms")]
    WaitTimeout { waited_ms: u64 },
    #[error("action `{action}` rejected: too many concurrent actions")]
    Overloaded { action: &'static str },
    #[error("executor `{executor}` rejected the task: thread pool is shut down")]
    Rejected { executor: &'static str },
    #[error("handler dropped the request without responding")]
    Abandoned,
    #[error("action `{action}` failed: {reason}")]
    Failed { action: &'static str, reason: String },
    #[error("internal error: {0}")]
    Internal(Arc<anyhow::Error>),
}

impl ActionError {
    /// Domain failure reported by a handler.
    pub fn failed(action: &'static str, reason: impl Into<String>) -> Self {
        Self::Failed {
            action,
            reason: reason.into(),
        }
    }

    /// `true` for the two timeout kinds.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::WaitTimeout { .. })
    }
}

impl From<anyhow::Error> for ActionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }
}

/// Result of a single action call.
pub type ActionResult<T> = Result<T, ActionError>;
