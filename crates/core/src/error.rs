//! Error types for the command-execution core
//!
//! Every failure a caller can observe is an [`EngineError`]. We use `thiserror`
//! for the `Display` and `Error` implementations.
//!
//! | Kind | Retried | Notes |
//! |------|---------|-------|
//! | `IllegalStateTransition` | no | raised before any mutation |
//! | `AuthorizationDenied` | no | carries every missing grant |
//! | `OptimisticLock` | yes, bounded | normally absorbed by the retry interceptor |
//! | `TaskAlreadyClaimed` | no | carries task id and current holder |
//! | `Persistence` | no | wraps the backend cause |

use std::fmt;

use thiserror::Error;

use crate::auth::MissingGrant;
use crate::entity::EntityKind;
use crate::lifecycle::{LifecycleState, TransitionKind};

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Boxed cause carried by persistence failures
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error hierarchy rooted at the engine error
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller lacks one or more required grants
    #[error("user '{user_id}' is missing {} grant(s): {}", .missing.len(), DisplayGrants(.missing))]
    AuthorizationDenied {
        /// Authenticated user the checks ran for
        user_id: String,
        /// Every grant that was missing, in check order
        missing: Vec<MissingGrant>,
    },

    /// A conditional update found a different revision than the one loaded
    #[error("optimistic lock conflict on {kind} '{id}': expected revision {expected_revision}")]
    OptimisticLock {
        /// Entity kind that failed the revision check
        kind: EntityKind,
        /// Entity id
        id: String,
        /// Revision the session loaded
        expected_revision: u64,
    },

    /// Claim attempted on a task already held by someone else
    #[error("task '{task_id}' is already claimed by '{assignee}'")]
    TaskAlreadyClaimed {
        /// Task being claimed
        task_id: String,
        /// Current holder
        assignee: String,
    },

    /// Transition not legal from the entity's current state
    #[error("cannot {transition} case execution '{execution_id}' in state {state}")]
    IllegalStateTransition {
        /// Target case execution
        execution_id: String,
        /// Requested transition
        transition: TransitionKind,
        /// State found at validation time
        state: LifecycleState,
    },

    /// Session flush or close failure
    #[error("persistence failure during {operation}: {source}")]
    Persistence {
        /// What the session was doing
        operation: String,
        /// Underlying backend error
        #[source]
        source: BoxedCause,
    },

    /// Entity does not exist
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Entity kind
        kind: EntityKind,
        /// Requested id
        id: String,
    },

    /// Bad command input
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong
        reason: String,
    },

    /// Invalid engine configuration
    #[error("configuration error: {reason}")]
    Configuration {
        /// What was wrong
        reason: String,
    },

    /// Invariant violation (a bug)
    #[error("internal error: {reason}")]
    Internal {
        /// Description
        reason: String,
    },
}

impl EngineError {
    /// Build an `InvalidInput` error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Build a `Configuration` error
    pub fn configuration(reason: impl Into<String>) -> Self {
        EngineError::Configuration {
            reason: reason.into(),
        }
    }

    /// Build an `Internal` error
    pub fn internal(reason: impl Into<String>) -> Self {
        EngineError::Internal {
            reason: reason.into(),
        }
    }

    /// Wrap a backend error raised while flushing or closing a session
    pub fn persistence(
        operation: impl Into<String>,
        source: impl Into<BoxedCause>,
    ) -> Self {
        EngineError::Persistence {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Build a `NotFound` error
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for revision mismatches detected at flush time
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::OptimisticLock { .. })
    }

    /// True if re-running the command in a fresh unit of work may succeed
    ///
    /// Only optimistic-lock conflicts qualify. A claim conflict is a
    /// conflict too, but re-running cannot make the caller the holder.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }

    /// True for errors caused by the request or by concurrent callers,
    /// as opposed to failures of the engine or its backends
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            EngineError::Persistence { .. }
                | EngineError::Configuration { .. }
                | EngineError::Internal { .. }
        )
    }
}

struct DisplayGrants<'a>(&'a [MissingGrant]);

impl fmt::Display for DisplayGrants<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, grant) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", grant)?;
        }
        Ok(())
    }
}
