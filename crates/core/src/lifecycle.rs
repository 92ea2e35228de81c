//! Lifecycle states and the transition table for case executions
//!
//! The table is the single source of truth for which transitions are legal.
//! A transition resolves to a *path*: the ordered states the execution moves
//! through. Most paths have one step; completing an ENABLED execution passes
//! through ACTIVE first.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// Lifecycle state of a case execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// Created, waiting for its entry criteria
    Available,
    /// Ready to be started manually
    Enabled,
    /// Manually disabled; counts as done for parent completion
    Disabled,
    /// Running
    Active,
    /// Paused; remembers the state it was suspended from
    Suspended,
    /// Finished normally
    Completed,
    /// Finished abnormally
    Terminated,
    /// Case instance closed after completion or termination
    Closed,
}

impl LifecycleState {
    /// Upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Available => "AVAILABLE",
            LifecycleState::Enabled => "ENABLED",
            LifecycleState::Disabled => "DISABLED",
            LifecycleState::Active => "ACTIVE",
            LifecycleState::Suspended => "SUSPENDED",
            LifecycleState::Completed => "COMPLETED",
            LifecycleState::Terminated => "TERMINATED",
            LifecycleState::Closed => "CLOSED",
        }
    }

    /// No regular transition leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Completed | LifecycleState::Terminated | LifecycleState::Closed
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered states a transition moves through
pub type TransitionPath = SmallVec<[LifecycleState; 2]>;

/// Kind of lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// AVAILABLE → ENABLED
    Enable,
    /// ENABLED → DISABLED
    Disable,
    /// DISABLED → ENABLED
    Reenable,
    /// ENABLED → ACTIVE
    ManualStart,
    /// ACTIVE → COMPLETED, or ENABLED → ACTIVE → COMPLETED
    Complete,
    /// ACTIVE | ENABLED → SUSPENDED
    Suspend,
    /// SUSPENDED → state before suspension
    Resume,
    /// any non-terminal state → TERMINATED
    Terminate,
    /// COMPLETED | TERMINATED → CLOSED, case instances only
    Close,
}

impl TransitionKind {
    /// Lower-case verb
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Enable => "enable",
            TransitionKind::Disable => "disable",
            TransitionKind::Reenable => "re-enable",
            TransitionKind::ManualStart => "start",
            TransitionKind::Complete => "complete",
            TransitionKind::Suspend => "suspend",
            TransitionKind::Resume => "resume",
            TransitionKind::Terminate => "terminate",
            TransitionKind::Close => "close",
        }
    }

    /// Resolve the path from `current`, or `None` if the transition is illegal
    ///
    /// `suspended_from` is the state recorded when the execution was
    /// suspended; it is only consulted by `Resume`. `is_case_instance`
    /// gates `Close`.
    pub fn path(
        &self,
        current: LifecycleState,
        suspended_from: Option<LifecycleState>,
        is_case_instance: bool,
    ) -> Option<TransitionPath> {
        use LifecycleState::*;

        let path: TransitionPath = match (self, current) {
            (TransitionKind::Enable, Available) => smallvec![Enabled],
            (TransitionKind::Disable, Enabled) => smallvec![Disabled],
            (TransitionKind::Reenable, Disabled) => smallvec![Enabled],
            (TransitionKind::ManualStart, Enabled) => smallvec![Active],
            (TransitionKind::Complete, Active) => smallvec![Completed],
            (TransitionKind::Complete, Enabled) => smallvec![Active, Completed],
            (TransitionKind::Suspend, Active | Enabled) => smallvec![Suspended],
            (TransitionKind::Resume, Suspended) => smallvec![suspended_from?],
            (TransitionKind::Terminate, Available | Enabled | Disabled | Active | Suspended) => {
                smallvec![Terminated]
            }
            (TransitionKind::Close, Completed | Terminated) if is_case_instance => {
                smallvec![Closed]
            }
            _ => return None,
        };
        Some(path)
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
