//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant:
//!
//! | Command | Output |
//! |---------|--------|
//! | case-execution transitions, `CloseCaseInstance` | `State` |
//! | `CreateCaseInstance`, `GetCaseExecution` | `CaseExecution` |
//! | `ClaimTask`, `CompleteTask`, `SetJobPriority` | `Unit` |
//! | `GetTask` | `Task` |
//! | `GetJob` | `Job` |
//! | `GetVariable` | `Maybe` |

use cadence_core::{CaseExecution, Job, LifecycleState, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful command execution results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// No return value
    Unit,

    /// Lifecycle state reached by a transition
    State(LifecycleState),

    /// A case execution or case instance
    CaseExecution(Box<CaseExecution>),

    /// A task
    Task(Box<Task>),

    /// A job
    Job(Job),

    /// Optional variable value
    Maybe(Option<Value>),
}
