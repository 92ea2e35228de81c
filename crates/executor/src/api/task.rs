//! Task operations.

use cadence_core::{EngineError, EngineResult, Task, VariableMutations};

use super::Cadence;
use crate::{EngineCommand, Output};

impl Cadence {
    /// Claim a task for `user_id`.
    ///
    /// Fails with `TaskAlreadyClaimed` if someone else holds it.
    pub fn claim_task(&self, task_id: &str, user_id: &str) -> EngineResult<()> {
        self.set_assignee(task_id, Some(user_id))
    }

    /// Release a task.
    pub fn unclaim_task(&self, task_id: &str) -> EngineResult<()> {
        self.set_assignee(task_id, None)
    }

    fn set_assignee(&self, task_id: &str, user_id: Option<&str>) -> EngineResult<()> {
        match self.execute(&EngineCommand::ClaimTask {
            task_id: task_id.to_string(),
            user_id: user_id.map(str::to_string),
        })? {
            Output::Unit => Ok(()),
            _ => Err(EngineError::internal("Unexpected output for ClaimTask")),
        }
    }

    /// Complete a task and its case execution.
    pub fn complete_task(&self, task_id: &str, variables: VariableMutations) -> EngineResult<()> {
        match self.execute(&EngineCommand::CompleteTask {
            task_id: task_id.to_string(),
            variables,
        })? {
            Output::Unit => Ok(()),
            _ => Err(EngineError::internal("Unexpected output for CompleteTask")),
        }
    }

    /// Load a task.
    pub fn task(&self, task_id: &str) -> EngineResult<Task> {
        match self.execute(&EngineCommand::GetTask {
            task_id: task_id.to_string(),
        })? {
            Output::Task(task) => Ok(*task),
            _ => Err(EngineError::internal("Unexpected output for GetTask")),
        }
    }
}
