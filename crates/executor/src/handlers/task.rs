//! Task handlers.

use cadence_core::{
    EngineError, EngineResult, Grant, Permission, PermissionCheck, Resource, ResourceId,
    VariableMutations,
};
use cadence_engine::{CommandContext, CommandExecutor};
use chrono::Utc;
use tracing::debug;

use crate::{EngineCommand, Output};

/// Handle ClaimTask.
///
/// `None` unclaims. Claiming a task the same user already holds is a no-op.
pub fn claim_task(context: &mut CommandContext, task_id: &str, user_id: Option<&str>) -> EngineResult<Output> {
    let task = context.db_session()?.task(task_id)?;
    let holder = task.assignee.clone();

    match (user_id, holder.as_deref()) {
        (None, None) => {}
        (None, Some(_)) => {
            task.assignee = None;
            task.claimed_at = None;
            debug!(target: "cadence::state", task = task_id, "Task unclaimed");
        }
        (Some(user), Some(current)) if current == user => {}
        (Some(_), Some(current)) => {
            return Err(EngineError::TaskAlreadyClaimed {
                task_id: task_id.to_string(),
                assignee: current.to_string(),
            });
        }
        (Some(user), None) => {
            task.assignee = Some(user.to_string());
            task.claimed_at = Some(Utc::now());
            debug!(target: "cadence::state", task = task_id, user, "Task claimed");
        }
    }
    Ok(Output::Unit)
}

/// Handle CompleteTask.
///
/// Deletes the task and completes its case execution in the same unit of
/// work. The nested completion skips authorization: the caller was already
/// checked against the task.
pub fn complete_task(
    context: &mut CommandContext,
    executor: &CommandExecutor,
    task_id: &str,
    variables: &VariableMutations,
) -> EngineResult<Output> {
    let session = context.db_session()?;
    let execution_id = session.task(task_id)?.case_execution_id.clone();
    if execution_id.is_none() && !variables.is_empty() {
        return Err(EngineError::invalid_input(format!(
            "task '{}' has no case execution to receive variables",
            task_id
        )));
    }
    session.delete(task_id)?;

    if let Some(execution_id) = execution_id {
        let completion = EngineCommand::CompleteCaseExecution {
            execution_id,
            variables: variables.clone(),
        };
        context.without_authorization(|ctx| executor.execute_nested(&completion, ctx))?;
    }
    Ok(Output::Unit)
}

/// UPDATE or TASK_WORK on the task.
pub fn work_check(task_id: &str) -> Vec<PermissionCheck> {
    vec![PermissionCheck::AnyOf(vec![
        Grant::new(Resource::Task, ResourceId::specific(task_id), Permission::Update),
        Grant::new(Resource::Task, ResourceId::specific(task_id), Permission::TaskWork),
    ])]
}
