//! Read handlers.
//!
//! Reads go through the same pipeline as writes. The session caches what
//! they load and flushes nothing.

use cadence_core::{EngineResult, Permission, PermissionCheck, Resource, ResourceId};
use cadence_engine::{state_machine, CommandContext};

use crate::Output;

/// Handle GetCaseExecution.
pub fn get_case_execution(context: &mut CommandContext, execution_id: &str) -> EngineResult<Output> {
    let execution = context.db_session()?.case_execution(execution_id)?;
    Ok(Output::CaseExecution(Box::new(execution.clone())))
}

/// Handle GetTask.
pub fn get_task(context: &mut CommandContext, task_id: &str) -> EngineResult<Output> {
    let task = context.db_session()?.task(task_id)?;
    Ok(Output::Task(Box::new(task.clone())))
}

/// Handle GetJob.
pub fn get_job(context: &mut CommandContext, job_id: &str) -> EngineResult<Output> {
    let job = context.db_session()?.job(job_id)?;
    Ok(Output::Job(job.clone()))
}

/// Handle GetVariable.
pub fn get_variable(context: &mut CommandContext, execution_id: &str, name: &str) -> EngineResult<Output> {
    let value = state_machine::resolve_variable(context.db_session()?, execution_id, name)?;
    Ok(Output::Maybe(value))
}

/// READ on the execution's case instance.
pub fn case_execution_check(context: &mut CommandContext, execution_id: &str) -> EngineResult<Vec<PermissionCheck>> {
    let execution = context.db_session()?.case_execution(execution_id)?;
    Ok(vec![PermissionCheck::atomic(
        Resource::CaseInstance,
        ResourceId::specific(execution.case_instance_id.clone()),
        Permission::Read,
    )])
}

/// READ on the task.
pub fn task_check(task_id: &str) -> Vec<PermissionCheck> {
    vec![PermissionCheck::atomic(
        Resource::Task,
        ResourceId::specific(task_id),
        Permission::Read,
    )]
}

/// READ on the job's process instance.
pub fn job_check(context: &mut CommandContext, job_id: &str) -> EngineResult<Vec<PermissionCheck>> {
    let job = context.db_session()?.job(job_id)?;
    Ok(vec![PermissionCheck::atomic(
        Resource::ProcessInstance,
        ResourceId::specific(job.process_instance_id.clone()),
        Permission::Read,
    )])
}
