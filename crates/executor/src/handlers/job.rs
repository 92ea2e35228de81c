//! Job handlers.

use cadence_core::{EngineResult, Grant, Permission, PermissionCheck, Resource, ResourceId};
use cadence_engine::CommandContext;
use tracing::debug;

use crate::Output;

/// Handle SetJobPriority.
pub fn set_job_priority(context: &mut CommandContext, job_id: &str, priority: i64) -> EngineResult<Output> {
    let job = context.db_session()?.job(job_id)?;
    let previous = job.priority;
    job.priority = priority;
    debug!(target: "cadence::state", job = job_id, previous, priority, "Job priority set");
    Ok(Output::Unit)
}

/// UPDATE on the job's process instance, or UPDATE_INSTANCE on its
/// process definition.
pub fn update_check(context: &mut CommandContext, job_id: &str) -> EngineResult<Vec<PermissionCheck>> {
    let job = context.db_session()?.job(job_id)?;
    Ok(vec![PermissionCheck::AnyOf(vec![
        Grant::new(
            Resource::ProcessInstance,
            ResourceId::specific(job.process_instance_id.clone()),
            Permission::Update,
        ),
        Grant::new(
            Resource::ProcessDefinition,
            ResourceId::specific(job.process_definition_key.clone()),
            Permission::UpdateInstance,
        ),
    ])])
}
