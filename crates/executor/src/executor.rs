//! Dispatch of built-in commands.
//!
//! `EngineCommand` implements the engine's [`Command`] contract: permission
//! checks and execution both match on the variant and hand off to the
//! handler for its entity. The interceptor chain does the rest.

use cadence_core::{EngineResult, PermissionCheck};
use cadence_engine::{Command, CommandContext, CommandExecutor};

use crate::command::EngineCommand;
use crate::handlers;
use crate::output::Output;

impl Command for EngineCommand {
    type Output = Output;

    fn name(&self) -> &'static str {
        EngineCommand::name(self)
    }

    fn required_permissions(&self, context: &mut CommandContext) -> EngineResult<Vec<PermissionCheck>> {
        if let Some((_, execution_id, _)) = self.as_transition() {
            return handlers::case_execution::update_check(context, execution_id);
        }

        match self {
            EngineCommand::CreateCaseInstance { definition_key, .. } => {
                Ok(handlers::case_instance::create_checks(definition_key))
            }
            EngineCommand::ClaimTask { task_id, .. } | EngineCommand::CompleteTask { task_id, .. } => {
                Ok(handlers::task::work_check(task_id))
            }
            EngineCommand::SetJobPriority { job_id, .. } => handlers::job::update_check(context, job_id),
            EngineCommand::GetCaseExecution { execution_id }
            | EngineCommand::GetVariable { execution_id, .. } => {
                handlers::read::case_execution_check(context, execution_id)
            }
            EngineCommand::GetTask { task_id } => Ok(handlers::read::task_check(task_id)),
            EngineCommand::GetJob { job_id } => handlers::read::job_check(context, job_id),
            // Transitions returned above
            _ => Ok(Vec::new()),
        }
    }

    fn execute(&self, context: &mut CommandContext, executor: &CommandExecutor) -> EngineResult<Output> {
        if let Some((kind, execution_id, variables)) = self.as_transition() {
            return handlers::case_execution::transition(context, kind, execution_id, variables);
        }

        match self {
            EngineCommand::CreateCaseInstance {
                definition_key,
                business_key,
                variables,
            } => handlers::case_instance::create_case_instance(
                context,
                definition_key,
                business_key.as_deref(),
                variables,
            ),
            EngineCommand::ClaimTask { task_id, user_id } => {
                handlers::task::claim_task(context, task_id, user_id.as_deref())
            }
            EngineCommand::CompleteTask { task_id, variables } => {
                handlers::task::complete_task(context, executor, task_id, variables)
            }
            EngineCommand::SetJobPriority { job_id, priority } => {
                handlers::job::set_job_priority(context, job_id, *priority)
            }
            EngineCommand::GetCaseExecution { execution_id } => {
                handlers::read::get_case_execution(context, execution_id)
            }
            EngineCommand::GetTask { task_id } => handlers::read::get_task(context, task_id),
            EngineCommand::GetJob { job_id } => handlers::read::get_job(context, job_id),
            EngineCommand::GetVariable { execution_id, name } => {
                handlers::read::get_variable(context, execution_id, name)
            }
            EngineCommand::EnableCaseExecution { .. }
            | EngineCommand::DisableCaseExecution { .. }
            | EngineCommand::ReenableCaseExecution { .. }
            | EngineCommand::StartCaseExecution { .. }
            | EngineCommand::CompleteCaseExecution { .. }
            | EngineCommand::SuspendCaseExecution { .. }
            | EngineCommand::ResumeCaseExecution { .. }
            | EngineCommand::TerminateCaseExecution { .. }
            | EngineCommand::CloseCaseInstance { .. } => Err(cadence_core::EngineError::internal(format!(
                "{} was not dispatched as a transition",
                self.name()
            ))),
        }
    }
}
