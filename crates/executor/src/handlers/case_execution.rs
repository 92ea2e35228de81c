//! Case-execution lifecycle handlers.

use cadence_core::{
    EngineResult, Grant, Permission, PermissionCheck, Resource, ResourceId, TransitionKind,
    VariableMutations,
};
use cadence_engine::{state_machine, CommandContext};

use crate::Output;

/// Handle every lifecycle transition command.
pub fn transition(
    context: &mut CommandContext,
    kind: TransitionKind,
    execution_id: &str,
    variables: &VariableMutations,
) -> EngineResult<Output> {
    let state = state_machine::transition(context, execution_id, kind, variables)?;
    Ok(Output::State(state))
}

/// UPDATE on the case instance, or UPDATE_INSTANCE on its definition.
pub fn update_check(context: &mut CommandContext, execution_id: &str) -> EngineResult<Vec<PermissionCheck>> {
    let execution = context.db_session()?.case_execution(execution_id)?;
    Ok(vec![PermissionCheck::AnyOf(vec![
        Grant::new(
            Resource::CaseInstance,
            ResourceId::specific(execution.case_instance_id.clone()),
            Permission::Update,
        ),
        Grant::new(
            Resource::CaseDefinition,
            ResourceId::specific(execution.definition_key.clone()),
            Permission::UpdateInstance,
        ),
    ])])
}
