//! Case instance creation.
//!
//! The whole execution tree is created in one unit of work: the case
//! instance for the plan, one child per plan item, and a task for every
//! human task. Items with manual activation start ENABLED; all others
//! start ACTIVE.

use cadence_core::{
    CaseExecution, DefinitionElement, ElementKind, EngineError, EngineResult, EntityRecord,
    LifecycleState, Permission, PermissionCheck, Resource, ResourceId, Task, Variables,
};
use cadence_engine::CommandContext;
use tracing::debug;

use crate::Output;

/// Handle CreateCaseInstance.
pub fn create_case_instance(
    context: &mut CommandContext,
    definition_key: &str,
    business_key: Option<&str>,
    variables: &Variables,
) -> EngineResult<Output> {
    let definition = context
        .services()
        .definitions()
        .find_case_definition(definition_key)
        .ok_or_else(|| {
            EngineError::invalid_input(format!("no case definition deployed under '{}'", definition_key))
        })?;

    let mut instance = CaseExecution::new_case_instance(&definition.key, &definition.plan.id);
    instance.business_key = business_key.map(str::to_string);
    instance.variables = variables.clone();

    let mut records = Vec::new();
    instantiate_items(&instance, &definition.plan.children, &mut records);

    let session = context.db_session()?;
    session.insert(instance.clone())?;
    let items = records.len();
    for record in records {
        session.insert(record)?;
    }

    debug!(
        target: "cadence::state",
        case_instance = %instance.id,
        definition = %definition.key,
        items,
        "Case instance created"
    );
    Ok(Output::CaseExecution(Box::new(instance)))
}

fn instantiate_items(parent: &CaseExecution, elements: &[DefinitionElement], out: &mut Vec<EntityRecord>) {
    for element in elements {
        let state = if element.manual_activation {
            LifecycleState::Enabled
        } else {
            LifecycleState::Active
        };
        let child = CaseExecution::new_child(parent, element.id.clone(), state);
        if element.kind == ElementKind::HumanTask {
            out.push(Task::for_execution(element.name.clone(), &child).into());
        }
        instantiate_items(&child, &element.children, out);
        out.push(child.into());
    }
}

/// CREATE on case instances and CREATE_INSTANCE on the definition.
pub fn create_checks(definition_key: &str) -> Vec<PermissionCheck> {
    vec![
        PermissionCheck::atomic(Resource::CaseInstance, ResourceId::Any, Permission::Create),
        PermissionCheck::atomic(
            Resource::CaseDefinition,
            ResourceId::specific(definition_key),
            Permission::CreateInstance,
        ),
    ]
}
