//! Case-execution state machine
//!
//! [`transition`] is the single entry point for every lifecycle change:
//!
//! ```text
//! 1. guard      resolve the path from the current state, or fail with
//!               IllegalStateTransition before touching anything
//! 2. variables  apply the mutation bundle over the parent scope chain
//! 3. state      walk the path (ENABLED --complete--> ACTIVE --> COMPLETED)
//! 4. tasks      a terminal state deletes the tasks bound to the execution
//! 5. relations  run the engine's RelationRules for the new state
//! ```
//!
//! The revision is not touched here. The entity session bumps it once when
//! the changed execution is flushed.

use std::sync::Arc;

use cadence_concurrency::DbEntitySession;
use cadence_core::{
    EngineError, EngineResult, LifecycleState, ScopeChain, TransitionKind, VariableMutations,
    Variables,
};
use serde_json::Value;
use tracing::{debug, trace};

use crate::context::CommandContext;

/// Propagation of a transition to related executions
pub trait RelationRules: Send + Sync {
    /// Called after `execution_id` reached `state` through `transition`
    fn after_transition(
        &self,
        context: &mut CommandContext,
        execution_id: &str,
        transition: TransitionKind,
        state: LifecycleState,
    ) -> EngineResult<()>;
}

/// Default rules for case plans
///
/// - terminating an execution terminates its non-terminal children
/// - when an execution completes or terminates and all its siblings are
///   terminal or DISABLED, an ACTIVE parent completes
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseRelationRules;

impl RelationRules for CaseRelationRules {
    fn after_transition(
        &self,
        context: &mut CommandContext,
        execution_id: &str,
        _transition: TransitionKind,
        state: LifecycleState,
    ) -> EngineResult<()> {
        if state == LifecycleState::Terminated {
            let children = context.db_session()?.children_of(execution_id);
            for child in children {
                let child_state = context.db_session()?.case_execution(&child)?.state;
                if !child_state.is_terminal() {
                    transition(context, &child, TransitionKind::Terminate, &VariableMutations::new())?;
                }
            }
        }

        if matches!(state, LifecycleState::Completed | LifecycleState::Terminated) {
            complete_parent_if_done(context, execution_id)?;
        }
        Ok(())
    }
}

/// Rules that propagate nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRelationRules;

impl RelationRules for NoRelationRules {
    fn after_transition(
        &self,
        _context: &mut CommandContext,
        _execution_id: &str,
        _transition: TransitionKind,
        _state: LifecycleState,
    ) -> EngineResult<()> {
        Ok(())
    }
}

fn complete_parent_if_done(context: &mut CommandContext, execution_id: &str) -> EngineResult<()> {
    let session = context.db_session()?;
    let parent_id = match session.case_execution(execution_id)?.parent_id.clone() {
        Some(parent_id) => parent_id,
        None => return Ok(()),
    };
    if session.case_execution(&parent_id)?.state != LifecycleState::Active {
        return Ok(());
    }
    for sibling in session.children_of(&parent_id) {
        let state = session.case_execution(&sibling)?.state;
        if !(state.is_terminal() || state == LifecycleState::Disabled) {
            return Ok(());
        }
    }

    debug!(target: "cadence::state", parent = %parent_id, "All children finished, completing parent");
    transition(context, &parent_id, TransitionKind::Complete, &VariableMutations::new())?;
    Ok(())
}

/// Apply `kind` to the execution `execution_id`
///
/// Returns the state reached.
///
/// # Errors
///
/// [`EngineError::IllegalStateTransition`] if `kind` is not legal from the
/// current state; nothing is modified in that case.
pub fn transition(
    context: &mut CommandContext,
    execution_id: &str,
    kind: TransitionKind,
    variables: &VariableMutations,
) -> EngineResult<LifecycleState> {
    let path = {
        let execution = context.db_session()?.case_execution(execution_id)?;
        match kind.path(
            execution.state,
            execution.suspended_from,
            execution.is_case_instance(),
        ) {
            Some(path) => path,
            None => {
                return Err(EngineError::IllegalStateTransition {
                    execution_id: execution_id.to_string(),
                    transition: kind,
                    state: execution.state,
                })
            }
        }
    };

    if !variables.is_empty() {
        apply_variables(context.db_session()?, execution_id, variables)?;
    }

    let reached = {
        let execution = context.db_session()?.case_execution(execution_id)?;
        let from = execution.state;
        for &state in &path {
            trace!(target: "cadence::state", execution = execution_id, from = %execution.state, to = %state, "step");
            execution.state = state;
        }
        match kind {
            TransitionKind::Suspend => execution.suspended_from = Some(from),
            TransitionKind::Resume => execution.suspended_from = None,
            _ => {}
        }
        execution.state
    };
    debug!(target: "cadence::state", execution = execution_id, transition = %kind, state = %reached, "Transition applied");

    if reached.is_terminal() {
        let session = context.db_session()?;
        for task_id in session.tasks_of(execution_id) {
            session.delete(&task_id)?;
            debug!(target: "cadence::state", execution = execution_id, task = %task_id, "Bound task deleted");
        }
    }

    let rules = Arc::clone(context.services().relation_rules());
    rules.after_transition(context, execution_id, kind, reached)?;
    Ok(reached)
}

/// Ids and variable scopes from `execution_id` up to its case instance
fn scope_chain(
    session: &mut DbEntitySession,
    execution_id: &str,
) -> EngineResult<(Vec<String>, Vec<Variables>)> {
    let mut ids = Vec::new();
    let mut scopes = Vec::new();
    let mut next = Some(execution_id.to_string());
    while let Some(id) = next {
        let execution = session.case_execution(&id)?;
        scopes.push(execution.variables.clone());
        next = execution.parent_id.clone();
        ids.push(id);
    }
    Ok((ids, scopes))
}

fn apply_variables(
    session: &mut DbEntitySession,
    execution_id: &str,
    variables: &VariableMutations,
) -> EngineResult<()> {
    let (ids, mut scopes) = scope_chain(session, execution_id)?;
    variables.apply_to(&mut scopes);

    for (id, scope) in ids.iter().zip(scopes) {
        let execution = session.case_execution(id)?;
        if execution.variables != scope {
            execution.variables = scope;
        }
    }
    Ok(())
}

/// Resolve `name` from `execution_id`, nearest scope first
pub fn resolve_variable(
    session: &mut DbEntitySession,
    execution_id: &str,
    name: &str,
) -> EngineResult<Option<Value>> {
    let (_, scopes) = scope_chain(session, execution_id)?;
    Ok(scopes.resolve(name).cloned())
}
