//! Case instance and case execution operations.

use cadence_core::{
    CaseExecution, EngineError, EngineResult, LifecycleState, TransitionKind, VariableMutations,
    Variables,
};
use serde_json::Value;

use super::Cadence;
use crate::{EngineCommand, Output};

impl Cadence {
    // =========================================================================
    // Case instances
    // =========================================================================

    /// Instantiate the case definition deployed under `definition_key`.
    ///
    /// Returns the new case instance. Plan items are created with it in the
    /// same unit of work.
    pub fn create_case_instance(
        &self,
        definition_key: &str,
        business_key: Option<&str>,
        variables: Variables,
    ) -> EngineResult<CaseExecution> {
        match self.execute(&EngineCommand::CreateCaseInstance {
            definition_key: definition_key.to_string(),
            business_key: business_key.map(str::to_string),
            variables,
        })? {
            Output::CaseExecution(instance) => Ok(*instance),
            _ => Err(EngineError::internal("Unexpected output for CreateCaseInstance")),
        }
    }

    /// Close a completed or terminated case instance.
    pub fn close_case_instance(&self, case_instance_id: &str) -> EngineResult<LifecycleState> {
        self.transition(TransitionKind::Close, case_instance_id, VariableMutations::new())
    }

    // =========================================================================
    // Case executions
    // =========================================================================

    /// Apply `kind` to an execution with a variable bundle.
    ///
    /// Returns the state reached.
    pub fn transition(
        &self,
        kind: TransitionKind,
        execution_id: &str,
        variables: VariableMutations,
    ) -> EngineResult<LifecycleState> {
        let command = EngineCommand::transition(kind, execution_id, variables);
        match self.execute(&command)? {
            Output::State(state) => Ok(state),
            _ => Err(EngineError::internal(format!(
                "Unexpected output for {}",
                command.name()
            ))),
        }
    }

    /// AVAILABLE → ENABLED
    pub fn enable(&self, execution_id: &str) -> EngineResult<LifecycleState> {
        self.transition(TransitionKind::Enable, execution_id, VariableMutations::new())
    }

    /// ENABLED → DISABLED
    pub fn disable(&self, execution_id: &str) -> EngineResult<LifecycleState> {
        self.transition(TransitionKind::Disable, execution_id, VariableMutations::new())
    }

    /// DISABLED → ENABLED
    pub fn reenable(&self, execution_id: &str) -> EngineResult<LifecycleState> {
        self.transition(TransitionKind::Reenable, execution_id, VariableMutations::new())
    }

    /// ENABLED → ACTIVE
    pub fn manual_start(&self, execution_id: &str) -> EngineResult<LifecycleState> {
        self.transition(TransitionKind::ManualStart, execution_id, VariableMutations::new())
    }

    /// Complete an execution, applying `variables` first.
    pub fn complete(&self, execution_id: &str, variables: VariableMutations) -> EngineResult<LifecycleState> {
        self.transition(TransitionKind::Complete, execution_id, variables)
    }

    /// Suspend an ACTIVE or ENABLED execution
    pub fn suspend(&self, execution_id: &str) -> EngineResult<LifecycleState> {
        self.transition(TransitionKind::Suspend, execution_id, VariableMutations::new())
    }

    /// Resume to the state held before suspension
    pub fn resume(&self, execution_id: &str) -> EngineResult<LifecycleState> {
        self.transition(TransitionKind::Resume, execution_id, VariableMutations::new())
    }

    /// Terminate an execution and everything below it
    pub fn terminate(&self, execution_id: &str) -> EngineResult<LifecycleState> {
        self.transition(TransitionKind::Terminate, execution_id, VariableMutations::new())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Load a case execution.
    pub fn case_execution(&self, execution_id: &str) -> EngineResult<CaseExecution> {
        match self.execute(&EngineCommand::GetCaseExecution {
            execution_id: execution_id.to_string(),
        })? {
            Output::CaseExecution(execution) => Ok(*execution),
            _ => Err(EngineError::internal("Unexpected output for GetCaseExecution")),
        }
    }

    /// Resolve `name` from the execution's scope chain, nearest first.
    pub fn variable(&self, execution_id: &str, name: &str) -> EngineResult<Option<Value>> {
        match self.execute(&EngineCommand::GetVariable {
            execution_id: execution_id.to_string(),
            name: name.to_string(),
        })? {
            Output::Maybe(value) => Ok(value),
            _ => Err(EngineError::internal("Unexpected output for GetVariable")),
        }
    }
}
