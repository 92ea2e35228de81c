//! Command enum defining all built-in engine operations.
//!
//! Commands are:
//! - **Self-contained**: all parameters needed for execution are in the variant
//! - **Serializable**: can be converted to/from JSON
//! - **Pure data**: no closures or executable code
//!
//! Every case-execution transition has its own variant carrying the target
//! execution and a variable bundle. All of them dispatch into the single
//! state-machine entry point.

use cadence_core::{TransitionKind, VariableMutations, Variables};
use serde::{Deserialize, Serialize};

/// A built-in command
///
/// # Command Categories
///
/// | Category | Count | Description |
/// |----------|-------|-------------|
/// | Case execution | 9 | Lifecycle transitions |
/// | Case instance | 1 | Instantiation from a definition |
/// | Task | 2 | Claim and complete |
/// | Job | 1 | Priority |
/// | Read | 4 | Entity and variable reads |
///
/// # Example
///
/// ```ignore
/// use cadence_executor::EngineCommand;
/// use cadence_core::VariableMutations;
///
/// let cmd = EngineCommand::CompleteCaseExecution {
///     execution_id: "exec-1".into(),
///     variables: VariableMutations::new().set("approved", true),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineCommand {
    // ==================== Case execution ====================
    /// AVAILABLE → ENABLED
    EnableCaseExecution {
        /// Target execution
        execution_id: String,
        /// Variable changes applied with the transition
        #[serde(default)]
        variables: VariableMutations,
    },

    /// ENABLED → DISABLED
    DisableCaseExecution {
        /// Target execution
        execution_id: String,
        /// Variable changes applied with the transition
        #[serde(default)]
        variables: VariableMutations,
    },

    /// DISABLED → ENABLED
    ReenableCaseExecution {
        /// Target execution
        execution_id: String,
        /// Variable changes applied with the transition
        #[serde(default)]
        variables: VariableMutations,
    },

    /// ENABLED → ACTIVE
    StartCaseExecution {
        /// Target execution
        execution_id: String,
        /// Variable changes applied with the transition
        #[serde(default)]
        variables: VariableMutations,
    },

    /// ACTIVE → COMPLETED, or ENABLED → ACTIVE → COMPLETED
    CompleteCaseExecution {
        /// Target execution
        execution_id: String,
        /// Variable changes applied with the transition
        #[serde(default)]
        variables: VariableMutations,
    },

    /// ACTIVE | ENABLED → SUSPENDED
    SuspendCaseExecution {
        /// Target execution
        execution_id: String,
        /// Variable changes applied with the transition
        #[serde(default)]
        variables: VariableMutations,
    },

    /// SUSPENDED → state before suspension
    ResumeCaseExecution {
        /// Target execution
        execution_id: String,
        /// Variable changes applied with the transition
        #[serde(default)]
        variables: VariableMutations,
    },

    /// Any non-terminal state → TERMINATED
    TerminateCaseExecution {
        /// Target execution
        execution_id: String,
        /// Variable changes applied with the transition
        #[serde(default)]
        variables: VariableMutations,
    },

    /// COMPLETED | TERMINATED → CLOSED
    CloseCaseInstance {
        /// Case instance to close
        case_instance_id: String,
    },

    // ==================== Case instance ====================
    /// Instantiate a case definition
    CreateCaseInstance {
        /// Definition key
        definition_key: String,
        /// Caller-supplied business key
        #[serde(default)]
        business_key: Option<String>,
        /// Initial case instance variables
        #[serde(default)]
        variables: Variables,
    },

    // ==================== Task ====================
    /// Claim a task for `user_id`, or unclaim it when `None`
    ClaimTask {
        /// Target task
        task_id: String,
        /// New holder
        user_id: Option<String>,
    },

    /// Complete a task and its case execution
    CompleteTask {
        /// Target task
        task_id: String,
        /// Variable changes applied to the case execution
        #[serde(default)]
        variables: VariableMutations,
    },

    // ==================== Job ====================
    /// Change a job's acquisition priority
    SetJobPriority {
        /// Target job
        job_id: String,
        /// New priority
        priority: i64,
    },

    // ==================== Read ====================
    /// Load a case execution
    GetCaseExecution {
        /// Execution id
        execution_id: String,
    },

    /// Load a task
    GetTask {
        /// Task id
        task_id: String,
    },

    /// Load a job
    GetJob {
        /// Job id
        job_id: String,
    },

    /// Resolve a variable from an execution, nearest scope first
    GetVariable {
        /// Execution to resolve from
        execution_id: String,
        /// Variable name
        name: String,
    },
}

impl EngineCommand {
    /// Command name for logs
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::EnableCaseExecution { .. } => "EnableCaseExecution",
            EngineCommand::DisableCaseExecution { .. } => "DisableCaseExecution",
            EngineCommand::ReenableCaseExecution { .. } => "ReenableCaseExecution",
            EngineCommand::StartCaseExecution { .. } => "StartCaseExecution",
            EngineCommand::CompleteCaseExecution { .. } => "CompleteCaseExecution",
            EngineCommand::SuspendCaseExecution { .. } => "SuspendCaseExecution",
            EngineCommand::ResumeCaseExecution { .. } => "ResumeCaseExecution",
            EngineCommand::TerminateCaseExecution { .. } => "TerminateCaseExecution",
            EngineCommand::CloseCaseInstance { .. } => "CloseCaseInstance",
            EngineCommand::CreateCaseInstance { .. } => "CreateCaseInstance",
            EngineCommand::ClaimTask { .. } => "ClaimTask",
            EngineCommand::CompleteTask { .. } => "CompleteTask",
            EngineCommand::SetJobPriority { .. } => "SetJobPriority",
            EngineCommand::GetCaseExecution { .. } => "GetCaseExecution",
            EngineCommand::GetTask { .. } => "GetTask",
            EngineCommand::GetJob { .. } => "GetJob",
            EngineCommand::GetVariable { .. } => "GetVariable",
        }
    }

    /// Build the transition variant for `kind`
    pub fn transition(
        kind: TransitionKind,
        execution_id: impl Into<String>,
        variables: VariableMutations,
    ) -> Self {
        let execution_id = execution_id.into();
        match kind {
            TransitionKind::Enable => EngineCommand::EnableCaseExecution { execution_id, variables },
            TransitionKind::Disable => EngineCommand::DisableCaseExecution { execution_id, variables },
            TransitionKind::Reenable => EngineCommand::ReenableCaseExecution { execution_id, variables },
            TransitionKind::ManualStart => EngineCommand::StartCaseExecution { execution_id, variables },
            TransitionKind::Complete => EngineCommand::CompleteCaseExecution { execution_id, variables },
            TransitionKind::Suspend => EngineCommand::SuspendCaseExecution { execution_id, variables },
            TransitionKind::Resume => EngineCommand::ResumeCaseExecution { execution_id, variables },
            TransitionKind::Terminate => EngineCommand::TerminateCaseExecution { execution_id, variables },
            TransitionKind::Close => EngineCommand::CloseCaseInstance {
                case_instance_id: execution_id,
            },
        }
    }

    /// Transition kind, target and bundle for lifecycle variants
    pub fn as_transition(&self) -> Option<(TransitionKind, &str, &VariableMutations)> {
        use EngineCommand::*;
        let (kind, id, vars) = match self {
            EnableCaseExecution { execution_id, variables } => (TransitionKind::Enable, execution_id, variables),
            DisableCaseExecution { execution_id, variables } => (TransitionKind::Disable, execution_id, variables),
            ReenableCaseExecution { execution_id, variables } => (TransitionKind::Reenable, execution_id, variables),
            StartCaseExecution { execution_id, variables } => (TransitionKind::ManualStart, execution_id, variables),
            CompleteCaseExecution { execution_id, variables } => (TransitionKind::Complete, execution_id, variables),
            SuspendCaseExecution { execution_id, variables } => (TransitionKind::Suspend, execution_id, variables),
            ResumeCaseExecution { execution_id, variables } => (TransitionKind::Resume, execution_id, variables),
            TerminateCaseExecution { execution_id, variables } => (TransitionKind::Terminate, execution_id, variables),
            CloseCaseInstance { case_instance_id } => (TransitionKind::Close, case_instance_id, &NO_CHANGES),
            _ => return None,
        };
        Some((kind, id.as_str(), vars))
    }

    /// True for commands that never write
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            EngineCommand::GetCaseExecution { .. }
                | EngineCommand::GetTask { .. }
                | EngineCommand::GetJob { .. }
                | EngineCommand::GetVariable { .. }
        )
    }
}

static NO_CHANGES: VariableMutations = VariableMutations {
    local_deletions: Vec::new(),
    local: Variables::new(),
    global_deletions: Vec::new(),
    global: Variables::new(),
};
