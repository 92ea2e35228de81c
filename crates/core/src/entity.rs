//! Persistent entities
//!
//! Every entity carries a `revision`, the optimistic-lock token. The store
//! assigns revision 1 on insert and the primary session bumps it by exactly
//! one each time a changed entity is flushed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::LifecycleState;
use crate::variables::Variables;

/// Fresh random entity id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Discriminates entity records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A case instance or one of its plan-item executions
    CaseExecution,
    /// A human task
    Task,
    /// An asynchronous job
    Job,
}

impl EntityKind {
    /// Lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::CaseExecution => "case execution",
            EntityKind::Task => "task",
            EntityKind::Job => "job",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in a case instance's execution tree
///
/// The root (no parent) is the case instance itself. Its variables are the
/// "global" scope; each execution's own map is its local scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseExecution {
    /// Unique id
    pub id: String,
    /// Optimistic-lock token
    pub revision: u64,
    /// Root of the tree this execution belongs to
    pub case_instance_id: String,
    /// Parent execution, `None` for the case instance
    pub parent_id: Option<String>,
    /// Definition element this execution instantiates
    pub activity_id: String,
    /// Key of the case definition
    pub definition_key: String,
    /// Current lifecycle state
    pub state: LifecycleState,
    /// State recorded on suspension, restored on resume
    pub suspended_from: Option<LifecycleState>,
    /// Local variable bindings
    pub variables: Variables,
    /// Caller-supplied business key, case instances only
    pub business_key: Option<String>,
}

impl CaseExecution {
    /// New case instance (root execution) in the ACTIVE state
    pub fn new_case_instance(definition_key: impl Into<String>, activity_id: impl Into<String>) -> Self {
        let id = new_id();
        Self {
            case_instance_id: id.clone(),
            id,
            revision: 1,
            parent_id: None,
            activity_id: activity_id.into(),
            definition_key: definition_key.into(),
            state: LifecycleState::Active,
            suspended_from: None,
            variables: Variables::new(),
            business_key: None,
        }
    }

    /// New child of `parent` in `state`
    pub fn new_child(parent: &CaseExecution, activity_id: impl Into<String>, state: LifecycleState) -> Self {
        Self {
            id: new_id(),
            revision: 1,
            case_instance_id: parent.case_instance_id.clone(),
            parent_id: Some(parent.id.clone()),
            activity_id: activity_id.into(),
            definition_key: parent.definition_key.clone(),
            state,
            suspended_from: None,
            variables: Variables::new(),
            business_key: None,
        }
    }

    /// True for the root of the tree
    pub fn is_case_instance(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// An assignable unit of human work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique id
    pub id: String,
    /// Optimistic-lock token
    pub revision: u64,
    /// Display name
    pub name: String,
    /// Current holder
    pub assignee: Option<String>,
    /// When the current holder claimed it
    pub claimed_at: Option<DateTime<Utc>>,
    /// Case execution completed together with the task
    pub case_execution_id: Option<String>,
    /// Case instance the task belongs to
    pub case_instance_id: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// New unassigned standalone task
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            revision: 1,
            name: name.into(),
            assignee: None,
            claimed_at: None,
            case_execution_id: None,
            case_instance_id: None,
            created_at: Utc::now(),
        }
    }

    /// New task bound to a case execution
    pub fn for_execution(name: impl Into<String>, execution: &CaseExecution) -> Self {
        Self {
            case_execution_id: Some(execution.id.clone()),
            case_instance_id: Some(execution.case_instance_id.clone()),
            ..Self::new(name)
        }
    }
}

/// An asynchronous job belonging to a process instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique id
    pub id: String,
    /// Optimistic-lock token
    pub revision: u64,
    /// Acquisition priority; higher runs first
    pub priority: i64,
    /// Owning process instance
    pub process_instance_id: String,
    /// Key of the owning process definition
    pub process_definition_key: String,
}

impl Job {
    /// New job with priority 0
    pub fn new(process_instance_id: impl Into<String>, process_definition_key: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            revision: 1,
            priority: 0,
            process_instance_id: process_instance_id.into(),
            process_definition_key: process_definition_key.into(),
        }
    }
}

/// Any persistent entity, as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityRecord {
    /// Case execution
    CaseExecution(CaseExecution),
    /// Task
    Task(Task),
    /// Job
    Job(Job),
}

impl EntityRecord {
    /// Entity id
    pub fn id(&self) -> &str {
        match self {
            EntityRecord::CaseExecution(e) => &e.id,
            EntityRecord::Task(t) => &t.id,
            EntityRecord::Job(j) => &j.id,
        }
    }

    /// Entity kind
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::CaseExecution(_) => EntityKind::CaseExecution,
            EntityRecord::Task(_) => EntityKind::Task,
            EntityRecord::Job(_) => EntityKind::Job,
        }
    }

    /// Current revision
    pub fn revision(&self) -> u64 {
        match self {
            EntityRecord::CaseExecution(e) => e.revision,
            EntityRecord::Task(t) => t.revision,
            EntityRecord::Job(j) => j.revision,
        }
    }

    /// Overwrite the revision
    pub fn set_revision(&mut self, revision: u64) {
        match self {
            EntityRecord::CaseExecution(e) => e.revision = revision,
            EntityRecord::Task(t) => t.revision = revision,
            EntityRecord::Job(j) => j.revision = revision,
        }
    }

    /// Parent execution id, for case executions that have one
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            EntityRecord::CaseExecution(e) => e.parent_id.as_deref(),
            _ => None,
        }
    }
}

impl From<CaseExecution> for EntityRecord {
    fn from(e: CaseExecution) -> Self {
        EntityRecord::CaseExecution(e)
    }
}

impl From<Task> for EntityRecord {
    fn from(t: Task) -> Self {
        EntityRecord::Task(t)
    }
}

impl From<Job> for EntityRecord {
    fn from(j: Job) -> Self {
        EntityRecord::Job(j)
    }
}
