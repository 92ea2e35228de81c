//! Authorization vocabulary
//!
//! Resource kinds, resource ids (with the `*` wildcard), permissions, and the
//! permission checks a command declares. Only the authorization interceptor
//! evaluates these; commands just describe what they need.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wildcard resource id meaning "any instance of this kind"
pub const ANY: &str = "*";

/// Kind of resource a grant applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    /// Deployed process definitions, keyed by definition key
    ProcessDefinition,
    /// Running process instances
    ProcessInstance,
    /// Deployed case definitions, keyed by definition key
    CaseDefinition,
    /// Running case instances
    CaseInstance,
    /// Human tasks
    Task,
}

impl Resource {
    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::ProcessDefinition => "PROCESS_DEFINITION",
            Resource::ProcessInstance => "PROCESS_INSTANCE",
            Resource::CaseDefinition => "CASE_DEFINITION",
            Resource::CaseInstance => "CASE_INSTANCE",
            Resource::Task => "TASK",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// Read the resource
    Read,
    /// Modify the resource
    Update,
    /// Create instances of the resource
    Create,
    /// Create instances of a definition
    CreateInstance,
    /// Modify instances of a definition
    UpdateInstance,
    /// Change the assignee of a task
    TaskAssign,
    /// Work on (claim, complete) a task
    TaskWork,
}

impl Permission {
    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "READ",
            Permission::Update => "UPDATE",
            Permission::Create => "CREATE",
            Permission::CreateInstance => "CREATE_INSTANCE",
            Permission::UpdateInstance => "UPDATE_INSTANCE",
            Permission::TaskAssign => "TASK_ASSIGN",
            Permission::TaskWork => "TASK_WORK",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource id: a concrete id or the wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceId {
    /// Any instance of the resource kind
    Any,
    /// One specific instance
    Specific(String),
}

impl ResourceId {
    /// A concrete resource id; `"*"` parses to [`ResourceId::Any`]
    pub fn specific(id: impl Into<String>) -> Self {
        let id = id.into();
        if id == ANY {
            ResourceId::Any
        } else {
            ResourceId::Specific(id)
        }
    }

    /// Does a grant on `self` cover a check on `requested`?
    pub fn covers(&self, requested: &ResourceId) -> bool {
        match (self, requested) {
            (ResourceId::Any, _) => true,
            (ResourceId::Specific(_), ResourceId::Any) => false,
            (ResourceId::Specific(a), ResourceId::Specific(b)) => a == b,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Any => f.write_str(ANY),
            ResourceId::Specific(id) => f.write_str(id),
        }
    }
}

/// A single (resource, id, permission) tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissingGrant {
    /// Resource kind
    pub resource: Resource,
    /// Resource id the check was made against
    pub resource_id: ResourceId,
    /// Permission that was required
    pub permission: Permission,
}

/// A grant the caller holds has the same shape as a missing one
pub type Grant = MissingGrant;

impl MissingGrant {
    /// Create a tuple
    pub fn new(resource: Resource, resource_id: ResourceId, permission: Permission) -> Self {
        Self {
            resource,
            resource_id,
            permission,
        }
    }

    /// Does this held grant satisfy `required`?
    pub fn satisfies(&self, required: &MissingGrant) -> bool {
        self.resource == required.resource
            && self.permission == required.permission
            && self.resource_id.covers(&required.resource_id)
    }
}

impl fmt::Display for MissingGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} '{}'",
            self.permission, self.resource, self.resource_id
        )
    }
}

/// A permission check declared by a command
///
/// A command returns a list of checks that must all pass. `AnyOf` passes if
/// at least one alternative is granted; when it fails, every alternative is
/// reported missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionCheck {
    /// One tuple
    Atomic(Grant),
    /// Satisfied by any of the alternatives
    AnyOf(Vec<Grant>),
}

impl PermissionCheck {
    /// Single-tuple check
    pub fn atomic(resource: Resource, resource_id: ResourceId, permission: Permission) -> Self {
        PermissionCheck::Atomic(Grant::new(resource, resource_id, permission))
    }

    /// Alternatives in the order they should be reported
    pub fn alternatives(&self) -> &[Grant] {
        match self {
            PermissionCheck::Atomic(grant) => std::slice::from_ref(grant),
            PermissionCheck::AnyOf(grants) => grants,
        }
    }
}

/// The identity a command runs for
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Caller {
    /// Authenticated user, `None` for engine-internal callers
    pub user_id: Option<String>,
    /// Groups the user belongs to
    pub groups: Vec<String>,
}

impl Caller {
    /// An authenticated user
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            groups: Vec::new(),
        }
    }

    /// The unauthenticated engine-internal caller; authorization is skipped
    pub fn system() -> Self {
        Self::default()
    }

    /// Add group memberships
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// True if the caller is a member of any of `groups`
    pub fn in_any_group(&self, groups: &[String]) -> bool {
        self.groups.iter().any(|g| groups.contains(g))
    }
}
