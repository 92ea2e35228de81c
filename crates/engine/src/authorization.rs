//! Grant lookup and permission evaluation
//!
//! [`AuthorizationProvider`] answers "does this caller hold this grant?".
//! [`Authorizer`] turns a command's checks into a single verdict, collecting
//! every missing grant instead of stopping at the first.

use std::sync::Arc;

use cadence_core::{Caller, EngineError, EngineResult, Grant, PermissionCheck};
use dashmap::DashMap;
use tracing::debug;

/// Source of grants
pub trait AuthorizationProvider: Send + Sync {
    /// Does `caller` hold a grant satisfying `required`?
    fn is_granted(&self, caller: &Caller, required: &Grant) -> bool;
}

/// Grants held in memory, per user and per group
#[derive(Debug, Default)]
pub struct GrantTable {
    users: DashMap<String, Vec<Grant>>,
    groups: DashMap<String, Vec<Grant>>,
}

impl GrantTable {
    /// No grants
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `grant` to a user
    pub fn grant_user(&self, user_id: impl Into<String>, grant: Grant) {
        self.users.entry(user_id.into()).or_default().push(grant);
    }

    /// Give `grant` to every member of a group
    pub fn grant_group(&self, group: impl Into<String>, grant: Grant) {
        self.groups.entry(group.into()).or_default().push(grant);
    }

    /// Remove every grant of a user equal to `grant`
    pub fn revoke_user(&self, user_id: &str, grant: &Grant) {
        if let Some(mut grants) = self.users.get_mut(user_id) {
            grants.retain(|g| g != grant);
        }
    }

    fn holds(grants: Option<&Vec<Grant>>, required: &Grant) -> bool {
        grants.map_or(false, |gs| gs.iter().any(|g| g.satisfies(required)))
    }
}

impl AuthorizationProvider for GrantTable {
    fn is_granted(&self, caller: &Caller, required: &Grant) -> bool {
        let by_user = caller
            .user_id
            .as_ref()
            .map_or(false, |user| Self::holds(self.users.get(user).as_deref(), required));

        by_user
            || caller
                .groups
                .iter()
                .any(|group| Self::holds(self.groups.get(group).as_deref(), required))
    }
}

/// Evaluates permission checks against a provider
#[derive(Clone)]
pub struct Authorizer {
    provider: Arc<dyn AuthorizationProvider>,
    admin_groups: Vec<String>,
}

impl Authorizer {
    /// Authorizer over `provider`; members of `admin_groups` pass every check
    pub fn new(provider: Arc<dyn AuthorizationProvider>, admin_groups: Vec<String>) -> Self {
        Self {
            provider,
            admin_groups,
        }
    }

    /// Check all of `checks` for `caller`
    ///
    /// The system caller and admin-group members pass without lookups.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AuthorizationDenied`] listing every missing
    /// grant, in check order. A failed `AnyOf` contributes all its
    /// alternatives.
    pub fn check(&self, caller: &Caller, checks: &[PermissionCheck]) -> EngineResult<()> {
        let user_id = match &caller.user_id {
            Some(user_id) => user_id,
            None => return Ok(()),
        };
        if caller.in_any_group(&self.admin_groups) {
            debug!(target: "cadence::authz", user = %user_id, "Admin caller, checks skipped");
            return Ok(());
        }

        let mut missing = Vec::new();
        for check in checks {
            let alternatives = check.alternatives();
            if !alternatives.iter().any(|g| self.provider.is_granted(caller, g)) {
                missing.extend(alternatives.iter().cloned());
            }
        }

        if missing.is_empty() {
            return Ok(());
        }
        debug!(target: "cadence::authz", user = %user_id, missing = missing.len(), "Authorization denied");
        Err(EngineError::AuthorizationDenied {
            user_id: user_id.clone(),
            missing,
        })
    }
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("admin_groups", &self.admin_groups)
            .finish()
    }
}
