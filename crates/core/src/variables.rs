//! Variable scopes and the mutation bundle applied by transition commands
//!
//! An execution sees a chain of scopes: its own (level 0), its parent's, and
//! so on up to the case instance (the last level). Name resolution picks the
//! nearest scope that defines the name.
//!
//! A [`VariableMutations`] bundle is applied in a fixed order:
//!
//! 1. local deletions
//! 2. local sets
//! 3. global deletions
//! 4. global sets
//!
//! A global set writes to the nearest scope that already defines the name,
//! or to the case instance when none does. A global deletion removes the
//! name from the nearest scope defining it. When both the local and global
//! sets name the same key, the global set runs last and therefore wins on
//! resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name → value bindings of one scope
pub type Variables = BTreeMap<String, Value>;

/// A chain of variable scopes, nearest first
pub trait ScopeChain {
    /// Number of scopes
    fn depth(&self) -> usize;

    /// Scope at `level` (0 = local)
    fn scope(&self, level: usize) -> &Variables;

    /// Mutable scope at `level`
    fn scope_mut(&mut self, level: usize) -> &mut Variables;

    /// Nearest level defining `name`
    fn defining_level(&self, name: &str) -> Option<usize> {
        (0..self.depth()).find(|&level| self.scope(level).contains_key(name))
    }

    /// Resolve `name` through the chain
    fn resolve(&self, name: &str) -> Option<&Value> {
        self.defining_level(name)
            .and_then(|level| self.scope(level).get(name))
    }
}

impl ScopeChain for Vec<Variables> {
    fn depth(&self) -> usize {
        self.len()
    }

    fn scope(&self, level: usize) -> &Variables {
        &self[level]
    }

    fn scope_mut(&mut self, level: usize) -> &mut Variables {
        &mut self[level]
    }
}

/// Variable changes carried by a transition command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableMutations {
    /// Names removed from the local scope
    #[serde(default)]
    pub local_deletions: Vec<String>,
    /// Bindings set on the local scope
    #[serde(default)]
    pub local: Variables,
    /// Names removed from their nearest defining scope
    #[serde(default)]
    pub global_deletions: Vec<String>,
    /// Bindings set on their nearest defining scope, else the case instance
    #[serde(default)]
    pub global: Variables,
}

impl VariableMutations {
    /// Empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// True if applying the bundle changes nothing
    pub fn is_empty(&self) -> bool {
        self.local_deletions.is_empty()
            && self.local.is_empty()
            && self.global_deletions.is_empty()
            && self.global.is_empty()
    }

    /// Set a global variable
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.global.insert(name.into(), value.into());
        self
    }

    /// Set a local variable
    pub fn set_local(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.local.insert(name.into(), value.into());
        self
    }

    /// Delete a global variable
    pub fn remove(mut self, name: impl Into<String>) -> Self {
        self.global_deletions.push(name.into());
        self
    }

    /// Delete a local variable
    pub fn remove_local(mut self, name: impl Into<String>) -> Self {
        self.local_deletions.push(name.into());
        self
    }

    /// Apply the bundle to `chain` in the documented order
    ///
    /// An empty chain has no scope to write to; nothing is applied.
    pub fn apply_to<C: ScopeChain + ?Sized>(&self, chain: &mut C) {
        let Some(root) = chain.depth().checked_sub(1) else {
            return;
        };

        for name in &self.local_deletions {
            chain.scope_mut(0).remove(name);
        }
        for (name, value) in &self.local {
            chain.scope_mut(0).insert(name.clone(), value.clone());
        }
        for name in &self.global_deletions {
            if let Some(level) = chain.defining_level(name) {
                chain.scope_mut(level).remove(name);
            }
        }
        for (name, value) in &self.global {
            let level = chain.defining_level(name).unwrap_or(root);
            chain.scope_mut(level).insert(name.clone(), value.clone());
        }
    }
}
