//! Structural model of case definitions
//!
//! Parsing definition documents happens elsewhere. This core only consumes
//! the resulting element tree, looked up by definition key through a
//! [`DefinitionRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Kind of plan item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// The case plan model (root)
    CasePlan,
    /// A stage grouping other plan items
    Stage,
    /// A task performed by a person; creates a task entity
    HumanTask,
    /// A task performed by the engine
    ServiceTask,
    /// A milestone
    Milestone,
}

/// One element of a parsed definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionElement {
    /// Element id, unique within the definition
    pub id: String,
    /// Human readable name
    pub name: String,
    /// Kind of plan item
    pub kind: ElementKind,
    /// Starts ENABLED and waits for a manual start instead of starting ACTIVE
    #[serde(default)]
    pub manual_activation: bool,
    /// Nested plan items
    #[serde(default)]
    pub children: Vec<DefinitionElement>,
}

impl DefinitionElement {
    /// Element with no children
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            manual_activation: false,
            children: Vec::new(),
        }
    }

    /// Require a manual start
    pub fn manual(mut self) -> Self {
        self.manual_activation = true;
        self
    }

    /// Append a child element
    pub fn with_child(mut self, child: DefinitionElement) -> Self {
        self.children.push(child);
        self
    }
}

/// A parsed case definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDefinition {
    /// Definition key
    pub key: String,
    /// Root element (the case plan)
    pub plan: DefinitionElement,
}

impl CaseDefinition {
    /// Definition with the given key and plan
    pub fn new(key: impl Into<String>, plan: DefinitionElement) -> Self {
        Self {
            key: key.into(),
            plan,
        }
    }
}

/// Source of parsed definitions
pub trait DefinitionRepository: Send + Sync {
    /// Latest definition deployed under `key`
    fn find_case_definition(&self, key: &str) -> Option<Arc<CaseDefinition>>;
}

/// Definitions held in memory, keyed by definition key
#[derive(Debug, Default)]
pub struct InMemoryDefinitions {
    definitions: HashMap<String, Arc<CaseDefinition>>,
}

impl InMemoryDefinitions {
    /// Empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `definition`, replacing any previous one with the same key
    pub fn deploy(&mut self, definition: CaseDefinition) {
        self.definitions
            .insert(definition.key.clone(), Arc::new(definition));
    }
}

impl DefinitionRepository for InMemoryDefinitions {
    fn find_case_definition(&self, key: &str) -> Option<Arc<CaseDefinition>> {
        self.definitions.get(key).cloned()
    }
}
