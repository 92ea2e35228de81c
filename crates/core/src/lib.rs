//! Core types for Cadence
//!
//! This crate defines the foundational types shared by every layer:
//! - EngineError: the error hierarchy surfaced to callers
//! - Authorization vocabulary: Resource, ResourceId, Permission, PermissionCheck, Caller
//! - Lifecycle: LifecycleState and the TransitionKind table
//! - Entities: CaseExecution, Task, Job and their stored form
//! - Variables: scope chains and the mutation bundle
//! - Definitions: the parsed case definition element tree

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod definition;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod variables;

pub use auth::{Caller, Grant, MissingGrant, Permission, PermissionCheck, Resource, ResourceId};
pub use definition::{
    CaseDefinition, DefinitionElement, DefinitionRepository, ElementKind, InMemoryDefinitions,
};
pub use entity::{new_id, CaseExecution, EntityKind, EntityRecord, Job, Task};
pub use error::{BoxedCause, EngineError, EngineResult};
pub use lifecycle::{LifecycleState, TransitionKind, TransitionPath};
pub use variables::{ScopeChain, VariableMutations, Variables};
