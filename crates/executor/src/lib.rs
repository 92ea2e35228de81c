//! # Cadence Executor
//!
//! The public API of the Cadence case engine.
//!
//! This is the only crate users need to import. It provides:
//! - [`Cadence`] - typed handle running one command per unit of work
//! - [`EngineCommand`]/[`Output`] - the built-in commands as plain data
//! - Re-exports of the entity, authorization and pipeline types
//!
//! ## Quick Start
//!
//! ```text
//! use cadence_executor::{Cadence, Variables, VariableMutations};
//!
//! let engine = Cadence::builder()
//!     .configure(|b| b.with_definitions(definitions))
//!     .build()?;
//!
//! let case = engine.create_case_instance("loan", Some("LN-1"), Variables::new())?;
//! engine.complete(&execution_id, VariableMutations::new().set("amount", 100))?;
//! ```
//!
//! ## Built-in Commands
//!
//! | Entity | Commands |
//! |--------|----------|
//! | **CaseExecution** | enable, disable, re-enable, start, complete, suspend, resume, terminate, close |
//! | **CaseInstance** | create from a definition |
//! | **Task** | claim, unclaim, complete |
//! | **Job** | set priority |
//!
//! Custom commands implement [`Command`] and run through
//! `Cadence::executor()` with the same retry, context and authorization
//! handling.

#![warn(missing_docs)]

mod api;
mod command;
mod executor;
mod output;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use api::{Cadence, CadenceBuilder};
pub use command::EngineCommand;
pub use output::Output;

// Re-export core types so users don't need cadence-core directly
pub use cadence_core::{
    CaseDefinition, CaseExecution, Caller, DefinitionElement, DefinitionRepository, ElementKind,
    EngineError, EngineResult, EntityKind, EntityRecord, Grant, InMemoryDefinitions, Job,
    LifecycleState, MissingGrant, Permission, PermissionCheck, Resource, ResourceId, Task,
    TransitionKind, VariableMutations, Variables,
};

// Re-export pipeline types for custom commands and sessions
pub use cadence_concurrency::{
    EntityStore, ExternalResource, ResourceConnection, Session, SessionFactory, TransactionPhase,
};
pub use cadence_engine::{
    AuthorizationProvider, Command, CommandContext, CommandExecutor, EngineConfig, ExecutorBuilder,
    GrantTable, RelationRules,
};
