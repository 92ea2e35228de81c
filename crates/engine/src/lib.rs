//! Command-execution pipeline for Cadence
//!
//! This crate runs commands as atomic units of work:
//! - CommandExecutor: entry point; builds the interceptor chain once
//! - Interceptors: logging, optimistic-lock retry, context management, authorization
//! - CommandContext: the unit of work (sessions, listeners, caller, failures)
//! - State machine: guarded case-execution transitions with pluggable relation rules
//! - Authorization: grant lookup and batched permission evaluation
//! - EngineConfig: `cadence.toml` settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod authorization;
pub mod command;
pub mod config;
pub mod context;
pub mod executor;
pub mod interceptor;
pub mod state_machine;

pub use authorization::{AuthorizationProvider, Authorizer, GrantTable};
pub use command::Command;
pub use config::{EngineConfig, ResourceConfig, CONFIG_FILE_NAME};
pub use context::{CommandContext, EngineServices};
pub use executor::{CommandExecutor, ExecutorBuilder};
pub use interceptor::{Chain, Handler, Interceptor, Invocation, Terminal};
pub use state_machine::{
    resolve_variable, transition, CaseRelationRules, NoRelationRules, RelationRules,
};
