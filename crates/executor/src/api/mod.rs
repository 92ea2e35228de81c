//! High-level typed wrapper for the command executor.
//!
//! The [`Cadence`] struct wraps a shared [`CommandExecutor`] and the
//! [`EngineCommand`]/[`Output`] enums with typed method calls. Every method
//! runs one command as one unit of work.
//!
//! ## Caller Context
//!
//! `Cadence` carries the identity commands run for. It starts as the
//! system caller, which bypasses authorization; use `as_user` to get a
//! handle bound to an authenticated user and their groups. Handles are
//! cheap to clone and share one executor.
//!
//! # Example
//!
//! ```text
//! use cadence_executor::{Caller, Cadence};
//!
//! let engine = Cadence::builder().with_definitions(repo).build()?;
//! let case = engine.create_case_instance("loan", None, Variables::new())?;
//!
//! let kermit = engine.as_user(Caller::user("kermit").with_groups(["clerks"]));
//! kermit.claim_task(&task_id, "kermit")?;
//! kermit.complete_task(&task_id, VariableMutations::new().set("approved", true))?;
//! ```

mod case;
mod job;
mod task;

use std::sync::Arc;

use cadence_core::{Caller, EngineResult};
use cadence_engine::{CommandExecutor, ExecutorBuilder};

use crate::{EngineCommand, Output};

/// Typed handle over a shared executor
#[derive(Debug, Clone)]
pub struct Cadence {
    executor: Arc<CommandExecutor>,
    caller: Caller,
}

impl Cadence {
    /// Start configuring an engine; finish with [`CadenceBuilder::build`]
    pub fn builder() -> CadenceBuilder {
        CadenceBuilder {
            inner: CommandExecutor::builder(),
        }
    }

    /// Wrap an existing executor, running as the system caller
    pub fn new(executor: CommandExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
            caller: Caller::system(),
        }
    }

    /// A handle sharing this engine that runs commands for `caller`
    pub fn as_user(&self, caller: Caller) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            caller,
        }
    }

    /// Identity commands run for
    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// The underlying executor, for custom commands
    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// Run a built-in command for this handle's caller
    pub fn execute(&self, command: &EngineCommand) -> EngineResult<Output> {
        self.executor.execute(command, &self.caller)
    }
}

/// Builder for [`Cadence`]
///
/// Executor options are set through `configure`.
#[derive(Default)]
pub struct CadenceBuilder {
    inner: ExecutorBuilder,
}

impl CadenceBuilder {
    /// Adjust the underlying executor builder
    pub fn configure(mut self, f: impl FnOnce(ExecutorBuilder) -> ExecutorBuilder) -> Self {
        self.inner = f(self.inner);
        self
    }

    /// Build the engine, running as the system caller
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    pub fn build(self) -> EngineResult<Cadence> {
        Ok(Cadence::new(self.inner.build()?))
    }
}
