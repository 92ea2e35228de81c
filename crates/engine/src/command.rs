//! The command contract
//!
//! A command is a stateless unit of work run inside a [`CommandContext`].
//! Built-in commands live in the executor crate; third parties implement
//! this trait directly and run through the same pipeline.

use cadence_core::{EngineResult, PermissionCheck};

use crate::context::CommandContext;
use crate::executor::CommandExecutor;

/// A unit of work executed through the interceptor chain
pub trait Command {
    /// Result handed back to the caller on success
    type Output;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Permission checks that must all pass before `execute` runs
    ///
    /// May load entities through `context` to find the ids to check, but
    /// must not modify anything.
    fn required_permissions(&self, context: &mut CommandContext) -> EngineResult<Vec<PermissionCheck>> {
        let _ = context;
        Ok(Vec::new())
    }

    /// Run the command
    ///
    /// Nested commands go through `executor.execute_nested(.., context)` and
    /// share this unit of work.
    fn execute(&self, context: &mut CommandContext, executor: &CommandExecutor) -> EngineResult<Self::Output>;
}
