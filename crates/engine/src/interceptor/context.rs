//! Unit-of-work management

use std::sync::Arc;

use cadence_core::{EngineError, EngineResult};

use super::{Interceptor, Invocation};
use crate::command::Command;
use crate::context::{CommandContext, EngineServices};

/// Opens a [`CommandContext`] for top-level invocations and closes it with
/// the command's result
///
/// Nested invocations reuse the active context; their close is a no-op.
#[derive(Debug, Clone)]
pub struct ContextInterceptor {
    services: Arc<EngineServices>,
}

impl ContextInterceptor {
    /// Interceptor opening contexts over `services`
    pub fn new(services: Arc<EngineServices>) -> Self {
        Self { services }
    }
}

impl Interceptor for ContextInterceptor {
    fn intercept<'a, C, N>(&self, invocation: &mut Invocation<'a, C>, mut next: N) -> EngineResult<C::Output>
    where
        C: Command,
        N: FnMut(&mut Invocation<'a, C>) -> EngineResult<C::Output>,
    {
        if invocation.has_context() {
            return next(invocation);
        }

        let context = CommandContext::new(Arc::clone(&self.services), invocation.caller().clone());
        invocation.attach(context);
        let result = next(invocation);

        match invocation.detach() {
            Some(mut context) => context.close(result),
            None => Err(EngineError::internal("command context detached during invocation")),
        }
    }
}
