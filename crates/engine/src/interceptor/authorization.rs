//! Permission enforcement

use cadence_core::EngineResult;

use super::{Interceptor, Invocation};
use crate::authorization::Authorizer;
use crate::command::Command;

/// Evaluates the command's permission checks before it runs
///
/// Skipped when checks are off for the active context. A denial lists every
/// missing grant and the command never executes.
#[derive(Debug, Clone)]
pub struct AuthorizationInterceptor {
    authorizer: Authorizer,
}

impl AuthorizationInterceptor {
    /// Interceptor checking through `authorizer`
    pub fn new(authorizer: Authorizer) -> Self {
        Self { authorizer }
    }
}

impl Interceptor for AuthorizationInterceptor {
    fn intercept<'a, C, N>(&self, invocation: &mut Invocation<'a, C>, mut next: N) -> EngineResult<C::Output>
    where
        C: Command,
        N: FnMut(&mut Invocation<'a, C>) -> EngineResult<C::Output>,
    {
        let command = invocation.command();
        {
            let context = invocation.context_mut()?;
            if context.is_authorization_check_enabled() {
                let checks = command.required_permissions(context)?;
                self.authorizer.check(context.caller(), &checks)?;
            }
        }
        next(invocation)
    }
}
