//! Optimistic-lock retry

use cadence_core::EngineResult;
use tracing::{debug, warn};

use super::{Interceptor, Invocation};
use crate::command::Command;

/// Re-runs a top-level command in a fresh unit of work after an
/// optimistic-lock conflict
///
/// At most `max_attempts` runs, no delay between them. Other errors pass
/// through untouched. Nested invocations are not retried; their conflicts
/// reach the outermost invocation.
#[derive(Debug, Clone, Copy)]
pub struct RetryInterceptor {
    max_attempts: u32,
}

impl RetryInterceptor {
    /// Interceptor allowing `max_attempts` runs, at least one
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Attempt bound
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Interceptor for RetryInterceptor {
    fn intercept<'a, C, N>(&self, invocation: &mut Invocation<'a, C>, mut next: N) -> EngineResult<C::Output>
    where
        C: Command,
        N: FnMut(&mut Invocation<'a, C>) -> EngineResult<C::Output>,
    {
        if invocation.is_nested() {
            return next(invocation);
        }

        let mut attempt = 1;
        loop {
            match next(invocation) {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    debug!(
                        target: "cadence::executor",
                        command = invocation.command().name(),
                        attempt,
                        error = %e,
                        "Optimistic lock conflict, retrying"
                    );
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        target: "cadence::executor",
                        command = invocation.command().name(),
                        attempts = attempt,
                        error = %e,
                        "Optimistic lock conflict, attempts exhausted"
                    );
                    return Err(e);
                }
                result => return result,
            }
        }
    }
}
