//! Per-command diagnostics

use std::time::Instant;

use cadence_core::EngineResult;
use tracing::{debug, debug_span, warn};

use super::{Interceptor, Invocation};
use crate::command::Command;

/// Opens a span per command and logs its outcome with the elapsed time
///
/// Never changes the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

impl Interceptor for LoggingInterceptor {
    fn intercept<'a, C, N>(&self, invocation: &mut Invocation<'a, C>, mut next: N) -> EngineResult<C::Output>
    where
        C: Command,
        N: FnMut(&mut Invocation<'a, C>) -> EngineResult<C::Output>,
    {
        let span = debug_span!(
            target: "cadence::executor",
            "command",
            command = invocation.command().name(),
            nested = invocation.is_nested(),
        );
        let _entered = span.enter();
        let started = Instant::now();

        let result = next(invocation);

        let elapsed_us = started.elapsed().as_micros() as u64;
        match &result {
            Ok(_) => debug!(target: "cadence::executor", elapsed_us, "Command succeeded"),
            Err(e) if e.is_rejection() => {
                debug!(target: "cadence::executor", elapsed_us, error = %e, "Command rejected")
            }
            Err(e) => warn!(target: "cadence::executor", elapsed_us, error = %e, "Command failed"),
        }
        result
    }
}
