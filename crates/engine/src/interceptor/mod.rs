//! Interceptor chain
//!
//! The chain is a nested generic type built once by the executor:
//!
//! ```text
//! Chain<Logging, Chain<Retry, Chain<Context, Chain<Authorization, Terminal>>>>
//! ```
//!
//! Each [`Interceptor`] receives the rest of the pipeline as a closure and
//! either calls it or returns an error. Everything is monomorphized per
//! command type; there is no dynamic dispatch in the chain.
//!
//! Retry sits outside the context interceptor: the conflict surfaces when
//! the context closes and flushes, and a retry needs a fresh context.

pub mod authorization;
pub mod context;
pub mod logging;
pub mod retry;

pub use authorization::AuthorizationInterceptor;
pub use context::ContextInterceptor;
pub use logging::LoggingInterceptor;
pub use retry::RetryInterceptor;

use cadence_core::{Caller, EngineError, EngineResult};

use crate::command::Command;
use crate::context::CommandContext;
use crate::executor::CommandExecutor;

/// Where the invocation's unit of work lives
enum ContextSlot<'a> {
    /// Top-level invocation before the context interceptor ran
    Vacant,
    /// Opened by the context interceptor for this invocation
    Owned(Box<CommandContext>),
    /// Nested invocation sharing the caller's unit of work
    Borrowed(&'a mut CommandContext),
}

/// One pass of a command through the chain
pub struct Invocation<'a, C> {
    command: &'a C,
    caller: Caller,
    slot: ContextSlot<'a>,
}

impl<'a, C: Command> Invocation<'a, C> {
    /// Top-level invocation; a context will be opened for it
    pub fn top_level(command: &'a C, caller: Caller) -> Self {
        Self {
            command,
            caller,
            slot: ContextSlot::Vacant,
        }
    }

    /// Invocation inside an active unit of work
    pub fn nested(command: &'a C, context: &'a mut CommandContext) -> Self {
        Self {
            command,
            caller: context.caller().clone(),
            slot: ContextSlot::Borrowed(context),
        }
    }

    /// The command being run
    pub fn command(&self) -> &'a C {
        self.command
    }

    /// Identity the command runs for
    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// True if the invocation shares an outer unit of work
    pub fn is_nested(&self) -> bool {
        matches!(self.slot, ContextSlot::Borrowed(_))
    }

    /// True once a unit of work is attached
    pub fn has_context(&self) -> bool {
        !matches!(self.slot, ContextSlot::Vacant)
    }

    /// The active unit of work
    ///
    /// # Errors
    ///
    /// Fails if called before the context interceptor ran.
    pub fn context_mut(&mut self) -> EngineResult<&mut CommandContext> {
        match &mut self.slot {
            ContextSlot::Owned(context) => Ok(&mut **context),
            ContextSlot::Borrowed(context) => Ok(&mut **context),
            ContextSlot::Vacant => Err(EngineError::internal("no active command context")),
        }
    }

    pub(crate) fn attach(&mut self, context: CommandContext) {
        self.slot = ContextSlot::Owned(Box::new(context));
    }

    pub(crate) fn detach(&mut self) -> Option<CommandContext> {
        match std::mem::replace(&mut self.slot, ContextSlot::Vacant) {
            ContextSlot::Owned(context) => Some(*context),
            other => {
                self.slot = other;
                None
            }
        }
    }
}

/// A wrapper around the rest of the pipeline
pub trait Interceptor {
    /// Run `next`, or fail without calling it
    fn intercept<'a, C, N>(&self, invocation: &mut Invocation<'a, C>, next: N) -> EngineResult<C::Output>
    where
        C: Command,
        N: FnMut(&mut Invocation<'a, C>) -> EngineResult<C::Output>;
}

/// A complete pipeline
pub trait Handler {
    /// Run `invocation` through the pipeline
    fn handle<'a, C: Command>(
        &self,
        invocation: &mut Invocation<'a, C>,
        executor: &CommandExecutor,
    ) -> EngineResult<C::Output>;
}

/// `interceptor` wrapped around `next`
#[derive(Debug, Clone)]
pub struct Chain<I, N> {
    interceptor: I,
    next: N,
}

impl<I, N> Chain<I, N> {
    /// Wrap `next` in `interceptor`
    pub fn new(interceptor: I, next: N) -> Self {
        Self { interceptor, next }
    }
}

impl<I: Interceptor, N: Handler> Handler for Chain<I, N> {
    fn handle<'a, C: Command>(
        &self,
        invocation: &mut Invocation<'a, C>,
        executor: &CommandExecutor,
    ) -> EngineResult<C::Output> {
        let next = &self.next;
        self.interceptor
            .intercept(invocation, |inv| next.handle(inv, executor))
    }
}

/// Runs the command
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal;

impl Handler for Terminal {
    fn handle<'a, C: Command>(
        &self,
        invocation: &mut Invocation<'a, C>,
        executor: &CommandExecutor,
    ) -> EngineResult<C::Output> {
        let command = invocation.command();
        let context = invocation.context_mut()?;
        command.execute(context, executor)
    }
}
