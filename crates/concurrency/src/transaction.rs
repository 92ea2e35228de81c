//! Transaction phases and listener registry
//!
//! Listeners are registered against exactly one [`TransactionPhase`]. When a
//! phase fires, its listeners run in registration order and are consumed, so
//! each runs at most once. Listeners for phases that never occur are dropped
//! with the context.
//!
//! ## Failure policy
//!
//! A failing listener does not stop the remaining listeners of its phase and
//! does not change the outcome of the unit of work. Failures are returned to
//! the caller of [`TransactionContext::fire`], which records and logs them.

use std::fmt;

use cadence_core::{EngineError, EngineResult};
use tracing::warn;

/// Phase of the unit of work a listener is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionPhase {
    /// All sessions flushed; about to report success
    Committing,
    /// Unit of work succeeded
    Committed,
    /// Unit of work failed; about to report failure
    RollingBack,
    /// Unit of work failed
    RolledBack,
}

impl fmt::Display for TransactionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionPhase::Committing => "COMMITTING",
            TransactionPhase::Committed => "COMMITTED",
            TransactionPhase::RollingBack => "ROLLING_BACK",
            TransactionPhase::RolledBack => "ROLLED_BACK",
        })
    }
}

/// Callback fired once for the phase it was registered under
///
/// Implementations own whatever they need; nothing is shared with the
/// context that fires them.
pub trait TransactionListener: Send {
    /// Run the listener; consumes it
    fn on_phase(self: Box<Self>, phase: TransactionPhase) -> EngineResult<()>;
}

impl<F> TransactionListener for F
where
    F: FnOnce(TransactionPhase) -> EngineResult<()> + Send,
{
    fn on_phase(self: Box<Self>, phase: TransactionPhase) -> EngineResult<()> {
        (*self)(phase)
    }
}

/// Per-unit-of-work listener registry
#[derive(Default)]
pub struct TransactionContext {
    listeners: Vec<(TransactionPhase, Box<dyn TransactionListener>)>,
    fired: Vec<TransactionPhase>,
}

impl TransactionContext {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `phase`
    ///
    /// Registering for a phase that already fired is ignored with a warning;
    /// the listener is dropped without running.
    pub fn add_listener<L>(&mut self, phase: TransactionPhase, listener: L)
    where
        L: TransactionListener + 'static,
    {
        if self.fired.contains(&phase) {
            warn!(target: "cadence::txn", %phase, "Listener registered after its phase fired, dropped");
            return;
        }
        self.listeners.push((phase, Box::new(listener)));
    }

    /// Number of listeners still waiting to fire
    pub fn pending(&self) -> usize {
        self.listeners.len()
    }

    /// Phases fired so far, in order
    pub fn fired_phases(&self) -> &[TransactionPhase] {
        &self.fired
    }

    /// Fire every listener registered for `phase`, in registration order
    ///
    /// Returns the failures of individual listeners; all listeners run
    /// regardless.
    pub fn fire(&mut self, phase: TransactionPhase) -> Vec<EngineError> {
        self.fired.push(phase);

        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.listeners)
            .into_iter()
            .partition(|(p, _)| *p == phase);
        self.listeners = rest;

        let mut failures = Vec::new();
        for (_, listener) in due {
            if let Err(e) = listener.on_phase(phase) {
                warn!(target: "cadence::txn", %phase, error = %e, "Transaction listener failed");
                failures.push(e);
            }
        }
        failures
    }
}

impl fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionContext")
            .field("pending", &self.listeners.len())
            .field("fired", &self.fired)
            .finish()
    }
}
