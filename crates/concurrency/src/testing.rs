//! Test doubles for sessions and external resources
//!
//! Used by this crate's tests and by the engine and executor test suites.

use std::any::TypeId;
use std::sync::Arc;

use cadence_core::{BoxedCause, EngineError, EngineResult};
use parking_lot::Mutex;
use thiserror::Error;

use crate::resource::{ExternalResource, ResourceConnection};
use crate::session::{Session, SessionFactory};
use crate::transaction::TransactionContext;

/// Failure raised on purpose by a test double
#[derive(Debug, Error)]
#[error("injected failure: {0}")]
pub struct InjectedFailure(pub &'static str);

/// Shared record of flushes and closes, by session tag
#[derive(Debug, Clone, Default)]
pub struct FlushLog {
    events: Arc<Mutex<Vec<(&'static str, usize)>>>,
}

impl FlushLog {
    fn push(&self, event: &'static str, tag: usize) {
        self.events.lock().push((event, tag));
    }

    /// Tags of flushed sessions, in flush order
    pub fn flushes(&self) -> Vec<usize> {
        self.of("flush")
    }

    /// Tags of closed sessions, in close order
    pub fn closes(&self) -> Vec<usize> {
        self.of("close")
    }

    fn of(&self, event: &str) -> Vec<usize> {
        self.events
            .lock()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, tag)| *tag)
            .collect()
    }
}

/// Session that records its flush and close under tag `N`
///
/// The const tag gives each instance its own type, so several can share
/// one registry.
#[derive(Debug)]
pub struct RecordingSession<const N: usize> {
    log: FlushLog,
    fail_flush: bool,
    fail_close: bool,
}

impl<const N: usize> RecordingSession<N> {
    /// Session that succeeds
    pub fn new(log: &FlushLog) -> Self {
        Self {
            log: log.clone(),
            fail_flush: false,
            fail_close: false,
        }
    }

    /// Session whose flush fails
    pub fn failing_flush(log: &FlushLog) -> Self {
        Self {
            fail_flush: true,
            ..Self::new(log)
        }
    }

    /// Session whose close fails
    pub fn failing_close(log: &FlushLog) -> Self {
        Self {
            fail_close: true,
            ..Self::new(log)
        }
    }
}

impl<const N: usize> Session for RecordingSession<N> {
    fn flush(&mut self) -> EngineResult<()> {
        self.log.push("flush", N);
        if self.fail_flush {
            return Err(EngineError::persistence("flush", InjectedFailure("flush")));
        }
        Ok(())
    }

    fn close(&mut self) -> EngineResult<()> {
        self.log.push("close", N);
        if self.fail_close {
            return Err(EngineError::persistence("close", InjectedFailure("close")));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Factory opening [`RecordingSession`]s that share one log
#[derive(Debug, Clone)]
pub struct RecordingSessionFactory<const N: usize> {
    log: FlushLog,
    fail_flush: bool,
}

impl<const N: usize> RecordingSessionFactory<N> {
    /// Factory for sessions that succeed
    pub fn new(log: &FlushLog) -> Self {
        Self {
            log: log.clone(),
            fail_flush: false,
        }
    }

    /// Factory for sessions whose flush fails
    pub fn failing_flush(log: &FlushLog) -> Self {
        Self {
            log: log.clone(),
            fail_flush: true,
        }
    }
}

impl<const N: usize> SessionFactory for RecordingSessionFactory<N> {
    fn session_type(&self) -> TypeId {
        TypeId::of::<RecordingSession<N>>()
    }

    fn open(&self, _transaction: &mut TransactionContext) -> EngineResult<Box<dyn Session>> {
        let session = if self.fail_flush {
            RecordingSession::<N>::failing_flush(&self.log)
        } else {
            RecordingSession::<N>::new(&self.log)
        };
        Ok(Box::new(session))
    }
}

/// External resource that journals every call, per connection
#[derive(Debug, Default)]
pub struct RecordingResource {
    journal: Arc<Mutex<Vec<(usize, String)>>>,
    connections: Mutex<usize>,
    closed: Arc<Mutex<usize>>,
    transactional: bool,
}

impl RecordingResource {
    /// Resource with transaction support
    pub fn new() -> Self {
        Self {
            transactional: true,
            ..Self::default()
        }
    }

    /// Resource without transaction support
    pub fn non_transactional() -> Self {
        Self::default()
    }

    /// Calls made so far, across all connections
    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().iter().map(|(_, entry)| entry.clone()).collect()
    }

    /// Calls made on the `index`th connection opened
    pub fn connection_journal(&self, index: usize) -> Vec<String> {
        self.journal
            .lock()
            .iter()
            .filter(|(connection, _)| *connection == index)
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    /// Connections opened so far
    pub fn connections(&self) -> usize {
        *self.connections.lock()
    }

    /// Connections closed so far
    pub fn closed(&self) -> usize {
        *self.closed.lock()
    }
}

impl ExternalResource for RecordingResource {
    fn supports_transactions(&self) -> bool {
        self.transactional
    }

    fn connect(&self) -> Result<Box<dyn ResourceConnection>, BoxedCause> {
        let mut connections = self.connections.lock();
        let index = *connections;
        *connections += 1;
        Ok(Box::new(RecordingConnection {
            index,
            journal: Arc::clone(&self.journal),
            closed: Arc::clone(&self.closed),
            active: false,
        }))
    }
}

/// Connection handed out by [`RecordingResource`]
#[derive(Debug)]
struct RecordingConnection {
    index: usize,
    journal: Arc<Mutex<Vec<(usize, String)>>>,
    closed: Arc<Mutex<usize>>,
    active: bool,
}

impl RecordingConnection {
    fn record(&self, entry: impl Into<String>) {
        self.journal.lock().push((self.index, entry.into()));
    }
}

impl ResourceConnection for RecordingConnection {
    fn begin(&mut self) -> Result<(), BoxedCause> {
        self.active = true;
        self.record("begin");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn execute(&mut self, statements: &[String]) -> Result<(), BoxedCause> {
        for statement in statements {
            self.record(format!("execute {}", statement));
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BoxedCause> {
        self.active = false;
        self.record("commit");
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), BoxedCause> {
        self.active = false;
        self.record("rollback");
        Ok(())
    }

    fn close(&mut self) -> Result<(), BoxedCause> {
        *self.closed.lock() += 1;
        Ok(())
    }
}
