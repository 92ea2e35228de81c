//! Session over an external resource with its own transaction
//!
//! Each session opens its own [`ResourceConnection`]. When transaction
//! handling is on, opening the session begins a transaction on that
//! connection and registers two listeners against the unit of work: commit
//! on COMMITTED, rollback on ROLLED_BACK. The listeners share the session's
//! connection and nothing else, so concurrent units of work never commit or
//! roll back each other's statements.
//!
//! Statements queued through [`ResourceSession::execute`] are sent to the
//! connection on flush.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use cadence_core::{BoxedCause, EngineError, EngineResult};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::session::{Session, SessionFactory};
use crate::transaction::{TransactionContext, TransactionListener, TransactionPhase};

/// An external persistence mechanism; hands out one connection per session
pub trait ExternalResource: Send + Sync {
    /// Whether `begin`/`commit`/`rollback` are meaningful
    fn supports_transactions(&self) -> bool {
        true
    }

    /// Open a connection for one unit of work
    fn connect(&self) -> Result<Box<dyn ResourceConnection>, BoxedCause>;
}

/// A connection owned by a single resource session
pub trait ResourceConnection: Send {
    /// Begin a transaction
    fn begin(&mut self) -> Result<(), BoxedCause>;

    /// Is a transaction open?
    fn is_active(&self) -> bool;

    /// Run deferred statements
    fn execute(&mut self, statements: &[String]) -> Result<(), BoxedCause>;

    /// Commit the open transaction
    fn commit(&mut self) -> Result<(), BoxedCause>;

    /// Roll back the open transaction
    fn rollback(&mut self) -> Result<(), BoxedCause>;

    /// Release the connection
    fn close(&mut self) -> Result<(), BoxedCause>;
}

type SharedConnection = Arc<Mutex<Box<dyn ResourceConnection>>>;

/// Commits the session's transaction on COMMITTED
struct CommitResource {
    connection: SharedConnection,
}

impl TransactionListener for CommitResource {
    fn on_phase(self: Box<Self>, _phase: TransactionPhase) -> EngineResult<()> {
        let mut connection = self.connection.lock();
        if connection.is_active() {
            connection
                .commit()
                .map_err(|e| EngineError::persistence("resource commit", e))?;
        }
        Ok(())
    }
}

/// Rolls back the session's transaction on ROLLED_BACK
struct RollbackResource {
    connection: SharedConnection,
}

impl TransactionListener for RollbackResource {
    fn on_phase(self: Box<Self>, _phase: TransactionPhase) -> EngineResult<()> {
        let mut connection = self.connection.lock();
        if connection.is_active() {
            connection
                .rollback()
                .map_err(|e| EngineError::persistence("resource rollback", e))?;
        }
        Ok(())
    }
}

/// Session bound to one [`ResourceConnection`]
pub struct ResourceSession {
    connection: SharedConnection,
    handle_transactions: bool,
    pending: Vec<String>,
}

impl ResourceSession {
    /// Queue a statement for the next flush
    pub fn execute(&mut self, statement: impl Into<String>) {
        self.pending.push(statement.into());
    }

    /// Statements waiting for flush
    pub fn pending(&self) -> &[String] {
        &self.pending
    }
}

impl Session for ResourceSession {
    fn flush(&mut self) -> EngineResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut connection = self.connection.lock();
        if self.handle_transactions && !connection.is_active() {
            return Err(EngineError::persistence(
                "resource flush",
                "an active resource transaction is required",
            ));
        }
        let statements = std::mem::take(&mut self.pending);
        connection
            .execute(&statements)
            .map_err(|e| EngineError::persistence("resource flush", e))
    }

    fn close(&mut self) -> EngineResult<()> {
        self.pending.clear();
        self.connection
            .lock()
            .close()
            .map_err(|e| EngineError::persistence("resource close", e))
    }

    fn name(&self) -> &'static str {
        "resource"
    }
}

impl fmt::Debug for ResourceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSession")
            .field("handle_transactions", &self.handle_transactions)
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Opens [`ResourceSession`]s, one connection each
#[derive(Clone)]
pub struct ResourceSessionFactory {
    resource: Arc<dyn ExternalResource>,
    handle_transactions: bool,
}

impl ResourceSessionFactory {
    /// Factory for `resource`
    pub fn new(resource: Arc<dyn ExternalResource>, handle_transactions: bool) -> Self {
        Self {
            resource,
            handle_transactions,
        }
    }
}

impl SessionFactory for ResourceSessionFactory {
    fn session_type(&self) -> TypeId {
        TypeId::of::<ResourceSession>()
    }

    fn open(&self, transaction: &mut TransactionContext) -> EngineResult<Box<dyn Session>> {
        let mut handle_transactions = self.handle_transactions;

        if handle_transactions && !self.resource.supports_transactions() {
            warn!(
                target: "cadence::session",
                "Resource does not support transactions, continuing without transaction handling"
            );
            handle_transactions = false;
        }

        let mut connection = self
            .resource
            .connect()
            .map_err(|e| EngineError::persistence("resource connect", e))?;

        if handle_transactions {
            connection
                .begin()
                .map_err(|e| EngineError::persistence("resource begin", e))?;
            debug!(target: "cadence::session", "Resource transaction started");
        }

        let connection: SharedConnection = Arc::new(Mutex::new(connection));
        if handle_transactions {
            transaction.add_listener(
                TransactionPhase::Committed,
                CommitResource {
                    connection: Arc::clone(&connection),
                },
            );
            transaction.add_listener(
                TransactionPhase::RolledBack,
                RollbackResource {
                    connection: Arc::clone(&connection),
                },
            );
        }

        Ok(Box::new(ResourceSession {
            connection,
            handle_transactions,
            pending: Vec::new(),
        }))
    }
}
