//! The unit of work
//!
//! A [`CommandContext`] is opened once per top-level invocation and shared by
//! `&mut` with every command nested inside it. It owns:
//!
//! - the sessions opened so far, in opening order
//! - the transaction listener registry
//! - the per-context authorization flag and the caller identity
//! - failures recorded while finishing the unit of work
//!
//! ## Close
//!
//! ```text
//! command ok:   flush sessions in order
//!                 all ok  -> COMMITTING, COMMITTED, close sessions, Ok
//!                 failure -> ROLLING_BACK, ROLLED_BACK, close sessions, Err(flush failure)
//! command err:  ROLLING_BACK, ROLLED_BACK, close sessions, Err(original)
//! ```
//!
//! Listener and close failures never change the outcome. They are logged and
//! kept in [`CommandContext::failures`].

use std::fmt;
use std::sync::Arc;

use cadence_concurrency::{
    DbEntitySession, DbEntitySessionFactory, EntityStore, Session, SessionFactories,
    SessionFactory, Sessions, TransactionContext, TransactionListener, TransactionPhase,
};
use cadence_core::{Caller, DefinitionRepository, EngineError, EngineResult, InMemoryDefinitions};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::state_machine::{CaseRelationRules, RelationRules};

/// Everything shared by all units of work of one engine
pub struct EngineServices {
    config: EngineConfig,
    store: Arc<EntityStore>,
    factories: SessionFactories,
    definitions: Arc<dyn DefinitionRepository>,
    relation_rules: Arc<dyn RelationRules>,
}

impl EngineServices {
    /// Services over `store`, with the primary entity session registered
    pub fn new(config: EngineConfig, store: Arc<EntityStore>) -> Self {
        let factories =
            SessionFactories::new().with(Arc::new(DbEntitySessionFactory::new(Arc::clone(&store))));
        Self {
            config,
            store,
            factories,
            definitions: Arc::new(InMemoryDefinitions::new()),
            relation_rules: Arc::new(CaseRelationRules),
        }
    }

    /// Register an additional session factory
    pub fn with_session_factory(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.factories.register(factory);
        self
    }

    /// Replace the definition repository
    pub fn with_definitions(mut self, definitions: Arc<dyn DefinitionRepository>) -> Self {
        self.definitions = definitions;
        self
    }

    /// Replace the relation rules run after each transition
    pub fn with_relation_rules(mut self, rules: Arc<dyn RelationRules>) -> Self {
        self.relation_rules = rules;
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared entity store
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// Definition repository
    pub fn definitions(&self) -> &Arc<dyn DefinitionRepository> {
        &self.definitions
    }

    /// Relation rules
    pub fn relation_rules(&self) -> &Arc<dyn RelationRules> {
        &self.relation_rules
    }
}

impl fmt::Debug for EngineServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineServices")
            .field("config", &self.config)
            .field("factories", &self.factories)
            .finish()
    }
}

/// One unit of work
pub struct CommandContext {
    services: Arc<EngineServices>,
    caller: Caller,
    sessions: Sessions,
    transaction: TransactionContext,
    authorization_check_enabled: bool,
    failures: Vec<EngineError>,
    closed: bool,
}

impl CommandContext {
    /// Fresh unit of work for `caller`: no sessions, no listeners
    pub fn new(services: Arc<EngineServices>, caller: Caller) -> Self {
        Self {
            services,
            caller,
            sessions: Sessions::new(),
            transaction: TransactionContext::new(),
            authorization_check_enabled: true,
            failures: Vec::new(),
            closed: false,
        }
    }

    /// Identity the unit of work runs for
    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// Shared engine services
    pub fn services(&self) -> &Arc<EngineServices> {
        &self.services
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.services.config
    }

    /// Session of type `S`, opened on first use
    pub fn session<S: Session>(&mut self) -> EngineResult<&mut S> {
        self.sessions
            .get_or_open::<S>(&self.services.factories, &mut self.transaction)
    }

    /// The primary entity session
    pub fn db_session(&mut self) -> EngineResult<&mut DbEntitySession> {
        self.session::<DbEntitySession>()
    }

    /// Sessions opened so far
    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    /// Register a listener for `phase`
    pub fn add_listener<L>(&mut self, phase: TransactionPhase, listener: L)
    where
        L: TransactionListener + 'static,
    {
        self.transaction.add_listener(phase, listener);
    }

    /// The listener registry
    pub fn transaction(&self) -> &TransactionContext {
        &self.transaction
    }

    /// Are permission checks on for this unit of work?
    pub fn is_authorization_check_enabled(&self) -> bool {
        self.services.config.authorization_enabled && self.authorization_check_enabled
    }

    /// Turn permission checks off for the rest of this unit of work
    pub fn disable_authorization_check(&mut self) {
        self.authorization_check_enabled = false;
    }

    /// Turn permission checks back on
    pub fn enable_authorization_check(&mut self) {
        self.authorization_check_enabled = true;
    }

    /// Run `f` with permission checks off, restoring the previous setting
    pub fn without_authorization<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.authorization_check_enabled;
        self.authorization_check_enabled = false;
        let out = f(self);
        self.authorization_check_enabled = previous;
        out
    }

    /// Failures recorded while finishing the unit of work
    pub fn failures(&self) -> &[EngineError] {
        &self.failures
    }

    /// True once [`close`](Self::close) has run
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Finish the unit of work with the command's `result`
    ///
    /// Returns `result` unchanged unless a session flush fails, in which case
    /// the flush failure is returned instead.
    pub fn close<T>(&mut self, result: EngineResult<T>) -> EngineResult<T> {
        if self.closed {
            return Err(EngineError::internal("command context closed twice"));
        }
        self.closed = true;

        let value = match result {
            Ok(value) => value,
            Err(e) => {
                debug!(target: "cadence::txn", error = %e, "Command failed, rolling back");
                self.rollback();
                return Err(e);
            }
        };

        if let Err(e) = self.sessions.flush_all() {
            warn!(target: "cadence::txn", error = %e, "Session flush failed, rolling back");
            self.rollback();
            return Err(e);
        }

        self.fire(TransactionPhase::Committing);
        self.fire(TransactionPhase::Committed);
        self.close_sessions();
        debug!(target: "cadence::txn", "Unit of work committed");
        Ok(value)
    }

    fn rollback(&mut self) {
        self.fire(TransactionPhase::RollingBack);
        self.fire(TransactionPhase::RolledBack);
        self.close_sessions();
    }

    fn fire(&mut self, phase: TransactionPhase) {
        let failures = self.transaction.fire(phase);
        self.failures.extend(failures);
    }

    fn close_sessions(&mut self) {
        for e in self.sessions.close_all() {
            warn!(target: "cadence::session", error = %e, "Session close failed");
            self.failures.push(e);
        }
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("caller", &self.caller)
            .field("sessions", &self.sessions)
            .field("transaction", &self.transaction)
            .field("authorization_check_enabled", &self.authorization_check_enabled)
            .field("failures", &self.failures.len())
            .field("closed", &self.closed)
            .finish()
    }
}
