//! Session SPI and the per-unit-of-work session registry
//!
//! A [`Session`] is one persistence backend's view of a unit of work. Writes
//! are deferred until [`Session::flush`]; [`Session::close`] releases
//! resources. Sessions are opened lazily, at most once per kind, by the
//! [`SessionFactory`] registered for their type. The registry remembers the
//! order in which sessions were opened; that order is the flush order.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use cadence_core::{EngineError, EngineResult};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::transaction::TransactionContext;

/// Downcast support for sessions
pub trait AsAny: Any {
    /// `&dyn Any` view
    fn as_any(&self) -> &dyn Any;
    /// `&mut dyn Any` view
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A persistence backend bound to one unit of work
pub trait Session: AsAny {
    /// Materialize deferred writes
    fn flush(&mut self) -> EngineResult<()>;

    /// Release resources; called once, after flush or rollback
    fn close(&mut self) -> EngineResult<()>;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Opens sessions of one concrete type
pub trait SessionFactory: Send + Sync {
    /// `TypeId` of the session type this factory opens
    fn session_type(&self) -> TypeId;

    /// Open a session
    ///
    /// Backends that synchronize with the unit of work register their
    /// listeners on `transaction` here.
    fn open(&self, transaction: &mut TransactionContext) -> EngineResult<Box<dyn Session>>;
}

/// Session factories keyed by session type
#[derive(Clone, Default)]
pub struct SessionFactories {
    factories: FxHashMap<TypeId, Arc<dyn SessionFactory>>,
}

impl SessionFactories {
    /// No factories
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory`, replacing one for the same session type
    pub fn register(&mut self, factory: Arc<dyn SessionFactory>) {
        self.factories.insert(factory.session_type(), factory);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.register(factory);
        self
    }

    fn get(&self, type_id: &TypeId) -> Option<&Arc<dyn SessionFactory>> {
        self.factories.get(type_id)
    }
}

impl fmt::Debug for SessionFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFactories")
            .field("count", &self.factories.len())
            .finish()
    }
}

/// Sessions opened in one unit of work, in opening order
#[derive(Default)]
pub struct Sessions {
    open: Vec<(TypeId, Box<dyn Session>)>,
}

impl Sessions {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open sessions
    pub fn len(&self) -> usize {
        self.open.len()
    }

    /// True if no session has been opened
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Is a session of type `S` open?
    pub fn contains<S: Session>(&self) -> bool {
        let type_id = TypeId::of::<S>();
        self.open.iter().any(|(t, _)| *t == type_id)
    }

    /// Register an already-open session
    ///
    /// # Errors
    ///
    /// Fails if a session of the same type is already registered.
    pub fn insert<S: Session>(&mut self, session: S) -> EngineResult<()> {
        if self.contains::<S>() {
            return Err(EngineError::internal(format!(
                "session {} already open",
                std::any::type_name::<S>()
            )));
        }
        self.open.push((TypeId::of::<S>(), Box::new(session)));
        Ok(())
    }

    /// Session of type `S`, opened through `factories` on first use
    ///
    /// # Errors
    ///
    /// Fails if no factory is registered for `S`, or if opening fails.
    pub fn get_or_open<S: Session>(
        &mut self,
        factories: &SessionFactories,
        transaction: &mut TransactionContext,
    ) -> EngineResult<&mut S> {
        let type_id = TypeId::of::<S>();
        let index = match self.open.iter().position(|(t, _)| *t == type_id) {
            Some(index) => index,
            None => {
                let factory = factories.get(&type_id).ok_or_else(|| {
                    EngineError::configuration(format!(
                        "no session factory registered for {}",
                        std::any::type_name::<S>()
                    ))
                })?;
                let session = factory.open(transaction)?;
                debug!(target: "cadence::session", session = session.name(), "Session opened");
                self.open.push((type_id, session));
                self.open.len() - 1
            }
        };

        self.open[index]
            .1
            .as_mut()
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or_else(|| {
                EngineError::internal(format!(
                    "session factory for {} opened a different type",
                    std::any::type_name::<S>()
                ))
            })
    }

    /// Flush every session in opening order, stopping at the first failure
    pub fn flush_all(&mut self) -> EngineResult<()> {
        for (_, session) in self.open.iter_mut() {
            debug!(target: "cadence::session", session = session.name(), "Flushing session");
            session.flush()?;
        }
        Ok(())
    }

    /// Close every session in opening order
    ///
    /// All sessions are closed even if some fail; the failures are returned.
    pub fn close_all(&mut self) -> Vec<EngineError> {
        let mut failures = Vec::new();
        for (_, mut session) in self.open.drain(..) {
            if let Err(e) = session.close() {
                failures.push(e);
            }
        }
        failures
    }
}

impl fmt::Debug for Sessions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.open.iter().map(|(_, s)| s.name()))
            .finish()
    }
}
