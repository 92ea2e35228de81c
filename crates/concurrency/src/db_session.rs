//! Primary entity session
//!
//! Caches every entity it loads together with the copy it loaded, so flush
//! can tell which entities changed. Flush turns the cache into one
//! [`WriteOp`] batch, in first-touch order:
//!
//! - new entities become inserts
//! - changed entities become updates conditioned on the loaded revision
//! - deleted entities become deletes conditioned on the loaded revision
//!
//! Unchanged entities are not written and keep their revision.

use std::any::TypeId;
use std::sync::Arc;

use cadence_core::{CaseExecution, EngineError, EngineResult, EntityKind, EntityRecord, Job, Task};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::session::{Session, SessionFactory};
use crate::store::{EntityStore, WriteOp};
use crate::transaction::TransactionContext;

#[derive(Debug)]
struct CachedEntity {
    /// Copy as loaded; `None` for entities created in this unit of work
    loaded: Option<EntityRecord>,
    current: EntityRecord,
    deleted: bool,
}

/// Session over the shared [`EntityStore`]
#[derive(Debug)]
pub struct DbEntitySession {
    store: Arc<EntityStore>,
    entries: Vec<CachedEntity>,
    index: FxHashMap<String, usize>,
}

macro_rules! typed_lookup {
    ($name:ident, $variant:ident, $ty:ty, $kind:expr) => {
        /// Load by id, failing with `NotFound` if absent or of another kind
        pub fn $name(&mut self, id: &str) -> EngineResult<&mut $ty> {
            match self.find(id)? {
                Some(EntityRecord::$variant(entity)) => Ok(entity),
                _ => Err(EngineError::not_found($kind, id)),
            }
        }
    };
}

impl DbEntitySession {
    /// Session over `store` with an empty cache
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self {
            store,
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// Load an entity through the cache
    ///
    /// Returns `None` if the entity does not exist or was deleted in this
    /// unit of work.
    pub fn find(&mut self, id: &str) -> EngineResult<Option<&mut EntityRecord>> {
        let index = match self.index.get(id) {
            Some(&index) => index,
            None => match self.store.get(id) {
                Some(record) => self.push(Some(record.clone()), record),
                None => return Ok(None),
            },
        };
        let entry = &mut self.entries[index];
        if entry.deleted {
            return Ok(None);
        }
        Ok(Some(&mut entry.current))
    }

    typed_lookup!(case_execution, CaseExecution, CaseExecution, EntityKind::CaseExecution);
    typed_lookup!(task, Task, Task, EntityKind::Task);
    typed_lookup!(job, Job, Job, EntityKind::Job);

    /// Stage a new entity for insert
    ///
    /// # Errors
    ///
    /// Fails if an entity with the same id is already cached.
    pub fn insert(&mut self, record: impl Into<EntityRecord>) -> EngineResult<()> {
        let record = record.into();
        if self.index.contains_key(record.id()) {
            return Err(EngineError::internal(format!(
                "{} '{}' already in session",
                record.kind(),
                record.id()
            )));
        }
        self.push(None, record);
        Ok(())
    }

    /// Stage a delete
    pub fn delete(&mut self, id: &str) -> EngineResult<()> {
        if self.find(id)?.is_none() {
            return Ok(());
        }
        if let Some(&index) = self.index.get(id) {
            self.entries[index].deleted = true;
        }
        Ok(())
    }

    /// Ids of child executions of `parent_id`, stored or staged
    pub fn children_of(&mut self, parent_id: &str) -> Vec<String> {
        let mut ids = self.store.children_of(parent_id);
        for entry in &self.entries {
            if entry.loaded.is_none() && entry.current.parent_id() == Some(parent_id) {
                ids.push(entry.current.id().to_string());
            }
        }
        ids.retain(|id| {
            self.index
                .get(id)
                .map_or(true, |&index| !self.entries[index].deleted)
        });
        ids
    }

    /// Ids of tasks bound to `execution_id`, stored or staged
    pub fn tasks_of(&mut self, execution_id: &str) -> Vec<String> {
        let mut ids = self.store.tasks_of(execution_id);
        for entry in &self.entries {
            if let (None, EntityRecord::Task(task)) = (&entry.loaded, &entry.current) {
                if task.case_execution_id.as_deref() == Some(execution_id) {
                    ids.push(task.id.clone());
                }
            }
        }
        ids.retain(|id| {
            self.index
                .get(id)
                .map_or(true, |&index| !self.entries[index].deleted)
        });
        ids
    }

    /// Number of cached entities that flush would write
    pub fn dirty_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| Self::write_for(e).is_some())
            .count()
    }

    fn push(&mut self, loaded: Option<EntityRecord>, current: EntityRecord) -> usize {
        let index = self.entries.len();
        self.index.insert(current.id().to_string(), index);
        self.entries.push(CachedEntity {
            loaded,
            current,
            deleted: false,
        });
        index
    }

    fn write_for(entry: &CachedEntity) -> Option<WriteOp> {
        match (&entry.loaded, entry.deleted) {
            (None, true) => None,
            (None, false) => Some(WriteOp::Insert(entry.current.clone())),
            (Some(loaded), true) => Some(WriteOp::Delete {
                kind: loaded.kind(),
                id: loaded.id().to_string(),
                expected_revision: loaded.revision(),
            }),
            (Some(loaded), false) if *loaded != entry.current => Some(WriteOp::Update {
                record: entry.current.clone(),
                expected_revision: loaded.revision(),
            }),
            (Some(_), false) => None,
        }
    }
}

impl Session for DbEntitySession {
    fn flush(&mut self) -> EngineResult<()> {
        let batch: Vec<WriteOp> = self.entries.iter().filter_map(Self::write_for).collect();
        if batch.is_empty() {
            return Ok(());
        }

        debug!(target: "cadence::session", writes = batch.len(), "Flushing entity session");
        self.store.apply(batch)?;

        // The cache now mirrors the store; deleted entities leave it
        self.entries.retain(|entry| !entry.deleted);
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.current.id().to_string(), index))
            .collect();
        for entry in &mut self.entries {
            if let Some(loaded) = &entry.loaded {
                if *loaded != entry.current {
                    let next = loaded.revision() + 1;
                    entry.current.set_revision(next);
                }
            }
            entry.loaded = Some(entry.current.clone());
        }
        Ok(())
    }

    fn close(&mut self) -> EngineResult<()> {
        self.entries.clear();
        self.index.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "entity"
    }
}

/// Opens [`DbEntitySession`]s over one shared store
#[derive(Debug, Clone)]
pub struct DbEntitySessionFactory {
    store: Arc<EntityStore>,
}

impl DbEntitySessionFactory {
    /// Factory for `store`
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }
}

impl SessionFactory for DbEntitySessionFactory {
    fn session_type(&self) -> TypeId {
        TypeId::of::<DbEntitySession>()
    }

    fn open(&self, _transaction: &mut TransactionContext) -> EngineResult<Box<dyn Session>> {
        Ok(Box::new(DbEntitySession::new(Arc::clone(&self.store))))
    }
}
