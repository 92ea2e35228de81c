//! Shared entity store with revision-checked writes
//!
//! The store is the single backing store shared by every engine instance.
//! Concurrency between callers is mediated entirely by the revision check:
//! an update or delete only applies if the stored revision still equals the
//! revision the writer loaded. Zero matching rows is reported as
//! [`EngineError::OptimisticLock`].
//!
//! ## Batch application
//!
//! ```text
//! 1. take the write lock
//! 2. validate every operation in the batch (first failure aborts, nothing applied)
//! 3. apply every operation
//! 4. release the lock
//! ```
//!
//! Other callers therefore never observe part of a batch.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use cadence_core::{EngineError, EngineResult, EntityKind, EntityRecord};
use parking_lot::RwLock;
use tracing::{debug, trace};

/// One deferred write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert a new entity; fails if the id is taken
    Insert(EntityRecord),
    /// Replace an entity loaded at `expected_revision`; the stored record
    /// gets `expected_revision + 1`
    Update {
        /// New contents
        record: EntityRecord,
        /// Revision the writer loaded
        expected_revision: u64,
    },
    /// Remove an entity loaded at `expected_revision`
    Delete {
        /// Entity kind
        kind: EntityKind,
        /// Entity id
        id: String,
        /// Revision the writer loaded
        expected_revision: u64,
    },
}

impl WriteOp {
    fn id(&self) -> &str {
        match self {
            WriteOp::Insert(record) | WriteOp::Update { record, .. } => record.id(),
            WriteOp::Delete { id, .. } => id,
        }
    }
}

/// In-memory entity store keyed by entity id
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: RwLock<BTreeMap<String, EntityRecord>>,
    /// Batches applied; observational only
    batches_applied: AtomicU64,
}

impl EntityStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entity outside any unit of work, replacing one with the same id
    pub fn put(&self, record: impl Into<EntityRecord>) {
        let record = record.into();
        self.entities.write().insert(record.id().to_string(), record);
    }

    /// Current stored copy of an entity
    pub fn get(&self, id: &str) -> Option<EntityRecord> {
        self.entities.read().get(id).cloned()
    }

    /// Case executions whose parent is `parent_id`, ordered by id
    pub fn children_of(&self, parent_id: &str) -> Vec<String> {
        self.entities
            .read()
            .values()
            .filter(|r| r.parent_id() == Some(parent_id))
            .map(|r| r.id().to_string())
            .collect()
    }

    /// Tasks bound to the case execution `execution_id`, ordered by id
    pub fn tasks_of(&self, execution_id: &str) -> Vec<String> {
        self.entities
            .read()
            .values()
            .filter_map(|r| match r {
                EntityRecord::Task(t) if t.case_execution_id.as_deref() == Some(execution_id) => {
                    Some(t.id.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    /// Number of batches applied since creation
    pub fn batches_applied(&self) -> u64 {
        self.batches_applied.load(Ordering::Relaxed)
    }

    /// Apply `batch` atomically
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OptimisticLock`] for the first operation whose
    /// revision check fails, in which case nothing is applied.
    pub fn apply(&self, batch: Vec<WriteOp>) -> EngineResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut entities = self.entities.write();

        for op in &batch {
            Self::validate(&entities, op)?;
        }

        let count = batch.len();
        for op in batch {
            trace!(target: "cadence::store", id = op.id(), "apply");
            match op {
                WriteOp::Insert(record) => {
                    entities.insert(record.id().to_string(), record);
                }
                WriteOp::Update {
                    mut record,
                    expected_revision,
                } => {
                    record.set_revision(expected_revision + 1);
                    entities.insert(record.id().to_string(), record);
                }
                WriteOp::Delete { id, .. } => {
                    entities.remove(&id);
                }
            }
        }

        self.batches_applied.fetch_add(1, Ordering::Relaxed);
        debug!(target: "cadence::store", operations = count, "Batch applied");
        Ok(())
    }

    fn validate(entities: &BTreeMap<String, EntityRecord>, op: &WriteOp) -> EngineResult<()> {
        match op {
            WriteOp::Insert(record) => {
                if entities.contains_key(record.id()) {
                    return Err(EngineError::internal(format!(
                        "{} '{}' already exists",
                        record.kind(),
                        record.id()
                    )));
                }
            }
            WriteOp::Update {
                record,
                expected_revision,
            } => {
                let current = entities.get(record.id()).map(EntityRecord::revision);
                if current != Some(*expected_revision) {
                    return Err(EngineError::OptimisticLock {
                        kind: record.kind(),
                        id: record.id().to_string(),
                        expected_revision: *expected_revision,
                    });
                }
            }
            WriteOp::Delete {
                kind,
                id,
                expected_revision,
            } => {
                let current = entities.get(id).map(EntityRecord::revision);
                if current != Some(*expected_revision) {
                    return Err(EngineError::OptimisticLock {
                        kind: *kind,
                        id: id.clone(),
                        expected_revision: *expected_revision,
                    });
                }
            }
        }
        Ok(())
    }
}
