//! Test modules for the executor crate.

pub mod claim;
pub mod concurrency;

use std::sync::Arc;

use cadence_concurrency::EntityStore;
use cadence_core::{
    CaseDefinition, CaseExecution, DefinitionElement, ElementKind, EntityRecord, InMemoryDefinitions,
    Task, Variables,
};
use cadence_engine::EngineConfig;

use crate::Cadence;

/// Loan plan: `review` (human task, automatic) and `sign` (milestone, manual)
pub(crate) fn loan_definitions() -> InMemoryDefinitions {
    let mut repo = InMemoryDefinitions::new();
    repo.deploy(CaseDefinition::new(
        "loan",
        DefinitionElement::new("plan", "Loan application", ElementKind::CasePlan)
            .with_child(DefinitionElement::new("review", "Review application", ElementKind::HumanTask))
            .with_child(DefinitionElement::new("sign", "Contract signed", ElementKind::Milestone).manual()),
    ));
    repo
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Engine over a fresh store with the loan definition deployed
pub(crate) fn engine_with(config: EngineConfig) -> (Cadence, Arc<EntityStore>) {
    init_tracing();
    let store = Arc::new(EntityStore::new());
    let shared = Arc::clone(&store);
    let engine = Cadence::builder()
        .configure(|b| {
            b.with_config(config)
                .with_store(shared)
                .with_definitions(Arc::new(loan_definitions()))
        })
        .build()
        .unwrap();
    (engine, store)
}

pub(crate) fn engine() -> (Cadence, Arc<EntityStore>) {
    engine_with(EngineConfig::default())
}

/// A fresh loan case as the system caller
pub(crate) fn start_loan(engine: &Cadence) -> CaseExecution {
    engine
        .create_case_instance("loan", Some("LN-1"), Variables::new())
        .unwrap()
}

/// Stored child of `parent_id` for the plan item `activity_id`
pub(crate) fn child(store: &EntityStore, parent_id: &str, activity_id: &str) -> CaseExecution {
    store
        .children_of(parent_id)
        .into_iter()
        .find_map(|id| match store.get(&id) {
            Some(EntityRecord::CaseExecution(e)) if e.activity_id == activity_id => Some(e),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no child '{}' under '{}'", activity_id, parent_id))
}

/// Stored task bound to `execution_id`
pub(crate) fn task_of(store: &EntityStore, execution_id: &str) -> Task {
    let ids = store.tasks_of(execution_id);
    assert_eq!(ids.len(), 1, "expected one task for '{}'", execution_id);
    match store.get(&ids[0]) {
        Some(EntityRecord::Task(t)) => t,
        other => panic!("expected task, got {:?}", other),
    }
}

pub(crate) fn stored_execution(store: &EntityStore, id: &str) -> CaseExecution {
    match store.get(id) {
        Some(EntityRecord::CaseExecution(e)) => e,
        other => panic!("expected case execution '{}', got {:?}", id, other),
    }
}
