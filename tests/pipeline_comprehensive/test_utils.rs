//! Shared helpers for the pipeline suite.

#![allow(dead_code)]

use std::sync::{Arc, Barrier, Once};
use std::thread;

use cadence::{
    CaseDefinition, CaseExecution, Cadence, Caller, DefinitionElement, ElementKind, EngineConfig,
    EngineResult, EntityRecord, EntityStore, InMemoryDefinitions, LifecycleState, Task, Variables,
};

static TRACING: Once = Once::new();

/// Route engine logs to the test writer once per process
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .try_init();
    });
}

/// Engine plus the store it writes to
pub struct Harness {
    pub engine: Cadence,
    pub store: Arc<EntityStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::build(config, |b| b)
    }

    pub fn build(
        config: EngineConfig,
        extra: impl FnOnce(cadence::ExecutorBuilder) -> cadence::ExecutorBuilder,
    ) -> Self {
        init_tracing();
        let store = Arc::new(EntityStore::new());
        let shared = Arc::clone(&store);
        let engine = Cadence::builder()
            .configure(|b| {
                extra(
                    b.with_config(config)
                        .with_store(shared)
                        .with_definitions(Arc::new(definitions())),
                )
            })
            .build()
            .unwrap();
        Self { engine, store }
    }

    /// Standalone case instance in `state` at `revision`
    pub fn seed(&self, state: LifecycleState, revision: u64) -> CaseExecution {
        let mut execution = CaseExecution::new_case_instance("loan", "plan");
        execution.state = state;
        execution.revision = revision;
        if state == LifecycleState::Suspended {
            execution.suspended_from = Some(LifecycleState::Active);
        }
        self.store.put(execution.clone());
        execution
    }

    /// A loan case created through the engine
    pub fn loan(&self) -> CaseExecution {
        self.engine
            .create_case_instance("loan", None, Variables::new())
            .unwrap()
    }

    pub fn execution(&self, id: &str) -> CaseExecution {
        match self.store.get(id) {
            Some(EntityRecord::CaseExecution(e)) => e,
            other => panic!("expected case execution '{}', got {:?}", id, other),
        }
    }

    pub fn child(&self, parent_id: &str, activity_id: &str) -> CaseExecution {
        self.store
            .children_of(parent_id)
            .iter()
            .map(|id| self.execution(id))
            .find(|e| e.activity_id == activity_id)
            .unwrap_or_else(|| panic!("no child '{}'", activity_id))
    }

    pub fn task_of(&self, execution_id: &str) -> Task {
        let id = self.store.tasks_of(execution_id).pop().expect("task");
        match self.store.get(&id) {
            Some(EntityRecord::Task(t)) => t,
            other => panic!("expected task, got {:?}", other),
        }
    }
}

/// `review` is an automatic human task, `sign` a manual milestone
pub fn definitions() -> InMemoryDefinitions {
    let mut repo = InMemoryDefinitions::new();
    repo.deploy(CaseDefinition::new(
        "loan",
        DefinitionElement::new("plan", "Loan application", ElementKind::CasePlan)
            .with_child(DefinitionElement::new("review", "Review", ElementKind::HumanTask))
            .with_child(DefinitionElement::new("sign", "Signed", ElementKind::Milestone).manual()),
    ));
    repo
}

/// Run `op` once per caller, all released together
pub fn race<T, F>(engine: &Cadence, callers: Vec<Caller>, op: F) -> Vec<(Caller, EngineResult<T>)>
where
    T: Send + 'static,
    F: Fn(&Cadence) -> EngineResult<T> + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(callers.len()));
    let op = Arc::new(op);
    let handles: Vec<_> = callers
        .into_iter()
        .map(|caller| {
            let handle = engine.as_user(caller.clone());
            let barrier = Arc::clone(&barrier);
            let op = Arc::clone(&op);
            thread::spawn(move || {
                barrier.wait();
                (caller, op(&handle))
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}
