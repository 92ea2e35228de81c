//! Task claim and completion tests.

use cadence_core::{EngineError, LifecycleState, VariableMutations};
use serde_json::json;

use super::*;

#[test]
fn test_claim_sets_assignee_and_timestamp() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let task = task_of(&store, &child(&store, &case.id, "review").id);

    engine.claim_task(&task.id, "kermit").unwrap();

    let claimed = engine.task(&task.id).unwrap();
    assert_eq!(claimed.assignee.as_deref(), Some("kermit"));
    assert!(claimed.claimed_at.is_some());
    assert_eq!(claimed.revision, 2);
}

#[test]
fn test_claim_by_holder_is_a_no_op() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let task = task_of(&store, &child(&store, &case.id, "review").id);

    engine.claim_task(&task.id, "kermit").unwrap();
    let batches = store.batches_applied();
    engine.claim_task(&task.id, "kermit").unwrap();

    assert_eq!(store.batches_applied(), batches);
    assert_eq!(engine.task(&task.id).unwrap().revision, 2);
}

#[test]
fn test_claim_held_by_another_names_the_holder() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let task = task_of(&store, &child(&store, &case.id, "review").id);

    engine.claim_task(&task.id, "kermit").unwrap();
    let err = engine.claim_task(&task.id, "gonzo").unwrap_err();

    match err {
        EngineError::TaskAlreadyClaimed { task_id, assignee } => {
            assert_eq!(task_id, task.id);
            assert_eq!(assignee, "kermit");
        }
        other => panic!("expected TaskAlreadyClaimed, got {:?}", other),
    }
}

#[test]
fn test_unclaim_releases_the_task() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let task = task_of(&store, &child(&store, &case.id, "review").id);

    engine.claim_task(&task.id, "kermit").unwrap();
    engine.unclaim_task(&task.id).unwrap();
    engine.claim_task(&task.id, "gonzo").unwrap();

    let task = engine.task(&task.id).unwrap();
    assert_eq!(task.assignee.as_deref(), Some("gonzo"));
}

#[test]
fn test_complete_task_completes_its_execution() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let review = child(&store, &case.id, "review");
    let task = task_of(&store, &review.id);
    let batches = store.batches_applied();

    engine
        .complete_task(&task.id, VariableMutations::new().set("approved", true))
        .unwrap();

    // task delete and execution update flush together
    assert_eq!(store.batches_applied(), batches + 1);
    assert!(store.get(&task.id).is_none());
    assert_eq!(stored_execution(&store, &review.id).state, LifecycleState::Completed);
    assert_eq!(engine.variable(&review.id, "approved").unwrap(), Some(json!(true)));
}

#[test]
fn test_failed_nested_completion_keeps_the_task() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let review = child(&store, &case.id, "review");
    let task = task_of(&store, &review.id);

    engine.suspend(&review.id).unwrap();

    let err = engine.complete_task(&task.id, VariableMutations::new()).unwrap_err();

    assert!(matches!(err, EngineError::IllegalStateTransition { state: LifecycleState::Suspended, .. }));
    assert!(store.get(&task.id).is_some());
}

#[test]
fn test_terminating_execution_deletes_its_task() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let review = child(&store, &case.id, "review");
    let task = task_of(&store, &review.id);

    engine.terminate(&review.id).unwrap();

    assert!(store.get(&task.id).is_none());
    let err = engine.complete_task(&task.id, VariableMutations::new()).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[test]
fn test_completing_execution_directly_deletes_its_task() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let review = child(&store, &case.id, "review");
    let task = task_of(&store, &review.id);

    engine.complete(&review.id, VariableMutations::new()).unwrap();

    assert!(store.get(&task.id).is_none());
    assert!(store.tasks_of(&review.id).is_empty());
}

#[test]
fn test_terminating_case_deletes_child_tasks() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let review = child(&store, &case.id, "review");
    let task = task_of(&store, &review.id);

    engine.terminate(&case.id).unwrap();

    assert!(store.get(&task.id).is_none());
}

#[test]
fn test_complete_unknown_task_is_not_found() {
    let (engine, _store) = engine();
    let err = engine.complete_task("nope", VariableMutations::new()).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}
