//! Concurrent command tests.
//!
//! Threads line up on a barrier and then race the same command. The store's
//! revision check decides the winner; the loser retries against fresh state
//! and surfaces the domain error that state implies.

use std::sync::{Arc, Barrier};
use std::thread;

use cadence_core::{Caller, EngineError, EngineResult, LifecycleState, VariableMutations};

use super::*;

fn race<T, F>(engine: &Cadence, contenders: Vec<Caller>, op: F) -> Vec<(Caller, EngineResult<T>)>
where
    T: Send + 'static,
    F: Fn(&Cadence) -> EngineResult<T> + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(contenders.len()));
    let op = Arc::new(op);

    let handles: Vec<_> = contenders
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

#[test]
fn test_concurrent_completes_one_wins() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let review = child(&store, &case.id, "review");
    let id = review.id.clone();

    let results = race(
        &engine,
        vec![Caller::system(), Caller::system()],
        move |e| e.complete(&id, VariableMutations::new()),
    );

    let wins = results.iter().filter(|(_, r)| r.is_ok()).count();
    assert_eq!(wins, 1);
    let loser = results.iter().find_map(|(_, r)| r.as_ref().err()).unwrap();
    assert!(
        matches!(loser, EngineError::IllegalStateTransition { state: LifecycleState::Completed, .. }),
        "unexpected loser error: {:?}",
        loser
    );

    let review = stored_execution(&store, &review.id);
    assert_eq!(review.state, LifecycleState::Completed);
    assert_eq!(review.revision, 2);
}

#[test]
fn test_concurrent_claims_loser_sees_winner() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let task = task_of(&store, &child(&store, &case.id, "review").id);
    let id = task.id.clone();

    let results = race(
        &engine,
        vec![Caller::user("kermit"), Caller::user("gonzo")],
        move |e| {
            let user = e.caller().user_id.clone().unwrap_or_default();
            e.claim_task(&id, &user)
        },
    );

    let winner = results
        .iter()
        .find(|(_, r)| r.is_ok())
        .map(|(c, _)| c.user_id.clone().unwrap())
        .expect("one claim must win");
    let loser = results.iter().find_map(|(_, r)| r.as_ref().err()).unwrap();

    match loser {
        EngineError::TaskAlreadyClaimed { assignee, .. } => assert_eq!(assignee, &winner),
        other => panic!("expected TaskAlreadyClaimed, got {:?}", other),
    }
    assert_eq!(engine.task(&task.id).unwrap().assignee, Some(winner));
}

#[test]
fn test_concurrent_updates_to_different_items_both_commit() {
    let (engine, store) = engine();
    let case = start_loan(&engine);
    let review = child(&store, &case.id, "review").id;
    let sign = child(&store, &case.id, "sign").id;

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [(review.clone(), true), (sign.clone(), false)]
        .into_iter()
        .map(|(id, local)| {
            let engine = engine.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                if local {
                    engine.suspend(&id)
                } else {
                    engine.disable(&id)
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(stored_execution(&store, &review).state, LifecycleState::Suspended);
    assert_eq!(stored_execution(&store, &sign).state, LifecycleState::Disabled);
}
