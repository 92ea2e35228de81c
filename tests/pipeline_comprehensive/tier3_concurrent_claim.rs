//! Tier 3: concurrent claims of one task.

use cadence::{Caller, EngineError};

use crate::test_utils::{race, Harness};

const ROUNDS: usize = 20;

#[test]
fn test_losing_claims_name_the_winner() {
    let users = ["kermit", "gonzo", "fozzie", "piggy"];

    for _ in 0..ROUNDS {
        let h = Harness::new();
        let case = h.loan();
        let task = h.task_of(&h.child(&case.id, "review").id);
        let id = task.id.clone();

        let callers = users.iter().map(|u| Caller::user(*u)).collect();
        let results = race(&h.engine, callers, move |e| {
            let user = e.caller().user_id.clone().unwrap_or_default();
            e.claim_task(&id, &user)
        });

        let winners: Vec<String> = results
            .iter()
            .filter(|(_, r)| r.is_ok())
            .filter_map(|(c, _)| c.user_id.clone())
            .collect();
        assert_eq!(winners.len(), 1);
        let winner = &winners[0];

        for (caller, result) in &results {
            match result {
                Ok(()) => assert_eq!(caller.user_id.as_ref(), Some(winner)),
                Err(EngineError::TaskAlreadyClaimed { task_id, assignee }) => {
                    assert_eq!(task_id, &task.id);
                    assert_eq!(assignee, winner);
                }
                Err(other) => panic!("unexpected claim error: {:?}", other),
            }
        }
        assert_eq!(h.engine.task(&task.id).unwrap().assignee.as_ref(), Some(winner));
    }
}

#[test]
fn test_unclaimed_task_claim_succeeds() {
    let h = Harness::new();
    let case = h.loan();
    let task = h.task_of(&h.child(&case.id, "review").id);

    h.engine.claim_task(&task.id, "kermit").unwrap();
    assert_eq!(h.task_of(&task.case_execution_id.unwrap()).assignee.as_deref(), Some("kermit"));
}
