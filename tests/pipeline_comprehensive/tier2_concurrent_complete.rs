//! Tier 2: concurrent completes of one execution.
//!
//! Exactly one caller wins. Every loser either conflicts and retries, or
//! loads after the winner committed; both paths end in an illegal
//! transition out of COMPLETED.

use cadence::{Caller, EngineError, LifecycleState, VariableMutations};

use crate::test_utils::{race, Harness};

const ROUNDS: usize = 20;
const CONTENDERS: usize = 4;

#[test]
fn test_one_complete_wins_losers_see_completed() {
    for _ in 0..ROUNDS {
        let h = Harness::new();
        let case = h.loan();
        let review = h.child(&case.id, "review");
        let id = review.id.clone();

        let results = race(&h.engine, vec![Caller::system(); CONTENDERS], move |e| {
            e.complete(&id, VariableMutations::new())
        });

        let wins = results.iter().filter(|(_, r)| r.is_ok()).count();
        assert_eq!(wins, 1);
        for (_, result) in &results {
            if let Err(err) = result {
                assert!(
                    matches!(
                        err,
                        EngineError::IllegalStateTransition { state: LifecycleState::Completed, .. }
                    ),
                    "unexpected loser error: {:?}",
                    err
                );
            }
        }

        let stored = h.execution(&review.id);
        assert_eq!(stored.state, LifecycleState::Completed);
        assert_eq!(stored.revision, review.revision + 1);
    }
}
