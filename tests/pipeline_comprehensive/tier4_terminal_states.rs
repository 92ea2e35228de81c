//! Tier 4: transitions out of terminal states never mutate or flush.

use cadence::{EngineError, LifecycleState, TransitionKind, VariableMutations};

use crate::test_utils::Harness;

const KINDS: [TransitionKind; 9] = [
    TransitionKind::Enable,
    TransitionKind::Disable,
    TransitionKind::Reenable,
    TransitionKind::ManualStart,
    TransitionKind::Complete,
    TransitionKind::Suspend,
    TransitionKind::Resume,
    TransitionKind::Terminate,
    TransitionKind::Close,
];

#[test]
fn test_terminal_states_reject_every_transition() {
    let h = Harness::new();

    for state in [LifecycleState::Completed, LifecycleState::Terminated, LifecycleState::Closed] {
        for kind in KINDS {
            // Closing a finished case instance is the one way out
            if kind == TransitionKind::Close && state != LifecycleState::Closed {
                continue;
            }
            let seeded = h.seed(state, 5);
            let batches = h.store.batches_applied();

            let err = h
                .engine
                .transition(kind, &seeded.id, VariableMutations::new().set("touched", true))
                .unwrap_err();

            match err {
                EngineError::IllegalStateTransition {
                    execution_id,
                    transition,
                    state: found,
                } => {
                    assert_eq!(execution_id, seeded.id);
                    assert_eq!(transition, kind);
                    assert_eq!(found, state);
                }
                other => panic!("{} from {}: unexpected {:?}", kind, state, other),
            }
            assert_eq!(h.execution(&seeded.id), seeded, "{} from {} mutated", kind, state);
            assert_eq!(h.store.batches_applied(), batches, "{} from {} flushed", kind, state);
        }
    }
}
