//! Tier 7: a committed legal transition moves revision N to N+1 and lands
//! on the declared target state.

use cadence::{LifecycleState, TransitionKind, VariableMutations};
use proptest::prelude::*;

use crate::test_utils::Harness;

use LifecycleState::*;

/// (from, transition, target); SUSPENDED executions were suspended from ACTIVE
const LEGAL: &[(LifecycleState, TransitionKind, LifecycleState)] = &[
    (Available, TransitionKind::Enable, Enabled),
    (Enabled, TransitionKind::Disable, Disabled),
    (Disabled, TransitionKind::Reenable, Enabled),
    (Enabled, TransitionKind::ManualStart, Active),
    (Active, TransitionKind::Complete, Completed),
    (Enabled, TransitionKind::Complete, Completed),
    (Active, TransitionKind::Suspend, Suspended),
    (Enabled, TransitionKind::Suspend, Suspended),
    (Suspended, TransitionKind::Resume, Active),
    (Available, TransitionKind::Terminate, Terminated),
    (Enabled, TransitionKind::Terminate, Terminated),
    (Disabled, TransitionKind::Terminate, Terminated),
    (Active, TransitionKind::Terminate, Terminated),
    (Suspended, TransitionKind::Terminate, Terminated),
    (Completed, TransitionKind::Close, Closed),
    (Terminated, TransitionKind::Close, Closed),
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_legal_transition_bumps_revision_once(
        index in 0..LEGAL.len(),
        revision in 1u64..1_000,
    ) {
        let (from, kind, target) = LEGAL[index];
        let h = Harness::new();
        let seeded = h.seed(from, revision);

        let reached = h.engine.transition(kind, &seeded.id, VariableMutations::new()).unwrap();
        prop_assert_eq!(reached, target);

        let reloaded = h.engine.case_execution(&seeded.id).unwrap();
        prop_assert_eq!(reloaded.revision, revision + 1);
        prop_assert_eq!(reloaded.state, target);
    }
}

#[test]
fn test_every_legal_pair_once() {
    for &(from, kind, target) in LEGAL {
        let h = Harness::new();
        let seeded = h.seed(from, 1);
        let reached = h.engine.transition(kind, &seeded.id, VariableMutations::new()).unwrap();
        assert_eq!(reached, target, "{} from {}", kind, from);
        assert_eq!(h.execution(&seeded.id).revision, 2);
    }
}
