//! Tier 8: ENABLED at revision 3, completed with no variable changes.

use cadence::{LifecycleState, VariableMutations};

use crate::test_utils::Harness;

#[test]
fn test_enabled_rev3_completes_to_rev4() {
    let h = Harness::new();
    let x = h.seed(LifecycleState::Enabled, 3);

    let reached = h.engine.complete(&x.id, VariableMutations::new()).unwrap();
    assert_eq!(reached, LifecycleState::Completed);

    let read = h.engine.case_execution(&x.id).unwrap();
    assert_eq!(read.state, LifecycleState::Completed);
    assert_eq!(read.revision, 4);
    assert_eq!(read.variables, x.variables);
}
