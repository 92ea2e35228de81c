//! Tier 6: bundle order is local delete, local set, global delete, global set.

use cadence::{CaseExecution, LifecycleState, TransitionKind, VariableMutations};
use proptest::prelude::*;
use serde_json::json;

use crate::test_utils::Harness;

/// Case instance and one ACTIVE child with the given prior bindings of `a`
fn seed_scopes(h: &Harness, global: Option<i64>, local: Option<i64>) -> (CaseExecution, CaseExecution) {
    let mut root = CaseExecution::new_case_instance("loan", "plan");
    if let Some(v) = global {
        root.variables.insert("a".into(), json!(v));
    }
    h.store.put(root.clone());

    let mut child = CaseExecution::new_child(&root, "review", LifecycleState::Active);
    if let Some(v) = local {
        child.variables.insert("a".into(), json!(v));
    }
    h.store.put(child.clone());
    (root, child)
}

fn bundle(local: i64, global: i64) -> VariableMutations {
    VariableMutations::new()
        .remove_local("a")
        .set_local("a", local)
        .remove("a")
        .set("a", global)
}

#[test]
fn test_documented_scenario_resolves_to_two() {
    let h = Harness::new();
    let (root, child) = seed_scopes(&h, Some(0), Some(0));

    h.engine
        .transition(TransitionKind::Suspend, &child.id, bundle(1, 2))
        .unwrap();

    assert_eq!(h.engine.variable(&child.id, "a").unwrap(), Some(json!(2)));
    assert_eq!(h.execution(&root.id).variables.get("a"), Some(&json!(2)));
    assert!(h.execution(&child.id).variables.get("a").is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_global_set_lands_on_case_instance(
        prior_global in proptest::option::of(-5i64..5),
        prior_local in proptest::option::of(-5i64..5),
        local in -100i64..100,
        global in -100i64..100,
    ) {
        let h = Harness::new();
        let (root, child) = seed_scopes(&h, prior_global, prior_local);

        h.engine
            .transition(TransitionKind::Suspend, &child.id, bundle(local, global))
            .unwrap();

        prop_assert_eq!(h.engine.variable(&child.id, "a").unwrap(), Some(json!(global)));
        let root_after = h.execution(&root.id);
        let child_after = h.execution(&child.id);
        let expected = json!(global);
        prop_assert_eq!(root_after.variables.get("a"), Some(&expected));
        prop_assert!(child_after.variables.get("a").is_none());
    }
}
