//! Tier 5: every missing grant is reported in one denial.

use std::sync::Arc;

use cadence::{
    Caller, EngineConfig, EngineError, Grant, GrantTable, Job, Permission, Resource, ResourceId,
    Variables,
};

use crate::test_utils::Harness;

fn secured(grants: &Arc<GrantTable>) -> Harness {
    let grants = Arc::clone(grants);
    Harness::build(EngineConfig::default().with_authorization(true), move |b| {
        b.with_authorization(grants)
    })
}

#[test]
fn test_both_create_grants_reported() {
    let grants = Arc::new(GrantTable::new());
    let h = secured(&grants);

    let err = h
        .engine
        .as_user(Caller::user("gonzo"))
        .create_case_instance("loan", None, Variables::new())
        .unwrap_err();

    match err {
        EngineError::AuthorizationDenied { user_id, missing } => {
            assert_eq!(user_id, "gonzo");
            assert_eq!(
                missing,
                vec![
                    Grant::new(Resource::CaseInstance, ResourceId::Any, Permission::Create),
                    Grant::new(
                        Resource::CaseDefinition,
                        ResourceId::specific("loan"),
                        Permission::CreateInstance
                    ),
                ]
            );
        }
        other => panic!("expected AuthorizationDenied, got {:?}", other),
    }
    assert!(h.store.is_empty());
}

#[test]
fn test_denial_message_lists_all_grants() {
    let grants = Arc::new(GrantTable::new());
    let h = secured(&grants);
    let job = Job::new("pi-7", "invoice");
    h.store.put(job.clone());

    let err = h
        .engine
        .as_user(Caller::user("gonzo"))
        .set_job_priority(&job.id, 9)
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("2 grant(s)"), "{}", message);
    assert!(message.contains("PROCESS_INSTANCE 'pi-7'"), "{}", message);
    assert!(message.contains("PROCESS_DEFINITION 'invoice'"), "{}", message);
}

#[test]
fn test_wildcard_grant_satisfies_specific_check() {
    let grants = Arc::new(GrantTable::new());
    let h = secured(&grants);
    let job = Job::new("pi-7", "invoice");
    h.store.put(job.clone());

    grants.grant_user(
        "kermit",
        Grant::new(Resource::ProcessInstance, ResourceId::specific("*"), Permission::Update),
    );
    h.engine
        .as_user(Caller::user("kermit"))
        .set_job_priority(&job.id, 9)
        .unwrap();
    assert_eq!(h.engine.job(&job.id).unwrap().priority, 9);
}
