//! Tier 1: sessions flush exactly once each, in opening order.

use std::sync::Arc;

use cadence::{Caller, Command, CommandContext, CommandExecutor, EngineConfig, EngineError, EngineResult};
use cadence_concurrency::testing::{FlushLog, RecordingSession, RecordingSessionFactory};
use proptest::prelude::*;

use crate::test_utils::Harness;

/// Opens recording sessions by tag, then touches the primary session
struct Touch {
    order: Vec<usize>,
    fail: bool,
}

impl Command for Touch {
    type Output = ();

    fn name(&self) -> &'static str {
        "touch"
    }

    fn execute(&self, context: &mut CommandContext, _executor: &CommandExecutor) -> EngineResult<()> {
        for &tag in &self.order {
            match tag {
                1 => context.session::<RecordingSession<1>>().map(|_| ())?,
                2 => context.session::<RecordingSession<2>>().map(|_| ())?,
                _ => context.session::<RecordingSession<3>>().map(|_| ())?,
            }
        }
        context.db_session()?;
        if self.fail {
            return Err(EngineError::invalid_input("touch failed"));
        }
        Ok(())
    }
}

fn harness(log: &FlushLog) -> Harness {
    let (a, b, c) = (
        Arc::new(RecordingSessionFactory::<1>::new(log)),
        Arc::new(RecordingSessionFactory::<2>::new(log)),
        Arc::new(RecordingSessionFactory::<3>::new(log)),
    );
    Harness::build(EngineConfig::default(), move |builder| {
        builder
            .with_session_factory(a)
            .with_session_factory(b)
            .with_session_factory(c)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_each_session_flushes_once_in_opening_order(
        order in Just(vec![1usize, 2, 3]).prop_shuffle(),
        repeats in proptest::collection::vec(1usize..=3, 0..4),
    ) {
        let log = FlushLog::default();
        let h = harness(&log);

        let mut opened = order.clone();
        opened.extend(repeats);
        h.engine
            .executor()
            .execute(&Touch { order: opened, fail: false }, &Caller::system())
            .unwrap();

        prop_assert_eq!(log.flushes(), order.clone());
        prop_assert_eq!(log.closes(), order);
    }
}

#[test]
fn test_failure_closes_without_flushing() {
    let log = FlushLog::default();
    let h = harness(&log);

    h.engine
        .executor()
        .execute(&Touch { order: vec![3, 1], fail: true }, &Caller::system())
        .unwrap_err();

    assert!(log.flushes().is_empty());
    assert_eq!(log.closes(), vec![3, 1]);
}

#[test]
fn test_unopened_sessions_are_untouched() {
    let log = FlushLog::default();
    let h = harness(&log);

    h.engine
        .executor()
        .execute(&Touch { order: vec![2], fail: false }, &Caller::system())
        .unwrap();

    assert_eq!(log.flushes(), vec![2]);
    assert_eq!(h.store.batches_applied(), 0);
}
