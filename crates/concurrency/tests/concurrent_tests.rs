//! Concurrent tests for cadence-concurrency
//!
//! These tests run entity sessions on several threads against one shared
//! store and check the revision protocol under real races:
//!
//! 1. **First Flusher Wins** - of two sessions that loaded the same revision,
//!    exactly one flush succeeds
//! 2. **Revision Monotonicity** - successful flushes bump the revision by one
//! 3. **Batch Atomicity** - a conflicting batch leaves no partial writes
//!
//! ## Running These Tests
//!
//! ```bash
//! cargo test --test concurrent_tests
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use cadence_concurrency::{DbEntitySession, EntityStore, Session};
use cadence_core::{EntityRecord, Job};

// ============================================================================
// Test Helpers
// ============================================================================

fn seeded_store(jobs: usize) -> (Arc<EntityStore>, Vec<String>) {
    let store = Arc::new(EntityStore::new());
    let mut ids = Vec::new();
    for i in 0..jobs {
        let job = Job::new(format!("pi-{}", i), "invoice");
        ids.push(job.id.clone());
        store.put(job);
    }
    (store, ids)
}

fn priority_of(store: &EntityStore, id: &str) -> i64 {
    match store.get(id) {
        Some(EntityRecord::Job(job)) => job.priority,
        other => panic!("expected job, got {:?}", other),
    }
}

// ============================================================================
// SECTION 1: First Flusher Wins
// ============================================================================

mod first_flusher_wins {
    use super::*;

    #[test]
    fn test_exactly_one_of_racing_sessions_succeeds() {
        const THREADS: usize = 8;
        let (store, ids) = seeded_store(1);
        let id = ids[0].clone();
        let barrier = Arc::new(Barrier::new(THREADS));
        let successes = Arc::new(AtomicUsize::new(0));
        let conflicts = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                let successes = Arc::clone(&successes);
                let conflicts = Arc::clone(&conflicts);
                let id = id.clone();
                thread::spawn(move || {
                    let mut session = DbEntitySession::new(store);
                    session.job(&id).unwrap().priority = i as i64 + 1;

                    // Everyone has loaded revision 1 before anyone flushes
                    barrier.wait();

                    match session.flush() {
                        Ok(()) => successes.fetch_add(1, Ordering::SeqCst),
                        Err(e) => {
                            assert!(e.is_conflict(), "unexpected error: {}", e);
                            conflicts.fetch_add(1, Ordering::SeqCst)
                        }
                    };
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(conflicts.load(Ordering::SeqCst), THREADS - 1);
        assert_eq!(store.get(&id).unwrap().revision(), 2);
        assert!(priority_of(&store, &id) > 0);
    }
}

// ============================================================================
// SECTION 2: Revision Monotonicity
// ============================================================================

mod revision_monotonicity {
    use super::*;

    #[test]
    fn test_reload_and_retry_until_success() {
        const THREADS: usize = 4;
        const ROUNDS: usize = 25;
        let (store, ids) = seeded_store(1);
        let id = ids[0].clone();
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                let id = id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..ROUNDS {
                        loop {
                            let mut session = DbEntitySession::new(Arc::clone(&store));
                            session.job(&id).unwrap().priority += 1;
                            match session.flush() {
                                Ok(()) => break,
                                Err(e) if e.is_conflict() => continue,
                                Err(e) => panic!("unexpected error: {}", e),
                            }
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let total = (THREADS * ROUNDS) as i64;
        assert_eq!(priority_of(&store, &id), total);
        assert_eq!(store.get(&id).unwrap().revision(), 1 + total as u64);
    }
}

// ============================================================================
// SECTION 3: Batch Atomicity
// ============================================================================

mod batch_atomicity {
    use super::*;

    #[test]
    fn test_conflicting_batch_writes_nothing() {
        let (store, ids) = seeded_store(2);

        let mut stale = DbEntitySession::new(Arc::clone(&store));
        stale.job(&ids[0]).unwrap().priority = 10;
        stale.job(&ids[1]).unwrap().priority = 10;

        let mut winner = DbEntitySession::new(Arc::clone(&store));
        winner.job(&ids[1]).unwrap().priority = 99;
        winner.flush().unwrap();

        assert!(stale.flush().unwrap_err().is_conflict());
        assert_eq!(priority_of(&store, &ids[0]), 0);
        assert_eq!(priority_of(&store, &ids[1]), 99);
        assert_eq!(store.get(&ids[0]).unwrap().revision(), 1);
    }
}
