//! Integration tests for using one resource pool from many threads.
//!
//! These tests verify that resources are never duplicated or lost while threads compete for
//! them, and that leases may outlive their pool. They are ignored under Miri because they spawn
//! many threads and run many iterations.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use lease_pool::{Error, ResourcePool};
use testing::{Tracker, with_watchdog};

const THREADS: usize = 8;
const ITERATIONS: usize = 1_000;

#[cfg_attr(miri, ignore)]
#[test]
fn every_lease_returns_exactly_once() {
    with_watchdog(|| {
        let tracker = Tracker::new();
        let pool = ResourcePool::new("shared");

        for _ in 0..THREADS {
            pool.push(tracker.create()).unwrap();
        }

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    for _ in 0..ITERATIONS {
                        // Other threads may hold every resource right now; that is not an error
                        // this test cares about, the pool just has to stay consistent.
                        if let Ok(mut lease) = pool.pop() {
                            lease.touch();
                        }
                    }
                });
            }
        });

        assert_eq!(pool.len(), THREADS);
        assert_eq!(tracker.alive(), THREADS);
        assert_eq!(tracker.dropped(), 0);

        let mut ids = HashSet::new();
        let mut leases = Vec::new();
        while let Ok(lease) = pool.pop() {
            assert!(ids.insert(lease.id()), "resource {} leased twice", lease.id());
            leases.push(lease);
        }

        assert_eq!(ids.len(), THREADS);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn more_threads_than_resources_see_exhaustion() {
    with_watchdog(|| {
        let pool = ResourcePool::new("scarce");
        pool.push(0_u32).unwrap();
        pool.push(1_u32).unwrap();

        let barrier = Barrier::new(THREADS);

        let outcomes = thread::scope(|s| {
            let handles = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        let lease = pool.pop();
                        // Hold any lease until every thread has tried, so at most two succeed.
                        barrier.wait();
                        lease.map(|lease| *lease)
                    })
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });

        let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let exhausted = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Err(Error::ResourceExhausted { .. })))
            .count();

        assert_eq!(successes, 2);
        assert_eq!(exhausted, THREADS - 2);
        assert_eq!(pool.len(), 2);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn leases_moved_to_other_threads_come_back() {
    with_watchdog(|| {
        let tracker = Tracker::new();
        let pool = ResourcePool::new("movers");
        pool.push(tracker.create()).unwrap();
        pool.push(tracker.create()).unwrap();

        let first = pool.pop().unwrap();
        let second = pool.pop().unwrap();
        assert!(pool.is_empty());

        thread::spawn(move || drop(first)).join().unwrap();
        thread::spawn(move || drop(second)).join().unwrap();

        assert_eq!(pool.len(), 2);
        assert_eq!(tracker.alive(), 2);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn pool_dropped_while_other_threads_hold_leases() {
    with_watchdog(|| {
        let tracker = Tracker::new();
        let pool = Arc::new(ResourcePool::new("short-lived"));

        for _ in 0..THREADS {
            pool.push(tracker.create()).unwrap();
        }

        let leased = Barrier::new(THREADS + 1);
        let pool_dropped = Barrier::new(THREADS + 1);

        thread::scope(|s| {
            for _ in 0..THREADS {
                let pool = Arc::clone(&pool);
                let leased = &leased;
                let pool_dropped = &pool_dropped;

                s.spawn(move || {
                    let mut lease = pool.pop().unwrap();
                    drop(pool);
                    leased.wait();

                    pool_dropped.wait();
                    assert!(!lease.is_pool_alive());
                    lease.touch();
                });
            }

            leased.wait();
            let pool = Arc::into_inner(pool)
                .expect("every worker released its pool handle before reaching the barrier");
            drop(pool);
            pool_dropped.wait();
        });

        assert_eq!(tracker.alive(), 0);
    });
}
