#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in the pool and record packages.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

/// Runs a test with a timeout so that a deadlocked test fails instead of hanging the build.
///
/// The test runs on a separate thread. If it does not finish within 10 seconds (60 seconds
/// under Miri, where thread synchronization is much slower), the calling thread panics.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog is disabled
/// and the test function is executed directly, so mutation testing can detect hangs itself.
///
/// # Panics
///
/// Panics if the test exceeds the timeout or if the test itself panics.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// let value = with_watchdog(|| 2 + 2);
/// assert_eq!(value, 4);
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this fails, the receiver has already timed out.
        drop(tx.send(result));
    });

    let timeout = if cfg!(miri) {
        Duration::from_secs(60)
    } else {
        Duration::from_secs(10)
    };

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            test_handle.join().expect("Test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("Test exceeded {}-second timeout", timeout.as_secs());
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_handle.join() {
            Ok(()) => panic!("Test thread disconnected unexpectedly"),
            Err(e) => std::panic::resume_unwind(e),
        },
    }
}

/// Counters shared by every [`Tracked`] resource created from one [`Tracker`].
#[derive(Debug, Default)]
struct Counters {
    created: AtomicUsize,
    dropped: AtomicUsize,
}

/// Creates [`Tracked`] resources and reports how many of them are still alive.
///
/// Pool tests use this to verify that no resource is duplicated or lost: every resource ever
/// created is either alive (queued or leased) or has been dropped exactly once.
///
/// # Example
///
/// ```rust
/// use testing::Tracker;
///
/// let tracker = Tracker::new();
/// let first = tracker.create();
/// let second = tracker.create();
/// assert_eq!(tracker.alive(), 2);
///
/// drop(first);
/// assert_eq!(tracker.alive(), 1);
/// assert_eq!(second.id(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Tracker {
    counters: Arc<Counters>,
}

impl Tracker {
    /// Creates a tracker with no resources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new resource. Resources are numbered from zero in creation order.
    #[must_use]
    pub fn create(&self) -> Tracked {
        let id = self.counters.created.fetch_add(1, Ordering::Relaxed);

        Tracked {
            id,
            uses: 0,
            counters: Arc::clone(&self.counters),
        }
    }

    /// The number of resources created so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.counters.created.load(Ordering::Relaxed)
    }

    /// The number of resources dropped so far.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    /// The number of resources created but not yet dropped.
    #[must_use]
    pub fn alive(&self) -> usize {
        self.created()
            .checked_sub(self.dropped())
            .expect("a resource cannot be dropped more times than it was created")
    }
}

/// A resource that reports its own drop to the [`Tracker`] that created it.
#[derive(Debug)]
pub struct Tracked {
    id: usize,
    uses: usize,
    counters: Arc<Counters>,
}

impl Tracked {
    /// The creation-order identifier of this resource.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Records one use of the resource.
    pub fn touch(&mut self) {
        self.uses = self
            .uses
            .checked_add(1)
            .expect("test resources are never used usize::MAX times");
    }

    /// How many times [`touch()`][Self::touch] has been called on this resource.
    #[must_use]
    pub fn uses(&self) -> usize {
        self.uses
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
    }
}
