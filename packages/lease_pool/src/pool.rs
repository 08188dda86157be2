use std::any::type_name;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{Error, Lease, ResourcePoolBuilder, Result};

/// Decides whether a resource may enter (or re-enter) a pool.
pub(crate) type ValidityCheck<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// The state shared between a [`ResourcePool`] and the leases it has handed out.
///
/// Only the pool holds a strong reference. Leases hold a weak reference, so dropping the pool
/// drops this core (and every resource still queued in it) even while leases are outstanding.
pub(crate) struct PoolCore<T> {
    label: String,

    /// Resources that are not currently leased, in the order they will be handed out.
    ///
    /// The lock is only ever held while a resource is moved into or out of the queue.
    resources: Mutex<VecDeque<T>>,

    validity_check: Option<ValidityCheck<T>>,
}

impl<T> PoolCore<T> {
    fn is_valid(&self, resource: &T) -> bool {
        self.validity_check
            .as_ref()
            .is_none_or(|check| check(resource))
    }

    /// Takes back a resource from a lease that is being dropped.
    ///
    /// Resources that no longer pass the validity check are discarded instead of re-queued.
    pub(crate) fn return_resource(&self, resource: T) {
        if !self.is_valid(&resource) {
            warn!(
                label = %self.label,
                "discarding returned resource that no longer passes the validity check"
            );
            return;
        }

        let available = {
            let mut resources = self.resources.lock();
            resources.push_back(resource);
            resources.len()
        };

        trace!(label = %self.label, available, "resource returned to pool");
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }
}

/// A thread-safe first-in-first-out store of pre-built resources, such as connections.
///
/// Resources are created elsewhere and moved into the pool with [`push()`][1]. Each call to
/// [`pop()`][2] moves the oldest available resource out of the pool and into a [`Lease`], which
/// gives exclusive access to the resource and moves it back to the end of the queue when the
/// lease is dropped, on every exit path including early returns and unwinding.
///
/// # Exhaustion
///
/// The pool never blocks. If no resource is available, [`pop()`][2] fails with
/// [`Error::ResourceExhausted`] instead of waiting. Callers that need backpressure must layer
/// their own retry policy on top.
///
/// # Dropping the pool
///
/// The pool may be dropped while leases are still outstanding. Resources still in the queue are
/// dropped with the pool and resources held by outstanding leases are dropped together with
/// their lease.
///
/// # Thread safety
///
/// The pool is [`Send`] and [`Sync`] if `T` is [`Send`]. Share it between threads via a
/// reference or an `Arc`. A single lock guards the queue and is held only while a resource is
/// moved into or out of it, never while a leased resource is being used.
///
/// # Example
///
/// ```rust
/// use lease_pool::ResourcePool;
///
/// let pool = ResourcePool::new("words");
/// pool.push("alpha".to_string()).unwrap();
/// pool.push("beta".to_string()).unwrap();
///
/// {
///     let mut word = pool.pop().unwrap();
///     assert_eq!(*word, "alpha");
///     word.push('!');
/// } // The lease returns "alpha!" to the back of the queue here.
///
/// assert_eq!(*pool.pop().unwrap(), "beta");
/// assert_eq!(*pool.pop().unwrap(), "alpha!");
/// ```
///
/// [1]: Self::push
/// [2]: Self::pop
pub struct ResourcePool<T> {
    core: Arc<PoolCore<T>>,
}

impl<T> ResourcePool<T> {
    pub(crate) fn new_inner(
        label: String,
        capacity: usize,
        validity_check: Option<ValidityCheck<T>>,
    ) -> Self {
        debug!(label = %label, capacity, "creating resource pool");

        Self {
            core: Arc::new(PoolCore {
                label,
                resources: Mutex::new(VecDeque::with_capacity(capacity)),
                validity_check,
            }),
        }
    }

    /// Creates an empty pool with the default configuration.
    ///
    /// The label is only used for diagnostics: it appears in errors and log events.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::ResourcePool;
    ///
    /// let pool = ResourcePool::<u32>::new("numbers");
    ///
    /// assert_eq!(pool.label(), "numbers");
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self::builder(label).build()
    }

    /// Starts building a new [`ResourcePool`].
    ///
    /// Use this when you want to customize the pool configuration beyond the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::ResourcePool;
    ///
    /// let pool = ResourcePool::<Vec<u8>>::builder("buffers")
    ///     .capacity(16)
    ///     .validate_with(|buffer| buffer.capacity() >= 1024)
    ///     .build();
    ///
    /// assert!(pool.push(Vec::with_capacity(4096)).is_ok());
    /// assert!(pool.push(Vec::new()).is_err());
    /// ```
    pub fn builder(label: impl Into<String>) -> ResourcePoolBuilder<T> {
        ResourcePoolBuilder::new(label.into())
    }

    /// Moves a resource into the pool, behind every resource already in it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResource`] if the pool was built with a validity check and the
    /// resource fails it. The rejected resource is dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::ResourcePool;
    ///
    /// let pool = ResourcePool::new("numbers");
    /// pool.push(1_u32).unwrap();
    /// pool.push(2_u32).unwrap();
    ///
    /// assert_eq!(pool.len(), 2);
    /// ```
    pub fn push(&self, resource: T) -> Result<()> {
        if !self.core.is_valid(&resource) {
            return Err(Error::InvalidResource {
                label: self.core.label.clone(),
            });
        }

        let available = {
            let mut resources = self.core.resources.lock();
            resources.push_back(resource);
            resources.len()
        };

        trace!(label = %self.core.label, available, "resource pushed into pool");

        Ok(())
    }

    /// Moves the oldest available resource out of the pool and into a [`Lease`].
    ///
    /// The lease moves the resource back into the pool when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceExhausted`] if the pool holds no resources at the moment of the
    /// call. This never waits for an outstanding lease to be returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::{Error, ResourcePool};
    ///
    /// let pool = ResourcePool::new("numbers");
    /// pool.push(42_u32).unwrap();
    ///
    /// let lease = pool.pop().unwrap();
    /// assert_eq!(*lease, 42);
    ///
    /// // The only resource is leased out, so the pool is exhausted until the lease is dropped.
    /// assert!(matches!(pool.pop(), Err(Error::ResourceExhausted { .. })));
    ///
    /// drop(lease);
    /// assert!(pool.pop().is_ok());
    /// ```
    pub fn pop(&self) -> Result<Lease<T>> {
        // The guard is a temporary of this statement, so the lock is released before we continue.
        let resource = self.core.resources.lock().pop_front();

        let Some(resource) = resource else {
            debug!(label = %self.core.label, "lease requested from exhausted pool");

            return Err(Error::ResourceExhausted {
                label: self.core.label.clone(),
            });
        };

        trace!(label = %self.core.label, "resource leased from pool");

        Ok(Lease::new(resource, Arc::downgrade(&self.core)))
    }

    /// The number of resources currently available for leasing.
    ///
    /// This is a snapshot. Under concurrent use, the value may be stale as soon as it is returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::ResourcePool;
    ///
    /// let pool = ResourcePool::new("numbers");
    /// pool.push(1_u32).unwrap();
    ///
    /// let lease = pool.pop().unwrap();
    /// assert_eq!(pool.len(), 0);
    ///
    /// drop(lease);
    /// assert_eq!(pool.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.resources.lock().len()
    }

    /// Whether the pool currently has no resources available for leasing.
    ///
    /// This is a snapshot. Under concurrent use, the value may be stale as soon as it is returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.core.resources.lock().is_empty()
    }

    /// The diagnostic label given to the pool when it was created.
    #[must_use]
    pub fn label(&self) -> &str {
        self.core.label()
    }
}

impl<T> fmt::Debug for ResourcePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("label", &self.core.label)
            .field("available", &self.len())
            .field("has_validity_check", &self.core.validity_check.is_some())
            .finish()
    }
}

impl<T> Drop for ResourcePool<T> {
    fn drop(&mut self) {
        debug!(
            label = %self.core.label,
            dropped = self.len(),
            outstanding_leases = Arc::weak_count(&self.core),
            "dropping resource pool"
        );
    }
}
