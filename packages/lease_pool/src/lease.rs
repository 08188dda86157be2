use std::any::type_name;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Weak;

use tracing::trace;

use crate::pool::PoolCore;

const ERR_RESOURCE_TAKEN: &str =
    "a lease owns its resource until it is dropped or detached, both of which consume the lease";

/// Exclusive, temporary ownership of one resource taken from a [`ResourcePool`][crate::ResourcePool].
///
/// The resource is accessed through [`Deref`] and [`DerefMut`]. When the lease is dropped, the
/// resource is moved back to the end of the pool's queue, exactly once, whether the scope that
/// holds the lease is left normally, through an early return or through unwinding.
///
/// The lease only holds a weak reference to its pool. If the pool has already been dropped when
/// the lease is dropped, the resource is dropped instead of being returned.
///
/// Leases can be moved between owners but not cloned, matching the single owner of the
/// underlying resource.
///
/// # Thread safety
///
/// A lease is [`Send`] if `T` is [`Send`], so a resource can be leased on one thread and returned
/// from another. It is [`Sync`] if `T` is also [`Sync`].
///
/// # Example
///
/// ```rust
/// use lease_pool::ResourcePool;
///
/// let pool = ResourcePool::new("buffers");
/// pool.push(Vec::<u8>::new()).unwrap();
///
/// let mut buffer = pool.pop().unwrap();
/// buffer.extend_from_slice(b"hello");
/// assert_eq!(buffer.len(), 5);
///
/// drop(buffer);
///
/// // The modified buffer is back in the pool.
/// assert_eq!(*pool.pop().unwrap(), b"hello");
/// ```
pub struct Lease<T> {
    /// Always `Some` while the lease is observable; only taken by `detach()` and `drop()`.
    resource: Option<T>,

    pool: Weak<PoolCore<T>>,
}

impl<T> Lease<T> {
    pub(crate) fn new(resource: T, pool: Weak<PoolCore<T>>) -> Self {
        Self {
            resource: Some(resource),
            pool,
        }
    }

    /// Whether the pool this lease came from still exists.
    ///
    /// If it does not, the resource will be dropped when the lease is dropped. The answer may
    /// change from `true` to `false` at any time if another thread drops the pool.
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
    /// assert!(lease.is_pool_alive());
    ///
    /// drop(pool);
    /// assert!(!lease.is_pool_alive());
    /// ```
    #[must_use]
    pub fn is_pool_alive(&self) -> bool {
        self.pool.strong_count() > 0
    }

    /// Takes the resource out of the lease for good.
    ///
    /// The resource will not be returned to the pool. Use this when a resource turns out to be
    /// broken and must not be handed out again, or when ownership has to leave the pool
    /// permanently.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::ResourcePool;
    ///
    /// let pool = ResourcePool::new("numbers");
    /// pool.push(7_u32).unwrap();
    ///
    /// let value = pool.pop().unwrap().detach();
    ///
    /// assert_eq!(value, 7);
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn detach(mut self) -> T {
        let resource = self.resource.take().expect(ERR_RESOURCE_TAKEN);

        if let Some(pool) = self.pool.upgrade() {
            trace!(label = %pool.label(), "resource detached from pool");
        }

        resource
    }
}

impl<T> Deref for Lease<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.resource.as_ref().expect(ERR_RESOURCE_TAKEN)
    }
}

impl<T> DerefMut for Lease<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resource.as_mut().expect(ERR_RESOURCE_TAKEN)
    }
}

impl<T> AsRef<T> for Lease<T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T> AsMut<T> for Lease<T> {
    fn as_mut(&mut self) -> &mut T {
        self
    }
}

impl<T> Drop for Lease<T> {
    fn drop(&mut self) {
        // Already handed out through `detach()`.
        let Some(resource) = self.resource.take() else {
            return;
        };

        match self.pool.upgrade() {
            Some(pool) => pool.return_resource(resource),
            None => trace!("pool no longer exists, dropping leased resource"),
        }
    }
}

impl<T> fmt::Debug for Lease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("pool_alive", &self.is_pool_alive())
            .finish_non_exhaustive()
    }
}
