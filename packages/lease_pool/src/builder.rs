use std::any::type_name;
use std::fmt;

use crate::ResourcePool;
use crate::pool::ValidityCheck;

/// Builder for creating an instance of [`ResourcePool`].
///
/// You only need to use this builder if you want to customize the pool configuration.
/// The default configuration used by [`ResourcePool::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use lease_pool::ResourcePool;
///
/// let pool = ResourcePool::<String>::builder("names")
///     .capacity(8)
///     .validate_with(|name| !name.is_empty())
///     .build();
///
/// assert_eq!(pool.label(), "names");
/// ```
///
/// [1]: ResourcePool::new
#[must_use]
pub struct ResourcePoolBuilder<T> {
    label: String,
    capacity: usize,
    validity_check: Option<ValidityCheck<T>>,
}

impl<T> fmt::Debug for ResourcePoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("label", &self.label)
            .field("capacity", &self.capacity)
            .field("has_validity_check", &self.validity_check.is_some())
            .finish()
    }
}

impl<T> ResourcePoolBuilder<T> {
    pub(crate) fn new(label: String) -> Self {
        Self {
            label,
            capacity: 0,
            validity_check: None,
        }
    }

    /// Reserves room in the pool for this many resources up front.
    ///
    /// The pool grows beyond this as needed; this only avoids reallocation while the pool is
    /// being filled.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets a check that every resource must pass to enter the pool.
    ///
    /// The check runs when a resource is pushed, rejecting it with
    /// [`Error::InvalidResource`][crate::Error::InvalidResource], and again when a lease is
    /// dropped, in which case a failing resource is discarded instead of being returned to the
    /// queue. The check runs outside the pool's lock.
    ///
    /// # Examples
    ///
    /// ```
    /// use lease_pool::ResourcePool;
    ///
    /// let pool = ResourcePool::<u32>::builder("odd")
    ///     .validate_with(|value| value % 2 == 1)
    ///     .build();
    ///
    /// assert!(pool.push(3).is_ok());
    /// assert!(pool.push(4).is_err());
    /// ```
    pub fn validate_with<F>(mut self, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validity_check = Some(Box::new(check));
        self
    }

    /// Builds the pool with the specified configuration. The pool starts empty.
    #[must_use]
    pub fn build(self) -> ResourcePool<T> {
        ResourcePool::new_inner(self.label, self.capacity, self.validity_check)
    }
}
