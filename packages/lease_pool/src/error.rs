use thiserror::Error;

/// Errors that can occur when moving resources into or out of a [`ResourcePool`][crate::ResourcePool].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A lease was requested from a pool that had no resources in it at the time.
    ///
    /// The pool never waits for a resource to be returned. Callers that need to wait must
    /// implement their own retry policy.
    #[error("resource pool '{label}' has no resources available")]
    ResourceExhausted {
        /// The diagnostic label of the pool that was empty.
        label: String,
    },

    /// A resource was pushed into a pool but the pool's validity check rejected it.
    ///
    /// The rejected resource is dropped.
    #[error("resource pool '{label}' rejected a resource that failed its validity check")]
    InvalidResource {
        /// The diagnostic label of the pool that rejected the resource.
        label: String,
    },
}

/// A specialized `Result` type for resource pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn messages_name_the_pool() {
        let exhausted = Error::ResourceExhausted {
            label: "db".to_string(),
        };
        let invalid = Error::InvalidResource {
            label: "cache".to_string(),
        };

        assert!(exhausted.to_string().contains("'db'"));
        assert!(invalid.to_string().contains("'cache'"));
    }
}
