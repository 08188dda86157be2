use thiserror::Error;

/// An error raised by a repository backend, boxed so backends can use their own error types.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when storing or loading records.
///
/// A record that does not exist is not an error for lookups: [`Repository::find_by_id()`][1]
/// returns `Ok(None)` and [`Repository::remove()`][2] returns `Ok(false)`.
///
/// [1]: crate::Repository::find_by_id
/// [2]: crate::Repository::remove
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A field of a record was stored as a different kind than required.
    #[error(transparent)]
    Value(#[from] value_tree::Error),

    /// A resource could not be leased from a pool.
    #[error(transparent)]
    Pool(#[from] lease_pool::Error),

    /// A record lacks a field that the operation needs, such as its key.
    #[error("record has no '{field}' field")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// An update targeted a record that does not exist. No other record was touched.
    #[error("no record with id {id} exists")]
    NotFound {
        /// The textual form of the id that was not found.
        id: String,
    },

    /// A backend returned a row with a different number of columns than the statement selects.
    #[error("backend returned a row with {actual} columns, expected {expected}")]
    MalformedRow {
        /// The number of columns selected.
        expected: usize,

        /// The number of columns returned.
        actual: usize,
    },

    /// The backend failed for a reason of its own.
    #[error("repository backend failed")]
    Backend(#[source] BackendError),
}

impl Error {
    /// Wraps a backend-specific error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use record_crud::Error;
    ///
    /// let error = Error::backend("connection reset");
    /// assert!(matches!(error, Error::Backend(_)));
    /// ```
    pub fn backend(error: impl Into<BackendError>) -> Self {
        Self::Backend(error.into())
    }
}

/// A specialized `Result` type for record operations, returning the crate's [`Error`] type as
/// the error value.
///
/// Public so that repository backends outside this crate can use it in their implementations.
pub type Result<T> = std::result::Result<T, Error>;
