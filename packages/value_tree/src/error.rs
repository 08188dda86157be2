use thiserror::Error;

use crate::Kind;

/// Errors that can occur when reading values from a [`ValueTree`][crate::ValueTree].
///
/// A missing child is not an error; lookups return `None` instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A value was read as a type other than the kind it is stored as.
    #[error("value of '{key}' is stored as {actual}, not {expected}")]
    TypeMismatch {
        /// The key of the node that was read.
        key: String,

        /// The kind the caller asked for.
        expected: Kind,

        /// The kind actually stored in the node.
        actual: Kind,
    },
}

/// A specialized `Result` type for value tree operations, returning the crate's
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
    fn type_mismatch_message() {
        let error = Error::TypeMismatch {
            key: "id".to_string(),
            expected: Kind::Text,
            actual: Kind::U64,
        };

        assert_eq!(error.to_string(), "value of 'id' is stored as u64, not text");
    }
}
