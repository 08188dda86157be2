use lease_pool::Lease;
use value_tree::Value;

use crate::Result;

/// Runs parameterized statements against a storage backend, typically one database connection.
///
/// Parameters are bound positionally in the order given. Implementations report their own
/// failures via [`Error::Backend`][crate::Error::Backend].
///
/// Implemented for [`Lease<E>`] so that a connection leased from a
/// [`ResourcePool`][lease_pool::ResourcePool] can be used directly, returning to the pool when
/// the consumer is dropped.
#[cfg_attr(test, mockall::automock)]
pub trait Executor {
    /// Runs a statement that returns no rows, returning the number of rows affected.
    fn execute(&mut self, statement: &str, parameters: &[Value]) -> Result<u64>;

    /// Runs a statement that returns at most one row, returning its columns in select order.
    fn query_row(&mut self, statement: &str, parameters: &[Value]) -> Result<Option<Vec<Value>>>;

    /// Obtains the next unused id for rows of the given table.
    fn next_id(&mut self, table: &str) -> Result<u64>;
}

impl<E: Executor> Executor for Lease<E> {
    fn execute(&mut self, statement: &str, parameters: &[Value]) -> Result<u64> {
        (**self).execute(statement, parameters)
    }

    fn query_row(&mut self, statement: &str, parameters: &[Value]) -> Result<Option<Vec<Value>>> {
        (**self).query_row(statement, parameters)
    }

    fn next_id(&mut self, table: &str) -> Result<u64> {
        (**self).next_id(table)
    }
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn execute(&mut self, statement: &str, parameters: &[Value]) -> Result<u64> {
        (**self).execute(statement, parameters)
    }

    fn query_row(&mut self, statement: &str, parameters: &[Value]) -> Result<Option<Vec<Value>>> {
        (**self).query_row(statement, parameters)
    }

    fn next_id(&mut self, table: &str) -> Result<u64> {
        (**self).next_id(table)
    }
}
