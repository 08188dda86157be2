use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use lease_pool::{Lease, ResourcePool};
use tracing::trace;
use value_tree::Value;

use crate::{Executor, Result};

/// An [`Executor`] that leases a connection from a shared [`ResourcePool`] for each statement
/// and returns it to the pool as soon as the statement completes.
///
/// Unlike a [`Lease`], this can be cloned, so a repository built on it can back a
/// [`CrudHandle`][crate::CrudHandle] or [`FindCrudHandle`][crate::FindCrudHandle]. Clones share
/// the pool and therefore the storage behind it, like two connections to the same database.
///
/// A statement issued while every connection is leased elsewhere fails with
/// [`Error::Pool`][crate::Error::Pool]; there is no waiting.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use lease_pool::ResourcePool;
/// use record_crud::{Executor, PooledExecutor, Result};
/// use value_tree::Value;
///
/// struct Connection;
///
/// impl Executor for Connection {
///     fn execute(&mut self, _: &str, _: &[Value]) -> Result<u64> {
///         Ok(1)
///     }
///
///     fn query_row(&mut self, _: &str, _: &[Value]) -> Result<Option<Vec<Value>>> {
///         Ok(None)
///     }
///
///     fn next_id(&mut self, _: &str) -> Result<u64> {
///         Ok(1)
///     }
/// }
///
/// let pool = Arc::new(ResourcePool::new("db"));
/// pool.push(Connection).unwrap();
///
/// let mut executor = PooledExecutor::new(Arc::clone(&pool));
/// assert_eq!(executor.execute("DELETE FROM users WHERE id=$1", &[Value::U64(1)]).unwrap(), 1);
///
/// // The connection went back to the pool when the statement completed.
/// assert_eq!(pool.len(), 1);
/// ```
pub struct PooledExecutor<E> {
    pool: Arc<ResourcePool<E>>,
}

impl<E> PooledExecutor<E> {
    /// Creates an executor that leases its connections from `pool`.
    #[must_use]
    pub fn new(pool: Arc<ResourcePool<E>>) -> Self {
        Self { pool }
    }

    /// The pool that connections are leased from.
    #[must_use]
    pub fn pool(&self) -> &ResourcePool<E> {
        &self.pool
    }

    fn lease(&self) -> Result<Lease<E>> {
        let connection = self.pool.pop()?;

        trace!(pool = %self.pool.label(), "leased connection for one statement");

        Ok(connection)
    }
}

impl<E: Executor> Executor for PooledExecutor<E> {
    fn execute(&mut self, statement: &str, parameters: &[Value]) -> Result<u64> {
        self.lease()?.execute(statement, parameters)
    }

    fn query_row(&mut self, statement: &str, parameters: &[Value]) -> Result<Option<Vec<Value>>> {
        self.lease()?.query_row(statement, parameters)
    }

    fn next_id(&mut self, table: &str) -> Result<u64> {
        self.lease()?.next_id(table)
    }
}

impl<E> Clone for PooledExecutor<E> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
        }
    }
}

impl<E> fmt::Debug for PooledExecutor<E> {
    #[cfg_attr(test, mutants::skip)] // Debug output is not part of the contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("pool", &self.pool)
            .finish()
    }
}
