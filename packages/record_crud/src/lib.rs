#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Persistence of [`ValueTree`][value_tree::ValueTree] records through a uniform create, read,
//! update and delete contract.
//!
//! The layers, from the storage backend upwards:
//!
//! * [`Executor`] runs parameterized statements against a backend, typically one database
//!   connection. A [`Lease`][lease_pool::Lease] of an executor taken from a
//!   [`ResourcePool`][lease_pool::ResourcePool] is itself an executor, so connections return to
//!   their pool as soon as the consumer is dropped. [`PooledExecutor`] instead leases a
//!   connection for each statement, which keeps it cloneable so that it can back a handle.
//! * [`insert_statement()`], [`update_statement()`], [`select_statement()`] and
//!   [`delete_statement()`] build the statements for a table in a chosen [`Dialect`].
//! * [`Repository`] is the storage contract. [`StatementRepository`] implements it over an
//!   executor and [`MemoryRepository`] implements it in process memory.
//! * [`CrudModel`] and [`FindModel`] operate on whole records. [`KeyedModel`] adapts any
//!   repository into a model by reading record ids from a key field.
//! * [`CrudHandle`] and [`FindCrudHandle`] bind a record to its model behind a type-erased
//!   interface, so records of different types can be driven uniformly.
//!
//! # Example
//!
//! ```rust
//! use record_crud::{FindCrudHandle, KeyedModel, MemoryRepository};
//! use value_tree::ValueTree;
//!
//! let mut user = ValueTree::new("user", ());
//! user.root_mut().add_child("email", "a@b.org");
//!
//! let mut handle = FindCrudHandle::new(user, KeyedModel::new(MemoryRepository::new("id"), "id"));
//! handle.insert().unwrap();
//!
//! // A clone is an independent copy, including its own repository.
//! let mut snapshot = handle.clone();
//!
//! handle.remove().unwrap();
//! assert!(handle.find_by_id().unwrap().is_none());
//! assert!(snapshot.find_by_id().unwrap().is_some());
//! ```

mod error;
mod executor;
mod handle;
mod memory;
mod model;
mod pooled;
mod repository;
mod statement;
mod statement_repository;

pub use error::*;
pub use executor::*;
pub use handle::*;
pub use memory::*;
pub use model::*;
pub use pooled::*;
pub use repository::*;
pub use statement::*;
pub use statement_repository::*;
