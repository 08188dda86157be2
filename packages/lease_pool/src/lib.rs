#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! This package provides [`ResourcePool`], a thread-safe first-in-first-out store of pre-built
//! resources, and [`Lease`], the scoped handle through which a pooled resource is used.
//!
//! Typical resources are connections or buffers that are expensive to create and cheap to reuse.
//! They are created elsewhere, pushed into the pool and then leased out one at a time. Each
//! lease gives exclusive access to its resource and returns it to the back of the queue when
//! dropped.
//!
//! # Features
//!
//! - **Thread-safe**: many threads may push and pop concurrently; the lock is held only while a
//!   resource moves into or out of the queue.
//! - **Never blocks**: an empty pool fails fast with [`Error::ResourceExhausted`].
//! - **Exactly-once return**: a lease returns its resource once, on every exit path.
//! - **Pool may go first**: leases hold a weak reference, so dropping the pool while leases are
//!   outstanding is safe; those resources are dropped with their lease.
//! - **Optional validity check**: resources that fail a configured check are rejected on push
//!   and discarded on return.
//!
//! # Example
//!
//! ```rust
//! use std::thread;
//!
//! use lease_pool::ResourcePool;
//!
//! let pool = ResourcePool::new("workers");
//! for id in 0..4_u32 {
//!     pool.push(id).unwrap();
//! }
//!
//! thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| {
//!             let lease = pool.pop().unwrap();
//!             println!("using resource {}", *lease);
//!         });
//!     }
//! });
//!
//! assert_eq!(pool.len(), 4);
//! ```

mod builder;
mod error;
mod lease;
mod pool;

pub use builder::*;
pub use error::*;
pub use lease::*;
pub use pool::ResourcePool;
