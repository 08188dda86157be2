#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! This package provides [`ValueTree`], a schema-less record made of keyed nodes that each hold
//! one dynamically typed [`Value`].
//!
//! It is used as a universal in-memory carrier for database records or partial records whose
//! shape is not known at compile time.
//!
//! # Features
//!
//! - **Tagged values**: null, `i64`, `u64`, `f32`, `f64`, `bool` and text, with the active
//!   [`Kind`] available at runtime.
//! - **Checked reads**: [`Node::get()`] never reinterprets a value; reading the wrong kind
//!   fails with [`Error::TypeMismatch`].
//! - **Ordered children**: lookups and traversal follow insertion order.
//! - **Safe parent links**: nodes live in an arena owned by the tree and refer to each other by
//!   index, so following a parent link can never reach a freed node.
//! - **Diagnostics**: [`ValueTree`] implements [`Display`][std::fmt::Display] as an indented
//!   pre-order dump of every node.
//!
//! # Example
//!
//! ```rust
//! use value_tree::{Kind, ValueTree};
//!
//! let mut record = ValueTree::new("user", ());
//! let mut root = record.root_mut();
//! root.add_child("id", 42_u64);
//! root.add_child("email", "a@b.org");
//! root.add_child("score", 0.75_f64);
//!
//! let root = record.root();
//! let id: u64 = root.child("id").unwrap().get().unwrap();
//! assert_eq!(id, 42);
//! assert_eq!(root.child("score").unwrap().kind(), Kind::F64);
//! assert!(root.child("phone").is_none());
//!
//! println!("{record}");
//! ```

mod error;
mod tree;
mod value;

pub use error::*;
pub use tree::*;
pub use value::*;
