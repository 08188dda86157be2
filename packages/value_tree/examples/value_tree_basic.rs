//! Basic usage of the `value_tree` crate:
//!
//! * Building a nested record.
//! * Reading values with kind checks.
//! * Navigating to parents and children.
//! * Printing the whole tree.

use value_tree::{Error, ValueTree};

fn main() {
    let mut order = ValueTree::new("order", ());
    let mut root = order.root_mut();
    root.add_child("id", 1001_u64);
    root.add_child("paid", false);

    let mut customer = root.add_child("customer", ());
    customer.add_child("name", "Ada");
    customer.add_child("email", "ada@example.com");

    for (sku, quantity) in [("A-1", 2_u64), ("B-7", 1_u64)] {
        let mut line = root.add_child("line", ());
        line.add_child("sku", sku);
        line.add_child("quantity", quantity);
    }

    println!("{order}");

    let root = order.root();

    match root.child("id").map(|id| id.get::<String>()) {
        Some(Err(Error::TypeMismatch {
            key,
            expected,
            actual,
        })) => println!("'{key}' is {actual}, asking for {expected} fails"),
        other => println!("Unexpected result: {other:?}"),
    }

    let lines = root.children().filter(|child| child.key() == "line").count();
    println!("The order has {lines} lines");

    if let Some(email) = root.child("customer").and_then(|customer| customer.child("email")) {
        let owner = email.parent().map_or("<none>", |parent| parent.key());
        println!("email belongs to '{owner}' at depth {}", email.depth());
    }
}
