//! Basic usage of the `lease_pool` crate:
//!
//! * Filling a pool with pre-built resources.
//! * Leasing resources and using them.
//! * Handling an exhausted pool.
//! * Leases outliving their pool.

use lease_pool::{Error, ResourcePool};

#[derive(Debug)]
struct Connection {
    name: String,
    statements_run: usize,
}

impl Connection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            statements_run: 0,
        }
    }

    fn run(&mut self, statement: &str) {
        self.statements_run = self.statements_run.saturating_add(1);
        println!("{} runs: {statement}", self.name);
    }
}

fn main() {
    let pool = ResourcePool::builder("connections").capacity(2).build();
    pool.push(Connection::new("conn-1")).unwrap();
    pool.push(Connection::new("conn-2")).unwrap();

    {
        let mut connection = pool.pop().unwrap();
        connection.run("SELECT 1");
        // The lease goes out of scope here and conn-1 goes to the back of the queue.
    }

    // conn-2 is next, then conn-1 again.
    let first = pool.pop().unwrap();
    let second = pool.pop().unwrap();
    println!("Leased {} and {}", first.name, second.name);

    // Both connections are leased out. The pool does not wait, it reports exhaustion.
    match pool.pop() {
        Err(Error::ResourceExhausted { label }) => println!("Pool '{label}' is exhausted"),
        other => println!("Unexpected result: {other:?}"),
    }

    drop(first);
    println!("Available after returning one lease: {}", pool.len());

    // A lease may outlive its pool. The resource is then dropped together with the lease.
    drop(pool);
    println!(
        "{} still usable after the pool is gone: {}",
        second.name,
        !second.is_pool_alive()
    );
    println!("{} ran {} statements", second.name, second.statements_run);
}
