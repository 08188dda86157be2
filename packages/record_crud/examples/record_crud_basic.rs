//! Basic usage of the `record_crud` crate:
//!
//! * Leasing a connection from a pool and storing records through it.
//! * Driving records of different types through type-erased handles.
//! * Cloning a handle to get an independent copy.

use std::collections::BTreeMap;

use lease_pool::ResourcePool;
use nonempty::nonempty;
use record_crud::{
    CrudHandle, Dialect, Error, Executor, FindCrudHandle, KeyedModel, MemoryRepository,
    Repository, Result, StatementRepository,
};
use value_tree::{Value, ValueTree};

/// Prints every statement and keeps rows in memory, keyed by the first parameter.
#[derive(Debug, Default)]
struct PrintingConnection {
    rows: BTreeMap<String, Vec<Value>>,
    sequence: u64,
}

impl Executor for PrintingConnection {
    fn execute(&mut self, statement: &str, parameters: &[Value]) -> Result<u64> {
        println!("  {statement} {parameters:?}");

        let key = parameters
            .first()
            .ok_or_else(|| Error::backend("statement has no parameters"))?
            .to_string();

        let affected = if statement.starts_with("DELETE") {
            self.rows.remove(&key).is_some()
        } else if statement.starts_with("UPDATE") {
            // Anonymous placeholders bind the key again at the end, which is not a column.
            match self.rows.get_mut(&key) {
                Some(row) => {
                    *row = parameters.iter().take(row.len()).cloned().collect();
                    true
                }
                None => false,
            }
        } else {
            self.rows.insert(key, parameters.to_vec());
            true
        };

        Ok(u64::from(affected))
    }

    fn query_row(&mut self, statement: &str, parameters: &[Value]) -> Result<Option<Vec<Value>>> {
        println!("  {statement} {parameters:?}");

        Ok(parameters
            .first()
            .and_then(|key| self.rows.get(&key.to_string()).cloned()))
    }

    fn next_id(&mut self, _table: &str) -> Result<u64> {
        self.sequence = self.sequence.saturating_add(1);
        Ok(self.sequence)
    }
}

fn record(key: &str, field: &str, value: impl Into<Value>) -> ValueTree {
    let mut record = ValueTree::new(key, ());
    record.root_mut().add_child(field, value);
    record
}

fn main() -> Result<()> {
    let pool = ResourcePool::new("database");
    pool.push(PrintingConnection::default())?;

    println!("Statements issued through a leased connection:");

    {
        let mut users = StatementRepository::new(
            pool.pop()?,
            "users",
            nonempty!["id".to_string(), "email".to_string()],
            Dialect::Anonymous,
        );

        let id = users.insert(record("user", "email", "ada@example.com"))?;
        users.update(id, record("user", "email", "ada@example.org"))?;

        if let Some(user) = users.find_by_id(id)? {
            print!("Loaded:\n{user}");
        }

        println!("Removed: {}", users.remove(id)?);
    }

    println!("Connections back in the pool: {}", pool.len());

    let mut handles = vec![
        CrudHandle::new(
            record("user", "email", "grace@example.com"),
            KeyedModel::new(MemoryRepository::new("id"), "id"),
        ),
        CrudHandle::new(
            record("invoice", "total", 99.5_f64),
            KeyedModel::new(MemoryRepository::new("invoice_id"), "invoice_id"),
        ),
    ];

    for handle in &mut handles {
        handle.insert()?;
        handle.update()?;
        println!("Stored through {handle:?}");
    }

    let mut original = FindCrudHandle::new(
        record("user", "email", "linus@example.com"),
        KeyedModel::new(MemoryRepository::new("id"), "id"),
    );
    original.insert()?;

    let mut copy = original.clone();
    original.remove()?;

    println!(
        "After removing through the original, the copy still finds: {}",
        copy.find_by_id()?.is_some()
    );

    Ok(())
}
