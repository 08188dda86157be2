use nonempty::NonEmpty;
use tracing::debug;
use value_tree::{Value, ValueTree};

use crate::{
    Dialect, Error, Executor, Repository, Result, delete_statement, insert_statement,
    select_statement, update_statement,
};

/// A [`Repository`] that stores each record as one row of a table, issuing parameterized
/// statements through an [`Executor`].
///
/// The first of `fields` is the primary key. When a record is written, every field is bound in
/// order from the record's child with the same key; fields the record lacks are bound as null.
/// Loaded records have the table name as their root key and one child per field.
///
/// Ids come from [`Executor::next_id()`].
///
/// # Example
///
/// ```rust
/// use nonempty::nonempty;
/// use record_crud::{Dialect, Executor, Repository, Result, StatementRepository};
/// use value_tree::{Value, ValueTree};
///
/// struct Printer;
///
/// impl Executor for Printer {
///     fn execute(&mut self, statement: &str, parameters: &[Value]) -> Result<u64> {
///         println!("{statement} {parameters:?}");
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
/// let mut users = StatementRepository::new(
///     Printer,
///     "users",
///     nonempty!["id".to_string(), "email".to_string()],
///     Dialect::Numbered,
/// );
///
/// let mut user = ValueTree::new("user", ());
/// user.root_mut().add_child("email", "a@b.org");
///
/// // Prints: INSERT INTO users (id, email) VALUES ($1, $2) [U64(1), Text("a@b.org")]
/// assert_eq!(users.insert(user).unwrap(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct StatementRepository<E> {
    executor: E,
    table: String,
    fields: NonEmpty<String>,
    dialect: Dialect,
}

impl<E> StatementRepository<E> {
    /// Creates a repository for `table`, whose columns are `fields` with the primary key first.
    #[must_use]
    pub fn new(
        executor: E,
        table: impl Into<String>,
        fields: NonEmpty<String>,
        dialect: Dialect,
    ) -> Self {
        Self {
            executor,
            table: table.into(),
            fields,
            dialect,
        }
    }

    /// The table that records are stored in.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The columns of the table, primary key first.
    #[must_use]
    pub fn fields(&self) -> &NonEmpty<String> {
        &self.fields
    }

    /// The dialect statements are written in.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The primary key column.
    #[must_use]
    pub fn key_field(&self) -> &str {
        &self.fields.head
    }

    /// Borrows the executor.
    #[must_use]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Releases the executor, for example to return a leased connection to its pool early.
    #[must_use]
    pub fn into_executor(self) -> E {
        self.executor
    }

    fn parameters(&self, record: &ValueTree) -> Vec<Value> {
        let root = record.root();

        self.fields
            .iter()
            .map(|field| {
                root.child(field)
                    .map_or(Value::Null, |child| child.value().clone())
            })
            .collect()
    }
}

impl<E: Executor> Repository<u64, ValueTree> for StatementRepository<E> {
    fn insert(&mut self, mut data: ValueTree) -> Result<u64> {
        let id = self.executor.next_id(&self.table)?;
        data.root_mut().set_child(&self.fields.head, id);

        let statement = insert_statement(self.dialect, &self.table, &self.fields);
        let parameters = self.parameters(&data);

        debug!(table = %self.table, id, %statement, "inserting record");

        self.executor.execute(&statement, &parameters)?;

        Ok(id)
    }

    fn update(&mut self, id: u64, mut data: ValueTree) -> Result<()> {
        data.root_mut().set_child(&self.fields.head, id);

        let statement = update_statement(self.dialect, &self.table, &self.fields);
        let mut parameters = self.parameters(&data);

        if self.dialect.rebinds_key_on_update() {
            parameters.push(Value::U64(id));
        }

        debug!(table = %self.table, id, %statement, "updating record");

        let affected = self.executor.execute(&statement, &parameters)?;

        if affected == 0 {
            return Err(Error::NotFound { id: id.to_string() });
        }

        Ok(())
    }

    fn remove(&mut self, id: u64) -> Result<bool> {
        let statement = delete_statement(self.dialect, &self.table, &self.fields);

        debug!(table = %self.table, id, %statement, "removing record");

        let affected = self.executor.execute(&statement, &[Value::U64(id)])?;

        Ok(affected > 0)
    }

    fn find_by_id(&mut self, id: u64) -> Result<Option<ValueTree>> {
        let statement = select_statement(self.dialect, &self.table, &self.fields);

        debug!(table = %self.table, id, %statement, "loading record");

        let Some(row) = self.executor.query_row(&statement, &[Value::U64(id)])? else {
            return Ok(None);
        };

        if row.len() != self.fields.len() {
            return Err(Error::MalformedRow {
                expected: self.fields.len(),
                actual: row.len(),
            });
        }

        let mut record = ValueTree::new(self.table.clone(), ());
        let mut root = record.root_mut();

        for (field, value) in self.fields.iter().zip(row) {
            root.add_child(field.clone(), value);
        }

        Ok(Some(record))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use mockall::Sequence;
    use nonempty::nonempty;

    use super::*;
    use crate::MockExecutor;

    fn fields() -> NonEmpty<String> {
        nonempty!["id".to_string(), "email".to_string()]
    }

    fn user(email: &str) -> ValueTree {
        let mut record = ValueTree::new("user", ());
        record.root_mut().add_child("email", email);
        record
    }

    #[test]
    fn insert_assigns_next_id_and_binds_fields_in_order() {
        let mut executor = MockExecutor::new();
        let mut sequence = Sequence::new();

        executor
            .expect_next_id()
            .withf(|table| table.to_string() == "users")
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(7));

        executor
            .expect_execute()
            .withf(|statement, parameters| {
                statement.to_string() == "INSERT INTO users (id, email) VALUES ($1, $2)"
                    && parameters.to_vec() == vec![Value::U64(7), Value::from("a@b.org")]
            })
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(1));

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Numbered);

        assert_eq!(repository.insert(user("a@b.org")).unwrap(), 7);
    }

    #[test]
    fn missing_fields_bind_null() {
        let mut executor = MockExecutor::new();

        executor.expect_next_id().returning(|_| Ok(1));
        executor
            .expect_execute()
            .withf(|_, parameters| parameters.to_vec() == vec![Value::U64(1), Value::Null])
            .times(1)
            .returning(|_, _| Ok(1));

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Numbered);

        repository.insert(ValueTree::new("user", ())).unwrap();
    }

    #[test]
    fn numbered_update_binds_key_once() {
        let mut executor = MockExecutor::new();

        executor
            .expect_execute()
            .withf(|statement, parameters| {
                statement.to_string() == "UPDATE users SET id=$1, email=$2 WHERE id=$1"
                    && parameters.to_vec() == vec![Value::U64(3), Value::from("x@y.org")]
            })
            .times(1)
            .returning(|_, _| Ok(1));

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Numbered);

        repository.update(3, user("x@y.org")).unwrap();
    }

    #[test]
    fn anonymous_update_binds_key_again() {
        let mut executor = MockExecutor::new();

        executor
            .expect_execute()
            .withf(|statement, parameters| {
                statement.to_string() == "UPDATE users SET id=?, email=? WHERE id=?"
                    && parameters.to_vec()
                        == vec![Value::U64(3), Value::from("x@y.org"), Value::U64(3)]
            })
            .times(1)
            .returning(|_, _| Ok(1));

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Anonymous);

        repository.update(3, user("x@y.org")).unwrap();
    }

    #[test]
    fn update_overrides_stale_key_in_record() {
        let mut executor = MockExecutor::new();

        executor
            .expect_execute()
            .withf(|_, parameters| parameters.first() == Some(&Value::U64(3)))
            .times(1)
            .returning(|_, _| Ok(1));

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Numbered);

        let mut record = user("x@y.org");
        record.root_mut().add_child("id", 999_u64);

        repository.update(3, record).unwrap();
    }

    #[test]
    fn update_of_missing_row_is_not_found() {
        let mut executor = MockExecutor::new();
        executor.expect_execute().times(1).returning(|_, _| Ok(0));

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Numbered);

        let result = repository.update(42, user("x@y.org"));

        assert!(matches!(result, Err(Error::NotFound { ref id }) if id == "42"));
    }

    #[test]
    fn remove_reports_whether_row_existed() {
        let mut executor = MockExecutor::new();
        let mut sequence = Sequence::new();

        executor
            .expect_execute()
            .withf(|statement, parameters| {
                statement.to_string() == "DELETE FROM users WHERE id=?"
                    && parameters.to_vec() == vec![Value::U64(5)]
            })
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(1));

        executor
            .expect_execute()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(0));

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Anonymous);

        assert!(repository.remove(5).unwrap());
        assert!(!repository.remove(5).unwrap());
    }

    #[test]
    fn find_maps_row_to_record() {
        let mut executor = MockExecutor::new();

        executor
            .expect_query_row()
            .withf(|statement, parameters| {
                statement.to_string() == "SELECT id, email FROM users WHERE id=$1"
                    && parameters.to_vec() == vec![Value::U64(7)]
            })
            .times(1)
            .returning(|_, _| Ok(Some(vec![Value::U64(7), Value::from("a@b.org")])));

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Numbered);

        let record = repository.find_by_id(7).unwrap().unwrap();
        let root = record.root();

        assert_eq!(root.key(), "users");
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.child("id").unwrap().get::<u64>().unwrap(), 7);
        assert_eq!(root.child("email").unwrap().as_str().unwrap(), "a@b.org");
    }

    #[test]
    fn find_missing_is_none() {
        let mut executor = MockExecutor::new();
        executor.expect_query_row().returning(|_, _| Ok(None));

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Numbered);

        assert!(repository.find_by_id(1).unwrap().is_none());
    }

    #[test]
    fn find_rejects_short_row() {
        let mut executor = MockExecutor::new();
        executor
            .expect_query_row()
            .returning(|_, _| Ok(Some(vec![Value::U64(1)])));

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Numbered);

        assert!(matches!(
            repository.find_by_id(1),
            Err(Error::MalformedRow {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn backend_errors_propagate() {
        let mut executor = MockExecutor::new();
        executor
            .expect_next_id()
            .returning(|_| Err(Error::backend("sequence unavailable")));
        executor.expect_execute().never();

        let mut repository =
            StatementRepository::new(executor, "users", fields(), Dialect::Numbered);

        assert!(matches!(
            repository.insert(user("a@b.org")),
            Err(Error::Backend(_))
        ));
    }

    #[test]
    fn accessors() {
        let repository =
            StatementRepository::new(MockExecutor::new(), "users", fields(), Dialect::Anonymous);

        assert_eq!(repository.table(), "users");
        assert_eq!(repository.key_field(), "id");
        assert_eq!(repository.fields().len(), 2);
        assert_eq!(repository.dialect(), Dialect::Anonymous);
    }
}
