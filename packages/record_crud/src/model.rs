use tracing::{debug, trace};
use value_tree::ValueTree;

use crate::{Error, Repository, Result};

/// Create, update and delete operations for records of type `D`.
///
/// A model is the unit a [`CrudHandle`][1] binds to a record. Models must be [`Clone`] so that
/// cloning a handle produces an independent copy, including the model's own state.
///
/// [1]: crate::CrudHandle
pub trait CrudModel<D>: Clone {
    /// Stores `data` as a new record. Models that assign ids write them back into `data`.
    fn insert(&mut self, data: &mut D) -> Result<()>;

    /// Overwrites the stored record that `data` identifies.
    fn update(&mut self, data: &D) -> Result<()>;

    /// Removes the stored record that `data` identifies. Removing a record that is not stored
    /// is not an error.
    fn remove(&mut self, data: &D) -> Result<()>;
}

/// A [`CrudModel`] that can also load the stored version of a record.
pub trait FindModel<D>: CrudModel<D> {
    /// Loads the stored record that `data` identifies, or `None` if it is not stored.
    fn find_by_id(&mut self, data: &D) -> Result<Option<D>>;
}

/// Adapts a [`Repository`] of [`ValueTree`] records into a [`FindModel`], reading each record's
/// id from its `key_field` child.
///
/// On insert, the id assigned by the repository is written back into the record.
///
/// # Example
///
/// ```rust
/// use record_crud::{CrudModel, FindModel, KeyedModel, MemoryRepository};
/// use value_tree::ValueTree;
///
/// let mut model = KeyedModel::new(MemoryRepository::new("id"), "id");
///
/// let mut user = ValueTree::new("user", ());
/// user.root_mut().add_child("email", "a@b.org");
///
/// model.insert(&mut user).unwrap();
/// assert_eq!(user.root().child("id").unwrap().get::<u64>().unwrap(), 1);
///
/// assert!(model.find_by_id(&user).unwrap().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct KeyedModel<R> {
    repository: R,
    key_field: String,
}

impl<R> KeyedModel<R> {
    /// Creates a model that stores records in `repository`, keyed by the `key_field` child.
    #[must_use]
    pub fn new(repository: R, key_field: impl Into<String>) -> Self {
        Self {
            repository,
            key_field: key_field.into(),
        }
    }

    /// The field that holds the id of each record.
    #[must_use]
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Borrows the underlying repository.
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Mutably borrows the underlying repository.
    #[must_use]
    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    fn id_of(&self, data: &ValueTree) -> Result<u64> {
        let key = data
            .root()
            .child(&self.key_field)
            .ok_or_else(|| Error::MissingField {
                field: self.key_field.clone(),
            })?;

        Ok(key.get::<u64>()?)
    }
}

impl<R> CrudModel<ValueTree> for KeyedModel<R>
where
    R: Repository<u64, ValueTree> + Clone,
{
    fn insert(&mut self, data: &mut ValueTree) -> Result<()> {
        let id = self.repository.insert(data.clone())?;
        data.root_mut().set_child(&self.key_field, id);

        trace!(id, "record inserted through model");

        Ok(())
    }

    fn update(&mut self, data: &ValueTree) -> Result<()> {
        let id = self.id_of(data)?;
        self.repository.update(id, data.clone())
    }

    fn remove(&mut self, data: &ValueTree) -> Result<()> {
        let id = self.id_of(data)?;

        if !self.repository.remove(id)? {
            debug!(id, "record to remove was not stored");
        }

        Ok(())
    }
}

impl<R> FindModel<ValueTree> for KeyedModel<R>
where
    R: Repository<u64, ValueTree> + Clone,
{
    fn find_by_id(&mut self, data: &ValueTree) -> Result<Option<ValueTree>> {
        let id = self.id_of(data)?;
        self.repository.find_by_id(id)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use value_tree::Kind;

    use super::*;
    use crate::MemoryRepository;

    fn model() -> KeyedModel<MemoryRepository> {
        KeyedModel::new(MemoryRepository::new("id"), "id")
    }

    fn user(email: &str) -> ValueTree {
        let mut record = ValueTree::new("user", ());
        record.root_mut().add_child("email", email);
        record
    }

    #[test]
    fn insert_writes_id_back() {
        let mut model = model();
        let mut first = user("a@b.org");
        let mut second = user("c@d.org");

        model.insert(&mut first).unwrap();
        model.insert(&mut second).unwrap();

        assert_eq!(first.root().child("id").unwrap().get::<u64>().unwrap(), 1);
        assert_eq!(second.root().child("id").unwrap().get::<u64>().unwrap(), 2);
        assert_eq!(model.repository().len(), 2);
    }

    #[test]
    fn update_and_find_round_trip() {
        let mut model = model();
        let mut record = user("a@b.org");
        model.insert(&mut record).unwrap();

        record
            .root_mut()
            .child_mut("email")
            .unwrap()
            .set_value("new@b.org");
        model.update(&record).unwrap();

        let loaded = model.find_by_id(&record).unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn operations_without_key_fail() {
        let mut model = model();
        let record = user("a@b.org");

        assert!(matches!(
            model.update(&record),
            Err(Error::MissingField { ref field }) if field == "id"
        ));
        assert!(matches!(
            model.remove(&record),
            Err(Error::MissingField { .. })
        ));
        assert!(matches!(
            model.find_by_id(&record),
            Err(Error::MissingField { .. })
        ));
    }

    #[test]
    fn key_of_wrong_kind_fails() {
        let mut model = model();
        let mut record = user("a@b.org");
        record.root_mut().add_child("id", "seven");

        let result = model.find_by_id(&record);

        assert!(matches!(
            result,
            Err(Error::Value(value_tree::Error::TypeMismatch {
                expected: Kind::U64,
                actual: Kind::Text,
                ..
            }))
        ));
    }

    #[test]
    fn remove_twice_is_not_an_error() {
        let mut model = model();
        let mut record = user("a@b.org");
        model.insert(&mut record).unwrap();

        model.remove(&record).unwrap();
        model.remove(&record).unwrap();

        assert!(model.find_by_id(&record).unwrap().is_none());
    }

    #[test]
    fn update_of_unstored_record_is_not_found() {
        let mut model = model();
        let mut record = user("a@b.org");
        record.root_mut().add_child("id", 5_u64);

        assert!(matches!(model.update(&record), Err(Error::NotFound { .. })));
        assert!(model.repository_mut().is_empty());
    }
}
