use std::collections::BTreeMap;

use tracing::trace;
use value_tree::ValueTree;

use crate::{Error, Repository, Result};

/// A [`Repository`] that keeps records in process memory, assigning ids from its own sequence
/// starting at 1.
///
/// The assigned id is stored into every record under the key field, so loaded records carry
/// their own id just like rows loaded from a table do.
///
/// Cloning produces an independent deep copy: records and the id sequence are duplicated, and
/// changes to one copy are never observed through the other.
///
/// # Example
///
/// ```rust
/// use record_crud::{MemoryRepository, Repository};
/// use value_tree::ValueTree;
///
/// let mut users = MemoryRepository::new("id");
///
/// let mut user = ValueTree::new("user", ());
/// user.root_mut().add_child("email", "a@b.org");
///
/// let id = users.insert(user).unwrap();
///
/// let loaded = users.find_by_id(id).unwrap().unwrap();
/// assert_eq!(loaded.root().child("id").unwrap().get::<u64>().unwrap(), id);
/// assert!(users.remove(id).unwrap());
/// assert!(!users.remove(id).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct MemoryRepository {
    key_field: String,
    records: BTreeMap<u64, ValueTree>,
    next_id: u64,
}

impl MemoryRepository {
    /// Creates an empty repository that stores the id of each record under `key_field`.
    #[must_use]
    pub fn new(key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// The field that holds the id of each record.
    #[must_use]
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// The number of records stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn stamp(&self, record: &mut ValueTree, id: u64) {
        record.root_mut().set_child(&self.key_field, id);
    }
}

impl Repository<u64, ValueTree> for MemoryRepository {
    fn insert(&mut self, mut data: ValueTree) -> Result<u64> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| Error::backend("in-memory id sequence is exhausted"))?;

        self.stamp(&mut data, id);
        self.records.insert(id, data);

        trace!(id, "inserted record");

        Ok(id)
    }

    fn update(&mut self, id: u64, mut data: ValueTree) -> Result<()> {
        if !self.records.contains_key(&id) {
            return Err(Error::NotFound { id: id.to_string() });
        }

        self.stamp(&mut data, id);
        self.records.insert(id, data);

        trace!(id, "updated record");

        Ok(())
    }

    fn remove(&mut self, id: u64) -> Result<bool> {
        Ok(self.records.remove(&id).is_some())
    }

    fn find_by_id(&mut self, id: u64) -> Result<Option<ValueTree>> {
        Ok(self.records.get(&id).cloned())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(MemoryRepository: Send, Sync, Clone);

    fn user(email: &str) -> ValueTree {
        let mut record = ValueTree::new("user", ());
        record.root_mut().add_child("email", email);
        record
    }

    fn email_of(record: &ValueTree) -> String {
        record
            .root()
            .child("email")
            .unwrap()
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let mut repository = MemoryRepository::new("id");

        assert_eq!(repository.insert(user("a@b.org")).unwrap(), 1);
        assert_eq!(repository.insert(user("c@d.org")).unwrap(), 2);
        assert_eq!(repository.len(), 2);
    }

    #[test]
    fn ids_are_not_reused_after_remove() {
        let mut repository = MemoryRepository::new("id");

        let first = repository.insert(user("a@b.org")).unwrap();
        assert!(repository.remove(first).unwrap());

        let second = repository.insert(user("c@d.org")).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn exhausted_sequence_is_an_error() {
        let mut repository = MemoryRepository::new("id");
        repository.next_id = u64::MAX;

        assert!(matches!(
            repository.insert(user("a@b.org")),
            Err(Error::Backend(_))
        ));
        assert!(repository.is_empty());
        assert_eq!(repository.next_id, u64::MAX);
    }

    #[test]
    fn find_returns_stored_copy_with_id() {
        let mut repository = MemoryRepository::new("user_id");

        let id = repository.insert(user("a@b.org")).unwrap();
        let loaded = repository.find_by_id(id).unwrap().unwrap();

        assert_eq!(email_of(&loaded), "a@b.org");
        assert_eq!(
            loaded
                .root()
                .child("user_id")
                .unwrap()
                .get::<u64>()
                .unwrap(),
            id
        );
    }

    #[test]
    fn find_missing_is_none() {
        let mut repository = MemoryRepository::new("id");

        assert!(repository.find_by_id(1).unwrap().is_none());
    }

    #[test]
    fn update_replaces_record() {
        let mut repository = MemoryRepository::new("id");

        let id = repository.insert(user("a@b.org")).unwrap();
        repository.update(id, user("new@b.org")).unwrap();

        let loaded = repository.find_by_id(id).unwrap().unwrap();
        assert_eq!(email_of(&loaded), "new@b.org");
        assert_eq!(loaded.root().child("id").unwrap().get::<u64>().unwrap(), id);
    }

    #[test]
    fn update_missing_fails_without_side_effects() {
        let mut repository = MemoryRepository::new("id");
        let id = repository.insert(user("a@b.org")).unwrap();

        let result = repository.update(99, user("x@y.org"));

        assert!(matches!(result, Err(Error::NotFound { ref id }) if id == "99"));
        assert_eq!(repository.len(), 1);
        assert_eq!(
            email_of(&repository.find_by_id(id).unwrap().unwrap()),
            "a@b.org"
        );
    }

    #[test]
    fn remove_missing_is_false() {
        let mut repository = MemoryRepository::new("id");

        assert!(!repository.remove(1).unwrap());
        assert!(repository.is_empty());
    }

    #[test]
    fn clones_are_independent() {
        let mut original = MemoryRepository::new("id");
        let id = original.insert(user("a@b.org")).unwrap();

        let mut copy = original.clone();

        original.update(id, user("changed@b.org")).unwrap();
        let original_next = original.insert(user("c@d.org")).unwrap();

        assert_eq!(
            email_of(&copy.find_by_id(id).unwrap().unwrap()),
            "a@b.org"
        );
        assert_eq!(copy.len(), 1);

        // The copy continues its own id sequence.
        assert_eq!(copy.insert(user("e@f.org")).unwrap(), original_next);

        assert!(copy.remove(id).unwrap());
        assert!(original.find_by_id(id).unwrap().is_some());
    }
}
