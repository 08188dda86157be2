use crate::Result;

/// Persistence contract for one kind of record, addressed by an id of type `Id`.
///
/// Implementations decide how records are stored: [`MemoryRepository`][1] keeps them in
/// process memory, [`StatementRepository`][2] turns each call into a parameterized SQL
/// statement run through an [`Executor`][3].
///
/// All operations take `&mut self` because backends commonly hold a connection that must not be
/// used from two operations at once.
///
/// [1]: crate::MemoryRepository
/// [2]: crate::StatementRepository
/// [3]: crate::Executor
pub trait Repository<Id, Data> {
    /// Stores a new record and returns the id assigned to it.
    fn insert(&mut self, data: Data) -> Result<Id>;

    /// Replaces the record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`][crate::Error::NotFound] if there is no such record. No other
    /// record is affected in that case.
    fn update(&mut self, id: Id, data: Data) -> Result<()>;

    /// Removes the record with the given id.
    ///
    /// Returns `false` if there was no such record, which is not treated as an error.
    fn remove(&mut self, id: Id) -> Result<bool>;

    /// Loads the record with the given id, or `None` if there is no such record.
    fn find_by_id(&mut self, id: Id) -> Result<Option<Data>>;
}
