use std::any::type_name;
use std::fmt;

use crate::{CrudModel, FindModel, Result};

/// Object-safe view of a record bound to its model, with both types erased.
trait ErasedCrud: Send {
    fn insert(&mut self) -> Result<()>;
    fn update(&mut self) -> Result<()>;
    fn remove(&mut self) -> Result<()>;
    fn clone_box(&self) -> Box<dyn ErasedCrud>;
    fn type_names(&self) -> (&'static str, &'static str);
}

/// Extends [`ErasedCrud`] with lookup, keeping the record type visible.
trait ErasedFindCrud<D>: ErasedCrud {
    fn find_by_id(&mut self) -> Result<Option<D>>;
    fn data(&self) -> &D;
    fn data_mut(&mut self) -> &mut D;
    fn clone_find_box(&self) -> Box<dyn ErasedFindCrud<D>>;
}

#[derive(Clone)]
struct Bound<D, M> {
    data: D,
    model: M,
}

impl<D, M> ErasedCrud for Bound<D, M>
where
    D: Clone + Send + 'static,
    M: CrudModel<D> + Send + 'static,
{
    fn insert(&mut self) -> Result<()> {
        self.model.insert(&mut self.data)
    }

    fn update(&mut self) -> Result<()> {
        self.model.update(&self.data)
    }

    fn remove(&mut self) -> Result<()> {
        self.model.remove(&self.data)
    }

    fn clone_box(&self) -> Box<dyn ErasedCrud> {
        Box::new(self.clone())
    }

    #[cfg_attr(test, mutants::skip)] // Only used for Debug output.
    fn type_names(&self) -> (&'static str, &'static str) {
        (type_name::<D>(), type_name::<M>())
    }
}

impl<D, M> ErasedFindCrud<D> for Bound<D, M>
where
    D: Clone + Send + 'static,
    M: FindModel<D> + Send + 'static,
{
    fn find_by_id(&mut self) -> Result<Option<D>> {
        self.model.find_by_id(&self.data)
    }

    fn data(&self) -> &D {
        &self.data
    }

    fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    fn clone_find_box(&self) -> Box<dyn ErasedFindCrud<D>> {
        Box::new(self.clone())
    }
}

/// A record bound to the [`CrudModel`] that stores it, with both the record type and the model
/// type erased.
///
/// Handles for different record and model types can be kept in one collection and driven
/// uniformly. The handle owns its record and its model.
///
/// Cloning a handle deep-copies both the record and the model, so the clone is fully
/// independent: operations through one handle never affect what the other observes.
///
/// # Example
///
/// ```rust
/// use record_crud::{CrudHandle, KeyedModel, MemoryRepository};
/// use value_tree::ValueTree;
///
/// let mut user = ValueTree::new("user", ());
/// user.root_mut().add_child("email", "a@b.org");
///
/// let mut order = ValueTree::new("order", ());
/// order.root_mut().add_child("total", 12.5_f64);
///
/// let mut handles = vec![
///     CrudHandle::new(user, KeyedModel::new(MemoryRepository::new("id"), "id")),
///     CrudHandle::new(order, KeyedModel::new(MemoryRepository::new("order_id"), "order_id")),
/// ];
///
/// for handle in &mut handles {
///     handle.insert().unwrap();
///     handle.update().unwrap();
/// }
/// ```
pub struct CrudHandle {
    inner: Box<dyn ErasedCrud>,
}

impl CrudHandle {
    /// Binds `data` to `model`.
    #[must_use]
    pub fn new<D, M>(data: D, model: M) -> Self
    where
        D: Clone + Send + 'static,
        M: CrudModel<D> + Send + 'static,
    {
        Self {
            inner: Box::new(Bound { data, model }),
        }
    }

    /// Stores the record as a new record. Ids assigned by the model are kept in the bound
    /// record, so later operations address the stored record.
    pub fn insert(&mut self) -> Result<()> {
        self.inner.insert()
    }

    /// Overwrites the stored version of the record.
    pub fn update(&mut self) -> Result<()> {
        self.inner.update()
    }

    /// Removes the stored version of the record.
    pub fn remove(&mut self) -> Result<()> {
        self.inner.remove()
    }
}

impl Clone for CrudHandle {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_box(),
        }
    }
}

impl fmt::Debug for CrudHandle {
    #[cfg_attr(test, mutants::skip)] // Debug output is not part of the contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (data, model) = self.inner.type_names();

        f.debug_struct(type_name::<Self>())
            .field("data", &data)
            .field("model", &model)
            .finish()
    }
}

/// A record bound to the [`FindModel`] that stores it, with the model type erased.
///
/// Like [`CrudHandle`] but additionally able to load the stored version of the record, which
/// requires the record type to stay visible. The bound record can be inspected and modified
/// between operations.
///
/// Converts into a [`CrudHandle`] when only the common operations are needed.
///
/// # Example
///
/// ```rust
/// use record_crud::{FindCrudHandle, KeyedModel, MemoryRepository};
/// use value_tree::ValueTree;
///
/// let mut user = ValueTree::new("user", ());
/// user.root_mut().add_child("email", "a@b.org");
///
/// let mut handle = FindCrudHandle::new(user, KeyedModel::new(MemoryRepository::new("id"), "id"));
/// handle.insert().unwrap();
///
/// handle
///     .data_mut()
///     .root_mut()
///     .child_mut("email")
///     .unwrap()
///     .set_value("new@b.org");
/// handle.update().unwrap();
///
/// let stored = handle.find_by_id().unwrap().unwrap();
/// assert_eq!(&stored, handle.data());
/// ```
pub struct FindCrudHandle<D> {
    inner: Box<dyn ErasedFindCrud<D>>,
}

impl<D> FindCrudHandle<D>
where
    D: Clone + Send + 'static,
{
    /// Binds `data` to `model`.
    #[must_use]
    pub fn new<M>(data: D, model: M) -> Self
    where
        M: FindModel<D> + Send + 'static,
    {
        Self {
            inner: Box::new(Bound { data, model }),
        }
    }
}

impl<D> FindCrudHandle<D> {
    /// Stores the record as a new record. Ids assigned by the model are kept in the bound
    /// record, so later operations address the stored record.
    pub fn insert(&mut self) -> Result<()> {
        self.inner.insert()
    }

    /// Overwrites the stored version of the record.
    pub fn update(&mut self) -> Result<()> {
        self.inner.update()
    }

    /// Removes the stored version of the record.
    pub fn remove(&mut self) -> Result<()> {
        self.inner.remove()
    }

    /// Loads the stored version of the record, or `None` if it is not stored.
    pub fn find_by_id(&mut self) -> Result<Option<D>> {
        self.inner.find_by_id()
    }

    /// The bound record.
    #[must_use]
    pub fn data(&self) -> &D {
        self.inner.data()
    }

    /// The bound record, for modification before the next operation.
    #[must_use]
    pub fn data_mut(&mut self) -> &mut D {
        self.inner.data_mut()
    }
}

impl<D> Clone for FindCrudHandle<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_find_box(),
        }
    }
}

impl<D> fmt::Debug for FindCrudHandle<D> {
    #[cfg_attr(test, mutants::skip)] // Debug output is not part of the contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (data, model) = self.inner.type_names();

        f.debug_struct(type_name::<Self>())
            .field("data", &data)
            .field("model", &model)
            .finish()
    }
}

impl<D: 'static> From<FindCrudHandle<D>> for CrudHandle {
    fn from(handle: FindCrudHandle<D>) -> Self {
        Self {
            inner: handle.inner,
        }
    }
}
