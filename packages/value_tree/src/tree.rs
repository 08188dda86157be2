use std::any::type_name;
use std::fmt;
use std::mem;
use std::slice;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Error, Kind, Result, Value, ValueKind};

/// Global counter for generating unique tree IDs.
static TREE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique tree ID.
fn generate_tree_id() -> u64 {
    TREE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

const ROOT_INDEX: usize = 0;

const ERR_FOREIGN_NODE: &str = "the node ID was created by a different ValueTree";
const ERR_MISSING_SLOT: &str = "node IDs are only created by their own tree and nodes are never removed, so every index must be valid";

/// Identifies one node of one [`ValueTree`].
///
/// IDs are stable for the lifetime of the tree. Presenting an ID to a tree other than the one
/// that created it (including a clone of that tree) is a programming error and panics.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId {
    tree_id: u64,
    index: usize,
}

#[derive(Clone, Debug)]
struct Slot {
    key: String,
    value: Value,

    /// `None` only for the root.
    parent: Option<usize>,

    /// In insertion order.
    children: Vec<usize>,
}

/// A schema-less record: a tree of keyed nodes, each holding one dynamically typed [`Value`].
///
/// Every tree has a root node. Further nodes are only ever created through
/// [`NodeMut::add_child()`], so each node has exactly one parent and the structure can never
/// contain a cycle. Children keep their insertion order, which is the order seen by lookups
/// and traversal. Keys do not need to be unique among siblings; lookups return the first match.
///
/// All nodes are stored in one arena owned by the tree and refer to their parent and children
/// by index, so a parent link can never outlive the node it points to. The nodes are dropped
/// together with the tree.
///
/// Nodes are accessed through the borrowed views [`Node`] (shared) and [`NodeMut`] (exclusive).
///
/// Cloning a tree is a deep copy. The clone is a new tree with its own node IDs.
///
/// # Example
///
/// ```rust
/// use value_tree::{Error, ValueTree};
///
/// let mut record = ValueTree::new("user", ());
/// let mut root = record.root_mut();
/// root.add_child("id", 0_u64);
/// root.add_child("email", "a@b.org");
///
/// let root = record.root();
/// assert_eq!(root.child("email").unwrap().as_str().unwrap(), "a@b.org");
/// assert!(matches!(
///     root.child("id").unwrap().get::<String>(),
///     Err(Error::TypeMismatch { .. })
/// ));
/// assert!(root.child("missing").is_none());
/// ```
pub struct ValueTree {
    tree_id: u64,

    /// The root is always at `ROOT_INDEX`.
    slots: Vec<Slot>,
}

impl ValueTree {
    /// Creates a tree consisting of only a root node.
    ///
    /// Pass `()` as the value for a root that is only a container for its children.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            tree_id: generate_tree_id(),
            slots: vec![Slot {
                key: key.into(),
                value: value.into(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The root node of the tree.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            index: ROOT_INDEX,
        }
    }

    /// The root node of the tree, for modification.
    #[must_use]
    pub fn root_mut(&mut self) -> NodeMut<'_> {
        NodeMut {
            tree: self,
            index: ROOT_INDEX,
        }
    }

    /// The node with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID was created by a different tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node {
            tree: self,
            index: self.index_of(id),
        }
    }

    /// The node with the given ID, for modification.
    ///
    /// # Panics
    ///
    /// Panics if the ID was created by a different tree.
    #[must_use]
    pub fn node_mut(&mut self, id: NodeId) -> NodeMut<'_> {
        NodeMut {
            index: self.index_of(id),
            tree: self,
        }
    }

    /// The number of nodes in the tree, including the root. Never zero.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.slots.len()
    }

    /// Walks the whole tree depth-first in pre-order, starting at the root.
    ///
    /// See [`Node::walk()`].
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        self.root().walk()
    }

    fn index_of(&self, id: NodeId) -> usize {
        assert!(id.tree_id == self.tree_id, "{ERR_FOREIGN_NODE}");
        id.index
    }

    fn id_of(&self, index: usize) -> NodeId {
        NodeId {
            tree_id: self.tree_id,
            index,
        }
    }

    fn slot(&self, index: usize) -> &Slot {
        self.slots.get(index).expect(ERR_MISSING_SLOT)
    }

    fn slot_mut(&mut self, index: usize) -> &mut Slot {
        self.slots.get_mut(index).expect(ERR_MISSING_SLOT)
    }

    fn push_child(&mut self, parent: usize, key: String, value: Value) -> usize {
        let index = self.slots.len();

        self.slots.push(Slot {
            key,
            value,
            parent: Some(parent),
            children: Vec::new(),
        });

        self.slot_mut(parent).children.push(index);

        index
    }
}

impl Default for ValueTree {
    /// A tree with an unnamed root that holds no value.
    fn default() -> Self {
        Self::new("", ())
    }
}

impl Clone for ValueTree {
    fn clone(&self) -> Self {
        Self {
            tree_id: generate_tree_id(),
            slots: self.slots.clone(),
        }
    }
}

impl PartialEq for ValueTree {
    /// Trees are equal if they have the same shape, keys and values. Node IDs are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.node_count() == other.node_count()
            && self
                .walk()
                .map(|(depth, node)| (depth, node.key(), node.value()))
                .eq(other
                    .walk()
                    .map(|(depth, node)| (depth, node.key(), node.value())))
    }
}

impl fmt::Debug for ValueTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("tree_id", &self.tree_id)
            .field("root", &self.root())
            .finish()
    }
}

impl fmt::Display for ValueTree {
    /// Renders one line per node in pre-order: indentation of two spaces per level, then the
    /// key, the kind of the value and the value itself.
    ///
    /// ```rust
    /// use value_tree::ValueTree;
    ///
    /// let mut record = ValueTree::new("user", ());
    /// let mut root = record.root_mut();
    /// root.add_child("id", 7_u64);
    /// root.add_child("address", ()).add_child("city", "Tallinn");
    ///
    /// assert_eq!(
    ///     record.to_string(),
    ///     "user (null): null\n  id (u64): 7\n  address (null): null\n    city (text): Tallinn\n"
    /// );
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, node) in self.walk() {
            writeln!(
                f,
                "{:indent$}{} ({}): {}",
                "",
                node.key(),
                node.kind(),
                node.value(),
                indent = depth.saturating_mul(2)
            )?;
        }

        Ok(())
    }
}

/// A shared view of one node of a [`ValueTree`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a ValueTree,
    index: usize,
}

impl<'a> Node<'a> {
    fn slot(self) -> &'a Slot {
        self.tree.slot(self.index)
    }

    fn type_mismatch(self, expected: Kind) -> Error {
        Error::TypeMismatch {
            key: self.key().to_string(),
            expected,
            actual: self.kind(),
        }
    }

    /// The ID of this node, usable with [`ValueTree::node()`] for as long as the tree exists.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.tree.id_of(self.index)
    }

    /// The key of this node.
    #[must_use]
    pub fn key(self) -> &'a str {
        &self.slot().key
    }

    /// The value stored in this node.
    #[must_use]
    pub fn value(self) -> &'a Value {
        &self.slot().value
    }

    /// The kind of the value stored in this node.
    #[must_use]
    pub fn kind(self) -> Kind {
        self.value().kind()
    }

    /// Reads the value stored in this node as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value is not stored as `T`. No conversion between
    /// kinds is ever attempted.
    ///
    /// # Example
    ///
    /// ```rust
    /// use value_tree::ValueTree;
    ///
    /// let record = ValueTree::new("count", 3_i64);
    ///
    /// assert_eq!(record.root().get::<i64>().unwrap(), 3);
    /// assert!(record.root().get::<u64>().is_err());
    /// ```
    pub fn get<T: ValueKind>(self) -> Result<T> {
        if !self.is::<T>() {
            return Err(self.type_mismatch(T::KIND));
        }

        T::from_value(self.value()).ok_or_else(|| self.type_mismatch(T::KIND))
    }

    /// Borrows the text stored in this node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value is not text.
    pub fn as_str(self) -> Result<&'a str> {
        match self.value() {
            Value::Text(text) => Ok(text),
            _ => Err(self.type_mismatch(Kind::Text)),
        }
    }

    /// Whether the value stored in this node is of the kind that `T` corresponds to.
    #[must_use]
    pub fn is<T: ValueKind>(self) -> bool {
        self.kind() == T::KIND
    }

    /// Whether this node holds no value.
    #[must_use]
    pub fn is_null(self) -> bool {
        self.value().is_null()
    }

    /// The parent of this node, or `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.slot().parent.map(|index| Self {
            tree: self.tree,
            index,
        })
    }

    /// The children of this node in insertion order.
    #[must_use]
    pub fn children(self) -> Children<'a> {
        Children {
            tree: self.tree,
            indexes: self.slot().children.iter(),
        }
    }

    /// The first child with exactly the given key, or `None` if there is no such child.
    ///
    /// This is a linear scan over the children.
    #[must_use]
    pub fn child(self, key: &str) -> Option<Self> {
        self.children().find(|child| child.key() == key)
    }

    /// How many levels below the root this node is. The root is at depth zero.
    #[must_use]
    pub fn depth(self) -> usize {
        let mut depth: usize = 0;
        let mut current = self;

        while let Some(parent) = current.parent() {
            depth = depth.saturating_add(1);
            current = parent;
        }

        depth
    }

    /// Walks this node and all its descendants depth-first in pre-order.
    ///
    /// Each item is the node together with its depth relative to this node, so this node itself
    /// is reported at depth zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use value_tree::ValueTree;
    ///
    /// let mut record = ValueTree::new("a", ());
    /// let mut root = record.root_mut();
    /// root.add_child("b", ()).add_child("c", ());
    /// root.add_child("d", ());
    ///
    /// let visited = record
    ///     .walk()
    ///     .map(|(depth, node)| format!("{depth}:{}", node.key()))
    ///     .collect::<Vec<_>>();
    ///
    /// assert_eq!(visited, ["0:a", "1:b", "2:c", "1:d"]);
    /// ```
    #[must_use]
    pub fn walk(self) -> Walk<'a> {
        Walk {
            tree: self.tree,
            pending: vec![(0, self.index)],
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key())
            .field("value", self.value())
            .field("children", &self.children().collect::<Vec<_>>())
            .finish()
    }
}

/// An exclusive view of one node of a [`ValueTree`], through which the tree can be modified.
pub struct NodeMut<'a> {
    tree: &'a mut ValueTree,
    index: usize,
}

impl<'a> NodeMut<'a> {
    /// A shared view of the same node.
    #[must_use]
    pub fn as_node(&self) -> Node<'_> {
        Node {
            tree: &*self.tree,
            index: self.index,
        }
    }

    /// Converts into a shared view of the same node that keeps the tree borrowed.
    #[must_use]
    pub fn into_node(self) -> Node<'a> {
        Node {
            tree: self.tree,
            index: self.index,
        }
    }

    /// The ID of this node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.tree.id_of(self.index)
    }

    /// The key of this node.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.tree.slot(self.index).key
    }

    /// The value stored in this node.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.tree.slot(self.index).value
    }

    /// Reads the value stored in this node as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value is not stored as `T`.
    pub fn get<T: ValueKind>(&self) -> Result<T> {
        self.as_node().get()
    }

    /// Whether the value stored in this node is of the kind that `T` corresponds to.
    #[must_use]
    pub fn is<T: ValueKind>(&self) -> bool {
        self.as_node().is::<T>()
    }

    /// Replaces the value stored in this node, returning the previous value.
    ///
    /// The new value may be of a different kind.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Value {
        mem::replace(&mut self.tree.slot_mut(self.index).value, value.into())
    }

    /// Appends a new child holding `value` and returns a view of it.
    ///
    /// The child is placed after all existing children, even if a child with the same key
    /// already exists.
    ///
    /// # Example
    ///
    /// ```rust
    /// use value_tree::ValueTree;
    ///
    /// let mut record = ValueTree::new("order", ());
    /// let mut root = record.root_mut();
    ///
    /// let mut line = root.add_child("line", ());
    /// line.add_child("sku", "A-1");
    /// line.add_child("quantity", 2_u64);
    ///
    /// let line = record.root().child("line").unwrap();
    /// assert_eq!(line.child("quantity").unwrap().get::<u64>().unwrap(), 2);
    /// assert_eq!(line.parent().unwrap().key(), "order");
    /// ```
    pub fn add_child(&mut self, key: impl Into<String>, value: impl Into<Value>) -> NodeMut<'_> {
        let index = self.tree.push_child(self.index, key.into(), value.into());

        NodeMut {
            tree: &mut *self.tree,
            index,
        }
    }

    /// Stores `value` in the first child with the given key, appending a new child if there is
    /// no such child yet. Returns a view of the child.
    pub fn set_child(&mut self, key: &str, value: impl Into<Value>) -> NodeMut<'_> {
        let value = value.into();

        let existing = self.as_node().child(key).map(|child| child.index);

        let index = match existing {
            Some(index) => {
                self.tree.slot_mut(index).value = value;
                index
            }
            None => self.tree.push_child(self.index, key.to_string(), value),
        };

        NodeMut {
            tree: &mut *self.tree,
            index,
        }
    }

    /// The first child with exactly the given key, for modification, or `None` if there is no
    /// such child.
    #[must_use]
    pub fn child_mut(&mut self, key: &str) -> Option<NodeMut<'_>> {
        let index = self.as_node().child(key)?.index;

        Some(NodeMut {
            tree: &mut *self.tree,
            index,
        })
    }

    /// The parent of this node, for modification, or `None` for the root.
    #[must_use]
    pub fn parent_mut(&mut self) -> Option<NodeMut<'_>> {
        let index = self.tree.slot(self.index).parent?;

        Some(NodeMut {
            tree: &mut *self.tree,
            index,
        })
    }
}

impl fmt::Debug for NodeMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_node(), f)
    }
}

/// Iterator over the children of a node, in insertion order. Returned by [`Node::children()`].
#[derive(Clone, Debug)]
pub struct Children<'a> {
    tree: &'a ValueTree,
    indexes: slice::Iter<'a, usize>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.indexes.next().map(|&index| Node {
            tree: self.tree,
            index,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indexes.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}

/// Depth-first pre-order iterator over a subtree. Returned by [`Node::walk()`].
#[derive(Clone, Debug)]
pub struct Walk<'a> {
    tree: &'a ValueTree,

    /// Nodes still to visit with their depth; the next node to visit is at the end.
    pending: Vec<(usize, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, Node<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, index) = self.pending.pop()?;
        let node = Node {
            tree: self.tree,
            index,
        };

        let child_depth = depth.saturating_add(1);
        self.pending.extend(
            node.slot()
                .children
                .iter()
                .rev()
                .map(|&child| (child_depth, child)),
        );

        Some((depth, node))
    }
}
