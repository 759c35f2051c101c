// =====================================================================
// File: btree/node.rs
//
// Description:
//   Defines the B-tree node (`BNode`) and the handle type (`NodeId`)
//   used to reference nodes inside a `BTree`'s arena. Each node keeps:
//
//   - `values`  : Ordered keys stored within the node.
//   - `children`: Handles of child nodes (empty if this node is a leaf).
//   - `parent`  : Handle of the owning node, `None` for the root.
//
// Notes:
//   * Nodes never own each other. The tree owns every node, and both
//     `children` and `parent` are plain handles into its arena.
//   * Higher-level operations (add, remove, merge) live in `tree.rs`.
// =====================================================================

/// Handle of a node inside a [`BTree`](crate::BTree).
///
/// Handles are only meaningful for the tree that issued them. A handle
/// of a node released by a merge may later be reused for a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the tree's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single B-tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BNode<T> {
    pub(crate) values: Vec<T>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl<T> BNode<T> {
    /// Creates an empty leaf hanging under `parent`.
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Self {
            values: Vec::new(),
            children: Vec::new(),
            parent,
        }
    }

    pub(crate) fn from_parts(values: Vec<T>, children: Vec<NodeId>, parent: Option<NodeId>) -> Self {
        Self {
            values,
            children,
            parent,
        }
    }

    /// Keys stored in this node, in ascending order.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Child handles; `values().len() + 1` of them for an internal node.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The node this one hangs under, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of keys held by this node.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Ord> BNode<T> {
    /// Index of the first key that is >= `value`.
    ///
    /// If `value` is stored here, this is its position; otherwise it is
    /// the child slot whose key range contains `value`.
    pub fn lower_bound(&self, value: &T) -> usize {
        self.values.partition_point(|v| v < value)
    }

    /// Index of the first key that is > `value`.
    ///
    /// Used by insertion so that equal keys keep their arrival order.
    pub fn upper_bound(&self, value: &T) -> usize {
        self.values.partition_point(|v| v <= value)
    }

    /// Position of `value` among this node's keys, if present.
    pub(crate) fn find(&self, value: &T) -> Option<usize> {
        let idx = self.lower_bound(value);
        (idx < self.values.len() && self.values[idx] == *value).then_some(idx)
    }
}
