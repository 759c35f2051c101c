// =====================================================================
// File: avl/node.rs
//
// Description:
//   Defines the AVL node (`AvlNode`) and its handle (`NodeId`). Besides
//   its value and child links, each node keeps:
//
//   - `parent`        : Handle of the structural parent, `None` for root.
//   - `balance_factor`: height(left) - height(right).
//   - `index`         : Position of the node in the in-order sequence.
//
// Notes:
//   * Nodes are owned by the tree's arena and never removed, so a handle
//     stays valid for the life of the tree.
// =====================================================================

/// Handle of a node inside an [`AvlTree`](crate::AvlTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Which child slot of its parent a node hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct AvlNode<T> {
    pub(crate) value: T,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) balance_factor: i8,
    pub(crate) index: usize,
}

impl<T> AvlNode<T> {
    pub(crate) fn new(value: T, parent: Option<NodeId>) -> Self {
        Self {
            value,
            left: None,
            right: None,
            parent,
            balance_factor: 0,
            index: 0,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Height of the left subtree minus height of the right subtree.
    pub fn balance_factor(&self) -> i8 {
        self.balance_factor
    }

    /// In-order position of this node as of the last insertion.
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}
