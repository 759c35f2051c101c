// =====================================================================
// File: avl/tree.rs
//
// Description:
//   Implements the height-balanced binary search tree (`AvlTree`) with
//   index-aware nodes: ordered insertion with rotations, in-order
//   iteration, lookup by position and inclusive range queries.
//
// Notes:
//   * Balance factors are adjusted incrementally while walking up the
//     parent chain from a new leaf; the walk stops at the first node whose
//     factor returns to zero or after the single (or double) rotation.
//   * Every insertion renumbers all nodes in order. This keeps `get` a
//     plain descent over cached positions at the price of O(n) per `add`.
//   * Walks use explicit stacks or parent handles instead of recursion.
// =====================================================================
use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

use super::node::{AvlNode, NodeId, Side};

/// AVL tree of unique values.
#[derive(Debug, Clone)]
pub struct AvlTree<T> {
    nodes: Vec<AvlNode<T>>,
    root: Option<NodeId>,
    count: usize,
}

impl<T> AvlTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            count: 0,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&AvlNode<T>> {
        self.nodes.get(id.0)
    }

    /// Number of levels; 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut level: Vec<NodeId> = self.root.into_iter().collect();
        let mut height = 0;
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|id| [self.nodes[id.0].left, self.nodes[id.0].right])
                .flatten()
                .collect();
        }
        height
    }

    /// In-order iterator; every call starts a fresh traversal.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: self,
            stack: Vec::new(),
            current: self.root,
        }
    }

    /// Value at in-order position `index`; negative positions count from
    /// the end, so `get(-1)` is the largest value.
    ///
    /// The lookup descends by each node's cached position and returns
    /// `None` once it runs off the tree.
    ///
    /// # Example
    /// ```
    /// use ordtrees::AvlTree;
    /// let tree: AvlTree<i32> = [1, 2, -4, -50, 4, 3].into_iter().collect();
    /// assert_eq!(tree.get(0), Some(&-50));
    /// assert_eq!(tree.get(-1), Some(&4));
    /// assert_eq!(tree.get(6), None);
    /// ```
    pub fn get(&self, index: isize) -> Option<&T> {
        let index = if index < 0 {
            index.checked_add_unsigned(self.count)?
        } else {
            index
        };
        let index = usize::try_from(index).ok()?;

        let mut current = self.root?;
        loop {
            let node = &self.nodes[current.0];
            current = match index.cmp(&node.index) {
                Ordering::Equal => return Some(&node.value),
                Ordering::Less => node.left?,
                Ordering::Greater => node.right?,
            };
        }
    }

    /// Renumber every node with its in-order position, starting at 0.
    fn update_indexes(&mut self) {
        let mut stack = Vec::new();
        let mut current = self.root;
        let mut index = 0;
        loop {
            while let Some(id) = current {
                stack.push(id);
                current = self.nodes[id.0].left;
            }
            let Some(id) = stack.pop() else {
                break;
            };
            self.nodes[id.0].index = index;
            index += 1;
            current = self.nodes[id.0].right;
        }
    }

    fn push_node(&mut self, value: T, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(AvlNode::new(value, parent));
        NodeId(self.nodes.len() - 1)
    }
}

impl<T: Ord> AvlTree<T> {
    /// Insert `value` unless it is already present; duplicates are ignored.
    pub fn add(&mut self, value: T) {
        let Some(root) = self.root else {
            self.root = Some(self.push_node(value, None));
            self.count += 1;
            return;
        };
        let Some((parent, side)) = self.find_parent(root, &value) else {
            trace!("value already present, ignoring");
            return;
        };

        let id = self.push_node(value, Some(parent));
        match side {
            Side::Left => self.nodes[parent.0].left = Some(id),
            Side::Right => self.nodes[parent.0].right = Some(id),
        }
        self.modify_balance_factor(id);
        self.update_indexes();
        self.count += 1;
    }

    pub fn contains(&self, value: &T) -> bool {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            current = match value.cmp(&node.value) {
                Ordering::Equal => return true,
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        false
    }

    /// Values `v` with `start <= v <= end`, ascending.
    ///
    /// Subtrees that cannot hold values inside the bounds are skipped.
    pub fn range(&self, start: &T, end: &T) -> Vec<&T> {
        let mut items = Vec::new();
        let mut stack = Vec::new();
        let mut current = self.root;
        loop {
            while let Some(id) = current {
                stack.push(id);
                let node = &self.nodes[id.0];
                current = if node.value > *start { node.left } else { None };
            }
            let Some(id) = stack.pop() else {
                break;
            };
            let node = &self.nodes[id.0];
            if *start <= node.value && node.value <= *end {
                items.push(&node.value);
            }
            current = if node.value < *end { node.right } else { None };
        }
        items
    }

    /// Find the node a new `value` should hang from, and on which side.
    /// Returns `None` if the value is already in the tree.
    fn find_parent(&self, root: NodeId, value: &T) -> Option<(NodeId, Side)> {
        let mut current = root;
        loop {
            let node = &self.nodes[current.0];
            let side = match node.value.cmp(value) {
                Ordering::Equal => return None,
                Ordering::Greater => Side::Left,
                Ordering::Less => Side::Right,
            };
            match node.child(side) {
                Some(child) => current = child,
                None => return Some((current, side)),
            }
        }
    }

    /// Walk up from a freshly attached `node`, adjusting balance factors
    /// until a subtree's height stops changing or a rotation fixes it.
    fn modify_balance_factor(&mut self, mut node: NodeId) {
        while let Some(parent) = self.nodes[node.0].parent {
            let delta = if self.nodes[parent.0].left == Some(node) { 1 } else { -1 };
            self.nodes[parent.0].balance_factor += delta;
            match self.nodes[parent.0].balance_factor {
                0 => return,
                -2 | 2 => {
                    self.rotate(node, parent);
                    return;
                }
                _ => node = parent,
            }
        }
    }

    /// Rebalance `parent` (factor ±2) through its child `node`.
    ///
    /// # Panics
    /// On any factor combination insertion cannot produce; continuing
    /// would leave a malformed tree.
    fn rotate(&mut self, node: NodeId, parent: NodeId) {
        let parent_bf = self.nodes[parent.0].balance_factor;
        let node_bf = self.nodes[node.0].balance_factor;
        match (parent_bf, node_bf) {
            (-2, -1 | 0) => self.left_rotation(node, parent),
            (-2, 1) => {
                let pivot = self.inner_child(node, Side::Left);
                let pivot_bf = self.nodes[pivot.0].balance_factor;
                self.right_rotation(pivot, node);
                self.left_rotation(pivot, parent);
                // parent took the pivot's left subtree, node its right
                let (parent_bf, node_bf) = match pivot_bf {
                    -1 => (1, 0),
                    1 => (0, -1),
                    _ => (0, 0),
                };
                self.nodes[parent.0].balance_factor = parent_bf;
                self.nodes[node.0].balance_factor = node_bf;
            }
            (2, 1 | 0) => self.right_rotation(node, parent),
            (2, -1) => {
                let pivot = self.inner_child(node, Side::Right);
                let pivot_bf = self.nodes[pivot.0].balance_factor;
                self.left_rotation(pivot, node);
                self.right_rotation(pivot, parent);
                // node took the pivot's left subtree, parent its right
                let (node_bf, parent_bf) = match pivot_bf {
                    -1 => (1, 0),
                    1 => (0, -1),
                    _ => (0, 0),
                };
                self.nodes[parent.0].balance_factor = parent_bf;
                self.nodes[node.0].balance_factor = node_bf;
            }
            (p, n) => panic!("unexpected AVL balance factors: parent {p}, child {n}"),
        }
    }

    fn inner_child(&self, node: NodeId, side: Side) -> NodeId {
        match self.nodes[node.0].child(side) {
            Some(pivot) => pivot,
            None => panic!("AVL node leaning {side:?} has no {side:?} child"),
        }
    }

    /// Promote `node` (right child of `parent`) into `parent`'s place.
    fn left_rotation(&mut self, node: NodeId, parent: NodeId) {
        trace!(?node, ?parent, "left rotation");
        let grand_parent = self.nodes[parent.0].parent;
        let old_left = self.nodes[node.0].left;

        self.nodes[node.0].left = Some(parent);
        self.nodes[parent.0].right = old_left;
        if let Some(old_left) = old_left {
            self.nodes[old_left.0].parent = Some(parent);
        }
        self.nodes[parent.0].parent = Some(node);
        self.nodes[node.0].parent = grand_parent;
        self.relink(grand_parent, node);

        self.nodes[parent.0].balance_factor = 0;
        self.nodes[node.0].balance_factor = 0;
    }

    /// Promote `node` (left child of `parent`) into `parent`'s place.
    fn right_rotation(&mut self, node: NodeId, parent: NodeId) {
        trace!(?node, ?parent, "right rotation");
        let grand_parent = self.nodes[parent.0].parent;
        let old_right = self.nodes[node.0].right;

        self.nodes[node.0].right = Some(parent);
        self.nodes[parent.0].left = old_right;
        if let Some(old_right) = old_right {
            self.nodes[old_right.0].parent = Some(parent);
        }
        self.nodes[parent.0].parent = Some(node);
        self.nodes[node.0].parent = grand_parent;
        self.relink(grand_parent, node);

        self.nodes[parent.0].balance_factor = 0;
        self.nodes[node.0].balance_factor = 0;
    }

    /// Hang a promoted `node` from `grand_parent`, or make it the root.
    /// The slot is picked by comparing values.
    fn relink(&mut self, grand_parent: Option<NodeId>, node: NodeId) {
        match grand_parent {
            None => self.root = Some(node),
            Some(gp) if self.nodes[gp.0].value > self.nodes[node.0].value => {
                self.nodes[gp.0].left = Some(node);
            }
            Some(gp) => self.nodes[gp.0].right = Some(node),
        }
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

/// Sideways rendering: right subtree on top, two spaces per level.
impl<T: fmt::Display> fmt::Display for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = Vec::new();
        let mut current = self.root.map(|id| (id, 0));
        loop {
            while let Some((id, tab)) = current {
                stack.push((id, tab));
                current = self.nodes[id.0].right.map(|r| (r, tab + 2));
            }
            let Some((id, tab)) = stack.pop() else {
                break;
            };
            writeln!(f, "{:tab$}{}", "", self.nodes[id.0].value)?;
            current = self.nodes[id.0].left.map(|l| (l, tab + 2));
        }
        Ok(())
    }
}

/// In-order iterator over an [`AvlTree`], see [`AvlTree::iter`].
pub struct Iter<'a, T> {
    tree: &'a AvlTree<T>,
    stack: Vec<NodeId>,
    current: Option<NodeId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let nodes = &self.tree.nodes;
        while let Some(id) = self.current {
            self.stack.push(id);
            self.current = nodes[id.0].left;
        }
        let id = self.stack.pop()?;
        self.current = nodes[id.0].right;
        Some(&nodes[id.0].value)
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
