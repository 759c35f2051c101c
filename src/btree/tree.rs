// =====================================================================
// File: btree/tree.rs
//
// Description:
//   Implements the multiway search tree (`BTree`) that manages insertion,
//   lookup, and deletion over `BNode` structures stored in an arena.
//
// Features:
//   - `add`: Inserts a key (duplicates allowed), splitting full nodes
//     bottom-up and growing a new root when the old one overflows.
//   - `remove`: Deletes one occurrence of a key using predecessor or
//     successor replacement, sibling transfer and merging.
//   - `merge_with_child`: Folds a child's keys and children into its parent.
//   - `validate`: Checks every structural invariant of the tree.
//
// Notes:
//   * A node that reaches `order` keys splits, so at rest a node holds at
//     most `order - 1` keys and `order` children.
//   * Every non-root node keeps at least `ceil(order / 2) - 1` keys once a
//     `remove` has completed.
//   * Add and remove walk an explicit path of `(node, child slot)` pairs
//     rather than recursing, and keep every `parent` handle current.
// =====================================================================
use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use tracing::{debug, trace};

use super::{BNode, NodeId};
use crate::error::{BTreeError, Result};

/// Smallest order for which a split leaves both halves non-empty.
pub const MIN_ORDER: usize = 3;

/// Order used by [`BTree::default`].
pub const DEFAULT_ORDER: usize = 5;

/// Path from the root to a node: each entry is a node and the slot of
/// the child that was descended into.
type Path = Vec<(NodeId, usize)>;

/// B-tree over keys of type `T`. The keys are the stored values.
#[derive(Debug, Clone)]
pub struct BTree<T> {
    order: usize,
    nodes: Vec<Option<BNode<T>>>,
    free: Vec<NodeId>,
    root: NodeId,
    len: usize,
}

impl<T> BTree<T> {
    /// Create an empty tree whose nodes split on reaching `order` keys.
    ///
    /// # Errors
    /// [`BTreeError::InvalidOrder`] if `order` is below [`MIN_ORDER`].
    ///
    /// # Example
    /// ```
    /// use ordtrees::BTree;
    /// let tree: BTree<i32> = BTree::new(4).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(BTree::<i32>::new(2).is_err());
    /// ```
    pub fn new(order: usize) -> Result<Self> {
        if order < MIN_ORDER {
            return Err(BTreeError::InvalidOrder {
                order,
                min: MIN_ORDER,
            });
        }
        Ok(Self {
            order,
            nodes: vec![Some(BNode::new(None))],
            free: Vec::new(),
            root: NodeId(0),
            len: 0,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Fewest keys a non-root node may hold after a removal completes.
    pub fn min_keys(&self) -> usize {
        self.order.div_ceil(2) - 1
    }

    /// Number of keys stored in the whole tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Looks up a node by handle; `None` for stale or foreign handles.
    pub fn node(&self, id: NodeId) -> Option<&BNode<T>> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Number of levels, counting the root. An empty tree has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut current = &self[self.root];
        while let Some(&first) = current.children.first() {
            current = &self[first];
            height += 1;
        }
        height
    }

    /// In-order iterator over every key.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
        };
        iter.descend(self.root);
        iter
    }

    /// Replace the keys of a node, for building trees by hand.
    ///
    /// The caller is responsible for keeping the keys sorted and consistent
    /// with the node's children; [`BTree::validate`] reports any mismatch.
    pub fn set_values(&mut self, id: NodeId, values: Vec<T>) -> Result<()> {
        let node = self.node_mut_checked(id)?;
        let old = std::mem::replace(&mut node.values, values);
        let new_len = node.values.len();
        self.len = self.len - old.len() + new_len;
        Ok(())
    }

    /// Append a new child holding `values` to `parent`, for building trees
    /// by hand. Returns the new node's handle.
    pub fn push_child(&mut self, parent: NodeId, values: Vec<T>) -> Result<NodeId> {
        self.node_checked(parent)?;
        let added = values.len();
        let child = self.alloc(BNode::from_parts(values, Vec::new(), Some(parent)));
        self.node_mut(parent).children.push(child);
        self.len += added;
        Ok(child)
    }

    /// Fold `child` into `parent`: the child's keys are spliced into the
    /// parent at the child's slot, and the child's own children take that
    /// slot. A parent that reaches `order` keys is then split.
    ///
    /// # Errors
    /// - [`BTreeError::UnknownNode`] for a stale handle.
    /// - [`BTreeError::NotAChild`] if `child` does not hang under `parent`.
    /// - [`BTreeError::LeafWithSiblings`] if `child` is a leaf and `parent`
    ///   has other children, which would leave `parent` a child short.
    pub fn merge_with_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let slot = self.slot_of(parent, child)?;
        if self.node_checked(child)?.is_leaf() && self[parent].children.len() > 1 {
            return Err(BTreeError::LeafWithSiblings { parent, child });
        }
        self.absorb_child(parent, slot);
        if self[parent].values.len() >= self.order {
            let path = self.path_to(parent)?;
            self.split_upward(path, parent);
        }
        Ok(())
    }

    // =========================
    // Arena helpers
    // =========================

    fn alloc(&mut self, node: BNode<T>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Take a node out of the arena and put its handle on the free list.
    fn release(&mut self, id: NodeId) -> BNode<T> {
        let node = self.nodes[id.0].take();
        self.free.push(id);
        match node {
            Some(node) => node,
            None => panic!("released B-tree node {id:?} twice"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut BNode<T> {
        match self.nodes.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("stale B-tree node handle {id:?}"),
        }
    }

    fn node_checked(&self, id: NodeId) -> Result<&BNode<T>> {
        self.node(id).ok_or(BTreeError::UnknownNode(id))
    }

    fn node_mut_checked(&mut self, id: NodeId) -> Result<&mut BNode<T>> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(BTreeError::UnknownNode(id))
    }

    fn slot_of(&self, parent: NodeId, child: NodeId) -> Result<usize> {
        self.node_checked(child)?;
        self.node_checked(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(BTreeError::NotAChild { parent, child })
    }

    /// Rebuild the root-to-node path by following parent handles.
    fn path_to(&self, id: NodeId) -> Result<Path> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node_checked(current)?.parent {
            path.push((parent, self.slot_of(parent, current)?));
            current = parent;
        }
        path.reverse();
        Ok(path)
    }

    /// Point every child of `id` back at `id`.
    fn adopt_children(&mut self, id: NodeId) {
        for i in 0..self[id].children.len() {
            let child = self[id].children[i];
            self.node_mut(child).parent = Some(id);
        }
    }

    // =========================
    // Structural primitives
    // =========================

    /// Split the full child at `parent.children[i]` around its median.
    ///
    /// The child keeps the keys (and children) left of the median, a new
    /// right sibling takes those right of it, and the median moves up into
    /// `parent` at position `i`.
    fn split_child(&mut self, parent: NodeId, i: usize) {
        let child = self[parent].children[i];
        let full = self.node_mut(child);
        let mid = (full.values.len() - 1) / 2;

        let right_values = full.values.split_off(mid + 1);
        let median = full.values.remove(mid);
        let right_children = if full.is_leaf() {
            Vec::new()
        } else {
            full.children.split_off(mid + 1)
        };

        let right = self.alloc(BNode::from_parts(right_values, right_children, Some(parent)));
        self.adopt_children(right);

        let node = self.node_mut(parent);
        node.values.insert(i, median);
        node.children.insert(i + 1, right);
        debug!(?parent, ?child, ?right, "split node");
    }

    /// Hang the old root under a fresh root and split it there.
    fn split_root(&mut self) -> NodeId {
        let old_root = self.root;
        let new_root = self.alloc(BNode::from_parts(Vec::new(), vec![old_root], None));
        self.node_mut(old_root).parent = Some(new_root);
        self.root = new_root;
        self.split_child(new_root, 0);
        debug!(?new_root, height = self.height(), "grew new root");
        new_root
    }

    /// Split `id` and its ancestors for as long as they hold `order` keys.
    fn split_upward(&mut self, mut path: Path, mut id: NodeId) {
        while self[id].values.len() >= self.order {
            match path.pop() {
                Some((parent, slot)) => {
                    self.split_child(parent, slot);
                    id = parent;
                }
                None => {
                    self.split_root();
                    break;
                }
            }
        }
    }

    /// Splice `parent.children[slot]` into `parent` and release it.
    fn absorb_child(&mut self, parent: NodeId, slot: usize) {
        let child = self.node_mut(parent).children.remove(slot);
        let BNode { values, children, .. } = self.release(child);

        let node = self.node_mut(parent);
        node.values.splice(slot..slot, values);
        node.children.splice(slot..slot, children);
        self.adopt_children(parent);
        debug!(?parent, ?child, "merged child into parent");
    }

    /// Merge `children[idx]`, the separating key and `children[idx + 1]`
    /// into the node at `children[idx]`.
    fn merge_children(&mut self, parent: NodeId, idx: usize) {
        let node = self.node_mut(parent);
        let right = node.children.remove(idx + 1);
        let separator = node.values.remove(idx);
        let left = node.children[idx];

        let BNode { values, children, .. } = self.release(right);
        let merged = self.node_mut(left);
        merged.values.push(separator);
        merged.values.extend(values);
        merged.children.extend(children);
        self.adopt_children(left);
        debug!(?parent, ?left, ?right, "merged siblings");
    }

    /// Child `idx` takes the separator on its left; the left sibling's last
    /// key replaces it, and the sibling's last child moves across with it.
    fn borrow_from_prev(&mut self, parent: NodeId, idx: usize) {
        let left = self[parent].children[idx - 1];
        let child = self[parent].children[idx];

        let sibling = self.node_mut(left);
        let Some(key) = sibling.values.pop() else {
            return;
        };
        let moved = sibling.children.pop();
        let separator = std::mem::replace(&mut self.node_mut(parent).values[idx - 1], key);

        let node = self.node_mut(child);
        node.values.insert(0, separator);
        if let Some(moved) = moved {
            node.children.insert(0, moved);
            self.node_mut(moved).parent = Some(child);
        }
        debug!(?parent, from = ?left, to = ?child, "transferred key from left sibling");
    }

    /// Mirror of [`Self::borrow_from_prev`] using the right sibling.
    fn borrow_from_next(&mut self, parent: NodeId, idx: usize) {
        let right = self[parent].children[idx + 1];
        let child = self[parent].children[idx];

        let sibling = self.node_mut(right);
        if sibling.values.is_empty() {
            return;
        }
        let key = sibling.values.remove(0);
        let moved = (!sibling.children.is_empty()).then(|| sibling.children.remove(0));
        let separator = std::mem::replace(&mut self.node_mut(parent).values[idx], key);

        let node = self.node_mut(child);
        node.values.push(separator);
        if let Some(moved) = moved {
            node.children.push(moved);
            self.node_mut(moved).parent = Some(child);
        }
        debug!(?parent, from = ?right, to = ?child, "transferred key from right sibling");
    }

    /// Restore `parent.children[idx]` to minimum occupancy by transferring a
    /// key from a sibling with spare keys, or else merging with a sibling.
    fn fix_child(&mut self, parent: NodeId, idx: usize) {
        let min = self.min_keys();
        let children = &self[parent].children;
        if self[children[idx]].values.len() >= min || children.len() < 2 {
            return;
        }

        if idx > 0 && self[children[idx - 1]].values.len() > min {
            self.borrow_from_prev(parent, idx);
        } else if idx + 1 < children.len() && self[children[idx + 1]].values.len() > min {
            self.borrow_from_next(parent, idx);
        } else if idx + 1 < children.len() {
            self.merge_children(parent, idx);
        } else {
            self.merge_children(parent, idx - 1);
        }
    }

    /// Promote the sole child of an empty root, shrinking the tree.
    fn collapse_root(&mut self) {
        while self[self.root].values.is_empty() && self[self.root].children.len() == 1 {
            self.absorb_child(self.root, 0);
            debug!(root = ?self.root, "collapsed root");
        }
    }

    fn rightmost_leaf(&self, mut id: NodeId) -> NodeId {
        while let Some(&last) = self[id].children.last() {
            id = last;
        }
        id
    }

    fn leftmost_leaf(&self, mut id: NodeId) -> NodeId {
        while let Some(&first) = self[id].children.first() {
            id = first;
        }
        id
    }

    /// Detach the largest key under `children[slot]` of `id`, recording the
    /// descent in `path`.
    fn take_predecessor(&mut self, path: &mut Path, id: NodeId, slot: usize) -> Option<T> {
        path.push((id, slot));
        let mut current = self[id].children[slot];
        while let Some(last) = self[current].children.len().checked_sub(1) {
            path.push((current, last));
            current = self[current].children[last];
        }
        self.node_mut(current).values.pop()
    }

    /// Detach the smallest key under `children[slot]` of `id`, recording the
    /// descent in `path`.
    fn take_successor(&mut self, path: &mut Path, id: NodeId, slot: usize) -> Option<T> {
        path.push((id, slot));
        let mut current = self[id].children[slot];
        while !self[current].is_leaf() {
            path.push((current, 0));
            current = self[current].children[0];
        }
        let leaf = self.node_mut(current);
        (!leaf.values.is_empty()).then(|| leaf.values.remove(0))
    }
}

impl<T: Ord> BTree<T> {
    /// Insert a key. Duplicates are kept, after any equal keys.
    ///
    /// # Example
    /// ```
    /// use ordtrees::BTree;
    /// let mut tree = BTree::new(5).unwrap();
    /// for v in [50, 10, 3, 15, 27] {
    ///     tree.add(v);
    /// }
    /// let root = tree.node(tree.root()).unwrap();
    /// assert_eq!(root.values(), &[15]);
    /// ```
    pub fn add(&mut self, value: T) {
        let mut path = Vec::new();
        let mut id = self.root;
        while !self[id].is_leaf() {
            let slot = self[id].upper_bound(&value);
            path.push((id, slot));
            id = self[id].children[slot];
        }
        trace!(leaf = ?id, depth = path.len(), "adding to leaf");

        let leaf = self.node_mut(id);
        let pos = leaf.upper_bound(&value);
        leaf.values.insert(pos, value);
        self.len += 1;

        self.split_upward(path, id);
    }

    /// Remove one occurrence of `value`.
    ///
    /// # Errors
    /// [`BTreeError::NotFound`] if the value is absent; the tree is left
    /// untouched in that case.
    pub fn remove(&mut self, value: &T) -> Result<()> {
        let mut path = Vec::new();
        let mut id = self.root;
        loop {
            match self[id].find(value) {
                Some(pos) if self[id].is_leaf() => {
                    self.node_mut(id).values.remove(pos);
                    break;
                }
                Some(pos) => {
                    if let Some(merged) = self.remove_from_internal(&mut path, id, pos) {
                        // the key now sits inside the merged child
                        id = merged;
                        continue;
                    }
                    break;
                }
                None if self[id].is_leaf() => return Err(BTreeError::NotFound),
                None => {
                    let slot = self[id].lower_bound(value);
                    path.push((id, slot));
                    id = self[id].children[slot];
                }
            }
        }
        self.len -= 1;

        while let Some((parent, slot)) = path.pop() {
            self.fix_child(parent, slot);
        }
        self.collapse_root();
        Ok(())
    }

    /// Remove the key at `values[pos]` of internal node `id`.
    ///
    /// Returns the merged child to continue in when the two children around
    /// the key were merged with the key folded in; otherwise the key has
    /// been replaced and `path` leads to the leaf that lost a key.
    fn remove_from_internal(&mut self, path: &mut Path, id: NodeId, pos: usize) -> Option<NodeId> {
        let min = self.min_keys();
        let (left, right) = (self[id].children[pos], self[id].children[pos + 1]);

        let replacement = if self[self.rightmost_leaf(left)].values.len() > min {
            trace!(node = ?id, "replacing with predecessor");
            self.take_predecessor(path, id, pos)
        } else if self[self.leftmost_leaf(right)].values.len() > min {
            trace!(node = ?id, "replacing with successor");
            self.take_successor(path, id, pos + 1)
        } else if self[left].values.len() + self[right].values.len() + 1 < self.order {
            self.merge_children(id, pos);
            path.push((id, pos));
            return Some(left);
        } else {
            self.take_predecessor(path, id, pos)
        };

        if let Some(key) = replacement {
            self.node_mut(id).values[pos] = key;
        }
        None
    }

    pub fn contains(&self, value: &T) -> bool {
        let mut id = self.root;
        loop {
            let node = &self[id];
            let idx = node.lower_bound(value);
            if idx < node.values.len() && node.values[idx] == *value {
                return true;
            }
            if node.is_leaf() {
                return false;
            }
            id = node.children[idx];
        }
    }

    /// Check every structural invariant, reporting the first violation:
    /// key counts, child counts, ordering (including against ancestor
    /// separators), parent handles, equal leaf depth, minimum occupancy of
    /// non-root nodes, and the stored key total.
    pub fn validate(&self) -> Result<()> {
        let violation = |node: NodeId, reason: String| Err(BTreeError::Invariant { node, reason });

        if self[self.root].parent.is_some() {
            return violation(self.root, "root has a parent".into());
        }

        let min = self.min_keys();
        let mut leaf_depth = None;
        let mut count = 0;
        let mut stack: Vec<(NodeId, usize, Option<&T>, Option<&T>)> = vec![(self.root, 0, None, None)];

        while let Some((id, depth, lower, upper)) = stack.pop() {
            let node = self.node_checked(id)?;
            count += node.values.len();

            if node.values.len() >= self.order {
                return violation(id, format!("holds {} keys with order {}", node.values.len(), self.order));
            }
            if id != self.root && node.values.len() < min {
                return violation(id, format!("holds {} keys, minimum is {min}", node.values.len()));
            }
            if node.values.windows(2).any(|w| w[0] > w[1]) {
                return violation(id, "keys out of order".into());
            }
            let below = lower.is_some_and(|l| node.values.first().is_some_and(|v| v < l));
            let above = upper.is_some_and(|u| node.values.last().is_some_and(|v| v > u));
            if below || above {
                return violation(id, "key outside the separator range".into());
            }

            if node.is_leaf() {
                match leaf_depth {
                    None => leaf_depth = Some(depth),
                    Some(d) if d != depth => {
                        return violation(id, format!("leaf at depth {depth}, expected {d}"));
                    }
                    Some(_) => {}
                }
                continue;
            }

            if node.children.len() != node.values.len() + 1 {
                return violation(
                    id,
                    format!("{} keys but {} children", node.values.len(), node.children.len()),
                );
            }
            for (i, &child) in node.children.iter().enumerate() {
                if self.node_checked(child)?.parent != Some(id) {
                    return violation(child, format!("parent handle does not point at {id:?}"));
                }
                let lo = if i == 0 { lower } else { node.values.get(i - 1) };
                let hi = node.values.get(i).or(upper);
                stack.push((child, depth + 1, lo, hi));
            }
        }

        match count.cmp(&self.len) {
            Ordering::Equal => Ok(()),
            _ => violation(self.root, format!("tree holds {count} keys, len is {}", self.len)),
        }
    }
}

impl<T> Index<NodeId> for BTree<T> {
    type Output = BNode<T>;

    /// # Panics
    /// On a stale or foreign handle; use [`BTree::node`] to check first.
    fn index(&self, id: NodeId) -> &BNode<T> {
        match self.nodes.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("stale B-tree node handle {id:?}"),
        }
    }
}

impl<T: Ord> Default for BTree<T> {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            nodes: vec![Some(BNode::new(None))],
            free: Vec::new(),
            root: NodeId(0),
            len: 0,
        }
    }
}

impl<T: Ord> Extend<T> for BTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

/// One line per node, indented two spaces per level, keys joined by `|`.
impl<T: fmt::Display> fmt::Display for BTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self[id];
            write!(f, "{:indent$}", "", indent = depth * 2)?;
            for (i, value) in node.values.iter().enumerate() {
                if i > 0 {
                    write!(f, "|")?;
                }
                write!(f, "{value}")?;
            }
            writeln!(f)?;
            stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }
        Ok(())
    }
}

/// In-order iterator over a [`BTree`], see [`BTree::iter`].
pub struct Iter<'a, T> {
    tree: &'a BTree<T>,
    /// Nodes being visited and the index of their next key.
    stack: Vec<(NodeId, usize)>,
}

impl<T> Iter<'_, T> {
    fn descend(&mut self, mut id: NodeId) {
        loop {
            self.stack.push((id, 0));
            match self.tree[id].children.first() {
                Some(&first) => id = first,
                None => break,
            }
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let tree = self.tree;
        loop {
            let (id, next) = self.stack.last_mut()?;
            let node = &tree[*id];
            if *next >= node.values.len() {
                self.stack.pop();
                continue;
            }
            let value = &node.values[*next];
            *next += 1;
            if let Some(&child) = node.children.get(*next) {
                self.descend(child);
            }
            return Some(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a BTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
