// =====================================================================
// File: btree/tests.rs
//
// Description:
//   Unit tests for the B-tree implementation (`BNode` and `BTree`).
//   Covers node helpers, insertion and splitting, merging a child into
//   its parent, deletion with transfer/merge, and validation.
//
// Notes:
//   * Only compiled when running `cargo test`.
//   * Trees built by hand use `set_values`/`push_child`; children are
//     attached left to right.
// =====================================================================


// =================================================================
// Helpers shared by the test modules below
// =================================================================
#[cfg(test)]
mod support {
    use crate::btree::NodeId;
    use crate::BTree;

    pub fn values(tree: &BTree<i32>, id: NodeId) -> Vec<i32> {
        tree[id].values().to_vec()
    }

    pub fn child(tree: &BTree<i32>, id: NodeId, i: usize) -> NodeId {
        tree[id].children()[i]
    }

    /// Values of every child of `id`, left to right.
    pub fn child_values(tree: &BTree<i32>, id: NodeId) -> Vec<Vec<i32>> {
        tree[id].children().iter().map(|&c| values(tree, c)).collect()
    }

    pub fn build(order: usize, values: &[i32]) -> BTree<i32> {
        let mut tree = BTree::new(order).unwrap();
        tree.extend(values.iter().copied());
        tree
    }
}


// =================================================================
// Unit tests cover node structure and helpers
// =================================================================
#[cfg(test)]
mod node_tests {
    use crate::btree::{DEFAULT_ORDER, MIN_ORDER};
    use crate::{BTree, BTreeError};

    #[test]
    fn test_new_tree_has_leaf_root() {
        let tree: BTree<i32> = BTree::new(4).unwrap();
        let root = &tree[tree.root()];
        assert!(root.values().is_empty());
        assert!(root.children().is_empty());
        assert!(root.is_leaf());
        assert_eq!(root.parent(), None);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.order(), 4);
    }

    #[test]
    fn test_order_below_minimum_rejected() {
        assert_eq!(
            BTree::<i32>::new(2).unwrap_err(),
            BTreeError::InvalidOrder { order: 2, min: MIN_ORDER }
        );
        assert!(BTree::<i32>::new(0).is_err());
        assert!(BTree::<i32>::new(MIN_ORDER).is_ok());
    }

    #[test]
    fn test_default_order() {
        let tree: BTree<i32> = BTree::default();
        assert_eq!(tree.order(), DEFAULT_ORDER);
    }

    #[test]
    fn test_min_keys_per_order() {
        let mins: Vec<usize> = (3..=8).map(|o| BTree::<i32>::new(o).unwrap().min_keys()).collect();
        assert_eq!(mins, vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_bounds_with_duplicates() {
        let mut tree = BTree::new(6).unwrap();
        let root = tree.root();
        tree.set_values(root, vec![10, 20, 20, 30]).unwrap();
        let node = &tree[root];
        assert_eq!(node.lower_bound(&20), 1);
        assert_eq!(node.upper_bound(&20), 3);
        assert_eq!(node.lower_bound(&5), 0);
        assert_eq!(node.upper_bound(&40), 4);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_stale_handle_lookup() {
        let tree: BTree<i32> = BTree::new(4).unwrap();
        let other = {
            let mut bigger = BTree::new(4).unwrap();
            bigger.extend(0..10);
            bigger.root()
        };
        assert!(tree.node(other).is_none());
    }
}


// =================================================================
// Unit tests cover insertion and splitting
// =================================================================
#[cfg(test)]
mod insertion_tests {
    use super::support::{build, child, child_values, values};
    use crate::BTree;

    #[test]
    fn test_addition_sorts() {
        let tree = build(6, &[50, 10, 3, 15]);
        assert_eq!(values(&tree, tree.root()), vec![3, 10, 15, 50]);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    // 3|10|15|27|50 reaches the order and splits around 15
    fn test_addition_splits() {
        let tree = build(5, &[50, 10, 3, 15, 27]);
        let root = tree.root();

        assert_eq!(values(&tree, root), vec![15]);
        let left = child(&tree, root, 0);
        let right = child(&tree, root, 1);
        assert_eq!(values(&tree, left), vec![3, 10]);
        assert_eq!(tree[left].parent(), Some(root));
        assert_eq!(values(&tree, right), vec![27, 50]);
        assert_eq!(tree[right].parent(), Some(root));
        tree.validate().unwrap();
    }

    #[test]
    fn test_addition_in_middle() {
        //        20|30
        //      /   |   \
        //     1    25   45
        let mut tree = BTree::default();
        let root = tree.root();
        tree.set_values(root, vec![20, 30]).unwrap();
        tree.push_child(root, vec![1]).unwrap();
        let mid = tree.push_child(root, vec![25]).unwrap();
        tree.push_child(root, vec![45]).unwrap();

        tree.add(27);

        assert_eq!(values(&tree, mid), vec![25, 27]);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_addition_splits_into_parent() {
        let mut tree = build(5, &[50, 10, 3, 15, 27, 60, 70]);
        let a = tree.root();
        assert_eq!(values(&tree, child(&tree, a, 1)), vec![27, 50, 60, 70]);

        // C fills up, splits around 60 and pushes it into A
        tree.add(80);
        assert_eq!(values(&tree, a), vec![15, 60]);
        let c = child(&tree, a, 1);
        let d = child(&tree, a, 2);
        assert_eq!(values(&tree, c), vec![27, 50]);
        assert_eq!(tree[c].parent(), Some(a));
        assert!(tree[c].is_leaf());
        assert_eq!(values(&tree, d), vec![70, 80]);
        assert_eq!(tree[d].parent(), Some(a));
        assert!(tree[d].is_leaf());
        tree.validate().unwrap();
    }

    #[test]
    fn test_cascading_splits_grow_new_root() {
        let mut tree = build(6, &[100, 200, 300, 400, 500]);
        assert_eq!(values(&tree, tree.root()), vec![100, 200, 300, 400, 500]);

        tree.add(303);
        let a = tree.root();
        assert_eq!(values(&tree, a), vec![300]);
        assert_eq!(child_values(&tree, a), vec![vec![100, 200], vec![303, 400, 500]]);

        tree.extend([175, 125, 150, 325, 350]);
        assert_eq!(
            child_values(&tree, a),
            vec![vec![100, 125, 150, 175, 200], vec![303, 325, 350, 400, 500]]
        );

        tree.add(279);
        assert_eq!(values(&tree, a), vec![150, 300]);
        assert_eq!(
            child_values(&tree, a),
            vec![vec![100, 125], vec![175, 200, 279], vec![303, 325, 350, 400, 500]]
        );

        tree.extend([235, 266]);
        assert_eq!(values(&tree, child(&tree, a, 1)), vec![175, 200, 235, 266, 279]);

        tree.add(272);
        assert_eq!(values(&tree, a), vec![150, 235, 300]);
        assert_eq!(
            child_values(&tree, a),
            vec![
                vec![100, 125],
                vec![175, 200],
                vec![266, 272, 279],
                vec![303, 325, 350, 400, 500],
            ]
        );
        for &c in tree[a].children() {
            assert_eq!(tree[c].parent(), Some(a));
        }

        tree.add(699);
        assert_eq!(values(&tree, a), vec![150, 235, 300, 350]);
        assert_eq!(values(&tree, child(&tree, a, 3)), vec![303, 325]);
        assert_eq!(values(&tree, child(&tree, a, 4)), vec![400, 500, 699]);

        tree.extend([268, 275]);
        assert_eq!(values(&tree, child(&tree, a, 2)), vec![266, 268, 272, 275, 279]);

        tree.add(244);
        assert_eq!(values(&tree, a), vec![150, 235, 268, 300, 350]);
        assert_eq!(
            child_values(&tree, a),
            vec![
                vec![100, 125],
                vec![175, 200],
                vec![244, 266],
                vec![272, 275, 279],
                vec![303, 325],
                vec![400, 500, 699],
            ]
        );

        tree.extend([50, 20, 30]);
        assert_eq!(values(&tree, child(&tree, a, 0)), vec![20, 30, 50, 100, 125]);
        assert_eq!(tree.height(), 2);

        // B overflows into A, which overflows in turn and grows a new root
        tree.add(1);
        let root = tree.root();
        assert_ne!(root, a);
        assert_eq!(tree.height(), 3);
        assert_eq!(values(&tree, root), vec![235]);

        let b = child(&tree, root, 0);
        assert_eq!(values(&tree, b), vec![30, 150]);
        assert_eq!(tree[b].parent(), Some(root));
        assert_eq!(child_values(&tree, b), vec![vec![1, 20], vec![50, 100, 125], vec![175, 200]]);

        let c = child(&tree, root, 1);
        assert_eq!(values(&tree, c), vec![268, 300, 350]);
        assert_eq!(tree[c].parent(), Some(root));
        assert_eq!(
            child_values(&tree, c),
            vec![vec![244, 266], vec![272, 275, 279], vec![303, 325], vec![400, 500, 699]]
        );
        for parent in [b, c] {
            for &grandchild in tree[parent].children() {
                assert_eq!(tree[grandchild].parent(), Some(parent));
            }
        }
        tree.validate().unwrap();
    }

    #[test]
    fn test_duplicates_are_kept() {
        let tree = build(4, &[5, 5, 5, 5, 5]);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![5; 5]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_sequential_inserts_every_order() {
        for order in 3..=8 {
            let tree = build(order, &(0..200).collect::<Vec<_>>());
            tree.validate().unwrap();
            assert_eq!(tree.len(), 200);
            assert_eq!(tree.iter().copied().collect::<Vec<_>>(), (0..200).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_contains() {
        let tree = build(4, &[8, 3, 10, 1, 6, 14, 4, 7, 13]);
        for v in [8, 3, 10, 1, 6, 14, 4, 7, 13] {
            assert!(tree.contains(&v), "missing {v}");
        }
        assert!(!tree.contains(&2));
        assert!(!tree.contains(&100));
    }

    #[test]
    fn test_render() {
        let tree = build(5, &[50, 10, 3, 15, 27]);
        assert_eq!(tree.to_string(), "15\n  3|10\n  27|50\n");
    }
}


// =================================================================
// Unit tests cover merging a child into its parent
// =================================================================
#[cfg(test)]
mod merge_tests {
    use super::support::{child_values, values};
    use crate::{BTree, BTreeError};

    #[test]
    fn test_merge_node() {
        //         100   |   200  |  300   (A)
        //        /      |        |      \
        //     15|20    102  (B)250|270   405
        //                     /    |    \
        //                  202    260   290|299
        let mut tree = BTree::new(7).unwrap();
        let a = tree.root();
        tree.set_values(a, vec![100, 200, 300]).unwrap();
        tree.push_child(a, vec![15, 20]).unwrap();
        tree.push_child(a, vec![102]).unwrap();
        let b = tree.push_child(a, vec![250, 270]).unwrap();
        tree.push_child(b, vec![202]).unwrap();
        tree.push_child(b, vec![260]).unwrap();
        tree.push_child(b, vec![290, 299]).unwrap();
        tree.push_child(a, vec![405]).unwrap();
        assert_eq!(
            child_values(&tree, a),
            vec![vec![15, 20], vec![102], vec![250, 270], vec![405]]
        );

        tree.merge_with_child(a, b).unwrap();

        assert_eq!(values(&tree, a), vec![100, 200, 250, 270, 300]);
        assert_eq!(tree[a].parent(), None);
        assert_eq!(
            child_values(&tree, a),
            vec![vec![15, 20], vec![102], vec![202], vec![260], vec![290, 299], vec![405]]
        );
        for &c in tree[a].children() {
            assert_eq!(tree[c].parent(), Some(a));
        }
        assert!(tree.node(b).is_none());
        assert_eq!(tree.len(), 13);
    }

    #[test]
    fn test_merge_overflow_splits_parent() {
        let mut tree = BTree::new(4).unwrap();
        let r = tree.root();
        tree.set_values(r, vec![100]).unwrap();
        let l = tree.push_child(r, vec![20, 40, 60]).unwrap();
        for v in [10, 30, 50, 70] {
            tree.push_child(l, vec![v]).unwrap();
        }
        tree.push_child(r, vec![150]).unwrap();

        tree.merge_with_child(r, l).unwrap();

        let root = tree.root();
        assert_ne!(root, r);
        assert_eq!(values(&tree, root), vec![40]);
        assert_eq!(child_values(&tree, root), vec![vec![20], vec![60, 100]]);
        assert_eq!(child_values(&tree, r), vec![vec![10], vec![30]]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_merge_leaf_with_siblings_rejected() {
        let mut tree = BTree::new(4).unwrap();
        let root = tree.root();
        tree.set_values(root, vec![10]).unwrap();
        let left = tree.push_child(root, vec![5]).unwrap();
        tree.push_child(root, vec![15]).unwrap();

        assert_eq!(
            tree.merge_with_child(root, left),
            Err(BTreeError::LeafWithSiblings { parent: root, child: left })
        );
        assert_eq!(values(&tree, root), vec![10]);
    }

    #[test]
    fn test_merge_non_child_rejected() {
        let mut tree = BTree::new(4).unwrap();
        let root = tree.root();
        let middle = tree.push_child(root, vec![5]).unwrap();
        let grandchild = tree.push_child(middle, vec![1]).unwrap();

        assert_eq!(
            tree.merge_with_child(root, grandchild),
            Err(BTreeError::NotAChild { parent: root, child: grandchild })
        );
    }

    #[test]
    fn test_merge_only_leaf_child_collapses() {
        let mut tree = BTree::new(4).unwrap();
        let root = tree.root();
        let only = tree.push_child(root, vec![1, 2]).unwrap();

        tree.merge_with_child(root, only).unwrap();
        assert_eq!(values(&tree, root), vec![1, 2]);
        assert!(tree[root].is_leaf());
        tree.validate().unwrap();
    }
}


// =================================================================
// Unit tests for deleting from the tree
// =================================================================
#[cfg(test)]
mod delete_tests {
    use super::support::{build, child_values, values};
    use crate::{BTree, BTreeError};

    /// Order-4 tree with `root_values` and one leaf per entry in `leaves`.
    fn two_level(root_values: Vec<i32>, leaves: &[&[i32]]) -> BTree<i32> {
        let mut tree = BTree::new(4).unwrap();
        let root = tree.root();
        tree.set_values(root, root_values).unwrap();
        for leaf in leaves {
            tree.push_child(root, leaf.to_vec()).unwrap();
        }
        tree.validate().unwrap();
        tree
    }

    #[test]
    fn test_remove_leaf() {
        //          10|20|30 (A)
        //       /    |   |    \
        //  1|2|3  15|16  25   45|55
        let mut tree = two_level(vec![10, 20, 30], &[&[1, 2, 3], &[15, 16], &[25], &[45, 55]]);

        for v in [2, 3, 15, 55] {
            tree.remove(&v).unwrap();
        }

        let root = tree.root();
        assert_eq!(values(&tree, root), vec![10, 20, 30]);
        assert_eq!(child_values(&tree, root), vec![vec![1], vec![16], vec![25], vec![45]]);
        assert_eq!(tree.len(), 7);
        tree.validate().unwrap();
    }

    #[test]
    // The successor's leaf has a spare key, the predecessor's does not
    fn test_remove_internal_uses_successor() {
        let mut tree = two_level(vec![100, 200, 300], &[&[50], &[180], &[250, 260], &[400]]);

        tree.remove(&200).unwrap();

        let root = tree.root();
        assert_eq!(values(&tree, root), vec![100, 250, 300]);
        assert_eq!(child_values(&tree, root), vec![vec![50], vec![180], vec![260], vec![400]]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_remove_internal_uses_predecessor() {
        let mut tree = two_level(vec![100, 200, 300], &[&[50], &[150, 180], &[250], &[400]]);

        tree.remove(&200).unwrap();

        let root = tree.root();
        assert_eq!(values(&tree, root), vec![100, 180, 300]);
        assert_eq!(child_values(&tree, root), vec![vec![50], vec![150], vec![250], vec![400]]);
        tree.validate().unwrap();
    }

    #[test]
    // Neither side has a spare key, so both children merge around the key
    fn test_remove_internal_merges_children() {
        let mut tree = two_level(vec![100, 200, 300], &[&[50], &[180], &[250], &[400]]);

        tree.remove(&200).unwrap();

        let root = tree.root();
        assert_eq!(values(&tree, root), vec![100, 300]);
        assert_eq!(child_values(&tree, root), vec![vec![50], vec![180, 250], vec![400]]);
        assert_eq!(tree.len(), 6);
        tree.validate().unwrap();
    }

    #[test]
    // Order 5 children at minimum are too large to merge around the key
    fn test_remove_internal_falls_back_to_predecessor() {
        let mut tree = BTree::new(5).unwrap();
        let root = tree.root();
        tree.set_values(root, vec![50]).unwrap();
        tree.push_child(root, vec![10, 20]).unwrap();
        tree.push_child(root, vec![60, 70]).unwrap();

        tree.remove(&50).unwrap();

        assert_eq!(values(&tree, tree.root()), vec![10, 20, 60, 70]);
        assert_eq!(tree.height(), 1);
        tree.validate().unwrap();
    }

    #[test]
    fn test_underflow_transfers_from_left_sibling() {
        let mut tree = two_level(vec![100], &[&[20, 50], &[150]]);

        tree.remove(&150).unwrap();

        let root = tree.root();
        assert_eq!(values(&tree, root), vec![50]);
        assert_eq!(child_values(&tree, root), vec![vec![20], vec![100]]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_underflow_transfers_from_right_sibling() {
        let mut tree = two_level(vec![100], &[&[50], &[150, 170]]);

        tree.remove(&50).unwrap();

        let root = tree.root();
        assert_eq!(values(&tree, root), vec![150]);
        assert_eq!(child_values(&tree, root), vec![vec![100], vec![170]]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_underflow_merge_collapses_root() {
        let mut tree = two_level(vec![100], &[&[50], &[150]]);
        let root = tree.root();

        tree.remove(&50).unwrap();

        assert_eq!(tree.root(), root);
        assert_eq!(values(&tree, root), vec![100, 150]);
        assert!(tree[root].is_leaf());
        assert_eq!(tree.height(), 1);
        tree.validate().unwrap();
    }

    #[test]
    fn test_removals_along_left_edge_of_deep_tree() {
        // Order 3 grows to four levels; emptying the left edge merges
        // at every level and shrinks the root.
        let mut tree = build(3, &(1..=15).collect::<Vec<_>>());
        assert_eq!(tree.height(), 4);
        for v in [1, 2, 3, 4] {
            tree.remove(&v).unwrap();
            tree.validate().unwrap();
        }
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), (5..=15).collect::<Vec<_>>());
    }

    #[test]
    fn test_remove_absent_reports_not_found() {
        let mut tree = build(4, &[10, 20, 30, 40, 50]);
        assert_eq!(tree.remove(&35), Err(BTreeError::NotFound));
        assert_eq!(tree.len(), 5);
        tree.validate().unwrap();

        let mut empty: BTree<i32> = BTree::new(4).unwrap();
        assert_eq!(empty.remove(&1), Err(BTreeError::NotFound));
    }

    #[test]
    fn test_remove_duplicates_one_at_a_time() {
        let mut tree = build(4, &[7, 7, 7, 3, 9]);
        tree.remove(&7).unwrap();
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![3, 7, 7, 9]);
        tree.remove(&7).unwrap();
        tree.remove(&7).unwrap();
        assert_eq!(tree.remove(&7), Err(BTreeError::NotFound));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![3, 9]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_delete_until_empty() {
        for order in 3..=7 {
            let mut tree = build(order, &(0..50).collect::<Vec<_>>());
            let mut remaining: Vec<i32> = (0..50).collect();
            for step in 0..50 {
                let v = (step * 7) % 50;
                tree.remove(&v).unwrap();
                remaining.retain(|&r| r != v);
                tree.validate().unwrap();
                assert_eq!(tree.iter().copied().collect::<Vec<_>>(), remaining);
            }
            assert!(tree.is_empty());
            assert!(tree[tree.root()].is_leaf());
            assert!(tree[tree.root()].values().is_empty());
        }
    }

    #[test]
    fn test_released_nodes_are_reused() {
        let mut tree = build(3, &(0..30).collect::<Vec<_>>());
        for v in 0..25 {
            tree.remove(&v).unwrap();
        }
        tree.extend(100..125);
        tree.validate().unwrap();
        assert_eq!(tree.len(), 30);
    }
}


// =================================================================
// Unit tests for invariant validation
// =================================================================
#[cfg(test)]
mod validate_tests {
    use crate::{BTree, BTreeError};

    #[test]
    fn test_reports_unsorted_keys() {
        let mut tree = BTree::new(5).unwrap();
        let root = tree.root();
        tree.set_values(root, vec![3, 1]).unwrap();
        assert!(matches!(tree.validate(), Err(BTreeError::Invariant { node, .. }) if node == root));
    }

    #[test]
    fn test_reports_missing_child() {
        let mut tree = BTree::new(5).unwrap();
        let root = tree.root();
        tree.set_values(root, vec![10, 20]).unwrap();
        tree.push_child(root, vec![5]).unwrap();
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_reports_unequal_leaf_depth() {
        let mut tree = BTree::new(5).unwrap();
        let root = tree.root();
        tree.set_values(root, vec![10]).unwrap();
        let left = tree.push_child(root, vec![5]).unwrap();
        tree.push_child(root, vec![15]).unwrap();
        tree.set_values(left, vec![3, 5]).unwrap();
        tree.push_child(left, vec![1]).unwrap();
        tree.push_child(left, vec![4]).unwrap();
        tree.push_child(left, vec![6]).unwrap();
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_reports_separator_violation() {
        let mut tree = BTree::new(5).unwrap();
        let root = tree.root();
        tree.set_values(root, vec![10]).unwrap();
        tree.push_child(root, vec![12]).unwrap();
        tree.push_child(root, vec![15]).unwrap();
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_reports_overfull_node() {
        let mut tree = BTree::new(3).unwrap();
        let root = tree.root();
        tree.set_values(root, vec![1, 2, 3]).unwrap();
        assert!(tree.validate().is_err());
    }
}
