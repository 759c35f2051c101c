// =====================================================================
// File: session.rs
//
// Description:
// Defines the `Session` struct, the runtime context behind one shell
// run. It owns one tree of each kind and applies every insertion to
// both, so their contents can be compared side by side.
//
// Responsibilities:
// - Hold the AVL tree (order statistics and range queries).
// - Hold the B-tree (removal and structural validation).
// =====================================================================

use tracing::debug;

use crate::{AvlTree, BTree, BTreeError, ShellConfig};

/// A single in-memory shell session over integer keys.
#[derive(Debug, Clone)]
pub struct Session {
    /// Answers `GET` and `RANGE`.
    pub avl: AvlTree<i64>,

    /// Answers `REMOVE` and `CHECK`.
    pub btree: BTree<i64>,
}

impl Session {
    /// Creates an empty session whose B-tree uses the configured order.
    ///
    /// # Example
    /// ```
    /// use ordtrees::{Session, ShellConfig};
    /// let session = Session::new(&ShellConfig::default()).unwrap();
    /// assert!(session.avl.is_empty());
    /// assert_eq!(session.btree.order(), 5);
    /// ```
    pub fn new(config: &ShellConfig) -> Result<Self, BTreeError> {
        debug!(order = config.order, "starting session");
        Ok(Self {
            avl: AvlTree::new(),
            btree: BTree::new(config.order)?,
        })
    }

    /// Adds `value` to both trees. The AVL tree ignores duplicates while
    /// the B-tree keeps them.
    pub fn add(&mut self, value: i64) {
        self.avl.add(value);
        self.btree.add(value);
    }
}


// =====================================================================
// Unit Tests for Session
// =====================================================================
