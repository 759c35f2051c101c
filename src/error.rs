// =====================================================================
// File: error.rs
//
// Description:
//   Error types shared by the B-tree and the shell. The AVL tree has
//   no fallible operations: duplicates are ignored and out-of-range
//   lookups return `None`.
// =====================================================================
use thiserror::Error;

use crate::btree::NodeId;

/// Errors reported by [`BTree`](crate::BTree) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BTreeError {
    #[error("B-tree order must be at least {min}, got {order}")]
    InvalidOrder { order: usize, min: usize },

    #[error("value not found in tree")]
    NotFound,

    #[error("node {0:?} does not belong to this tree")]
    UnknownNode(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("cannot merge leaf {child:?} into {parent:?} while it has siblings")]
    LeafWithSiblings { parent: NodeId, child: NodeId },

    /// Reported by [`BTree::validate`](crate::BTree::validate).
    #[error("invariant violated at {node:?}: {reason}")]
    Invariant { node: NodeId, reason: String },
}

/// Result type alias for B-tree operations.
pub type Result<T> = std::result::Result<T, BTreeError>;
