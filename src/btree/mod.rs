// =====================================================================
// File: btree/mod.rs
//
//! The `btree` module contains the multiway search tree.
//!
//! Structure:
//! - `node.rs`  : Defines [`BNode`] and the [`NodeId`] handle.
//! - `tree.rs`  : Defines [`BTree`] and its algorithms
//!                (add, remove, merge, validate).
//! - `tests.rs` : Unit tests for the B-tree (compiled only in test mode).
//!
//! Nodes live in an arena owned by the tree; children and parents are
//! referenced by handle, so a parent link never owns anything.
// =====================================================================

pub mod node;
pub mod tree;

pub use self::node::{BNode, NodeId};
pub use self::tree::{BTree, DEFAULT_ORDER, Iter, MIN_ORDER};

#[cfg(test)]
pub mod tests;
