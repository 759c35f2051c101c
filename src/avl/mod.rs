// =====================================================================
// File: avl/mod.rs
//
//! The `avl` module contains the height-balanced binary search tree.
//!
//! Structure:
//! - `node.rs`  : Defines [`AvlNode`] and its [`NodeId`] handle.
//! - `tree.rs`  : Defines [`AvlTree`] (add, get, range, iteration).
//! - `tests.rs` : Unit tests (compiled only in test mode).
// =====================================================================

pub mod node;
pub mod tree;

pub use self::node::{AvlNode, NodeId};
pub use self::tree::{AvlTree, Iter};
