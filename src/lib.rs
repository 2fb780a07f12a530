//! A height-balanced binary search tree and a breadth-first cursor over it.
//!
//! [`BalancedTree::sequential`] builds the canonical tree for a replica count,
//! [`BalancedTree::level_order`] walks it exposing each node's key and child
//! keys, and [`BalancedTree::contains`] answers membership queries.

mod avl_tree;
mod error;
mod level_order;

pub use avl_tree::{BalancedTree, InOrder};
pub use error::{Result, TreeError};
pub use level_order::{LevelOrderCursor, NodeRef};
