use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;

use tracing::warn;

use crate::avl_tree::{BalancedTree, Node};
use crate::error::{Result, TreeError};

/// Read-only view of a tree node handed out by [`LevelOrderCursor`].
///
/// Exposes the node's key and the keys of its immediate children, which is
/// what a caller needs to label a unit and link it to its structural children.
pub struct NodeRef<'a, K> {
    node: &'a Node<K>,
}

impl<'a, K> NodeRef<'a, K> {
    pub fn key(&self) -> &'a K {
        &self.node.key
    }

    pub fn left_key(&self) -> Option<&'a K> {
        self.node.left.as_deref().map(|n| &n.key)
    }

    pub fn right_key(&self) -> Option<&'a K> {
        self.node.right.as_deref().map(|n| &n.key)
    }

    pub fn left(&self) -> Option<NodeRef<'a, K>> {
        self.node.left.as_deref().map(|node| NodeRef { node })
    }

    pub fn right(&self) -> Option<NodeRef<'a, K>> {
        self.node.right.as_deref().map(|node| NodeRef { node })
    }

    /// Height of the subtree rooted here; a leaf has height 1.
    pub fn height(&self) -> usize {
        self.node.height
    }

    pub fn is_leaf(&self) -> bool {
        self.node.left.is_none() && self.node.right.is_none()
    }
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("left", &self.left_key())
            .field("right", &self.right_key())
            .field("height", &self.height())
            .finish()
    }
}

/// Breadth-first cursor over a [`BalancedTree`]: nodes are visited by depth,
/// left to right within a depth.
///
/// The cursor borrows the tree, so the tree cannot be mutated while the
/// cursor is alive. It is single pass; build a new one to start over.
///
/// ```
/// use balanced_tree::BalancedTree;
///
/// let tree = BalancedTree::sequential(3);
/// let mut cursor = tree.level_order();
/// while cursor.has_next() {
///     let node = cursor.next_node().unwrap();
///     println!("{} -> {:?} {:?}", node.key(), node.left_key(), node.right_key());
/// }
/// ```
pub struct LevelOrderCursor<'a, K> {
    queue: VecDeque<&'a Node<K>>,
}

impl<'a, K> LevelOrderCursor<'a, K> {
    pub fn new(tree: &'a BalancedTree<K>) -> Self {
        let mut queue = VecDeque::new();
        if let Some(root) = tree.root() {
            queue.push_back(root);
        }
        LevelOrderCursor { queue }
    }

    pub fn has_next(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of nodes queued for the next level-order steps. This is a lower
    /// bound on what is left, not the total.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Advances the cursor.
    ///
    /// Calling this once [`has_next`](Self::has_next) is false is a contract
    /// violation and returns [`TreeError::ExhaustedIterator`].
    pub fn next_node(&mut self) -> Result<NodeRef<'a, K>> {
        let Some(node) = self.queue.pop_front() else {
            warn!("level-order cursor advanced past its last node");
            return Err(TreeError::ExhaustedIterator);
        };
        if let Some(left) = node.left.as_deref() {
            self.queue.push_back(left);
        }
        if let Some(right) = node.right.as_deref() {
            self.queue.push_back(right);
        }
        Ok(NodeRef { node })
    }
}

impl<'a, K> Iterator for LevelOrderCursor<'a, K> {
    type Item = NodeRef<'a, K>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        self.next_node().ok()
    }
}

impl<K> FusedIterator for LevelOrderCursor<'_, K> {}
