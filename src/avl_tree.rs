use std::cmp::Ordering;
use std::iter::FusedIterator;

use tracing::{debug, trace};

use crate::level_order::LevelOrderCursor;

pub(crate) type Link<K> = Option<Box<Node<K>>>;

#[derive(Debug, Clone)]
pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) left: Link<K>,
    pub(crate) right: Link<K>,
    pub(crate) height: usize,
}

impl<K> Node<K> {
    fn new(key: K) -> Self {
        Node {
            key,
            left: None,
            right: None,
            height: 1,
        }
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

/// Height of a possibly absent subtree; an absent subtree has height 0.
pub(crate) fn height<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

fn balance_factor<K>(link: &Link<K>) -> isize {
    link.as_ref().map_or(0, |n| n.balance_factor())
}

/// A height-balanced (AVL) binary search tree of unique keys.
///
/// Every public mutation leaves the tree satisfying the BST ordering, the
/// `|height(left) - height(right)| <= 1` balance rule at every node, and
/// correct cached heights.
///
/// Removing a key held by a node with two children copies the in-order
/// successor's key into that node and then unlinks the successor from the
/// right subtree. The node that held the removed key therefore survives and
/// keeps its position in level order.
///
/// The tree has no internal synchronization. Share it across threads behind
/// a lock.
#[derive(Debug, Clone)]
pub struct BalancedTree<K> {
    root: Link<K>,
    len: usize,
}

impl<K> BalancedTree<K> {
    pub fn new() -> Self {
        BalancedTree { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Height of the tree: 0 when empty, 1 for a single node.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn min(&self) -> Option<&K> {
        self.root.as_deref().map(|n| &Self::find_min(n).key)
    }

    pub fn max(&self) -> Option<&K> {
        let mut current = self.root.as_deref()?;
        while let Some(right) = current.right.as_deref() {
            current = right;
        }
        Some(&current.key)
    }

    /// Checks the balance rule and the cached height of every node.
    pub fn is_balanced(&self) -> bool {
        fn check<K>(link: &Link<K>) -> Option<usize> {
            match link {
                None => Some(0),
                Some(n) => {
                    let left = check(&n.left)?;
                    let right = check(&n.right)?;
                    let expected = 1 + left.max(right);
                    (left.abs_diff(right) <= 1 && n.height == expected).then_some(expected)
                }
            }
        }
        check(&self.root).is_some()
    }

    /// Lazily yields the keys in ascending order. Each call walks the tree afresh.
    pub fn in_order(&self) -> InOrder<'_, K> {
        InOrder::new(&self.root)
    }

    /// Returns a breadth-first cursor positioned before the root.
    pub fn level_order(&self) -> LevelOrderCursor<'_, K> {
        LevelOrderCursor::new(self)
    }

    pub(crate) fn root(&self) -> Option<&Node<K>> {
        self.root.as_deref()
    }

    fn find_min(node: &Node<K>) -> &Node<K> {
        let mut current = node;
        while let Some(left) = current.left.as_deref() {
            current = left;
        }
        current
    }

    fn rotate_right(mut y: Box<Node<K>>) -> Box<Node<K>> {
        let Some(mut x) = y.left.take() else {
            return y;
        };
        trace!(height = y.height, "rotate right");
        y.left = x.right.take();
        y.update_height();
        x.right = Some(y);
        x.update_height();
        x
    }

    fn rotate_left(mut x: Box<Node<K>>) -> Box<Node<K>> {
        let Some(mut y) = x.right.take() else {
            return x;
        };
        trace!(height = x.height, "rotate left");
        x.right = y.left.take();
        x.update_height();
        y.left = Some(x);
        y.update_height();
        y
    }

    // Deletion cases: the removed key is gone, so the child's own balance
    // picks between the single and double rotation.
    fn rebalance_after_remove(mut node: Box<Node<K>>) -> Box<Node<K>> {
        node.update_height();
        let balance = node.balance_factor();

        if balance > 1 {
            if balance_factor(&node.left) < 0 {
                node.left = node.left.take().map(Self::rotate_left);
            }
            return Self::rotate_right(node);
        }

        if balance < -1 {
            if balance_factor(&node.right) > 0 {
                node.right = node.right.take().map(Self::rotate_right);
            }
            return Self::rotate_left(node);
        }

        node
    }
}

impl<K: Ord> BalancedTree<K> {
    pub fn contains(&self, key: &K) -> bool {
        let mut current = &self.root;
        while let Some(n) = current {
            match key.cmp(&n.key) {
                Ordering::Less => current = &n.left,
                Ordering::Greater => current = &n.right,
                Ordering::Equal => return true,
            }
        }
        false
    }

    // Insertion cases: the new key's side of the heavy child decides
    // between the single and double rotation.
    fn rebalance_after_insert(mut node: Box<Node<K>>, key: &K) -> Box<Node<K>> {
        node.update_height();
        let balance = node.balance_factor();

        if balance > 1 {
            if node.left.as_ref().is_some_and(|left| *key > left.key) {
                node.left = node.left.take().map(Self::rotate_left);
            }
            return Self::rotate_right(node);
        }

        if balance < -1 {
            if node.right.as_ref().is_some_and(|right| *key < right.key) {
                node.right = node.right.take().map(Self::rotate_right);
            }
            return Self::rotate_left(node);
        }

        node
    }
}

impl<K: Ord + Clone> BalancedTree<K> {
    /// Inserts `key`, returning `false` if it was already present.
    ///
    /// A duplicate leaves the tree untouched; it is not an error.
    pub fn insert(&mut self, key: K) -> bool {
        let before = self.len;
        self.root = Self::insert_node(self.root.take(), &key, &mut self.len);
        self.len != before
    }

    /// Removes `key`, returning `false` if it was not present.
    pub fn remove(&mut self, key: &K) -> bool {
        let before = self.len;
        self.root = Self::remove_node(self.root.take(), key, &mut self.len);
        self.len != before
    }

    fn insert_node(node: Link<K>, key: &K, len: &mut usize) -> Link<K> {
        let Some(mut n) = node else {
            *len += 1;
            return Some(Box::new(Node::new(key.clone())));
        };
        match key.cmp(&n.key) {
            Ordering::Less => n.left = Self::insert_node(n.left.take(), key, len),
            Ordering::Greater => n.right = Self::insert_node(n.right.take(), key, len),
            Ordering::Equal => return Some(n),
        }
        Some(Self::rebalance_after_insert(n, key))
    }

    fn remove_node(node: Link<K>, key: &K, len: &mut usize) -> Link<K> {
        let mut n = node?;
        match key.cmp(&n.key) {
            Ordering::Less => n.left = Self::remove_node(n.left.take(), key, len),
            Ordering::Greater => n.right = Self::remove_node(n.right.take(), key, len),
            Ordering::Equal => match (n.left.take(), n.right.take()) {
                (None, None) => {
                    *len -= 1;
                    return None;
                }
                (Some(child), None) | (None, Some(child)) => {
                    *len -= 1;
                    return Some(child);
                }
                (Some(left), Some(right)) => {
                    let successor = Self::find_min(&right).key.clone();
                    trace!(height = n.height, "copying in-order successor into removed node");
                    n.right = Self::remove_node(Some(right), &successor, len);
                    n.left = Some(left);
                    n.key = successor;
                }
            },
        }
        Some(Self::rebalance_after_remove(n))
    }
}

impl BalancedTree<u64> {
    /// Builds the canonical tree for `count` replicas by inserting `1..=count`
    /// in ascending order. A zero count yields an empty tree.
    pub fn sequential(count: u64) -> Self {
        let tree: Self = (1..=count).collect();
        debug!(count, height = tree.height(), "built sequential tree");
        tree
    }
}

impl<K> Default for BalancedTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone> FromIterator<K> for BalancedTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = BalancedTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord + Clone> Extend<K> for BalancedTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K> IntoIterator for BalancedTree<K> {
    type Item = K;
    type IntoIter = std::vec::IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        fn collect_in_order<K>(node: Link<K>, result: &mut Vec<K>) {
            if let Some(n) = node {
                let Node { key, left, right, .. } = *n;
                collect_in_order(left, result);
                result.push(key);
                collect_in_order(right, result);
            }
        }
        let mut keys = Vec::with_capacity(self.len);
        collect_in_order(self.root, &mut keys);
        keys.into_iter()
    }
}

impl<'a, K> IntoIterator for &'a BalancedTree<K> {
    type Item = &'a K;
    type IntoIter = InOrder<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.in_order()
    }
}

/// Ascending iterator over the keys of a [`BalancedTree`].
#[derive(Debug, Clone)]
pub struct InOrder<'a, K> {
    stack: Vec<&'a Node<K>>,
}

impl<'a, K> InOrder<'a, K> {
    fn new(root: &'a Link<K>) -> Self {
        let mut iter = InOrder {
            stack: Vec::with_capacity(height(root)),
        };
        iter.push_left_spine(root.as_deref());
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<K>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, K> Iterator for InOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.key)
    }
}

impl<K> FusedIterator for InOrder<'_, K> {}
