//! AVL tree with owned child links
//!
//! Nodes own their children through `Option<Box<Node>>`; no node is reachable
//! from more than one parent. Insert and delete are recursive and rebalance on
//! the way back up, so every node on the modified path gets a fresh height.

use super::iter::Iter;
use super::{Comparator, NaturalOrder};
use std::cmp::Ordering;

type Link<K, V> = Option<Box<Node<K, V>>>;

/// A single tree node
#[derive(Debug, Clone)]
pub struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    height: usize,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        })
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn left(&self) -> Option<&Node<K, V>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node<K, V>> {
        self.right.as_deref()
    }

    /// Cached height of the subtree rooted here (a leaf has height 1)
    pub fn height(&self) -> usize {
        self.height
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

fn rotate_right<K, V>(mut y: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut x = match y.left.take() {
        Some(x) => x,
        None => return y,
    };
    y.left = x.right.take();
    y.update_height();
    x.right = Some(y);
    x.update_height();
    x
}

fn rotate_left<K, V>(mut x: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut y = match x.right.take() {
        Some(y) => y,
        None => return x,
    };
    x.right = y.left.take();
    x.update_height();
    y.left = Some(x);
    y.update_height();
    y
}

/// Restore `|balance| <= 1` at `node`, assuming both subtrees are AVL trees
///
/// Covers the four rotation cases. The child's balance factor decides between
/// a single and a double rotation, which keeps this correct after deletes as
/// well as inserts.
fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update_height();
    let balance = node.balance_factor();

    if balance > 1 {
        if let Some(left) = node.left.take() {
            // Left-right case
            node.left = Some(if left.balance_factor() < 0 {
                rotate_left(left)
            } else {
                left
            });
        }
        return rotate_right(node);
    }

    if balance < -1 {
        if let Some(right) = node.right.take() {
            // Right-left case
            node.right = Some(if right.balance_factor() > 0 {
                rotate_right(right)
            } else {
                right
            });
        }
        return rotate_left(node);
    }

    node
}

fn insert_at<K, V, C: Comparator<K>>(
    link: Link<K, V>,
    key: K,
    value: V,
    comparator: &C,
    inserted: &mut bool,
) -> Box<Node<K, V>> {
    let mut node = match link {
        Some(node) => node,
        None => {
            *inserted = true;
            return Node::new(key, value);
        }
    };

    match comparator.compare(&key, &node.key) {
        Ordering::Less => {
            node.left = Some(insert_at(
                node.left.take(),
                key,
                value,
                comparator,
                inserted,
            ));
        }
        Ordering::Greater => {
            node.right = Some(insert_at(
                node.right.take(),
                key,
                value,
                comparator,
                inserted,
            ));
        }
        // Existing entry wins
        Ordering::Equal => return node,
    }

    rebalance(node)
}

/// Detach the minimum node of a subtree, returning (rest, minimum)
fn take_min<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.left.take() {
        None => {
            let rest = node.right.take();
            (rest, node)
        }
        Some(left) => {
            let (rest, min) = take_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

fn delete_at<K, V, C: Comparator<K>>(
    link: Link<K, V>,
    key: &K,
    comparator: &C,
    removed: &mut Option<V>,
) -> Link<K, V> {
    let mut node = link?;

    match comparator.compare(key, &node.key) {
        Ordering::Less => node.left = delete_at(node.left.take(), key, comparator, removed),
        Ordering::Greater => node.right = delete_at(node.right.take(), key, comparator, removed),
        Ordering::Equal => {
            let Node {
                value, left, right, ..
            } = *node;
            *removed = Some(value);

            node = match (left, right) {
                (None, right) => return right,
                (left, None) => return left,
                (Some(left), Some(right)) => {
                    // In-order successor takes the removed node's place
                    let (rest, mut successor) = take_min(right);
                    successor.left = Some(left);
                    successor.right = rest;
                    successor
                }
            };
        }
    }

    Some(rebalance(node))
}

/// Balanced binary search tree ordered by a [`Comparator`]
///
/// Inserting a key that is already present leaves the tree untouched.
#[derive(Debug, Clone)]
pub struct OrderedIndex<K, V, C = NaturalOrder> {
    root: Link<K, V>,
    len: usize,
    comparator: C,
}

impl<K: Ord, V> OrderedIndex<K, V, NaturalOrder> {
    /// Create an empty index ordered by `K: Ord`
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K: Ord, V> Default for OrderedIndex<K, V, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> OrderedIndex<K, V, C> {
    /// Create an empty index ordered by a custom comparator
    pub fn with_comparator(comparator: C) -> Self {
        OrderedIndex {
            root: None,
            len: 0,
            comparator,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree (0 when empty)
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn root(&self) -> Option<&Node<K, V>> {
        self.root.as_deref()
    }

    /// Insert a new entry
    ///
    /// Returns `false` and leaves the existing value in place if an equal key
    /// is already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut inserted = false;
        let root = self.root.take();
        self.root = Some(insert_at(root, key, value, &self.comparator, &mut inserted));
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Remove an entry, returning its value if it was present
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let mut removed = None;
        let root = self.root.take();
        self.root = delete_at(root, key, &self.comparator, &mut removed);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Find the node holding `key`
    pub fn search(&self, key: &K) -> Option<&Node<K, V>> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match self.comparator.compare(key, &node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key).map(Node::value)
    }

    /// Mutable access to a value; the key itself stays fixed
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let comparator = &self.comparator;
        let mut cursor = self.root.as_deref_mut();
        while let Some(node) = cursor {
            cursor = match comparator.compare(key, &node.key) {
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            };
        }
        None
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Smallest entry by comparator order
    pub fn first(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some((&node.key, &node.value))
    }

    /// Largest entry by comparator order
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some((&node.key, &node.value))
    }

    /// In-order traversal of `(key, value)` pairs
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref(), self.len)
    }

    /// Keys in ascending comparator order
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Check the AVL property and cached heights of every node
    pub fn is_balanced(&self) -> bool {
        fn check<K, V>(link: &Link<K, V>) -> Option<usize> {
            let node = match link {
                Some(node) => node,
                None => return Some(0),
            };
            let left = check(&node.left)?;
            let right = check(&node.right)?;
            let expected = 1 + left.max(right);
            if left.abs_diff(right) > 1 || node.height != expected {
                return None;
            }
            Some(expected)
        }

        check(&self.root).is_some()
    }

    /// Check that in-order keys are strictly increasing under the comparator
    pub fn is_sorted(&self) -> bool {
        let mut keys = self.keys();
        let mut previous = match keys.next() {
            Some(key) => key,
            None => return true,
        };
        for key in keys {
            if self.comparator.compare(previous, key) != Ordering::Less {
                return false;
            }
            previous = key;
        }
        true
    }
}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a OrderedIndex<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
