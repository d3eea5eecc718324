//! Height-balanced ordered index
//!
//! `OrderedIndex` is an AVL tree keyed through a pluggable [`Comparator`].
//! It backs every lookup structure in the allocator:
//! - bins ordered by `(capacity, id)` for placement searches
//! - bins by id
//! - objects by id (globally, and per bin)
//!
//! Keys are never mutated while a node is attached. Callers that need a new
//! key delete the entry and insert it again.

pub mod avl;
pub mod iter;

pub use avl::{Node, OrderedIndex};
pub use iter::Iter;

use std::cmp::Ordering;

/// Total order over index keys
///
/// Implemented by [`NaturalOrder`] and by any `Fn(&K, &K) -> Ordering` closure.
pub trait Comparator<K> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their `Ord` implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}
