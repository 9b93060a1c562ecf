//! Hash-based orders

use super::{hash_index, Order};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Equality from `Eq`, placement from `Hash`, comparison by hash index
pub struct StandardOrder<K> {
    _key: PhantomData<fn(&K)>,
}

impl<K> StandardOrder<K> {
    pub fn new() -> Self {
        StandardOrder { _key: PhantomData }
    }
}

impl<K> Default for StandardOrder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for StandardOrder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StandardOrder")
    }
}

impl<K: Hash + Eq> Order<K> for StandardOrder<K> {
    fn are_equal(&self, left: &K, right: &K) -> bool {
        left == right
    }

    fn index_of(&self, key: &K) -> u64 {
        hash_index(key)
    }
}

/// Equality and comparison from `Ord`, placement from `Hash`
///
/// Use this order when sorted views should follow the key's natural order
/// rather than hash order.
pub struct NaturalOrder<K> {
    _key: PhantomData<fn(&K)>,
}

impl<K> NaturalOrder<K> {
    pub fn new() -> Self {
        NaturalOrder { _key: PhantomData }
    }
}

impl<K> Default for NaturalOrder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for NaturalOrder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NaturalOrder")
    }
}

impl<K: Ord + Hash> Order<K> for NaturalOrder<K> {
    fn are_equal(&self, left: &K, right: &K) -> bool {
        left.cmp(right) == Ordering::Equal
    }

    fn index_of(&self, key: &K) -> u64 {
        hash_index(key)
    }

    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order_equality() {
        let order = StandardOrder::<u32>::new();
        assert!(order.are_equal(&7, &7));
        assert!(!order.are_equal(&7, &8));
        assert_eq!(order.index_of(&7), order.index_of(&7));
    }

    #[test]
    fn test_standard_compare_follows_index() {
        let order = StandardOrder::<u32>::new();
        let expected = order.index_of(&1).cmp(&order.index_of(&2));
        assert_eq!(order.compare(&1, &2), expected);
    }

    #[test]
    fn test_natural_compare_follows_ord() {
        let order = NaturalOrder::<i64>::new();
        assert_eq!(order.compare(&-3, &10), Ordering::Less);
        assert_eq!(order.compare(&10, &10), Ordering::Equal);
        assert_eq!(order.compare(&11, &10), Ordering::Greater);
    }
}
