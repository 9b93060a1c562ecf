//! User-supplied orders

use super::Order;
use std::cmp::Ordering;
use std::fmt;

type EqualityFn<K> = Box<dyn Fn(&K, &K) -> bool + Send + Sync>;
type IndexFn<K> = Box<dyn Fn(&K) -> u64 + Send + Sync>;
type CompareFn<K> = Box<dyn Fn(&K, &K) -> Ordering + Send + Sync>;

/// An order built from closures
///
/// The caller is responsible for keeping equality and index consistent.
/// Without an explicit comparator, `compare` falls back to index order.
pub struct CustomOrder<K> {
    are_equal: EqualityFn<K>,
    index_of: IndexFn<K>,
    compare: Option<CompareFn<K>>,
}

impl<K> CustomOrder<K> {
    pub fn new<E, I>(are_equal: E, index_of: I) -> Self
    where
        E: Fn(&K, &K) -> bool + Send + Sync + 'static,
        I: Fn(&K) -> u64 + Send + Sync + 'static,
    {
        CustomOrder {
            are_equal: Box::new(are_equal),
            index_of: Box::new(index_of),
            compare: None,
        }
    }

    /// Attach a comparator for sorted views
    pub fn with_compare<C>(mut self, compare: C) -> Self
    where
        C: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        self.compare = Some(Box::new(compare));
        self
    }
}

impl<K> fmt::Debug for CustomOrder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomOrder")
            .field("has_compare", &self.compare.is_some())
            .finish()
    }
}

impl<K> Order<K> for CustomOrder<K> {
    fn are_equal(&self, left: &K, right: &K) -> bool {
        (self.are_equal)(left, right)
    }

    fn index_of(&self, key: &K) -> u64 {
        (self.index_of)(key)
    }

    fn compare(&self, left: &K, right: &K) -> Ordering {
        match &self.compare {
            Some(compare) => compare(left, right),
            None => self.index_of(left).cmp(&self.index_of(right)),
        }
    }
}
