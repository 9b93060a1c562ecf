//! Sorted view

use super::{Entries, MapView, SubMap};
use crate::entry::Entry;
use crate::order::SharedOrder;
use crate::Result;
use std::ops::Bound;
use std::sync::Arc;

/// A view iterating in ascending `Order::compare` order
///
/// Sorting happens per iteration over a snapshot; lookups and mutations go
/// straight to the wrapped view. Entries that compare equal keep the
/// iteration order of the wrapped view.
#[derive(Clone, Debug)]
pub struct OrderedMap<M> {
    inner: M,
}

impl<M: MapView> OrderedMap<M> {
    pub(crate) fn new(inner: M) -> Self {
        OrderedMap { inner }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Smallest key
    pub fn first_key(&self) -> Option<M::Key> {
        let order = self.inner.order();
        self.inner
            .keys()
            .min_by(|left, right| order.compare(left, right))
    }

    /// Largest key
    pub fn last_key(&self) -> Option<M::Key> {
        let order = self.inner.order();
        self.inner
            .keys()
            .max_by(|left, right| order.compare(left, right))
    }

    /// Entries from the largest key to the smallest
    pub fn descending_entries(&self) -> Entries<'_, M::Key, M::Value> {
        Box::new(self.sorted().into_iter().rev())
    }

    /// Ordered view of the keys between two bounds
    pub fn sub_map(
        &self,
        from: Bound<M::Key>,
        to: Bound<M::Key>,
    ) -> Result<OrderedMap<SubMap<M>>>
    where
        M: Clone,
    {
        SubMap::window(self.inner.clone(), from, to).map(OrderedMap::new)
    }

    /// Ordered view of the keys strictly below `to`
    pub fn head_map(&self, to: M::Key) -> Result<OrderedMap<SubMap<M>>>
    where
        M: Clone,
    {
        self.sub_map(Bound::Unbounded, Bound::Excluded(to))
    }

    /// Ordered view of the keys from `from` upwards
    pub fn tail_map(&self, from: M::Key) -> Result<OrderedMap<SubMap<M>>>
    where
        M: Clone,
    {
        self.sub_map(Bound::Included(from), Bound::Unbounded)
    }

    fn sorted(&self) -> Vec<Arc<Entry<M::Key, M::Value>>> {
        let order = self.inner.order();
        let mut entries: Vec<_> = self.inner.entries().collect();
        entries.sort_by(|left, right| order.compare(left.key(), right.key()));
        entries
    }
}

impl<M: MapView> MapView for OrderedMap<M> {
    type Key = M::Key;
    type Value = M::Value;

    fn order(&self) -> &SharedOrder<M::Key> {
        self.inner.order()
    }

    fn get_entry(&self, key: &M::Key) -> Option<Arc<Entry<M::Key, M::Value>>> {
        self.inner.get_entry(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn put(&self, key: M::Key, value: M::Value) -> Result<Option<M::Value>> {
        self.inner.put(key, value)
    }

    fn put_if_absent(&self, key: M::Key, value: M::Value) -> Result<Option<M::Value>> {
        self.inner.put_if_absent(key, value)
    }

    fn replace(&self, key: M::Key, value: M::Value) -> Result<Option<M::Value>> {
        self.inner.replace(key, value)
    }

    fn remove(&self, key: &M::Key) -> Result<Option<M::Value>> {
        self.inner.remove(key)
    }

    fn remove_if(&self, key: &M::Key, value: &M::Value) -> Result<bool>
    where
        M::Value: PartialEq,
    {
        self.inner.remove_if(key, value)
    }

    fn replace_if(&self, key: &M::Key, old: &M::Value, new: M::Value) -> Result<bool>
    where
        M::Value: PartialEq,
    {
        self.inner.replace_if(key, old, new)
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    fn entries(&self) -> Entries<'_, M::Key, M::Value> {
        Box::new(self.sorted().into_iter())
    }
}
