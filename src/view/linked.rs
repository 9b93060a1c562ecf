//! Insertion-order view

use super::{Discipline, Entries, MapView, Plain};
use crate::entry::Entry;
use crate::map::FastMap;
use crate::order::SharedOrder;
use crate::Result;
use std::fmt;
use std::sync::Arc;

/// A view iterating in insertion order
///
/// Creating a linked view switches the underlying map into linked mode for
/// good: from then on every insertion and removal, through any view of the
/// map, maintains the order. Lookups still go through the trie.
///
/// Replacing the value of a present key keeps its position; a key that is
/// removed and inserted again moves to the end.
pub struct LinkedMap<K, V, D = Plain> {
    inner: FastMap<K, V, D>,
}

impl<K, V, D> Clone for LinkedMap<K, V, D> {
    fn clone(&self) -> Self {
        LinkedMap {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V, D> LinkedMap<K, V, D>
where
    K: Clone + 'static,
    V: Clone + 'static,
    D: Discipline,
{
    pub(crate) fn new(inner: FastMap<K, V, D>) -> Self {
        inner.update(|trie| trie.enable_links());
        LinkedMap { inner }
    }

    /// Oldest key still present
    pub fn first_key(&self) -> Option<K> {
        self.inner.read(|trie| trie.head().cloned())
    }

    /// Most recently inserted key
    pub fn last_key(&self) -> Option<K> {
        self.inner.read(|trie| trie.tail().cloned())
    }

    /// The base view this decorates
    pub fn inner(&self) -> &FastMap<K, V, D> {
        &self.inner
    }
}

impl<K, V, D> MapView for LinkedMap<K, V, D>
where
    K: Clone + 'static,
    V: Clone + 'static,
    D: Discipline,
{
    type Key = K;
    type Value = V;

    fn order(&self) -> &SharedOrder<K> {
        self.inner.order()
    }

    fn get_entry(&self, key: &K) -> Option<Arc<Entry<K, V>>> {
        self.inner.get_entry(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn put(&self, key: K, value: V) -> Result<Option<V>> {
        self.inner.put(key, value)
    }

    fn put_if_absent(&self, key: K, value: V) -> Result<Option<V>> {
        self.inner.put_if_absent(key, value)
    }

    fn replace(&self, key: K, value: V) -> Result<Option<V>> {
        self.inner.replace(key, value)
    }

    fn remove(&self, key: &K) -> Result<Option<V>> {
        self.inner.remove(key)
    }

    fn remove_if(&self, key: &K, value: &V) -> Result<bool>
    where
        V: PartialEq,
    {
        self.inner.remove_if(key, value)
    }

    fn replace_if(&self, key: &K, old: &V, new: V) -> Result<bool>
    where
        V: PartialEq,
    {
        self.inner.replace_if(key, old, new)
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    fn entries(&self) -> Entries<'_, K, V> {
        Box::new(self.inner.snapshot().linked_cursor())
    }
}

impl<K, V, D> fmt::Debug for LinkedMap<K, V, D>
where
    K: Clone + fmt::Debug + 'static,
    V: Clone + fmt::Debug + 'static,
    D: Discipline,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries().map(|e| (e.key().clone(), e.value().clone())))
            .finish()
    }
}
