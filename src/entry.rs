//! Map entries

use std::fmt;

/// Insertion-order neighbours of an entry, present only in linked mode
#[derive(Clone, Debug)]
pub(crate) struct Links<K> {
    pub prev: Option<K>,
    pub next: Option<K>,
}

impl<K> Default for Links<K> {
    fn default() -> Self {
        Links {
            prev: None,
            next: None,
        }
    }
}

/// A key-value pair stored in the trie
///
/// Entries are immutable once inserted; updates replace the whole entry.
/// The index is the key's `Order::index_of`, cached so that splits and
/// lookups never recompute it for stored keys.
pub struct Entry<K, V> {
    key: K,
    value: V,
    index: u64,
    links: Option<Links<K>>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V, index: u64, links: Option<Links<K>>) -> Self {
        Entry {
            key,
            value,
            index,
            links,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// The placement index of the key
    pub fn index(&self) -> u64 {
        self.index
    }

    pub(crate) fn links(&self) -> Option<&Links<K>> {
        self.links.as_ref()
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }

    /// Copy of this entry with different links
    pub(crate) fn relinked(&self, links: Links<K>) -> Self
    where
        K: Clone,
        V: Clone,
    {
        Entry {
            key: self.key.clone(),
            value: self.value.clone(),
            index: self.index,
            links: Some(links),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}
