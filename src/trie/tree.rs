//! Fractal trie implementation
//!
//! Each level consumes `fanout_bits` of a key's 64-bit index, lowest bits
//! first. Buckets hold at most `split_threshold` entries; when an insertion
//! overfills one, only that bucket is redistributed into a new branch. There
//! is no global rehash, so the worst case of any single operation is bounded
//! by the trie depth and the threshold.

use super::cursor::{Cursor, Iter, LinkedCursor};
use super::TrieNode;
use crate::config::TrieConfig;
use crate::entry::{Entry, Links};
use crate::order::SharedOrder;
use crate::Result;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Head and tail keys of the insertion-order list
pub(crate) struct LinkEnds<K> {
    pub head: Option<K>,
    pub tail: Option<K>,
}

impl<K: Clone> Clone for LinkEnds<K> {
    fn clone(&self) -> Self {
        LinkEnds {
            head: self.head.clone(),
            tail: self.tail.clone(),
        }
    }
}

impl<K> LinkEnds<K> {
    fn empty() -> Self {
        LinkEnds {
            head: None,
            tail: None,
        }
    }
}

/// Shape summary of a trie
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrieStats {
    /// Number of entries
    pub len: usize,
    /// Depth of the deepest bucket (a root bucket has depth 0)
    pub depth: usize,
    /// Number of branch nodes
    pub branches: usize,
    /// Number of bucket nodes, including empty ones
    pub buckets: usize,
    /// Entry count of the fullest bucket
    pub largest_bucket: usize,
}

/// A persistent fractal hashed trie
///
/// Cloning is O(1) and produces an independent snapshot: both copies share
/// every node until one of them is modified, at which point only the path
/// from the root to the touched bucket is rebuilt.
pub struct FractalTrie<K, V> {
    root: Arc<TrieNode<K, V>>,
    len: usize,
    order: SharedOrder<K>,
    config: TrieConfig,
    links: Option<LinkEnds<K>>,
}

impl<K: Clone, V> Clone for FractalTrie<K, V> {
    fn clone(&self) -> Self {
        FractalTrie {
            root: Arc::clone(&self.root),
            len: self.len,
            order: Arc::clone(&self.order),
            config: self.config,
            links: self.links.clone(),
        }
    }
}

impl<K, V> FractalTrie<K, V> {
    /// Create an empty trie with the default shape
    pub fn new(order: SharedOrder<K>) -> Self {
        FractalTrie {
            root: Arc::new(TrieNode::empty()),
            len: 0,
            order,
            config: TrieConfig::default(),
            links: None,
        }
    }

    /// Create an empty trie with an explicit shape
    pub fn with_config(order: SharedOrder<K>, config: TrieConfig) -> Result<Self> {
        config.validate()?;
        Ok(FractalTrie {
            config,
            ..Self::new(order)
        })
    }

    pub fn order(&self) -> &SharedOrder<K> {
        &self.order
    }

    pub fn config(&self) -> &TrieConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether insertion order is being tracked
    pub fn is_linked(&self) -> bool {
        self.links.is_some()
    }

    /// Get a value by key
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_entry(key).map(|entry| entry.value())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get_entry(key).is_some()
    }

    /// Get the stored entry for a key
    pub fn get_entry(&self, key: &K) -> Option<&Arc<Entry<K, V>>> {
        let index = self.order.index_of(key);
        let mut node = &*self.root;
        let mut depth = 0;
        loop {
            match node {
                TrieNode::Bucket(entries) => {
                    return entries.iter().find(|entry| {
                        entry.index() == index && self.order.are_equal(entry.key(), key)
                    });
                }
                TrieNode::Branch { children, .. } => {
                    node = children[self.fragment(index, depth)].as_deref()?;
                    depth += 1;
                }
            }
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.root = Arc::new(TrieNode::empty());
        self.len = 0;
        if let Some(ends) = self.links.as_mut() {
            *ends = LinkEnds::empty();
        }
    }

    /// Borrowing iterator in trie order
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.len)
    }

    /// Owned cursor in trie order, independent of later changes to `self`
    pub fn cursor(&self) -> Cursor<K, V> {
        Cursor::new(Arc::clone(&self.root), self.len)
    }

    /// Owned cursor in insertion order
    ///
    /// Yields nothing unless linked mode has been enabled.
    pub fn linked_cursor(self: &Arc<Self>) -> LinkedCursor<K, V>
    where
        K: Clone,
    {
        LinkedCursor::new(Arc::clone(self))
    }

    /// Compute the shape summary by walking every node
    pub fn stats(&self) -> TrieStats {
        let mut stats = TrieStats {
            len: self.len,
            ..TrieStats::default()
        };
        let mut stack = vec![(&*self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                TrieNode::Bucket(entries) => {
                    stats.buckets += 1;
                    stats.depth = stats.depth.max(depth);
                    stats.largest_bucket = stats.largest_bucket.max(entries.len());
                }
                TrieNode::Branch { children, .. } => {
                    stats.branches += 1;
                    for child in children.iter().flatten() {
                        stack.push((&**child, depth + 1));
                    }
                }
            }
        }
        stats
    }

    pub(crate) fn head(&self) -> Option<&K> {
        self.links.as_ref().and_then(|ends| ends.head.as_ref())
    }

    pub(crate) fn tail(&self) -> Option<&K> {
        self.links.as_ref().and_then(|ends| ends.tail.as_ref())
    }

    /// Whether both tries point at the same root node
    pub(crate) fn shares_root(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &TrieNode<K, V> {
        &self.root
    }

    // === Internal helpers ===

    fn fragment(&self, index: u64, depth: usize) -> usize {
        let shift = depth * self.config.fanout_bits as usize;
        let mask = (1u64 << self.config.fanout_bits) - 1;
        ((index >> shift) & mask) as usize
    }

    /// Build a node at `depth` from entries, splitting when overfull
    fn make_node(&self, entries: Vec<Arc<Entry<K, V>>>, depth: usize) -> TrieNode<K, V> {
        if entries.len() <= self.config.split_threshold || depth > self.config.max_branch_depth()
        {
            return TrieNode::Bucket(entries);
        }

        let len = entries.len();
        let mut groups: Vec<Vec<Arc<Entry<K, V>>>> =
            (0..self.config.fanout()).map(|_| Vec::new()).collect();
        for entry in entries {
            groups[self.fragment(entry.index(), depth)].push(entry);
        }

        trace!(depth, len, "split bucket into branch");
        let children = groups
            .into_iter()
            .map(|group| {
                if group.is_empty() {
                    None
                } else {
                    Some(Arc::new(self.make_node(group, depth + 1)))
                }
            })
            .collect();
        TrieNode::Branch { children, len }
    }

    /// Turn a branch whose subtree fits in one bucket back into a bucket
    fn collapse(
        &self,
        children: Box<[Option<Arc<TrieNode<K, V>>>]>,
        len: usize,
        depth: usize,
    ) -> TrieNode<K, V> {
        let all_buckets = children.iter().flatten().all(|child| child.is_bucket());
        if len > self.config.split_threshold || !all_buckets {
            return TrieNode::Branch { children, len };
        }

        let mut entries = Vec::with_capacity(len);
        for child in children.iter().flatten() {
            if let TrieNode::Bucket(bucket) = &**child {
                entries.extend(bucket.iter().cloned());
            }
        }
        trace!(depth, len, "collapse branch into bucket");
        TrieNode::Bucket(entries)
    }

    fn insert_recursive(
        &self,
        node: &TrieNode<K, V>,
        entry: Arc<Entry<K, V>>,
        depth: usize,
    ) -> (TrieNode<K, V>, Option<Arc<Entry<K, V>>>) {
        match node {
            TrieNode::Bucket(entries) => {
                let mut entries = entries.clone();
                let existing = entries.iter().position(|e| {
                    e.index() == entry.index() && self.order.are_equal(e.key(), entry.key())
                });
                match existing {
                    Some(pos) => {
                        // Same key, replace in place
                        let old = std::mem::replace(&mut entries[pos], entry);
                        (TrieNode::Bucket(entries), Some(old))
                    }
                    None => {
                        entries.push(entry);
                        (self.make_node(entries, depth), None)
                    }
                }
            }
            TrieNode::Branch { children, len } => {
                let slot = self.fragment(entry.index(), depth);
                let (child, old) = match &children[slot] {
                    Some(child) => self.insert_recursive(child, entry, depth + 1),
                    None => (TrieNode::Bucket(vec![entry]), None),
                };

                let mut new_children = children.clone();
                new_children[slot] = Some(Arc::new(child));
                let len = if old.is_some() { *len } else { len + 1 };
                (
                    TrieNode::Branch {
                        children: new_children,
                        len,
                    },
                    old,
                )
            }
        }
    }

    /// Returns `None` when the key is absent, leaving the tree untouched
    fn remove_recursive(
        &self,
        node: &TrieNode<K, V>,
        key: &K,
        index: u64,
        depth: usize,
    ) -> Option<(TrieNode<K, V>, Arc<Entry<K, V>>)> {
        match node {
            TrieNode::Bucket(entries) => {
                let pos = entries
                    .iter()
                    .position(|e| e.index() == index && self.order.are_equal(e.key(), key))?;
                let mut entries = entries.clone();
                let removed = entries.remove(pos);
                Some((TrieNode::Bucket(entries), removed))
            }
            TrieNode::Branch { children, len } => {
                let slot = self.fragment(index, depth);
                let child = children[slot].as_deref()?;
                let (new_child, removed) = self.remove_recursive(child, key, index, depth + 1)?;

                let mut new_children = children.clone();
                new_children[slot] = if new_child.is_empty() {
                    None
                } else {
                    Some(Arc::new(new_child))
                };
                Some((self.collapse(new_children, len - 1, depth), removed))
            }
        }
    }

    fn insert_entry(&mut self, entry: Arc<Entry<K, V>>) -> Option<Arc<Entry<K, V>>> {
        let (root, old) = self.insert_recursive(&self.root, entry, 0);
        self.root = Arc::new(root);
        old
    }
}

impl<K: Clone, V: Clone> FractalTrie<K, V> {
    /// Insert a key-value pair, returning the previous value if the key
    /// was present
    ///
    /// An existing key keeps its stored instance and its position, including
    /// its place in the insertion order.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let index = self.order.index_of(&key);

        if let Some(existing) = self.get_entry(&key) {
            let stored = existing.key().clone();
            let links = existing.links().cloned();
            let old = self.insert_entry(Arc::new(Entry::new(stored, value, index, links)));
            return old.map(unwrap_value);
        }

        let linked_key = self.links.as_ref().map(|_| key.clone());
        let links = self.links.as_ref().map(|ends| Links {
            prev: ends.tail.clone(),
            next: None,
        });
        self.insert_entry(Arc::new(Entry::new(key, value, index, links)));
        self.len += 1;

        if let Some(key) = linked_key {
            self.append_link(key);
        }
        None
    }

    /// Insert only if no equal key exists; returns the existing value
    /// otherwise
    pub fn put_if_absent(&mut self, key: K, value: V) -> Option<V> {
        if let Some(existing) = self.get(&key) {
            return Some(existing.clone());
        }
        self.insert(key, value);
        None
    }

    /// Remove a key, returning its value if it was present
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.order.index_of(key);
        let (root, removed) = self.remove_recursive(&self.root, key, index, 0)?;
        self.root = Arc::new(root);
        self.len -= 1;

        if let Some(links) = removed.links() {
            let links = links.clone();
            self.unlink(links);
        }
        Some(unwrap_value(removed))
    }

    /// Start tracking insertion order
    ///
    /// Existing entries are threaded in their current trie order. This is a
    /// one-time O(n) pass; afterwards every insertion and removal keeps the
    /// links current.
    pub fn enable_links(&mut self) {
        if self.links.is_some() {
            return;
        }

        let keys: Vec<K> = self.iter().map(|(key, _)| key.clone()).collect();
        for (i, key) in keys.iter().enumerate() {
            let links = Links {
                prev: i.checked_sub(1).map(|p| keys[p].clone()),
                next: keys.get(i + 1).cloned(),
            };
            if let Some(entry) = self.get_entry(key) {
                let relinked = Arc::new(entry.relinked(links));
                self.insert_entry(relinked);
            }
        }

        self.links = Some(LinkEnds {
            head: keys.first().cloned(),
            tail: keys.last().cloned(),
        });
        debug!(len = self.len, "enabled insertion-order links");
    }

    fn append_link(&mut self, key: K) {
        let Some(ends) = self.links.as_mut() else {
            return;
        };
        if ends.head.is_none() {
            ends.head = Some(key.clone());
        }
        let previous_tail = ends.tail.replace(key.clone());
        if let Some(tail) = previous_tail {
            self.update_links(&tail, |links| links.next = Some(key));
        }
    }

    fn unlink(&mut self, removed: Links<K>) {
        let Links { prev, next } = removed;

        match &prev {
            Some(prev_key) => {
                let next = next.clone();
                self.update_links(prev_key, |links| links.next = next);
            }
            None => {
                if let Some(ends) = self.links.as_mut() {
                    ends.head = next.clone();
                }
            }
        }

        match &next {
            Some(next_key) => {
                let prev = prev.clone();
                self.update_links(next_key, |links| links.prev = prev);
            }
            None => {
                if let Some(ends) = self.links.as_mut() {
                    ends.tail = prev.clone();
                }
            }
        }
    }

    fn update_links(&mut self, key: &K, update: impl FnOnce(&mut Links<K>)) {
        let Some(entry) = self.get_entry(key) else {
            return;
        };
        let mut links = entry.links().cloned().unwrap_or_default();
        update(&mut links);
        let relinked = Arc::new(entry.relinked(links));
        self.insert_entry(relinked);
    }
}

/// Take the value out of a removed entry, cloning only if a snapshot still
/// holds it
fn unwrap_value<K, V: Clone>(entry: Arc<Entry<K, V>>) -> V {
    Arc::try_unwrap(entry)
        .map(Entry::into_value)
        .unwrap_or_else(|shared| shared.value().clone())
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for FractalTrie<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order;

    fn small_trie() -> FractalTrie<u64, u64> {
        FractalTrie::with_config(order::standard(), TrieConfig::new(2, 2).unwrap()).unwrap()
    }

    #[test]
    fn test_trie_insert_get() {
        let mut trie = FractalTrie::new(order::standard());

        assert_eq!(trie.insert("key1", 1), None);

        assert_eq!(trie.get(&"key1"), Some(&1));
        assert_eq!(trie.get(&"key2"), None);
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_trie_replace_keeps_size() {
        let mut trie = FractalTrie::new(order::standard());
        trie.insert("k", "v1");
        assert_eq!(trie.insert("k", "v2"), Some("v1"));
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get(&"k"), Some(&"v2"));
    }

    #[test]
    fn test_trie_unit_value_is_present() {
        let mut trie: FractalTrie<&str, ()> = FractalTrie::new(order::standard());
        trie.insert("k", ());
        assert_eq!(trie.get(&"k"), Some(&()));
        assert_eq!(trie.get(&"x"), None);
    }

    #[test]
    fn test_trie_split_and_collapse() {
        let mut trie = small_trie();
        for i in 0..100 {
            trie.insert(i, i * 10);
        }
        let stats = trie.stats();
        assert_eq!(stats.len, 100);
        assert!(stats.branches > 0);
        assert!(stats.largest_bucket <= 2);

        for i in 0..100 {
            assert_eq!(trie.get(&i), Some(&(i * 10)));
        }

        for i in 0..99 {
            assert_eq!(trie.remove(&i), Some(i * 10));
        }
        assert_eq!(trie.len(), 1);
        assert!(trie.root().is_bucket());
        assert_eq!(trie.get(&99), Some(&990));
    }

    #[test]
    fn test_trie_remove_missing_keeps_root() {
        let mut trie = small_trie();
        trie.insert(1, 1);
        let before = trie.clone();
        assert_eq!(trie.remove(&2), None);
        assert!(trie.shares_root(&before));
    }

    #[test]
    fn test_trie_colliding_indexes_stay_in_one_bucket() {
        let order = order::custom(|a: &u32, b: &u32| a == b, |_| 0);
        let mut trie = FractalTrie::with_config(order, TrieConfig::new(4, 2).unwrap()).unwrap();
        for i in 0..20 {
            trie.insert(i, i);
        }
        let stats = trie.stats();
        assert_eq!(stats.largest_bucket, 20);
        assert_eq!(stats.depth, trie.config().max_branch_depth() + 1);
        for i in 0..20 {
            assert_eq!(trie.remove(&i), Some(i));
        }
        assert!(trie.is_empty());
        assert!(trie.root().is_bucket());
    }

    #[test]
    fn test_trie_snapshot_is_isolated() {
        let mut trie = small_trie();
        for i in 0..10 {
            trie.insert(i, i);
        }
        let snapshot = trie.clone();
        trie.remove(&3);
        trie.insert(42, 42);

        assert_eq!(snapshot.len(), 10);
        assert_eq!(snapshot.get(&3), Some(&3));
        assert_eq!(snapshot.get(&42), None);
        assert_eq!(trie.get(&3), None);
    }

    #[test]
    fn test_trie_put_if_absent() {
        let mut trie = FractalTrie::new(order::standard());
        assert_eq!(trie.put_if_absent("k", 1), None);
        assert_eq!(trie.put_if_absent("k", 2), Some(1));
        assert_eq!(trie.get(&"k"), Some(&1));
    }

    #[test]
    fn test_trie_links_follow_insertion() {
        let mut trie = small_trie();
        trie.enable_links();
        for key in [5, 1, 9, 3] {
            trie.insert(key, key);
        }
        trie.remove(&1);
        trie.insert(1, 1);
        trie.insert(9, 90);

        let snapshot = Arc::new(trie);
        let order: Vec<u64> = snapshot.linked_cursor().map(|e| *e.key()).collect();
        assert_eq!(order, vec![5, 9, 3, 1]);
        assert_eq!(snapshot.head(), Some(&5));
        assert_eq!(snapshot.tail(), Some(&1));
        assert_eq!(snapshot.get(&9), Some(&90));
    }

    #[test]
    fn test_trie_enable_links_threads_existing() {
        let mut trie = small_trie();
        for i in 0..20 {
            trie.insert(i, i);
        }
        let trie_order: Vec<u64> = trie.iter().map(|(k, _)| *k).collect();
        trie.enable_links();
        let snapshot = Arc::new(trie);
        let linked: Vec<u64> = snapshot.linked_cursor().map(|e| *e.key()).collect();
        assert_eq!(linked, trie_order);
    }

    #[test]
    fn test_trie_clear_resets_links() {
        let mut trie = small_trie();
        trie.enable_links();
        trie.insert(1, 1);
        trie.clear();
        assert!(trie.is_empty());
        assert!(trie.is_linked());
        assert_eq!(trie.head(), None);
        trie.insert(2, 2);
        assert_eq!(trie.head(), Some(&2));
    }

    #[test]
    fn test_trie_rejects_invalid_config() {
        let config = TrieConfig {
            fanout_bits: 0,
            split_threshold: 8,
        };
        assert!(FractalTrie::<u32, u32>::with_config(order::standard(), config).is_err());
    }
}
