//! Base map views

use crate::config::TrieConfig;
use crate::entry::Entry;
use crate::order::{self, SharedOrder};
use crate::trie::{FractalTrie, TrieStats};
use crate::view::{Atomic, Discipline, Entries, LinkedMap, MapView, Plain, Shared, Storage};
use crate::Result;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

/// A fractal hashed-trie map
///
/// `FastMap` is a handle on shared storage: cloning it, or deriving a view
/// with [`atomic`](FastMap::atomic), [`shared`](FastMap::shared),
/// [`linked`](FastMap::linked) or any [`MapView`] adapter, gives another view
/// of the same entries. Use [`copy`](FastMap::copy) for an independent map.
///
/// The discipline `D` decides how writes are published:
/// - [`Plain`]: no synchronization between writers
/// - [`Atomic`]: lock-free compare-and-swap, linearizable
/// - [`Shared`]: writers serialized by a lock, readers concurrent
///
/// ```
/// use fractal_map::{FastMap, MapView};
///
/// let map = FastMap::<&str, i32>::new().atomic();
/// map.put("a", 1)?;
/// assert_eq!(map.get(&"a"), Some(1));
/// # Ok::<(), fractal_map::Error>(())
/// ```
pub struct FastMap<K, V, D = Plain> {
    storage: Arc<Storage<K, V>>,
    _discipline: PhantomData<D>,
}

/// A map whose writes are published by compare-and-swap
pub type AtomicMap<K, V> = FastMap<K, V, Atomic>;

/// A map whose writes are serialized by a read-write lock
pub type SharedMap<K, V> = FastMap<K, V, Shared>;

impl<K, V, D> Clone for FastMap<K, V, D> {
    fn clone(&self) -> Self {
        FastMap {
            storage: Arc::clone(&self.storage),
            _discipline: PhantomData,
        }
    }
}

impl<K, V> FastMap<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    /// Create an empty map with the standard (`Hash` + `Eq`) order
    pub fn new() -> Self {
        Self::with_order(order::standard())
    }
}

impl<K, V> Default for FastMap<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FastMap<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    /// Create an empty map with a custom order and default trie shape
    pub fn with_order(order: SharedOrder<K>) -> Self {
        Self::from_trie(FractalTrie::new(order))
    }

    /// Create an empty map with a custom order and trie shape
    pub fn with_config(order: SharedOrder<K>, config: TrieConfig) -> Result<Self> {
        Ok(Self::from_trie(FractalTrie::with_config(order, config)?))
    }

    /// Atomic view of the same storage
    pub fn atomic(&self) -> AtomicMap<K, V> {
        self.with_discipline()
    }

    /// Shared (lock-based) view of the same storage
    pub fn shared(&self) -> SharedMap<K, V> {
        self.with_discipline()
    }
}

impl<K, V, D> FastMap<K, V, D>
where
    K: Clone + 'static,
    V: Clone + 'static,
    D: Discipline,
{
    pub(crate) fn from_trie(trie: FractalTrie<K, V>) -> Self {
        FastMap {
            storage: Arc::new(Storage::new(trie)),
            _discipline: PhantomData,
        }
    }

    fn with_discipline<E: Discipline>(&self) -> FastMap<K, V, E> {
        FastMap {
            storage: Arc::clone(&self.storage),
            _discipline: PhantomData,
        }
    }

    /// Insertion-order view of the same storage
    ///
    /// The storage stays in linked mode afterwards.
    pub fn linked(&self) -> LinkedMap<K, V, D> {
        LinkedMap::new(self.clone())
    }

    /// The current state as an immutable trie
    pub fn snapshot(&self) -> Arc<FractalTrie<K, V>> {
        D::snapshot(&self.storage)
    }

    /// An independent map starting from the current state
    ///
    /// Nodes are shared with this map until either side changes them.
    pub fn copy(&self) -> Self {
        Self::from_trie((*self.snapshot()).clone())
    }

    pub fn config(&self) -> TrieConfig {
        self.read(|trie| *trie.config())
    }

    pub fn stats(&self) -> TrieStats {
        self.read(FractalTrie::stats)
    }

    /// Name of the write discipline
    pub fn discipline(&self) -> &'static str {
        D::NAME
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&FractalTrie<K, V>) -> R) -> R {
        D::read(&self.storage, f)
    }

    pub(crate) fn update<R>(&self, f: impl FnMut(&mut FractalTrie<K, V>) -> R) -> R {
        D::write(&self.storage, f)
    }
}

impl<K, V, D> MapView for FastMap<K, V, D>
where
    K: Clone + 'static,
    V: Clone + 'static,
    D: Discipline,
{
    type Key = K;
    type Value = V;

    fn order(&self) -> &SharedOrder<K> {
        self.storage.order()
    }

    fn get_entry(&self, key: &K) -> Option<Arc<Entry<K, V>>> {
        self.read(|trie| trie.get_entry(key).cloned())
    }

    fn len(&self) -> usize {
        self.read(FractalTrie::len)
    }

    fn put(&self, key: K, value: V) -> Result<Option<V>> {
        Ok(self.update(|trie| trie.insert(key.clone(), value.clone())))
    }

    fn put_if_absent(&self, key: K, value: V) -> Result<Option<V>> {
        Ok(self.update(|trie| trie.put_if_absent(key.clone(), value.clone())))
    }

    fn replace(&self, key: K, value: V) -> Result<Option<V>> {
        Ok(self.update(|trie| {
            if trie.contains_key(&key) {
                trie.insert(key.clone(), value.clone())
            } else {
                None
            }
        }))
    }

    fn remove(&self, key: &K) -> Result<Option<V>> {
        Ok(self.update(|trie| trie.remove(key)))
    }

    fn remove_if(&self, key: &K, value: &V) -> Result<bool>
    where
        V: PartialEq,
    {
        Ok(self.update(|trie| {
            if trie.get(key) != Some(value) {
                return false;
            }
            trie.remove(key).is_some()
        }))
    }

    fn replace_if(&self, key: &K, old: &V, new: V) -> Result<bool>
    where
        V: PartialEq,
    {
        Ok(self.update(|trie| {
            if trie.get(key) != Some(old) {
                return false;
            }
            trie.insert(key.clone(), new.clone());
            true
        }))
    }

    fn clear(&self) -> Result<()> {
        self.update(FractalTrie::clear);
        Ok(())
    }

    fn entries(&self) -> Entries<'_, K, V> {
        Box::new(self.snapshot().cursor())
    }

    fn is_empty(&self) -> bool {
        self.read(FractalTrie::is_empty)
    }
}

impl<K, V> FromIterator<(K, V)> for FastMap<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut trie = FractalTrie::new(order::standard());
        for (key, value) in iter {
            trie.insert(key, value);
        }
        Self::from_trie(trie)
    }
}

impl<K, V, D> Extend<(K, V)> for FastMap<K, V, D>
where
    K: Clone + 'static,
    V: Clone + 'static,
    D: Discipline,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let pairs: Vec<(K, V)> = iter.into_iter().collect();
        self.update(|trie| {
            for (key, value) in &pairs {
                trie.insert(key.clone(), value.clone());
            }
        });
    }
}

impl<K, V, D> fmt::Debug for FastMap<K, V, D>
where
    K: Clone + fmt::Debug + 'static,
    V: Clone + fmt::Debug + 'static,
    D: Discipline,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_map().entries(snapshot.iter()).finish()
    }
}

impl<K, V, D, E> PartialEq<FastMap<K, V, E>> for FastMap<K, V, D>
where
    K: Clone + 'static,
    V: Clone + PartialEq + 'static,
    D: Discipline,
    E: Discipline,
{
    fn eq(&self, other: &FastMap<K, V, E>) -> bool {
        self.content_eq(other)
    }
}
