//! Write disciplines
//!
//! A discipline decides how a base view publishes a new trie root. All three
//! build the new root the same way (copy-on-write from the current one); they
//! differ only in how the swap is protected.

use crate::order::SharedOrder;
use crate::trie::FractalTrie;
use arc_swap::{ArcSwap, Guard};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::trace;

/// State behind every view of one map
pub struct Storage<K, V> {
    root: ArcSwap<FractalTrie<K, V>>,
    order: SharedOrder<K>,
    lock: RwLock<()>,
}

impl<K, V> Storage<K, V> {
    pub(crate) fn new(trie: FractalTrie<K, V>) -> Self {
        Storage {
            order: Arc::clone(trie.order()),
            root: ArcSwap::from_pointee(trie),
            lock: RwLock::new(()),
        }
    }

    pub(crate) fn order(&self) -> &SharedOrder<K> {
        &self.order
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Plain {}
    impl Sealed for super::Atomic {}
    impl Sealed for super::Shared {}
}

/// How reads and writes of a base view are synchronized
pub trait Discipline: sealed::Sealed + Copy + Default + Send + Sync + 'static {
    /// Name reported by stats and the CLI
    const NAME: &'static str;

    /// Run `f` against the current root
    fn read<K, V, R>(storage: &Storage<K, V>, f: impl FnOnce(&FractalTrie<K, V>) -> R) -> R;

    /// Capture the current root for iteration
    fn snapshot<K, V>(storage: &Storage<K, V>) -> Arc<FractalTrie<K, V>>;

    /// Apply `f` to a copy of the current root and publish the result
    ///
    /// `f` may run more than once; only the result of the run that was
    /// published is returned.
    fn write<K: Clone, V, R>(
        storage: &Storage<K, V>,
        f: impl FnMut(&mut FractalTrie<K, V>) -> R,
    ) -> R;
}

/// Single-owner discipline: load, modify, store
///
/// Never blocks and never corrupts the map, but concurrent writers through
/// plain views may overwrite each other's updates.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

/// Lock-free discipline: compare-and-swap on the root, retried on conflict
#[derive(Clone, Copy, Debug, Default)]
pub struct Atomic;

/// Lock-based discipline: writers are serialized, readers run concurrently
#[derive(Clone, Copy, Debug, Default)]
pub struct Shared;

impl Discipline for Plain {
    const NAME: &'static str = "plain";

    fn read<K, V, R>(storage: &Storage<K, V>, f: impl FnOnce(&FractalTrie<K, V>) -> R) -> R {
        f(&storage.root.load())
    }

    fn snapshot<K, V>(storage: &Storage<K, V>) -> Arc<FractalTrie<K, V>> {
        storage.root.load_full()
    }

    fn write<K: Clone, V, R>(
        storage: &Storage<K, V>,
        mut f: impl FnMut(&mut FractalTrie<K, V>) -> R,
    ) -> R {
        let current = storage.root.load_full();
        let mut next = (*current).clone();
        let result = f(&mut next);
        if !unchanged(&next, &current) {
            storage.root.store(Arc::new(next));
        }
        result
    }
}

impl Discipline for Atomic {
    const NAME: &'static str = "atomic";

    fn read<K, V, R>(storage: &Storage<K, V>, f: impl FnOnce(&FractalTrie<K, V>) -> R) -> R {
        f(&storage.root.load())
    }

    fn snapshot<K, V>(storage: &Storage<K, V>) -> Arc<FractalTrie<K, V>> {
        storage.root.load_full()
    }

    fn write<K: Clone, V, R>(
        storage: &Storage<K, V>,
        mut f: impl FnMut(&mut FractalTrie<K, V>) -> R,
    ) -> R {
        let mut current = storage.root.load_full();
        loop {
            let mut next = (*current).clone();
            let result = f(&mut next);
            if unchanged(&next, &current) {
                return result;
            }

            let prev = storage.root.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&prev, &current) {
                return result;
            }
            trace!("root changed concurrently, retrying update");
            current = Guard::into_inner(prev);
        }
    }
}

impl Discipline for Shared {
    const NAME: &'static str = "shared";

    fn read<K, V, R>(storage: &Storage<K, V>, f: impl FnOnce(&FractalTrie<K, V>) -> R) -> R {
        let _guard = storage.lock.read();
        f(&storage.root.load())
    }

    fn snapshot<K, V>(storage: &Storage<K, V>) -> Arc<FractalTrie<K, V>> {
        let _guard = storage.lock.read();
        storage.root.load_full()
    }

    fn write<K: Clone, V, R>(
        storage: &Storage<K, V>,
        f: impl FnMut(&mut FractalTrie<K, V>) -> R,
    ) -> R {
        let _guard = storage.lock.write();
        Plain::write(storage, f)
    }
}

/// A write that touched nothing needs no publication
fn unchanged<K, V>(next: &FractalTrie<K, V>, current: &FractalTrie<K, V>) -> bool {
    next.shares_root(current) && next.is_linked() == current.is_linked()
}
