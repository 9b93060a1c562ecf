//! Restricted views: key windows and key filters

use super::{Entries, MapView};
use crate::entry::Entry;
use crate::order::SharedOrder;
use crate::{Error, Result};
use std::cmp::Ordering;
use std::ops::Bound;
use std::sync::Arc;
use tracing::debug;

type KeyFilter<K> = Arc<dyn Fn(&K) -> bool + Send + Sync>;

enum KeyRange<K> {
    /// Keys between two bounds under `Order::compare`
    Window { from: Bound<K>, to: Bound<K> },
    Filter(KeyFilter<K>),
}

impl<K: Clone> Clone for KeyRange<K> {
    fn clone(&self) -> Self {
        match self {
            KeyRange::Window { from, to } => KeyRange::Window {
                from: from.clone(),
                to: to.clone(),
            },
            KeyRange::Filter(filter) => KeyRange::Filter(Arc::clone(filter)),
        }
    }
}

impl<K> KeyRange<K> {
    fn contains(&self, key: &K, order: &SharedOrder<K>) -> bool {
        match self {
            KeyRange::Window { from, to } => {
                let above = match from {
                    Bound::Included(low) => order.compare(key, low) != Ordering::Less,
                    Bound::Excluded(low) => order.compare(key, low) == Ordering::Greater,
                    Bound::Unbounded => true,
                };
                let below = match to {
                    Bound::Included(high) => order.compare(key, high) != Ordering::Greater,
                    Bound::Excluded(high) => order.compare(key, high) == Ordering::Less,
                    Bound::Unbounded => true,
                };
                above && below
            }
            KeyRange::Filter(filter) => filter(key),
        }
    }
}

/// A view over the subset of keys inside a window or accepted by a filter
///
/// Keys outside the restriction read as absent. Mutating one fails with
/// [`Error::OutOfRange`] and leaves the wrapped view untouched. `len`,
/// `clear` and iteration cover only the keys inside; `len` walks the
/// wrapped view's entries.
pub struct SubMap<M: MapView> {
    inner: M,
    range: KeyRange<M::Key>,
}

impl<M: MapView + Clone> Clone for SubMap<M> {
    fn clone(&self) -> Self {
        SubMap {
            inner: self.inner.clone(),
            range: self.range.clone(),
        }
    }
}

impl<M: MapView> SubMap<M> {
    /// Restrict `inner` to the keys between `from` and `to`
    ///
    /// Fails with [`Error::InvalidRange`] if the lower bound compares above
    /// the upper bound.
    pub fn window(inner: M, from: Bound<M::Key>, to: Bound<M::Key>) -> Result<Self> {
        if let (Some(low), Some(high)) = (bound_key(&from), bound_key(&to)) {
            if inner.order().compare(low, high) == Ordering::Greater {
                return Err(Error::InvalidRange(
                    "lower bound compares above upper bound".to_string(),
                ));
            }
        }
        Ok(SubMap {
            inner,
            range: KeyRange::Window { from, to },
        })
    }

    /// Restrict `inner` to the keys accepted by `predicate`
    pub fn filter<P>(inner: M, predicate: P) -> Self
    where
        P: Fn(&M::Key) -> bool + Send + Sync + 'static,
    {
        SubMap {
            inner,
            range: KeyRange::Filter(Arc::new(predicate)),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Whether `key` is inside the restriction
    pub fn contains_range(&self, key: &M::Key) -> bool {
        self.range.contains(key, self.inner.order())
    }

    fn check(&self, key: &M::Key, op: &'static str) -> Result<()> {
        if self.contains_range(key) {
            return Ok(());
        }
        debug!(op, "rejected key outside restricted view");
        Err(Error::OutOfRange(op.to_string()))
    }
}

fn bound_key<K>(bound: &Bound<K>) -> Option<&K> {
    match bound {
        Bound::Included(key) | Bound::Excluded(key) => Some(key),
        Bound::Unbounded => None,
    }
}

impl<M: MapView> MapView for SubMap<M> {
    type Key = M::Key;
    type Value = M::Value;

    fn order(&self) -> &SharedOrder<M::Key> {
        self.inner.order()
    }

    fn get_entry(&self, key: &M::Key) -> Option<Arc<Entry<M::Key, M::Value>>> {
        if !self.contains_range(key) {
            return None;
        }
        self.inner.get_entry(key)
    }

    fn len(&self) -> usize {
        self.entries().count()
    }

    fn put(&self, key: M::Key, value: M::Value) -> Result<Option<M::Value>> {
        self.check(&key, "put")?;
        self.inner.put(key, value)
    }

    fn put_if_absent(&self, key: M::Key, value: M::Value) -> Result<Option<M::Value>> {
        self.check(&key, "put_if_absent")?;
        self.inner.put_if_absent(key, value)
    }

    fn replace(&self, key: M::Key, value: M::Value) -> Result<Option<M::Value>> {
        self.check(&key, "replace")?;
        self.inner.replace(key, value)
    }

    fn remove(&self, key: &M::Key) -> Result<Option<M::Value>> {
        self.check(key, "remove")?;
        self.inner.remove(key)
    }

    fn remove_if(&self, key: &M::Key, value: &M::Value) -> Result<bool>
    where
        M::Value: PartialEq,
    {
        self.check(key, "remove_if")?;
        self.inner.remove_if(key, value)
    }

    fn replace_if(&self, key: &M::Key, old: &M::Value, new: M::Value) -> Result<bool>
    where
        M::Value: PartialEq,
    {
        self.check(key, "replace_if")?;
        self.inner.replace_if(key, old, new)
    }

    fn clear(&self) -> Result<()> {
        let keys: Vec<M::Key> = self.keys().collect();
        for key in &keys {
            self.inner.remove(key)?;
        }
        Ok(())
    }

    fn entries(&self) -> Entries<'_, M::Key, M::Value> {
        Box::new(
            self.inner
                .entries()
                .filter(move |entry| self.contains_range(entry.key())),
        )
    }
}
