//! Map views
//!
//! Every view implements [`MapView`]. Base views ([`FastMap`](crate::FastMap)
//! and its atomic and shared forms) own the storage; decorators wrap another
//! view and change one aspect of it:
//!
//! - [`LinkedMap`]: iteration in insertion order
//! - [`OrderedMap`]: iteration sorted by the map's [`Order`](crate::order::Order)
//! - [`UnmodifiableMap`]: every mutation is rejected
//! - [`SubMap`]: restricted to a key window or a key predicate
//!
//! Decorators compose by nesting, and every view over one map sees the same
//! entries.

mod discipline;
mod linked;
mod ordered;
mod sub;
mod unmodifiable;

pub use discipline::{Atomic, Discipline, Plain, Shared, Storage};
pub use linked::LinkedMap;
pub use ordered::OrderedMap;
pub use sub::SubMap;
pub use unmodifiable::UnmodifiableMap;

use crate::entry::Entry;
use crate::order::SharedOrder;
use crate::Result;
use std::ops::Bound;
use std::sync::Arc;

/// Owned iterator over the entries of a view
pub type Entries<'a, K, V> = Box<dyn Iterator<Item = Arc<Entry<K, V>>> + 'a>;

/// Operations shared by every map view
///
/// Reads return owned values (or shared entries) because a concurrent view
/// may replace its root at any time. Mutations return `Result` so that
/// restricted views can refuse them; base views never fail.
pub trait MapView {
    type Key: Clone + 'static;
    type Value: Clone + 'static;

    /// The order fixed at construction of the underlying map
    fn order(&self) -> &SharedOrder<Self::Key>;

    /// The stored entry for a key
    fn get_entry(&self, key: &Self::Key) -> Option<Arc<Entry<Self::Key, Self::Value>>>;

    /// Number of entries visible through this view
    fn len(&self) -> usize;

    /// Associate `value` with `key`, returning the previous value
    fn put(&self, key: Self::Key, value: Self::Value) -> Result<Option<Self::Value>>;

    /// Insert only when no equal key exists; returns the existing value
    /// otherwise
    fn put_if_absent(&self, key: Self::Key, value: Self::Value) -> Result<Option<Self::Value>>;

    /// Overwrite the value of an existing key; absent keys are left absent
    fn replace(&self, key: Self::Key, value: Self::Value) -> Result<Option<Self::Value>>;

    /// Remove a key, returning its value
    fn remove(&self, key: &Self::Key) -> Result<Option<Self::Value>>;

    /// Remove a key only while it maps to `value`
    fn remove_if(&self, key: &Self::Key, value: &Self::Value) -> Result<bool>
    where
        Self::Value: PartialEq;

    /// Overwrite the value of `key` only while it maps to `old`
    fn replace_if(&self, key: &Self::Key, old: &Self::Value, new: Self::Value) -> Result<bool>
    where
        Self::Value: PartialEq;

    /// Remove every entry visible through this view
    fn clear(&self) -> Result<()>;

    /// Iterate over a snapshot of the entries
    fn entries(&self) -> Entries<'_, Self::Key, Self::Value>;

    fn get(&self, key: &Self::Key) -> Option<Self::Value> {
        self.get_entry(key).map(|entry| entry.value().clone())
    }

    fn contains_key(&self, key: &Self::Key) -> bool {
        self.get_entry(key).is_some()
    }

    fn contains_value(&self, value: &Self::Value) -> bool
    where
        Self::Value: PartialEq,
    {
        self.entries().any(|entry| entry.value() == value)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both views hold the same mappings
    ///
    /// Keys of `self` are looked up through `other`, so its order decides
    /// which keys match.
    fn content_eq<O>(&self, other: &O) -> bool
    where
        Self: Sized,
        O: MapView<Key = Self::Key, Value = Self::Value>,
        Self::Value: PartialEq,
    {
        self.len() == other.len()
            && self.entries().all(|entry| {
                other
                    .get_entry(entry.key())
                    .is_some_and(|found| found.value() == entry.value())
            })
    }

    fn keys(&self) -> Box<dyn Iterator<Item = Self::Key> + '_> {
        Box::new(self.entries().map(|entry| entry.key().clone()))
    }

    fn values(&self) -> Box<dyn Iterator<Item = Self::Value> + '_> {
        Box::new(self.entries().map(|entry| entry.value().clone()))
    }

    /// Put every pair, stopping at the first refused one
    fn put_all<I>(&self, pairs: I) -> Result<()>
    where
        Self: Sized,
        I: IntoIterator<Item = (Self::Key, Self::Value)>,
    {
        for (key, value) in pairs {
            self.put(key, value)?;
        }
        Ok(())
    }

    /// Put one pair and hand the view back, for chained construction
    fn with(self, key: Self::Key, value: Self::Value) -> Result<Self>
    where
        Self: Sized,
    {
        self.put(key, value)?;
        Ok(self)
    }

    /// View iterating in the order's `compare` order
    fn ordered(self) -> OrderedMap<Self>
    where
        Self: Sized,
    {
        OrderedMap::new(self)
    }

    /// Read-only view
    fn unmodifiable(self) -> UnmodifiableMap<Self>
    where
        Self: Sized,
    {
        UnmodifiableMap::new(self)
    }

    /// View restricted to the keys accepted by `predicate`
    fn filtered<P>(self, predicate: P) -> SubMap<Self>
    where
        Self: Sized,
        P: Fn(&Self::Key) -> bool + Send + Sync + 'static,
    {
        SubMap::filter(self, predicate)
    }

    /// View restricted to a window of keys under the order's `compare`
    fn range(self, from: Bound<Self::Key>, to: Bound<Self::Key>) -> Result<SubMap<Self>>
    where
        Self: Sized,
    {
        SubMap::window(self, from, to)
    }
}
