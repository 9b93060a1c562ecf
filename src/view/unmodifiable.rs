//! Read-only view

use super::{Entries, MapView};
use crate::entry::Entry;
use crate::order::SharedOrder;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// A view whose mutations all fail with [`Error::Unsupported`]
///
/// Reads pass through, so changes made through other views of the same map
/// remain visible.
#[derive(Clone, Debug)]
pub struct UnmodifiableMap<M> {
    inner: M,
}

impl<M: MapView> UnmodifiableMap<M> {
    pub(crate) fn new(inner: M) -> Self {
        UnmodifiableMap { inner }
    }

    fn reject<T>(&self, op: &'static str) -> Result<T> {
        debug!(op, "rejected mutation on unmodifiable view");
        Err(Error::Unsupported(op))
    }
}

impl<M: MapView> MapView for UnmodifiableMap<M> {
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

    fn put(&self, _key: M::Key, _value: M::Value) -> Result<Option<M::Value>> {
        self.reject("put")
    }

    fn put_if_absent(&self, _key: M::Key, _value: M::Value) -> Result<Option<M::Value>> {
        self.reject("put_if_absent")
    }

    fn replace(&self, _key: M::Key, _value: M::Value) -> Result<Option<M::Value>> {
        self.reject("replace")
    }

    fn remove(&self, _key: &M::Key) -> Result<Option<M::Value>> {
        self.reject("remove")
    }

    fn remove_if(&self, _key: &M::Key, _value: &M::Value) -> Result<bool>
    where
        M::Value: PartialEq,
    {
        self.reject("remove_if")
    }

    fn replace_if(&self, _key: &M::Key, _old: &M::Value, _new: M::Value) -> Result<bool>
    where
        M::Value: PartialEq,
    {
        self.reject("replace_if")
    }

    fn clear(&self) -> Result<()> {
        self.reject("clear")
    }

    fn entries(&self) -> Entries<'_, M::Key, M::Value> {
        self.inner.entries()
    }
}
