//! Reference-identity order

use super::{mix64, Order};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

/// A key whose identity is the address of the value it points to
pub trait IdentityKey {
    fn identity(&self) -> usize;
}

impl<T: ?Sized> IdentityKey for Arc<T> {
    fn identity(&self) -> usize {
        Arc::as_ptr(self).cast::<()>() as usize
    }
}

impl<T: ?Sized> IdentityKey for Rc<T> {
    fn identity(&self) -> usize {
        Rc::as_ptr(self).cast::<()>() as usize
    }
}

impl<T: ?Sized> IdentityKey for &T {
    fn identity(&self) -> usize {
        (*self as *const T).cast::<()>() as usize
    }
}

/// Keys are equal only when they point to the same allocation
///
/// Two content-equal but distinct instances are never merged.
pub struct IdentityOrder<K> {
    _key: PhantomData<fn(&K)>,
}

impl<K> IdentityOrder<K> {
    pub fn new() -> Self {
        IdentityOrder { _key: PhantomData }
    }
}

impl<K> Default for IdentityOrder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for IdentityOrder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityOrder")
    }
}

impl<K: IdentityKey> Order<K> for IdentityOrder<K> {
    fn are_equal(&self, left: &K, right: &K) -> bool {
        left.identity() == right.identity()
    }

    fn index_of(&self, key: &K) -> u64 {
        // Addresses are aligned, so the low bits the trie reads first are
        // mostly zero until mixed.
        mix64(key.identity() as u64)
    }

    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.identity().cmp(&right.identity())
    }
}
