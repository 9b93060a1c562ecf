//! Pluggable key orders
//!
//! An [`Order`] decides three things for a map:
//! - which keys occupy the same slot (`are_equal`)
//! - where a key is placed in the trie (`index_of`)
//! - how keys are sorted when a view iterates in order (`compare`)
//!
//! Implementations must keep the three consistent: if `are_equal(a, b)` then
//! `index_of(a) == index_of(b)` and `compare(a, b) == Ordering::Equal`.
//! The converse is not required; hash-based orders compare by index and may
//! report `Equal` for keys that are distinct.

mod custom;
mod identity;
mod lexical;
mod standard;

pub use custom::CustomOrder;
pub use identity::{IdentityKey, IdentityOrder};
pub use lexical::{LexicalCaseInsensitiveOrder, LexicalOrder};
pub use standard::{NaturalOrder, StandardOrder};

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Equivalence, placement and comparison of keys
pub trait Order<K>: Send + Sync {
    /// Whether two keys denote the same map slot
    fn are_equal(&self, left: &K, right: &K) -> bool;

    /// Stable 64-bit index used to place the key in the trie
    fn index_of(&self, key: &K) -> u64;

    /// Total order used by sorted iteration (unsigned index order by default)
    fn compare(&self, left: &K, right: &K) -> Ordering {
        self.index_of(left).cmp(&self.index_of(right))
    }
}

/// An order shared by a map and all of its views
pub type SharedOrder<K> = Arc<dyn Order<K>>;

/// Order based on `Hash` + `Eq` (the default)
pub fn standard<K: Hash + Eq + 'static>() -> SharedOrder<K> {
    Arc::new(StandardOrder::new())
}

/// Order based on `Ord`, placed by hash
pub fn natural<K: Ord + Hash + 'static>() -> SharedOrder<K> {
    Arc::new(NaturalOrder::new())
}

/// Case-sensitive character-sequence order
pub fn lexical<K: AsRef<str> + 'static>() -> SharedOrder<K> {
    Arc::new(LexicalOrder::new())
}

/// Case-insensitive character-sequence order
pub fn lexical_case_insensitive<K: AsRef<str> + 'static>() -> SharedOrder<K> {
    Arc::new(LexicalCaseInsensitiveOrder::new())
}

/// Order by reference identity; content equality is ignored
pub fn identity<K: IdentityKey + 'static>() -> SharedOrder<K> {
    Arc::new(IdentityOrder::new())
}

/// Order from a user-supplied equality and index function
pub fn custom<K, E, I>(are_equal: E, index_of: I) -> SharedOrder<K>
where
    K: 'static,
    E: Fn(&K, &K) -> bool + Send + Sync + 'static,
    I: Fn(&K) -> u64 + Send + Sync + 'static,
{
    Arc::new(CustomOrder::new(are_equal, index_of))
}

/// Hash a value with fixed keys so placement is stable across maps
pub(crate) fn hash_index<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Spread the bits of a word (splitmix64 finalizer)
pub(crate) fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
