//! Character-sequence orders

use super::{hash_index, Order};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Case-sensitive lexical order over anything that reads as a `str`
///
/// `"Toto"` and `"ToTo"` are distinct keys under this order.
pub struct LexicalOrder<K> {
    _key: PhantomData<fn(&K)>,
}

impl<K> LexicalOrder<K> {
    pub fn new() -> Self {
        LexicalOrder { _key: PhantomData }
    }
}

impl<K> Default for LexicalOrder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for LexicalOrder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LexicalOrder")
    }
}

impl<K: AsRef<str>> Order<K> for LexicalOrder<K> {
    fn are_equal(&self, left: &K, right: &K) -> bool {
        left.as_ref() == right.as_ref()
    }

    fn index_of(&self, key: &K) -> u64 {
        hash_index(key.as_ref())
    }

    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.as_ref().cmp(right.as_ref())
    }
}

/// Case-insensitive lexical order
///
/// Characters are compared after Unicode lowercase folding, so `"Toto"` and
/// `"TOTO"` occupy the same slot.
pub struct LexicalCaseInsensitiveOrder<K> {
    _key: PhantomData<fn(&K)>,
}

impl<K> LexicalCaseInsensitiveOrder<K> {
    pub fn new() -> Self {
        LexicalCaseInsensitiveOrder { _key: PhantomData }
    }
}

impl<K> Default for LexicalCaseInsensitiveOrder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for LexicalCaseInsensitiveOrder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LexicalCaseInsensitiveOrder")
    }
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

impl<K: AsRef<str>> Order<K> for LexicalCaseInsensitiveOrder<K> {
    fn are_equal(&self, left: &K, right: &K) -> bool {
        folded(left.as_ref()).eq(folded(right.as_ref()))
    }

    fn index_of(&self, key: &K) -> u64 {
        let mut hasher = DefaultHasher::new();
        for c in folded(key.as_ref()) {
            c.hash(&mut hasher);
        }
        hasher.finish()
    }

    fn compare(&self, left: &K, right: &K) -> Ordering {
        folded(left.as_ref()).cmp(folded(right.as_ref()))
    }
}
