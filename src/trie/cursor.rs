//! Traversal of trie nodes
//!
//! All traversals are depth-first: branch children in fragment order, bucket
//! entries in storage order. Cursors hold `Arc`s to the nodes they walk, so
//! they see the trie exactly as it was when they were created.

use super::{FractalTrie, TrieNode};
use crate::entry::Entry;
use std::iter::FusedIterator;
use std::slice;
use std::sync::Arc;

type Slot<K, V> = Option<Arc<TrieNode<K, V>>>;

/// Borrowing iterator over `(&K, &V)`
pub struct Iter<'a, K, V> {
    stack: Vec<slice::Iter<'a, Slot<K, V>>>,
    bucket: slice::Iter<'a, Arc<Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: &'a TrieNode<K, V>, len: usize) -> Self {
        let empty: &'a [Arc<Entry<K, V>>] = &[];
        let mut iter = Iter {
            stack: Vec::new(),
            bucket: empty.iter(),
            remaining: len,
        };
        iter.enter(root);
        iter
    }

    fn enter(&mut self, node: &'a TrieNode<K, V>) {
        match node {
            TrieNode::Bucket(entries) => self.bucket = entries.iter(),
            TrieNode::Branch { children, .. } => self.stack.push(children.iter()),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.bucket.next() {
                self.remaining -= 1;
                return Some((entry.key(), entry.value()));
            }

            let top = self.stack.last_mut()?;
            match top.next() {
                Some(Some(child)) => self.enter(child),
                Some(None) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

enum Step<K, V> {
    Yield(Arc<Entry<K, V>>),
    Descend(Arc<TrieNode<K, V>>),
    Skip,
    Ascend,
}

/// Owned, restartable cursor over shared entries
///
/// Holding a cursor keeps the nodes it has yet to visit alive, even if the
/// map it came from has since replaced its root.
pub struct Cursor<K, V> {
    root: Arc<TrieNode<K, V>>,
    stack: Vec<(Arc<TrieNode<K, V>>, usize)>,
    len: usize,
    remaining: usize,
}

impl<K, V> Clone for Cursor<K, V> {
    fn clone(&self) -> Self {
        Cursor {
            root: Arc::clone(&self.root),
            stack: self.stack.clone(),
            len: self.len,
            remaining: self.remaining,
        }
    }
}

impl<K, V> Cursor<K, V> {
    pub(crate) fn new(root: Arc<TrieNode<K, V>>, len: usize) -> Self {
        Cursor {
            stack: vec![(Arc::clone(&root), 0)],
            root,
            len,
            remaining: len,
        }
    }

    /// Restart from the first entry of the same snapshot
    pub fn rewind(&mut self) {
        self.stack.clear();
        self.stack.push((Arc::clone(&self.root), 0));
        self.remaining = self.len;
    }
}

impl<K, V> Iterator for Cursor<K, V> {
    type Item = Arc<Entry<K, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = {
                let (node, pos) = self.stack.last_mut()?;
                match &**node {
                    TrieNode::Bucket(entries) => match entries.get(*pos) {
                        Some(entry) => {
                            *pos += 1;
                            Step::Yield(Arc::clone(entry))
                        }
                        None => Step::Ascend,
                    },
                    TrieNode::Branch { children, .. } => match children.get(*pos) {
                        Some(slot) => {
                            *pos += 1;
                            match slot {
                                Some(child) => Step::Descend(Arc::clone(child)),
                                None => Step::Skip,
                            }
                        }
                        None => Step::Ascend,
                    },
                }
            };

            match step {
                Step::Yield(entry) => {
                    self.remaining -= 1;
                    return Some(entry);
                }
                Step::Descend(child) => self.stack.push((child, 0)),
                Step::Skip => {}
                Step::Ascend => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Cursor<K, V> {}

impl<K, V> FusedIterator for Cursor<K, V> {}

/// Owned cursor following insertion-order links of a snapshot
pub struct LinkedCursor<K, V> {
    snapshot: Arc<FractalTrie<K, V>>,
    next: Option<K>,
    remaining: usize,
}

impl<K: Clone, V> Clone for LinkedCursor<K, V> {
    fn clone(&self) -> Self {
        LinkedCursor {
            snapshot: Arc::clone(&self.snapshot),
            next: self.next.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: Clone, V> LinkedCursor<K, V> {
    pub(crate) fn new(snapshot: Arc<FractalTrie<K, V>>) -> Self {
        let next = snapshot.head().cloned();
        let remaining = if next.is_some() { snapshot.len() } else { 0 };
        LinkedCursor {
            snapshot,
            next,
            remaining,
        }
    }

    /// Restart from the oldest entry of the same snapshot
    pub fn rewind(&mut self) {
        self.next = self.snapshot.head().cloned();
        self.remaining = if self.next.is_some() {
            self.snapshot.len()
        } else {
            0
        };
    }
}

impl<K: Clone, V> Iterator for LinkedCursor<K, V> {
    type Item = Arc<Entry<K, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next.take()?;
        let entry = Arc::clone(self.snapshot.get_entry(&key)?);
        self.next = entry.links().and_then(|links| links.next.clone());
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Clone, V> FusedIterator for LinkedCursor<K, V> {}
