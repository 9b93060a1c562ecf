//! Trie node types

use crate::entry::Entry;
use std::sync::Arc;

/// A node in the fractal trie
///
/// Nodes are never modified once they are reachable from a published root;
/// every change builds replacement nodes along the path from the root.
pub(crate) enum TrieNode<K, V> {
    /// A short list of entries scanned linearly
    Bucket(Vec<Arc<Entry<K, V>>>),
    /// Children indexed by a fragment of the key index
    Branch {
        /// One slot per fragment value; `None` for empty subtrees
        children: Box<[Option<Arc<TrieNode<K, V>>>]>,
        /// Number of entries in the whole subtree
        len: usize,
    },
}

impl<K, V> TrieNode<K, V> {
    /// Create an empty node
    pub fn empty() -> Self {
        TrieNode::Bucket(Vec::new())
    }

    /// Number of entries below this node
    pub fn len(&self) -> usize {
        match self {
            TrieNode::Bucket(entries) => entries.len(),
            TrieNode::Branch { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_bucket(&self) -> bool {
        matches!(self, TrieNode::Bucket(_))
    }
}

impl<K, V> Default for TrieNode<K, V> {
    fn default() -> Self {
        TrieNode::empty()
    }
}
