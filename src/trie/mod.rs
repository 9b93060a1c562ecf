//! Fractal hashed trie
//!
//! This implements a persistent hash trie where:
//! - Each level is indexed by a fragment of the key's `Order::index_of`
//! - Small subtrees are flat buckets, split locally when they overflow
//! - Unchanged subtrees are shared between versions of the map

mod cursor;
mod node;
mod tree;

pub use cursor::{Cursor, Iter, LinkedCursor};
pub(crate) use node::TrieNode;
pub use tree::{FractalTrie, TrieStats};
