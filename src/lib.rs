//! # fractal_map
//!
//! A hashed-trie map whose every operation has a bounded worst case.
//!
//! Keys are placed by successive fragments of a 64-bit index supplied by a
//! pluggable [`Order`]. Small subtrees are flat buckets; when one overflows,
//! only that bucket is split into a branch. There is never a whole-table
//! rehash, so no single insertion pays for the growth of the whole map.
//!
//! ## Core Concepts
//!
//! - **Order**: key equality, placement index and sort order in one object
//! - **Trie**: persistent, copy-on-write; old versions stay valid as snapshots
//! - **Disciplines**: plain, atomic (lock-free CAS) or shared (read-write lock)
//! - **Views**: linked, ordered, unmodifiable and restricted decorators that
//!   all see the same storage
//!
//! ## Example
//!
//! ```
//! use fractal_map::{order, FastMap, MapView};
//!
//! let map = FastMap::<String, u32>::with_order(order::lexical_case_insensitive()).linked();
//! map.put("Toto".to_string(), 1)?;
//! map.put("Tata".to_string(), 2)?;
//! assert_eq!(map.get(&"TOTO".to_string()), Some(1));
//!
//! let keys: Vec<String> = map.keys().collect();
//! assert_eq!(keys, ["Toto", "Tata"]);
//! # Ok::<(), fractal_map::Error>(())
//! ```

pub mod config;
pub mod order;
pub mod trie;
pub mod view;

mod entry;
mod error;
mod map;

#[cfg(test)]
mod proptests;

pub use config::TrieConfig;
pub use entry::Entry;
pub use error::{Error, Result};
pub use map::{AtomicMap, FastMap, SharedMap};
pub use order::{Order, SharedOrder};
pub use trie::{FractalTrie, TrieStats};
pub use view::{LinkedMap, MapView, OrderedMap, SubMap, UnmodifiableMap};
