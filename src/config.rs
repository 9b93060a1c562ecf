//! Trie tuning parameters
//!
//! The fan-out and split threshold bound the cost of every operation: a
//! lookup scans at most `depth` branches and one bucket, and a split touches
//! at most `split_threshold + 1` entries.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of index bits consumed per trie level (16 children).
pub const DEFAULT_FANOUT_BITS: u8 = 4;

/// Default bucket size above which a bucket becomes a branch.
pub const DEFAULT_SPLIT_THRESHOLD: usize = 8;

const MAX_FANOUT_BITS: u8 = 8;
const MAX_SPLIT_THRESHOLD: usize = 1024;

/// Shape parameters of a fractal trie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrieConfig {
    /// Index bits consumed per level; a branch has `2^fanout_bits` slots
    pub fanout_bits: u8,
    /// A bucket holding more entries than this is split into a branch
    pub split_threshold: usize,
}

impl Default for TrieConfig {
    fn default() -> Self {
        TrieConfig {
            fanout_bits: DEFAULT_FANOUT_BITS,
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
        }
    }
}

impl TrieConfig {
    /// Create a validated configuration
    pub fn new(fanout_bits: u8, split_threshold: usize) -> Result<Self> {
        let config = TrieConfig {
            fanout_bits,
            split_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that both parameters are within supported bounds
    pub fn validate(&self) -> Result<()> {
        if self.fanout_bits == 0 || self.fanout_bits > MAX_FANOUT_BITS {
            return Err(Error::Config(format!(
                "fanout_bits must be in 1..={}, got {}",
                MAX_FANOUT_BITS, self.fanout_bits
            )));
        }
        if self.split_threshold == 0 || self.split_threshold > MAX_SPLIT_THRESHOLD {
            return Err(Error::Config(format!(
                "split_threshold must be in 1..={}, got {}",
                MAX_SPLIT_THRESHOLD, self.split_threshold
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrieConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Number of child slots in a branch
    pub fn fanout(&self) -> usize {
        1usize << self.fanout_bits
    }

    /// Deepest level at which a branch can still be created.
    ///
    /// A branch at depth `d` consumes index bits starting at `d * fanout_bits`,
    /// so branching stops once those bits run past the 64-bit index.
    pub fn max_branch_depth(&self) -> usize {
        63 / self.fanout_bits as usize
    }
}
