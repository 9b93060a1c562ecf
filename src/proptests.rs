use crate::config::TrieConfig;
use crate::order::{self, SharedOrder};
use crate::trie::{FractalTrie, TrieNode};

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

fn validate_trie<V>(t: &FractalTrie<u16, V>) {
    let config = *t.config();
    let mask = |depth: usize| {
        let bits = depth * config.fanout_bits as usize;
        if bits >= 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        }
    };

    let mut stack: Vec<(&TrieNode<u16, V>, usize, u64)> = vec![(t.root(), 0, 0)];
    let mut reachable = 0usize;
    while let Some((node, depth, path)) = stack.pop() {
        match node {
            TrieNode::Bucket(entries) => {
                if depth <= config.max_branch_depth() {
                    assert!(
                        entries.len() <= config.split_threshold,
                        "bucket at depth {depth} holds {} entries",
                        entries.len()
                    );
                }
                for entry in entries {
                    assert_eq!(
                        entry.index(),
                        t.order().index_of(entry.key()),
                        "cached index must match the order"
                    );
                    assert_eq!(
                        entry.index() & mask(depth),
                        path,
                        "entry placed under the wrong branch"
                    );
                }
                reachable += entries.len();
            }
            TrieNode::Branch { children, len } => {
                assert_eq!(children.len(), config.fanout());
                assert!(
                    *len > config.split_threshold,
                    "branch of {len} entries should have collapsed"
                );
                let mut sum = 0;
                for (slot, child) in children.iter().enumerate() {
                    if let Some(child) = child {
                        assert!(!child.is_empty(), "empty child must be a vacant slot");
                        sum += child.len();
                        let shift = depth * config.fanout_bits as usize;
                        stack.push((&**child, depth + 1, path | ((slot as u64) << shift)));
                    }
                }
                assert_eq!(sum, *len, "branch length must match its children");
            }
        }
    }
    assert_eq!(reachable, t.len(), "reachable entries must match len");

    if t.is_linked() {
        let snapshot = Arc::new(t.clone());
        let walked = snapshot.linked_cursor().count();
        assert_eq!(walked, t.len(), "links must reach every entry");
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    PutIfAbsent(u16, u32),
    Remove(u16),
    Get(u16),
    Clear,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = 0u16..512;
    let op = prop_oneof![
        40 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        10 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::PutIfAbsent(k, v)),
        30 => key.clone().prop_map(Op::Remove),
        19 => key.clone().prop_map(Op::Get),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1500)
}

fn config_strategy() -> impl Strategy<Value = TrieConfig> {
    (1u8..=5, 1usize..=12).prop_map(|(bits, threshold)| TrieConfig {
        fanout_bits: bits,
        split_threshold: threshold,
    })
}

/// Replay `ops` against a trie and a `HashMap`, returning both
fn run_model(
    order: SharedOrder<u16>,
    config: TrieConfig,
    linked: bool,
    ops: Vec<Op>,
) -> Result<(FractalTrie<u16, u32>, Vec<u16>), TestCaseError> {
    let mut t = FractalTrie::with_config(order, config).unwrap();
    if linked {
        t.enable_links();
    }
    let mut m: HashMap<u16, u32> = HashMap::new();
    let mut insertion: Vec<u16> = Vec::new();

    for op in ops {
        match op {
            Op::Insert(key, value) => {
                let old_m = m.insert(key, value);
                if old_m.is_none() {
                    insertion.push(key);
                }
                prop_assert_eq!(t.insert(key, value), old_m);
            }
            Op::PutIfAbsent(key, value) => {
                let existing = m.get(&key).copied();
                if existing.is_none() {
                    m.insert(key, value);
                    insertion.push(key);
                }
                prop_assert_eq!(t.put_if_absent(key, value), existing);
            }
            Op::Remove(key) => {
                let old_m = m.remove(&key);
                if old_m.is_some() {
                    insertion.retain(|k| *k != key);
                }
                prop_assert_eq!(t.remove(&key), old_m);
            }
            Op::Get(key) => {
                prop_assert_eq!(t.get(&key).copied(), m.get(&key).copied());
            }
            Op::Clear => {
                t.clear();
                m.clear();
                insertion.clear();
            }
        }
        prop_assert_eq!(t.len(), m.len());
    }

    validate_trie(&t);
    let mut got: Vec<(u16, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
    let mut expected: Vec<(u16, u32)> = m.into_iter().collect();
    got.sort_unstable();
    expected.sort_unstable();
    prop_assert_eq!(got, expected);
    Ok((t, insertion))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_standard(config in config_strategy(), ops in ops_strategy()) {
        run_model(order::standard(), config, false, ops)?;
    }

    #[test]
    fn prop_equivalence_colliding_indexes(ops in ops_strategy()) {
        // Seven distinct indexes for 512 keys: buckets below the last branch
        // level must absorb the overflow.
        let order = order::custom(|a: &u16, b: &u16| a == b, |k: &u16| u64::from(*k % 7));
        run_model(order, TrieConfig::new(2, 2).unwrap(), false, ops)?;
    }

    #[test]
    fn prop_linked_order_matches_insertion(config in config_strategy(), ops in ops_strategy()) {
        let (t, insertion) = run_model(order::standard(), config, true, ops)?;
        let snapshot = Arc::new(t);
        let linked: Vec<u16> = snapshot.linked_cursor().map(|e| *e.key()).collect();
        prop_assert_eq!(linked, insertion);
    }

    #[test]
    fn prop_snapshot_unaffected_by_later_ops(
        first in ops_strategy(),
        second in ops_strategy(),
    ) {
        let (mut t, _) = run_model(order::standard(), TrieConfig::default(), false, first)?;
        let snapshot = t.clone();
        let before: Vec<(u16, u32)> = snapshot.iter().map(|(k, v)| (*k, *v)).collect();

        for op in second {
            match op {
                Op::Insert(k, v) | Op::PutIfAbsent(k, v) => {
                    t.insert(k, v);
                }
                Op::Remove(k) => {
                    t.remove(&k);
                }
                Op::Get(_) => {}
                Op::Clear => t.clear(),
            }
        }

        let after: Vec<(u16, u32)> = snapshot.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(before, after);
        validate_trie(&snapshot);
    }
}

#[test]
fn exhaustive_remove_order_collapses_to_bucket() {
    let config = TrieConfig::new(1, 1).unwrap();
    let keys: Vec<u16> = (0..64).collect();
    for stride in [1usize, 3, 7, 13] {
        let mut t = FractalTrie::with_config(order::standard(), config).unwrap();
        for k in &keys {
            t.insert(*k, ());
        }
        validate_trie(&t);

        // Every stride is coprime with the key count, so this visits each key.
        let sequence: Vec<u16> = (0..keys.len())
            .map(|i| keys[(i * stride) % keys.len()])
            .collect();

        for k in sequence {
            assert_eq!(t.remove(&k), Some(()));
            validate_trie(&t);
        }
        assert!(t.is_empty());
        assert!(t.root().is_bucket());
    }
}
