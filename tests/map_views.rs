//! Map view integration tests
//!
//! Behaviour shared by every view and the properties each decorator adds.

use fractal_map::{order, Error, FastMap, MapView, TrieConfig};
use std::ops::Bound;
use std::rc::Rc;
use std::sync::Arc;

// ============================================================================
// Core Map Properties
// ============================================================================

#[test]
fn test_size_counts_distinct_keys() {
    let map: FastMap<u32, u32> = FastMap::new();
    for i in 0..1000 {
        map.put(i % 250, i).unwrap();
    }
    assert_eq!(map.len(), 250);
    assert_eq!(map.keys().count(), 250);
}

#[test]
fn test_put_then_get_and_overwrite() {
    let map: FastMap<String, &str> = FastMap::new();
    assert_eq!(map.put("k".into(), "v1").unwrap(), None);
    assert_eq!(map.get(&"k".into()), Some("v1"));
    assert_eq!(map.put("k".into(), "v2").unwrap(), Some("v1"));
    assert_eq!(map.get(&"k".into()), Some("v2"));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_unit_value_is_distinct_from_absence() {
    let map: FastMap<&str, ()> = FastMap::new();
    map.put("present", ()).unwrap();
    assert_eq!(map.get(&"present"), Some(()));
    assert_eq!(map.get(&"absent"), None);
    assert!(map.contains_key(&"present"));
}

#[test]
fn test_put_if_absent_never_overwrites() {
    let map: FastMap<&str, i32> = FastMap::new();
    map.put("k", 1).unwrap();
    assert_eq!(map.put_if_absent("k", 2).unwrap(), Some(1));
    assert_eq!(map.get(&"k"), Some(1));
    assert_eq!(map.put_if_absent("j", 3).unwrap(), None);
    assert_eq!(map.get(&"j"), Some(3));
}

#[test]
fn test_with_chain_equals_sequential_puts() {
    let chained = FastMap::<&str, i32>::new()
        .linked()
        .with("k1", 1)
        .and_then(|m| m.with("k2", 2))
        .and_then(|m| m.with("k3", 3))
        .unwrap();

    let sequential = FastMap::<&str, i32>::new().linked();
    sequential.put("k1", 1).unwrap();
    sequential.put("k2", 2).unwrap();
    sequential.put("k3", 3).unwrap();

    let a: Vec<(&str, i32)> = chained.entries().map(|e| (*e.key(), *e.value())).collect();
    let b: Vec<(&str, i32)> = sequential.entries().map(|e| (*e.key(), *e.value())).collect();
    assert_eq!(a, b);
}

#[test]
fn test_contains_value_and_values() {
    let map: FastMap<u8, &str> = [(1, "a"), (2, "b")].into_iter().collect();
    assert!(map.contains_value(&"b"));
    assert!(!map.contains_value(&"z"));
    let mut values: Vec<&str> = map.values().collect();
    values.sort_unstable();
    assert_eq!(values, vec!["a", "b"]);
}

#[test]
fn test_put_all() {
    let map: FastMap<u32, u32> = FastMap::new();
    map.put_all((0..100).map(|i| (i, i * 2))).unwrap();
    assert_eq!(map.len(), 100);
    assert_eq!(map.get(&50), Some(100));
}

// ============================================================================
// Orders
// ============================================================================

#[test]
fn test_identity_order_keeps_equal_instances_apart() {
    let map: FastMap<Arc<String>, u32> = FastMap::with_order(order::identity());
    let first = Arc::new("same".to_string());
    let second = Arc::new("same".to_string());
    assert_eq!(first, second);

    map.put(Arc::clone(&first), 1).unwrap();
    map.put(Arc::clone(&second), 2).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&first), Some(1));
    assert_eq!(map.get(&second), Some(2));
    assert_eq!(map.get(&Arc::new("same".to_string())), None);
}

#[test]
fn test_identity_order_with_rc_keys() {
    let map: FastMap<Rc<u32>, u32> = FastMap::with_order(order::identity());
    let key = Rc::new(7);
    map.put(Rc::clone(&key), 1).unwrap();
    assert_eq!(map.get(&key), Some(1));
    assert_eq!(map.get(&Rc::new(7)), None);
}

#[test]
fn test_lexical_case_sensitivity() {
    let sensitive: FastMap<String, i32> = FastMap::with_order(order::lexical());
    sensitive.put("Toto".into(), 1).unwrap();
    assert_eq!(sensitive.get(&"ToTo".into()), None);

    let insensitive: FastMap<String, i32> = FastMap::with_order(order::lexical_case_insensitive());
    insensitive.put("Toto".into(), 1).unwrap();
    assert_eq!(insensitive.get(&"ToTo".into()), Some(1));
    assert_eq!(insensitive.put("TOTO".into(), 2).unwrap(), Some(1));
    assert_eq!(insensitive.len(), 1);
    assert_eq!(insensitive.keys().collect::<Vec<_>>(), vec!["Toto"]);
}

#[test]
fn test_custom_order_with_comparator() {
    let order = order::CustomOrder::new(
        |a: &i32, b: &i32| a.abs() == b.abs(),
        |k: &i32| k.unsigned_abs() as u64,
    )
    .with_compare(|a: &i32, b: &i32| b.abs().cmp(&a.abs()));
    let map: FastMap<i32, ()> = FastMap::with_order(Arc::new(order));

    for k in [3, -1, 2, -3] {
        map.put(k, ()).unwrap();
    }
    assert_eq!(map.len(), 3);
    let keys: Vec<i32> = map.ordered().keys().map(|k| k.abs()).collect();
    assert_eq!(keys, vec![3, 2, 1]);
}

// ============================================================================
// Linked View
// ============================================================================

#[test]
fn test_linked_remove_and_reinsert() {
    let map = FastMap::<&str, i32>::new().linked();
    map.put("A", 1).unwrap();
    map.put("B", 2).unwrap();
    map.put("C", 3).unwrap();
    map.remove(&"B").unwrap();
    map.put("B", 2).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["A", "C", "B"]);
}

#[test]
fn test_linked_order_survives_splits() {
    let config = TrieConfig::new(2, 2).unwrap();
    let map = FastMap::<u32, u32>::with_config(order::standard(), config)
        .unwrap()
        .linked();
    let keys: Vec<u32> = (0..300).map(|i| (i * 7919) % 1000).collect();
    for k in &keys {
        map.put(*k, *k).unwrap();
    }
    for k in keys.iter().step_by(3) {
        map.remove(k).unwrap();
    }

    let expected: Vec<u32> = keys
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(_, k)| *k)
        .collect();
    assert_eq!(map.keys().collect::<Vec<_>>(), expected);
    assert!(map.inner().stats().branches > 0);
}

// ============================================================================
// Restricted and Read-only Views
// ============================================================================

#[test]
fn test_sub_range_rejection_leaves_map_unchanged() {
    let map = FastMap::<u32, u32>::with_order(order::natural()).ordered();
    map.put_all((0..10).map(|i| (i, i))).unwrap();

    let window = map
        .sub_map(Bound::Included(2), Bound::Included(5))
        .unwrap();
    assert_eq!(window.keys().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    assert_eq!(window.first_key(), Some(2));
    assert_eq!(window.last_key(), Some(5));

    assert!(matches!(window.put(9, 0), Err(Error::OutOfRange(_))));
    assert!(matches!(window.remove(&0), Err(Error::OutOfRange(_))));
    assert_eq!(map.len(), 10);
    assert_eq!(map.get(&9), Some(9));

    window.clear().unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec![0, 1, 6, 7, 8, 9]);
}

#[test]
fn test_nested_sub_maps() {
    let map = FastMap::<u32, ()>::with_order(order::natural()).ordered();
    map.put_all((0..100).map(|i| (i, ()))).unwrap();

    let tens = map.tail_map(10).unwrap().head_map(20).unwrap();
    assert_eq!(tens.len(), 10);
    assert_eq!(tens.first_key(), Some(10));
    assert_eq!(tens.last_key(), Some(19));
}

#[test]
fn test_unmodifiable_over_linked() {
    let linked = FastMap::<u8, u8>::new().linked();
    linked.put(2, 2).unwrap();
    linked.put(1, 1).unwrap();
    let view = linked.clone().unmodifiable();

    assert!(matches!(view.clear(), Err(Error::Unsupported(_))));
    assert_eq!(view.keys().collect::<Vec<_>>(), vec![2, 1]);
}

// ============================================================================
// Clearing
// ============================================================================

#[test]
fn test_clear_empties_every_combination() {
    fn fill_and_clear<M: MapView<Key = u32, Value = u32>>(map: M) {
        map.put_all((0..200).map(|i| (i, i))).unwrap();
        assert_eq!(map.len(), 200);
        map.clear().unwrap();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.entries().count(), 0);
    }

    let base = || FastMap::<u32, u32>::new();
    fill_and_clear(base());
    fill_and_clear(base().atomic());
    fill_and_clear(base().shared());
    fill_and_clear(base().linked());
    fill_and_clear(base().atomic().linked());
    fill_and_clear(base().shared().linked());
    fill_and_clear(base().ordered());
    fill_and_clear(base().atomic().linked().ordered());
    fill_and_clear(base().filtered(|_| true));
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_iteration_is_snapshot_consistent() {
    let map = FastMap::<u32, u32>::new().atomic();
    map.put_all((0..100).map(|i| (i, i))).unwrap();

    let mut seen = 0;
    for entry in map.entries() {
        map.remove(entry.key()).unwrap();
        map.put(entry.key() + 1000, 0).unwrap();
        seen += 1;
    }
    assert_eq!(seen, 100);
    assert_eq!(map.len(), 100);
    assert!(map.keys().all(|k| k >= 1000));
}

#[test]
fn test_snapshot_and_copy() {
    let map = FastMap::<u32, u32>::new();
    map.put(1, 1).unwrap();
    let snapshot = map.snapshot();
    let copy = map.copy();

    map.put(2, 2).unwrap();
    copy.put(3, 3).unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(map.len(), 2);
    assert_eq!(copy.len(), 2);
    assert_eq!(copy.get(&2), None);
}
