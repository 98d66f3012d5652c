use crate::{ImmutableHashMap, MapError};

use super::check_invariants;

#[test]
fn empty_map() {
    let map: ImmutableHashMap<String, i32> = ImmutableHashMap::empty();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert_eq!(map.iter().next(), None);
}

#[test]
fn add_one() {
    let map = ImmutableHashMap::empty().add("hello", 42).unwrap();
    assert_eq!(map.len(), 1);
    assert!(!map.is_empty());
    assert_eq!(map.get(&"hello"), Some(&42));
}

#[test]
fn get_missing_key() {
    let map = ImmutableHashMap::empty().add("a", 1).unwrap();
    assert_eq!(map.get(&"b"), None);
    assert_eq!(map.item(&"b"), Err(MapError::KeyNotFound));
    assert_eq!(map.item(&"a"), Ok(&1));
}

#[test]
fn add_multiple() {
    let mut map = ImmutableHashMap::empty();
    for i in 0..10 {
        map = map.add(i, i * 10).unwrap();
    }
    assert_eq!(map.len(), 10);
    for i in 0..10 {
        assert_eq!(map.get(&i), Some(&(i * 10)));
    }
    check_invariants(&map);
}

/// The walkthrough from empty through add, duplicate add, overwrite and remove.
#[test]
fn add_set_remove_walkthrough() {
    let empty = ImmutableHashMap::<&str, i32>::empty();

    let one = empty.add("a", 1).unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one.get(&"a"), Some(&1));

    let two = one.add("b", 2).unwrap();
    assert_eq!(two.len(), 2);

    let same = two.add("a", 1).unwrap();
    assert!(same.ptr_eq(&two), "re-adding an equal pair must be a no-op");

    assert_eq!(two.add("a", 99).unwrap_err(), MapError::DuplicateKey);

    let updated = two.set_item("a", 99);
    assert_eq!(updated.len(), 2);
    assert_eq!(updated.get(&"a"), Some(&99));

    let removed = updated.remove(&"b");
    assert_eq!(removed.len(), 1);
    assert!(!removed.contains_key(&"b"));
    assert_eq!(removed.get(&"a"), Some(&99));
}

#[test]
fn set_item_overwrites() {
    let map = ImmutableHashMap::empty().set_item("k", 1);
    let map = map.set_item("k", 2);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&"k"), Some(&2));
}

#[test]
fn set_item_same_value_is_noop() {
    let map = ImmutableHashMap::empty().set_item("k", 1).set_item("j", 2);
    assert!(map.set_item("k", 1).ptr_eq(&map));
}

#[test]
fn contains_key_and_pair() {
    let map = ImmutableHashMap::empty().add(42, "val").unwrap();
    assert!(map.contains_key(&42));
    assert!(!map.contains_key(&2));
    assert!(map.contains(&42, &"val"));
    assert!(!map.contains(&42, &"other"));
    assert!(!map.contains(&7, &"val"));
}

#[test]
fn contains_value() {
    let map = ImmutableHashMap::empty()
        .add_range((0..50).map(|i| (i, i * 2)))
        .unwrap();
    assert!(map.contains_value(&98));
    assert!(!map.contains_value(&99));
}

#[test]
fn remove_existing() {
    let map = ImmutableHashMap::empty()
        .add("a", 1)
        .and_then(|m| m.add("b", 2))
        .unwrap();
    let removed = map.remove(&"a");
    assert_eq!(removed.len(), 1);
    assert_eq!(removed.get(&"a"), None);
    assert_eq!(removed.get(&"b"), Some(&2));
    // The original snapshot still holds both.
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&"a"), Some(&1));
}

#[test]
fn remove_missing_returns_same_map() {
    let map = ImmutableHashMap::empty().add("a", 1).unwrap();
    assert!(map.remove(&"z").ptr_eq(&map));

    let empty = ImmutableHashMap::<&str, i32>::empty();
    assert!(empty.remove(&"z").ptr_eq(&empty));
}

#[test]
fn remove_is_idempotent() {
    let map = ImmutableHashMap::empty()
        .add_range((0..20).map(|i| (i, i)))
        .unwrap();
    let once = map.remove(&7);
    let twice = once.remove(&7);
    assert!(twice.ptr_eq(&once));
}

#[test]
fn remove_all_collapses_to_empty() {
    let map = ImmutableHashMap::empty()
        .add_range([(1, 10), (2, 20), (3, 30)])
        .unwrap();
    let map = map.remove(&1).remove(&2).remove(&3);
    assert!(map.is_empty());
    assert!(map.ptr_eq(&ImmutableHashMap::empty()));
}

#[test]
fn add_range_rejects_conflicting_duplicates() {
    let result = ImmutableHashMap::empty().add_range([(1, "a"), (2, "b"), (1, "c")]);
    assert_eq!(result.unwrap_err(), MapError::DuplicateKey);

    // Repeating an identical pair is not a conflict.
    let map = ImmutableHashMap::empty()
        .add_range([(1, "a"), (1, "a")])
        .unwrap();
    assert_eq!(map.len(), 1);
}

#[test]
fn set_items_last_wins() {
    let map = ImmutableHashMap::empty().set_items([(1, "a"), (2, "b"), (1, "c")]);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), Some(&"c"));
}

#[test]
fn remove_range() {
    let map = ImmutableHashMap::empty()
        .add_range((0..100).map(|i| (i, i)))
        .unwrap();
    let evens: Vec<i32> = (0..100).step_by(2).collect();
    let odd = map.remove_range(&evens);
    assert_eq!(odd.len(), 50);
    assert!(odd.keys().all(|k| k % 2 == 1));
    check_invariants(&odd);

    let none = map.remove_range(0..100);
    assert!(none.is_empty());

    let untouched = map.remove_range([1000, 2000]);
    assert!(untouched.ptr_eq(&map));
}

#[test]
fn clear_keeps_comparers() {
    let map = ImmutableHashMap::empty()
        .add_range([(1, 1), (2, 2)])
        .unwrap();
    let cleared = map.clear();
    assert!(cleared.is_empty());
    assert!(cleared.comparers().ptr_eq(map.comparers()));
}
