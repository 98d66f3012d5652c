use crate::ImmutableHashMap;

#[test]
fn default_is_canonical_empty() {
    let map: ImmutableHashMap<i32, i32> = ImmutableHashMap::default();
    assert!(map.is_empty());
    assert!(map.ptr_eq(&ImmutableHashMap::empty()));
}

#[test]
fn debug_format() {
    let map = ImmutableHashMap::empty().add(1, 2).unwrap();
    let dbg = format!("{map:?}");
    assert!(dbg.contains("ImmutableHashMap"));
    assert!(dbg.contains("len: 1"));
}

#[test]
fn display_lists_entries() {
    let empty = ImmutableHashMap::<i32, i32>::empty();
    assert_eq!(empty.to_string(), "ImmutableHashMap[]");

    let one = empty.add(1, 10).unwrap();
    assert_eq!(one.to_string(), "ImmutableHashMap[1:10]");

    let two = one.add(2, 20).unwrap();
    let text = two.to_string();
    assert!(text == "ImmutableHashMap[1:10,2:20]" || text == "ImmutableHashMap[2:20,1:10]");
}

#[test]
fn from_iterator() {
    let map: ImmutableHashMap<i32, i32> = vec![(1, 10), (2, 20), (3, 30)].into_iter().collect();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&1), Some(&10));
}

#[test]
fn from_iterator_last_wins() {
    let map: ImmutableHashMap<i32, &str> = [(1, "a"), (1, "b")].into_iter().collect();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&1), Some(&"b"));
}

#[test]
fn extend_trait() {
    let mut map = ImmutableHashMap::empty().add(1, 10).unwrap();
    let snapshot = map.clone();
    map.extend(vec![(2, 20), (3, 30)]);
    assert_eq!(map.len(), 3);
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn index_existing() {
    let map = ImmutableHashMap::empty().add("key", 42).unwrap();
    assert_eq!(map[&"key"], 42);
}

#[test]
#[should_panic(expected = "key not found")]
fn index_missing_panics() {
    let map: ImmutableHashMap<i32, i32> = ImmutableHashMap::empty();
    let _ = map[&999];
}
