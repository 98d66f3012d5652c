use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{ImmutableHashMap, MapError};

use super::check_invariants;

/// 1000 entries: add all, verify all, remove all.
#[test]
fn thousand_entries() {
    let mut map = ImmutableHashMap::empty();
    for i in 0_u64..1000 {
        map = map.add(i, i * 3).unwrap();
    }
    assert_eq!(map.len(), 1000);

    for i in 0_u64..1000 {
        assert_eq!(map.get(&i), Some(&(i * 3)), "missing key {i}");
    }

    for i in 0_u64..1000 {
        let next = map.remove(&i);
        assert_eq!(next.len(), map.len() - 1, "failed to remove key {i}");
        map = next;
    }
    assert!(map.is_empty());
}

/// Add + overwrite + remove interleaved.
#[test]
fn interleaved_operations() {
    let mut map = ImmutableHashMap::empty();
    for i in 0_u64..200 {
        map = map.add(i, i).unwrap();
    }
    // Overwrite even keys.
    for i in (0_u64..200).step_by(2) {
        map = map.set_item(i, i + 1000);
    }
    // Remove odd keys.
    for i in (1_u64..200).step_by(2) {
        map = map.remove(&i);
    }
    assert_eq!(map.len(), 100);
    for i in (0_u64..200).step_by(2) {
        assert_eq!(map.get(&i), Some(&(i + 1000)));
    }
    check_invariants(&map);
}

/// Seeded random operations replayed against `std::collections::HashMap`.
#[test]
fn random_ops_match_std_hashmap() {
    let mut rng = StdRng::seed_from_u64(0x5EED_CAFE);
    let mut map = ImmutableHashMap::empty();
    let mut reference = HashMap::new();

    for step in 0..20_000 {
        let key: u16 = rng.gen_range(0..2_048);
        let value: u32 = rng.gen_range(0..4);
        match rng.gen_range(0..3) {
            0 => match map.add(key, value) {
                Ok(next) => {
                    assert!(reference.get(&key).is_none_or(|&old| old == value));
                    reference.insert(key, value);
                    map = next;
                }
                Err(err) => {
                    assert_eq!(err, MapError::DuplicateKey);
                    assert_ne!(reference.get(&key), Some(&value));
                    assert!(reference.contains_key(&key));
                }
            },
            1 => {
                map = map.set_item(key, value);
                reference.insert(key, value);
            }
            _ => {
                map = map.remove(&key);
                reference.remove(&key);
            }
        }
        assert_eq!(map.len(), reference.len(), "count diverged at step {step}");
    }

    check_invariants(&map);
    let actual: HashMap<u16, u32> = map.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(actual, reference);
}
