use std::collections::BTreeMap;
use std::sync::Once;

use llrb_map::llrb_map::{Entry, IntoIter};
use llrb_map::{KeyNotFound, LlrbMap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use simplelog::{Config, LevelFilter, TestLogger};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 4_000;

const SAMPLE_KEYS: [i32; 7] = [5, 3, 8, 1, 4, 7, 9];

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = TestLogger::init(LevelFilter::Trace, Config::default());
    });
}

fn sample_map() -> LlrbMap<i32, i32> {
    init_logging();
    let mut map = LlrbMap::new();
    for key in SAMPLE_KEYS {
        map.insert(key, key * 10);
    }
    map
}

fn walk_keys<K: Copy, V>(map: &LlrbMap<K, V>) -> Vec<K> {
    let mut keys = Vec::new();
    let mut cursor = map.begin();
    while cursor != map.end() {
        keys.push(*cursor.key().unwrap());
        cursor.advance();
    }
    keys
}

/// Generates keys in a range smaller than `TEST_SIZE` so that operations collide.
fn key_strategy() -> impl Strategy<Value = i64> {
    -2_000i64..2_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn in_order_traversal_of_sample_tree() {
    let map = sample_map();
    assert_eq!(map.len(), 7);
    assert_eq!(walk_keys(&map), [1, 3, 4, 5, 7, 8, 9]);
}

#[test]
fn erase_root_key_keeps_order() {
    let mut map = sample_map();
    map.erase(&5);
    assert_eq!(map.len(), 6);
    assert_eq!(walk_keys(&map), [1, 3, 4, 7, 8, 9]);
    assert!(map.find(&5) == map.end());
}

#[test]
fn erase_absent_key_changes_nothing() {
    let mut map = sample_map();
    map.erase(&6);
    map.erase(&100);
    assert_eq!(map.len(), 7);
    assert_eq!(walk_keys(&map), [1, 3, 4, 5, 7, 8, 9]);
}

#[test]
fn at_returns_stored_value() {
    let map = sample_map();
    assert_eq!(*map.at(&3), 30);
    assert_eq!(map[&9], 90);
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn at_missing_key_panics() {
    let map = sample_map();
    map.at(&6);
}

#[test]
fn at_mut_updates_value() {
    let mut map = sample_map();
    *map.at_mut(&4) += 1;
    assert_eq!(map[&4], 41);
    assert_eq!(map.len(), 7);
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn at_mut_missing_key_panics() {
    let mut map = sample_map();
    *map.at_mut(&6) = 60;
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn index_missing_key_panics() {
    let map = sample_map();
    let _value = map[&0];
}

#[test]
fn try_at_reports_missing_key() {
    let map = sample_map();
    assert_eq!(map.try_at(&4), Ok(&40));
    assert_eq!(map.try_at(&6), Err(KeyNotFound));
    assert_eq!(KeyNotFound.to_string(), "no entry found for key");
}

#[test]
fn indexed_access_inserts_default_on_miss() {
    let mut map = sample_map();
    assert_eq!(*map.get_or_insert_default(10), 0);
    assert_eq!(map.len(), 8);

    *map.get_or_insert_default(10) = 100;
    *map.get_or_insert_default(3) += 1;
    assert_eq!(map.len(), 8);
    assert_eq!(map[&10], 100);
    assert_eq!(map[&3], 31);
    assert_eq!(walk_keys(&map), [1, 3, 4, 5, 7, 8, 9, 10]);
}

#[test]
fn find_absent_key_is_end() {
    let map = sample_map();
    assert!(map.find(&100) == map.end());
    assert!(map.find(&100).is_end());
    assert_eq!(map.iter_from(&6).count(), 0);
}

#[test]
fn find_then_advance_yields_larger_keys() {
    let map = sample_map();
    for start in SAMPLE_KEYS {
        let mut cursor = map.find(&start);
        let mut seen = Vec::new();
        while let Some((&key, &value)) = cursor.key_value() {
            assert_eq!(value, key * 10);
            seen.push(key);
            cursor.advance();
        }
        let expected: Vec<i32> = [1, 3, 4, 5, 7, 8, 9].into_iter().filter(|&k| k >= start).collect();
        assert_eq!(seen, expected, "find({start})");
    }
}

#[test]
fn cursor_equality_is_by_position() {
    let map = sample_map();
    let mut cursor = map.begin();
    while cursor.key() != Some(&7) {
        assert!(cursor != map.find(&7));
        cursor.advance();
    }
    assert!(cursor == map.find(&7));

    let clone = cursor.clone();
    cursor.advance();
    assert!(clone != cursor);
    assert_eq!(clone.key(), Some(&7));
    assert_eq!(cursor.value(), Some(&80));
}

#[test]
fn cursors_of_distinct_maps_are_unequal() {
    let a = sample_map();
    let b = a.clone();
    assert!(a.end() != b.end());
    assert!(a.find(&3) != b.find(&3));
}

#[test]
fn advancing_past_the_end_stays_at_end() {
    let map = sample_map();
    let mut cursor = map.find(&9);
    cursor.advance();
    assert!(cursor == map.end());
    cursor.advance();
    assert!(cursor == map.end());
    assert_eq!(cursor.key_value(), None);
}

#[test]
fn empty_map_begin_is_end() {
    let map: LlrbMap<String, ()> = LlrbMap::new();
    assert!(map.begin() == map.end());
    assert_eq!(map.iter().next(), None);
    assert_eq!(map.first_key_value(), None);
    assert_eq!(map.last_key_value(), None);
}

#[test]
fn clear_empties_map_and_allows_reuse() {
    let mut map = sample_map();
    map.clear();
    assert!(map.is_empty());
    assert!(map.begin() == map.end());

    map.insert(2, 20);
    assert_eq!(walk_keys(&map), [2]);
}

#[test]
fn insert_existing_key_replaces_value_only() {
    let mut map = sample_map();
    assert_eq!(map.insert(4, -4), Some(40));
    assert_eq!(map.len(), 7);
    assert_eq!(map[&4], -4);
}

#[test]
fn ascending_and_descending_inserts_stay_ordered() {
    init_logging();
    let ascending: LlrbMap<u32, u32> = (0..1_000).map(|k| (k, k)).collect();
    let descending: LlrbMap<u32, u32> = (0..1_000).rev().map(|k| (k, k)).collect();
    assert_eq!(ascending, descending);
    assert_eq!(walk_keys(&ascending), (0..1_000).collect::<Vec<_>>());
}

#[test]
fn borrowed_lookups_with_string_keys() {
    let mut map: LlrbMap<String, usize> = ["apple", "pear", "fig"].iter().map(|s| ((*s).to_owned(), s.len())).collect();
    assert_eq!(map.get("pear"), Some(&4));
    assert!(map.contains_key("fig"));
    assert_eq!(map.find("apple").value(), Some(&5));
    map.erase("apple");
    assert_eq!(map.keys().map(String::as_str).collect::<Vec<_>>(), ["fig", "pear"]);
}

#[test]
fn entry_api_counts_words() {
    let mut counts: LlrbMap<&str, usize> = LlrbMap::new();
    for word in "the cat and the hat and the bat".split(' ') {
        counts.entry(word).and_modify(|n| *n += 1).or_insert(1);
    }
    assert_eq!(
        counts.iter().map(|(&k, &v)| (k, v)).collect::<Vec<_>>(),
        [("and", 2), ("bat", 1), ("cat", 1), ("hat", 1), ("the", 3)]
    );

    match counts.entry("the") {
        Entry::Occupied(o) => assert_eq!(o.remove_entry(), ("the", 3)),
        Entry::Vacant(_) => panic!("`the` should be present"),
    }
    match counts.entry("dog") {
        Entry::Vacant(v) => assert_eq!(*v.insert(7), 7),
        Entry::Occupied(_) => panic!("`dog` should be absent"),
    }
    assert_eq!(counts.len(), 5);
}

#[test]
fn debug_formats_like_a_map() {
    let map = LlrbMap::from([(2, 'b'), (1, 'a')]);
    assert_eq!(format!("{map:?}"), "{1: 'a', 2: 'b'}");
    assert_eq!(format!("{:?}", map.keys()), "[1, 2]");
    assert_eq!(format!("{:?}", map.find(&2)), "Cursor { entry: Some((2, 'b')), depth: 1 }");
}

#[test]
fn full_iterators_report_exact_length() {
    let map = sample_map();
    let mut iter = map.iter();
    for remaining in (0..=7).rev() {
        assert_eq!(iter.size_hint(), (remaining, Some(remaining)));
        iter.next();
    }
    assert_eq!(iter.size_hint(), (0, Some(0)));

    let mut keys = map.keys();
    keys.next();
    assert_eq!(keys.size_hint(), (6, Some(6)));
    assert_eq!(map.values().size_hint(), (7, Some(7)));
    assert_eq!(LlrbMap::<i32, i32>::new().iter().size_hint(), (0, Some(0)));
}

#[test]
fn iterators_from_a_cursor_have_open_length() {
    let map = sample_map();
    let mut iter = map.iter_from(&8);
    assert_eq!(iter.size_hint(), (1, None));
    assert_eq!(iter.by_ref().count(), 2);
    assert_eq!(iter.size_hint(), (0, Some(0)));
    assert_eq!(map.iter_from(&6).size_hint(), (0, Some(0)));
}

#[test]
fn retain_keeps_unvisited_entries_when_predicate_panics() {
    let mut map: LlrbMap<i32, i32> = (0..100).map(|k| (k, k)).collect();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        map.retain(|&k, _| {
            assert!(k != 50, "stop at 50");
            k % 2 == 0
        });
    }));
    assert!(result.is_err());

    let expected: Vec<i32> = (0..50).filter(|k| k % 2 == 0).chain(50..100).collect();
    assert_eq!(walk_keys(&map), expected);
    assert_eq!(map.len(), 75);
    assert_eq!(map[&50], 50);
}

#[test]
fn default_into_iter_is_empty() {
    let iter: IntoIter<u8, u8> = Default::default();
    assert_eq!(iter.len(), 0);
}

// ─── Randomized comparisons against BTreeMap ─────────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Erase(i64),
    Remove(i64),
    Get(i64),
    ContainsKey(i64),
    TryAt(i64),
    GetOrInsertDefault(i64),
    FirstKeyValue,
    LastKeyValue,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => key_strategy().prop_map(MapOp::Erase),
        2 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => key_strategy().prop_map(MapOp::TryAt),
        1 => key_strategy().prop_map(MapOp::GetOrInsertDefault),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both LlrbMap and BTreeMap and
    /// asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut llrb: LlrbMap<i64, i64> = LlrbMap::new();
        let mut model: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(llrb.insert(*k, *v), model.insert(*k, *v), "insert({}, {})", k, v);
                }
                MapOp::Erase(k) => {
                    llrb.erase(k);
                    model.remove(k);
                    prop_assert!(llrb.find(k) == llrb.end(), "find({}) after erase", k);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(llrb.remove(k), model.remove(k), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(llrb.get(k), model.get(k), "get({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(llrb.contains_key(k), model.contains_key(k), "contains_key({})", k);
                }
                MapOp::TryAt(k) => {
                    prop_assert_eq!(llrb.try_at(k).ok(), model.get(k), "try_at({})", k);
                }
                MapOp::GetOrInsertDefault(k) => {
                    let ours = *llrb.get_or_insert_default(*k);
                    let theirs = *model.entry(*k).or_default();
                    prop_assert_eq!(ours, theirs, "get_or_insert_default({})", k);
                }
                MapOp::FirstKeyValue => {
                    prop_assert_eq!(llrb.first_key_value(), model.first_key_value(), "first_key_value");
                }
                MapOp::LastKeyValue => {
                    prop_assert_eq!(llrb.last_key_value(), model.last_key_value(), "last_key_value");
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(llrb.pop_first(), model.pop_first(), "pop_first");
                }
                MapOp::PopLast => {
                    prop_assert_eq!(llrb.pop_last(), model.pop_last(), "pop_last");
                }
            }
            prop_assert_eq!(llrb.len(), model.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(llrb.is_empty(), model.is_empty(), "is_empty mismatch after {:?}", op);
        }

        let ours: Vec<_> = llrb.iter().map(|(&k, &v)| (k, v)).collect();
        let theirs: Vec<_> = model.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(ours, theirs);
    }

    /// Tests that every way of walking the map agrees with BTreeMap.
    #[test]
    fn iteration_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let llrb: LlrbMap<i64, i64> = entries.iter().copied().collect();
        let model: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let theirs: Vec<_> = model.iter().map(|(&k, &v)| (k, v)).collect();

        let ours: Vec<_> = llrb.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&ours, &theirs, "iter() mismatch");

        let ours: Vec<_> = llrb.keys().copied().collect();
        prop_assert_eq!(ours, model.keys().copied().collect::<Vec<_>>(), "keys() mismatch");

        let ours: Vec<_> = llrb.values().copied().collect();
        prop_assert_eq!(ours, model.values().copied().collect::<Vec<_>>(), "values() mismatch");

        let ours: Vec<_> = llrb.clone().into_iter().collect();
        prop_assert_eq!(&ours, &theirs, "into_iter() mismatch");

        let ours: Vec<_> = llrb.clone().into_iter().rev().collect();
        let reversed: Vec<_> = theirs.iter().rev().copied().collect();
        prop_assert_eq!(ours, reversed, "into_iter().rev() mismatch");
    }

    /// Tests that iterating from `find(k)` yields exactly the keys `>= k`.
    #[test]
    fn find_resumes_like_btreemap_range(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE / 4),
        probes in proptest::collection::vec(key_strategy(), 64),
    ) {
        let llrb: LlrbMap<i64, i64> = entries.iter().copied().collect();
        let model: BTreeMap<i64, i64> = entries.iter().copied().collect();

        for probe in probes.iter().chain(entries.iter().map(|(k, _)| k).take(64)) {
            let ours: Vec<_> = llrb.iter_from(probe).map(|(&k, &v)| (k, v)).collect();
            let theirs: Vec<_> = if model.contains_key(probe) {
                model.range(probe..).map(|(&k, &v)| (k, v)).collect()
            } else {
                Vec::new()
            };
            prop_assert_eq!(ours, theirs, "iter_from({})", probe);
        }
    }

    /// Tests that retain keeps exactly what BTreeMap keeps, visiting in key order.
    #[test]
    fn retain_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut llrb: LlrbMap<i64, i64> = entries.iter().copied().collect();
        let mut model: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let mut visited = Vec::new();
        llrb.retain(|&k, v| {
            visited.push(k);
            *v = v.wrapping_add(1);
            k % 3 != 0
        });
        model.retain(|&k, v| {
            *v = v.wrapping_add(1);
            k % 3 != 0
        });

        prop_assert!(visited.windows(2).all(|w| w[0] < w[1]));
        let ours: Vec<_> = llrb.iter().map(|(&k, &v)| (k, v)).collect();
        let theirs: Vec<_> = model.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(ours, theirs);
    }

    /// Tests the Entry API matches BTreeMap behavior.
    #[test]
    fn entry_api_matches_btreemap(
        initial in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        entry_keys in proptest::collection::vec(key_strategy(), TEST_SIZE / 2),
    ) {
        let mut llrb: LlrbMap<i64, i64> = initial.iter().copied().collect();
        let mut model: BTreeMap<i64, i64> = initial.iter().copied().collect();

        for (i, k) in entry_keys.iter().enumerate() {
            if i % 2 == 0 {
                let ours = *llrb.entry(*k).and_modify(|v| *v = v.wrapping_mul(3)).or_insert(999);
                let theirs = *model.entry(*k).and_modify(|v| *v = v.wrapping_mul(3)).or_insert(999);
                prop_assert_eq!(ours, theirs, "entry({}).and_modify().or_insert()", k);
            } else {
                let ours = *llrb.entry(*k).or_insert_with_key(|key| key * 2);
                let theirs = *model.entry(*k).or_insert_with_key(|key| key * 2);
                prop_assert_eq!(ours, theirs, "entry({}).or_insert_with_key()", k);
            }
        }

        prop_assert!(llrb.iter().map(|(&k, &v)| (k, v)).eq(model.iter().map(|(&k, &v)| (k, v))));
    }

    /// Tests that equal maps compare, order and hash the same regardless of build order.
    #[test]
    fn equal_maps_agree_on_eq_ord_and_hash(entries in proptest::collection::btree_map(key_strategy(), value_strategy(), 0..TEST_SIZE / 4)) {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let forward: LlrbMap<i64, i64> = entries.iter().map(|(&k, &v)| (k, v)).collect();
        let backward: LlrbMap<i64, i64> = entries.iter().rev().map(|(&k, &v)| (k, v)).collect();

        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(forward.cmp(&backward), std::cmp::Ordering::Equal);

        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        forward.hash(&mut h1);
        backward.hash(&mut h2);
        prop_assert_eq!(h1.finish(), h2.finish(), "equal maps should have equal hashes");
    }
}
