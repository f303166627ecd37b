// ProbeMap integration test suite.
//
// Each test documents what behavior is being verified. The core invariants
// exercised:
// - Round-trip: every added key is found with its value; len matches.
// - Removal is idempotent and never an error for absent keys.
// - `set` upserts; `add` rejects duplicates.
// - Growth and compaction never lose or corrupt a live entry.
// - Tombstone tally policy: the tally is zeroed by growth, compaction and
//   clear, and shrinks when insert reuses a tombstone, so it always equals
//   the number of tombstones in the slot array.
use probe_map::{MapError, ProbeMap, COMPACTION_DIVISOR, MIN_CAPACITY};
use std::collections::HashSet;
use std::hash::{BuildHasher, Hasher};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// `i32` keys hash to themselves so slot placement is predictable. Only
// `i32` is supported; any other key type hits the `write` panic.
#[derive(Clone, Default)]
struct IdentityBuildHasher;
struct IdentityHasher(u64);
impl BuildHasher for IdentityBuildHasher {
    type Hasher = IdentityHasher;
    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher(0)
    }
}
impl Hasher for IdentityHasher {
    fn write(&mut self, _bytes: &[u8]) {
        unimplemented!("IdentityHasher only hashes i32 keys");
    }
    fn write_i32(&mut self, n: i32) {
        self.0 = n as u32 as u64;
    }
    fn finish(&self) -> u64 {
        self.0
    }
}

// Test: the walkthrough scenario at the minimum capacity.
// Verifies: len, contains, idempotent remove, re-add into a freed key, clear.
#[test]
fn concrete_scenario_capacity_8() {
    init_logging();
    let mut m: ProbeMap<i32, String> = ProbeMap::with_capacity(8);
    assert_eq!(m.capacity(), 8);
    for i in 0..5 {
        m.add(i, format!("V{i}")).unwrap();
    }
    assert_eq!(m.len(), 5);
    assert!(m.contains_key(&3));

    assert!(m.remove(&3));
    assert!(!m.contains_key(&3));
    assert_eq!(m.len(), 4);

    assert!(!m.remove(&999));
    assert_eq!(m.len(), 4);

    m.add(3, "new".to_string()).unwrap();
    assert_eq!(m.get(&3).map(String::as_str), Ok("new"));
    assert_eq!(m.len(), 5);

    m.clear();
    assert_eq!(m.len(), 0);
    assert!(!m.contains_key(&0));
    assert_eq!(m.capacity(), 8);
}

// Test: round-trip over many distinct keys.
#[test]
fn round_trip_distinct_keys() {
    let mut m = ProbeMap::new();
    for i in 0..1_000u32 {
        m.add(format!("key-{i}"), i).unwrap();
    }
    assert_eq!(m.len(), 1_000);
    for i in 0..1_000u32 {
        let k = format!("key-{i}");
        assert!(m.contains_key(k.as_str()));
        assert_eq!(m.get(k.as_str()), Ok(&i));
    }
}

// Test: removing twice returns true then false; absent removal keeps len.
#[test]
fn idempotent_removal() {
    let mut m = ProbeMap::new();
    m.add("a", 1).unwrap();
    m.add("b", 2).unwrap();
    assert!(!m.remove(&"zzz"));
    assert_eq!(m.len(), 2);
    assert!(m.remove(&"a"));
    assert!(!m.remove(&"a"));
    assert_eq!(m.len(), 1);
}

// Test: set twice on one key keeps len and the last value wins.
#[test]
fn upsert_semantics() {
    let mut m = ProbeMap::new();
    assert_eq!(m.set("k", 1), None);
    let len = m.len();
    assert_eq!(m.set("k", 2), Some(1));
    assert_eq!(m.len(), len);
    assert_eq!(m.get(&"k"), Ok(&2));
}

// Test: the second add of a key fails and len grows by one in total.
#[test]
fn duplicate_rejection() {
    let mut m = ProbeMap::new();
    m.add(7u8, "first").unwrap();
    assert_eq!(m.add(7u8, "second"), Err(MapError::DuplicateKey));
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&7), Ok(&"first"));
}

// Test: get on an absent key is an error; contains_key probes without one.
#[test]
fn missing_key_error() {
    let m: ProbeMap<u64, u64> = ProbeMap::new();
    assert!(!m.contains_key(&1));
    assert_eq!(m.get(&1), Err(MapError::KeyNotFound));
    assert_eq!(MapError::KeyNotFound.to_string(), "key not found");
}

// Test: a null key is refused distinctly from an absent one.
#[test]
fn null_key_refused() {
    let mut m: ProbeMap<String, ()> = ProbeMap::new();
    assert_eq!(m.try_remove::<str>(None), Err(MapError::NullKey));
    assert_eq!(m.try_remove(Some("absent")), Ok(false));
}

// Test: several doublings keep every key and value.
#[test]
fn growth_preserves_membership() {
    init_logging();
    let mut m = ProbeMap::with_capacity(8);
    for i in 0..5_000u64 {
        m.add(i, i * 3).unwrap();
    }
    assert!(m.capacity() >= 8 << 9);
    assert_eq!(m.tombstones(), 0);
    for i in 0..5_000u64 {
        assert_eq!(m.get(&i), Ok(&(i * 3)));
    }
}

// Test: interleaved inserts and removes force repeated compactions without
// losing or corrupting a live entry.
#[test]
fn compaction_preserves_membership() {
    init_logging();
    let mut m = ProbeMap::with_capacity(400);
    let mut live = HashSet::new();
    for round in 0..20u32 {
        for i in 0..50u32 {
            let k = round * 1_000 + i;
            m.add(k, k.to_string()).unwrap();
            live.insert(k);
        }
        for i in (0..50u32).step_by(2) {
            let k = round * 1_000 + i;
            assert!(m.remove(&k));
            live.remove(&k);
        }
        assert!(m.tombstones() <= m.capacity() / COMPACTION_DIVISOR);
    }
    assert_eq!(m.len(), live.len());
    for k in &live {
        assert_eq!(m.get(k), Ok(&k.to_string()));
    }
    assert_eq!(m.keys().count(), live.len());
}

// Test: tombstone tally policy. Removals add tombstones until compaction
// clears them; reusing a tombstone, growth and clear all keep the tally equal
// to the tombstones actually in the array.
#[test]
fn tombstone_tally_policy() {
    let mut m: ProbeMap<i32, (), IdentityBuildHasher> =
        ProbeMap::with_capacity_and_hasher(100, IdentityBuildHasher);
    for k in 0..60 {
        m.add(k, ()).unwrap();
    }

    // Five tombstones fit under the 100 / 20 threshold.
    for k in 0..5 {
        m.remove(&k);
    }
    assert_eq!(m.tombstones(), 5);

    // Key 100 homes to slot 0, a tombstone: reused, tally drops.
    m.add(100, ()).unwrap();
    assert_eq!(m.tombstones(), 4);

    // Clear zeroes the tally.
    m.clear();
    assert_eq!(m.tombstones(), 0);

    // Growth zeroes the tally.
    for k in 0..70 {
        m.add(k, ()).unwrap();
    }
    m.remove(&1);
    m.remove(&2);
    assert_eq!(m.tombstones(), 2);
    // 68 live; the eighth insert would make 76 > 75 and doubles first.
    for k in 70..78 {
        m.add(k, ()).unwrap();
    }
    assert_eq!(m.capacity(), 200);
    assert_eq!(m.tombstones(), 0);

    // The eleventh tombstone exceeds 200 / 20 and compacts.
    for k in 10..20 {
        m.remove(&k);
    }
    assert_eq!(m.tombstones(), 10);
    m.remove(&20);
    assert_eq!(m.tombstones(), 0);
    assert_eq!(m.capacity(), 200);
}

// Test: set on an existing key never reallocates, even right at the load
// threshold.
#[test]
fn overwrite_at_threshold_does_not_grow() {
    let mut m = ProbeMap::with_capacity(MIN_CAPACITY);
    for i in 0..6 {
        m.add(i, 0).unwrap();
    }
    assert_eq!(m.capacity(), 8);
    for i in 0..6 {
        m.set(i, 1);
    }
    assert_eq!(m.capacity(), 8);
    assert_eq!(m.len(), 6);
    m.set(6, 1);
    assert_eq!(m.capacity(), 16);
}

// Test: contains_value scans live values only.
#[test]
fn contains_value_scan() {
    let mut m = ProbeMap::new();
    for i in 1..=5 {
        m.add(i, format!("Value {i}")).unwrap();
    }
    assert!(m.contains_value(&"Value 4".to_string()));
    m.remove(&4);
    assert!(!m.contains_value(&"Value 4".to_string()));
}

// Test: keys, values and full enumeration agree with each other.
#[test]
fn enumerations_agree() {
    let m: ProbeMap<u32, u32> = (0..100).map(|i| (i, i + 1)).collect();
    let keys: Vec<u32> = m.keys().copied().collect();
    let values: Vec<u32> = m.values().copied().collect();
    let pairs: Vec<(u32, u32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(keys.len(), 100);
    for ((k, v), (pk, pv)) in keys.iter().zip(values.iter()).zip(pairs.iter()) {
        assert_eq!(k, pk);
        assert_eq!(v, pv);
        assert_eq!(*v, *k + 1);
    }
    let mut sum = 0;
    for (_, v) in &m {
        sum += *v;
    }
    assert_eq!(sum, (1..=100).sum::<u32>());
}
