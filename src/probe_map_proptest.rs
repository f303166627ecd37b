#![cfg(test)]

// Property tests for ProbeMap kept inside the crate so every step can be
// checked against the slot-array invariants, not just the public surface.

use crate::error::MapError;
use crate::probe_map::ProbeMap;
use crate::probe_table::test_hashers::ConstBuildHasher;
use core::hash::BuildHasher;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeMap, HashMap};

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks,
// and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Add(usize, i32),
    Set(usize, i32),
    Remove(usize),
    RemoveNull,
    Get(usize),
    Contains(String),
    ContainsValue(i32),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), -8i32..8).prop_map(|(i, v)| OpI::Add(i, v)),
            3 => (idx.clone(), -8i32..8).prop_map(|(i, v)| OpI::Set(i, v)),
            5 => idx.clone().prop_map(OpI::Remove),
            1 => Just(OpI::RemoveNull),
            2 => idx.clone().prop_map(OpI::Get),
            2 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,4}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (-8i32..8).prop_map(OpI::ContainsValue),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap. After every
// op the slot array must satisfy its structural invariants: count and
// tombstone tallies match a full scan, the load factor holds, and every live
// key is reachable from its home index.
fn run_scenario<S: BuildHasher>(
    mut sut: ProbeMap<String, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Add(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                match sut.add(k.clone(), v) {
                    Ok(()) => {
                        prop_assert!(!already, "add must fail on duplicate");
                        model.insert(k, v);
                    }
                    Err(MapError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                    }
                    Err(e) => {
                        prop_assert!(false, "unexpected add error {:?}", e);
                    }
                }
            }
            OpI::Set(i, v) => {
                let k = pool[i].clone();
                let cap = sut.capacity();
                let prev = sut.set(k.clone(), v);
                let model_prev = model.insert(k, v);
                prop_assert_eq!(prev, model_prev);
                if prev.is_some() {
                    prop_assert_eq!(sut.capacity(), cap, "overwrite must not reallocate");
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let removed = sut.remove_entry(k.as_str());
                let model_removed = model.remove_entry(k);
                prop_assert_eq!(removed, model_removed);
            }
            OpI::RemoveNull => {
                prop_assert_eq!(sut.try_remove::<str>(None), Err(MapError::NullKey));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                match model.get(k) {
                    Some(v) => {
                        prop_assert_eq!(sut.get(k.as_str()), Ok(v));
                    }
                    None => {
                        prop_assert_eq!(sut.get(k.as_str()), Err(MapError::KeyNotFound));
                    }
                }
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            OpI::ContainsValue(v) => {
                let has_model = model.values().any(|x| *x == v);
                prop_assert_eq!(sut.contains_value(&v), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Ok(vr) = sut.get_mut(k.as_str()) {
                    *vr = vr.wrapping_add(d);
                    let mv = model.get_mut(k);
                    prop_assert!(mv.is_some(), "sut has a key the model lacks");
                    if let Some(mv) = mv {
                        *mv = mv.wrapping_add(d);
                    }
                } else {
                    prop_assert!(!model.contains_key(k));
                }
            }
            OpI::Iterate => {
                let s: BTreeMap<_, _> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m: BTreeMap<_, _> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s, m);
                prop_assert_eq!(sut.keys().len(), model.len());
            }
            OpI::Clear => {
                let cap = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap);
                prop_assert_eq!(sut.tombstones(), 0);
            }
        }

        sut.assert_consistent();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.tombstones() <= sut.capacity() / crate::COMPACTION_DIVISOR);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut: ProbeMap<String, i32, RandomState> = ProbeMap::with_capacity(8);
        run_scenario(sut, &pool, ops)?;
    }
}

// Same invariants under worst-case collisions: every key shares one home
// index, so equality alone separates entries inside a single cluster.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ProbeMap::with_capacity_and_hasher(8, ConstBuildHasher);
        run_scenario(sut, &pool, ops)?;
    }
}
