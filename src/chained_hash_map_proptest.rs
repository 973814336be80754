#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can
// inspect bucket layout through the public diagnostics alongside the model.

use crate::chained_hash_map::ChainedHashMap;
use crate::error::MapError;
use core::hash::BuildHasher;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hasher;

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks,
// and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    InsertOrAssign(usize, i32),
    // `true` goes through `remove`, `false` through `erase`.
    Erase(usize, bool),
    At(usize),
    Mutate(usize, i32),
    Vivify(usize),
    ReadDefault(usize),
    Contains(String),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    // Pools big enough to push the table through several doublings.
    proptest::collection::vec("[a-z]{0,6}", 1..=48).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::InsertOrAssign(i, v)),
            4 => (idx.clone(), any::<bool>()).prop_map(|(i, r)| Op::Erase(i, r)),
            1 => idx.clone().prop_map(Op::At),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => idx.clone().prop_map(Op::Vivify),
            1 => idx.clone().prop_map(Op::ReadDefault),
            1 => "[a-z]{0,6}".prop_map(Op::Contains),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn check_layout<S: BuildHasher>(
    sut: &ChainedHashMap<String, i32, S>,
    model: &HashMap<String, i32>,
) -> Result<(), TestCaseError> {
    let mut seen = BTreeSet::new();
    let mut last_bucket = 0;
    for (k, v) in sut.iter() {
        prop_assert!(seen.insert(k.clone()), "duplicate key {:?} in iteration", k);
        prop_assert_eq!(Some(v), model.get(k));
        // Iteration walks buckets in ascending order.
        let b = sut.bucket_index(k.as_str()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(b >= last_bucket);
        prop_assert!(b < sut.capacity());
        last_bucket = b;
    }
    prop_assert_eq!(seen.len(), model.len());
    Ok(())
}

// Runs `ops` against both the map and a std HashMap model.
// Invariants checked after every op:
// - `len`/`is_empty` parity with the model.
// - Capacity is a power of two; after a structural insert/erase the load
//   factor is within [0.25, 0.75] or there is a single bucket.
// - `clear` keeps the bucket count.
fn run_scenario<S: BuildHasher>(
    mut sut: ChainedHashMap<String, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    // A fresh or cleared map keeps its bucket count until the next
    // structural change rebalances it.
    let mut balanced = false;

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                prop_assert_eq!(sut.insert(k.clone(), v), !already);
                if !already {
                    model.insert(k, v);
                    balanced = true;
                }
            }
            Op::InsertOrAssign(i, v) => {
                let k = pool[i].clone();
                let prev = model.insert(k.clone(), v);
                if prev.is_none() {
                    balanced = true;
                }
                prop_assert_eq!(sut.insert_or_assign(k, v), prev);
            }
            Op::Erase(i, via_remove) => {
                let k = &pool[i];
                let expected = model.remove(k);
                if expected.is_some() {
                    balanced = true;
                }
                if via_remove {
                    prop_assert_eq!(sut.remove(k.as_str()), expected);
                } else {
                    prop_assert_eq!(sut.erase(k.as_str()), expected.is_some());
                }
            }
            Op::At(i) => {
                let k = pool[i].as_str();
                match model.get(k) {
                    Some(v) => {
                        prop_assert_eq!(sut.at(k), Ok(v));
                        let idx = sut.bucket_index(k);
                        prop_assert!(idx.is_ok());
                        prop_assert!(sut.bucket_size(k).unwrap() >= 1);
                    }
                    None => {
                        prop_assert_eq!(sut.at(k), Err(MapError::NotFound));
                        prop_assert_eq!(sut.bucket_index(k), Err(MapError::NotFound));
                        prop_assert_eq!(sut.bucket_size(k), Err(MapError::NotFound));
                    }
                }
            }
            Op::Mutate(i, d) => {
                let k = pool[i].as_str();
                match sut.at_mut(k) {
                    Ok(v) => {
                        *v = v.wrapping_add(d);
                        let mv = model.get_mut(k).expect("model has key");
                        *mv = mv.wrapping_add(d);
                    }
                    Err(_) => prop_assert!(!model.contains_key(k)),
                }
            }
            Op::Vivify(i) => {
                let k = pool[i].clone();
                let expected = *model.entry(k.clone()).or_insert_with(|| {
                    balanced = true;
                    0
                });
                prop_assert_eq!(*sut.get_or_insert_default(k), expected);
            }
            Op::ReadDefault(i) => {
                let k = pool[i].as_str();
                let len = sut.len();
                prop_assert_eq!(sut.value_or_default(k), model.get(k).copied().unwrap_or_default());
                prop_assert_eq!(sut.len(), len);
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            Op::Clear => {
                let cap = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap);
                balanced = false;
            }
            Op::Iterate => check_layout(&sut, &model)?,
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity().is_power_of_two());
        if balanced {
            let lf = sut.load_factor();
            prop_assert!(
                sut.capacity() == 1 || (0.25..=0.75).contains(&lf),
                "load factor {} at len {} capacity {}",
                lf,
                sut.len(),
                sut.capacity()
            );
        }
    }
    check_layout(&sut, &model)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ChainedHashMap::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution
// within a single bucket.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(ChainedHashMap::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

// Property: a clone compares equal to its source and stays equal to a
// rebuilt map after the source is mutated.
proptest! {
    #[test]
    fn prop_clone_and_equality(entries in proptest::collection::vec(("[a-z]{1,4}", any::<i32>()), 0..64)) {
        let mut a: ChainedHashMap<String, i32> = ChainedHashMap::new();
        for (k, v) in &entries {
            a.insert(k.clone(), *v);
        }
        let b = a.clone();
        prop_assert_eq!(&a, &b);

        // Same entries inserted in reverse order of iteration.
        let mut rev: ChainedHashMap<String, i32> = ChainedHashMap::new();
        let collected: Vec<(String, i32)> = a.iter().map(|(k, v)| (k.clone(), *v)).collect();
        for (k, v) in collected.into_iter().rev() {
            rev.insert(k, v);
        }
        prop_assert_eq!(&a, &rev);

        a.insert("new-key".to_string(), 0);
        prop_assert_ne!(&a, &b);
        prop_assert_eq!(&b, &rev);
    }
}
