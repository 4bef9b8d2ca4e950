#![cfg(test)]

// Property tests for Table kept inside the crate so they can check the
// slot accounting (`count`, `capacity`, tombstones) alongside the model.

use crate::interner::{Interner, Key};
use crate::table::Table;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Get(usize),
    Delete(usize),
    Release,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,6}", 1..=40).prop_flat_map(|pool| {
        let n = pool.len();
        let op = prop_oneof![
            6 => (0..n, any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            3 => (0..n).prop_map(OpI::Get),
            3 => (0..n).prop_map(OpI::Delete),
            1 => Just(OpI::Release),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn check_accounting(t: &Table, model: &HashMap<Key, i32>) -> Result<(), TestCaseError> {
    let cap = t.capacity();
    prop_assert!(cap == 0 || (cap >= Table::MIN_CAPACITY && cap.is_power_of_two()));
    prop_assert!(t.count() * 4 <= cap * 3, "load factor exceeded");
    prop_assert_eq!(t.len(), model.len());
    prop_assert!(t.count() >= t.len());
    prop_assert_eq!(t.iter().count(), model.len());
    for (k, v) in t.iter() {
        prop_assert_eq!(model.get(&k), Some(&v));
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `set` reports a new key exactly when the model lacked it.
// - `get`/`delete` agree with the model for present and absent keys.
// - After every op: used slots stay within 3/4 of capacity, capacity is
//   0 or a power of two >= 8, and live entries equal the model.
// - Interned duplicates in the pool map to the same key.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut interner = Interner::new();
        let keys: Vec<Key> = pool.iter().map(|s| interner.intern(s)).collect();
        let mut sut = Table::new();
        let mut model: HashMap<Key, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Set(i, v) => {
                    let k = keys[i];
                    let was_new = sut.set(k, v).unwrap();
                    prop_assert_eq!(was_new, model.insert(k, v).is_none());
                }
                OpI::Get(i) => {
                    let k = keys[i];
                    prop_assert_eq!(sut.get(k), model.get(&k).copied());
                    prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
                }
                OpI::Delete(i) => {
                    let k = keys[i];
                    let used = sut.count();
                    prop_assert_eq!(sut.delete(k), model.remove(&k).is_some());
                    prop_assert_eq!(sut.count(), used);
                    prop_assert_eq!(sut.get(k), None);
                }
                OpI::Release => {
                    sut.release();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), 0);
                }
            }
            check_accounting(&sut, &model)?;
        }
    }
}

// Property: Growth preserves every live entry and purges all tombstones.
proptest! {
    #[test]
    fn prop_growth_preserves_live_entries(n in 1usize..300, every in 2usize..5) {
        let mut interner = Interner::new();
        let mut t = Table::new();
        let mut model: HashMap<Key, i32> = HashMap::new();

        for i in 0..n {
            let k = interner.intern(&format!("k{i}"));
            let cap_before = t.capacity();
            t.set(k, i as i32).unwrap();
            model.insert(k, i as i32);
            if t.capacity() != cap_before {
                // Only the just-inserted key can have added a used slot.
                prop_assert_eq!(t.tombstones(), 0);
                prop_assert_eq!(t.count(), t.len());
            }
            if i % every == 0 {
                let victim = interner.intern(&format!("k{}", i / 2));
                t.delete(victim);
                model.remove(&victim);
            }
            for (mk, mv) in &model {
                prop_assert_eq!(t.get(*mk), Some(*mv));
            }
        }
    }
}
