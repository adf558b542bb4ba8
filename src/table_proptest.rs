#![cfg(test)]

// Property tests for both tables, kept inside the crate so the harness can
// share one driver through a private trait.

use crate::hashing::{AsciiSum, PositionalSum, StrHash};
use crate::prime::is_prime;
use crate::{ChainedTable, ProbingTable, CHAINED_MAX_LOAD, PROBING_MAX_LOAD};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Common surface of the two tables for the state-machine driver.
trait Table {
    fn put(&mut self, k: &str, v: i32);
    fn get(&self, k: &str) -> Option<i32>;
    fn get_mut(&mut self, k: &str) -> Option<&mut i32>;
    fn contains_key(&self, k: &str) -> bool;
    fn remove(&mut self, k: &str) -> Option<i32>;
    fn resize(&mut self, n: usize);
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn capacity(&self) -> usize;
    fn table_load(&self) -> f64;
    fn empty_buckets(&self) -> usize;
    fn entries(&self) -> BTreeMap<String, i32>;
    // Whether `resize(n)` must leave the table untouched.
    fn rejects_resize(&self, n: usize) -> bool;
    fn load_ok_after_put(&self) -> bool;
    // Live entries counted by walking the storage, independent of `len`.
    fn counted_entries(&self) -> usize;
}

macro_rules! impl_table {
    ($ty:ident) => {
        impl<H: StrHash> Table for $ty<i32, H> {
            fn put(&mut self, k: &str, v: i32) {
                $ty::put(self, k, v)
            }
            fn get(&self, k: &str) -> Option<i32> {
                $ty::get(self, k).copied()
            }
            fn get_mut(&mut self, k: &str) -> Option<&mut i32> {
                $ty::get_mut(self, k)
            }
            fn contains_key(&self, k: &str) -> bool {
                $ty::contains_key(self, k)
            }
            fn remove(&mut self, k: &str) -> Option<i32> {
                $ty::remove(self, k)
            }
            fn resize(&mut self, n: usize) {
                $ty::resize(self, n)
            }
            fn clear(&mut self) {
                $ty::clear(self)
            }
            fn len(&self) -> usize {
                $ty::len(self)
            }
            fn capacity(&self) -> usize {
                $ty::capacity(self)
            }
            fn table_load(&self) -> f64 {
                $ty::table_load(self)
            }
            fn empty_buckets(&self) -> usize {
                $ty::empty_buckets(self)
            }
            fn entries(&self) -> BTreeMap<String, i32> {
                self.get_all_entries()
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect()
            }
            fn rejects_resize(&self, n: usize) -> bool {
                <Self as Rules>::rejects_resize(self, n)
            }
            fn load_ok_after_put(&self) -> bool {
                <Self as Rules>::load_ok_after_put(self)
            }
            fn counted_entries(&self) -> usize {
                <Self as Rules>::counted_entries(self)
            }
        }
    };
}

trait Rules {
    fn rejects_resize(&self, n: usize) -> bool;
    fn load_ok_after_put(&self) -> bool;
    fn counted_entries(&self) -> usize;
}

impl<H: StrHash> Rules for ChainedTable<i32, H> {
    fn rejects_resize(&self, n: usize) -> bool {
        n < 1
    }
    fn load_ok_after_put(&self) -> bool {
        self.table_load() <= CHAINED_MAX_LOAD
    }
    fn counted_entries(&self) -> usize {
        self.chain_lengths()
    }
}

impl<H: StrHash> Rules for ProbingTable<i32, H> {
    fn rejects_resize(&self, n: usize) -> bool {
        n < self.len()
    }
    // The load was below the threshold right before the insertion.
    fn load_ok_after_put(&self) -> bool {
        (self.len() - 1) as f64 / (self.capacity() as f64) < PROBING_MAX_LOAD
    }
    fn counted_entries(&self) -> usize {
        self.occupied_slots()
    }
}

impl_table!(ChainedTable);
impl_table!(ProbingTable);

#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Resize(usize),
    Clear,
    Iterate,
}

// Pool-indexed keys keep collisions and repeats frequent.
fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-e]{0,4}", 1..=12).prop_flat_map(|pool| {
        let n = pool.len();
        let op = prop_oneof![
            6 => (0..n, any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            3 => (0..n).prop_map(Op::Remove),
            2 => (0..n).prop_map(Op::Get),
            1 => "[a-e]{0,4}".prop_map(Op::Contains),
            1 => (0..n, -100i32..100).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => (0usize..40).prop_map(Op::Resize),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn check<T: Table>(mut sut: T, pool: &[String], ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = &pool[i];
                sut.put(k, v);
                model.insert(k.clone(), v);
                prop_assert!(sut.load_ok_after_put(), "load {} after put", sut.table_load());
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let cap = sut.capacity();
                prop_assert_eq!(sut.remove(k), model.remove(k));
                prop_assert_eq!(sut.capacity(), cap);
                prop_assert!(!sut.contains_key(k));
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k).copied());
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(s), Some(m)) => {
                        *s = s.saturating_add(d);
                        *m = m.saturating_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "get_mut mismatch: {:?} vs {:?}", s, m),
                }
            }
            Op::Resize(n) => {
                let before = sut.entries();
                let cap = sut.capacity();
                let rejected = sut.rejects_resize(n);
                sut.resize(n);
                if rejected {
                    prop_assert_eq!(sut.capacity(), cap);
                } else {
                    prop_assert!(sut.capacity() >= n);
                }
                prop_assert_eq!(sut.entries(), before);
            }
            Op::Clear => {
                let cap = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap);
                prop_assert_eq!(sut.empty_buckets(), cap);
            }
            Op::Iterate => {
                let m: BTreeMap<String, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(sut.entries(), m);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.counted_entries(), sut.len());
        prop_assert!(sut.len() <= sut.capacity());
        prop_assert!(is_prime(sut.capacity()), "capacity {} not prime", sut.capacity());
        prop_assert!(sut.empty_buckets() <= sut.capacity());
        for k in pool {
            prop_assert_eq!(sut.get(k), model.get(k).copied());
        }
    }
    Ok(())
}

fn zero_hash(_: &str) -> u64 {
    0
}

// Property: both tables behave like std's HashMap under random operation
// sequences, for each hasher, including a constant one that forces every
// key onto the same probe path / chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn chained_matches_model((pool, ops) in arb_scenario(), cap in 0usize..16) {
        check(ChainedTable::<i32, _>::with_hasher(cap, AsciiSum), &pool, ops.clone())?;
        check(ChainedTable::<i32, _>::with_hasher(cap, PositionalSum), &pool, ops)?;
    }

    #[test]
    fn probing_matches_model((pool, ops) in arb_scenario(), cap in 0usize..16) {
        check(ProbingTable::<i32, _>::with_hasher(cap, AsciiSum), &pool, ops.clone())?;
        check(ProbingTable::<i32, _>::with_hasher(cap, PositionalSum), &pool, ops)?;
    }

    #[test]
    fn chained_matches_model_with_collisions((pool, ops) in arb_scenario()) {
        check(ChainedTable::<i32, _>::with_hasher(3, zero_hash), &pool, ops)?;
    }

    #[test]
    fn probing_matches_model_with_collisions((pool, ops) in arb_scenario()) {
        check(ProbingTable::<i32, _>::with_hasher(3, zero_hash), &pool, ops)?;
    }

    // Removing a key that was never inserted changes nothing.
    #[test]
    fn remove_absent_is_idempotent(keys in proptest::collection::vec("[a-z]{1,6}", 0..30)) {
        let mut c: ChainedTable<usize> = ChainedTable::new(5);
        let mut p: ProbingTable<usize> = ProbingTable::new(5);
        for (i, k) in keys.iter().enumerate() {
            c.put(k, i);
            p.put(k, i);
        }
        let (c_len, c_cap) = (c.len(), c.capacity());
        let (p_len, p_cap) = (p.len(), p.capacity());
        for _ in 0..3 {
            prop_assert!(c.remove("NOT-A-KEY").is_none());
            prop_assert!(p.remove("NOT-A-KEY").is_none());
        }
        prop_assert_eq!((c.len(), c.capacity()), (c_len, c_cap));
        prop_assert_eq!((p.len(), p.capacity()), (p_len, p_cap));
    }
}
