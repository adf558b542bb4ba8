//! ChainedTable: separate chaining over prime-sized bucket arrays.

use crate::builder::TableBuilder;
use crate::chain::{Chain, ChainIter, Node, NodeKey, Nodes};
use crate::hashing::{bucket_index, AsciiSum, StrHash};
use crate::prime;
use crate::reentrancy::DebugReentrancy;
use crate::DEFAULT_CAPACITY;
use core::fmt;
use slotmap::SlotMap;

/// `put` grows the table first once the load reaches this value.
pub const CHAINED_MAX_LOAD: f64 = 1.0;

/// Hash table resolving collisions with one linked chain per bucket.
///
/// Entries sharing a bucket are kept in insertion order. Each entry caches
/// the hash of its key, so `resize` relinks chains without calling the
/// hasher again.
pub struct ChainedTable<V, H = AsciiSum> {
    hasher: H,
    store: Store<V>,
    reentrancy: DebugReentrancy,
}

// Bucket array plus the node arena. Knows nothing about hashing keys.
struct Store<V> {
    buckets: Vec<Chain>,
    nodes: Nodes<V>,
    len: usize,
}

impl<V> Store<V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: vec![Chain::default(); capacity],
            nodes: SlotMap::with_key(),
            len: 0,
        }
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        bucket_index(hash, self.buckets.len())
    }

    fn find(&self, hash: u64, key: &str) -> Option<NodeKey> {
        self.buckets[self.bucket_of(hash)].find(&self.nodes, hash, key)
    }

    // `len` always equals the sum of the chain lengths.
    fn load(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    // Overwrite in place or append to the bucket's chain.
    fn insert(&mut self, hash: u64, key: &str, value: V) {
        if let Some(node) = self.find(hash, key).and_then(|k| self.nodes.get_mut(k)) {
            node.value = value;
            return;
        }
        let b = self.bucket_of(hash);
        self.buckets[b].push_back(&mut self.nodes, Node::new(key.to_owned(), value, hash));
        self.len += 1;
    }

    fn remove(&mut self, hash: u64, key: &str) -> Option<V> {
        let b = self.bucket_of(hash);
        let node = self.buckets[b].remove(&mut self.nodes, hash, key)?;
        self.len -= 1;
        Some(node.value)
    }

    fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|c| *c = Chain::default());
        self.nodes.clear();
        self.len = 0;
    }

    // Relinks nodes into a fresh bucket array; never hashes a key.
    fn rebuild(&mut self, requested: usize) {
        let mut capacity = prime::normalize(requested);
        while self.len as f64 / capacity as f64 > CHAINED_MAX_LOAD {
            capacity = prime::next_prime(capacity * 2);
        }

        let mut buckets = vec![Chain::default(); capacity];
        let mut moved = 0;
        for chain in &self.buckets {
            for k in chain.keys(&self.nodes) {
                let Some(hash) = self.nodes.get(k).map(|n| n.hash) else {
                    continue;
                };
                buckets[bucket_index(hash, capacity)].link_back(&mut self.nodes, k);
                moved += 1;
            }
        }

        #[cfg(feature = "logging")]
        log::debug!(
            "chained table resized: {} -> {} buckets ({} entries)",
            self.buckets.len(),
            capacity,
            moved
        );

        debug_assert_eq!(buckets.iter().map(Chain::len).sum::<usize>(), moved);
        self.buckets = buckets;
        self.len = moved;
    }
}

impl<V> ChainedTable<V> {
    /// Table of at least `initial_capacity` buckets using [`AsciiSum`].
    pub fn new(initial_capacity: usize) -> Self {
        Self::with_hasher(initial_capacity, AsciiSum)
    }

    pub fn builder() -> TableBuilder<AsciiSum, ChainedTable<V>> {
        TableBuilder::default()
    }
}

impl<V> Default for ChainedTable<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<V, H> ChainedTable<V, H>
where
    H: StrHash,
{
    /// Table of `next_prime(initial_capacity)` buckets hashing with `hasher`.
    pub fn with_hasher(initial_capacity: usize, hasher: H) -> Self {
        Self {
            hasher,
            store: Store::with_capacity(prime::next_prime(initial_capacity)),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len
    }
    pub fn is_empty(&self) -> bool {
        self.store.len == 0
    }
    pub fn capacity(&self) -> usize {
        self.store.buckets.len()
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Insert `key -> value`, overwriting the value of an existing key.
    ///
    /// If the load has reached [`CHAINED_MAX_LOAD`] the table first resizes
    /// to twice its capacity.
    pub fn put(&mut self, key: &str, value: V) {
        let _g = self.reentrancy.enter("put");
        if self.store.load() >= CHAINED_MAX_LOAD {
            let doubled = self.store.buckets.len() * 2;
            self.store.rebuild(doubled);
        }
        let hash = self.hasher.hash_str(key);
        self.store.insert(hash, key, value);
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let _g = self.reentrancy.enter("get");
        let k = self.store.find(self.hasher.hash_str(key), key)?;
        self.store.nodes.get(k).map(|n| &n.value)
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let _g = self.reentrancy.enter("get_mut");
        let k = self.store.find(self.hasher.hash_str(key), key)?;
        self.store.nodes.get_mut(k).map(|n| &mut n.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let _g = self.reentrancy.enter("contains_key");
        self.store.find(self.hasher.hash_str(key), key).is_some()
    }

    /// Unlink the entry for `key` and return its value. Absent keys are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let _g = self.reentrancy.enter("remove");
        let hash = self.hasher.hash_str(key);
        self.store.remove(hash, key)
    }

    /// Number of buckets whose chain is empty.
    pub fn empty_buckets(&self) -> usize {
        let _g = self.reentrancy.enter("empty_buckets");
        self.store.buckets.iter().filter(|c| c.is_empty()).count()
    }

    /// Sum of chain lengths divided by capacity.
    pub fn table_load(&self) -> f64 {
        let _g = self.reentrancy.enter("table_load");
        self.store.load()
    }

    /// Drop every entry; capacity is unchanged.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter("clear");
        self.store.clear();
    }

    /// Rehash into at least `new_capacity` buckets.
    ///
    /// Requests below 1 are ignored. The target is rounded up to a prime and
    /// doubled until every entry fits at a load of at most 1.0.
    pub fn resize(&mut self, new_capacity: usize) {
        let _g = self.reentrancy.enter("resize");
        if new_capacity < 1 {
            return;
        }
        self.store.rebuild(new_capacity);
    }

    /// Snapshot of every entry, bucket order then chain order.
    pub fn get_all_entries(&self) -> Vec<(&str, &V)> {
        let _g = self.reentrancy.enter("get_all_entries");
        self.iter().collect()
    }

    /// Total of the chain lengths, walked bucket by bucket.
    #[cfg(test)]
    pub(crate) fn chain_lengths(&self) -> usize {
        self.store.buckets.iter().map(Chain::len).sum()
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.store.buckets.iter(),
            nodes: &self.store.nodes,
            chain: None,
        }
    }
}

/// Iterator over `(key, value)` pairs of a [`ChainedTable`].
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Chain>,
    nodes: &'a Nodes<V>,
    chain: Option<ChainIter<'a, V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.chain.as_mut().and_then(|c| c.next()) {
                return Some((node.key.as_str(), &node.value));
            }
            self.chain = Some(self.buckets.next()?.iter(self.nodes));
        }
    }
}

impl<'a, V, H: StrHash> IntoIterator for &'a ChainedTable<V, H> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug, H> fmt::Display for ChainedTable<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.store.buckets.iter().enumerate() {
            write!(f, "{i}:")?;
            for (n, node) in chain.iter(&self.store.nodes).enumerate() {
                let sep = if n == 0 { " " } else { " -> " };
                write!(f, "{sep}({}: {:?})", node.key, node.value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::PositionalSum;
    use std::collections::BTreeMap;

    #[test]
    fn capacity_is_normalized_to_prime() {
        assert_eq!(ChainedTable::<i32>::new(10).capacity(), 11);
        assert_eq!(ChainedTable::<i32>::new(11).capacity(), 11);
        assert_eq!(ChainedTable::<i32>::new(2).capacity(), 3);
        assert_eq!(ChainedTable::<i32>::default().capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn overwrite_keeps_size() {
        let mut t = ChainedTable::new(11);
        t.put("a", 1);
        t.put("a", 2);
        assert_eq!(t.get("a"), Some(&2));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn anagrams_share_a_bucket_in_insertion_order() {
        let mut t = ChainedTable::new(11);
        t.put("abc", 1);
        t.put("cab", 2);
        t.put("bca", 3);
        assert_eq!(t.empty_buckets(), 10);
        let keys: Vec<&str> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["abc", "cab", "bca"]);

        t.remove("cab");
        assert_eq!(t.get("abc"), Some(&1));
        assert_eq!(t.get("bca"), Some(&3));
        assert!(!t.contains_key("cab"));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn put_resizes_once_load_reaches_one() {
        let mut t = ChainedTable::with_hasher(3, PositionalSum);
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            t.put(k, i);
        }
        assert_eq!(t.capacity(), 3);
        assert_eq!(t.table_load(), 1.0);

        t.put("d", 3);
        assert_eq!(t.capacity(), 7);
        assert_eq!(t.len(), 4);
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            assert_eq!(t.get(k), Some(&i));
        }
    }

    #[test]
    fn resize_doubles_until_load_fits() {
        let mut t = ChainedTable::new(23);
        for i in 0..20 {
            t.put(&format!("key{i}"), i);
        }
        // 5 is too small for 20 entries: 5 -> 11 -> 23.
        t.resize(5);
        assert_eq!(t.capacity(), 23);
        assert!(t.table_load() <= 1.0);
        for i in 0..20 {
            assert_eq!(t.get(&format!("key{i}")), Some(&i));
        }
    }

    #[test]
    fn resize_below_one_is_ignored() {
        let mut t = ChainedTable::new(7);
        t.put("x", 1);
        t.resize(0);
        assert_eq!(t.capacity(), 7);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut t = ChainedTable::new(13);
        for i in 0..10 {
            t.put(&i.to_string(), i);
        }
        t.clear();
        assert_eq!(t.capacity(), 13);
        assert_eq!(t.len(), 0);
        assert_eq!(t.empty_buckets(), 13);
        assert_eq!(t.table_load(), 0.0);
        assert!(t.get("3").is_none());
        t.put("3", 33);
        assert_eq!(t.get("3"), Some(&33));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut t = ChainedTable::new(5);
        t.put("n", 1);
        *t.get_mut("n").unwrap() += 41;
        assert_eq!(t.get("n"), Some(&42));
        assert!(t.get_mut("missing").is_none());
    }

    #[test]
    fn entries_match_iteration() {
        let mut t = ChainedTable::with_hasher(7, PositionalSum);
        let mut model = BTreeMap::new();
        for i in 0..30 {
            let k = format!("k{}", i * 7 % 11);
            t.put(&k, i);
            model.insert(k, i);
        }
        let got: BTreeMap<String, i32> = t
            .get_all_entries()
            .into_iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        assert_eq!(got, model);
        assert_eq!(t.iter().count(), t.len());
        assert_eq!((&t).into_iter().count(), t.len());
    }

    #[test]
    fn display_lists_every_bucket() {
        let mut t = ChainedTable::new(3);
        t.put("a", 1); // 97 % 3 == 1
        t.put("d", 2); // 100 % 3 == 1
        let s = t.to_string();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines, ["0:", "1: (a: 1) -> (d: 2)", "2:"]);
    }

    #[test]
    fn entry_count_matches_chain_lengths() {
        let mut t = ChainedTable::with_hasher(3, |s: &str| s.len() as u64);
        for i in 0..40 {
            t.put(&format!("{i}"), i);
            assert_eq!(t.len(), t.chain_lengths());
        }
        for i in (0..40).step_by(3) {
            t.remove(&format!("{i}"));
            t.remove(&format!("{i}"));
            assert_eq!(t.len(), t.chain_lengths());
        }
        t.resize(5);
        assert_eq!(t.len(), t.chain_lengths());
        assert_eq!(t.table_load(), t.chain_lengths() as f64 / t.capacity() as f64);
        t.clear();
        assert_eq!(t.chain_lengths(), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_through_guard_panics() {
        let t: ChainedTable<i32> = ChainedTable::new(3);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = t.reentrancy.enter("resize");
            let _ = t.get("a");
        }));
        assert!(res.is_err());
    }
}
