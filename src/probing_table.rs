//! ProbingTable: open addressing with quadratic probing and tombstones.
//!
//! Slot life cycle: `Empty -> Occupied -> Tombstone -> Occupied`. A
//! tombstone keeps probe paths that ran through it intact; it only becomes
//! `Empty` again when the whole array is rebuilt by `resize` or `clear`.
//!
//! Lookups probe `home + j²` for `j` in `0..capacity`. Squares repeat with
//! period `capacity`, so that bound covers every reachable slot and a
//! lookup terminates even when no `Empty` slot is reachable.

use crate::builder::TableBuilder;
use crate::hashing::{bucket_index, AsciiSum, StrHash};
use crate::prime;
use crate::reentrancy::DebugReentrancy;
use crate::DEFAULT_CAPACITY;
use core::fmt;
use core::mem;

/// `put` grows the table first once the load reaches this value.
pub const PROBING_MAX_LOAD: f64 = 0.5;

#[derive(Debug)]
struct Entry<V> {
    key: String,
    value: V,
    hash: u64,
}

#[derive(Debug)]
enum Slot<V> {
    Empty,
    Occupied(Entry<V>),
    // The value moves out to the caller of `remove`; the key stays for display.
    Tombstone(String),
}

impl<V> Slot<V> {
    fn is_vacant(&self) -> bool {
        !matches!(self, Slot::Occupied(_))
    }
}

/// Quadratic probe sequence `home, home + 1², home + 2², …` over one period.
fn probe(home: usize, capacity: usize) -> impl Iterator<Item = usize> {
    (0..capacity).map(move |j| (home + j * j % capacity) % capacity)
}

/// Hash table resolving collisions by quadratic probing in one flat array.
///
/// `remove` leaves a tombstone behind. Tombstones do not count toward
/// [`table_load`](Self::table_load) but do count as free in
/// [`empty_buckets`](Self::empty_buckets).
pub struct ProbingTable<V, H = AsciiSum> {
    hasher: H,
    store: Store<V>,
    reentrancy: DebugReentrancy,
}

struct Store<V> {
    slots: Vec<Slot<V>>,
    len: usize,
}

impl<V> Store<V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: empty_slots(capacity),
            len: 0,
        }
    }

    fn load(&self) -> f64 {
        self.len as f64 / self.slots.len() as f64
    }

    fn home(&self, hash: u64) -> usize {
        bucket_index(hash, self.slots.len())
    }

    /// Slot index of the live entry for `key`. Stops at the first `Empty`.
    fn find(&self, hash: u64, key: &str) -> Option<usize> {
        for i in probe(self.home(hash), self.slots.len()) {
            match &self.slots[i] {
                Slot::Empty => return None,
                Slot::Occupied(e) if e.hash == hash && e.key == key => return Some(i),
                _ => {}
            }
        }
        None
    }

    /// First `Empty` or `Tombstone` slot on the probe path.
    fn vacancy(&self, hash: u64) -> Option<usize> {
        probe(self.home(hash), self.slots.len()).find(|&i| self.slots[i].is_vacant())
    }

    fn remove(&mut self, hash: u64, key: &str) -> Option<V> {
        let i = self.find(hash, key)?;
        match mem::replace(&mut self.slots[i], Slot::Tombstone(key.to_owned())) {
            Slot::Occupied(e) => {
                self.len -= 1;
                Some(e.value)
            }
            other => {
                self.slots[i] = other;
                None
            }
        }
    }

    fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = Slot::Empty);
        self.len = 0;
    }

    /// Rehash live entries into a prime capacity of at least `requested`.
    ///
    /// Positions are planned from the cached hashes before anything moves;
    /// if some entry cannot reach a vacancy the candidate grows and planning
    /// starts over. Tombstones are dropped.
    fn rebuild(&mut self, requested: usize) {
        let hashes: Vec<u64> = self
            .slots
            .iter()
            .filter_map(|s| match s {
                Slot::Occupied(e) => Some(e.hash),
                _ => None,
            })
            .collect();

        let mut capacity = prime::normalize(requested);
        let plan = loop {
            match plan_positions(&hashes, capacity) {
                Some(plan) => break plan,
                None => {
                    #[cfg(feature = "logging")]
                    log::warn!(
                        "probing table: {} entries do not all fit in {} slots, growing",
                        hashes.len(),
                        capacity
                    );
                    capacity = prime::next_prime(capacity * 2);
                }
            }
        };

        let mut slots = empty_slots(capacity);
        let live = mem::take(&mut self.slots)
            .into_iter()
            .filter(|s| matches!(s, Slot::Occupied(_)));
        for (slot, i) in live.zip(plan) {
            slots[i] = slot;
        }

        #[cfg(feature = "logging")]
        log::debug!(
            "probing table resized to {} slots ({} entries)",
            capacity,
            self.len
        );

        self.slots = slots;
    }
}

fn empty_slots<V>(capacity: usize) -> Vec<Slot<V>> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

/// Target index for each hash, inserting in order with the `put` probing rule.
fn plan_positions(hashes: &[u64], capacity: usize) -> Option<Vec<usize>> {
    let mut taken = vec![false; capacity];
    hashes
        .iter()
        .map(|&h| {
            let home = bucket_index(h, capacity);
            let i = probe(home, capacity).find(|&i| !taken[i])?;
            taken[i] = true;
            Some(i)
        })
        .collect()
}

impl<V> ProbingTable<V> {
    /// Table of at least `initial_capacity` slots using [`AsciiSum`].
    pub fn new(initial_capacity: usize) -> Self {
        Self::with_hasher(initial_capacity, AsciiSum)
    }

    pub fn builder() -> TableBuilder<AsciiSum, ProbingTable<V>> {
        TableBuilder::default()
    }
}

impl<V> Default for ProbingTable<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<V, H> ProbingTable<V, H>
where
    H: StrHash,
{
    /// Table of `next_prime(initial_capacity)` slots hashing with `hasher`.
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
        self.store.slots.len()
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Insert `key -> value`, overwriting the value of a live key.
    ///
    /// If the load has reached [`PROBING_MAX_LOAD`] the table first resizes
    /// to twice its capacity, so the probe path of a new key always reaches a
    /// free slot. New entries take the first `Empty` or `Tombstone` slot.
    pub fn put(&mut self, key: &str, value: V) {
        let _g = self.reentrancy.enter("put");
        if self.store.load() >= PROBING_MAX_LOAD {
            let doubled = self.store.slots.len() * 2;
            self.store.rebuild(doubled);
        }

        let hash = self.hasher.hash_str(key);
        if let Some(i) = self.store.find(hash, key) {
            if let Slot::Occupied(e) = &mut self.store.slots[i] {
                e.value = value;
            }
            return;
        }
        let i = loop {
            match self.store.vacancy(hash) {
                Some(i) => break i,
                // Unreachable below the load threshold; grow rather than spin.
                None => {
                    let doubled = self.store.slots.len() * 2;
                    self.store.rebuild(doubled);
                }
            }
        };
        self.store.slots[i] = Slot::Occupied(Entry {
            key: key.to_owned(),
            value,
            hash,
        });
        self.store.len += 1;
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let _g = self.reentrancy.enter("get");
        let i = self.store.find(self.hasher.hash_str(key), key)?;
        match &self.store.slots[i] {
            Slot::Occupied(e) => Some(&e.value),
            _ => None,
        }
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let _g = self.reentrancy.enter("get_mut");
        let i = self.store.find(self.hasher.hash_str(key), key)?;
        match &mut self.store.slots[i] {
            Slot::Occupied(e) => Some(&mut e.value),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let _g = self.reentrancy.enter("contains_key");
        self.store.find(self.hasher.hash_str(key), key).is_some()
    }

    /// Tombstone the slot holding `key` and return its value. Absent keys
    /// are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let _g = self.reentrancy.enter("remove");
        let hash = self.hasher.hash_str(key);
        self.store.remove(hash, key)
    }

    /// Number of slots that are `Empty` or hold a tombstone.
    pub fn empty_buckets(&self) -> usize {
        let _g = self.reentrancy.enter("empty_buckets");
        self.store.slots.iter().filter(|s| s.is_vacant()).count()
    }

    /// Live entries divided by capacity; tombstones are not counted.
    pub fn table_load(&self) -> f64 {
        let _g = self.reentrancy.enter("table_load");
        self.store.load()
    }

    /// Reset every slot to `Empty`; capacity is unchanged.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter("clear");
        self.store.clear();
    }

    /// Rehash into a prime capacity of at least `new_capacity`.
    ///
    /// Requests smaller than the number of live entries are ignored.
    pub fn resize(&mut self, new_capacity: usize) {
        let _g = self.reentrancy.enter("resize");
        if new_capacity < self.store.len {
            return;
        }
        self.store.rebuild(new_capacity);
    }

    /// Number of `Occupied` slots, counted directly.
    #[cfg(test)]
    pub(crate) fn occupied_slots(&self) -> usize {
        self.store
            .slots
            .iter()
            .filter(|s| matches!(s, Slot::Occupied(_)))
            .count()
    }

    /// Snapshot of every live entry in slot order.
    pub fn get_all_entries(&self) -> Vec<(&str, &V)> {
        let _g = self.reentrancy.enter("get_all_entries");
        self.iter().collect()
    }

    /// Fresh cursor over live entries in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: &self.store.slots,
            next_slot: 0,
        }
    }
}

/// Cursor over the live slots of a [`ProbingTable`].
///
/// Skips `Empty` and tombstoned slots; ends once the cursor runs past the
/// last slot.
pub struct Iter<'a, V> {
    slots: &'a [Slot<V>],
    next_slot: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let slot = self.slots.get(self.next_slot)?;
            self.next_slot += 1;
            if let Slot::Occupied(e) = slot {
                return Some((e.key.as_str(), &e.value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len().saturating_sub(self.next_slot)))
    }
}

impl<'a, V, H: StrHash> IntoIterator for &'a ProbingTable<V, H> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug, H> fmt::Display for ProbingTable<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.store.slots.iter().enumerate() {
            match slot {
                Slot::Empty => writeln!(f, "{i}: None")?,
                Slot::Occupied(e) => writeln!(f, "{i}: {}: {:?}", e.key, e.value)?,
                Slot::Tombstone(key) => writeln!(f, "{i}: {key} (deleted)")?,
            }
        }
        Ok(())
    }
}
