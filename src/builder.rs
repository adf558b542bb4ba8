use crate::hashing::{AsciiSum, StrHash};
use crate::{ChainedTable, ProbingTable, DEFAULT_CAPACITY};
use core::marker::PhantomData;

/// Builds a [`ChainedTable`] or [`ProbingTable`] with an initial capacity
/// and hash function.
///
/// # Examples
///
/// ```rust
/// use prime_tables::{PositionalSum, ProbingTable};
///
/// let mut table = ProbingTable::builder()
///     // Rounded up to the next prime, 17.
///     .initial_capacity(16)
///     .hasher(PositionalSum)
///     .build();
///
/// table.put("apple", 1);
/// assert_eq!(table.capacity(), 17);
/// assert_eq!(table.get("apple"), Some(&1));
/// ```
#[must_use]
pub struct TableBuilder<H, T> {
    initial_capacity: usize,
    hasher: H,
    table_type: PhantomData<T>,
}

impl<T> Default for TableBuilder<AsciiSum, T> {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            hasher: AsciiSum,
            table_type: PhantomData,
        }
    }
}

impl<H, T> TableBuilder<H, T> {
    /// Requested capacity; the built table uses the next prime at or above it.
    pub fn initial_capacity(self, capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
            ..self
        }
    }
}

impl<V, H> TableBuilder<H, ChainedTable<V, H>>
where
    H: StrHash,
{
    /// Sets the hash function used to place keys.
    pub fn hasher<H2: StrHash>(self, hasher: H2) -> TableBuilder<H2, ChainedTable<V, H2>> {
        TableBuilder {
            initial_capacity: self.initial_capacity,
            hasher,
            table_type: PhantomData,
        }
    }

    pub fn build(self) -> ChainedTable<V, H> {
        ChainedTable::with_hasher(self.initial_capacity, self.hasher)
    }
}

impl<V, H> TableBuilder<H, ProbingTable<V, H>>
where
    H: StrHash,
{
    /// Sets the hash function used to place keys.
    pub fn hasher<H2: StrHash>(self, hasher: H2) -> TableBuilder<H2, ProbingTable<V, H2>> {
        TableBuilder {
            initial_capacity: self.initial_capacity,
            hasher,
            table_type: PhantomData,
        }
    }

    pub fn build(self) -> ProbingTable<V, H> {
        ProbingTable::with_hasher(self.initial_capacity, self.hasher)
    }
}
