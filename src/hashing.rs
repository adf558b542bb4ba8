//! Deterministic string hashers injected into the tables.
//!
//! The tables never use `std::hash`; a key is reduced to a bucket by
//! `hasher.hash_str(key) % capacity`. Implementations must be pure: the
//! same key always yields the same `u64`.

/// A pure, deterministic `&str -> u64` hash function.
pub trait StrHash {
    fn hash_str(&self, key: &str) -> u64;
}

impl<F> StrHash for F
where
    F: Fn(&str) -> u64,
{
    #[inline]
    fn hash_str(&self, key: &str) -> u64 {
        self(key)
    }
}

/// Sum of the key's byte values. Anagrams collide.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AsciiSum;

impl StrHash for AsciiSum {
    #[inline]
    fn hash_str(&self, key: &str) -> u64 {
        key.bytes().map(u64::from).sum()
    }
}

/// Sum of `(position + 1) * byte`, so reordered keys spread apart.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionalSum;

impl StrHash for PositionalSum {
    #[inline]
    fn hash_str(&self, key: &str) -> u64 {
        key.bytes()
            .zip(1u64..)
            .map(|(b, weight)| weight.wrapping_mul(u64::from(b)))
            .fold(0u64, u64::wrapping_add)
    }
}

/// Reduce a cached hash to a slot index in `0..capacity`.
#[inline]
pub(crate) fn bucket_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}
