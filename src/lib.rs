//! prime-tables: two string-keyed hash tables built from a plain `Vec`, a
//! singly-linked chain, and an injected hash function.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one table contract (`put`, `get`, `remove`, `contains_key`,
//!   `resize`, `clear`, iteration, `table_load`, `empty_buckets`) over two
//!   collision strategies, so their behavior can be compared directly.
//! - Tables:
//!   - ChainedTable<V, H>: array of bucket chains. Chain nodes live in one
//!     `SlotMap` arena per table; a chain is only `(head, tail, len)`.
//!     Grows to twice its capacity when the load reaches 1.0.
//!   - ProbingTable<V, H>: flat slot array with quadratic probing and
//!     tombstones. Grows to twice its capacity when the load reaches 0.5.
//! - Shared pieces: `prime` (capacity normalization), `hashing` (the
//!   `StrHash` seam and two deterministic hashers), `reentrancy` (debug-only
//!   guard), `builder` (configuration).
//!
//! Constraints
//! - Single-threaded; tables are `!Sync`.
//! - Capacity is always prime and only changes through a full rebuild.
//! - `0 <= len <= capacity`; tombstones never count toward `len`.
//! - Keys are text. Values are opaque and never inspected.
//!
//! Hasher and rehashing invariants
//! - Every entry stores the `u64` its key hashed to at insertion time and
//!   rebuilds index with the stored hash. Hashers are pure, so this is the
//!   same placement `hash(key) % capacity` would give, and no user code runs
//!   while a rebuild is half done.
//! - Rebuilds are build-then-swap: the chaining table relinks nodes into a
//!   fresh bucket array, the probing table plans every target slot before
//!   moving any entry.
//!
//! Reentrancy policy
//! - Each public method enters the table's `DebugReentrancy` guard. Internal
//!   paths (the rebuild inside `put`, for instance) call the store layer
//!   directly and never re-enter the public API. Debug builds panic on a
//!   nested entry; release builds compile the guard away.
//! - Mutating methods take `&mut self`, so the borrow checker already rules
//!   out nested mutation. The only nesting a caller can build is a hasher
//!   that reaches back into its own table through shared ownership
//!   (`Rc<RefCell<_>>`) and calls a `&self` method from inside `hash_str`.
//!   The guard rejects that. Otherwise it is an assertion over the crate's
//!   own internal paths.
//!
//! Observable quirks kept on purpose
//! - `ProbingTable::empty_buckets` counts tombstones as empty while
//!   `ProbingTable::table_load` leaves them out.
//! - An even capacity request is bumped to odd before the prime search, so
//!   requesting 2 yields 3.

mod builder;
mod chain;
pub mod chained_table;
pub mod hashing;
mod mode;
pub mod prime;
pub mod probing_table;
mod reentrancy;
mod table_proptest;

/// Capacity used by `Default` and by builders without an explicit capacity.
pub const DEFAULT_CAPACITY: usize = 11;

// Public surface
pub use builder::TableBuilder;
pub use chained_table::{ChainedTable, CHAINED_MAX_LOAD};
pub use hashing::{AsciiSum, PositionalSum, StrHash};
pub use mode::find_mode;
pub use probing_table::{ProbingTable, PROBING_MAX_LOAD};
