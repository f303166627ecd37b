//! probe-map: a single-threaded open-addressing map with linear probing,
//! tombstone deletion, load-factor growth and periodic compaction.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one flat slot array, exclusively owned, that every operation
//!   walks with the same deterministic probe sequence.
//! - Layers:
//!   - `Slot<K, V>`: tri-state bucket (`Empty`, `Occupied`, `Deleted`) plus
//!     the home-index reduction `(hash & i64::MAX) % capacity`.
//!   - `ProbeTable<K, V, S>`: the slot array, live and tombstone tallies,
//!     the two probe walks, growth and compaction.
//!   - `ProbeMap<K, V, S>`: public contract (`get`, `set`, `add`, `remove`,
//!     `clear`, `contains_*`, iteration) mapping table outcomes onto
//!     `MapError`.
//!   - `EntryMirror<K, V, S>`: display-side copy of a map that keeps rows
//!     in first-insertion order.
//!
//! Probing
//! - Search-for-existing starts at the home index and steps by one,
//!   wrapping at the end. It stops at an equal key, an `Empty` slot, or
//!   after a full lap. `Deleted` slots never stop it.
//! - Search-for-insert walks the same way, remembers the first `Deleted`
//!   slot, and reports a duplicate if an equal key shows up. A terminating
//!   `Empty` slot yields the remembered tombstone when there is one.
//!
//! Growth and compaction
//! - Before an insert that would take `len + 1` above 3/4 of capacity the
//!   array doubles (minimum 8) and every live entry is re-placed.
//! - After a removal that leaves more than `capacity / 20` tombstones the
//!   array is rebuilt at the same length, dropping all tombstones.
//! - Clear swaps in an all-empty array of the same length.
//! - Every one of these reallocations zeroes the tombstone tally, and
//!   reusing a tombstone on insert decrements it, so the tally always
//!   equals the number of `Deleted` slots.
//!
//! Hasher invariants
//! - Each occupied slot stores its `u64` hash. Rebuilds place entries by
//!   stored hash and never call `K: Hash` or `K: Eq`. Probing compares the
//!   stored hash before calling `K: Eq`.
//!
//! Reentrancy
//! - Probe entry points take a debug-only guard. User `Hash`/`Eq`/
//!   `PartialEq` code that re-enters the same table mid-probe panics in
//!   debug builds. Removed pairs and pairs rejected as duplicates are
//!   released after the guard, so their `Drop` may read the map.
//! - `ProbeTable` keeps the slots and tallies in an inner `SlotArray` that
//!   never hashes. Guarded entry points hash first, then borrow only the
//!   array mutably while the guard is held.
//!
//! Notes and non-goals
//! - Not thread-safe: the map is `Send` but not `Sync`.
//! - Iteration order is slot order, not insertion order, and may change
//!   across growth, compaction and clear. Iterators borrow the map, so
//!   mutating it mid-iteration is a compile error.
//! - Growth is always doubling; the load factor and compaction ratio are
//!   fixed constants.

mod entry_mirror;
mod error;
mod probe_map;
mod probe_map_proptest;
mod probe_table;
mod reentrancy;
mod slot;

// Public surface
pub use entry_mirror::{EntryMirror, MirrorChange};
pub use error::{InsertError, MapError};
pub use probe_map::{IntoIter, Iter, IterMut, Keys, ProbeMap, Values, ValuesMut};
pub use probe_table::{
    COMPACTION_DIVISOR, DEFAULT_CAPACITY, LOAD_FACTOR_DEN, LOAD_FACTOR_NUM, MIN_CAPACITY,
};
