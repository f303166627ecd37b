//! ProbeTable: the slot array plus the probe engine, growth and compaction.
//!
//! Everything that touches slot layout lives here. The public map above it
//! only translates outcomes into its contract.
//!
//! The table is split in two. `SlotArray` owns the slots and both tallies
//! and does every walk, placement and rebuild from stored hashes. It never
//! hashes a key. `ProbeTable` adds the hasher and the reentrancy guard; its
//! entry points hold the guard while borrowing the array mutably.

use crate::error::InsertError;
use crate::reentrancy::ProbeReentrancy;
use crate::slot::{empty_slots, home_index, Slot};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use log::{debug, trace};

/// Smallest slot array a table will allocate.
pub const MIN_CAPACITY: usize = 8;
/// Slot count used by `new()`.
pub const DEFAULT_CAPACITY: usize = 16;
/// Growth triggers once `len + 1 > capacity * NUM / DEN`.
pub const LOAD_FACTOR_NUM: usize = 3;
pub const LOAD_FACTOR_DEN: usize = 4;
/// Compaction triggers once `tombstones > capacity / COMPACTION_DIVISOR`.
pub const COMPACTION_DIVISOR: usize = 20;

/// Outcome of the insert-slot walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertProbe {
    /// Write here: the first tombstone seen, else the terminating empty slot.
    Vacant(usize),
    /// An equal key already lives in the cluster.
    Duplicate,
    /// Walked the whole array without meeting an empty slot or a tombstone.
    Full,
}

#[derive(Clone)]
struct SlotArray<K, V> {
    slots: Vec<Slot<K, V>>,
    // Number of `Occupied` slots.
    count: usize,
    // Number of `Deleted` slots; zeroed by every reallocation.
    deleted_count: usize,
}

impl<K, V> SlotArray<K, V> {
    fn new(len: usize) -> Self {
        Self {
            slots: empty_slots(len),
            count: 0,
            deleted_count: 0,
        }
    }

    #[inline]
    fn next_index(&self, idx: usize) -> usize {
        let next = idx + 1;
        if next == self.slots.len() {
            0
        } else {
            next
        }
    }

    #[inline]
    fn exceeds_load(&self, live: usize) -> bool {
        live * LOAD_FACTOR_DEN > self.slots.len() * LOAD_FACTOR_NUM
    }

    /// Swap in an all-empty array of the same length and return the old one.
    fn take_all(&mut self) -> Vec<Slot<K, V>> {
        let len = self.slots.len();
        self.count = 0;
        self.deleted_count = 0;
        mem::replace(&mut self.slots, empty_slots(len))
    }

    fn grow(&mut self) {
        let old = self.slots.len();
        let new = (old * 2).max(MIN_CAPACITY);
        self.rebuild(new);
        debug!("probe table grew {} -> {} slots ({} live)", old, new, self.count);
    }

    fn compact(&mut self) {
        let reclaimed = self.deleted_count;
        let len = self.slots.len();
        self.rebuild(len);
        debug!(
            "probe table compacted: reclaimed {} tombstones at {} slots ({} live)",
            reclaimed, len, self.count
        );
    }

    /// Move every live entry into a fresh array of `len` slots.
    /// Entries keep their stored hash, so no user code runs here.
    fn rebuild(&mut self, len: usize) {
        let old = mem::replace(&mut self.slots, empty_slots(len));
        self.count = 0;
        self.deleted_count = 0;
        for slot in old {
            if let Slot::Occupied { key, value, hash } = slot {
                let idx = self.first_empty(hash);
                self.slots[idx] = Slot::Occupied { key, value, hash };
                self.count += 1;
            }
        }
    }

    /// First empty slot at or after the home index of `hash`. Only used on
    /// freshly rebuilt arrays, which hold no tombstones and have spare room.
    fn first_empty(&self, hash: u64) -> usize {
        let start = home_index(hash, self.slots.len());
        let mut idx = start;
        loop {
            if self.slots[idx].is_empty() {
                return idx;
            }
            idx = self.next_index(idx);
            if idx == start {
                panic!(
                    "probe table invariant violated: no empty slot while rebuilding {} slots",
                    self.slots.len()
                );
            }
        }
    }

    /// Tombstone slot `idx` and hand back its pair, compacting if the
    /// tombstones now exceed `capacity / COMPACTION_DIVISOR`.
    fn remove_at(&mut self, idx: usize) -> Option<(K, V)> {
        let pair = self.slots[idx].bury()?;
        self.count -= 1;
        self.deleted_count += 1;
        if self.deleted_count > self.slots.len() / COMPACTION_DIVISOR {
            self.compact();
        }
        Some(pair)
    }
}

impl<K: Eq, V> SlotArray<K, V> {
    /// Search-for-existing: tombstones are stepped over, an empty slot or a
    /// full lap ends the search.
    fn probe_existing<Q>(&self, hash: u64, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let start = home_index(hash, self.slots.len());
        let mut idx = start;
        loop {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied { key, hash: h, .. }
                    if *h == hash && <K as Borrow<Q>>::borrow(key) == q =>
                {
                    return Some(idx)
                }
                _ => {}
            }
            idx = self.next_index(idx);
            if idx == start {
                return None;
            }
        }
    }

    /// Search-for-insert-slot: like `probe_existing`, but remembers the first
    /// tombstone so it can be reused.
    fn probe_insert(&self, hash: u64, key: &K) -> InsertProbe {
        let start = home_index(hash, self.slots.len());
        let mut idx = start;
        let mut first_deleted = None;
        loop {
            match &self.slots[idx] {
                Slot::Empty => return InsertProbe::Vacant(first_deleted.unwrap_or(idx)),
                Slot::Deleted => {
                    if first_deleted.is_none() {
                        first_deleted = Some(idx);
                    }
                }
                Slot::Occupied { key: k, hash: h, .. } => {
                    if *h == hash && k == key {
                        return InsertProbe::Duplicate;
                    }
                }
            }
            idx = self.next_index(idx);
            if idx == start {
                return match first_deleted {
                    Some(i) => InsertProbe::Vacant(i),
                    None => InsertProbe::Full,
                };
            }
        }
    }

    /// Place a new entry and return its slot index. A duplicate hands the
    /// pair back untouched.
    fn insert_hashed(&mut self, hash: u64, key: K, value: V) -> Result<usize, (K, V)> {
        if self.exceeds_load(self.count + 1) {
            self.grow();
        }
        let idx = match self.probe_insert(hash, &key) {
            InsertProbe::Vacant(idx) => idx,
            InsertProbe::Duplicate => return Err((key, value)),
            InsertProbe::Full => {
                trace!(
                    "no insert slot in {} slots, growing and retrying",
                    self.slots.len()
                );
                self.grow();
                match self.probe_insert(hash, &key) {
                    InsertProbe::Vacant(idx) => idx,
                    InsertProbe::Duplicate => return Err((key, value)),
                    InsertProbe::Full => panic!(
                        "probe table invariant violated: no insert slot after growing to {} slots ({} live)",
                        self.slots.len(),
                        self.count
                    ),
                }
            }
        };
        if self.slots[idx].is_deleted() {
            self.deleted_count -= 1;
        }
        self.slots[idx] = Slot::Occupied { key, value, hash };
        self.count += 1;
        Ok(idx)
    }
}

#[derive(Clone)]
pub(crate) struct ProbeTable<K, V, S> {
    hasher: S,
    array: SlotArray<K, V>,
    reentrancy: ProbeReentrancy,
}

impl<K, V, S> ProbeTable<K, V, S> {
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            array: SlotArray::new(capacity.max(MIN_CAPACITY)),
            reentrancy: ProbeReentrancy::new(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.array.count
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.array.slots.len()
    }

    #[inline]
    pub(crate) fn tombstones(&self) -> usize {
        self.array.deleted_count
    }

    #[inline]
    pub(crate) fn hasher(&self) -> &S {
        &self.hasher
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[Slot<K, V>] {
        &self.array.slots
    }

    #[inline]
    pub(crate) fn slots_mut(&mut self) -> &mut [Slot<K, V>] {
        &mut self.array.slots
    }

    pub(crate) fn into_slots(self) -> Vec<Slot<K, V>> {
        self.array.slots
    }

    /// Reset to an all-empty array of the same length. Entries are dropped
    /// only after the table is consistent again.
    pub(crate) fn clear(&mut self) {
        let old = self.array.take_all();
        drop(old);
    }

    pub(crate) fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let _g = self.reentrancy.enter("contains_value");
        self.array
            .slots
            .iter()
            .filter_map(Slot::entry)
            .any(|(_, v)| v == value)
    }
}

impl<K, V, S> ProbeTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Slot index of the entry whose key equals `q`.
    pub(crate) fn find<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("find");
        let hash = self.make_hash(q);
        self.array.probe_existing(hash, q)
    }

    /// Insert a key that must not be present yet. Returns the slot index.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<usize, InsertError> {
        let rejected = {
            let _g = self.reentrancy.enter("insert");
            let hash = self.make_hash(&key);
            match self.array.insert_hashed(hash, key, value) {
                Ok(idx) => return Ok(idx),
                Err(pair) => pair,
            }
        };
        // Released only once the guard is gone: its Drop may read the table.
        drop(rejected);
        Err(InsertError::DuplicateKey)
    }

    /// Overwrite the value for `key` in place, or insert it. Returns the
    /// previous value on overwrite.
    pub(crate) fn upsert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter("set");
        let hash = self.make_hash(&key);
        if let Some(idx) = self.array.probe_existing(hash, &key) {
            if let Slot::Occupied { value: v, .. } = &mut self.array.slots[idx] {
                return Some(mem::replace(v, value));
            }
        }
        match self.array.insert_hashed(hash, key, value) {
            Ok(_) => None,
            // probe_existing just missed this key.
            Err(_) => unreachable!("upsert missed an existing key"),
        }
    }

    /// Tombstone the entry equal to `q` and hand back its pair. May compact
    /// the table before returning.
    pub(crate) fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("remove");
        let hash = self.make_hash(q);
        let idx = self.array.probe_existing(hash, q)?;
        self.array.remove_at(idx)
    }

    /// Check the structural invariants by scanning the whole array.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self)
    where
        K: core::fmt::Debug,
    {
        let array = &self.array;
        let occupied = array.slots.iter().filter(|s| s.is_occupied()).count();
        let deleted = array.slots.iter().filter(|s| s.is_deleted()).count();
        assert_eq!(array.count, occupied, "count must match occupied slots");
        assert_eq!(array.deleted_count, deleted, "deleted_count must match tombstones");
        assert!(array.slots.len() >= MIN_CAPACITY);
        assert!(!array.exceeds_load(array.count), "load factor exceeded");
        for (idx, slot) in array.slots.iter().enumerate() {
            if let Slot::Occupied { key, hash, .. } = slot {
                assert_eq!(*hash, self.make_hash(key), "stale stored hash at {idx}");
                assert_eq!(
                    array.probe_existing(*hash, key),
                    Some(idx),
                    "key {key:?} not reachable from its home index"
                );
            }
        }
    }
}
