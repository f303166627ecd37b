//! Slot: one bucket of the open-addressing array and its tri-state lifecycle.

use core::mem;

/// Sign bit of the 64-bit hash is masked off before reducing to an index.
const HASH_MASK: u64 = i64::MAX as u64;

/// A bucket in the slot array.
///
/// Transitions are `Empty -> Occupied` on insert and `Occupied -> Deleted`
/// on remove. A slot only becomes `Empty` again when the whole array is
/// reallocated (growth, compaction, clear).
#[derive(Debug, Clone)]
pub(crate) enum Slot<K, V> {
    Empty,
    Occupied { key: K, value: V, hash: u64 },
    Deleted,
}

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline]
    pub(crate) fn is_deleted(&self) -> bool {
        matches!(self, Slot::Deleted)
    }

    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((&*key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn into_entry(self) -> Option<(K, V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    /// Turn an occupied slot into a tombstone, handing back its pair.
    /// Empty and deleted slots are left untouched.
    pub(crate) fn bury(&mut self) -> Option<(K, V)> {
        if !self.is_occupied() {
            return None;
        }
        mem::replace(self, Slot::Deleted).into_entry()
    }
}

/// Allocate `len` empty slots.
pub(crate) fn empty_slots<K, V>(len: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(len);
    slots.resize_with(len, Slot::default);
    slots
}

/// Reduce a key hash to its home index in an array of `len` slots.
#[inline]
pub(crate) fn home_index(hash: u64, len: usize) -> usize {
    debug_assert!(len > 0);
    ((hash & HASH_MASK) % len as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bury_only_touches_occupied() {
        let mut s: Slot<&str, i32> = Slot::Occupied {
            key: "a",
            value: 1,
            hash: 7,
        };
        assert_eq!(s.bury(), Some(("a", 1)));
        assert!(s.is_deleted());
        assert_eq!(s.bury(), None);
        assert!(s.is_deleted());

        let mut e: Slot<&str, i32> = Slot::Empty;
        assert_eq!(e.bury(), None);
        assert!(e.is_empty());
    }

    #[test]
    fn home_index_ignores_sign_bit() {
        let hi = 1u64 << 63;
        assert_eq!(home_index(hi | 5, 8), home_index(5, 8));
        assert_eq!(home_index(u64::MAX, 10), ((u64::MAX >> 1) % 10) as usize);
        // Non power-of-two lengths reduce by modulo.
        assert_eq!(home_index(23, 11), 1);
    }

    #[test]
    fn empty_slots_has_requested_length() {
        let v: Vec<Slot<u8, u8>> = empty_slots(12);
        assert_eq!(v.len(), 12);
        assert!(v.iter().all(Slot::is_empty));
    }
}
