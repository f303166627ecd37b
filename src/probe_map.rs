//! ProbeMap: the public key -> value contract over a [`ProbeTable`].

use crate::error::MapError;
use crate::probe_table::{ProbeTable, DEFAULT_CAPACITY};
use crate::slot::Slot;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use std::collections::hash_map::RandomState;

/// An open-addressing map with linear probing and tombstone deletion.
///
/// Iteration visits live slots in array order. That order is unrelated to
/// insertion order and may change whenever the map grows, compacts or is
/// cleared. Iterators borrow the map, so structural mutation while one is
/// alive does not compile.
#[derive(Clone)]
pub struct ProbeMap<K, V, S = RandomState> {
    table: ProbeTable<K, V, S>,
}

impl<K, V> ProbeMap<K, V> {
    /// Create an empty map with the default capacity (16 slots).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty map with `capacity` slots (at least 8).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V> Default for ProbeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ProbeMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            table: ProbeTable::with_capacity_and_hasher(capacity, hasher),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Length of the slot array.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Tombstones accumulated since the slot array was last reallocated.
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    pub fn hasher(&self) -> &S {
        self.table.hasher()
    }

    /// Remove every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.table.contains_value(value)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.table.slots().iter(),
            remaining: self.table.len(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let remaining = self.table.len();
        IterMut {
            slots: self.table.slots_mut().iter_mut(),
            remaining,
        }
    }
}

impl<K, V, S> ProbeMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.find(key).is_some()
    }

    /// Value stored under `key`, or [`MapError::KeyNotFound`].
    pub fn get<Q>(&self, key: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.table.find(key).ok_or(MapError::KeyNotFound)?;
        self.table.slots()[idx]
            .entry()
            .map(|(_, v)| v)
            .ok_or(MapError::KeyNotFound)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.table.find(key).ok_or(MapError::KeyNotFound)?;
        self.table.slots_mut()[idx]
            .entry_mut()
            .map(|(_, v)| v)
            .ok_or(MapError::KeyNotFound)
    }

    /// Insert a new key. Fails with [`MapError::DuplicateKey`] if the key is
    /// already present; the stored value is left untouched.
    pub fn add(&mut self, key: K, value: V) -> Result<(), MapError> {
        self.table.insert(key, value)?;
        Ok(())
    }

    /// Indexed assignment: overwrite the value in place if `key` is present,
    /// otherwise insert it. Returns the previous value on overwrite.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.table.upsert(key, value)
    }

    /// Remove `key`. Returns whether an entry was removed; absence is not an
    /// error.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(key).is_some()
    }

    /// Remove `key` and return the stored pair.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(key)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self)
    where
        K: fmt::Debug,
    {
        self.table.assert_consistent();
    }

    /// Remove for callers whose key may be missing altogether, such as form
    /// input. `None` is refused with [`MapError::NullKey`]; an absent key is
    /// `Ok(false)`.
    pub fn try_remove<Q>(&mut self, key: Option<&Q>) -> Result<bool, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let key = key.ok_or(MapError::NullKey)?;
        Ok(self.remove(key))
    }
}

impl<K, V, S> fmt::Debug for ProbeMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ProbeMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ProbeMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

/// Iterator over `(&K, &V)` in slot order.
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.slots.by_ref().find_map(Slot::entry)?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

/// Iterator over `(&K, &mut V)` in slot order.
pub struct IterMut<'a, K, V> {
    slots: core::slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.slots.by_ref().find_map(Slot::entry_mut)?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// Owning iterator over `(K, V)` in slot order.
pub struct IntoIter<K, V> {
    slots: std::vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.slots.by_ref().find_map(Slot::into_entry)?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for ProbeMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.table.len();
        IntoIter {
            slots: self.table.into_slots().into_iter(),
            remaining,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ProbeMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ProbeMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
