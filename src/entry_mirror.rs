//! EntryMirror: a display-facing copy of a [`ProbeMap`].
//!
//! The map gives no ordering guarantee, so a UI that wants stable rows keeps
//! its own listing in first-insertion order next to the map. The listing is
//! a presentation duplicate only; the map stays the source of truth for
//! lookups.

use crate::error::MapError;
use crate::probe_map::ProbeMap;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use log::{debug, info};
use std::collections::hash_map::RandomState;

/// What `add_entry` did to the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorChange {
    Added,
    Updated,
}

pub struct EntryMirror<K, V, S = RandomState> {
    map: ProbeMap<K, V, S>,
    listing: Vec<(K, V)>,
}

impl<K, V> EntryMirror<K, V> {
    pub fn new() -> Self {
        Self {
            map: ProbeMap::new(),
            listing: Vec::new(),
        }
    }
}

impl<K, V> Default for EntryMirror<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> EntryMirror<K, V, S> {
    /// Mirror a map built by the caller (custom capacity or hasher). Entries
    /// already in `map` are listed in its slot order.
    pub fn with_map(map: ProbeMap<K, V, S>) -> Self
    where
        K: Clone,
        V: Clone,
    {
        let listing = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Self { map, listing }
    }

    pub fn map(&self) -> &ProbeMap<K, V, S> {
        &self.map
    }

    /// Rows in first-insertion order.
    pub fn entries(&self) -> &[(K, V)] {
        &self.listing
    }

    pub fn len(&self) -> usize {
        self.listing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listing.is_empty()
    }

    pub fn clear_all(&mut self) {
        self.map.clear();
        self.listing.clear();
        info!("cleared all entries");
    }
}

impl<K, V, S> EntryMirror<K, V, S>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
    S: BuildHasher,
{
    /// Upsert into the map and mirror the change into the listing.
    pub fn add_entry(&mut self, key: K, value: V) -> MirrorChange {
        self.map.set(key.clone(), value.clone());
        let change = match self.listing.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => {
                *v = value;
                info!("updated: {:?} = {:?}", key, v);
                MirrorChange::Updated
            }
            None => {
                info!("added: {:?} = {:?}", key, value);
                self.listing.push((key, value));
                MirrorChange::Added
            }
        };
        debug!("current entries: {:?}", self.listing);
        change
    }

    /// Remove from the map and drop the listed row. `None` is refused with
    /// [`MapError::NullKey`].
    pub fn remove_entry(&mut self, key: Option<&K>) -> Result<bool, MapError> {
        let removed = self.map.try_remove(key)?;
        if let Some(key) = key {
            if let Some(pos) = self.listing.iter().position(|(k, _)| k == key) {
                self.listing.remove(pos);
            }
            if removed {
                info!("removed: {:?}", key);
            }
        }
        Ok(removed)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for EntryMirror<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryMirror")
            .field("listing", &self.listing)
            .field("capacity", &self.map.capacity())
            .finish()
    }
}
