//! Table: open-addressing storage with linear probing and tombstones.

use crate::interner::Key;
use log::{debug, trace};
use std::collections::TryReserveError;

/// One bucket of the table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Slot {
    Empty,
    /// A deleted key; keeps probe chains intact until the next rehash.
    Tombstone,
    Occupied { key: Key, value: i32 },
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to allocate table storage")]
    Alloc(#[from] TryReserveError),
    #[error("table capacity overflow")]
    CapacityOverflow,
}

/// Map from interned `Key`s to `i32` values.
///
/// `count` tracks used slots (live entries plus tombstones) and drives
/// growth; `len` tracks live entries only.
#[derive(Debug, Default)]
pub struct Table {
    entries: Vec<Slot>,
    count: usize,
    len: usize,
}

impl Table {
    pub const MIN_CAPACITY: usize = 8;

    // Maximum load factor, as a ratio: 3/4.
    const MAX_LOAD_NUM: usize = 3;
    const MAX_LOAD_DEN: usize = 4;

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            count: 0,
            len: 0,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of used slots: live entries plus tombstones.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn tombstones(&self) -> usize {
        self.count - self.len
    }

    /// Free the slot array and return to the initial, zero-capacity state.
    pub fn release(&mut self) {
        trace!(
            "releasing table: capacity={} count={} len={}",
            self.capacity(),
            self.count,
            self.len
        );
        self.entries = Vec::new();
        self.count = 0;
        self.len = 0;
    }

    /// Insert or overwrite. Returns `Ok(true)` if `key` was not present.
    ///
    /// Grows the table first when one more used slot would exceed the
    /// maximum load factor. On error the table is left unchanged.
    pub fn set(&mut self, key: Key, value: i32) -> Result<bool, TableError> {
        if (self.count + 1) * Self::MAX_LOAD_DEN > self.capacity() * Self::MAX_LOAD_NUM {
            let capacity = grow_capacity(self.capacity())?;
            self.adjust_capacity(capacity)?;
        }

        let idx = find_slot(&self.entries, key);
        let slot = &mut self.entries[idx];
        let is_new_key = !matches!(slot, Slot::Occupied { .. });
        if is_new_key {
            // A reused tombstone is already part of `count`.
            if *slot == Slot::Empty {
                self.count += 1;
            }
            self.len += 1;
        }
        *slot = Slot::Occupied { key, value };
        Ok(is_new_key)
    }

    pub fn get(&self, key: Key) -> Option<i32> {
        if self.count == 0 {
            return None;
        }
        match self.entries[find_slot(&self.entries, key)] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key`, leaving a tombstone. Returns whether it was present.
    ///
    /// `count` is not decremented; the slot is reclaimed on the next growth.
    pub fn delete(&mut self, key: Key) -> bool {
        if self.count == 0 {
            return false;
        }
        let idx = find_slot(&self.entries, key);
        let slot = &mut self.entries[idx];
        if !matches!(slot, Slot::Occupied { .. }) {
            return false;
        }
        *slot = Slot::Tombstone;
        self.len -= 1;
        true
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, i32)> + '_ {
        self.entries.iter().filter_map(|s| match *s {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => None,
        })
    }

    // Rehash every live entry into a fresh array of `capacity` slots,
    // dropping tombstones.
    fn adjust_capacity(&mut self, capacity: usize) -> Result<(), TableError> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(capacity)?;
        entries.resize(capacity, Slot::Empty);

        let mut count = 0;
        for slot in &self.entries {
            if let Slot::Occupied { key, value } = *slot {
                let idx = find_slot(&entries, key);
                entries[idx] = Slot::Occupied { key, value };
                count += 1;
            }
        }

        debug!(
            "table grow: capacity {} -> {}, moved {} entries, purged {} tombstones",
            self.capacity(),
            capacity,
            count,
            self.count - count
        );
        self.entries = entries;
        self.count = count;
        debug_assert_eq!(self.count, self.len);
        Ok(())
    }
}

fn grow_capacity(capacity: usize) -> Result<usize, TableError> {
    if capacity < Table::MIN_CAPACITY {
        Ok(Table::MIN_CAPACITY)
    } else {
        capacity.checked_mul(2).ok_or(TableError::CapacityOverflow)
    }
}

// Index of the slot holding `key`, or of the slot where it would be
// inserted: the first tombstone on the probe path if any, else the empty
// slot that ends it. Requires at least one empty slot.
fn find_slot(entries: &[Slot], key: Key) -> usize {
    let capacity = entries.len();
    debug_assert!(capacity > 0);
    let mut index = key.hash() as usize % capacity;
    let mut tombstone = None;
    loop {
        match entries[index] {
            Slot::Empty => return tombstone.unwrap_or(index),
            Slot::Tombstone => {
                if tombstone.is_none() {
                    tombstone = Some(index);
                }
            }
            Slot::Occupied { key: k, .. } if k == key => return index,
            Slot::Occupied { .. } => {}
        }
        index = (index + 1) % capacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::Interner;
    use slotmap::{DefaultKey, SlotMap};

    fn keys(interner: &mut Interner, n: usize) -> Vec<Key> {
        (0..n).map(|i| interner.intern(&format!("key{i}"))).collect()
    }

    // Distinct keys that all share one hash, to force every lookup down
    // the same probe chain.
    fn colliding_keys(n: usize, hash: u32) -> Vec<Key> {
        let mut ids: SlotMap<DefaultKey, ()> = SlotMap::new();
        (0..n).map(|_| Key::new(ids.insert(()), hash)).collect()
    }

    /// Invariant: A fresh table has no storage and answers every query
    /// negatively without probing.
    #[test]
    fn empty_table_lookups() {
        let mut i = Interner::new();
        let k = i.intern("a");
        let mut t = Table::new();
        assert_eq!(t.capacity(), 0);
        assert_eq!(t.count(), 0);
        assert_eq!(t.get(k), None);
        assert!(!t.delete(k));
        assert!(t.is_empty());
    }

    /// Invariant: First insert allocates the minimum capacity.
    #[test]
    fn first_set_allocates_min_capacity() {
        let mut i = Interner::new();
        let k = i.intern("a");
        let mut t = Table::new();
        assert!(t.set(k, 1).unwrap());
        assert_eq!(t.capacity(), Table::MIN_CAPACITY);
        assert_eq!(t.get(k), Some(1));
    }

    /// Invariant: Overwriting an existing key reports `false` and does not
    /// consume a slot.
    #[test]
    fn overwrite_reports_existing_key() {
        let mut i = Interner::new();
        let k = i.intern("a");
        let mut t = Table::new();
        assert!(t.set(k, 1).unwrap());
        assert!(!t.set(k, 2).unwrap());
        assert_eq!(t.get(k), Some(2));
        assert_eq!(t.count(), 1);
        assert_eq!(t.len(), 1);
    }

    /// Invariant: `i32::MAX` is an ordinary value and never reads as a
    /// tombstone.
    #[test]
    fn max_value_is_storable() {
        let mut i = Interner::new();
        let ks = keys(&mut i, 3);
        let mut t = Table::new();
        for k in &ks {
            t.set(*k, i32::MAX).unwrap();
        }
        for k in &ks {
            assert_eq!(t.get(*k), Some(i32::MAX));
        }
        assert_eq!(t.tombstones(), 0);
    }

    /// Invariant: Deleting leaves a tombstone that keeps later entries on
    /// the same probe chain reachable.
    #[test]
    fn tombstone_preserves_probe_chain() {
        let ks = colliding_keys(4, 3);
        let mut t = Table::new();
        for (v, k) in ks.iter().enumerate() {
            t.set(*k, v as i32).unwrap();
        }
        assert!(t.delete(ks[1]));
        assert_eq!(t.get(ks[1]), None);
        assert_eq!(t.get(ks[2]), Some(2));
        assert_eq!(t.get(ks[3]), Some(3));
        assert_eq!(t.count(), 4);
        assert_eq!(t.len(), 3);
        assert_eq!(t.tombstones(), 1);
    }

    /// Invariant: A later exact match wins over the first tombstone seen,
    /// so re-setting a key behind a tombstone updates it in place.
    #[test]
    fn match_beyond_tombstone_takes_priority() {
        let ks = colliding_keys(3, 0);
        let mut t = Table::new();
        for k in &ks {
            t.set(*k, 0).unwrap();
        }
        assert!(t.delete(ks[0]));
        assert!(!t.set(ks[2], 42).unwrap());
        assert_eq!(t.get(ks[2]), Some(42));
        assert_eq!(t.len(), 2);
        assert_eq!(t.iter().filter(|(k, _)| *k == ks[2]).count(), 1);
    }

    /// Invariant: Inserting into a tombstone reuses it without growing
    /// `count`.
    #[test]
    fn set_reuses_tombstone() {
        let ks = colliding_keys(3, 5);
        let mut t = Table::new();
        t.set(ks[0], 1).unwrap();
        t.set(ks[1], 2).unwrap();
        assert!(t.delete(ks[0]));
        assert_eq!(t.count(), 2);

        assert!(t.set(ks[2], 3).unwrap());
        assert_eq!(t.count(), 2);
        assert_eq!(t.tombstones(), 0);
        assert_eq!(t.get(ks[2]), Some(3));
        assert_eq!(t.get(ks[1]), Some(2));
    }

    /// Invariant: Deleting an absent key is a no-op.
    #[test]
    fn delete_absent_key_is_noop() {
        let mut i = Interner::new();
        let ks = keys(&mut i, 2);
        let mut t = Table::new();
        t.set(ks[0], 1).unwrap();
        assert!(!t.delete(ks[1]));
        assert_eq!(t.count(), 1);
        assert_eq!(t.len(), 1);
        assert!(t.delete(ks[0]));
        assert!(!t.delete(ks[0]));
        assert_eq!(t.count(), 1);
    }

    /// Invariant: Growth triggers when one more used slot would exceed 3/4
    /// of capacity, and rehashing drops tombstones.
    #[test]
    fn growth_purges_tombstones() {
        let mut i = Interner::new();
        let ks = keys(&mut i, 7);
        let mut t = Table::new();
        for k in &ks[..6] {
            t.set(*k, 0).unwrap();
        }
        assert_eq!(t.capacity(), 8);
        assert!(t.delete(ks[0]));
        assert_eq!(t.count(), 6);

        t.set(ks[6], 6).unwrap();
        assert_eq!(t.capacity(), 16);
        assert_eq!(t.tombstones(), 0);
        assert_eq!(t.count(), 6);
        assert_eq!(t.get(ks[0]), None);
    }

    #[test]
    fn grow_capacity_sequence() {
        assert_eq!(grow_capacity(0).unwrap(), 8);
        assert_eq!(grow_capacity(8).unwrap(), 16);
        assert_eq!(grow_capacity(16).unwrap(), 32);
        assert!(matches!(
            grow_capacity(usize::MAX),
            Err(TableError::CapacityOverflow)
        ));
    }

    /// Invariant: `release` frees storage and the table is reusable.
    #[test]
    fn release_resets_state() {
        let mut i = Interner::new();
        let ks = keys(&mut i, 10);
        let mut t = Table::new();
        for k in &ks {
            t.set(*k, 1).unwrap();
        }
        t.release();
        assert_eq!(t.capacity(), 0);
        assert_eq!(t.count(), 0);
        assert_eq!(t.len(), 0);
        assert_eq!(t.get(ks[0]), None);

        assert!(t.set(ks[0], 5).unwrap());
        assert_eq!(t.capacity(), 8);
        assert_eq!(t.get(ks[0]), Some(5));
    }

    /// Invariant: Probing wraps around from the last slot to the first.
    #[test]
    fn probe_wraps_around() {
        let ks = colliding_keys(3, 7);
        let mut t = Table::new();
        for (v, k) in ks.iter().enumerate() {
            t.set(*k, v as i32).unwrap();
        }
        assert_eq!(t.capacity(), 8);
        for (v, k) in ks.iter().enumerate() {
            assert_eq!(t.get(*k), Some(v as i32));
        }
        assert!(matches!(t.entries[0], Slot::Occupied { .. }));
    }
}
