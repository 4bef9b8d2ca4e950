//! Interner: owns key bytes and hands out `Copy` key handles.
//!
//! Each distinct byte string is stored once in a generational arena and
//! identified by a `Key`. Interning the same bytes again yields the same
//! `Key`, so comparing handles is equivalent to comparing contents within
//! one interner. The FNV-1a hash is computed once per distinct string and
//! cached in both the arena entry and every `Key` minted for it.

use crate::fnv::hash_bytes;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};

/// Interned string handle.
///
/// Equality is identity: two keys are equal iff they name the same
/// interned entry. Keys minted by different interners are unrelated.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Key {
    id: DefaultKey,
    hash: u32,
}

impl Key {
    pub(crate) fn new(id: DefaultKey, hash: u32) -> Self {
        Key { id, hash }
    }

    /// Cached FNV-1a hash of the key's bytes.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn bytes<'a>(&self, interner: &'a Interner) -> Option<&'a [u8]> {
        interner.resolve(*self)
    }

    pub fn len(&self, interner: &Interner) -> Option<usize> {
        interner.resolve(*self).map(<[u8]>::len)
    }
}

#[derive(Debug)]
struct Interned {
    bytes: Box<[u8]>,
    hash: u32,
}

/// Append-only string arena with a dedup index.
pub struct Interner {
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Interned>,
}

// hashbrown filters on the top bits of the hash; spread the 32-bit FNV
// value across the full word so those bits are not constant.
#[inline]
fn index_hash(hash: u32) -> u64 {
    u64::from(hash).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        Self {
            index: HashTable::new(),
            slots: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Return the key for `bytes`, storing a copy on first sight.
    pub fn intern<B>(&mut self, bytes: &B) -> Key
    where
        B: ?Sized + AsRef<[u8]>,
    {
        let bytes = bytes.as_ref();
        let hash = hash_bytes(bytes);
        match self.index.entry(
            index_hash(hash),
            |&k| {
                self.slots
                    .get(k)
                    .map(|e| e.hash == hash && &*e.bytes == bytes)
                    .unwrap_or(false)
            },
            |&k| self.slots.get(k).map(|e| index_hash(e.hash)).unwrap_or(0),
        ) {
            hashbrown::hash_table::Entry::Occupied(o) => Key::new(*o.get(), hash),
            hashbrown::hash_table::Entry::Vacant(v) => {
                let k = self.slots.insert(Interned {
                    bytes: bytes.into(),
                    hash,
                });
                let _ = v.insert(k);
                Key::new(k, hash)
            }
        }
    }

    /// Look up the key for `bytes` without interning.
    pub fn get<B>(&self, bytes: &B) -> Option<Key>
    where
        B: ?Sized + AsRef<[u8]>,
    {
        let bytes = bytes.as_ref();
        let hash = hash_bytes(bytes);
        self.index
            .find(index_hash(hash), |&k| {
                self.slots
                    .get(k)
                    .map(|e| e.hash == hash && &*e.bytes == bytes)
                    .unwrap_or(false)
            })
            .map(|&k| Key::new(k, hash))
    }

    /// Bytes behind `key`, or `None` if this interner never minted it.
    pub fn resolve(&self, key: Key) -> Option<&[u8]> {
        self.slots
            .get(key.id)
            .filter(|e| e.hash == key.hash)
            .map(|e| &*e.bytes)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, &[u8])> {
        self.slots
            .iter()
            .map(|(k, e)| (Key::new(k, e.hash), &*e.bytes))
    }
}
