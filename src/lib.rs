//! interned-table: an open-addressing hash table mapping interned string
//! keys to `i32` values.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, predictable storage engine for symbol-table style
//!   workloads, where keys are interned once and looked up many times.
//! - Layers:
//!   - `fnv::hash_bytes`: 32-bit FNV-1a, the only hash the crate uses.
//!   - `Interner`: owns key bytes in a generational arena and hands out
//!     `Copy` `Key` handles carrying the cached hash. Equal bytes always
//!     intern to the same `Key`.
//!   - `Table`: flat slot array with linear probing, tombstone deletion
//!     and doubling growth. Stores `Key` handles, never bytes.
//!
//! Key identity
//! - The table matches keys by handle identity and never compares
//!   string contents. Because the interner deduplicates, identity and
//!   content equality coincide for keys from one interner. Keys from
//!   different interners are distinct by contract; mixing them in one
//!   table is a logic error (never memory-unsafe).
//!
//! Slot states and accounting
//! - Each slot is `Empty`, `Tombstone` or `Occupied`; no value is
//!   reserved, so every `i32` is storable.
//! - `count` is used slots (live + tombstones) and drives growth:
//!   the table grows before a `set` when `count + 1 > 3/4 * capacity`.
//!   New capacity is `max(8, 2 * capacity)`.
//! - `delete` leaves a tombstone and does not decrement `count`.
//!   Tombstones are reclaimed only by growth, which rehashes live
//!   entries into a fresh array.
//!
//! Errors
//! - Growth allocates with `try_reserve_exact`; failure is returned as
//!   `TableError` and leaves the table untouched. Lookups and deletes of
//!   absent keys are `None`/`false`, never errors.
//!
//! Notes and non-goals
//! - Single-threaded, no internal locking.
//! - Values are fixed-width integers only.
//! - Iteration order is unspecified.
//! - No shrinking and no tunable growth policy.

pub mod fnv;
pub mod interner;
pub mod table;
mod table_proptest;

// Public surface
pub use fnv::hash_bytes;
pub use interner::{Interner, Key};
pub use table::{Table, TableError};
