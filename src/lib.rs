//! chained-hashmap: a single-threaded hash map with separate chaining and
//! load-factor driven resizing, plus a `String -> String` dictionary.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the storage, the resize decision and the public API in
//!   separate layers so each has a small contract.
//! - Layers:
//!   - BucketTable<K, V>: `capacity` insertion-ordered buckets of entries.
//!     Knows nothing about hashing beyond the `u64` it is handed; folds it
//!     to a bucket with `hash & (capacity - 1)`.
//!   - resize: pure functions mapping `(len, capacity)` to the capacity the
//!     table should have.
//!   - ChainedHashMap<K, V, S>: hashes keys with `S: BuildHasher`, calls
//!     the table, then applies the resize policy after every insert or
//!     erase that changed the entry count.
//!   - Dictionary: a `ChainedHashMap<String, String>` whose `erase` fails
//!     on absent keys and which adds a bulk `update`.
//!
//! Constraints
//! - Capacity is a power of two, at least 1, starting at 16.
//! - After each completed insert/erase, `0.25 <= len/capacity <= 0.75`
//!   or the table has a single bucket. `clear` keeps the bucket count.
//! - Keys are unique; `insert` never overwrites (`insert_or_assign` does).
//! - Iteration order: ascending bucket, then insertion order within a
//!   bucket. Iterators borrow the map, so a resize cannot invalidate them.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its `u64` hash. Rehash re-indexes from the stored
//!   hash; `K: Hash` is never invoked after insertion.
//! - The rehash moves entries out of the old bucket vector into a freshly
//!   allocated one; the old vector is dropped once every entry has moved.
//!
//! Errors
//! - `MapError::NotFound` for `at`, `at_mut`, `bucket_size`, `bucket_index`.
//! - `MapError::LengthMismatch` for `try_from_parts`.
//! - `DictionaryError::InvalidKey` for `Dictionary::erase`.
//!
//! Notes and non-goals
//! - No internal locking; concurrent mutation needs an external lock.
//! - No open addressing, no custom allocators, no persistence.
//! - Resizes are reported as `tracing` events at TRACE level.

mod bucket_table;
pub mod chained_hash_map;
mod chained_hash_map_proptest;
pub mod dictionary;
pub mod error;
pub mod iter;
pub mod resize;

// Public surface
pub use chained_hash_map::ChainedHashMap;
pub use dictionary::Dictionary;
pub use error::{DictionaryError, MapError};
