//! BucketTable: the chained storage layer.
//!
//! An array of `capacity` buckets, each an insertion-ordered `Vec` of
//! entries. The table never hashes keys itself; callers pass the `u64`
//! hash alongside the key and the table stores it with the entry so a
//! rehash can re-index without calling back into `K: Hash`.

use core::borrow::Borrow;
use core::mem;

#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    hash: u64,
}

pub(crate) type Bucket<K, V> = Vec<Entry<K, V>>;

/// Position of an entry: bucket index plus offset within that bucket.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Slot {
    pub(crate) bucket: usize,
    pub(crate) offset: usize,
}

/// Fold a hash onto a power-of-two bucket count.
#[inline]
pub(crate) fn index_for(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as usize) & (capacity - 1)
}

fn empty_buckets<K, V>(capacity: usize) -> Vec<Bucket<K, V>> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, Vec::new);
    buckets
}

#[derive(Debug, Clone)]
pub(crate) struct BucketTable<K, V> {
    buckets: Vec<Bucket<K, V>>,
    len: usize,
}

impl<K, V> BucketTable<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: empty_buckets(capacity),
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn index(&self, hash: u64) -> usize {
        index_for(hash, self.capacity())
    }

    pub(crate) fn buckets(&self) -> &[Bucket<K, V>] {
        &self.buckets
    }

    pub(crate) fn buckets_mut(&mut self) -> &mut [Bucket<K, V>] {
        &mut self.buckets
    }

    pub(crate) fn into_buckets(self) -> Vec<Bucket<K, V>> {
        self.buckets
    }

    pub(crate) fn bucket_len(&self, index: usize) -> usize {
        self.buckets[index].len()
    }

    pub(crate) fn find<Q>(&self, hash: u64, q: &Q) -> Option<Slot>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let bucket = self.index(hash);
        self.buckets[bucket]
            .iter()
            .position(|e| e.hash == hash && e.key.borrow() == q)
            .map(|offset| Slot { bucket, offset })
    }

    pub(crate) fn contains<Q>(&self, hash: u64, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.find(hash, q).is_some()
    }

    pub(crate) fn lookup<Q>(&self, hash: u64, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.find(hash, q).map(|slot| &self.entry(slot).value)
    }

    pub(crate) fn lookup_mut<Q>(&mut self, hash: u64, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let slot = self.find(hash, q)?;
        Some(&mut self.entry_mut(slot).value)
    }

    #[inline]
    pub(crate) fn entry(&self, slot: Slot) -> &Entry<K, V> {
        &self.buckets[slot.bucket][slot.offset]
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, slot: Slot) -> &mut Entry<K, V> {
        &mut self.buckets[slot.bucket][slot.offset]
    }

    /// Append `key -> value` to its bucket. The caller guarantees the key
    /// is absent.
    pub(crate) fn push(&mut self, hash: u64, key: K, value: V) -> Slot {
        let bucket = self.index(hash);
        let chain = &mut self.buckets[bucket];
        let offset = chain.len();
        chain.push(Entry { key, value, hash });
        self.len += 1;
        Slot { bucket, offset }
    }

    /// Insert-if-absent. Returns the new entry's slot, or `None` (dropping
    /// the pair) when the key is already stored.
    pub(crate) fn insert(&mut self, hash: u64, key: K, value: V) -> Option<Slot>
    where
        K: Eq,
    {
        if self.contains(hash, &key) {
            return None;
        }
        Some(self.push(hash, key, value))
    }

    /// Remove the entry equal to `q`. Later entries of the same bucket keep
    /// their relative order.
    pub(crate) fn erase<Q>(&mut self, hash: u64, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let slot = self.find(hash, q)?;
        let entry = self.buckets[slot.bucket].remove(slot.offset);
        self.len -= 1;
        Some((entry.key, entry.value))
    }

    /// Drop every entry; the bucket count is kept.
    pub(crate) fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Rebuild the table with `capacity` buckets, moving entries in
    /// bucket-then-insertion order. If `tracked` names a live slot, its
    /// position in the new table is returned.
    pub(crate) fn rehash(&mut self, capacity: usize, tracked: Option<Slot>) -> Option<Slot> {
        let old = mem::replace(&mut self.buckets, empty_buckets(capacity));
        let mut moved = None;
        for (bucket, chain) in old.into_iter().enumerate() {
            for (offset, entry) in chain.into_iter().enumerate() {
                let dest = &mut self.buckets[index_for(entry.hash, capacity)];
                if tracked == Some(Slot { bucket, offset }) {
                    moved = Some(Slot {
                        bucket: index_for(entry.hash, capacity),
                        offset: dest.len(),
                    });
                }
                dest.push(entry);
            }
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_in(table: &BucketTable<&'static str, i32>, bucket: usize) -> Vec<&'static str> {
        table.buckets()[bucket].iter().map(|e| e.key).collect()
    }

    #[test]
    fn index_masks_low_bits() {
        assert_eq!(index_for(0b1011, 4), 0b11);
        assert_eq!(index_for(u64::MAX, 16), 15);
        assert_eq!(index_for(12345, 1), 0);
    }

    #[test]
    fn insert_is_insert_if_absent() {
        let mut t = BucketTable::with_capacity(4);
        assert_eq!(t.insert(5, "a", 1), Some(Slot { bucket: 1, offset: 0 }));
        assert_eq!(t.insert(5, "a", 2), None);
        assert_eq!(t.lookup(5, "a"), Some(&1));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn colliding_keys_chain_in_insertion_order() {
        let mut t = BucketTable::with_capacity(4);
        t.insert(2, "a", 1);
        t.insert(6, "b", 2);
        t.insert(10, "c", 3);
        assert_eq!(keys_in(&t, 2), ["a", "b", "c"]);
        assert_eq!(t.bucket_len(2), 3);

        // Erasing from the middle keeps the others in order.
        assert_eq!(t.erase(6, "b"), Some(("b", 2)));
        assert_eq!(keys_in(&t, 2), ["a", "c"]);
        assert_eq!(t.erase(6, "b"), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn lookup_mut_updates_in_place() {
        let mut t = BucketTable::with_capacity(2);
        t.insert(1, "k", 10);
        *t.lookup_mut(1, "k").unwrap() += 5;
        assert_eq!(t.lookup(1, "k"), Some(&15));
        assert!(t.lookup_mut(1, "x").is_none());
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut t = BucketTable::with_capacity(8);
        for (h, k) in [(0, "a"), (1, "b"), (9, "c")] {
            t.insert(h, k, 0);
        }
        t.clear();
        assert_eq!(t.len(), 0);
        assert_eq!(t.capacity(), 8);
        assert!(t.buckets().iter().all(Vec::is_empty));
    }

    #[test]
    fn rehash_reindexes_from_stored_hash_and_tracks_slot() {
        let mut t = BucketTable::with_capacity(2);
        t.insert(1, "a", 1);
        t.insert(3, "b", 2);
        t.insert(5, "c", 3);
        let tracked = t.find(5, "c");
        assert_eq!(tracked, Some(Slot { bucket: 1, offset: 2 }));

        let moved = t.rehash(4, tracked);
        assert_eq!(t.capacity(), 4);
        assert_eq!(t.len(), 3);
        assert_eq!(keys_in(&t, 1), ["a", "c"]);
        assert_eq!(keys_in(&t, 3), ["b"]);
        assert_eq!(moved, Some(Slot { bucket: 1, offset: 1 }));
        assert_eq!(t.entry(moved.unwrap()).key, "c");

        // Shrinking back to one bucket concatenates in old bucket order.
        t.rehash(1, None);
        assert_eq!(keys_in(&t, 0), ["a", "c", "b"]);
    }
}
