//! Iterators over `ChainedHashMap`.
//!
//! All of them walk buckets in ascending index order and, inside a bucket,
//! in insertion order. `Iter` is also a comparable cursor: it knows which
//! table it reads and its `(bucket, offset)` position, so `map.iter()` can
//! be compared with `map.end()`.

use crate::bucket_table::{Bucket, Entry};
use core::fmt;
use core::iter::FusedIterator;

// First bucket at or after `from` that holds an entry.
fn next_occupied<K, V>(buckets: &[Bucket<K, V>], from: usize) -> Option<usize> {
    buckets
        .get(from..)?
        .iter()
        .position(|b| !b.is_empty())
        .map(|i| from + i)
}

/// Immutable iterator and cursor over a map's entries.
///
/// Holding one borrows the map, so no resize can happen underneath it.
pub struct Iter<'a, K, V> {
    buckets: &'a [Bucket<K, V>],
    bucket: usize,
    offset: usize,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn begin(buckets: &'a [Bucket<K, V>], len: usize) -> Self {
        Self {
            buckets,
            bucket: next_occupied(buckets, 0).unwrap_or(buckets.len()),
            offset: 0,
            remaining: len,
        }
    }

    /// One past the last occupied bucket, or the capacity for an empty table.
    pub(crate) fn end(buckets: &'a [Bucket<K, V>]) -> Self {
        let bucket = buckets
            .iter()
            .rposition(|b| !b.is_empty())
            .map_or(buckets.len(), |i| i + 1);
        Self {
            buckets,
            bucket,
            offset: 0,
            remaining: 0,
        }
    }

    /// Entry under the cursor without advancing.
    pub fn peek(&self) -> Option<(&'a K, &'a V)> {
        let buckets = self.buckets;
        buckets
            .get(self.bucket)?
            .get(self.offset)
            .map(|e| (&e.key, &e.value))
    }

    fn advance(&mut self) {
        self.offset += 1;
        if self.offset < self.buckets[self.bucket].len() {
            return;
        }
        // Skip any run of empty buckets. With none left, stop one past the
        // bucket just finished, which is the last occupied one.
        let from = self.bucket + 1;
        self.bucket = next_occupied(self.buckets, from).unwrap_or(from);
        self.offset = 0;
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let item = self.peek()?;
        self.advance();
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
        Self {
            buckets: self.buckets,
            bucket: self.bucket,
            offset: self.offset,
            remaining: self.remaining,
        }
    }
}

/// Cursors are equal when they read the same map at the same position.
impl<K, V> PartialEq for Iter<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.buckets.as_ptr(), other.buckets.as_ptr())
            && self.bucket == other.bucket
            && self.offset == other.offset
    }
}

impl<K, V> Eq for Iter<'_, K, V> {}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("bucket", &self.bucket)
            .field("offset", &self.offset)
            .field("remaining", &self.remaining)
            .finish()
    }
}

/// Mutable iterator; keys stay immutable.
pub struct IterMut<'a, K, V> {
    buckets: core::slice::IterMut<'a, Bucket<K, V>>,
    current: core::slice::IterMut<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(buckets: &'a mut [Bucket<K, V>], len: usize) -> Self {
        Self {
            buckets: buckets.iter_mut(),
            current: Default::default(),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.next() {
                self.remaining -= 1;
                return Some((&e.key, &mut e.value));
            }
            self.current = self.buckets.next()?.iter_mut();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator returned by `ChainedHashMap::into_iter`.
pub struct IntoIter<K, V> {
    buckets: std::vec::IntoIter<Bucket<K, V>>,
    current: std::vec::IntoIter<Entry<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(buckets: Vec<Bucket<K, V>>, len: usize) -> Self {
        Self {
            buckets: buckets.into_iter(),
            current: Vec::new().into_iter(),
            remaining: len,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.next() {
                self.remaining -= 1;
                return Some((e.key, e.value));
            }
            self.current = self.buckets.next()?.into_iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
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

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
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

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(crate) fn new(inner: IterMut<'a, K, V>) -> Self {
        Self { inner }
    }
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

#[cfg(test)]
mod tests {
    use crate::ChainedHashMap;
    use core::hash::{BuildHasher, Hasher};

    // Hashes a u64 key to itself so bucket placement is predictable.
    #[derive(Clone, Default)]
    struct IdentityBuildHasher;
    #[derive(Default)]
    struct IdentityHasher(u64);
    impl BuildHasher for IdentityBuildHasher {
        type Hasher = IdentityHasher;
        fn build_hasher(&self) -> Self::Hasher {
            IdentityHasher(0)
        }
    }
    impl Hasher for IdentityHasher {
        fn write(&mut self, bytes: &[u8]) {
            for b in bytes {
                self.0 = (self.0 << 8) | u64::from(*b);
            }
        }
        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
        fn finish(&self) -> u64 {
            self.0
        }
    }

    type IdMap = ChainedHashMap<u64, u64, IdentityBuildHasher>;

    fn id_map(keys: &[u64]) -> IdMap {
        let mut m = IdMap::with_hasher(IdentityBuildHasher);
        for &k in keys {
            m.insert(k, k * 10);
        }
        m
    }

    /// Invariant: order is ascending bucket, then insertion order inside a bucket.
    #[test]
    fn order_is_bucket_then_insertion() {
        // 8 keys -> 16 buckets; 17 and 1 share bucket 1.
        let m = id_map(&[17, 3, 1, 5, 20, 6, 7, 8]);
        assert_eq!(m.capacity(), 16);
        let keys: Vec<u64> = m.keys().copied().collect();
        assert_eq!(keys, [17, 1, 3, 20, 5, 6, 7, 8]);
    }

    /// Invariant: advancing past the last entry skips any run of empty
    /// buckets and lands exactly on `end()`.
    #[test]
    fn advancing_skips_empty_runs_and_reaches_end() {
        // 4 keys -> 8 buckets; buckets 1..=5 empty between 0 and 6.
        let m = id_map(&[0, 8, 6, 14]);
        assert_eq!(m.capacity(), 8);
        let mut it = m.iter();
        assert_eq!(it.next(), Some((&0, &0)));
        assert_eq!(it.next(), Some((&8, &80)));
        assert_eq!(it.peek(), Some((&6, &60)));
        assert_eq!(it.next(), Some((&6, &60)));
        assert_eq!(it.next(), Some((&14, &140)));
        assert_eq!(it, m.end());
        assert_eq!(it.next(), None);
        assert_eq!(it, m.end());
    }

    /// Invariant: trailing empty buckets do not keep the cursor from `end()`.
    #[test]
    fn end_with_trailing_empty_buckets() {
        let m = id_map(&[0, 1, 2, 3]);
        assert_eq!(m.capacity(), 8);
        let mut it = m.iter();
        for _ in 0..m.len() {
            assert_ne!(it, m.end());
            it.next();
        }
        assert_eq!(it, m.end());
    }

    /// Invariant: empty maps start at the end sentinel.
    #[test]
    fn empty_map_begin_equals_end() {
        let m = id_map(&[]);
        assert_eq!(m.iter(), m.end());
        assert_eq!(m.iter().next(), None);
    }

    /// Invariant: cursors on different maps never compare equal.
    #[test]
    fn cursors_compare_by_map_identity() {
        let a = id_map(&[1, 2]);
        let b = a.clone();
        assert_eq!(a.iter(), a.iter());
        assert_ne!(a.iter(), b.iter());
        assert_ne!(a.end(), b.end());
    }

    /// Invariant: iteration is restartable and length-exact.
    #[test]
    fn restartable_and_exact_size() {
        let m = id_map(&[4, 9, 12, 33, 2]);
        let first: Vec<_> = m.iter().collect();
        let second: Vec<_> = m.iter().collect();
        assert_eq!(first, second);
        let mut it = m.iter();
        assert_eq!(it.len(), 5);
        it.next();
        assert_eq!(it.len(), 4);
        let saved = it.clone();
        assert_eq!(it.next(), saved.peek());
    }
}
