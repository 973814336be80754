//! ChainedHashMap: public container over `BucketTable` and the resize policy.

use crate::bucket_table::{BucketTable, Slot};
use crate::error::MapError;
use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::resize::{self, START_CAPACITY};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use tracing::trace;

/// A hash map with separate chaining.
///
/// After every insert or erase that changes the number of entries, the
/// bucket count is doubled or halved until the load factor lies in
/// `[0.25, 0.75]` (or a single bucket remains). `clear` keeps the current
/// bucket count.
#[derive(Clone)]
pub struct ChainedHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    table: BucketTable<K, V>,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// Build a map from parallel key and value sequences. Later duplicates
    /// of a key overwrite earlier values.
    pub fn try_from_parts(keys: Vec<K>, values: Vec<V>) -> Result<Self, MapError> {
        if keys.len() != values.len() {
            return Err(MapError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }
        let mut map = Self::new();
        for (k, v) in keys.into_iter().zip(values) {
            map.insert_or_assign(k, v);
        }
        Ok(map)
    }
}

impl<K, V, S> Default for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Number of buckets. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        resize::load_factor(self.len(), self.capacity())
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Remove every entry. The bucket count is left unchanged.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Cursor at the first entry, in ascending bucket order and insertion
    /// order within a bucket.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::begin(self.table.buckets(), self.len())
    }

    /// The end sentinel: what `iter()` compares equal to once exhausted.
    pub fn end(&self) -> Iter<'_, K, V> {
        Iter::end(self.table.buckets())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let len = self.len();
        IterMut::new(self.table.buckets_mut(), len)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            table: BucketTable::with_capacity(START_CAPACITY),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    // Apply the resize policy; `tracked` follows one entry across a rehash.
    fn rebalance(&mut self, tracked: Option<Slot>) -> Option<Slot> {
        let from = self.table.capacity();
        let to = resize::target_capacity(self.table.len(), from);
        if to == from {
            return tracked;
        }
        trace!(from, to, len = self.table.len(), "rehashing bucket table");
        self.table.rehash(to, tracked)
    }

    // Append a key known to be absent, rebalance, and return where it ended up.
    fn push_new(&mut self, hash: u64, key: K, value: V) -> Slot {
        let slot = self.table.push(hash, key, value);
        self.rebalance(Some(slot)).unwrap_or(slot)
    }

    /// Insert `key -> value` only if `key` is absent. Returns `false` and
    /// leaves the stored value untouched when the key already exists.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let hash = self.make_hash(&key);
        match self.table.insert(hash, key, value) {
            Some(slot) => {
                self.rebalance(Some(slot));
                true
            }
            None => false,
        }
    }

    /// Insert or overwrite. Returns the previous value if the key existed.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        match self.table.find(hash, &key) {
            Some(slot) => Some(core::mem::replace(
                &mut self.table.entry_mut(slot).value,
                value,
            )),
            None => {
                self.push_new(hash, key, value);
                None
            }
        }
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.contains(self.make_hash(q), q)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.lookup(self.make_hash(q), q)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.table.lookup_mut(hash, q)
    }

    pub fn at<Q>(&self, q: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(MapError::NotFound)
    }

    pub fn at_mut<Q>(&mut self, q: &Q) -> Result<&mut V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_mut(q).ok_or(MapError::NotFound)
    }

    /// Mutable element access: an absent key is first inserted with
    /// `V::default()`, so this may grow the map.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let hash = self.make_hash(&key);
        let slot = match self.table.find(hash, &key) {
            Some(slot) => slot,
            None => self.push_new(hash, key, V::default()),
        };
        &mut self.table.entry_mut(slot).value
    }

    /// Read-only element access: the stored value, or `V::default()` for an
    /// absent key. Never inserts.
    pub fn value_or_default<Q>(&self, q: &Q) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone + Default,
    {
        self.get(q).cloned().unwrap_or_default()
    }

    /// Remove `q`, returning its value.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let (_k, v) = self.table.erase(hash, q)?;
        self.rebalance(None);
        Some(v)
    }

    /// Remove `q`. Returns `false` if it was not present.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove(q).is_some()
    }

    /// Number of entries sharing `q`'s bucket, `q` included.
    pub fn bucket_size<Q>(&self, q: &Q) -> Result<usize, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self
            .table
            .find(self.make_hash(q), q)
            .ok_or(MapError::NotFound)?;
        Ok(self.table.bucket_len(slot.bucket))
    }

    /// Index of the bucket holding `q` under the current capacity.
    pub fn bucket_index<Q>(&self, q: &Q) -> Result<usize, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table
            .find(self.make_hash(q), q)
            .map(|slot| slot.bucket)
            .ok_or(MapError::NotFound)
    }
}

// Equal sizes plus every left entry found with an equal value on the right
// is enough: the right side cannot hold an extra key.
impl<K, V, S> PartialEq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K, V, S> Eq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert_or_assign(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
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

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for ChainedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let len = self.len();
        IntoIter::new(self.table.into_buckets(), len)
    }
}
