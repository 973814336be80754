//! Dictionary: a `String -> String` map with a strict `erase` and bulk `update`.
//!
//! Read-only queries go through `Deref` to the underlying map. Mutators are
//! forwarded explicitly so the non-failing `ChainedHashMap::erase` is not
//! reachable on a dictionary.

use crate::chained_hash_map::ChainedHashMap;
use crate::error::{DictionaryError, MapError};
use core::ops::Deref;
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dictionary {
    map: ChainedHashMap<String, String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parallel key and value sequences; see
    /// `ChainedHashMap::try_from_parts`.
    pub fn try_from_parts(keys: Vec<String>, values: Vec<String>) -> Result<Self, DictionaryError> {
        let map = ChainedHashMap::try_from_parts(keys, values)?;
        Ok(Self { map })
    }

    /// Insert if absent; `false` when the key is already present.
    pub fn insert(&mut self, key: String, value: String) -> bool {
        self.map.insert(key, value)
    }

    /// Remove `key`, failing with `InvalidKey` if it is not present.
    pub fn erase(&mut self, key: &str) -> Result<(), DictionaryError> {
        if self.map.erase(key) {
            Ok(())
        } else {
            Err(DictionaryError::InvalidKey(key.to_string()))
        }
    }

    /// Apply every pair in order: an existing key is removed and re-inserted
    /// with the new value, a new key is inserted.
    pub fn update<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut processed = 0usize;
        let mut replaced = 0usize;
        for (key, value) in pairs {
            if self.map.erase(key.as_str()) {
                replaced += 1;
            }
            self.map.insert(key, value);
            processed += 1;
        }
        debug!(processed, replaced, len = self.map.len(), "dictionary updated");
    }

    pub fn at_mut(&mut self, key: &str) -> Result<&mut String, MapError> {
        self.map.at_mut(key)
    }

    pub fn get_or_insert_default(&mut self, key: String) -> &mut String {
        self.map.get_or_insert_default(key)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn into_inner(self) -> ChainedHashMap<String, String> {
        self.map
    }
}

impl Deref for Dictionary {
    type Target = ChainedHashMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.map
    }
}

impl From<ChainedHashMap<String, String>> for Dictionary {
    fn from(map: ChainedHashMap<String, String>) -> Self {
        Self { map }
    }
}

impl FromIterator<(String, String)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a String, &'a String);
    type IntoIter = crate::iter::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> String {
        v.to_string()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (s(k), s(v))).collect()
    }

    /// Invariant: erase of a present key succeeds; of an absent key fails
    /// with InvalidKey and leaves the dictionary unchanged.
    #[test]
    fn erase_is_strict() {
        let mut d = Dictionary::new();
        d.insert(s("a"), s("1"));
        assert_eq!(d.erase("a"), Ok(()));
        assert!(d.is_empty());
        assert_eq!(d.erase("a"), Err(DictionaryError::InvalidKey(s("a"))));
        assert!(d.is_empty());
    }

    /// Invariant: update processes each pair once, in order; later pairs win.
    #[test]
    fn update_replaces_and_inserts() {
        let mut d = Dictionary::new();
        d.insert(s("a"), s("1"));
        d.insert(s("b"), s("2"));
        d.update(pairs(&[("b", "20"), ("c", "3"), ("c", "30"), ("d", "4")]));
        assert_eq!(d.len(), 4);
        assert_eq!(d.at("a").map(String::as_str), Ok("1"));
        assert_eq!(d.at("b").map(String::as_str), Ok("20"));
        assert_eq!(d.at("c").map(String::as_str), Ok("30"));
        assert_eq!(d.at("d").map(String::as_str), Ok("4"));
    }

    #[test]
    fn update_with_nothing_is_a_no_op() {
        let mut d = Dictionary::try_from_parts(vec![s("k")], vec![s("v")]).unwrap();
        let before = d.clone();
        d.update(Vec::new());
        assert_eq!(d, before);
    }

    /// Invariant: construction errors surface as the wrapped map error.
    #[test]
    fn try_from_parts_length_mismatch() {
        let err = Dictionary::try_from_parts(vec![s("x")], vec![s("1"), s("2")]);
        assert_eq!(
            err.err(),
            Some(DictionaryError::Map(MapError::LengthMismatch { keys: 1, values: 2 }))
        );
    }

    /// Invariant: read access through Deref never inserts.
    #[test]
    fn deref_read_surface() {
        let mut d: Dictionary = pairs(&[("a", "1")]).into_iter().collect();
        assert_eq!(d.value_or_default("zz"), "");
        assert_eq!(d.len(), 1);
        d.get_or_insert_default(s("zz")).push('!');
        assert_eq!(d.len(), 2);
        assert_eq!(d.at("zz").map(String::as_str), Ok("!"));
        d.at_mut("a").unwrap().push('0');
        assert_eq!(d.get("a").map(String::as_str), Some("10"));
        assert_eq!((&d).into_iter().count(), 2);
    }
}
