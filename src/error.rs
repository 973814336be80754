//! Error types returned by the map and the dictionary.

use thiserror::Error;

/// Failures of `ChainedHashMap` operations.
///
/// A failed call never mutates the map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The queried key is not stored in the map.
    #[error("key is not present in the map")]
    NotFound,
    /// `try_from_parts` received key and value sequences of different length.
    #[error("got {keys} keys but {values} values")]
    LengthMismatch { keys: usize, values: usize },
}

/// Failures of `Dictionary` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictionaryError {
    /// `erase` was called with a key the dictionary does not hold.
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error(transparent)]
    Map(#[from] MapError),
}
