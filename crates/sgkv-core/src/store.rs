//! In-memory key-value table backing the server role.
//!
//! Keys and values are raw byte strings. Looking up an absent key is a
//! normal outcome (`None`), never an error; the protocol reports it with
//! a not-found status rather than a failure.

use std::collections::HashMap;

/// Binary-safe in-memory key-value store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the stored value for `key`, or `None` when the key is
    /// absent. An empty stored value comes back as `Some(&[])`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Inserts or overwrites the value for `key`, returning the previous
    /// value when one existed.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(key, value)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
