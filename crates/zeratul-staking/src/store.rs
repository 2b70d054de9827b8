//! Ordered key-value store adapter
//!
//! The chain's state backend is an external service; modules only need
//! ordered byte keys, range scans in both directions and a write-buffering
//! overlay that can be committed or thrown away.

use std::collections::BTreeMap;
use std::ops::Bound;

/// A key and its value, as returned by range scans
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Ordered byte-key store (abstraction over the chain's state backend)
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>);

    fn delete(&mut self, key: &[u8]);

    /// Entries with `start <= key < end` in key order, or reversed.
    /// `end == None` scans to the end of the keyspace.
    fn range(&self, start: &[u8], end: Option<&[u8]>, reverse: bool) -> Vec<KvPair>;

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    fn prefix_iter(&self, prefix: &[u8]) -> Vec<KvPair> {
        let end = prefix_end(prefix);
        self.range(prefix, end.as_deref(), false)
    }

    fn reverse_prefix_iter(&self, prefix: &[u8]) -> Vec<KvPair> {
        let end = prefix_end(prefix);
        self.range(prefix, end.as_deref(), true)
    }
}

/// Smallest key greater than every key starting with `prefix`,
/// `None` when the prefix is all `0xff` (scan to the end)
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

fn bounds<'k>(start: &'k [u8], end: Option<&'k [u8]>) -> Option<(Bound<&'k [u8]>, Bound<&'k [u8]>)> {
    match end {
        Some(end) if start >= end => None,
        Some(end) => Some((Bound::Included(start), Bound::Excluded(end))),
        None => Some((Bound::Included(start), Bound::Unbounded)),
    }
}

/// In-memory store backed by a `BTreeMap`
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.data.insert(key, value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.data.remove(key);
    }

    fn range(&self, start: &[u8], end: Option<&[u8]>, reverse: bool) -> Vec<KvPair> {
        let Some(range) = bounds(start, end) else {
            return Vec::new();
        };
        let iter = self
            .data
            .range::<[u8], _>(range)
            .map(|(k, v)| (k.clone(), v.clone()));
        if reverse {
            iter.rev().collect()
        } else {
            iter.collect()
        }
    }
}

/// Write-buffering overlay over a parent store
///
/// Reads see buffered writes first. `write` flushes the buffer into the
/// parent; dropping the cache discards it.
pub struct CacheStore<'a> {
    parent: &'a mut dyn KvStore,
    // None marks a buffered delete
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> CacheStore<'a> {
    pub fn new(parent: &'a mut dyn KvStore) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    /// Number of buffered writes and deletes
    pub fn pending(&self) -> usize {
        self.writes.len()
    }

    /// Flush buffered writes into the parent store
    pub fn write(self) {
        for (key, value) in self.writes {
            match value {
                Some(value) => self.parent.set(key, value),
                None => self.parent.delete(&key),
            }
        }
    }
}

impl KvStore for CacheStore<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.writes.get(key) {
            Some(buffered) => buffered.clone(),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.writes.insert(key, Some(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.writes.insert(key.to_vec(), None);
    }

    fn range(&self, start: &[u8], end: Option<&[u8]>, reverse: bool) -> Vec<KvPair> {
        let Some(range) = bounds(start, end) else {
            return Vec::new();
        };

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.range(start, end, false).into_iter().collect();
        for (key, value) in self.writes.range::<[u8], _>(range) {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        if reverse {
            merged.into_iter().rev().collect()
        } else {
            merged.into_iter().collect()
        }
    }
}
