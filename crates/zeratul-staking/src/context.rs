//! Per-block execution context
//!
//! A `Context` couples the mutable state handle with the header of the block
//! being executed. Each module reads and writes under its own `StoreKey`
//! namespace, so keys handed to a module are relative to that namespace.

use crate::store::{prefix_end, CacheStore, KvPair, KvStore};
use crate::types::{Height, PubKeyType, Timestamp};
use serde::{Deserialize, Serialize};

/// Module namespace inside the shared store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StoreKey(&'static str);

impl StoreKey {
    pub const fn new(name: &'static str) -> Self {
        StoreKey(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }

    fn prefix(&self) -> Vec<u8> {
        let mut prefix = self.0.as_bytes().to_vec();
        prefix.push(b'/');
        prefix
    }

    fn key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = self.prefix();
        full.extend_from_slice(key);
        full
    }
}

/// Header fields of the block being executed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub chain_id: String,
    pub height: Height,
    pub time: Timestamp,
}

/// Consensus parameters relevant to staking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Key algorithms consensus accepts for validators
    pub pub_key_types: Vec<PubKeyType>,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            pub_key_types: vec![PubKeyType::Ed25519],
        }
    }
}

pub struct Context<'a> {
    store: &'a mut dyn KvStore,
    header: BlockHeader,
    consensus_params: Option<ConsensusParams>,
}

impl<'a> Context<'a> {
    pub fn new(store: &'a mut dyn KvStore, header: BlockHeader) -> Self {
        Self {
            store,
            header,
            consensus_params: None,
        }
    }

    pub fn with_consensus_params(mut self, params: ConsensusParams) -> Self {
        self.consensus_params = Some(params);
        self
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn block_height(&self) -> Height {
        self.header.height
    }

    pub fn block_time(&self) -> Timestamp {
        self.header.time
    }

    pub fn chain_id(&self) -> &str {
        &self.header.chain_id
    }

    pub fn consensus_params(&self) -> Option<&ConsensusParams> {
        self.consensus_params.as_ref()
    }

    /// Move on to the next block
    pub fn set_header(&mut self, header: BlockHeader) {
        self.header = header;
    }

    pub fn get(&self, sk: StoreKey, key: &[u8]) -> Option<Vec<u8>> {
        self.store.get(&sk.key(key))
    }

    pub fn has(&self, sk: StoreKey, key: &[u8]) -> bool {
        self.store.has(&sk.key(key))
    }

    pub fn set(&mut self, sk: StoreKey, key: &[u8], value: Vec<u8>) {
        self.store.set(sk.key(key), value);
    }

    pub fn delete(&mut self, sk: StoreKey, key: &[u8]) {
        self.store.delete(&sk.key(key));
    }

    /// Entries under `prefix` in ascending key order, keys relative to the namespace
    pub fn prefix_iter(&self, sk: StoreKey, prefix: &[u8]) -> Vec<KvPair> {
        let full = sk.key(prefix);
        let end = prefix_end(&full);
        strip(sk, self.store.range(&full, end.as_deref(), false))
    }

    /// Entries under `prefix` in descending key order
    pub fn reverse_prefix_iter(&self, sk: StoreKey, prefix: &[u8]) -> Vec<KvPair> {
        let full = sk.key(prefix);
        let end = prefix_end(&full);
        strip(sk, self.store.range(&full, end.as_deref(), true))
    }

    /// Entries with `start <= key < end` inside the namespace
    pub fn range(&self, sk: StoreKey, start: &[u8], end: &[u8]) -> Vec<KvPair> {
        let start = sk.key(start);
        let end = sk.key(end);
        strip(sk, self.store.range(&start, Some(&end), false))
    }

    /// Run `f` against a cache-wrapped copy of this context
    ///
    /// Writes made by `f` reach the underlying store only when it returns
    /// `Ok`; on `Err` they are discarded.
    pub fn branch<T, E>(
        &mut self,
        f: impl FnOnce(&mut Context<'_>) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut cache = CacheStore::new(&mut *self.store);
        let result = {
            let mut inner = Context {
                store: &mut cache,
                header: self.header.clone(),
                consensus_params: self.consensus_params.clone(),
            };
            f(&mut inner)
        };
        if result.is_ok() {
            cache.write();
        }
        result
    }
}

fn strip(sk: StoreKey, pairs: Vec<KvPair>) -> Vec<KvPair> {
    let offset = sk.prefix().len();
    pairs
        .into_iter()
        .map(|(key, value)| (key[offset..].to_vec(), value))
        .collect()
}
