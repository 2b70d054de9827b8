//! Store key layout of the slashing module
//!
//! ```text
//! 0x01 | cons_addr             signing info
//! 0x02 | cons_addr | index     missed block bit (present = missed)
//! 0x03 | cons_addr             consensus pubkey
//! 0x04                         params
//! ```

use zeratul_staking::{ConsAddress, StoreKey};

pub const STORE_KEY: StoreKey = StoreKey::new("slashing");

pub const VALIDATOR_SIGNING_INFO_KEY: u8 = 0x01;
pub const VALIDATOR_MISSED_BLOCK_BIT_ARRAY_KEY: u8 = 0x02;
pub const ADDR_PUBKEY_RELATION_KEY: u8 = 0x03;
pub const PARAMS_KEY: u8 = 0x04;

fn with_address(prefix: u8, address: &ConsAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + address.as_bytes().len());
    key.push(prefix);
    key.extend_from_slice(address.as_bytes());
    key
}

pub fn validator_signing_info_key(address: &ConsAddress) -> Vec<u8> {
    with_address(VALIDATOR_SIGNING_INFO_KEY, address)
}

pub fn validator_missed_block_bit_array_prefix(address: &ConsAddress) -> Vec<u8> {
    with_address(VALIDATOR_MISSED_BLOCK_BIT_ARRAY_KEY, address)
}

/// Window positions are non-negative, so the big-endian bytes sort in
/// position order
pub fn validator_missed_block_bit_array_key(address: &ConsAddress, index: i64) -> Vec<u8> {
    let mut key = validator_missed_block_bit_array_prefix(address);
    key.extend_from_slice(&(index as u64).to_be_bytes());
    key
}

pub fn addr_pubkey_relation_key(address: &ConsAddress) -> Vec<u8> {
    with_address(ADDR_PUBKEY_RELATION_KEY, address)
}

/// Consensus address at the end of a single-address key
pub fn address_from_key(key: &[u8]) -> Option<ConsAddress> {
    ConsAddress::from_slice(key.get(1..)?)
}

/// Window position at the end of a missed block key
pub fn index_from_missed_block_key(key: &[u8]) -> Option<i64> {
    let bytes: [u8; 8] = key.get(key.len().checked_sub(8)?..)?.try_into().ok()?;
    i64::try_from(u64::from_be_bytes(bytes)).ok()
}
