//! Store key layout of the staking module
//!
//! Every record type lives under a one-byte prefix. Multi-part keys are
//! plain concatenations of fixed-width parts, so a prefix of the key is
//! always a valid iteration prefix.
//!
//! ```text
//! 0x11 | operator                     last validator power
//! 0x12                                last total power
//! 0x13                                rank sequence counter
//! 0x21 | operator                     validator
//! 0x22 | cons_addr                    operator by consensus address
//! 0x23 | power | !sequence | operator power index
//! 0x31 | delegator | validator        delegation
//! 0x37 | validator | delegator        delegation by validator
//! 0x32 | delegator | validator        unbonding delegation
//! 0x33 | validator | delegator        unbonding delegation by validator
//! 0x34 | delegator | src | dst        redelegation
//! 0x35 | src | delegator | dst        redelegation by source
//! 0x36 | dst | delegator | src        redelegation by destination
//! 0x41 | time                         unbonding queue
//! 0x42 | time                         redelegation queue
//! 0x43 | time                         validator queue
//! 0x50 | height                       historical info
//! 0x51                                params
//! ```

use crate::context::StoreKey;
use crate::types::{Address, ConsAddress, Height, Timestamp, ADDRESS_LEN};

pub const STORE_KEY: StoreKey = StoreKey::new("staking");

pub const LAST_VALIDATOR_POWER_KEY: u8 = 0x11;
pub const LAST_TOTAL_POWER_KEY: u8 = 0x12;
pub const RANK_SEQUENCE_KEY: u8 = 0x13;

pub const VALIDATORS_KEY: u8 = 0x21;
pub const VALIDATORS_BY_CONS_ADDR_KEY: u8 = 0x22;
pub const VALIDATORS_BY_POWER_INDEX_KEY: u8 = 0x23;

pub const DELEGATION_KEY: u8 = 0x31;
pub const UNBONDING_DELEGATION_KEY: u8 = 0x32;
pub const UNBONDING_DELEGATION_BY_VAL_INDEX_KEY: u8 = 0x33;
pub const REDELEGATION_KEY: u8 = 0x34;
pub const REDELEGATION_BY_VAL_SRC_INDEX_KEY: u8 = 0x35;
pub const REDELEGATION_BY_VAL_DST_INDEX_KEY: u8 = 0x36;
pub const DELEGATION_BY_VAL_INDEX_KEY: u8 = 0x37;

pub const UNBONDING_QUEUE_KEY: u8 = 0x41;
pub const REDELEGATION_QUEUE_KEY: u8 = 0x42;
pub const VALIDATOR_QUEUE_KEY: u8 = 0x43;

pub const HISTORICAL_INFO_KEY: u8 = 0x50;
pub const PARAMS_KEY: u8 = 0x51;

fn join(prefix: u8, parts: &[&[u8]]) -> Vec<u8> {
    let len = 1 + parts.iter().map(|p| p.len()).sum::<usize>();
    let mut key = Vec::with_capacity(len);
    key.push(prefix);
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

/// Address stored at `offset` inside a key
///
/// Keys are produced by this module only, so a short key is corruption.
pub fn address_at(key: &[u8], offset: usize) -> Address {
    key.get(offset..offset + ADDRESS_LEN)
        .and_then(Address::from_slice)
        .unwrap_or_else(|| panic!("malformed staking key {}", hex::encode(key)))
}

pub fn last_validator_power_key(operator: &Address) -> Vec<u8> {
    join(LAST_VALIDATOR_POWER_KEY, &[operator.as_bytes()])
}

pub fn validator_key(operator: &Address) -> Vec<u8> {
    join(VALIDATORS_KEY, &[operator.as_bytes()])
}

pub fn validator_by_cons_addr_key(cons: &ConsAddress) -> Vec<u8> {
    join(VALIDATORS_BY_CONS_ADDR_KEY, &[cons.as_bytes()])
}

/// Power index key
///
/// Descending iteration yields the highest power first and, among equal
/// powers, the smallest rank sequence (the one indexed earliest).
pub fn validator_power_rank_key(power: i64, rank_sequence: u64, operator: &Address) -> Vec<u8> {
    let power = u64::try_from(power).unwrap_or(0);
    join(
        VALIDATORS_BY_POWER_INDEX_KEY,
        &[
            &power.to_be_bytes(),
            &(!rank_sequence).to_be_bytes(),
            operator.as_bytes(),
        ],
    )
}

pub fn delegation_key(delegator: &Address, validator: &Address) -> Vec<u8> {
    join(DELEGATION_KEY, &[delegator.as_bytes(), validator.as_bytes()])
}

pub fn delegations_key(delegator: &Address) -> Vec<u8> {
    join(DELEGATION_KEY, &[delegator.as_bytes()])
}

pub fn delegation_by_val_index_key(validator: &Address, delegator: &Address) -> Vec<u8> {
    join(DELEGATION_BY_VAL_INDEX_KEY, &[validator.as_bytes(), delegator.as_bytes()])
}

pub fn delegations_by_val_key(validator: &Address) -> Vec<u8> {
    join(DELEGATION_BY_VAL_INDEX_KEY, &[validator.as_bytes()])
}

pub fn ubd_key(delegator: &Address, validator: &Address) -> Vec<u8> {
    join(UNBONDING_DELEGATION_KEY, &[delegator.as_bytes(), validator.as_bytes()])
}

pub fn ubds_key(delegator: &Address) -> Vec<u8> {
    join(UNBONDING_DELEGATION_KEY, &[delegator.as_bytes()])
}

pub fn ubd_by_val_index_key(validator: &Address, delegator: &Address) -> Vec<u8> {
    join(
        UNBONDING_DELEGATION_BY_VAL_INDEX_KEY,
        &[validator.as_bytes(), delegator.as_bytes()],
    )
}

pub fn ubds_by_val_key(validator: &Address) -> Vec<u8> {
    join(UNBONDING_DELEGATION_BY_VAL_INDEX_KEY, &[validator.as_bytes()])
}

pub fn red_key(delegator: &Address, src: &Address, dst: &Address) -> Vec<u8> {
    join(
        REDELEGATION_KEY,
        &[delegator.as_bytes(), src.as_bytes(), dst.as_bytes()],
    )
}

pub fn reds_key(delegator: &Address) -> Vec<u8> {
    join(REDELEGATION_KEY, &[delegator.as_bytes()])
}

pub fn red_by_val_src_index_key(delegator: &Address, src: &Address, dst: &Address) -> Vec<u8> {
    join(
        REDELEGATION_BY_VAL_SRC_INDEX_KEY,
        &[src.as_bytes(), delegator.as_bytes(), dst.as_bytes()],
    )
}

pub fn reds_from_val_src_index_key(src: &Address) -> Vec<u8> {
    join(REDELEGATION_BY_VAL_SRC_INDEX_KEY, &[src.as_bytes()])
}

pub fn red_by_val_dst_index_key(delegator: &Address, src: &Address, dst: &Address) -> Vec<u8> {
    join(
        REDELEGATION_BY_VAL_DST_INDEX_KEY,
        &[dst.as_bytes(), delegator.as_bytes(), src.as_bytes()],
    )
}

pub fn reds_by_del_to_val_dst_index_key(delegator: &Address, dst: &Address) -> Vec<u8> {
    join(
        REDELEGATION_BY_VAL_DST_INDEX_KEY,
        &[dst.as_bytes(), delegator.as_bytes()],
    )
}

pub fn reds_to_val_dst_index_key(dst: &Address) -> Vec<u8> {
    join(REDELEGATION_BY_VAL_DST_INDEX_KEY, &[dst.as_bytes()])
}

/// Decode `(delegator, src, dst)` from a by-source index key
pub fn split_red_by_src_key(key: &[u8]) -> (Address, Address, Address) {
    let src = address_at(key, 1);
    let delegator = address_at(key, 1 + ADDRESS_LEN);
    let dst = address_at(key, 1 + 2 * ADDRESS_LEN);
    (delegator, src, dst)
}

/// Decode `(delegator, src, dst)` from a by-destination index key
pub fn split_red_by_dst_key(key: &[u8]) -> (Address, Address, Address) {
    let dst = address_at(key, 1);
    let delegator = address_at(key, 1 + ADDRESS_LEN);
    let src = address_at(key, 1 + 2 * ADDRESS_LEN);
    (delegator, src, dst)
}

fn time_key(prefix: u8, time: Timestamp) -> Vec<u8> {
    join(prefix, &[&time.to_be_bytes()])
}

pub fn ubd_queue_key(time: Timestamp) -> Vec<u8> {
    time_key(UNBONDING_QUEUE_KEY, time)
}

pub fn red_queue_key(time: Timestamp) -> Vec<u8> {
    time_key(REDELEGATION_QUEUE_KEY, time)
}

pub fn validator_queue_key(time: Timestamp) -> Vec<u8> {
    time_key(VALIDATOR_QUEUE_KEY, time)
}

/// Exclusive upper bound covering every bucket at or before `time`
pub fn queue_end_key(prefix: u8, time: Timestamp) -> Vec<u8> {
    match time.as_millis().checked_add(1) {
        Some(next) => time_key(prefix, Timestamp::from_millis(next)),
        None => vec![prefix + 1],
    }
}

pub fn historical_info_key(height: Height) -> Vec<u8> {
    let height = u64::try_from(height).unwrap_or(0);
    join(HISTORICAL_INFO_KEY, &[&height.to_be_bytes()])
}
