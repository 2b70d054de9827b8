//! Slashing keeper
//!
//! Owns the slashing namespace: signing info, the missed block window of
//! each validator, the consensus address to pubkey relation and params.
//! Staking is reached through the `ValidatorSet` handed to each operation,
//! which lets the keeper double as the staking hooks without the two
//! keepers owning each other.

mod infractions;
mod unjail;


pub use infractions::VALIDATOR_UPDATE_DELAY;

use crate::keys::{self, PARAMS_KEY};
use crate::params::Params;
use crate::signing_info::ValidatorSigningInfo;
use std::time::Duration;
use zeratul_staking::{BincodeCodec, Codec, ConsAddress, ConsPubKey, Context, Dec, StoreKey};

#[derive(Clone)]
pub struct Keeper<C: Codec = BincodeCodec> {
    store_key: StoreKey,
    codec: C,
}

impl Keeper<BincodeCodec> {
    pub fn with_bincode() -> Self {
        Self::new(BincodeCodec)
    }
}

impl<C: Codec> Keeper<C> {
    pub fn new(codec: C) -> Self {
        Self {
            store_key: keys::STORE_KEY,
            codec,
        }
    }

    fn get<T: serde::de::DeserializeOwned>(&self, ctx: &Context<'_>, key: &[u8]) -> Option<T> {
        ctx.get(self.store_key, key)
            .map(|bytes| self.codec.must_decode(&bytes))
    }

    fn put<T: serde::Serialize>(&self, ctx: &mut Context<'_>, key: &[u8], value: &T) {
        let bytes = self.codec.must_encode(value);
        ctx.set(self.store_key, key, bytes);
    }

    // ------------------------------------------------------------------
    // params
    // ------------------------------------------------------------------

    pub fn params(&self, ctx: &Context<'_>) -> Params {
        self.get(ctx, &[PARAMS_KEY]).unwrap_or_default()
    }

    pub fn set_params(&self, ctx: &mut Context<'_>, params: &Params) {
        self.put(ctx, &[PARAMS_KEY], params);
    }

    pub fn signed_blocks_window(&self, ctx: &Context<'_>) -> i64 {
        self.params(ctx).signed_blocks_window
    }

    pub fn downtime_jail_duration(&self, ctx: &Context<'_>) -> Duration {
        self.params(ctx).downtime_jail_duration
    }

    pub fn slash_fraction_double_sign(&self, ctx: &Context<'_>) -> Dec {
        self.params(ctx).slash_fraction_double_sign
    }

    pub fn slash_fraction_downtime(&self, ctx: &Context<'_>) -> Dec {
        self.params(ctx).slash_fraction_downtime
    }

    pub fn max_evidence_age(&self, ctx: &Context<'_>) -> Duration {
        self.params(ctx).max_evidence_age
    }

    // ------------------------------------------------------------------
    // signing info
    // ------------------------------------------------------------------

    pub fn get_validator_signing_info(&self, ctx: &Context<'_>, address: &ConsAddress) -> Option<ValidatorSigningInfo> {
        self.get(ctx, &keys::validator_signing_info_key(address))
    }

    pub fn set_validator_signing_info(&self, ctx: &mut Context<'_>, info: &ValidatorSigningInfo) {
        self.put(ctx, &keys::validator_signing_info_key(&info.address), info);
    }

    pub fn get_all_signing_infos(&self, ctx: &Context<'_>) -> Vec<ValidatorSigningInfo> {
        ctx.prefix_iter(self.store_key, &[keys::VALIDATOR_SIGNING_INFO_KEY])
            .into_iter()
            .map(|(_, bytes)| self.codec.must_decode(&bytes))
            .collect()
    }

    pub fn is_tombstoned(&self, ctx: &Context<'_>, address: &ConsAddress) -> bool {
        self.get_validator_signing_info(ctx, address)
            .map_or(false, |info| info.tombstoned)
    }

    // ------------------------------------------------------------------
    // missed block window
    // ------------------------------------------------------------------

    pub fn get_missed_block(&self, ctx: &Context<'_>, address: &ConsAddress, index: i64) -> bool {
        ctx.has(self.store_key, &keys::validator_missed_block_bit_array_key(address, index))
    }

    pub fn set_missed_block(&self, ctx: &mut Context<'_>, address: &ConsAddress, index: i64, missed: bool) {
        let key = keys::validator_missed_block_bit_array_key(address, index);
        if missed {
            self.put(ctx, &key, &true);
        } else {
            ctx.delete(self.store_key, &key);
        }
    }

    /// Window positions currently marked missed, ascending
    pub fn get_missed_blocks(&self, ctx: &Context<'_>, address: &ConsAddress) -> Vec<i64> {
        ctx.prefix_iter(self.store_key, &keys::validator_missed_block_bit_array_prefix(address))
            .into_iter()
            .map(|(key, _)| {
                keys::index_from_missed_block_key(&key)
                    .unwrap_or_else(|| panic!("malformed missed block key {:?}", key))
            })
            .collect()
    }

    pub fn clear_missed_blocks(&self, ctx: &mut Context<'_>, address: &ConsAddress) {
        let prefix = keys::validator_missed_block_bit_array_prefix(address);
        for (key, _) in ctx.prefix_iter(self.store_key, &prefix) {
            ctx.delete(self.store_key, &key);
        }
    }

    // ------------------------------------------------------------------
    // consensus address -> pubkey
    // ------------------------------------------------------------------

    pub fn add_pubkey(&self, ctx: &mut Context<'_>, pubkey: &ConsPubKey) {
        self.put(ctx, &keys::addr_pubkey_relation_key(&pubkey.address()), pubkey);
    }

    pub fn get_pubkey(&self, ctx: &Context<'_>, address: &ConsAddress) -> Option<ConsPubKey> {
        self.get(ctx, &keys::addr_pubkey_relation_key(address))
    }

    pub fn delete_pubkey(&self, ctx: &mut Context<'_>, address: &ConsAddress) {
        ctx.delete(self.store_key, &keys::addr_pubkey_relation_key(address));
    }
}
