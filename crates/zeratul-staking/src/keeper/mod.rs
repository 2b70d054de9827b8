//! Staking keeper
//!
//! The keeper owns the staking namespace of the store. It is split by
//! concern:
//!
//! - `validator` - validator records, the power index, last powers and the
//!   validator unbonding queue
//! - `delegation` - delegation, unbonding and redelegation records and their
//!   maturity queues
//! - `bond` - delegate / undelegate / redelegate and their completion
//! - `slash` - slashing, jailing and unjailing
//! - `val_state_change` - the end-block validator set diff
//! - `historical` - per-height validator set snapshots

mod bond;
mod delegation;
mod historical;
mod slash;
mod val_state_change;
mod validator;

#[cfg(test)]
mod tests;

pub use bond::TokenSource;
pub use historical::HistoricalInfo;

use crate::bank::{BankKeeper, BONDED_POOL_NAME, NOT_BONDED_POOL_NAME};
use crate::codec::{BincodeCodec, Codec};
use crate::context::{Context, StoreKey};
use crate::hooks::StakingHooks;
use crate::keys::{self, LAST_TOTAL_POWER_KEY, PARAMS_KEY, RANK_SEQUENCE_KEY};
use crate::params::Params;
use crate::types::Coin;
use crate::validator::Validator;
use lru::LruCache;
use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Decoded validators kept in memory, keyed by their encoded bytes
pub const VALIDATOR_CACHE_SIZE: usize = 500;

pub struct Keeper<C: Codec = BincodeCodec> {
    store_key: StoreKey,
    codec: C,
    bank: Box<dyn BankKeeper>,
    hooks: Option<Box<dyn StakingHooks>>,
    validator_cache: RefCell<LruCache<Vec<u8>, Validator>>,
}

impl Keeper<BincodeCodec> {
    pub fn with_bincode(bank: Box<dyn BankKeeper>) -> Self {
        Self::new(BincodeCodec, bank)
    }
}

impl<C: Codec> Keeper<C> {
    pub fn new(codec: C, bank: Box<dyn BankKeeper>) -> Self {
        let capacity = NonZeroUsize::new(VALIDATOR_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            store_key: keys::STORE_KEY,
            codec,
            bank,
            hooks: None,
            validator_cache: RefCell::new(LruCache::new(capacity)),
        }
    }

    /// Install the hooks receiving staking events. Can only be done once.
    pub fn set_hooks(&mut self, hooks: Box<dyn StakingHooks>) {
        assert!(self.hooks.is_none(), "cannot set staking hooks twice");
        self.hooks = Some(hooks);
    }

    pub(crate) fn hooks(&self) -> Option<&dyn StakingHooks> {
        self.hooks.as_deref()
    }

    // ------------------------------------------------------------------
    // raw store access
    // ------------------------------------------------------------------

    pub(crate) fn get<T: serde::de::DeserializeOwned>(&self, ctx: &Context<'_>, key: &[u8]) -> Option<T> {
        ctx.get(self.store_key, key)
            .map(|bytes| self.codec.must_decode(&bytes))
    }

    pub(crate) fn put<T: serde::Serialize>(&self, ctx: &mut Context<'_>, key: &[u8], value: &T) {
        let bytes = self.codec.must_encode(value);
        ctx.set(self.store_key, key, bytes);
    }

    // ------------------------------------------------------------------
    // params
    // ------------------------------------------------------------------

    /// Stored params, or the defaults before any were set
    pub fn params(&self, ctx: &Context<'_>) -> Params {
        self.get(ctx, &[PARAMS_KEY]).unwrap_or_default()
    }

    pub fn set_params(&self, ctx: &mut Context<'_>, params: &Params) {
        self.put(ctx, &[PARAMS_KEY], params);
    }

    pub fn unbonding_time(&self, ctx: &Context<'_>) -> Duration {
        self.params(ctx).unbonding_time
    }

    pub fn max_validators(&self, ctx: &Context<'_>) -> u32 {
        self.params(ctx).max_validators
    }

    pub fn max_entries(&self, ctx: &Context<'_>) -> u32 {
        self.params(ctx).max_entries
    }

    pub fn historical_entries(&self, ctx: &Context<'_>) -> u32 {
        self.params(ctx).historical_entries
    }

    pub fn bond_denom(&self, ctx: &Context<'_>) -> String {
        self.params(ctx).bond_denom
    }

    // ------------------------------------------------------------------
    // totals and counters
    // ------------------------------------------------------------------

    /// Total consensus power of the set handed to consensus last block
    pub fn last_total_power(&self, ctx: &Context<'_>) -> i64 {
        self.get(ctx, &[LAST_TOTAL_POWER_KEY]).unwrap_or(0)
    }

    pub fn set_last_total_power(&self, ctx: &mut Context<'_>, power: i64) {
        self.put(ctx, &[LAST_TOTAL_POWER_KEY], &power);
    }

    /// Next position for the power index tie-break
    pub(crate) fn next_rank_sequence(&self, ctx: &mut Context<'_>) -> u64 {
        let next: u64 = self.get(ctx, &[RANK_SEQUENCE_KEY]).unwrap_or(0);
        self.put(ctx, &[RANK_SEQUENCE_KEY], &(next + 1));
        next
    }

    /// Make later sequences rank after an imported `sequence`
    pub(crate) fn bump_rank_sequence(&self, ctx: &mut Context<'_>, sequence: u64) {
        let next: u64 = self.get(ctx, &[RANK_SEQUENCE_KEY]).unwrap_or(0);
        if sequence >= next {
            self.put(ctx, &[RANK_SEQUENCE_KEY], &(sequence + 1));
        }
    }

    // ------------------------------------------------------------------
    // pools
    // ------------------------------------------------------------------

    pub fn bonded_pool_balance(&self, ctx: &Context<'_>) -> u128 {
        let address = self.bank.module_address(BONDED_POOL_NAME);
        self.bank.balance(ctx, &address, &self.bond_denom(ctx))
    }

    pub fn not_bonded_pool_balance(&self, ctx: &Context<'_>) -> u128 {
        let address = self.bank.module_address(NOT_BONDED_POOL_NAME);
        self.bank.balance(ctx, &address, &self.bond_denom(ctx))
    }

    /// Tokens backing bonded validators
    pub fn total_bonded_tokens(&self, ctx: &Context<'_>) -> u128 {
        self.bonded_pool_balance(ctx)
    }

    fn move_between_pools(&self, ctx: &mut Context<'_>, from: &str, to: &str, amount: u128) {
        if amount == 0 {
            return;
        }
        let coin = Coin::new(self.bond_denom(ctx), amount);
        if let Err(e) = self.bank.send_coins_from_module_to_module(ctx, from, to, &coin) {
            panic!("moving {} from {} to {} failed: {}", coin, from, to, e);
        }
    }

    pub(crate) fn bonded_tokens_to_not_bonded(&self, ctx: &mut Context<'_>, amount: u128) {
        self.move_between_pools(ctx, BONDED_POOL_NAME, NOT_BONDED_POOL_NAME, amount);
    }

    pub(crate) fn not_bonded_tokens_to_bonded(&self, ctx: &mut Context<'_>, amount: u128) {
        self.move_between_pools(ctx, NOT_BONDED_POOL_NAME, BONDED_POOL_NAME, amount);
    }

    fn burn_from_pool(&self, ctx: &mut Context<'_>, pool: &str, amount: u128) {
        if amount == 0 {
            return;
        }
        let coin = Coin::new(self.bond_denom(ctx), amount);
        if let Err(e) = self.bank.burn_coins(ctx, pool, &coin) {
            panic!("burning {} from {} failed: {}", coin, pool, e);
        }
    }

    pub(crate) fn burn_bonded_tokens(&self, ctx: &mut Context<'_>, amount: u128) {
        self.burn_from_pool(ctx, BONDED_POOL_NAME, amount);
    }

    pub(crate) fn burn_not_bonded_tokens(&self, ctx: &mut Context<'_>, amount: u128) {
        self.burn_from_pool(ctx, NOT_BONDED_POOL_NAME, amount);
    }
}
