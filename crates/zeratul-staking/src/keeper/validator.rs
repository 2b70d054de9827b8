use super::Keeper;
use crate::codec::Codec;
use crate::context::Context;
use crate::error::{Result, StakingError};
use crate::keys::{self, LAST_VALIDATOR_POWER_KEY, VALIDATORS_BY_POWER_INDEX_KEY, VALIDATORS_KEY, VALIDATOR_QUEUE_KEY};
use crate::math::Dec;
use crate::types::{Address, ConsAddress, Timestamp};
use crate::validator::{BondStatus, Commission, Validator};
use std::collections::BTreeMap;
use tracing::{debug, info};

impl<C: Codec> Keeper<C> {
    fn decode_validator(&self, bytes: Vec<u8>) -> Validator {
        let mut cache = self.validator_cache.borrow_mut();
        if let Some(validator) = cache.get(&bytes) {
            return validator.clone();
        }
        let validator: Validator = self.codec.must_decode(&bytes);
        cache.put(bytes, validator.clone());
        validator
    }

    pub fn get_validator(&self, ctx: &Context<'_>, operator: &Address) -> Option<Validator> {
        ctx.get(self.store_key, &keys::validator_key(operator))
            .map(|bytes| self.decode_validator(bytes))
    }

    pub(crate) fn must_get_validator(&self, ctx: &Context<'_>, operator: &Address) -> Validator {
        self.get_validator(ctx, operator)
            .unwrap_or_else(|| panic!("validator record not found for address {}", operator))
    }

    pub fn get_validator_by_cons_addr(&self, ctx: &Context<'_>, cons_addr: &ConsAddress) -> Option<Validator> {
        let operator = ctx.get(self.store_key, &keys::validator_by_cons_addr_key(cons_addr))?;
        let operator = Address::from_slice(&operator)
            .unwrap_or_else(|| panic!("corrupted consensus address index for {}", cons_addr));
        self.get_validator(ctx, &operator)
    }

    pub(crate) fn must_get_validator_by_cons_addr(&self, ctx: &Context<'_>, cons_addr: &ConsAddress) -> Validator {
        self.get_validator_by_cons_addr(ctx, cons_addr)
            .unwrap_or_else(|| panic!("validator with consensus address {} not found", cons_addr))
    }

    pub fn set_validator(&self, ctx: &mut Context<'_>, validator: &Validator) {
        self.put(ctx, &keys::validator_key(&validator.operator), validator);
    }

    pub fn set_validator_by_cons_addr(&self, ctx: &mut Context<'_>, validator: &Validator) {
        ctx.set(
            self.store_key,
            &keys::validator_by_cons_addr_key(&validator.cons_address()),
            validator.operator.as_bytes().to_vec(),
        );
    }

    fn power_index_key(validator: &Validator) -> Vec<u8> {
        keys::validator_power_rank_key(
            validator.potential_consensus_power(),
            validator.rank_sequence,
            &validator.operator,
        )
    }

    /// Index a validator by power; jailed validators are never indexed
    pub fn set_validator_by_power_index(&self, ctx: &mut Context<'_>, validator: &Validator) {
        if validator.jailed {
            return;
        }
        self.set_new_validator_by_power_index(ctx, validator);
    }

    pub fn delete_validator_by_power_index(&self, ctx: &mut Context<'_>, validator: &Validator) {
        ctx.delete(self.store_key, &Self::power_index_key(validator));
    }

    /// Index a validator by power without the jailed check
    pub fn set_new_validator_by_power_index(&self, ctx: &mut Context<'_>, validator: &Validator) {
        ctx.set(
            self.store_key,
            &Self::power_index_key(validator),
            validator.operator.as_bytes().to_vec(),
        );
    }

    /// Re-rank a validator whose potential power changed since it was indexed
    fn rerank(&self, ctx: &mut Context<'_>, validator: &mut Validator, old_power: i64) {
        if validator.potential_consensus_power() != old_power {
            validator.rank_sequence = self.next_rank_sequence(ctx);
        }
    }

    /// Add delegated tokens, keeping the power index in step.
    /// Returns the updated validator and the shares issued.
    pub fn add_validator_tokens_and_shares(
        &self,
        ctx: &mut Context<'_>,
        mut validator: Validator,
        amount: u128,
    ) -> (Validator, Dec) {
        self.delete_validator_by_power_index(ctx, &validator);
        let old_power = validator.potential_consensus_power();
        let issued = validator.add_tokens_from_del(amount);
        self.rerank(ctx, &mut validator, old_power);
        self.set_validator(ctx, &validator);
        self.set_validator_by_power_index(ctx, &validator);
        (validator, issued)
    }

    /// Redeem delegator shares, keeping the power index in step.
    /// Returns the updated validator and the tokens released.
    pub fn remove_validator_tokens_and_shares(
        &self,
        ctx: &mut Context<'_>,
        mut validator: Validator,
        shares: &Dec,
    ) -> (Validator, u128) {
        self.delete_validator_by_power_index(ctx, &validator);
        let old_power = validator.potential_consensus_power();
        let removed = validator.remove_del_shares(shares);
        self.rerank(ctx, &mut validator, old_power);
        self.set_validator(ctx, &validator);
        self.set_validator_by_power_index(ctx, &validator);
        (validator, removed)
    }

    /// Remove tokens without redeeming shares (slashing)
    pub fn remove_validator_tokens(&self, ctx: &mut Context<'_>, mut validator: Validator, amount: u128) -> Validator {
        self.delete_validator_by_power_index(ctx, &validator);
        let old_power = validator.potential_consensus_power();
        validator.remove_tokens(amount);
        self.rerank(ctx, &mut validator, old_power);
        self.set_validator(ctx, &validator);
        self.set_validator_by_power_index(ctx, &validator);
        validator
    }

    /// Apply a commission rate change requested at the current block time
    pub fn update_validator_commission(
        &self,
        ctx: &Context<'_>,
        validator: &Validator,
        new_rate: &Dec,
    ) -> Result<Commission> {
        let block_time = ctx.block_time();
        validator.commission.validate_new_rate(new_rate, block_time)?;
        let mut commission = validator.commission.clone();
        commission.rates.rate = new_rate.clone();
        commission.update_time = block_time;
        Ok(commission)
    }

    /// Delete a fully drained, unbonded validator and all its index entries
    pub fn remove_validator(&self, ctx: &mut Context<'_>, operator: &Address) {
        let Some(validator) = self.get_validator(ctx, operator) else {
            return;
        };

        assert!(
            validator.is_unbonded(),
            "cannot remove validator {} with status {}",
            operator,
            validator.status
        );
        assert!(
            validator.tokens == 0,
            "attempting to remove validator {} which still holds {} tokens",
            operator,
            validator.tokens
        );

        let cons_addr = validator.cons_address();
        ctx.delete(self.store_key, &keys::validator_key(operator));
        ctx.delete(self.store_key, &keys::validator_by_cons_addr_key(&cons_addr));
        self.delete_validator_by_power_index(ctx, &validator);

        info!(operator = %operator, "removed validator");
        if let Some(hooks) = self.hooks() {
            hooks.after_validator_removed(ctx, &cons_addr, operator);
        }
    }

    pub fn get_all_validators(&self, ctx: &Context<'_>) -> Vec<Validator> {
        ctx.prefix_iter(self.store_key, &[VALIDATORS_KEY])
            .into_iter()
            .map(|(_, bytes)| self.decode_validator(bytes))
            .collect()
    }

    /// Up to `max` validators in operator order
    pub fn get_validators(&self, ctx: &Context<'_>, max: usize) -> Vec<Validator> {
        ctx.prefix_iter(self.store_key, &[VALIDATORS_KEY])
            .into_iter()
            .take(max)
            .map(|(_, bytes)| self.decode_validator(bytes))
            .collect()
    }

    /// Operators in the power index, highest power first
    pub fn validators_by_power_desc(&self, ctx: &Context<'_>) -> Vec<Address> {
        ctx.reverse_prefix_iter(self.store_key, &[VALIDATORS_BY_POWER_INDEX_KEY])
            .into_iter()
            .map(|(key, value)| {
                Address::from_slice(&value)
                    .unwrap_or_else(|| panic!("corrupted power index entry {}", hex::encode(key)))
            })
            .collect()
    }

    /// Bonded validators ordered by power, at most `max_validators`
    pub fn get_bonded_validators_by_power(&self, ctx: &Context<'_>) -> Vec<Validator> {
        let max = self.max_validators(ctx) as usize;
        self.validators_by_power_desc(ctx)
            .into_iter()
            .map(|operator| self.must_get_validator(ctx, &operator))
            .filter(|validator| validator.is_bonded())
            .take(max)
            .collect()
    }

    // ------------------------------------------------------------------
    // last validator powers
    // ------------------------------------------------------------------

    pub fn get_last_validator_power(&self, ctx: &Context<'_>, operator: &Address) -> i64 {
        self.get(ctx, &keys::last_validator_power_key(operator)).unwrap_or(0)
    }

    pub fn set_last_validator_power(&self, ctx: &mut Context<'_>, operator: &Address, power: i64) {
        self.put(ctx, &keys::last_validator_power_key(operator), &power);
    }

    pub fn delete_last_validator_power(&self, ctx: &mut Context<'_>, operator: &Address) {
        ctx.delete(self.store_key, &keys::last_validator_power_key(operator));
    }

    /// Last validator set as `operator -> power`
    pub fn get_last_validator_powers(&self, ctx: &Context<'_>) -> BTreeMap<Address, i64> {
        ctx.prefix_iter(self.store_key, &[LAST_VALIDATOR_POWER_KEY])
            .into_iter()
            .map(|(key, bytes)| (keys::address_at(&key, 1), self.codec.must_decode(&bytes)))
            .collect()
    }

    /// Validators of the last set handed to consensus
    pub fn get_last_validators(&self, ctx: &Context<'_>) -> Vec<Validator> {
        let max = self.max_validators(ctx) as usize;
        let last = self.get_last_validator_powers(ctx);
        assert!(
            last.len() <= max,
            "more validators than max validators found: {} > {}",
            last.len(),
            max
        );
        last.keys()
            .map(|operator| self.must_get_validator(ctx, operator))
            .collect()
    }

    // ------------------------------------------------------------------
    // validator unbonding queue
    // ------------------------------------------------------------------

    pub fn get_validator_queue_time_slice(&self, ctx: &Context<'_>, time: Timestamp) -> Vec<Address> {
        self.get(ctx, &keys::validator_queue_key(time)).unwrap_or_default()
    }

    pub fn set_validator_queue_time_slice(&self, ctx: &mut Context<'_>, time: Timestamp, operators: &[Address]) {
        self.put(ctx, &keys::validator_queue_key(time), &operators);
    }

    pub fn delete_validator_queue_time_slice(&self, ctx: &mut Context<'_>, time: Timestamp) {
        ctx.delete(self.store_key, &keys::validator_queue_key(time));
    }

    /// Queue a validator under its unbonding completion time
    pub fn insert_validator_queue(&self, ctx: &mut Context<'_>, validator: &Validator) {
        let time = validator.unbonding_completion_time;
        let mut slice = self.get_validator_queue_time_slice(ctx, time);
        slice.push(validator.operator);
        self.set_validator_queue_time_slice(ctx, time, &slice);
    }

    /// Take a validator out of the bucket for its completion time
    pub fn delete_validator_queue(&self, ctx: &mut Context<'_>, validator: &Validator) {
        let time = validator.unbonding_completion_time;
        let slice = self.get_validator_queue_time_slice(ctx, time);
        let remaining: Vec<Address> = slice
            .into_iter()
            .filter(|operator| *operator != validator.operator)
            .collect();
        if remaining.is_empty() {
            self.delete_validator_queue_time_slice(ctx, time);
        } else {
            self.set_validator_queue_time_slice(ctx, time, &remaining);
        }
    }

    /// Buckets due at or before `time`, oldest first
    pub(crate) fn mature_validator_queue(&self, ctx: &Context<'_>, time: Timestamp) -> Vec<(Vec<u8>, Vec<Address>)> {
        let end = keys::queue_end_key(VALIDATOR_QUEUE_KEY, time);
        ctx.range(self.store_key, &[VALIDATOR_QUEUE_KEY], &end)
            .into_iter()
            .map(|(key, bytes)| (key, self.codec.must_decode(&bytes)))
            .collect()
    }

    /// Finish unbonding every validator whose unbonding period is over
    pub fn unbond_all_mature_validator_queue(&self, ctx: &mut Context<'_>) {
        let now = ctx.block_time();
        for (key, operators) in self.mature_validator_queue(ctx, now) {
            for operator in operators {
                let validator = self.get_validator(ctx, &operator).unwrap_or_else(|| {
                    panic!("validator {} in the unbonding queue was not found", operator)
                });
                assert!(
                    validator.is_unbonding(),
                    "unexpected validator {} in unbonding queue; status was {}",
                    operator,
                    validator.status
                );
                let validator = self.unbonding_to_unbonded(ctx, validator);
                if validator.delegator_shares.is_zero() {
                    self.remove_validator(ctx, &validator.operator);
                }
            }
            ctx.delete(self.store_key, &key);
        }
    }

    pub(crate) fn unbonding_to_unbonded(&self, ctx: &mut Context<'_>, mut validator: Validator) -> Validator {
        assert!(
            validator.is_unbonding(),
            "bad state transition unbonding to unbonded, validator {}",
            validator.operator
        );
        validator.status = BondStatus::Unbonded;
        self.set_validator(ctx, &validator);
        debug!(operator = %validator.operator, "validator finished unbonding");
        validator
    }

    pub(crate) fn ensure_validator(&self, ctx: &Context<'_>, operator: &Address) -> Result<Validator> {
        self.get_validator(ctx, operator)
            .ok_or(StakingError::NoValidatorFound(*operator))
    }
}
