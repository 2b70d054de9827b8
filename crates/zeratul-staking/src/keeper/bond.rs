use super::Keeper;
use crate::bank::{BONDED_POOL_NAME, NOT_BONDED_POOL_NAME};
use crate::codec::Codec;
use crate::context::Context;
use crate::delegation::Delegation;
use crate::error::{Result, StakingError};
use crate::math::Dec;
use crate::types::{Address, Coin, Height, Timestamp};
use crate::validator::{BondStatus, Validator};
use tracing::{debug, info};

/// Where the tokens of a delegation come from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenSource {
    /// Fresh tokens from the delegator's account
    Account,
    /// Tokens already held by a staking pool (redelegation); the status is
    /// that of the validator they were unbonded from
    Pool(BondStatus),
}

impl<C: Codec> Keeper<C> {
    /// Delegate `amount` tokens to `validator`, returning the shares issued
    pub fn delegate(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        amount: u128,
        source: TokenSource,
        validator: Validator,
    ) -> Result<Dec> {
        // all shares are worthless once a validator's tokens are gone
        if validator.invalid_ex_rate() {
            return Err(StakingError::DelegatorShareExRateInvalid);
        }

        let existing = self.get_delegation(ctx, delegator, &validator.operator);
        if let Some(hooks) = self.hooks() {
            if existing.is_some() {
                hooks.before_delegation_shares_modified(ctx, delegator, &validator.operator);
            } else {
                hooks.before_delegation_created(ctx, delegator, &validator.operator);
            }
        }
        let mut delegation =
            existing.unwrap_or_else(|| Delegation::new(*delegator, validator.operator, Dec::zero()));

        match source {
            TokenSource::Account => {
                let pool = if validator.is_bonded() {
                    BONDED_POOL_NAME
                } else {
                    NOT_BONDED_POOL_NAME
                };
                let coin = Coin::new(self.bond_denom(ctx), amount);
                self.bank
                    .delegate_coins_from_account_to_module(ctx, delegator, pool, &coin)?;
            }
            TokenSource::Pool(status) => {
                let from_bonded = status == BondStatus::Bonded;
                match (from_bonded, validator.is_bonded()) {
                    (true, true) | (false, false) => {}
                    (false, true) => self.not_bonded_tokens_to_bonded(ctx, amount),
                    (true, false) => self.bonded_tokens_to_not_bonded(ctx, amount),
                }
            }
        }

        let (validator, issued) = self.add_validator_tokens_and_shares(ctx, validator, amount);
        delegation.shares = &delegation.shares + &issued;
        self.set_delegation(ctx, &delegation);

        if let Some(hooks) = self.hooks() {
            hooks.after_delegation_modified(ctx, delegator, &validator.operator);
        }
        debug!(
            delegator = %delegator,
            validator = %validator.operator,
            amount,
            shares = %issued,
            "delegated"
        );
        Ok(issued)
    }

    /// Redeem `shares` of a delegation, returning the tokens removed from
    /// the validator. Pool balances are left for the caller to move.
    pub(crate) fn unbond(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        operator: &Address,
        shares: &Dec,
    ) -> Result<u128> {
        let mut delegation = self
            .get_delegation(ctx, delegator, operator)
            .ok_or(StakingError::NoDelegation)?;
        if delegation.shares < *shares {
            return Err(StakingError::NotEnoughDelegationShares);
        }
        let mut validator = self
            .get_validator(ctx, operator)
            .ok_or(StakingError::NoValidatorFound(*operator))?;

        if let Some(hooks) = self.hooks() {
            hooks.before_delegation_shares_modified(ctx, delegator, operator);
        }

        delegation.shares = &delegation.shares - shares;

        let is_operator = *delegator == validator.operator;
        if is_operator
            && !validator.jailed
            && validator.tokens_from_shares(&delegation.shares).truncate_int()
                < validator.min_self_delegation
        {
            info!(
                validator = %validator.operator,
                min_self_delegation = validator.min_self_delegation,
                "self-delegation fell below minimum, jailing validator"
            );
            self.jail_validator(ctx, validator);
            validator = self.must_get_validator(ctx, operator);
        }

        if delegation.shares.is_zero() {
            self.remove_delegation(ctx, &delegation);
        } else {
            self.set_delegation(ctx, &delegation);
            if let Some(hooks) = self.hooks() {
                hooks.after_delegation_modified(ctx, delegator, operator);
            }
        }

        let (validator, amount) = self.remove_validator_tokens_and_shares(ctx, validator, shares);
        // bonded or unbonding validators are removed once their unbonding completes
        if validator.delegator_shares.is_zero() && validator.is_unbonded() {
            self.remove_validator(ctx, &validator.operator);
        }

        Ok(amount)
    }

    /// Start unbonding `shares`, returning the completion time
    pub fn undelegate(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        operator: &Address,
        shares: &Dec,
    ) -> Result<Timestamp> {
        let validator = self
            .get_validator(ctx, operator)
            .ok_or(StakingError::NoDelegation)?;
        if self.has_max_unbonding_delegation_entries(ctx, delegator, operator) {
            return Err(StakingError::MaxUnbondingDelegationEntries);
        }

        let amount = self.unbond(ctx, delegator, operator, shares)?;

        // tokens of a bonded validator leave the bonded pool immediately
        if validator.is_bonded() {
            self.bonded_tokens_to_not_bonded(ctx, amount);
        }

        let completion_time = ctx.block_time().saturating_add(self.unbonding_time(ctx));
        let height = ctx.block_height();
        let ubd = self.set_unbonding_delegation_entry(ctx, delegator, operator, height, completion_time, amount);
        self.insert_ubd_queue(ctx, &ubd, completion_time);

        info!(
            delegator = %delegator,
            validator = %operator,
            amount,
            completion_time = %completion_time,
            "began unbonding"
        );
        Ok(completion_time)
    }

    /// Pay out every matured entry of an unbonding delegation.
    /// Returns the tokens released.
    pub fn complete_unbonding(&self, ctx: &mut Context<'_>, delegator: &Address, operator: &Address) -> Result<u128> {
        let mut ubd = self
            .get_unbonding_delegation(ctx, delegator, operator)
            .ok_or(StakingError::NoUnbondingDelegation)?;
        let now = ctx.block_time();
        let denom = self.bond_denom(ctx);

        let (mature, pending): (Vec<_>, Vec<_>) =
            ubd.entries.drain(..).partition(|entry| entry.is_mature(now));
        ubd.entries = pending;

        let mut released = 0u128;
        for entry in mature {
            // entries slashed to zero have nothing left to return
            if entry.balance == 0 {
                continue;
            }
            let coin = Coin::new(denom.clone(), entry.balance);
            self.bank
                .undelegate_coins_from_module_to_account(ctx, NOT_BONDED_POOL_NAME, delegator, &coin)?;
            released += entry.balance;
        }

        if ubd.entries.is_empty() {
            self.remove_unbonding_delegation(ctx, &ubd);
        } else {
            self.set_unbonding_delegation(ctx, &ubd);
        }

        info!(delegator = %delegator, validator = %operator, released, "completed unbonding");
        Ok(released)
    }

    /// Move `shares` from `src` to `dst`, returning the completion time
    pub fn begin_redelegation(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        src: &Address,
        dst: &Address,
        shares: &Dec,
    ) -> Result<Timestamp> {
        if src == dst {
            return Err(StakingError::SelfRedelegation);
        }
        let dst_validator = self
            .get_validator(ctx, dst)
            .ok_or(StakingError::BadRedelegationDst)?;
        let src_validator = self
            .get_validator(ctx, src)
            .ok_or(StakingError::BadRedelegationDst)?;

        // checked before unbonding so a rejected move leaves the source intact
        if dst_validator.invalid_ex_rate() {
            return Err(StakingError::DelegatorShareExRateInvalid);
        }

        // stake still in flight into src cannot be moved on again
        if self.has_receiving_redelegation(ctx, delegator, src) {
            return Err(StakingError::TransitiveRedelegation);
        }
        if self.has_max_redelegation_entries(ctx, delegator, src, dst) {
            return Err(StakingError::MaxRedelegationEntries);
        }

        let amount = self.unbond(ctx, delegator, src, shares)?;
        if amount == 0 {
            return Err(StakingError::TinyRedelegationAmount);
        }

        let shares_created = self.delegate(
            ctx,
            delegator,
            amount,
            TokenSource::Pool(src_validator.status),
            dst_validator,
        )?;

        let Some((completion_time, height)) = self.redelegation_begin_info(ctx, src) else {
            // src is unbonded: the stake is no longer slashable for src
            debug!(delegator = %delegator, src = %src, dst = %dst, "redelegation completed immediately");
            return Ok(ctx.block_time());
        };

        let red = self.set_redelegation_entry(
            ctx,
            delegator,
            src,
            dst,
            height,
            completion_time,
            amount,
            shares_created,
        );
        self.insert_redelegation_queue(ctx, &red, completion_time);

        info!(
            delegator = %delegator,
            src = %src,
            dst = %dst,
            amount,
            completion_time = %completion_time,
            "began redelegation"
        );
        Ok(completion_time)
    }

    /// Completion time and height for a redelegation out of `src`,
    /// `None` when it completes immediately
    fn redelegation_begin_info(&self, ctx: &Context<'_>, src: &Address) -> Option<(Timestamp, Height)> {
        match self.get_validator(ctx, src) {
            Some(validator) if validator.is_unbonded() => None,
            Some(validator) if validator.is_unbonding() => {
                Some((validator.unbonding_completion_time, validator.unbonding_height))
            }
            // bonded, or already removed: the full unbonding period
            _ => Some((
                ctx.block_time().saturating_add(self.unbonding_time(ctx)),
                ctx.block_height(),
            )),
        }
    }

    /// Drop every matured entry of a redelegation
    pub fn complete_redelegation(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        src: &Address,
        dst: &Address,
    ) -> Result<()> {
        let mut red = self
            .get_redelegation(ctx, delegator, src, dst)
            .ok_or(StakingError::NoRedelegation)?;
        let now = ctx.block_time();
        red.entries.retain(|entry| !entry.is_mature(now));

        if red.entries.is_empty() {
            self.remove_redelegation(ctx, &red);
        } else {
            self.set_redelegation(ctx, &red);
        }
        debug!(delegator = %delegator, src = %src, dst = %dst, "completed redelegation");
        Ok(())
    }

    /// Convert a token amount into the delegation shares to unbond
    ///
    /// Rounding can make the share amount exceed the delegation slightly;
    /// it is then capped so a delegation can always be withdrawn in full.
    pub fn validate_unbond_amount(
        &self,
        ctx: &Context<'_>,
        delegator: &Address,
        operator: &Address,
        amount: u128,
    ) -> Result<Dec> {
        let validator = self
            .get_validator(ctx, operator)
            .ok_or(StakingError::NoValidatorFound(*operator))?;
        let delegation = self
            .get_delegation(ctx, delegator, operator)
            .ok_or(StakingError::NoDelegation)?;

        let shares = validator.shares_from_tokens(amount)?;
        let truncated = validator.shares_from_tokens_truncated(amount)?;
        if truncated > delegation.shares {
            return Err(StakingError::BadSharesAmount);
        }
        Ok(if shares > delegation.shares {
            delegation.shares
        } else {
            shares
        })
    }
}
