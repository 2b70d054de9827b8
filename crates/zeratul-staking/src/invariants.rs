//! State audits
//!
//! Each check walks the whole staking store, so they are meant for tests,
//! simulation and operator tooling rather than every block.

use crate::codec::Codec;
use crate::context::Context;
use crate::keeper::Keeper;
use crate::keys::{self, VALIDATORS_BY_POWER_INDEX_KEY};
use crate::math::Dec;
use crate::types::Address;
use crate::validator::BondStatus;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("staking invariant {name} broken: {message}")]
pub struct InvariantBroken {
    pub name: &'static str,
    pub message: String,
}

impl InvariantBroken {
    fn new(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            message: message.into(),
        }
    }
}

pub type InvariantResult = Result<(), InvariantBroken>;

/// Pool balances equal the tokens they back
pub fn module_accounts<C: Codec>(ctx: &Context<'_>, keeper: &Keeper<C>) -> InvariantResult {
    let mut bonded = 0u128;
    let mut not_bonded = 0u128;
    for validator in keeper.get_all_validators(ctx) {
        match validator.status {
            BondStatus::Bonded => bonded += validator.tokens,
            BondStatus::Unbonding | BondStatus::Unbonded => not_bonded += validator.tokens,
        }
    }
    for ubd in keeper.get_all_unbonding_delegations(ctx) {
        not_bonded += ubd.entries.iter().map(|entry| entry.balance).sum::<u128>();
    }

    let bonded_balance = keeper.bonded_pool_balance(ctx);
    let not_bonded_balance = keeper.not_bonded_pool_balance(ctx);
    if bonded_balance != bonded || not_bonded_balance != not_bonded {
        return Err(InvariantBroken::new(
            "module-accounts",
            format!(
                "pool balances bonded={} not_bonded={}, sum of tokens bonded={} not_bonded={}",
                bonded_balance, not_bonded_balance, bonded, not_bonded
            ),
        ));
    }
    Ok(())
}

/// Every power index entry points at a stored, unjailed validator and
/// sits under the key its current record derives
pub fn nonnegative_power<C: Codec>(ctx: &Context<'_>, keeper: &Keeper<C>) -> InvariantResult {
    for (key, value) in ctx.prefix_iter(keys::STORE_KEY, &[VALIDATORS_BY_POWER_INDEX_KEY]) {
        let Some(operator) = Address::from_slice(&value) else {
            return Err(InvariantBroken::new(
                "nonnegative-power",
                format!("malformed power index entry {}", hex::encode(&key)),
            ));
        };
        let Some(validator) = keeper.get_validator(ctx, &operator) else {
            return Err(InvariantBroken::new(
                "nonnegative-power",
                format!("power index entry for missing validator {}", operator),
            ));
        };
        if validator.jailed {
            return Err(InvariantBroken::new(
                "nonnegative-power",
                format!("jailed validator {} in the power index", operator),
            ));
        }
        let expected = keys::validator_power_rank_key(
            validator.potential_consensus_power(),
            validator.rank_sequence,
            &operator,
        );
        if key != expected {
            return Err(InvariantBroken::new(
                "nonnegative-power",
                format!(
                    "power index key {} does not match validator {} (expected {})",
                    hex::encode(&key),
                    operator,
                    hex::encode(&expected)
                ),
            ));
        }
    }
    Ok(())
}

/// Delegations hold strictly positive shares
pub fn positive_delegation<C: Codec>(ctx: &Context<'_>, keeper: &Keeper<C>) -> InvariantResult {
    for delegation in keeper.get_all_delegations(ctx) {
        if !delegation.shares.is_positive() {
            return Err(InvariantBroken::new(
                "positive-delegation",
                format!(
                    "delegation of {} to {} has shares {}",
                    delegation.delegator, delegation.validator, delegation.shares
                ),
            ));
        }
    }
    Ok(())
}

/// A validator's shares are the sum of its delegations' shares
pub fn delegator_shares<C: Codec>(ctx: &Context<'_>, keeper: &Keeper<C>) -> InvariantResult {
    for validator in keeper.get_all_validators(ctx) {
        let total = keeper
            .get_validator_delegations(ctx, &validator.operator)
            .into_iter()
            .fold(Dec::zero(), |acc, delegation| acc + delegation.shares);
        if total != validator.delegator_shares {
            return Err(InvariantBroken::new(
                "delegator-shares",
                format!(
                    "validator {} records {} shares, delegations sum to {}",
                    validator.operator, validator.delegator_shares, total
                ),
            ));
        }
    }
    Ok(())
}

/// Run every check, stopping at the first broken one
pub fn all_invariants<C: Codec>(ctx: &Context<'_>, keeper: &Keeper<C>) -> InvariantResult {
    module_accounts(ctx, keeper)?;
    nonnegative_power(ctx, keeper)?;
    positive_delegation(ctx, keeper)?;
    delegator_shares(ctx, keeper)
}
