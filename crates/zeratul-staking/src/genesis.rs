//! Genesis import and export
//!
//! A genesis state is either hand-written (`exported == false`), in which
//! case the validator set is computed from the power index like any other
//! end block, or an export of a running chain, in which case the last
//! validator powers are trusted as-is and hooks are not replayed.

use crate::codec::Codec;
use crate::context::Context;
use crate::delegation::{Delegation, Redelegation, UnbondingDelegation};
use crate::error::{Result, StakingError};
use crate::keeper::Keeper;
use crate::params::Params;
use crate::types::Address;
use crate::validator::{BondStatus, Validator, ValidatorUpdate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastValidatorPower {
    pub operator: Address,
    pub power: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub last_total_power: i64,
    pub last_validator_powers: Vec<LastValidatorPower>,
    pub validators: Vec<Validator>,
    pub delegations: Vec<Delegation>,
    pub unbonding_delegations: Vec<UnbondingDelegation>,
    pub redelegations: Vec<Redelegation>,
    pub exported: bool,
}

impl GenesisState {
    /// Stateless sanity checks on the validators and params
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;

        let mut operators = BTreeSet::new();
        let mut cons_addrs = BTreeSet::new();
        for validator in &self.validators {
            if !operators.insert(validator.operator) {
                return Err(StakingError::InvalidGenesis(format!(
                    "duplicate validator in genesis state: {}",
                    validator.operator
                )));
            }
            if !cons_addrs.insert(validator.cons_address()) {
                return Err(StakingError::InvalidGenesis(format!(
                    "duplicate consensus key in genesis state: {}",
                    validator.cons_address()
                )));
            }
            if validator.jailed && validator.is_bonded() {
                return Err(StakingError::InvalidGenesis(format!(
                    "validator {} is bonded and jailed",
                    validator.operator
                )));
            }
            if validator.delegator_shares.is_zero() && !validator.is_unbonding() {
                return Err(StakingError::InvalidGenesis(format!(
                    "bonded or unbonded validator {} cannot have zero delegator shares",
                    validator.operator
                )));
            }
            validator.description.ensure_length()?;
        }

        for delegation in &self.delegations {
            if !delegation.shares.is_positive() {
                return Err(StakingError::InvalidGenesis(format!(
                    "delegation of {} to {} has non-positive shares",
                    delegation.delegator, delegation.validator
                )));
            }
        }
        Ok(())
    }
}

/// Load `genesis` into an empty store, returning the validator updates
/// for the first block
pub fn init_genesis<C: Codec>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C>,
    genesis: &GenesisState,
) -> Result<Vec<ValidatorUpdate>> {
    genesis.validate()?;

    keeper.set_params(ctx, &genesis.params);
    keeper.set_last_total_power(ctx, genesis.last_total_power);

    let mut bonded_tokens = 0u128;
    let mut not_bonded_tokens = 0u128;

    for validator in &genesis.validators {
        keeper.set_validator(ctx, validator);
        keeper.set_validator_by_cons_addr(ctx, validator);
        keeper.set_validator_by_power_index(ctx, validator);
        keeper.bump_rank_sequence(ctx, validator.rank_sequence);

        if !genesis.exported {
            if let Some(hooks) = keeper.hooks() {
                hooks.after_validator_created(ctx, validator);
            }
        }
        if validator.is_unbonding() {
            keeper.insert_validator_queue(ctx, validator);
        }

        match validator.status {
            BondStatus::Bonded => bonded_tokens += validator.tokens,
            BondStatus::Unbonding | BondStatus::Unbonded => not_bonded_tokens += validator.tokens,
        }
    }

    for delegation in &genesis.delegations {
        if !genesis.exported {
            if let Some(hooks) = keeper.hooks() {
                hooks.before_delegation_created(ctx, &delegation.delegator, &delegation.validator);
            }
        }
        keeper.set_delegation(ctx, delegation);
        if !genesis.exported {
            if let Some(hooks) = keeper.hooks() {
                hooks.after_delegation_modified(ctx, &delegation.delegator, &delegation.validator);
            }
        }
    }

    for ubd in &genesis.unbonding_delegations {
        keeper.set_unbonding_delegation(ctx, ubd);
        for entry in &ubd.entries {
            keeper.insert_ubd_queue(ctx, ubd, entry.completion_time);
            not_bonded_tokens += entry.balance;
        }
    }

    for red in &genesis.redelegations {
        keeper.set_redelegation(ctx, red);
        for entry in &red.entries {
            keeper.insert_redelegation_queue(ctx, red, entry.completion_time);
        }
    }

    let bonded_balance = keeper.bonded_pool_balance(ctx);
    if bonded_balance != bonded_tokens {
        return Err(StakingError::InvalidGenesis(format!(
            "bonded pool balance {} does not match bonded tokens {}",
            bonded_balance, bonded_tokens
        )));
    }
    let not_bonded_balance = keeper.not_bonded_pool_balance(ctx);
    if not_bonded_balance != not_bonded_tokens {
        return Err(StakingError::InvalidGenesis(format!(
            "not bonded pool balance {} does not match not bonded tokens {}",
            not_bonded_balance, not_bonded_tokens
        )));
    }

    let updates = if genesis.exported {
        let mut updates = Vec::with_capacity(genesis.last_validator_powers.len());
        for last in &genesis.last_validator_powers {
            let validator = keeper.get_validator(ctx, &last.operator).ok_or_else(|| {
                StakingError::InvalidGenesis(format!(
                    "last validator power for unknown validator {}",
                    last.operator
                ))
            })?;
            keeper.set_last_validator_power(ctx, &last.operator, last.power);
            let mut update = validator.abci_validator_update();
            update.power = last.power;
            updates.push(update);
        }
        updates
    } else {
        keeper.apply_and_return_validator_set_updates(ctx)
    };

    info!(
        validators = genesis.validators.len(),
        delegations = genesis.delegations.len(),
        bonded_tokens,
        not_bonded_tokens,
        "initialized staking genesis"
    );
    Ok(updates)
}

/// Dump the staking state, ready to be fed back to `init_genesis`
pub fn export_genesis<C: Codec>(ctx: &Context<'_>, keeper: &Keeper<C>) -> GenesisState {
    GenesisState {
        params: keeper.params(ctx),
        last_total_power: keeper.last_total_power(ctx),
        last_validator_powers: keeper
            .get_last_validator_powers(ctx)
            .into_iter()
            .map(|(operator, power)| LastValidatorPower { operator, power })
            .collect(),
        validators: keeper.get_all_validators(ctx),
        delegations: keeper.get_all_delegations(ctx),
        unbonding_delegations: keeper.get_all_unbonding_delegations(ctx),
        redelegations: keeper.get_all_redelegations(ctx),
        exported: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abci::end_blocker;
    use crate::bank::{BankKeeper, BONDED_POOL_NAME, NOT_BONDED_POOL_NAME};
    use crate::math::Dec;
    use crate::store::MemStore;
    use crate::testing::{self, addr, power_tokens, pubkey, stake};
    use crate::types::Timestamp;
    use crate::validator::Description;

    fn genesis_validator(n: u8, tokens: u128) -> Validator {
        let mut validator = Validator::new(addr(n), pubkey(n), Description::new(format!("v{}", n)));
        validator.tokens = tokens;
        validator.delegator_shares = Dec::from_int(tokens);
        validator.rank_sequence = n as u64;
        validator
    }

    fn self_delegation(validator: &Validator) -> Delegation {
        Delegation::new(validator.operator, validator.operator, validator.delegator_shares.clone())
    }

    #[test]
    fn test_init_genesis_bonds_top_validators() {
        let (keeper, bank) = testing::keeper();
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, testing::header(1, Timestamp::from_secs(1)));

        let a = genesis_validator(1, power_tokens(10));
        let b = genesis_validator(2, power_tokens(20));
        bank.mint_coins(&mut ctx, NOT_BONDED_POOL_NAME, &stake(a.tokens + b.tokens))
            .unwrap();

        let genesis = GenesisState {
            params: Params {
                max_validators: 1,
                ..Params::default()
            },
            delegations: vec![self_delegation(&a), self_delegation(&b)],
            validators: vec![a.clone(), b.clone()],
            ..GenesisState::default()
        };
        let updates = init_genesis(&mut ctx, &keeper, &genesis).unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].pub_key, b.consensus_pubkey);
        assert_eq!(updates[0].power, 20);
        assert_eq!(keeper.bonded_pool_balance(&ctx), b.tokens);
        assert_eq!(keeper.not_bonded_pool_balance(&ctx), a.tokens);
        assert_eq!(keeper.last_total_power(&ctx), 20);
    }

    #[test]
    fn test_init_genesis_rejects_pool_mismatch() {
        let (keeper, bank) = testing::keeper();
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, testing::header(1, Timestamp::from_secs(1)));

        let a = genesis_validator(1, 100);
        bank.mint_coins(&mut ctx, NOT_BONDED_POOL_NAME, &stake(99)).unwrap();
        let genesis = GenesisState {
            delegations: vec![self_delegation(&a)],
            validators: vec![a],
            ..GenesisState::default()
        };
        assert!(matches!(
            init_genesis(&mut ctx, &keeper, &genesis),
            Err(StakingError::InvalidGenesis(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bonded_jailed() {
        let a = genesis_validator(1, 100);
        let genesis = GenesisState {
            validators: vec![a.clone(), a.clone()],
            ..GenesisState::default()
        };
        assert!(matches!(genesis.validate(), Err(StakingError::InvalidGenesis(_))));

        let mut jailed = a;
        jailed.jailed = true;
        jailed.status = BondStatus::Bonded;
        let genesis = GenesisState {
            validators: vec![jailed],
            ..GenesisState::default()
        };
        assert!(matches!(genesis.validate(), Err(StakingError::InvalidGenesis(_))));
    }

    #[test]
    fn test_export_then_import_preserves_state() {
        let (keeper, bank) = testing::keeper();
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, testing::header(1, Timestamp::from_secs(1)));

        let v1 = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
        let v2 = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(5));
        testing::delegate(&mut ctx, &keeper, &bank, addr(9), v1, power_tokens(3));
        end_blocker(&mut ctx, &keeper);

        let shares = keeper
            .validate_unbond_amount(&ctx, &addr(9), &v1, power_tokens(1))
            .unwrap();
        keeper.undelegate(&mut ctx, &addr(9), &v1, &shares).unwrap();
        let shares = keeper
            .validate_unbond_amount(&ctx, &addr(9), &v1, power_tokens(1))
            .unwrap();
        keeper
            .begin_redelegation(&mut ctx, &addr(9), &v1, &v2, &shares)
            .unwrap();
        end_blocker(&mut ctx, &keeper);

        let exported = export_genesis(&ctx, &keeper);
        assert!(exported.exported);
        assert_eq!(exported.validators.len(), 2);
        assert_eq!(exported.unbonding_delegations.len(), 1);
        assert_eq!(exported.redelegations.len(), 1);

        // replay into a fresh store holding the same pool balances
        let bonded = keeper.bonded_pool_balance(&ctx);
        let not_bonded = keeper.not_bonded_pool_balance(&ctx);
        let (fresh_keeper, fresh_bank) = testing::keeper();
        let mut fresh_store = MemStore::new();
        let mut fresh = Context::new(&mut fresh_store, testing::header(1, Timestamp::from_secs(1)));
        fresh_bank.mint_coins(&mut fresh, BONDED_POOL_NAME, &stake(bonded)).unwrap();
        fresh_bank
            .mint_coins(&mut fresh, NOT_BONDED_POOL_NAME, &stake(not_bonded))
            .unwrap();

        let updates = init_genesis(&mut fresh, &fresh_keeper, &exported).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(export_genesis(&fresh, &fresh_keeper), exported);
        assert_eq!(
            fresh_bank.balance(&fresh, &fresh_bank.module_address(BONDED_POOL_NAME), "stake"),
            bonded
        );
    }
}
