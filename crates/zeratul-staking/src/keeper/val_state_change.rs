use super::Keeper;
use crate::codec::Codec;
use crate::context::Context;
use crate::types::Timestamp;
use crate::validator::{BondStatus, Validator, ValidatorUpdate};
use tracing::{debug, info};

impl<C: Codec> Keeper<C> {
    /// Compute the validator set for the next block and return the power
    /// changes consensus needs to apply.
    ///
    /// The top `max_validators` of the power index become (or stay)
    /// bonded; validators of the last set that are no longer in it begin
    /// unbonding and are reported with zero power. Pool balances are
    /// settled with a single net transfer.
    pub fn apply_and_return_validator_set_updates(&self, ctx: &mut Context<'_>) -> Vec<ValidatorUpdate> {
        let max_validators = self.max_validators(ctx) as usize;
        let mut last = self.get_last_validator_powers(ctx);
        let mut updates = Vec::new();
        let mut total_power: i64 = 0;
        let mut not_bonded_to_bonded: u128 = 0;
        let mut bonded_to_not_bonded: u128 = 0;

        let mut count = 0;
        for operator in self.validators_by_power_desc(ctx) {
            if count >= max_validators {
                break;
            }
            let validator = self.must_get_validator(ctx, &operator);
            assert!(
                !validator.jailed,
                "should never retrieve a jailed validator {} from the power index",
                operator
            );
            // nothing below a zero-power validator can be bonded either
            if validator.potential_consensus_power() == 0 {
                break;
            }

            let validator = match validator.status {
                BondStatus::Unbonded | BondStatus::Unbonding => {
                    let validator = self.bond_validator(ctx, validator);
                    not_bonded_to_bonded += validator.tokens;
                    validator
                }
                BondStatus::Bonded => validator,
            };

            let new_power = validator.consensus_power();
            if last.get(&operator) != Some(&new_power) {
                updates.push(validator.abci_validator_update());
                self.set_last_validator_power(ctx, &operator, new_power);
            }
            last.remove(&operator);

            count += 1;
            total_power += new_power;
        }

        // what is left of the last set fell out; BTreeMap keeps operator order
        for operator in last.into_keys() {
            let validator = self.must_get_validator(ctx, &operator);
            let validator = self.begin_unbonding_validator(ctx, validator);
            bonded_to_not_bonded += validator.tokens;
            self.delete_last_validator_power(ctx, &operator);
            updates.push(validator.abci_validator_update_zero());
        }

        if not_bonded_to_bonded > bonded_to_not_bonded {
            self.not_bonded_tokens_to_bonded(ctx, not_bonded_to_bonded - bonded_to_not_bonded);
        } else if bonded_to_not_bonded > not_bonded_to_bonded {
            self.bonded_tokens_to_not_bonded(ctx, bonded_to_not_bonded - not_bonded_to_bonded);
        }

        if !updates.is_empty() {
            self.set_last_total_power(ctx, total_power);
            debug!(updates = updates.len(), total_power, "validator set changed");
        }
        updates
    }

    /// Unbonded or unbonding validator entering the bonded set
    pub(crate) fn bond_validator(&self, ctx: &mut Context<'_>, mut validator: Validator) -> Validator {
        assert!(
            !validator.is_bonded(),
            "bad state transition to bonded, validator {} is already bonded",
            validator.operator
        );

        self.delete_validator_by_power_index(ctx, &validator);
        // drop the pending unbonding before its completion time is reset
        if validator.is_unbonding() {
            self.delete_validator_queue(ctx, &validator);
        }

        validator.status = BondStatus::Bonded;
        validator.unbonding_height = 0;
        validator.unbonding_completion_time = Timestamp::ZERO;
        self.set_validator(ctx, &validator);
        self.set_validator_by_power_index(ctx, &validator);

        info!(
            validator = %validator.operator,
            power = validator.consensus_power(),
            "validator bonded"
        );
        if let Some(hooks) = self.hooks() {
            hooks.after_validator_bonded(ctx, &validator.cons_address(), &validator.operator);
        }
        validator
    }

    /// Bonded validator leaving the bonded set
    pub(crate) fn begin_unbonding_validator(&self, ctx: &mut Context<'_>, mut validator: Validator) -> Validator {
        assert!(
            validator.is_bonded(),
            "should not already be unbonded or unbonding, validator {} is {}",
            validator.operator,
            validator.status
        );

        self.delete_validator_by_power_index(ctx, &validator);

        validator.status = BondStatus::Unbonding;
        validator.unbonding_height = ctx.block_height();
        validator.unbonding_completion_time = ctx.block_time().saturating_add(self.unbonding_time(ctx));
        self.set_validator(ctx, &validator);
        self.set_validator_by_power_index(ctx, &validator);
        self.insert_validator_queue(ctx, &validator);

        info!(
            validator = %validator.operator,
            completion_time = %validator.unbonding_completion_time,
            "validator began unbonding"
        );
        if let Some(hooks) = self.hooks() {
            hooks.after_validator_begin_unbonding(ctx, &validator.cons_address(), &validator.operator);
        }
        validator
    }
}
