use super::Keeper;
use crate::codec::Codec;
use crate::context::Context;
use crate::delegation::{Redelegation, UnbondingDelegation};
use crate::math::{tokens_from_consensus_power, Dec};
use crate::types::{ConsAddress, Height};
use crate::validator::{BondStatus, Validator};
use tracing::{error, info, warn};

impl<C: Codec> Keeper<C> {
    /// Slash a validator for an infraction committed at `infraction_height`
    /// while it had `power` consensus power.
    ///
    /// The slash amount is `tokens_from_consensus_power(power) * fraction`.
    /// Stake that left the validator after the infraction (unbonding
    /// delegations and redelegations created at or after that height) is
    /// slashed first; whatever remains is burned from the validator itself,
    /// capped at its current tokens.
    ///
    /// # Panics
    ///
    /// On a negative fraction, a future infraction, or an unbonded validator.
    pub fn slash(
        &self,
        ctx: &mut Context<'_>,
        cons_addr: &ConsAddress,
        infraction_height: Height,
        power: i64,
        fraction: &Dec,
    ) {
        assert!(
            !fraction.is_negative(),
            "attempted to slash with a negative slash factor: {}",
            fraction
        );

        let amount = Dec::from_int(tokens_from_consensus_power(power))
            .mul(fraction)
            .truncate_int();

        let Some(validator) = self.get_validator_by_cons_addr(ctx, cons_addr) else {
            // overslashed and removed already: its unbonding stake must have
            // been slashed to nothing as well
            error!(
                cons_addr = %cons_addr,
                "ignored attempt to slash a nonexistent validator, investigate immediately"
            );
            return;
        };

        assert!(
            !validator.is_unbonded(),
            "should not be slashing unbonded validator {}",
            validator.operator
        );
        let current_height = ctx.block_height();
        assert!(
            infraction_height <= current_height,
            "impossible attempt to slash future infraction at height {} but we are at height {}",
            infraction_height,
            current_height
        );

        let operator = validator.operator;
        if let Some(hooks) = self.hooks() {
            hooks.before_validator_modified(ctx, &operator);
        }

        let mut remaining = amount;
        if infraction_height == current_height {
            info!(
                height = infraction_height,
                "slashing at current height, not scanning unbonding delegations & redelegations"
            );
        } else {
            for ubd in self.get_unbonding_delegations_from_validator(ctx, &operator) {
                let slashed = self.slash_unbonding_delegation(ctx, ubd, infraction_height, fraction);
                remaining = remaining.saturating_sub(slashed);
            }
            for red in self.get_redelegations_from_src_validator(ctx, &operator) {
                let slashed = self.slash_redelegation(ctx, red, infraction_height, fraction);
                remaining = remaining.saturating_sub(slashed);
            }
        }

        let tokens_to_burn = remaining.min(validator.tokens);

        if validator.tokens > 0 {
            // stake may have left since the infraction, so this can differ
            // from the requested fraction
            let effective = Dec::from_int(tokens_to_burn)
                .quo_round_up(&Dec::from_int(validator.tokens))
                .min(Dec::one());
            if let Some(hooks) = self.hooks() {
                hooks.before_validator_slashed(ctx, &operator, &effective);
            }
        }

        let validator = self.remove_validator_tokens(ctx, validator, tokens_to_burn);
        match validator.status {
            BondStatus::Bonded => self.burn_bonded_tokens(ctx, tokens_to_burn),
            BondStatus::Unbonding | BondStatus::Unbonded => self.burn_not_bonded_tokens(ctx, tokens_to_burn),
        }

        warn!(
            validator = %operator,
            fraction = %fraction,
            height = infraction_height,
            burned = tokens_to_burn,
            "validator slashed"
        );
    }

    /// Slash the entries of an unbonding delegation that were created at or
    /// after the infraction and are still pending.
    ///
    /// Returns the amount the entries were liable for, which can exceed
    /// what was actually burned when a balance was already reduced.
    pub(crate) fn slash_unbonding_delegation(
        &self,
        ctx: &mut Context<'_>,
        mut ubd: UnbondingDelegation,
        infraction_height: Height,
        fraction: &Dec,
    ) -> u128 {
        let now = ctx.block_time();
        let mut total_slash = 0u128;
        let mut burned = 0u128;
        let mut changed = false;

        for entry in ubd.entries.iter_mut() {
            // stake that started unbonding before the infraction did not contribute
            if entry.creation_height < infraction_height || entry.is_mature(now) {
                continue;
            }
            let slash_amount = fraction.mul_int(entry.initial_balance).truncate_int();
            total_slash += slash_amount;

            let burn = slash_amount.min(entry.balance);
            if burn == 0 {
                continue;
            }
            burned += burn;
            entry.balance -= burn;
            changed = true;
        }

        if changed {
            self.set_unbonding_delegation(ctx, &ubd);
        }
        self.burn_not_bonded_tokens(ctx, burned);
        total_slash
    }

    /// Slash the entries of a redelegation out of the slashed validator by
    /// unbonding the matching share of the destination delegation.
    ///
    /// The burn comes from the pool of the destination validator's status
    /// at the moment its tokens are unbonded, read before the unbond so a
    /// destination removed by it still gets its burn attributed.
    pub(crate) fn slash_redelegation(
        &self,
        ctx: &mut Context<'_>,
        red: Redelegation,
        infraction_height: Height,
        fraction: &Dec,
    ) -> u128 {
        let now = ctx.block_time();
        let mut total_slash = 0u128;
        let mut bonded_burned = 0u128;
        let mut not_bonded_burned = 0u128;

        for entry in &red.entries {
            if entry.creation_height < infraction_height || entry.is_mature(now) {
                continue;
            }
            let slash_amount = fraction.mul_int(entry.initial_balance).truncate_int();
            total_slash += slash_amount;

            let mut shares_to_unbond = fraction.mul(&entry.shares_dst);
            if shares_to_unbond.is_zero() {
                continue;
            }
            // a missing delegation has no shares left to unbond
            let Some(delegation) = self.get_delegation(ctx, &red.delegator, &red.dst) else {
                continue;
            };
            if shares_to_unbond > delegation.shares {
                shares_to_unbond = delegation.shares;
            }

            let dst_status = self.must_get_validator(ctx, &red.dst).status;
            let tokens_to_burn = self
                .unbond(ctx, &red.delegator, &red.dst, &shares_to_unbond)
                .unwrap_or_else(|e| panic!("error unbonding delegator {}: {}", red.delegator, e));

            match dst_status {
                BondStatus::Bonded => bonded_burned += tokens_to_burn,
                BondStatus::Unbonding | BondStatus::Unbonded => not_bonded_burned += tokens_to_burn,
            }
        }

        self.burn_bonded_tokens(ctx, bonded_burned);
        self.burn_not_bonded_tokens(ctx, not_bonded_burned);
        total_slash
    }

    /// Jail the validator with the given consensus address
    pub fn jail(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress) {
        let validator = self.must_get_validator_by_cons_addr(ctx, cons_addr);
        self.jail_validator(ctx, validator);
        info!(cons_addr = %cons_addr, "validator jailed");
    }

    /// Release the validator with the given consensus address from jail
    pub fn unjail(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress) {
        let validator = self.must_get_validator_by_cons_addr(ctx, cons_addr);
        self.unjail_validator(ctx, validator);
        info!(cons_addr = %cons_addr, "validator unjailed");
    }

    pub(crate) fn jail_validator(&self, ctx: &mut Context<'_>, mut validator: Validator) {
        assert!(
            !validator.jailed,
            "cannot jail already jailed validator {}",
            validator.operator
        );
        validator.jailed = true;
        self.set_validator(ctx, &validator);
        self.delete_validator_by_power_index(ctx, &validator);
    }

    pub(crate) fn unjail_validator(&self, ctx: &mut Context<'_>, mut validator: Validator) {
        assert!(
            validator.jailed,
            "cannot unjail already unjailed validator {}",
            validator.operator
        );
        validator.jailed = false;
        // rejoins the power ranking behind validators already holding its power
        validator.rank_sequence = self.next_rank_sequence(ctx);
        self.set_validator(ctx, &validator);
        self.set_validator_by_power_index(ctx, &validator);
    }
}
