//! Staking surface exposed to the misbehaviour module

use crate::codec::Codec;
use crate::context::Context;
use crate::delegation::Delegation;
use crate::keeper::Keeper;
use crate::math::Dec;
use crate::types::{Address, ConsAddress, Height};
use crate::validator::Validator;

/// What other modules may read from and do to the validator set
pub trait ValidatorSet {
    fn validator(&self, ctx: &Context<'_>, operator: &Address) -> Option<Validator>;

    fn validator_by_cons_addr(&self, ctx: &Context<'_>, cons_addr: &ConsAddress) -> Option<Validator>;

    /// Every stored validator, in operator order
    fn validators(&self, ctx: &Context<'_>) -> Vec<Validator>;

    fn delegation(&self, ctx: &Context<'_>, delegator: &Address, validator: &Address) -> Option<Delegation>;

    fn max_validators(&self, ctx: &Context<'_>) -> u32;

    fn slash(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress, infraction_height: Height, power: i64, fraction: &Dec);

    fn jail(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress);

    fn unjail(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress);
}

impl<C: Codec> ValidatorSet for Keeper<C> {
    fn validator(&self, ctx: &Context<'_>, operator: &Address) -> Option<Validator> {
        self.get_validator(ctx, operator)
    }

    fn validator_by_cons_addr(&self, ctx: &Context<'_>, cons_addr: &ConsAddress) -> Option<Validator> {
        self.get_validator_by_cons_addr(ctx, cons_addr)
    }

    fn validators(&self, ctx: &Context<'_>) -> Vec<Validator> {
        self.get_all_validators(ctx)
    }

    fn delegation(&self, ctx: &Context<'_>, delegator: &Address, validator: &Address) -> Option<Delegation> {
        self.get_delegation(ctx, delegator, validator)
    }

    fn max_validators(&self, ctx: &Context<'_>) -> u32 {
        Keeper::max_validators(self, ctx)
    }

    fn slash(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress, infraction_height: Height, power: i64, fraction: &Dec) {
        Keeper::slash(self, ctx, cons_addr, infraction_height, power, fraction)
    }

    fn jail(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress) {
        Keeper::jail(self, ctx, cons_addr)
    }

    fn unjail(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress) {
        Keeper::unjail(self, ctx, cons_addr)
    }
}
