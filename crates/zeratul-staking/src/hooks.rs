//! Callbacks other modules register to observe staking state changes
//!
//! Every method has a no-op default, so an implementor only overrides the
//! events it cares about.

use crate::context::Context;
use crate::math::Dec;
use crate::types::{Address, ConsAddress};
use crate::validator::Validator;

pub trait StakingHooks {
    fn after_validator_created(&self, _ctx: &mut Context<'_>, _validator: &Validator) {}

    fn before_validator_modified(&self, _ctx: &mut Context<'_>, _operator: &Address) {}

    fn after_validator_removed(
        &self,
        _ctx: &mut Context<'_>,
        _cons_addr: &ConsAddress,
        _operator: &Address,
    ) {
    }

    fn after_validator_bonded(
        &self,
        _ctx: &mut Context<'_>,
        _cons_addr: &ConsAddress,
        _operator: &Address,
    ) {
    }

    fn after_validator_begin_unbonding(
        &self,
        _ctx: &mut Context<'_>,
        _cons_addr: &ConsAddress,
        _operator: &Address,
    ) {
    }

    fn before_delegation_created(
        &self,
        _ctx: &mut Context<'_>,
        _delegator: &Address,
        _validator: &Address,
    ) {
    }

    fn before_delegation_shares_modified(
        &self,
        _ctx: &mut Context<'_>,
        _delegator: &Address,
        _validator: &Address,
    ) {
    }

    fn before_delegation_removed(
        &self,
        _ctx: &mut Context<'_>,
        _delegator: &Address,
        _validator: &Address,
    ) {
    }

    fn after_delegation_modified(
        &self,
        _ctx: &mut Context<'_>,
        _delegator: &Address,
        _validator: &Address,
    ) {
    }

    /// `fraction` is the share of the validator's current tokens being burned
    fn before_validator_slashed(&self, _ctx: &mut Context<'_>, _operator: &Address, _fraction: &Dec) {}
}

/// Fans every event out to each registered hook, in registration order
#[derive(Default)]
pub struct MultiStakingHooks {
    hooks: Vec<Box<dyn StakingHooks>>,
}

impl MultiStakingHooks {
    pub fn new(hooks: Vec<Box<dyn StakingHooks>>) -> Self {
        Self { hooks }
    }

    pub fn push(&mut self, hook: Box<dyn StakingHooks>) {
        self.hooks.push(hook);
    }
}

impl StakingHooks for MultiStakingHooks {
    fn after_validator_created(&self, ctx: &mut Context<'_>, validator: &Validator) {
        for hook in &self.hooks {
            hook.after_validator_created(ctx, validator);
        }
    }

    fn before_validator_modified(&self, ctx: &mut Context<'_>, operator: &Address) {
        for hook in &self.hooks {
            hook.before_validator_modified(ctx, operator);
        }
    }

    fn after_validator_removed(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress, operator: &Address) {
        for hook in &self.hooks {
            hook.after_validator_removed(ctx, cons_addr, operator);
        }
    }

    fn after_validator_bonded(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress, operator: &Address) {
        for hook in &self.hooks {
            hook.after_validator_bonded(ctx, cons_addr, operator);
        }
    }

    fn after_validator_begin_unbonding(
        &self,
        ctx: &mut Context<'_>,
        cons_addr: &ConsAddress,
        operator: &Address,
    ) {
        for hook in &self.hooks {
            hook.after_validator_begin_unbonding(ctx, cons_addr, operator);
        }
    }

    fn before_delegation_created(&self, ctx: &mut Context<'_>, delegator: &Address, validator: &Address) {
        for hook in &self.hooks {
            hook.before_delegation_created(ctx, delegator, validator);
        }
    }

    fn before_delegation_shares_modified(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        validator: &Address,
    ) {
        for hook in &self.hooks {
            hook.before_delegation_shares_modified(ctx, delegator, validator);
        }
    }

    fn before_delegation_removed(&self, ctx: &mut Context<'_>, delegator: &Address, validator: &Address) {
        for hook in &self.hooks {
            hook.before_delegation_removed(ctx, delegator, validator);
        }
    }

    fn after_delegation_modified(&self, ctx: &mut Context<'_>, delegator: &Address, validator: &Address) {
        for hook in &self.hooks {
            hook.after_delegation_modified(ctx, delegator, validator);
        }
    }

    fn before_validator_slashed(&self, ctx: &mut Context<'_>, operator: &Address, fraction: &Dec) {
        for hook in &self.hooks {
            hook.before_validator_slashed(ctx, operator, fraction);
        }
    }
}
